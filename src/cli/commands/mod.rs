//! One module per subcommand.

pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod rotate;
pub mod set;
pub mod validate;
pub mod verify;
