//! Project configuration (`.credvault.toml`).

mod settings;

pub use settings::Settings;
