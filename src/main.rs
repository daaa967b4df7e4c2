use clap::Parser;
use credvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => credvault::cli::commands::init::execute(&cli),
        Commands::Set {
            ref name,
            ref value,
        } => credvault::cli::commands::set::execute(&cli, name, value.as_deref()),
        Commands::Get { ref name } => credvault::cli::commands::get::execute(&cli, name),
        Commands::List => credvault::cli::commands::list::execute(&cli),
        Commands::Delete { ref name, force } => {
            credvault::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::Validate => credvault::cli::commands::validate::execute(&cli),
        Commands::Verify => credvault::cli::commands::verify::execute(&cli),
        Commands::RotateKey => credvault::cli::commands::rotate::execute(&cli),
    };

    if let Err(e) = result {
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr.  `CREDVAULT_LOG` overrides the level chosen by `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_env("CREDVAULT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
