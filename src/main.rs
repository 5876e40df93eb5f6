use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use archlens::config::Config;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Archlens v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.config.as_deref())?;
    debug!("Configured lookup policy: {:?}", config.analysis.lookup_policy);

    // Execute the requested command
    cli.execute(config)
}
