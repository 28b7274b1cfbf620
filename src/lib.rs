pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod grounding;
pub mod perception;

use clap::Parser;

use crate::cli::Args;
use crate::errors::GroundResult;

/// Entry point of the `uiground` binary: logging, config, then one subcommand.
pub fn run() -> GroundResult<()> {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    let report = commands::execute(args.command, &config)?;
    println!("{report}");
    Ok(())
}
