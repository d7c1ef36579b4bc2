//! Sonoscope CLI - Image Sonification
//!
//! Command-line front end for inspecting what the encoders schedule.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sonoscope::cli::{commands, Cli, Commands};
use sonoscope::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Sonoscope v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Sonoscope v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Present {
            config,
            image,
            detailed,
        } => commands::present(&config, image.as_deref(), detailed),
        Commands::Sample {
            config,
            image,
            detailed,
            times,
        } => commands::sample(&config, &image, detailed, &times),
        Commands::Describe { config } => commands::describe(&config),
    }
}
