//! CropScan CLI - freshness and quality checks for produce photos.
//!
//! Sends a photo and the product it shows to a remote vision model and prints
//! the structured assessment as JSON. When the remote service is unreachable
//! or misbehaves, a simulated assessment is printed instead.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a photo
//! cropscan analyze banana.jpg --crop banana
//!
//! # Include where the result came from
//! cropscan analyze ~/photos/wheat.png --crop wheat --provenance
//!
//! # List the crops offered by the storefront picker
//! cropscan crops
//!
//! # View configuration
//! cropscan config show
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;

mod cli;
mod logging;

/// CropScan - AI-assisted freshness and quality checks for produce photos.
#[derive(Parser, Debug)]
#[command(name = "cropscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Assess the freshness and quality of a produce photo
    Analyze(cli::analyze::AnalyzeArgs),

    /// List the crops offered by the storefront picker
    Crops,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cropscan_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `cropscan config path`."
            );
            cropscan_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("CropScan v{}", cropscan_core::VERSION);

    match cli.command {
        Some(Commands::Analyze(args)) => cli::analyze::execute(args, &config).await,
        Some(Commands::Crops) => cli::crops::execute(),
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
