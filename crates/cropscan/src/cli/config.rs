//! The `cropscan config` command for configuration management.

use clap::{Args, Subcommand};
use cropscan_core::analysis::gemini::resolve_env_var;
use cropscan_core::Config;
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration (literal API keys are masked)
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Validate the config file and report whether a Gemini key resolves
    Check,
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", masked(&config).to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_default(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::Check => {
            let config = Config::load()?;
            println!("Config OK ({})", Config::default_path().display());
            println!("{}", credential_status(&config));
        }
    }

    Ok(())
}

/// Write the default config to `path`, refusing to clobber unless `force`.
fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

/// Copy of `config` with a literal API key replaced by a mask.
/// `${VAR}` references are shown as-is since they hold no secret.
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    let key = &config.gemini.api_key;
    if !key.is_empty() && !key.starts_with("${") {
        config.gemini.api_key = "********".to_string();
    }
    config
}

fn credential_status(config: &Config) -> String {
    match resolve_env_var(&config.gemini.api_key) {
        Some(_) => format!("Gemini key: set (model {})", config.gemini.model),
        None => format!(
            "Gemini key: not set ({}); analyses will use simulated results",
            config.gemini.api_key
        ),
    }
}
