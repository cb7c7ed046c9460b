//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod upload;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use trainhub_core::config::AppConfig;
use trainhub_core::error::AppError;

/// TrainHub: project training-data uploads
#[derive(Debug, Parser)]
#[command(name = "trainhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the layered `config/` sources)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Upload local files as training data
    Upload(upload::UploadArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config.as_deref();
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config_path).await,
            Commands::Config(args) => config::execute(args, config_path, self.format),
            Commands::Upload(args) => upload::execute(args, config_path, self.format).await,
        }
    }
}

/// Load configuration from an explicit file, or from the layered sources
/// for `TRAINHUB_ENV` (default `development`).
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::load_file(path),
        None => {
            let env = std::env::var("TRAINHUB_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}
