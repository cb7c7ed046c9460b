//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use trainhub_core::config::DatabaseProvider;
use trainhub_core::error::AppError;
use trainhub_database::DatabasePool;
use trainhub_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: Option<&str>) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.database.provider != DatabaseProvider::Postgres {
        return Err(AppError::configuration(format!(
            "Migrations need database.provider = \"postgres\" (configured: {})",
            config.database.provider
        )));
    }

    match &args.command {
        MigrateCommand::Run => {
            let pool = DatabasePool::connect(&config.database).await?;
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
