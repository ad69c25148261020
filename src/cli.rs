//! CLI module for the ETL service
//!
//! Provides a command-line interface for running one pipeline pass or
//! ensuring the target table exists without fetching anything.

use clap::{Parser, Subcommand};

use crate::{
    configuration::{
        get_configuration, set_configuration, AppState, Config, State,
    },
    error::Error,
    handler::daily_metrics,
    provider::{DatabasePool, HTTP},
};

/// Daily crypto market ETL
#[derive(Parser)]
#[command(name = "crypto-market-etl")]
#[command(about = "CoinGecko market snapshot to Postgres loader", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one extract-transform-load pass (default if no command specified)
    Run,

    /// Ensure the target table exists without fetching or loading anything
    Migrate,
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub async fn run_pipeline() -> Result<(), Error> {
    let config = init_config()?;
    let database = DatabasePool::new(&config).await?;
    let http = HTTP::new(config.clone())?;

    let state = State::new(config, database, http);
    let app_state = AppState::new(state);

    let loaded = daily_metrics::run(app_state).await?;
    tracing::info!("run complete, {} records loaded", loaded);

    Ok(())
}

pub async fn run_migrate() -> Result<(), Error> {
    let config = init_config()?;
    let database = DatabasePool::new(&config).await?;

    tracing::info!("ensuring daily_crypto_metrics exists...");
    database.daily_crypto_metrics.create_table().await?;
    tracing::info!("migration complete");

    Ok(())
}
