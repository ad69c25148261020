use clap::Parser;
use tracing::{error, Level};

use crypto_market_etl::{
    cli::{run_migrate, run_pipeline, Cli, Commands},
    error::Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => run_pipeline().await,
        Some(Commands::Migrate) => run_migrate().await,
    }
}
