//! Prodboard - workspace item store
//!
//! CLI entry point for managing users, workspaces and board items.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod credentials;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = settings::load_config()?;

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database.path.display(),
        "Starting prodboard"
    );

    if let Err(err) = cli::run(cli, &config).await {
        match err.downcast_ref::<prodboard_store::Error>() {
            Some(store_err) => {
                let kind = store_err.kind();
                eprintln!("error: {store_err} ({kind}, {})", kind.status_code());
                debug!(error = ?store_err, "Command failed");
            }
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
    Ok(())
}
