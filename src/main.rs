//! Entry point: initializes tracing, then hands off to the CLI.

use anyhow::Result;
use banqueue::commands::Cli;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("BANQUEUE_DEBUG").is_ok() || env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "banqueue=debug".into()))
            .init();
    }

    if let Err(err) = Cli::menu().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }

    Ok(())
}
