//! Command-line surface (§6): one program, one of seven mutually exclusive
//! action flags, or — when none is given — a processing pass.

mod clear_errors;
mod debug_errors;
mod process;
mod reset_failed;
mod reset_retry;
mod retry;
mod stats;
mod test_user;

use crate::libs::messages::Message;
use crate::msg_bail_anyhow;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "banqueue", about = "Durable, rate-limit-aware mass-block processing engine", version)]
pub struct Cli {
    /// Print failure-kind and response-code breakdowns and exit.
    #[arg(long)]
    pub stats: bool,

    /// Run a retry pass over due failed targets instead of a normal pass.
    #[arg(long)]
    pub retry: bool,

    /// Reset retry_count to zero for every failed row and exit.
    #[arg(long)]
    pub reset_retry: bool,

    /// Clear every failed row's error fields and exit.
    #[arg(long)]
    pub clear_errors: bool,

    /// Delete every failed row outright and exit.
    #[arg(long)]
    pub reset_failed: bool,

    /// Resolve and print a single user's record without blocking them.
    #[arg(long, value_name = "ID")]
    pub test_user: Option<String>,

    /// Print the failure breakdown grouped by error kind and exit.
    #[arg(long)]
    pub debug_errors: bool,

    /// Process all unprocessed targets instead of the first 5 (test mode).
    #[arg(long)]
    pub all: bool,

    /// After an `--all` pass, immediately run a retry pass.
    #[arg(long)]
    pub auto_retry: bool,

    /// Caps the number of targets processed this run.
    #[arg(long)]
    pub max_users: Option<usize>,

    /// Overrides the inter-slice delay, in seconds.
    #[arg(long)]
    pub delay: Option<u64>,

    /// Overrides the credentials file path (falls back to COOKIES_PATH).
    #[arg(long)]
    pub cookies: Option<PathBuf>,

    /// Overrides the targets file path (falls back to USERS_FILE).
    #[arg(long)]
    pub users_file: Option<PathBuf>,

    /// Overrides the history database path (falls back to BLOCK_DB).
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Overrides the identifier cache root (falls back to CACHE_DIR).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Enables verbose tracing output regardless of BANQUEUE_DEBUG/RUST_LOG.
    #[arg(long)]
    pub debug: bool,

    /// Disables enhanced per-request headers.
    #[arg(long)]
    pub disable_header_enhancement: bool,

    /// Attaches a synthetic forwarded-for header in addition to the default set.
    #[arg(long)]
    pub enable_forwarded_for: bool,
}

impl Cli {
    fn action_flag_count(&self) -> usize {
        [self.stats, self.retry, self.reset_retry, self.clear_errors, self.reset_failed, self.debug_errors]
            .iter()
            .filter(|b| **b)
            .count()
            + usize::from(self.test_user.is_some())
    }

    pub async fn menu() -> Result<()> {
        let cli = Cli::parse();

        if cli.action_flag_count() > 1 {
            msg_bail_anyhow!(Message::UnknownFlagCombination);
        }

        if cli.debug {
            std::env::set_var("BANQUEUE_DEBUG", "1");
        }

        if cli.stats {
            return stats::run(&cli).await;
        }
        if cli.retry {
            return retry::run(&cli).await;
        }
        if cli.reset_retry {
            return reset_retry::run(&cli).await;
        }
        if cli.clear_errors {
            return clear_errors::run(&cli).await;
        }
        if cli.reset_failed {
            return reset_failed::run(&cli).await;
        }
        if let Some(id) = cli.test_user.clone() {
            return test_user::run(&cli, &id).await;
        }
        if cli.debug_errors {
            return debug_errors::run(&cli).await;
        }

        process::run(&cli).await
    }
}

pub(crate) fn resolve_db_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.db {
        return Ok(path.clone());
    }
    if let Ok(path) = std::env::var("BLOCK_DB") {
        return Ok(PathBuf::from(path));
    }
    crate::libs::data_storage::DataStorage::new().get_path(crate::db::db::DB_FILE_NAME)
}

pub(crate) fn resolve_cookies_path(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.cookies {
        return path.clone();
    }
    if let Ok(path) = std::env::var("COOKIES_PATH") {
        return PathBuf::from(path);
    }
    PathBuf::from("cookies.json")
}

pub(crate) fn resolve_users_file_path(cli: &Cli) -> PathBuf {
    if let Some(path) = &cli.users_file {
        return path.clone();
    }
    if let Ok(path) = std::env::var("USERS_FILE") {
        return PathBuf::from(path);
    }
    PathBuf::from("users.json")
}

pub(crate) fn resolve_cache_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.cache_dir {
        return Ok(path.clone());
    }
    if let Ok(path) = std::env::var("CACHE_DIR") {
        return Ok(PathBuf::from(path));
    }
    crate::libs::data_storage::DataStorage::new().base_dir().map(|p| p.join("cache"))
}
