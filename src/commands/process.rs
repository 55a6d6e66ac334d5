//! Default action: a normal processing pass, optionally followed by a
//! retry pass under `--all --auto-retry`.

use super::Cli;
use crate::config::Config;
use crate::db::db::Db;
use crate::engine::{Engine, EngineConfig, TargetsFile};
use crate::libs::credentials::CredentialStore;
use crate::api::RemoteClient;
use crate::libs::messages::Message;
use crate::msg_info;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TEST_MODE_LIMIT: usize = 5;

pub async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let cache_dir = super::resolve_cache_dir(cli)?;
    let cookies_path = super::resolve_cookies_path(cli);
    let users_path = super::resolve_users_file_path(cli);

    let targets_file = TargetsFile::load(&users_path)?;
    let targets = targets_file.targets();

    let credentials = CredentialStore::new(cookies_path, Duration::from_secs(config.credential_cache_ttl_secs));
    let header_enhancement = config.header_enhancement && !cli.disable_header_enhancement;
    let forwarded_for_enabled = config.forwarded_for_enabled || cli.enable_forwarded_for;
    let client = RemoteClient::new(header_enhancement, forwarded_for_enabled, &config.forwarded_for_ranges)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(interrupted.clone());

    let engine_config = EngineConfig {
        batch_size: config.batch_size,
        inter_slice_delay: cli.delay.unwrap_or(config.inter_slice_delay),
        max_auth_recoveries: config.max_auth_recoveries,
    };

    let mut engine = Engine::new(&db.conn, client, credentials, cache_dir, engine_config, interrupted.clone());

    let max_users = if cli.all { cli.max_users } else { Some(cli.max_users.unwrap_or(TEST_MODE_LIMIT)) };
    let counters = engine.run(targets, max_users).await?;
    msg_info!(Message::ProcessingComplete(counters.processed, counters.blocked, counters.skipped, counters.errored));

    if cli.all && cli.auto_retry && !interrupted.load(Ordering::SeqCst) {
        let retry_counters = engine.run_retry_pass().await?;
        msg_info!(Message::ProcessingComplete(
            retry_counters.processed,
            retry_counters.blocked,
            retry_counters.skipped,
            retry_counters.errored
        ));
    }

    if interrupted.load(Ordering::SeqCst) {
        anyhow::bail!("{}", Message::OperationCancelled);
    }

    Ok(())
}

fn install_interrupt_handler(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });
}
