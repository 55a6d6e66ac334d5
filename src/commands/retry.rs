//! `--retry`: runs a retry pass over due failed targets only.

use super::Cli;
use crate::api::RemoteClient;
use crate::config::Config;
use crate::db::db::Db;
use crate::engine::{Engine, EngineConfig};
use crate::libs::credentials::CredentialStore;
use crate::libs::messages::Message;
use crate::msg_info;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let cache_dir = super::resolve_cache_dir(cli)?;
    let cookies_path = super::resolve_cookies_path(cli);

    let credentials = CredentialStore::new(cookies_path, Duration::from_secs(config.credential_cache_ttl_secs));
    let header_enhancement = config.header_enhancement && !cli.disable_header_enhancement;
    let forwarded_for_enabled = config.forwarded_for_enabled || cli.enable_forwarded_for;
    let client = RemoteClient::new(header_enhancement, forwarded_for_enabled, &config.forwarded_for_ranges)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    tokio::spawn({
        let interrupted = interrupted.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        }
    });

    let engine_config = EngineConfig {
        batch_size: config.batch_size,
        inter_slice_delay: cli.delay.unwrap_or(config.inter_slice_delay),
        max_auth_recoveries: config.max_auth_recoveries,
    };

    let mut engine = Engine::new(&db.conn, client, credentials, cache_dir, engine_config, interrupted.clone());
    let counters = engine.run_retry_pass().await?;
    msg_info!(Message::ProcessingComplete(counters.processed, counters.blocked, counters.skipped, counters.errored));

    if interrupted.load(Ordering::SeqCst) {
        anyhow::bail!("{}", Message::OperationCancelled);
    }
    Ok(())
}
