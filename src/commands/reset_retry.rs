//! `--reset-retry`: zeroes retry_count on every failed row.

use super::Cli;
use crate::db::db::Db;
use crate::db::history::HistoryStore;
use crate::msg_success;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let history = HistoryStore::new(&db.conn);
    let n = history.reset_retry_counts()?;
    msg_success!(format!("reset retry_count on {} row(s)", n));
    Ok(())
}
