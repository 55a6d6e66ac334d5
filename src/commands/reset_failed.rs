//! `--reset-failed`: deletes every failed row outright.

use super::Cli;
use crate::db::db::Db;
use crate::db::history::HistoryStore;
use crate::msg_success;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let history = HistoryStore::new(&db.conn);
    let n = history.delete_failed()?;
    msg_success!(format!("deleted {} failed row(s)", n));
    Ok(())
}
