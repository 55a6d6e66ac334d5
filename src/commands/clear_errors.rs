//! `--clear-errors`: clears error fields on every failed row.

use super::Cli;
use crate::db::db::Db;
use crate::db::history::HistoryStore;
use crate::msg_success;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let history = HistoryStore::new(&db.conn);
    let n = history.clear_errors()?;
    msg_success!(format!("cleared error fields on {} row(s)", n));
    Ok(())
}
