//! `--debug-errors`: prints the failure breakdown by error kind.

use super::Cli;
use crate::db::db::Db;
use crate::db::history::HistoryStore;
use crate::msg_print;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let history = HistoryStore::new(&db.conn);
    let breakdown = history.failure_breakdown()?;

    if breakdown.by_kind.is_empty() {
        msg_print!("no failures recorded".to_string());
        return Ok(());
    }

    for (kind, count) in breakdown.by_kind {
        msg_print!(format!("{}: {}", kind, count));
    }
    Ok(())
}
