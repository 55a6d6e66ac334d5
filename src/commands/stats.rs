//! `--stats`: prints blocked/failed totals plus the failure breakdown by
//! error kind, response code, and availability.

use super::Cli;
use crate::db::db::Db;
use crate::db::history::HistoryStore;
use crate::msg_print;
use anyhow::Result;

pub async fn run(cli: &Cli) -> Result<()> {
    let db = Db::open(super::resolve_db_path(cli)?)?;
    let history = HistoryStore::new(&db.conn);
    let (blocked, failed) = history.counts()?;
    msg_print!(format!("blocked: {}", blocked));
    msg_print!(format!("failed: {}", failed));

    let breakdown = history.failure_breakdown()?;

    if !breakdown.by_kind.is_empty() {
        msg_print!("by kind:".to_string());
        for (kind, count) in breakdown.by_kind {
            msg_print!(format!("  {}: {}", kind, count));
        }
    }

    if !breakdown.by_response_code.is_empty() {
        msg_print!("by response code:".to_string());
        for (code, count) in breakdown.by_response_code {
            let label = code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
            msg_print!(format!("  {}: {}", label, count));
        }
    }

    if !breakdown.by_availability.is_empty() {
        msg_print!("by availability:".to_string());
        for (availability, count) in breakdown.by_availability {
            msg_print!(format!("  {}: {}", availability, count));
        }
    }

    Ok(())
}
