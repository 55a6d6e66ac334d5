//! History store (§4.B): durable record of every target's latest outcome
//! and every processing session, backed by the `block_history` and
//! `process_log` tables.

use crate::libs::retry_policy::{RetryPolicy, SuccessRateTracker, MAX_RETRIES};
use crate::model::{Availability, ErrorKind, HistoryStatus, Priority, Target, TargetFormat};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::str::FromStr;

/// What the engine needs to record after processing one target.
pub struct Outcome {
    pub screen_name: Option<String>,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub status: HistoryStatus,
    pub response_code: Option<u16>,
    pub error_message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub retry_count: u32,
    pub user_status: Option<String>,
}

/// Failure counts grouped three ways, for the `--stats` command.
pub struct FailureBreakdown {
    pub by_kind: Vec<(String, i64)>,
    pub by_response_code: Vec<(Option<u16>, i64)>,
    pub by_availability: Vec<(String, i64)>,
}

/// A row eligible for a retry pass.
pub struct RetryCandidate {
    pub identifier: String,
    pub format: TargetFormat,
    pub kind: ErrorKind,
    pub retry_count: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
}

fn kind_to_str(kind: ErrorKind) -> String {
    kind.to_string()
}

fn kind_from_str(s: &str) -> Option<ErrorKind> {
    match s {
        "rate_limit" => Some(ErrorKind::RateLimit),
        "auth_required" => Some(ErrorKind::AuthRequired),
        "permission_denied" => Some(ErrorKind::PermissionDenied),
        "account_restricted" => Some(ErrorKind::AccountRestricted),
        "anti_bot" => Some(ErrorKind::AntiBot),
        "ip_blocked" => Some(ErrorKind::IpBlocked),
        "header_issue" => Some(ErrorKind::HeaderIssue),
        "unknown_forbidden" => Some(ErrorKind::UnknownForbidden),
        "server_error" => Some(ErrorKind::ServerError),
        "timeout" => Some(ErrorKind::Timeout),
        "not_found" => Some(ErrorKind::NotFound),
        "relationship_conflict" => Some(ErrorKind::RelationshipConflict),
        "follow_conflict" => Some(ErrorKind::FollowConflict),
        "already_blocked" => Some(ErrorKind::AlreadyBlocked),
        "none" => Some(ErrorKind::None),
        _ => None,
    }
}

fn availability_from_str(s: &str) -> Option<Availability> {
    match s {
        "active" => Some(Availability::Active),
        "unavailable" => Some(Availability::Unavailable),
        "suspended" => Some(Availability::Suspended),
        "deactivated" => Some(Availability::Deactivated),
        "not_found" => Some(Availability::NotFound),
        _ => None,
    }
}

/// Whether a failed row with these stored columns is still worth another
/// attempt, per `RetryPolicy::should_retry`. The row never carries a
/// `Priority`, only `ErrorKind` and `Availability`; `Priority::Correctable`
/// is passed as a harmless default since the only kinds `should_retry`
/// treats differently by priority (`account_restricted`, `ip_blocked`) are
/// already excluded by `is_retryable_kind` regardless of priority.
fn retryable(kind: Option<String>, retry_count: u32, status: Option<String>) -> bool {
    let kind = match kind.and_then(|k| kind_from_str(&k)) {
        Some(k) => k,
        None => return true,
    };
    let availability = status.and_then(|s| availability_from_str(&s));
    RetryPolicy::should_retry(retry_count, availability, kind, Priority::Correctable)
}

/// Column the given target should be keyed/queried by.
fn identifier_column(target: &Target) -> &'static str {
    match target.format {
        TargetFormat::Id => "user_id",
        TargetFormat::Handle => "screen_name",
    }
}

pub struct HistoryStore<'a> {
    conn: &'a Connection,
}

impl<'a> HistoryStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn is_blocked(&self, target: &Target) -> Result<bool> {
        let column = identifier_column(target);
        let sql = format!("SELECT 1 FROM block_history WHERE {} = ?1 AND status = 'blocked' LIMIT 1", column);
        let found: Option<i64> = self.conn.query_row(&sql, params![target.value], |row| row.get(0)).optional()?;
        Ok(found.is_some())
    }

    pub fn is_permanent_failure(&self, target: &Target) -> Result<bool> {
        let column = identifier_column(target);
        let sql = format!("SELECT error_kind, retry_count, user_status FROM block_history WHERE {} = ?1 AND status = 'failed' LIMIT 1", column);
        let row: Option<(Option<String>, u32, Option<String>)> =
            self.conn.query_row(&sql, params![target.value], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?))).optional()?;
        Ok(match row {
            Some((kind, retry_count, status)) => !retryable(kind, retry_count, status),
            None => false,
        })
    }

    /// Plural form of both `is_blocked` and `is_permanent_failure`,
    /// executed in one query over the batch to avoid N+1 round trips.
    pub fn batch_permanent_failures(&self, targets: &[Target], format: TargetFormat) -> Result<HashSet<String>> {
        if targets.is_empty() {
            return Ok(HashSet::new());
        }
        let column = match format {
            TargetFormat::Id => "user_id",
            TargetFormat::Handle => "screen_name",
        };
        let placeholders = targets.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT {col}, error_kind, retry_count, user_status FROM block_history WHERE status = 'failed' AND {col} IN ({ph})",
            col = column,
            ph = placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let values: Vec<&str> = targets.iter().map(|t| t.value.as_str()).collect();
        let rows = stmt.query_map(rusqlite::params_from_iter(values), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?, row.get::<_, u32>(2)?, row.get::<_, Option<String>>(3)?))
        })?;

        let mut permanent = HashSet::new();
        for row in rows {
            let (id, kind, retry_count, status) = row?;
            if !retryable(kind, retry_count, status) {
                permanent.insert(id);
            }
        }
        Ok(permanent)
    }

    /// Upserts a terminal outcome keyed on `user_id` when known, else
    /// `screen_name`. `retry_count` is monotonic non-decreasing per target.
    pub fn record(&self, outcome: &Outcome) -> Result<()> {
        let (column, key) = match (&outcome.user_id, &outcome.screen_name) {
            (Some(id), _) => ("user_id", id.clone()),
            (None, Some(name)) => ("screen_name", name.clone()),
            (None, None) => anyhow::bail!("outcome must carry at least one identifier"),
        };

        let select_sql = format!("SELECT id, retry_count FROM block_history WHERE {} = ?1", column);
        let existing: Option<(i64, u32)> = self
            .conn
            .query_row(&select_sql, params![key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let status = outcome.status.to_string();
        let kind = outcome.error_kind.map(kind_to_str);

        match existing {
            Some((id, previous_retry_count)) => {
                let retry_count = outcome.retry_count.max(previous_retry_count);
                self.conn.execute(
                    "UPDATE block_history SET
                        screen_name = COALESCE(?1, screen_name),
                        user_id = COALESCE(?2, user_id),
                        display_name = COALESCE(?3, display_name),
                        blocked_at = CASE WHEN ?4 = 'blocked' THEN CURRENT_TIMESTAMP ELSE blocked_at END,
                        status = ?4,
                        response_code = ?5,
                        error_message = ?6,
                        error_kind = ?7,
                        retry_count = ?8,
                        last_retry_at = CURRENT_TIMESTAMP,
                        user_status = ?9
                    WHERE id = ?10",
                    params![
                        outcome.screen_name,
                        outcome.user_id,
                        outcome.display_name,
                        status,
                        outcome.response_code,
                        outcome.error_message,
                        kind,
                        retry_count,
                        outcome.user_status,
                        id
                    ],
                )?;
            }
            None => {
                self.conn.execute(
                    "INSERT INTO block_history
                        (screen_name, user_id, display_name, blocked_at, status, response_code, error_message, error_kind, retry_count, last_retry_at, user_status)
                    VALUES (?1, ?2, ?3, CASE WHEN ?4 = 'blocked' THEN CURRENT_TIMESTAMP ELSE NULL END, ?4, ?5, ?6, ?7, ?8, CURRENT_TIMESTAMP, ?9)",
                    params![
                        outcome.screen_name,
                        outcome.user_id,
                        outcome.display_name,
                        status,
                        outcome.response_code,
                        outcome.error_message,
                        kind,
                        outcome.retry_count,
                        outcome.user_status
                    ],
                )?;
            }
        }
        Ok(())
    }

    /// Rows eligible for a retry pass: failed, under the attempt cap, kind
    /// retryable, and whose elapsed time since `last_retry_at` is honored
    /// by the caller against the policy's delay.
    pub fn retry_candidates(&self) -> Result<Vec<RetryCandidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(user_id, screen_name), user_id, error_kind, retry_count, last_retry_at, user_status
             FROM block_history
             WHERE status = 'failed' AND retry_count < ?1",
        )?;

        let rows = stmt.query_map(params![MAX_RETRIES], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (identifier, user_id, kind_str, retry_count, last_retry_at, status_str) = row?;
            let kind = match kind_str.and_then(|k| kind_from_str(&k)) {
                Some(k) => k,
                None => continue,
            };
            let availability = status_str.and_then(|s| availability_from_str(&s));
            if !RetryPolicy::should_retry(retry_count, availability, kind, Priority::Correctable) {
                continue;
            }
            let format = if user_id.is_some() { TargetFormat::Id } else { TargetFormat::Handle };
            let last_retry_at = last_retry_at.and_then(|s| DateTime::parse_from_rfc3339(&s).ok().map(|d| d.with_timezone(&Utc)));

            candidates.push(RetryCandidate { identifier, format, kind, retry_count, last_retry_at });
        }
        Ok(candidates)
    }

    /// Whether enough time has elapsed since `last_retry_at` for this
    /// candidate to be attempted again, per the policy's delay formula.
    pub fn is_due(candidate: &RetryCandidate, tracker: &SuccessRateTracker) -> bool {
        let delay = RetryPolicy::delay_seconds(candidate.kind, candidate.retry_count, tracker, None);
        match candidate.last_retry_at {
            None => true,
            Some(last) => {
                let elapsed = (Utc::now() - last).num_seconds();
                elapsed as f64 >= delay
            }
        }
    }

    pub fn start_session(&self, total: usize) -> Result<i64> {
        self.conn.execute("INSERT INTO process_log (total) VALUES (?1)", params![total as i64])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_session(&self, id: i64, processed: usize, blocked: usize, skipped: usize, errored: usize) -> Result<()> {
        self.conn.execute(
            "UPDATE process_log SET processed = ?1, blocked = ?2, skipped = ?3, errored = ?4 WHERE id = ?5",
            params![processed as i64, blocked as i64, skipped as i64, errored as i64, id],
        )?;
        Ok(())
    }

    pub fn complete_session(&self, id: i64) -> Result<()> {
        self.conn.execute("UPDATE process_log SET complete = 1, completed_at = CURRENT_TIMESTAMP WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Aggregate counts by error kind, response code, and availability, for
    /// the `--stats` command.
    pub fn failure_breakdown(&self) -> Result<FailureBreakdown> {
        let mut kind_stmt = self.conn.prepare(
            "SELECT COALESCE(error_kind, 'unknown'), COUNT(*) FROM block_history WHERE status = 'failed' GROUP BY error_kind ORDER BY COUNT(*) DESC",
        )?;
        let by_kind = kind_stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?.collect::<Result<Vec<_>, _>>()?;

        let mut code_stmt = self
            .conn
            .prepare("SELECT response_code, COUNT(*) FROM block_history WHERE status = 'failed' GROUP BY response_code ORDER BY COUNT(*) DESC")?;
        let by_response_code = code_stmt
            .query_map([], |row| Ok((row.get::<_, Option<i64>>(0)?.map(|c| c as u16), row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut status_stmt = self.conn.prepare(
            "SELECT COALESCE(user_status, 'unknown'), COUNT(*) FROM block_history WHERE status = 'failed' GROUP BY user_status ORDER BY COUNT(*) DESC",
        )?;
        let by_availability = status_stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?.collect::<Result<Vec<_>, _>>()?;

        Ok(FailureBreakdown { by_kind, by_response_code, by_availability })
    }

    /// Resets `retry_count` to zero for every failed row, for `--reset-retry`.
    pub fn reset_retry_counts(&self) -> Result<usize> {
        let n = self.conn.execute("UPDATE block_history SET retry_count = 0, last_retry_at = NULL WHERE status = 'failed'", [])?;
        Ok(n)
    }

    /// Clears error fields on every failed row while keeping the rows, for `--clear-errors`.
    pub fn clear_errors(&self) -> Result<usize> {
        let n = self
            .conn
            .execute("UPDATE block_history SET error_message = NULL, error_kind = NULL, response_code = NULL WHERE status = 'failed'", [])?;
        Ok(n)
    }

    /// Deletes every failed row outright, for `--reset-failed`.
    pub fn delete_failed(&self) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM block_history WHERE status = 'failed'", [])?;
        Ok(n)
    }

    pub fn counts(&self) -> Result<(i64, i64)> {
        let blocked: i64 = self.conn.query_row("SELECT COUNT(*) FROM block_history WHERE status = 'blocked'", [], |r| r.get(0))?;
        let failed: i64 = self.conn.query_row("SELECT COUNT(*) FROM block_history WHERE status = 'failed'", [], |r| r.get(0))?;
        Ok((blocked, failed))
    }
}

impl FromStr for ErrorKind {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        kind_from_str(s).ok_or(())
    }
}
