//! CRUD, upsert-by-conflict-key, retry candidates and the admin reset
//! operations on the history store.

use banqueue::db::history::{HistoryStore, Outcome};
use banqueue::db::migrations::init_with_migrations;
use banqueue::model::{ErrorKind, HistoryStatus, Target, TargetFormat};
use rusqlite::Connection;

fn open_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    init_with_migrations(&mut conn).unwrap();
    conn
}

fn failed_outcome(user_id: &str, kind: ErrorKind, retry_count: u32) -> Outcome {
    Outcome {
        screen_name: None,
        user_id: Some(user_id.to_string()),
        display_name: None,
        status: HistoryStatus::Failed,
        response_code: Some(500),
        error_message: Some("boom".to_string()),
        error_kind: Some(kind),
        retry_count,
        user_status: None,
    }
}

#[test]
fn record_then_is_blocked_round_trips() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    let outcome = Outcome {
        screen_name: None,
        user_id: Some("42".to_string()),
        display_name: Some("Someone".to_string()),
        status: HistoryStatus::Blocked,
        response_code: Some(200),
        error_message: None,
        error_kind: None,
        retry_count: 0,
        user_status: Some("active".to_string()),
    };
    history.record(&outcome).unwrap();

    let target = Target::new("42", TargetFormat::Id);
    assert!(history.is_blocked(&target).unwrap());
}

#[test]
fn record_upserts_on_user_id_conflict_key() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("7", ErrorKind::ServerError, 1)).unwrap();
    history.record(&failed_outcome("7", ErrorKind::RateLimit, 2)).unwrap();

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM block_history WHERE user_id = '7'", [], |r| r.get(0)).unwrap();
    assert_eq!(count, 1);

    let kind: String = conn.query_row("SELECT error_kind FROM block_history WHERE user_id = '7'", [], |r| r.get(0)).unwrap();
    assert_eq!(kind, "rate_limit");
}

#[test]
fn retry_count_is_monotonic_non_decreasing() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("8", ErrorKind::ServerError, 3)).unwrap();
    history.record(&failed_outcome("8", ErrorKind::ServerError, 1)).unwrap();

    let retry_count: u32 = conn.query_row("SELECT retry_count FROM block_history WHERE user_id = '8'", [], |r| r.get(0)).unwrap();
    assert_eq!(retry_count, 3);
}

#[test]
fn is_permanent_failure_checks_retryability_of_stored_kind() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("9", ErrorKind::AccountRestricted, 0)).unwrap();
    history.record(&failed_outcome("10", ErrorKind::ServerError, 0)).unwrap();

    assert!(history.is_permanent_failure(&Target::new("9", TargetFormat::Id)).unwrap());
    assert!(!history.is_permanent_failure(&Target::new("10", TargetFormat::Id)).unwrap());
}

#[test]
fn retry_candidates_excludes_exhausted_and_non_retryable_rows() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::ServerError, 0)).unwrap();
    history.record(&failed_outcome("2", ErrorKind::AccountRestricted, 0)).unwrap();
    history.record(&failed_outcome("3", ErrorKind::ServerError, 10)).unwrap();

    let candidates = history.retry_candidates().unwrap();
    let identifiers: Vec<_> = candidates.iter().map(|c| c.identifier.clone()).collect();

    assert!(identifiers.contains(&"1".to_string()));
    assert!(!identifiers.contains(&"2".to_string()));
    assert!(!identifiers.contains(&"3".to_string()));
}

#[test]
fn failure_breakdown_groups_by_error_kind() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::RateLimit, 0)).unwrap();
    history.record(&failed_outcome("2", ErrorKind::RateLimit, 0)).unwrap();
    history.record(&failed_outcome("3", ErrorKind::ServerError, 0)).unwrap();

    let breakdown = history.failure_breakdown().unwrap();
    let rate_limit = breakdown.by_kind.iter().find(|(kind, _)| kind == "rate_limit").unwrap();
    assert_eq!(rate_limit.1, 2);

    let code_500 = breakdown.by_response_code.iter().find(|(code, _)| *code == Some(500)).unwrap();
    assert_eq!(code_500.1, 3);

    let unknown_availability = breakdown.by_availability.iter().find(|(status, _)| status == "unknown").unwrap();
    assert_eq!(unknown_availability.1, 3);
}

#[test]
fn reset_retry_counts_clears_only_failed_rows() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::ServerError, 5)).unwrap();
    let n = history.reset_retry_counts().unwrap();
    assert_eq!(n, 1);

    let retry_count: u32 = conn.query_row("SELECT retry_count FROM block_history WHERE user_id = '1'", [], |r| r.get(0)).unwrap();
    assert_eq!(retry_count, 0);
}

#[test]
fn clear_errors_keeps_rows_but_drops_error_fields() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::ServerError, 2)).unwrap();
    let n = history.clear_errors().unwrap();
    assert_eq!(n, 1);

    let (kind, message): (Option<String>, Option<String>) =
        conn.query_row("SELECT error_kind, error_message FROM block_history WHERE user_id = '1'", [], |r| Ok((r.get(0)?, r.get(1)?))).unwrap();
    assert!(kind.is_none());
    assert!(message.is_none());

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM block_history WHERE user_id = '1'", [], |r| r.get(0)).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn delete_failed_removes_rows_outright() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::ServerError, 0)).unwrap();
    let n = history.delete_failed().unwrap();
    assert_eq!(n, 1);

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM block_history", [], |r| r.get(0)).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn session_lifecycle_tracks_counters() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    let id = history.start_session(10).unwrap();
    history.update_session(id, 5, 3, 1, 1).unwrap();
    history.complete_session(id).unwrap();

    let (processed, complete): (i64, bool) =
        conn.query_row("SELECT processed, complete FROM process_log WHERE id = ?1", [id], |r| Ok((r.get(0)?, r.get(1)?))).unwrap();
    assert_eq!(processed, 5);
    assert!(complete);
}

#[test]
fn counts_splits_blocked_and_failed() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history
        .record(&Outcome {
            screen_name: None,
            user_id: Some("1".to_string()),
            display_name: None,
            status: HistoryStatus::Blocked,
            response_code: Some(200),
            error_message: None,
            error_kind: None,
            retry_count: 0,
            user_status: None,
        })
        .unwrap();
    history.record(&failed_outcome("2", ErrorKind::ServerError, 0)).unwrap();

    let (blocked, failed) = history.counts().unwrap();
    assert_eq!(blocked, 1);
    assert_eq!(failed, 1);
}

#[test]
fn batch_permanent_failures_returns_only_non_retryable_ids() {
    let conn = open_db();
    let history = HistoryStore::new(&conn);

    history.record(&failed_outcome("1", ErrorKind::AccountRestricted, 0)).unwrap();
    history.record(&failed_outcome("2", ErrorKind::ServerError, 0)).unwrap();

    let targets = vec![Target::new("1", TargetFormat::Id), Target::new("2", TargetFormat::Id)];
    let permanent = history.batch_permanent_failures(&targets, TargetFormat::Id).unwrap();

    assert!(permanent.contains("1"));
    assert!(!permanent.contains("2"));
}
