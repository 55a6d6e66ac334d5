//! Schema creation and idempotency for the history database.

use banqueue::db::migrations::{get_db_version, init_with_migrations, needs_migration};
use rusqlite::Connection;

fn open_memory() -> Connection {
    Connection::open_in_memory().unwrap()
}

#[test]
fn fresh_database_reaches_latest_version() {
    let mut conn = open_memory();
    init_with_migrations(&mut conn).unwrap();

    assert_eq!(get_db_version(&conn).unwrap(), 3);
    assert!(!needs_migration(&conn).unwrap());
}

#[test]
fn running_migrations_twice_is_a_no_op() {
    let mut conn = open_memory();
    init_with_migrations(&mut conn).unwrap();
    init_with_migrations(&mut conn).unwrap();

    assert_eq!(get_db_version(&conn).unwrap(), 3);
}

#[test]
fn creates_expected_tables() {
    let mut conn = open_memory();
    init_with_migrations(&mut conn).unwrap();

    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name").unwrap();
    let names: Vec<String> = stmt.query_map([], |row| row.get(0)).unwrap().collect::<Result<_, _>>().unwrap();

    assert!(names.contains(&"block_history".to_string()));
    assert!(names.contains(&"process_log".to_string()));
    assert!(names.contains(&"migrations".to_string()));
}

#[test]
fn block_history_enforces_dual_conflict_keys() {
    let mut conn = open_memory();
    init_with_migrations(&mut conn).unwrap();

    conn.execute("INSERT INTO block_history (user_id, status) VALUES ('1', 'blocked')", []).unwrap();
    let dup = conn.execute("INSERT INTO block_history (user_id, status) VALUES ('1', 'blocked')", []);
    assert!(dup.is_err());

    conn.execute("INSERT INTO block_history (screen_name, status) VALUES ('someone', 'failed')", []).unwrap();
    let dup = conn.execute("INSERT INTO block_history (screen_name, status) VALUES ('someone', 'failed')", []);
    assert!(dup.is_err());
}
