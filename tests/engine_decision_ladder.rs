//! Decision-ladder branches that never reach the network: permanent
//! availability, unavailable accounts, existing follow relationships, and
//! accounts already blocked. These exercise `Engine` end-to-end against a
//! real history store without needing a live remote endpoint.

use banqueue::api::remote::RemoteClient;
use banqueue::db::history::HistoryStore;
use banqueue::db::migrations::init_with_migrations;
use banqueue::engine::{Engine, EngineConfig};
use banqueue::libs::cache::IdentifierCache;
use banqueue::libs::credentials::CredentialStore;
use banqueue::model::{Availability, Profile, Relationship, Target, TargetFormat};
use rusqlite::Connection;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

const OWNER: &str = "owner123";

fn write_cookie_file(path: &std::path::Path) {
    let records = serde_json::json!([
        {"name": "auth_token", "value": "abc", "domain": ".x.com"},
        {"name": "twid", "value": OWNER, "domain": ".x.com"},
    ]);
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(serde_json::to_string(&records).unwrap().as_bytes()).unwrap();
}

fn make_engine<'a>(conn: &'a Connection, cookie_path: &std::path::Path, cache_root: &std::path::Path) -> Engine<'a> {
    let client = RemoteClient::new(true, false, &[]).unwrap();
    let credentials = CredentialStore::new(cookie_path, Duration::from_secs(300));
    let config = EngineConfig { batch_size: 5, inter_slice_delay: 0, max_auth_recoveries: 3 };
    Engine::new(conn, client, credentials, cache_root.to_path_buf(), config, Arc::new(AtomicBool::new(false)))
}

fn seed_cached_user(cache_root: &std::path::Path, owner: &str, profile: Profile, relationship: Relationship) {
    let cache = IdentifierCache::new(cache_root, owner);
    cache.write_profile(&profile).unwrap();
    cache.write_relationship(&profile.id, &relationship).unwrap();
}

#[tokio::test]
async fn suspended_target_is_recorded_as_a_permanent_skip() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_with_migrations(&mut conn).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    write_cookie_file(&cookie_path);
    let cache_root = dir.path().join("cache");

    seed_cached_user(
        &cache_root,
        OWNER,
        Profile { id: "1".to_string(), handle: "suspended_user".to_string(), display_name: "Suspended".to_string(), availability: Availability::Suspended },
        Relationship::default(),
    );

    let mut engine = make_engine(&conn, &cookie_path, &cache_root);
    let targets = vec![Target::new("1", TargetFormat::Id)];
    let counters = engine.run(targets, None).await.unwrap();

    assert_eq!(counters.skipped, 1);
    assert_eq!(counters.blocked, 0);

    let history = HistoryStore::new(&conn);
    assert!(history.is_permanent_failure(&Target::new("1", TargetFormat::Id)).unwrap());
}

#[tokio::test]
async fn already_following_target_is_recorded_as_a_terminal_conflict() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_with_migrations(&mut conn).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    write_cookie_file(&cookie_path);
    let cache_root = dir.path().join("cache");

    seed_cached_user(
        &cache_root,
        OWNER,
        Profile { id: "2".to_string(), handle: "mutual".to_string(), display_name: "Mutual".to_string(), availability: Availability::Active },
        Relationship { following: true, ..Default::default() },
    );

    let mut engine = make_engine(&conn, &cookie_path, &cache_root);
    let targets = vec![Target::new("2", TargetFormat::Id)];
    let counters = engine.run(targets, None).await.unwrap();

    assert_eq!(counters.skipped, 1);
    assert_eq!(counters.blocked, 0);
}

#[tokio::test]
async fn already_blocking_target_is_recorded_as_success_without_a_network_call() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_with_migrations(&mut conn).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    write_cookie_file(&cookie_path);
    let cache_root = dir.path().join("cache");

    seed_cached_user(
        &cache_root,
        OWNER,
        Profile { id: "3".to_string(), handle: "already_blocked".to_string(), display_name: "Already Blocked".to_string(), availability: Availability::Active },
        Relationship { blocking: true, ..Default::default() },
    );

    let mut engine = make_engine(&conn, &cookie_path, &cache_root);
    let targets = vec![Target::new("3", TargetFormat::Id)];
    let counters = engine.run(targets, None).await.unwrap();

    assert_eq!(counters.blocked, 1);

    let history = HistoryStore::new(&conn);
    assert!(history.is_blocked(&Target::new("3", TargetFormat::Id)).unwrap());
}

#[tokio::test]
async fn already_blocked_targets_are_skipped_on_a_second_run() {
    let mut conn = Connection::open_in_memory().unwrap();
    init_with_migrations(&mut conn).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cookie_path = dir.path().join("cookies.json");
    write_cookie_file(&cookie_path);
    let cache_root = dir.path().join("cache");

    seed_cached_user(
        &cache_root,
        OWNER,
        Profile { id: "4".to_string(), handle: "blocking_now".to_string(), display_name: "Blocking Now".to_string(), availability: Availability::Active },
        Relationship { blocking: true, ..Default::default() },
    );

    let mut engine = make_engine(&conn, &cookie_path, &cache_root);
    let targets = vec![Target::new("4", TargetFormat::Id)];
    engine.run(targets.clone(), None).await.unwrap();

    let mut engine = make_engine(&conn, &cookie_path, &cache_root);
    let counters = engine.run(targets, None).await.unwrap();
    assert_eq!(counters.processed, 0);
}
