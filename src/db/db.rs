//! Core database connection management and initialization.

use crate::db::migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;

/// Standard filename for the SQLite history database.
pub const DB_FILE_NAME: &str = "banqueue.db";

/// Owns the SQLite connection backing the history store. Single-writer
/// discipline: the engine is the only writer per history file.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database at the platform default path, applying migrations.
    pub fn new() -> Result<Self> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    /// Opens the database at an explicit path (used by `--db`/`BLOCK_DB`
    /// overrides and by tests), applying migrations.
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations::init_with_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Opens a connection without applying migrations, for inspection tools.
    pub fn open_without_migrations(path: PathBuf) -> Result<Connection> {
        let conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(conn)
    }
}
