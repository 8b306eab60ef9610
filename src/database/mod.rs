//! SQLite persistence for discovered pools.

mod pools;

use std::sync::{ Arc, Mutex };
use std::time::Duration;

use anyhow::{ Context, Result };
use rusqlite::Connection;

use crate::logger::Logger;

/// Shared handle to the SQLite store.
///
/// Connection access is serialized behind a mutex; the discovery
/// pipeline writes from a single task, so contention is not a concern.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Configure connection pragmas for durability and lock tolerance.
fn configure_connection(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_row| Ok(()))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(30_000))?;
    Ok(())
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(||
            format!("Failed to open database: {}", path)
        )?;
        configure_connection(&conn).context("Failed to configure database connection")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pools (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pool_address TEXT UNIQUE,
                signature TEXT,
                coin_mint TEXT,
                token_symbol TEXT,
                pair_symbol TEXT,
                timestamp TEXT,
                discovery_time TEXT,
                slot INTEGER
            )",
            []
        ).context("Failed to create pools table")?;

        Logger::database(&format!("Database initialized: {}", path));

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}
