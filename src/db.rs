use crate::error::AppError;
use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::Mutex;

const SCHEMA: &str = include_str!("schema.sql");

/// Schema generation this binary understands. A database file reporting a
/// newer generation belongs to a newer build and is refused at open.
const SCHEMA_VERSION: i64 = 1;

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str, busy_timeout_ms: u32) -> Result<Self, AppError> {
        let conn = Connection::open(path).map_err(AppError::Db)?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL; PRAGMA busy_timeout={busy_timeout_ms};"
        ))
        .map_err(AppError::Db)?;
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(AppError::Db)?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, AppError> {
        let found: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(AppError::Db)?;
        if found > SCHEMA_VERSION {
            return Err(AppError::Migration(format!(
                "database reports schema version {found}, this build supports {SCHEMA_VERSION}"
            )));
        }
        conn.execute_batch(SCHEMA).map_err(AppError::Db)?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
            .map_err(AppError::Db)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, rusqlite::Error>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }

    /// Runs `f` inside an IMMEDIATE transaction. The write lock is taken up
    /// front; any error rolls the whole unit back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, AppError>,
    {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(AppError::Db)?;
        let out = f(&tx)?;
        tx.commit().map_err(AppError::Db)?;
        Ok(out)
    }
}

/// Fixed-width UTC timestamp for TEXT columns; lexicographic order matches
/// chronological order.
pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}
