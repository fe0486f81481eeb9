//! SQLite-backed storage.
//!
//! Provides persistent storage for:
//! - Key-value entries holding all progression state
//! - Completed meditation sessions, for statistics

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::kv::KvStore;
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub meditated_secs: u64,
    pub ego_earned: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_meditated_secs: u64,
    pub total_ego_earned: u64,
    pub today_sessions: u64,
    pub today_meditated_secs: u64,
    pub today_ego_earned: u64,
}

/// SQLite database for progression state and session history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/egotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join("egotimer.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                meditated_secs INTEGER NOT NULL,
                ego_earned     INTEGER NOT NULL,
                started_at     TEXT NOT NULL,
                completed_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
        )?;
        Ok(())
    }

    /// Record a committed meditation session.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(
        &self,
        meditated_secs: u64,
        ego_earned: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO sessions (meditated_secs, ego_earned, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                clamp_i64(meditated_secs),
                clamp_i64(ego_earned),
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meditated_secs, ego_earned, started_at, completed_at
             FROM sessions
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, secs, ego, started, completed) = row?;
            out.push(SessionRecord {
                id,
                meditated_secs: secs.max(0) as u64,
                ego_earned: ego.max(0) as u64,
                started_at: parse_ts(&started),
                completed_at: parse_ts(&completed),
            });
        }
        Ok(out)
    }

    /// Totals for the UTC day containing `now`.
    pub fn stats_today(&self, now: DateTime<Utc>) -> Result<Stats, StoreError> {
        let (sessions, secs, ego) = self.aggregate_since(Some(day_start(now)))?;
        Ok(Stats {
            total_sessions: sessions,
            total_meditated_secs: secs,
            total_ego_earned: ego,
            today_sessions: sessions,
            today_meditated_secs: secs,
            today_ego_earned: ego,
        })
    }

    /// All-time totals plus the UTC day containing `now`.
    pub fn stats_all(&self, now: DateTime<Utc>) -> Result<Stats, StoreError> {
        let (sessions, secs, ego) = self.aggregate_since(None)?;
        let (t_sessions, t_secs, t_ego) = self.aggregate_since(Some(day_start(now)))?;
        Ok(Stats {
            total_sessions: sessions,
            total_meditated_secs: secs,
            total_ego_earned: ego,
            today_sessions: t_sessions,
            today_meditated_secs: t_secs,
            today_ego_earned: t_ego,
        })
    }

    fn aggregate_since(&self, since: Option<String>) -> Result<(u64, u64, u64), StoreError> {
        let sql = "SELECT COUNT(*), COALESCE(SUM(meditated_secs), 0), COALESCE(SUM(ego_earned), 0)
                   FROM sessions
                   WHERE completed_at >= ?1";
        let since = since.unwrap_or_default();
        let row = self.conn.query_row(sql, params![since], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        Ok((row.0.max(0) as u64, row.1.max(0) as u64, row.2.max(0) as u64))
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn day_start(now: DateTime<Utc>) -> String {
    format!("{}T00:00:00+00:00", now.format("%Y-%m-%d"))
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn clamp_i64(v: u64) -> i64 {
    v.min(i64::MAX as u64) as i64
}
