// SQLite-backed snapshot store. Snapshots are immutable: a recomputation
// inserts a new row, and reads always take the newest row per key.

use crate::model::LeagueSnapshot;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode snapshot payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl SnapshotStore {
    /// Open (or create) the store at `path`. `:memory:` gives an
    /// in-process store for tests.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshots (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                league_id     TEXT    NOT NULL,
                season        INTEGER NOT NULL,
                week          INTEGER NOT NULL,
                calculated_at TEXT    NOT NULL,
                payload       TEXT    NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_snapshots_key
                ON snapshots (league_id, season, week, calculated_at);",
        )?;

        Ok(SnapshotStore {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a complete snapshot. Never updates existing rows.
    pub fn insert(&self, snapshot: &LeagueSnapshot) -> Result<(), StoreError> {
        let payload = serde_json::to_string(snapshot)?;
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute(
            "INSERT INTO snapshots (league_id, season, week, calculated_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                snapshot.league_id,
                snapshot.season,
                snapshot.week,
                snapshot.calculated_at.to_rfc3339(),
                payload,
            ],
        )?;
        debug!(
            league_id = %snapshot.league_id,
            season = snapshot.season,
            week = snapshot.week,
            "stored snapshot"
        );
        Ok(())
    }

    /// Fetch the newest snapshot for a (league, season, week), if any.
    pub fn latest(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
    ) -> Result<Option<LeagueSnapshot>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM snapshots
                 WHERE league_id = ?1 AND season = ?2 AND week = ?3
                 ORDER BY calculated_at DESC, id DESC
                 LIMIT 1",
                params![league_id, season, week],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Number of stored snapshots for a key. Used to verify immutability
    /// in tests and for diagnostics.
    pub fn count(&self, league_id: &str, season: u16, week: u16) -> Result<u64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM snapshots
             WHERE league_id = ?1 AND season = ?2 AND week = ?3",
            params![league_id, season, week],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
