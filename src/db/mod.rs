use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

pub mod models;
use models::{MatchOrder, MatchRecord};

use crate::error::StoreError;
use crate::league::standings::StandingsTable;

/// Boundary contract between the league core and the persistence backend.
///
/// Everything the core needs from storage goes through this trait; the
/// snapshot methods are only exercised when the standings cache is enabled.
pub trait MatchStore: Send + Sync {
    fn list_matches(
        &self,
        order: MatchOrder,
        limit: Option<u32>,
    ) -> Result<Vec<MatchRecord>, StoreError>;

    /// Assigns the id and recording timestamp.
    fn create_match(&self, home_goals: u32, away_goals: u32) -> Result<MatchRecord, StoreError>;

    /// Ok(true) if a row was removed, Ok(false) if the id was already absent.
    fn delete_match(&self, id: i64) -> Result<bool, StoreError>;

    /// Remove every stored match, returning the count purged.
    fn delete_all(&self) -> Result<usize, StoreError>;

    fn read_snapshot(&self) -> Result<Option<StandingsTable>, StoreError>;
    fn write_snapshot(&self, table: &StandingsTable) -> Result<(), StoreError>;

    fn read_admin_pin(&self) -> Result<Option<String>, StoreError>;
    fn write_admin_pin(&self, pin: &str) -> Result<(), StoreError>;
}

/// Thread-safe SQLite store (single connection with mutex).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

impl MatchStore for Database {
    fn list_matches(
        &self,
        order: MatchOrder,
        limit: Option<u32>,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        // id breaks equal-timestamp ties so the order is total
        let order_clause = match order {
            MatchOrder::OldestFirst => "recorded_at ASC, id ASC",
            MatchOrder::NewestFirst => "recorded_at DESC, id DESC",
        };
        let sql = format!(
            "SELECT id, home_goals, away_goals, recorded_at
             FROM matches ORDER BY {} LIMIT ?1",
            order_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);
        let matches = stmt
            .query_map(params![limit], map_match)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(matches)
    }

    fn create_match(&self, home_goals: u32, away_goals: u32) -> Result<MatchRecord, StoreError> {
        let conn = self.conn.lock().unwrap();
        let recorded_at = Utc::now();
        conn.execute(
            "INSERT INTO matches (home_goals, away_goals, recorded_at) VALUES (?1, ?2, ?3)",
            params![home_goals, away_goals, recorded_at],
        )?;
        Ok(MatchRecord {
            id: conn.last_insert_rowid(),
            home_goals,
            away_goals,
            recorded_at,
        })
    }

    fn delete_match(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM matches WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let purged = conn.execute("DELETE FROM matches", [])?;
        Ok(purged)
    }

    fn read_snapshot(&self) -> Result<Option<StandingsTable>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let json: Option<String> = conn
            .query_row(
                "SELECT table_json FROM standings_snapshot WHERE id = 1",
                [],
                |r| r.get(0),
            )
            .optional()?;
        let Some(json) = json else { return Ok(None) };
        match serde_json::from_str(&json) {
            Ok(table) => Ok(Some(table)),
            Err(e) => {
                // The snapshot is a cache; an unreadable row is a miss
                warn!("discarding unreadable standings snapshot: {}", e);
                Ok(None)
            }
        }
    }

    fn write_snapshot(&self, table: &StandingsTable) -> Result<(), StoreError> {
        let json = serde_json::to_string(table)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO standings_snapshot (id, table_json, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                table_json=excluded.table_json,
                updated_at=excluded.updated_at",
            params![json, Utc::now()],
        )?;
        Ok(())
    }

    fn read_admin_pin(&self) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let pin = conn
            .query_row(
                "SELECT value FROM app_config WHERE key = 'admin_pin'",
                [],
                |r| r.get(0),
            )
            .optional()?;
        Ok(pin)
    }

    fn write_admin_pin(&self, pin: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO app_config (key, value) VALUES ('admin_pin', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![pin],
        )?;
        Ok(())
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_match(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    Ok(MatchRecord {
        id: row.get(0)?,
        home_goals: row.get(1)?,
        away_goals: row.get(2)?,
        recorded_at: row.get(3)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    home_goals  INTEGER NOT NULL CHECK (home_goals >= 0),
    away_goals  INTEGER NOT NULL CHECK (away_goals >= 0),
    recorded_at TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS standings_snapshot (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    table_json  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS app_config (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_matches_recorded ON matches(recorded_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::standings::aggregate;

    fn open_test_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let db = open_test_db();
        let a = db.create_match(2, 1).unwrap();
        let b = db.create_match(0, 0).unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.home_goals, 2);
        assert_eq!(a.away_goals, 1);
    }

    #[test]
    fn list_respects_order_and_limit() {
        let db = open_test_db();
        for i in 0..5 {
            db.create_match(i, 0).unwrap();
        }
        let asc = db.list_matches(MatchOrder::OldestFirst, None).unwrap();
        let desc = db.list_matches(MatchOrder::NewestFirst, None).unwrap();
        assert_eq!(asc.len(), 5);
        assert_eq!(asc.first().unwrap().id, desc.last().unwrap().id);
        assert_eq!(asc.first().unwrap().home_goals, 0);
        assert_eq!(desc.first().unwrap().home_goals, 4);

        let limited = db.list_matches(MatchOrder::NewestFirst, Some(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].home_goals, 4);
    }

    #[test]
    fn delete_absent_is_noop() {
        let db = open_test_db();
        assert!(!db.delete_match(999).unwrap());
        let rec = db.create_match(1, 0).unwrap();
        assert!(db.delete_match(rec.id).unwrap());
        assert!(!db.delete_match(rec.id).unwrap());
    }

    #[test]
    fn delete_all_reports_count() {
        let db = open_test_db();
        for _ in 0..3 {
            db.create_match(1, 1).unwrap();
        }
        assert_eq!(db.delete_all().unwrap(), 3);
        assert!(db.list_matches(MatchOrder::OldestFirst, None).unwrap().is_empty());
        assert_eq!(db.delete_all().unwrap(), 0);
    }

    #[test]
    fn snapshot_round_trips() {
        let db = open_test_db();
        assert!(db.read_snapshot().unwrap().is_none());

        let rec = db.create_match(3, 1).unwrap();
        let table = aggregate(&[rec]);
        db.write_snapshot(&table).unwrap();
        assert_eq!(db.read_snapshot().unwrap(), Some(table));
    }

    #[test]
    fn unreadable_snapshot_is_a_cache_miss() {
        let db = open_test_db();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO standings_snapshot (id, table_json, updated_at)
                 VALUES (1, 'not json', ?1)",
                params![Utc::now()],
            )
            .unwrap();
        }
        assert!(db.read_snapshot().unwrap().is_none());
    }

    #[test]
    fn admin_pin_persists() {
        let db = open_test_db();
        assert!(db.read_admin_pin().unwrap().is_none());
        db.write_admin_pin("4321").unwrap();
        assert_eq!(db.read_admin_pin().unwrap().as_deref(), Some("4321"));
        db.write_admin_pin("1111").unwrap();
        assert_eq!(db.read_admin_pin().unwrap().as_deref(), Some("1111"));
    }
}
