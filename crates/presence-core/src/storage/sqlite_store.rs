//! SqliteStore — durable presence storage in a single SQLite file
//!
//! - WAL mode: readers never block the writer
//! - `AUTOINCREMENT` primary key: ids only grow, deleted ids stay retired
//! - Every mutation is one statement, serialized by SQLite itself

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

use super::{now, PresenceStore};
use crate::error::Result;
use crate::record::{LineStatus, NewPresence, PresencePatch, PresenceRecord, RecordId};
use crate::selector::StoreBackend;

const SELECT_COLUMNS: &str = "SELECT id, name, line_status, created_at_ms, updated_at_ms
     FROM presence_records";

/// Durable store backed by SQLite
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file. The schema is not touched; call
    /// [`PresenceStore::migrate`] before first use.
    ///
    /// ```no_run
    /// use presence_core::storage::{PresenceStore, SqliteStore};
    /// let store = SqliteStore::open("./sqlite/dev.sqlite").unwrap();
    /// store.migrate().unwrap();
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        info!("Opened SQLite database at {}", path.display());
        Self::configure(conn)
    }

    /// Private in-memory database, mostly useful in tests
    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PresenceRecord> {
        Ok(PresenceRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            status: row.get(2)?,
            created_at: millis_to_datetime(row, 3)?,
            updated_at: millis_to_datetime(row, 4)?,
        })
    }

    fn select_one(conn: &Connection, id: RecordId) -> rusqlite::Result<Option<PresenceRecord>> {
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            Self::map_row,
        )
        .optional()
    }
}

impl PresenceStore for SqliteStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    fn migrate(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS presence_records (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                name           TEXT NOT NULL CHECK (length(trim(name)) > 0),
                line_status    TEXT NOT NULL CHECK (line_status IN ('online', 'offline')),
                created_at_ms  INTEGER NOT NULL,
                updated_at_ms  INTEGER NOT NULL
            );",
        )?;
        debug!("presence_records schema in place");
        Ok(())
    }

    fn list(&self) -> Result<Vec<PresenceRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get(&self, id: RecordId) -> Result<Option<PresenceRecord>> {
        Ok(Self::select_one(&self.conn.lock(), id)?)
    }

    fn create(&self, new: NewPresence) -> Result<PresenceRecord> {
        let created_at = now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO presence_records (name, line_status, created_at_ms, updated_at_ms)
             VALUES (?1, ?2, ?3, ?3)",
            params![new.name(), new.status(), created_at.timestamp_millis()],
        )?;

        let id = conn.last_insert_rowid();
        Ok(new.into_record(id, created_at))
    }

    fn save(&self, id: RecordId, patch: &PresencePatch) -> Result<Option<PresenceRecord>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE presence_records
             SET name = COALESCE(?2, name),
                 line_status = COALESCE(?3, line_status),
                 updated_at_ms = ?4
             WHERE id = ?1",
            params![id, patch.name(), patch.status(), now().timestamp_millis()],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let record = Self::select_one(&tx, id)?;
        tx.commit()?;
        Ok(record)
    }

    fn destroy(&self, id: RecordId) -> Result<bool> {
        let deleted = self
            .conn
            .lock()
            .execute("DELETE FROM presence_records WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM presence_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ToSql for LineStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for LineStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn millis_to_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance;

    fn temp_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("in-memory SQLite should open");
        store.migrate().expect("migration should succeed");
        store
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        conformance::create_assigns_increasing_ids(&temp_store());
    }

    #[test]
    fn test_get_round_trips() {
        conformance::get_round_trips(&temp_store());
    }

    #[test]
    fn test_list_in_creation_order() {
        conformance::list_in_creation_order(&temp_store());
    }

    #[test]
    fn test_save_is_partial() {
        conformance::save_is_partial(&temp_store());
    }

    #[test]
    fn test_destroy_is_permanent() {
        conformance::destroy_is_permanent(&temp_store());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        conformance::migrate_is_idempotent(&temp_store());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("presence.sqlite");

        let created = {
            let store = SqliteStore::open(&path).unwrap();
            store.migrate().unwrap();
            store
                .create(NewPresence::new("Alice", LineStatus::Offline).unwrap())
                .unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        reopened.migrate().unwrap();
        assert_eq!(reopened.get(created.id).unwrap(), Some(created.clone()));

        // AUTOINCREMENT keeps counting across restarts, even after a delete
        assert!(reopened.destroy(created.id).unwrap());
        let next = reopened
            .create(NewPresence::new("Bob", LineStatus::Online).unwrap())
            .unwrap();
        assert!(next.id > created.id);
    }

    #[test]
    fn test_schema_rejects_unknown_status() {
        let store = temp_store();
        let result = store.conn.lock().execute(
            "INSERT INTO presence_records (name, line_status, created_at_ms, updated_at_ms)
             VALUES ('Mallory', 'away', 0, 0)",
            [],
        );
        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_unmigrated_store_reports_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list().is_err());
    }
}
