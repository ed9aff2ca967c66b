//! SQLite snapshot log.
//!
//! Persists the append-only history of item snapshots in a single table:
//! - snapshots: item_id, parent_id, kind, url, size_bytes, update_time
//!
//! Supports:
//! - Appending single records and atomic batches
//! - Current-state lookup per item (latest record wins)
//! - Half-open time-window reads for per-file history
//! - Recursive subtree closure reads for folder reconstruction

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::error::HistoryError;
use crate::model::{ItemKind, SnapshotRecord};

/// Read side of the snapshot log, as the history engine consumes it.
pub trait SnapshotSource {
    /// Most recent record for an item, `None` if the item was never logged.
    fn latest(&self, item_id: &str) -> Result<Option<SnapshotRecord>, HistoryError>;

    /// Records for one item with `update_time` in `[start, end)`, ascending.
    fn window(
        &self,
        item_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRecord>, HistoryError>;

    /// Every record ever logged for `root_id` and its transitive
    /// descendants, unbounded in time.
    fn closure(&self, root_id: &str) -> Result<Vec<SnapshotRecord>, HistoryError>;
}

/// Get the database path (~/.local/share/histree/histree.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf, HistoryError> {
    let data_dir = directories::ProjectDirs::from("", "", "histree")
        .ok_or_else(|| HistoryError::Config("could not determine data directory".to_string()))?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("histree.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id TEXT NOT NULL,
            parent_id TEXT,
            kind TEXT NOT NULL,
            url TEXT,
            size_bytes INTEGER,
            update_time INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_item_time ON snapshots(item_id, update_time)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_parent ON snapshots(parent_id)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// In-memory log, used by tests.
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Append one record to the log.
    pub fn append(&self, record: &SnapshotRecord) -> Result<(), HistoryError> {
        self.conn.execute(
            "INSERT INTO snapshots (item_id, parent_id, kind, url, size_bytes, update_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.item_id,
                record.parent_id,
                record.kind.as_str(),
                record.url,
                record.size.map(|s| i64::try_from(s).unwrap_or(i64::MAX)),
                record.update_time.timestamp_micros(),
            ],
        )?;
        Ok(())
    }

    /// Append a set of records in one transaction: either all land in the
    /// log or none do.
    pub fn append_batch(&mut self, records: &[SnapshotRecord]) -> Result<(), HistoryError> {
        let tx = self.conn.transaction()?;

        let mut stmt = tx.prepare_cached(
            "INSERT INTO snapshots (item_id, parent_id, kind, url, size_bytes, update_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for record in records {
            stmt.execute(params![
                record.item_id,
                record.parent_id,
                record.kind.as_str(),
                record.url,
                record.size.map(|s| i64::try_from(s).unwrap_or(i64::MAX)),
                record.update_time.timestamp_micros(),
            ])?;
        }

        drop(stmt);
        tx.commit()?;

        Ok(())
    }

    /// Current state of every tracked item, one row per id, ordered by id.
    pub fn list_latest(&self) -> Result<Vec<SnapshotRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, parent_id, kind, url, size_bytes, update_time
             FROM snapshots s
             WHERE id = (SELECT id FROM snapshots i
                         WHERE i.item_id = s.item_id
                         ORDER BY i.update_time DESC, i.id DESC
                         LIMIT 1)
             ORDER BY item_id ASC",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl SnapshotSource for Store {
    fn latest(&self, item_id: &str) -> Result<Option<SnapshotRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, parent_id, kind, url, size_bytes, update_time
             FROM snapshots
             WHERE item_id = ?1
             ORDER BY update_time DESC, id DESC
             LIMIT 1",
        )?;

        let mut rows = stmt.query(params![item_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(record_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn window(
        &self,
        item_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, parent_id, kind, url, size_bytes, update_time
             FROM snapshots
             WHERE item_id = ?1 AND update_time >= ?2 AND update_time < ?3
             ORDER BY update_time ASC, id ASC",
        )?;

        let records = stmt
            .query_map(
                params![item_id, bound_micros(start), bound_micros(end)],
                record_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn closure(&self, root_id: &str) -> Result<Vec<SnapshotRecord>, HistoryError> {
        // membership follows any recorded parent edge, so an item that ever
        // lived under the root contributes its whole history
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE subtree(id) AS (
                 SELECT ?1
                 UNION
                 SELECT s.item_id FROM snapshots s JOIN subtree t ON s.parent_id = t.id
             )
             SELECT item_id, parent_id, kind, url, size_bytes, update_time
             FROM snapshots
             WHERE item_id IN (SELECT id FROM subtree)
             ORDER BY update_time ASC, id ASC",
        )?;

        let records = stmt
            .query_map(params![root_id], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

// logged timestamps are whole microseconds; a bound falling between two of
// them rounds up so `>=` and `<` keep their half-open meaning at full
// precision
fn bound_micros(t: DateTime<Utc>) -> i64 {
    let floor = t.timestamp_micros();
    if t.timestamp_subsec_nanos() % 1_000 == 0 {
        floor
    } else {
        floor.saturating_add(1)
    }
}

fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<SnapshotRecord> {
    let kind_str: String = row.get(2)?;
    let kind = match kind_str.as_str() {
        "FILE" => ItemKind::File,
        "FOLDER" => ItemKind::Folder,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown item kind '{other}'").into(),
            ))
        }
    };

    let micros: i64 = row.get(5)?;
    let update_time = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Integer,
            format!("update_time out of range: {micros}").into(),
        )
    })?;

    Ok(SnapshotRecord {
        item_id: row.get(0)?,
        parent_id: row.get(1)?,
        kind,
        url: row.get(3)?,
        size: row.get::<_, Option<i64>>(4)?.map(|s| s.max(0) as u64),
        update_time,
    })
}
