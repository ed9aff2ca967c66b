//! History queries over the snapshot log.
//!
//! `get_history` is the single entry point: it validates the requested
//! window, resolves what kind of item the caller is asking about, and routes
//! to the matching strategy. Files get their raw logged states; folders get
//! their subtree reconstructed instant by instant (see `reconstruct`).
//!
//! Queries are read-only and take the log as a `SnapshotSource`, so the
//! engine can be driven by the SQLite store or by an in-memory double.

pub mod reconstruct;
pub mod size;

use chrono::{DateTime, Utc};

use crate::error::HistoryError;
use crate::model::{HistoryResponse, HistoryUnit, ItemKind};
use crate::store::SnapshotSource;

/// Resolve an item's history over the half-open window `[start, end)`.
///
/// The window must be strictly ordered, and the item must have been logged
/// at least once; both are checked before any bulk read happens.
pub fn get_history<S: SnapshotSource + ?Sized>(
    source: &S,
    item_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<HistoryResponse, HistoryError> {
    if start >= end {
        return Err(HistoryError::Validation(format!(
            "window start {start} must precede end {end}"
        )));
    }

    let current = source
        .latest(item_id)?
        .ok_or_else(|| HistoryError::NotFound(item_id.to_string()))?;

    let items = match current.kind {
        ItemKind::File => file_history(source, item_id, start, end)?,
        ItemKind::Folder => reconstruct::folder_history(source, item_id, start, end)?,
    };

    Ok(HistoryResponse { items })
}

/// Leaf projection: every in-window snapshot of the file becomes one unit
/// carrying that snapshot's own attributes and timestamp, oldest first.
fn file_history<S: SnapshotSource + ?Sized>(
    source: &S,
    item_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<HistoryUnit>, HistoryError> {
    let records = source.window(item_id, start, end)?;

    Ok(records
        .into_iter()
        .map(|record| HistoryUnit {
            item_id: record.item_id,
            url: record.url,
            parent_id: record.parent_id,
            kind: record.kind,
            size: record.size,
            date: record.update_time,
        })
        .collect())
}
