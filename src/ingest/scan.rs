//! Filesystem observer.
//!
//! Walks a directory tree and appends a record for every item whose state
//! differs from its current state in the log: unseen path, kind change,
//! file size change, or parent change. Unchanged items append nothing, so
//! repeated scans of a quiet tree leave the log untouched.
//!
//! Item ids are canonical absolute paths. Everything observed in one scan
//! shares a single timestamp. Paths that vanish between scans leave no
//! record; the log has no tombstone shape for them.

use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::HistoryError;
use crate::model::{ItemKind, SnapshotRecord};
use crate::store::{SnapshotSource, Store};

#[derive(Debug)]
pub struct ScanOutcome {
    pub appended: usize,
    pub unchanged: usize,
    pub diagnostics: Vec<String>,
}

/// Walk `root` and append one record per changed item, all sharing the
/// scan start as their timestamp. Unreadable entries are reported in
/// `diagnostics` and skipped.
pub fn scan_root(store: &mut Store, root: &Path) -> Result<ScanOutcome, HistoryError> {
    let scanned_at = Utc::now();
    let root = std::fs::canonicalize(root)?;

    let mut records = Vec::new();
    let mut diagnostics = Vec::new();
    let mut unchanged = 0usize;

    for entry in WalkDir::new(&root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                diagnostics.push(format!("skipped unreadable entry: {err}"));
                continue;
            }
        };

        let observed = match observe(&root, &entry, scanned_at) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(err) => {
                diagnostics.push(format!("skipped {}: {err}", entry.path().display()));
                continue;
            }
        };

        if changed(store, &observed)? {
            records.push(observed);
        } else {
            unchanged += 1;
        }
    }

    store.append_batch(&records)?;

    Ok(ScanOutcome {
        appended: records.len(),
        unchanged,
        diagnostics,
    })
}

/// Lower one directory entry to a record. Non-file, non-directory entries
/// (sockets, dangling symlinks) are ignored.
fn observe(
    root: &Path,
    entry: &walkdir::DirEntry,
    scanned_at: DateTime<Utc>,
) -> Result<Option<SnapshotRecord>, walkdir::Error> {
    let path = entry.path();
    let item_id = path.to_string_lossy().into_owned();
    let parent_id = if path == root {
        None
    } else {
        path.parent().map(|p| p.to_string_lossy().into_owned())
    };

    let file_type = entry.file_type();
    if file_type.is_dir() {
        Ok(Some(SnapshotRecord {
            item_id,
            parent_id,
            kind: ItemKind::Folder,
            url: None,
            size: None,
            update_time: scanned_at,
        }))
    } else if file_type.is_file() {
        let metadata = entry.metadata()?;
        let url = item_id.clone();
        Ok(Some(SnapshotRecord {
            item_id,
            parent_id,
            kind: ItemKind::File,
            url: Some(url),
            size: Some(metadata.len()),
            update_time: scanned_at,
        }))
    } else {
        Ok(None)
    }
}

fn changed(store: &Store, observed: &SnapshotRecord) -> Result<bool, HistoryError> {
    let Some(current) = store.latest(&observed.item_id)? else {
        return Ok(true);
    };

    Ok(current.kind != observed.kind
        || current.parent_id != observed.parent_id
        || (observed.kind == ItemKind::File && current.size != observed.size))
}
