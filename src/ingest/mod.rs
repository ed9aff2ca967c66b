//! Write paths for the snapshot log.
//!
//! Batch import mirrors an external write API: a JSON document carrying a
//! set of item states that all became effective at one shared instant. The
//! whole batch is validated up front and appended in one transaction, so a
//! single bad item keeps the entire document out of the log.
//!
//! The filesystem observer lives in `scan` and shares the same append path.

pub mod scan;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::HistoryError;
use crate::model::{ItemKind, SnapshotRecord};
use crate::store::{SnapshotSource, Store};

/// One item state inside an import document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A full import document: items plus the instant they took effect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub items: Vec<ImportItem>,
    pub update_date: DateTime<Utc>,
}

/// Parse an import document. Malformed JSON or a shape mismatch is a
/// caller problem, not a storage one.
pub fn parse_batch(json: &str) -> Result<ImportBatch, HistoryError> {
    serde_json::from_str(json)
        .map_err(|e| HistoryError::Validation(format!("malformed batch: {e}")))
}

/// Validate and append a batch. Returns the number of records appended;
/// on any validation failure nothing is written.
pub fn import_batch(store: &mut Store, batch: &ImportBatch) -> Result<usize, HistoryError> {
    let records = validate_batch(store, batch)?;
    store.append_batch(&records)?;
    Ok(records.len())
}

/// Check batch invariants against the batch itself and the log's current
/// state, and lower valid items to log records sharing the batch instant.
///
/// A named parent must already be known as a folder, either from an earlier
/// item in the same batch or from the parent's current state in the log.
pub fn validate_batch<S: SnapshotSource + ?Sized>(
    source: &S,
    batch: &ImportBatch,
) -> Result<Vec<SnapshotRecord>, HistoryError> {
    let mut kinds_in_batch: HashMap<&str, ItemKind> = HashMap::new();

    for item in &batch.items {
        if item.id.is_empty() {
            return Err(HistoryError::Validation(
                "item id must not be empty".to_string(),
            ));
        }
        if kinds_in_batch.contains_key(item.id.as_str()) {
            return Err(HistoryError::Validation(format!(
                "duplicate item id '{}' in batch",
                item.id
            )));
        }

        match item.kind {
            ItemKind::File => {
                if item.size.is_none() {
                    return Err(HistoryError::Validation(format!(
                        "file '{}' must carry a size",
                        item.id
                    )));
                }
            }
            ItemKind::Folder => {
                if item.size.is_some() {
                    return Err(HistoryError::Validation(format!(
                        "folder '{}' must not carry a size",
                        item.id
                    )));
                }
                if item.url.is_some() {
                    return Err(HistoryError::Validation(format!(
                        "folder '{}' must not carry a url",
                        item.id
                    )));
                }
            }
        }

        if let Some(parent) = item.parent_id.as_deref() {
            if parent == item.id {
                return Err(HistoryError::Validation(format!(
                    "item '{}' cannot be its own parent",
                    item.id
                )));
            }

            let parent_kind = match kinds_in_batch.get(parent) {
                Some(&kind) => Some(kind),
                None => source.latest(parent)?.map(|r| r.kind),
            };

            match parent_kind {
                Some(ItemKind::Folder) => {}
                Some(ItemKind::File) => {
                    return Err(HistoryError::Validation(format!(
                        "parent '{parent}' of '{}' is a file",
                        item.id
                    )));
                }
                None => {
                    return Err(HistoryError::Validation(format!(
                        "parent '{parent}' of '{}' is unknown",
                        item.id
                    )));
                }
            }
        }

        kinds_in_batch.insert(item.id.as_str(), item.kind);
    }

    Ok(batch
        .items
        .iter()
        .map(|item| SnapshotRecord {
            item_id: item.id.clone(),
            parent_id: item.parent_id.clone(),
            kind: item.kind,
            url: item.url.clone(),
            size: item.size,
            update_time: batch.update_date,
        })
        .collect())
}
