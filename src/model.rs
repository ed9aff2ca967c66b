use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    File,
    Folder,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::File => "FILE",
            ItemKind::Folder => "FOLDER",
        }
    }
}

/// One observed item state. Records are only ever appended to the log,
/// never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(rename = "id")]
    pub item_id: String,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Meaningful only for files; folders carry no url.
    pub url: Option<String>,
    /// Present exactly when `kind` is `File`.
    pub size: Option<u64>,
    pub update_time: DateTime<Utc>,
}

/// Resolved state of the queried item at one instant. For folders, `size`
/// is the aggregate over descendant files and is absent when none existed
/// at that instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryUnit {
    #[serde(rename = "id")]
    pub item_id: String,
    pub url: Option<String>,
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub size: Option<u64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryUnit>,
}
