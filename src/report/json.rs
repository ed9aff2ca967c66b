//! JSON output for history queries.
//!
//! Serializes responses in their wire shape for scripting and piping.

use crate::model::{HistoryResponse, SnapshotRecord};

pub fn render(response: &HistoryResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| String::from("{}"))
}

pub fn render_items(records: &[SnapshotRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| String::from("[]"))
}
