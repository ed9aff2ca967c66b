//! Terminal table rendering for history queries.
//!
//! Formats output as fixed-width columns:
//! - History points as DATE, TYPE, SIZE, ID (newest first for folders)
//! - Tracked items as ID, TYPE, SIZE, UPDATED
//! - A closing line with the row count

use crate::model::{HistoryResponse, SnapshotRecord};
use crate::util::{format_bytes, format_time};

pub fn render(response: &HistoryResponse) -> String {
    if response.items.is_empty() {
        return String::from("No history in the requested window.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:26} {:6} {:>10}  {}\n",
        "DATE", "TYPE", "SIZE", "ID"
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for unit in &response.items {
        output.push_str(&format!(
            "{:26} {:6} {:>10}  {}\n",
            format_time(unit.date),
            unit.kind.as_str(),
            unit.size.map(format_bytes).unwrap_or_else(|| String::from("-")),
            unit.item_id,
        ));
    }

    let count = response.items.len();
    let noun = if count == 1 { "point" } else { "points" };
    output.push_str(&format!("\n{count} history {noun}\n"));

    output
}

pub fn render_items(records: &[SnapshotRecord]) -> String {
    if records.is_empty() {
        return String::from("No items tracked.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:40} {:6} {:>10}  {}\n",
        "ID", "TYPE", "SIZE", "UPDATED"
    ));
    output.push_str(&"-".repeat(86));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{:40} {:6} {:>10}  {}\n",
            truncate(&record.item_id, 40),
            record.kind.as_str(),
            record
                .size
                .map(format_bytes)
                .unwrap_or_else(|| String::from("-")),
            format_time(record.update_time),
        ));
    }

    output.push_str(&format!("\n{} items\n", records.len()));

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HistoryUnit, ItemKind};
    use chrono::{DateTime, Utc};

    fn at(micros: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(micros).unwrap()
    }

    fn unit(size: Option<u64>, t: i64) -> HistoryUnit {
        HistoryUnit {
            item_id: "docs".to_string(),
            url: None,
            parent_id: None,
            kind: ItemKind::Folder,
            size,
            date: at(t),
        }
    }

    #[test]
    fn empty_response_renders_placeholder() {
        let response = HistoryResponse { items: Vec::new() };
        assert_eq!(render(&response), "No history in the requested window.\n");
    }

    #[test]
    fn absent_size_renders_as_dash() {
        let response = HistoryResponse {
            items: vec![unit(None, 1_000)],
        };

        let output = render(&response);
        assert!(output.contains(" -  "));
        assert!(output.contains("FOLDER"));
    }

    #[test]
    fn sizes_are_humanized() {
        let response = HistoryResponse {
            items: vec![unit(Some(12 * 1024), 1_000)],
        };

        assert!(render(&response).contains("12.0 KB"));
    }

    #[test]
    fn row_count_closes_the_table() {
        let response = HistoryResponse {
            items: vec![unit(Some(1), 2_000), unit(Some(2), 1_000)],
        };

        assert!(render(&response).ends_with("\n2 history points\n"));
    }

    #[test]
    fn single_row_count_is_singular() {
        let response = HistoryResponse {
            items: vec![unit(Some(1), 1_000)],
        };

        assert!(render(&response).ends_with("\n1 history point\n"));
    }

    #[test]
    fn long_item_ids_truncate_in_listing() {
        let record = SnapshotRecord {
            item_id: "x".repeat(60),
            parent_id: None,
            kind: ItemKind::Folder,
            url: None,
            size: None,
            update_time: at(1_000),
        };

        let output = render_items(&[record]);
        assert!(output.contains(&format!("{}...", "x".repeat(37))));
    }

    #[test]
    fn empty_listing_renders_placeholder() {
        assert_eq!(render_items(&[]), "No items tracked.\n");
    }
}
