//! Folder subtree reconstruction across time.
//!
//! Given the full snapshot closure of a folder, replays the subtree's state
//! at every instant a change was logged anywhere inside it, newest first.
//! For each instant the engine prunes file states that did not yet exist,
//! projects the surviving records down to one per item, and re-aggregates
//! the root's size from the files present at that moment.
//!
//! Pruning is a ratchet over descending instants: once a file record is
//! newer than the instant under reconstruction it stays excluded for all
//! older instants. Folder records are never pruned, so the tree shape always
//! follows the latest known topology even when sizes are rewound.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::HistoryError;
use crate::history::size;
use crate::model::{HistoryUnit, ItemKind, SnapshotRecord};
use crate::store::SnapshotSource;

/// Reconstructed history of a folder: one unit per distinct change instant
/// inside the subtree whose date falls in `[start, end)`, newest first.
///
/// The replay holds the subtree's entire logged closure in memory, so cost
/// scales with the full history of the subtree rather than the query window.
pub fn folder_history<S: SnapshotSource + ?Sized>(
    source: &S,
    root_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<HistoryUnit>, HistoryError> {
    let closure = source.closure(root_id)?;
    Ok(reconstruct(&closure, root_id, start, end))
}

/// Pure replay over an already-fetched closure. The closure must be ordered
/// by `(update_time, append order)` ascending so ties resolve toward the
/// later-appended record.
pub fn reconstruct(
    closure: &[SnapshotRecord],
    root_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<HistoryUnit> {
    let instants: BTreeSet<DateTime<Utc>> = closure.iter().map(|r| r.update_time).collect();

    let mut excluded: HashSet<usize> = HashSet::new();
    let mut units: Vec<HistoryUnit> = Vec::new();

    for &instant in instants.iter().rev() {
        // ratchet forward: file states newer than this instant drop out
        // and stay out for every older instant
        for (idx, record) in closure.iter().enumerate() {
            if record.kind == ItemKind::File && record.update_time > instant {
                excluded.insert(idx);
            }
        }

        let projected = project_as_of(closure, &excluded);
        let children = children_index(&projected);

        let Some(&root) = projected.get(root_id) else {
            continue;
        };

        units.push(HistoryUnit {
            item_id: root.item_id.clone(),
            url: root.url.clone(),
            parent_id: root.parent_id.clone(),
            kind: root.kind,
            size: size::aggregate(root_id, &children),
            date: instant,
        });
    }

    dedup_and_filter(units, start, end)
}

/// One record per item: the latest non-excluded state, later-appended
/// records winning ties on `update_time`.
fn project_as_of<'a>(
    closure: &'a [SnapshotRecord],
    excluded: &HashSet<usize>,
) -> HashMap<&'a str, &'a SnapshotRecord> {
    let mut projected: HashMap<&str, &SnapshotRecord> = HashMap::new();

    for (idx, record) in closure.iter().enumerate() {
        if excluded.contains(&idx) {
            continue;
        }

        let keep = match projected.get(record.item_id.as_str()) {
            Some(current) => record.update_time >= current.update_time,
            None => true,
        };
        if keep {
            projected.insert(record.item_id.as_str(), record);
        }
    }

    projected
}

fn children_index<'a>(
    projected: &HashMap<&'a str, &'a SnapshotRecord>,
) -> HashMap<&'a str, Vec<&'a SnapshotRecord>> {
    let mut children: HashMap<&str, Vec<&SnapshotRecord>> = HashMap::new();

    for &record in projected.values() {
        if let Some(parent) = record.parent_id.as_deref() {
            children.entry(parent).or_default().push(record);
        }
    }

    children
}

/// Drop exact duplicate units (first occurrence wins), then keep only dates
/// inside `[start, end)`. Input order is preserved.
fn dedup_and_filter(
    units: Vec<HistoryUnit>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<HistoryUnit> {
    let mut seen: HashSet<HistoryUnit> = HashSet::new();
    let mut kept = Vec::new();

    for unit in units {
        if !seen.insert(unit.clone()) {
            continue;
        }
        if unit.date >= start && unit.date < end {
            kept.push(unit);
        }
    }

    kept
}
