//! Subtree size aggregation over a projected children index.
//!
//! Works on one instant's projection at a time: the index maps a parent id
//! to the records of its direct children, and `aggregate` folds file sizes
//! up from the leaves. `None` means the subtree holds no file descendants,
//! which renders as an absent size rather than zero.

use std::collections::{HashMap, HashSet};

use crate::model::{ItemKind, SnapshotRecord};

/// Total size of all file descendants of `node_id`, or `None` when there
/// are none. Missing index entries mean "no children".
///
/// Iterative depth-first walk; sums saturate instead of wrapping, and a
/// visited set keeps the walk finite even if the log contains a parent
/// cycle.
pub fn aggregate<'a>(
    node_id: &'a str,
    children: &HashMap<&'a str, Vec<&'a SnapshotRecord>>,
) -> Option<u64> {
    let mut total: Option<u64> = None;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![node_id];
    visited.insert(node_id);

    while let Some(folder_id) = stack.pop() {
        let Some(kids) = children.get(folder_id) else {
            continue;
        };

        for child in kids {
            match child.kind {
                ItemKind::File => {
                    let bytes = child.size.unwrap_or(0);
                    total = Some(total.unwrap_or(0).saturating_add(bytes));
                }
                ItemKind::Folder => {
                    if visited.insert(child.item_id.as_str()) {
                        stack.push(child.item_id.as_str());
                    }
                }
            }
        }
    }

    total
}
