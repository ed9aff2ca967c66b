use chrono::{DateTime, Utc};
use tempfile::TempDir;

use histree::error::HistoryError;
use histree::history;
use histree::ingest;
use histree::model::ItemKind;
use histree::store::Store;

const BATCH_MAY_1: &str = r#"{
    "items": [
        {"id": "docs", "parentId": null, "type": "FOLDER"},
        {"id": "docs/report.pdf", "url": "/docs/report.pdf", "parentId": "docs", "type": "FILE", "size": 10}
    ],
    "updateDate": "2026-05-01T00:00:00Z"
}"#;

const BATCH_MAY_2: &str = r#"{
    "items": [
        {"id": "docs/report.pdf", "url": "/docs/report.pdf", "parentId": "docs", "type": "FILE", "size": 20}
    ],
    "updateDate": "2026-05-02T00:00:00Z"
}"#;

const BATCH_MAY_3: &str = r#"{
    "items": [
        {"id": "docs/img", "parentId": "docs", "type": "FOLDER"},
        {"id": "docs/img/logo.png", "url": "/docs/img/logo.png", "parentId": "docs/img", "type": "FILE", "size": 7}
    ],
    "updateDate": "2026-05-03T00:00:00Z"
}"#;

fn import(store: &mut Store, json: &str) {
    let batch = ingest::parse_batch(json).unwrap();
    ingest::import_batch(store, &batch).unwrap();
}

fn seeded_store() -> Store {
    let mut store = Store::open_in_memory().unwrap();
    for batch in [BATCH_MAY_1, BATCH_MAY_2, BATCH_MAY_3] {
        import(&mut store, batch);
    }
    store
}

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

#[test]
fn folder_history_replays_subtree_sizes() {
    let store = seeded_store();

    let response = history::get_history(
        &store,
        "docs",
        ts("2026-05-01T00:00:00Z"),
        ts("2026-05-04T00:00:00Z"),
    )
    .unwrap();

    let points: Vec<_> = response.items.iter().map(|u| (u.date, u.size)).collect();
    assert_eq!(
        points,
        vec![
            (ts("2026-05-03T00:00:00Z"), Some(27)),
            (ts("2026-05-02T00:00:00Z"), Some(20)),
            (ts("2026-05-01T00:00:00Z"), Some(10)),
        ]
    );
    assert!(response.items.iter().all(|u| u.kind == ItemKind::Folder));
    assert!(response.items.iter().all(|u| u.item_id == "docs"));
}

#[test]
fn file_history_lists_raw_snapshots() {
    let store = seeded_store();

    let response = history::get_history(
        &store,
        "docs/report.pdf",
        ts("2026-05-01T00:00:00Z"),
        ts("2026-05-04T00:00:00Z"),
    )
    .unwrap();

    let points: Vec<_> = response.items.iter().map(|u| (u.date, u.size)).collect();
    assert_eq!(
        points,
        vec![
            (ts("2026-05-01T00:00:00Z"), Some(10)),
            (ts("2026-05-02T00:00:00Z"), Some(20)),
        ]
    );
    assert!(response.items.iter().all(|u| u.kind == ItemKind::File));
    assert!(response
        .items
        .iter()
        .all(|u| u.url.as_deref() == Some("/docs/report.pdf")));
}

#[test]
fn window_end_is_exclusive() {
    let store = seeded_store();

    let response = history::get_history(
        &store,
        "docs",
        ts("2026-05-01T00:00:00Z"),
        ts("2026-05-03T00:00:00Z"),
    )
    .unwrap();

    assert_eq!(response.items.len(), 2);
    assert!(response
        .items
        .iter()
        .all(|u| u.date < ts("2026-05-03T00:00:00Z")));
}

#[test]
fn sub_microsecond_start_excludes_earlier_instants() {
    let store = seeded_store();
    let start = ts("2026-05-01T00:00:00Z") + chrono::Duration::nanoseconds(500);
    let end = ts("2026-05-04T00:00:00Z");

    let file = history::get_history(&store, "docs/report.pdf", start, end).unwrap();
    let file_dates: Vec<_> = file.items.iter().map(|u| u.date).collect();
    assert_eq!(file_dates, vec![ts("2026-05-02T00:00:00Z")]);

    let folder = history::get_history(&store, "docs", start, end).unwrap();
    let folder_dates: Vec<_> = folder.items.iter().map(|u| u.date).collect();
    assert_eq!(
        folder_dates,
        vec![ts("2026-05-03T00:00:00Z"), ts("2026-05-02T00:00:00Z")]
    );
}

#[test]
fn unknown_item_is_not_found() {
    let store = seeded_store();

    let err = history::get_history(
        &store,
        "ghost",
        ts("2026-05-01T00:00:00Z"),
        ts("2026-05-04T00:00:00Z"),
    )
    .unwrap_err();

    assert!(matches!(err, HistoryError::NotFound(_)));
}

#[test]
fn inverted_window_is_rejected() {
    let store = seeded_store();

    let err = history::get_history(
        &store,
        "docs",
        ts("2026-05-04T00:00:00Z"),
        ts("2026-05-01T00:00:00Z"),
    )
    .unwrap_err();

    assert!(matches!(err, HistoryError::Validation(_)));
}

#[test]
fn identical_queries_return_identical_responses() {
    let store = seeded_store();
    let window = (ts("2026-05-01T00:00:00Z"), ts("2026-05-04T00:00:00Z"));

    let first = history::get_history(&store, "docs", window.0, window.1).unwrap();
    let second = history::get_history(&store, "docs", window.0, window.1).unwrap();

    assert_eq!(first, second);
}

#[test]
fn reimporting_a_batch_changes_no_answers() {
    let mut store = seeded_store();
    let window = (ts("2026-05-01T00:00:00Z"), ts("2026-05-04T00:00:00Z"));

    let before = history::get_history(&store, "docs", window.0, window.1).unwrap();
    import(&mut store, BATCH_MAY_2);
    let after = history::get_history(&store, "docs", window.0, window.1).unwrap();

    assert_eq!(before, after);
}

#[test]
fn log_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("histree.db");

    {
        let mut store = Store::open(&db_path).unwrap();
        import(&mut store, BATCH_MAY_1);
    }

    let store = Store::open(&db_path).unwrap();
    let response = history::get_history(
        &store,
        "docs",
        ts("2026-05-01T00:00:00Z"),
        ts("2026-05-02T00:00:00Z"),
    )
    .unwrap();

    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].size, Some(10));
}

#[test]
fn items_listing_shows_current_state() {
    let store = seeded_store();

    let records = store.list_latest().unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.item_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["docs", "docs/img", "docs/img/logo.png", "docs/report.pdf"]
    );

    let report = records
        .iter()
        .find(|r| r.item_id == "docs/report.pdf")
        .unwrap();
    assert_eq!(report.size, Some(20));
    assert_eq!(report.update_time, ts("2026-05-02T00:00:00Z"));
}
