//! Integration tests for the transactional bulk-load path.
//!
//! The central guarantee: a failing row rolls back the entire batch, so
//! partial application is never observable.

use tempfile::TempDir;
use unidb::{Backend, Database, Error, NativeType, TableSchema, Value};

fn test_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    (dir, Database::new(Backend::Sqlite, url))
}

fn row(id: i64, label: &str) -> Vec<Value> {
    vec![Value::Integer(id), Value::from(label)]
}

#[tokio::test]
async fn test_bulk_insert_commits_whole_batch() {
    let (_dir, db) = test_db();
    let schema = TableSchema::new("items")
        .column("id", NativeType::Integer)
        .column("label", NativeType::Text);
    db.create_table(&schema).await.unwrap();

    let rows = vec![row(1, "a"), row(2, "b"), row(3, "c")];
    let inserted = db.bulk_insert("items", &["id", "label"], &rows).await.unwrap();
    assert_eq!(inserted, 3);
    assert_eq!(db.count("items", None).await.unwrap(), 3);
}

#[tokio::test]
async fn test_bulk_insert_rolls_back_on_row_failure() {
    let (_dir, db) = test_db();
    // A primary key makes the second row a constraint violation.
    db.execute(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)",
        &[],
    )
    .await
    .unwrap();

    let rows = vec![row(1, "a"), row(1, "duplicate"), row(3, "c")];
    let err = db
        .bulk_insert("items", &["id", "label"], &rows)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BulkInsert { row: 1, .. }));

    // Full rollback: none of the three rows are present, including row 0
    // which had executed successfully before the failure.
    assert_eq!(db.count("items", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_bulk_insert_empty_batch_is_noop() {
    let (_dir, db) = test_db();
    // No table needed: an empty batch returns before any I/O.
    let inserted = db.bulk_insert("absent", &["id"], &[]).await.unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn test_bulk_insert_reports_progress() {
    let (_dir, db) = test_db();
    let schema = TableSchema::new("items")
        .column("id", NativeType::Integer)
        .column("label", NativeType::Text);
    db.create_table(&schema).await.unwrap();

    let rows: Vec<Vec<Value>> = (1..=250).map(|i| row(i, "x")).collect();
    let mut seen = Vec::new();
    db.bulk_insert_with_progress("items", &["id", "label"], &rows, |pct| seen.push(pct))
        .await
        .unwrap();

    // Every 100 rows, plus the final row.
    assert_eq!(seen, vec![40, 80, 100]);
    assert_eq!(db.count("items", None).await.unwrap(), 250);
}

#[tokio::test]
async fn test_bulk_insert_small_batch_reports_final_progress() {
    let (_dir, db) = test_db();
    let schema = TableSchema::new("items")
        .column("id", NativeType::Integer)
        .column("label", NativeType::Text);
    db.create_table(&schema).await.unwrap();

    let rows = vec![row(1, "a"), row(2, "b")];
    let mut seen = Vec::new();
    db.bulk_insert_with_progress("items", &["id", "label"], &rows, |pct| seen.push(pct))
        .await
        .unwrap();
    assert_eq!(seen, vec![100]);
}

#[tokio::test]
async fn test_bulk_insert_maps_nulls() {
    let (_dir, db) = test_db();
    let schema = TableSchema::new("items")
        .column("id", NativeType::Integer)
        .column("label", NativeType::Text);
    db.create_table(&schema).await.unwrap();

    let rows = vec![
        vec![Value::Integer(1), Value::Null],
        vec![Value::Integer(2), Value::from("b")],
    ];
    db.bulk_insert("items", &["id", "label"], &rows).await.unwrap();

    let result = db.select_all("items", Some("id = 1")).await.unwrap();
    assert!(result.value(0, "label").unwrap().is_null());
}

#[tokio::test]
async fn test_bulk_insert_duplicate_columns_rejected_before_io() {
    let (_dir, db) = test_db();
    let rows = vec![vec![Value::Integer(1), Value::Integer(2)]];
    let err = db.bulk_insert("items", &["id", "id"], &rows).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateParameter { .. }));
}
