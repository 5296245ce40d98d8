//! Integration tests for schema-driven table creation and the existence
//! probe.

use tempfile::TempDir;
use unidb::{Backend, Database, Error, NativeType, TableSchema, Value};

fn test_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.db").display());
    (dir, Database::new(Backend::Sqlite, url))
}

fn users_schema() -> TableSchema {
    TableSchema::new("users")
        .column("id", NativeType::Integer)
        .column("name", NativeType::Text)
}

#[tokio::test]
async fn test_create_table_then_exists() {
    let (_dir, db) = test_db();
    assert!(!db.table_exists("users").await);

    db.create_table(&users_schema()).await.unwrap();
    assert!(db.table_exists("users").await);
}

#[tokio::test]
async fn test_create_table_drops_existing_rows() {
    let (_dir, db) = test_db();
    db.create_table(&users_schema()).await.unwrap();
    db.insert(
        "users",
        &["id", "name"],
        &[Value::Integer(1), Value::from("Ana")],
    )
    .await
    .unwrap();
    assert_eq!(db.count("users", None).await.unwrap(), 1);

    // Recreating is destructive: drop first, then create.
    db.create_table(&users_schema()).await.unwrap();
    assert!(db.table_exists("users").await);
    assert_eq!(db.count("users", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_table_with_all_scalar_kinds() {
    let (_dir, db) = test_db();
    let schema = TableSchema::new("samples")
        .column("id", NativeType::Integer)
        .column("amount", NativeType::Decimal)
        .column("ratio", NativeType::Float)
        .column("seen_at", NativeType::DateTime)
        .column("ok", NativeType::Boolean)
        .column("note", NativeType::Text);
    db.create_table(&schema).await.unwrap();
    assert!(db.table_exists("samples").await);
}

#[tokio::test]
async fn test_create_table_rejects_empty_schema() {
    // Validation fires before any connection: the URL is unreachable.
    let db = Database::new(Backend::Sqlite, "sqlite:/nonexistent-dir/na/na.db");
    let err = db.create_table(&TableSchema::new("t")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSchema { .. }));
}

#[tokio::test]
async fn test_table_exists_is_false_for_missing_table() {
    let (_dir, db) = test_db();
    db.create_table(&users_schema()).await.unwrap();
    assert!(!db.table_exists("no_such_table").await);
}

#[tokio::test]
async fn test_ping() {
    let (_dir, db) = test_db();
    db.ping().await.unwrap();

    let dead = Database::new(Backend::Sqlite, "sqlite:/nonexistent-dir/na/na.db");
    assert!(dead.ping().await.is_err());
}
