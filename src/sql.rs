//! SQL dialect builders.
//!
//! Pure, deterministic string construction; no I/O. Dialect differences
//! (placeholder styles, column type keywords) are isolated here.
//!
//! # Trust boundary
//!
//! Table names, column names, and condition fragments are spliced into the
//! statement text verbatim - no quoting, escaping, or validation. Condition
//! fragments are caller-trusted raw SQL; injection safety is the caller's
//! responsibility. This is a documented contract, not an oversight.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::models::TableSchema;

/// Treat empty and whitespace-only conditions as absent.
fn effective_condition(condition: Option<&str>) -> Option<&str> {
    condition.map(str::trim).filter(|c| !c.is_empty())
}

/// `INSERT INTO t (c1,c2) VALUES (p1,p2)` with dialect placeholders.
pub fn build_insert(backend: Backend, table: &str, columns: &[&str]) -> Result<String> {
    if columns.is_empty() {
        return Err(Error::invalid_schema("insert requires at least one column"));
    }
    let column_list = columns.join(",");
    let placeholders: Vec<String> = (1..=columns.len())
        .map(|i| backend.placeholder(i))
        .collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        column_list,
        placeholders.join(",")
    ))
}

/// `UPDATE t SET c1=p1,c2=p2 WHERE cond`.
///
/// An empty condition is rejected: callers wanting to update every row must
/// say so explicitly with an always-true condition.
pub fn build_update(
    backend: Backend,
    table: &str,
    columns: &[&str],
    condition: &str,
) -> Result<String> {
    if columns.is_empty() {
        return Err(Error::invalid_schema("update requires at least one column"));
    }
    let condition = effective_condition(Some(condition)).ok_or(Error::MissingCondition)?;
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{}={}", col, backend.placeholder(i + 1)))
        .collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments.join(","),
        condition
    ))
}

/// `DELETE FROM t WHERE cond`. Same condition rule as [`build_update`].
pub fn build_delete(table: &str, condition: &str) -> Result<String> {
    let condition = effective_condition(Some(condition)).ok_or(Error::MissingCondition)?;
    Ok(format!("DELETE FROM {} WHERE {}", table, condition))
}

/// `SELECT c1,c2 FROM t [WHERE cond]`.
pub fn build_select(table: &str, columns: &[&str], condition: Option<&str>) -> Result<String> {
    if columns.is_empty() {
        return Err(Error::invalid_schema("select requires at least one column"));
    }
    let mut sql = format!("SELECT {} FROM {}", columns.join(","), table);
    if let Some(cond) = effective_condition(condition) {
        sql.push_str(" WHERE ");
        sql.push_str(cond);
    }
    Ok(sql)
}

/// `SELECT * FROM t [WHERE cond]`.
pub fn build_select_all(table: &str, condition: Option<&str>) -> String {
    match effective_condition(condition) {
        Some(cond) => format!("SELECT * FROM {} WHERE {}", table, cond),
        None => format!("SELECT * FROM {}", table),
    }
}

/// `SELECT COUNT(*) FROM t [WHERE cond]`.
pub fn build_count(table: &str, condition: Option<&str>) -> String {
    match effective_condition(condition) {
        Some(cond) => format!("SELECT COUNT(*) FROM {} WHERE {}", table, cond),
        None => format!("SELECT COUNT(*) FROM {}", table),
    }
}

/// `SELECT COUNT(DISTINCT c) FROM t [WHERE cond]`.
pub fn build_count_distinct(table: &str, column: &str, condition: Option<&str>) -> String {
    match effective_condition(condition) {
        Some(cond) => format!(
            "SELECT COUNT(DISTINCT {}) FROM {} WHERE {}",
            column, table, cond
        ),
        None => format!("SELECT COUNT(DISTINCT {}) FROM {}", column, table),
    }
}

/// One CREATE TABLE statement; column clauses joined by commas, typed via
/// the dialect's type mapping.
pub fn build_create_table(backend: Backend, schema: &TableSchema) -> Result<String> {
    if schema.columns.is_empty() {
        return Err(Error::invalid_schema(
            "create table requires at least one column",
        ));
    }
    let clauses: Vec<String> = schema
        .columns
        .iter()
        .map(|col| format!("{} {}", col.name, col.kind.column_type(backend)))
        .collect();
    Ok(format!(
        "CREATE TABLE {} ({})",
        schema.name,
        clauses.join(", ")
    ))
}

/// `DROP TABLE t`.
pub fn build_drop_table(table: &str) -> String {
    format!("DROP TABLE {}", table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NativeType;

    #[test]
    fn test_build_insert_postgres_placeholders() {
        let sql = build_insert(Backend::Postgres, "users", &["id", "name"]).unwrap();
        assert_eq!(sql, "INSERT INTO users (id,name) VALUES ($1,$2)");
    }

    #[test]
    fn test_build_insert_question_placeholders() {
        for backend in [Backend::MySql, Backend::Sqlite] {
            let sql = build_insert(backend, "users", &["id", "name"]).unwrap();
            assert_eq!(sql, "INSERT INTO users (id,name) VALUES (?,?)");
        }
    }

    #[test]
    fn test_build_insert_empty_columns() {
        let err = build_insert(Backend::Sqlite, "users", &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn test_build_update() {
        let sql = build_update(Backend::Postgres, "users", &["name", "age"], "id = 1").unwrap();
        assert_eq!(sql, "UPDATE users SET name=$1,age=$2 WHERE id = 1");

        let sql = build_update(Backend::Sqlite, "users", &["name"], "id = 1").unwrap();
        assert_eq!(sql, "UPDATE users SET name=? WHERE id = 1");
    }

    #[test]
    fn test_build_update_requires_condition() {
        let err = build_update(Backend::Sqlite, "users", &["name"], "").unwrap_err();
        assert!(matches!(err, Error::MissingCondition));
        let err = build_update(Backend::Sqlite, "users", &["name"], "   ").unwrap_err();
        assert!(matches!(err, Error::MissingCondition));
    }

    #[test]
    fn test_build_delete_requires_condition() {
        assert!(matches!(
            build_delete("users", "").unwrap_err(),
            Error::MissingCondition
        ));
        assert_eq!(
            build_delete("users", "id = 3").unwrap(),
            "DELETE FROM users WHERE id = 3"
        );
    }

    #[test]
    fn test_build_select_round_trip() {
        // Table, columns, and condition must appear verbatim.
        let sql = build_select("Users", &["id", "name"], Some("age > 18")).unwrap();
        assert_eq!(sql, "SELECT id,name FROM Users WHERE age > 18");

        let sql = build_select("Users", &["id"], None).unwrap();
        assert_eq!(sql, "SELECT id FROM Users");

        // Empty condition means no filter
        let sql = build_select("Users", &["id"], Some("")).unwrap();
        assert_eq!(sql, "SELECT id FROM Users");
    }

    #[test]
    fn test_build_select_all() {
        assert_eq!(build_select_all("t", None), "SELECT * FROM t");
        assert_eq!(
            build_select_all("t", Some("x = 1")),
            "SELECT * FROM t WHERE x = 1"
        );
    }

    #[test]
    fn test_build_count() {
        assert_eq!(build_count("t", None), "SELECT COUNT(*) FROM t");
        assert_eq!(
            build_count("t", Some("x = 1")),
            "SELECT COUNT(*) FROM t WHERE x = 1"
        );
    }

    #[test]
    fn test_build_count_distinct() {
        assert_eq!(
            build_count_distinct("t", "name", None),
            "SELECT COUNT(DISTINCT name) FROM t"
        );
        assert_eq!(
            build_count_distinct("t", "name", Some("x = 1")),
            "SELECT COUNT(DISTINCT name) FROM t WHERE x = 1"
        );
    }

    #[test]
    fn test_build_create_table_per_dialect() {
        let schema = TableSchema::new("events")
            .column("id", NativeType::Integer)
            .column("at", NativeType::DateTime)
            .column("ok", NativeType::Boolean);

        assert_eq!(
            build_create_table(Backend::Postgres, &schema).unwrap(),
            "CREATE TABLE events (id BIGINT, at TIMESTAMPTZ, ok BOOLEAN)"
        );
        assert_eq!(
            build_create_table(Backend::MySql, &schema).unwrap(),
            "CREATE TABLE events (id BIGINT, at DATETIME, ok TINYINT(1))"
        );
        assert_eq!(
            build_create_table(Backend::Sqlite, &schema).unwrap(),
            "CREATE TABLE events (id INTEGER, at TEXT, ok INTEGER)"
        );
    }

    #[test]
    fn test_build_create_table_empty_columns() {
        let err = build_create_table(Backend::Sqlite, &TableSchema::new("t")).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[test]
    fn test_build_drop_table() {
        assert_eq!(build_drop_table("users"), "DROP TABLE users");
    }

    #[test]
    fn test_condition_fragments_are_verbatim() {
        // The builder performs no escaping or validation on conditions -
        // this is the documented trust boundary.
        let fragment = "name = 'O''Brien' AND id IN (SELECT id FROM other)";
        let sql = build_select_all("t", Some(fragment));
        assert!(sql.ends_with(fragment));
    }
}
