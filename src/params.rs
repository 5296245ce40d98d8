//! Parameter construction and binding.
//!
//! [`bind`] turns a `(columns, values)` pair into an ordered parameter list
//! with fail-fast validation; the `bind_*_value` functions attach a [`Value`]
//! to a backend-specific query. Parameters are owned by a single operation
//! invocation and dropped when its statement completes.

use crate::error::{Error, Result};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlArguments;
use sqlx::postgres::PgArguments;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, Postgres, Sqlite};
use std::collections::HashSet;

/// A named, typed statement parameter.
///
/// The name is `@` + column name. The driver stack binds positionally, so the
/// name serves ordering, duplicate detection, and diagnostics; with duplicate
/// names rejected, positional and named binding are equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

/// Build the parameter list for `(columns, values)`.
///
/// Fails with `ArityMismatch` when the lengths differ and
/// `DuplicateParameter` when two columns derive the same name. Output order
/// equals column order.
pub fn bind(columns: &[&str], values: &[Value]) -> Result<Vec<Param>> {
    if columns.len() != values.len() {
        return Err(Error::arity_mismatch(columns.len(), values.len()));
    }
    ensure_unique(columns)?;
    Ok(columns
        .iter()
        .zip(values)
        .map(|(col, value)| Param {
            name: format!("@{}", col),
            value: value.clone(),
        })
        .collect())
}

/// Reject column lists that would derive colliding parameter names.
pub(crate) fn ensure_unique(columns: &[&str]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for col in columns {
        if !seen.insert(*col) {
            return Err(Error::duplicate_parameter(format!("@{}", col)));
        }
    }
    Ok(())
}

/// Parameter list for a raw statement, named `@p1..@pN` by position.
pub fn positional(values: &[Value]) -> Vec<Param> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| Param {
            name: format!("@p{}", i + 1),
            value: value.clone(),
        })
        .collect()
}

/// Bind a value to a MySQL query.
pub(crate) fn bind_mysql_value<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Boolean(v) => query.bind(*v),
        Value::Integer(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Decimal(v) => query.bind(*v),
        Value::DateTime(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
    }
}

/// Bind a value to a PostgreSQL query.
pub(crate) fn bind_postgres_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Boolean(v) => query.bind(*v),
        Value::Integer(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Decimal(v) => query.bind(*v),
        Value::DateTime(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
    }
}

/// Bind a value to a SQLite query.
pub(crate) fn bind_sqlite_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Boolean(v) => query.bind(*v),
        Value::Integer(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        // SQLite has no exact decimal storage; its column affinity coerces
        // the canonical string form
        Value::Decimal(v) => query.bind(v.to_string()),
        Value::DateTime(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_names_and_order() {
        let params = bind(
            &["id", "name"],
            &[Value::Integer(1), Value::Text("Ana".into())],
        )
        .unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "@id");
        assert_eq!(params[0].value, Value::Integer(1));
        assert_eq!(params[1].name, "@name");
        assert_eq!(params[1].value, Value::Text("Ana".into()));
    }

    #[test]
    fn test_bind_arity_mismatch() {
        let err = bind(&["id", "name"], &[Value::Integer(1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::ArityMismatch {
                columns: 2,
                values: 1
            }
        ));
    }

    #[test]
    fn test_bind_duplicate_columns() {
        let err = bind(
            &["id", "id"],
            &[Value::Integer(1), Value::Integer(2)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateParameter { name } if name == "@id"));
    }

    #[test]
    fn test_bind_empty_is_empty() {
        assert!(bind(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_positional_names() {
        let params = positional(&[Value::Null, Value::Boolean(true)]);
        assert_eq!(params[0].name, "@p1");
        assert_eq!(params[1].name, "@p2");
        assert_eq!(params[0].value, Value::Null);
    }
}
