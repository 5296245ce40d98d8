//! Statement execution engine.
//!
//! Dispatches over [`DbConnection`] to backend-specific implementations
//! organized in submodules:
//! - `mysql`: MySQL execute/fetch/bulk operations
//! - `postgres`: PostgreSQL execute/fetch/bulk operations
//! - `sqlite`: SQLite execute/fetch/bulk operations
//!
//! Each submodule provides identical functionality adapted to the driver's
//! type system. The code structure is intentionally parallel to make
//! differences obvious.

use crate::connection::DbConnection;
use crate::error::{Error, Result};
use crate::models::ResultSet;
use crate::params::{Param, bind_mysql_value, bind_postgres_value, bind_sqlite_value};
use crate::types::{RowValues, Value};
use sqlx::{Connection, Executor, Row};
use tracing::debug;

/// Bulk-insert progress is reported every this many rows, and after the
/// final row.
const PROGRESS_EVERY: usize = 100;

/// Execute a mutating statement and return the affected-row count.
pub(crate) async fn execute(conn: &mut DbConnection, sql: &str, params: &[Param]) -> Result<u64> {
    debug!(sql = %sql, params = params.len(), "executing statement");
    match conn {
        DbConnection::MySql(c) => mysql::execute(c, sql, params).await,
        DbConnection::Postgres(c) => postgres::execute(c, sql, params).await,
        DbConnection::Sqlite(c) => sqlite::execute(c, sql, params).await,
    }
}

/// Execute a query and decode every row.
pub(crate) async fn fetch_all(
    conn: &mut DbConnection,
    sql: &str,
    params: &[Param],
) -> Result<ResultSet> {
    debug!(sql = %sql, params = params.len(), "executing query");
    match conn {
        DbConnection::MySql(c) => mysql::fetch_all(c, sql, params).await,
        DbConnection::Postgres(c) => postgres::fetch_all(c, sql, params).await,
        DbConnection::Sqlite(c) => sqlite::fetch_all(c, sql, params).await,
    }
}

/// Execute a count-style query expecting a single integer scalar.
///
/// A missing row, a NULL, or a non-integer result is `InvalidScalar`:
/// SQL `COUNT` cannot legitimately produce any of those, so they are
/// surfaced rather than folded to 0.
pub(crate) async fn fetch_scalar(
    conn: &mut DbConnection,
    sql: &str,
    params: &[Param],
) -> Result<i64> {
    debug!(sql = %sql, params = params.len(), "executing scalar query");
    match conn {
        DbConnection::MySql(c) => mysql::fetch_scalar(c, sql, params).await,
        DbConnection::Postgres(c) => postgres::fetch_scalar(c, sql, params).await,
        DbConnection::Sqlite(c) => sqlite::fetch_scalar(c, sql, params).await,
    }
}

/// Run a prepared bulk INSERT inside a single transaction.
///
/// The statement text is built once by the caller; each row rebinds the
/// parameter values. On any row failure the transaction is rolled back
/// before `BulkInsert` is returned, so partial application is never
/// observable.
pub(crate) async fn bulk_insert(
    conn: &mut DbConnection,
    sql: &str,
    rows: &[Vec<Value>],
    progress: Option<&mut (dyn FnMut(u8) + Send)>,
) -> Result<u64> {
    debug!(sql = %sql, rows = rows.len(), "bulk insert");
    match conn {
        DbConnection::MySql(c) => mysql::bulk_insert(c, sql, rows, progress).await,
        DbConnection::Postgres(c) => postgres::bulk_insert(c, sql, rows, progress).await,
        DbConnection::Sqlite(c) => sqlite::bulk_insert(c, sql, rows, progress).await,
    }
}

/// Decode rows from any backend into a ResultSet.
fn into_result_set<R: RowValues>(rows: Vec<R>) -> ResultSet {
    if rows.is_empty() {
        return ResultSet::empty();
    }
    let columns = rows[0].column_info();
    let decoded = rows.iter().map(RowValues::decode_values).collect();
    ResultSet {
        columns,
        rows: decoded,
    }
}

fn progress_due(done: usize, total: usize) -> bool {
    done % PROGRESS_EVERY == 0 || done == total
}

fn progress_percent(done: usize, total: usize) -> u8 {
    (done * 100 / total) as u8
}

// =============================================================================
// Backend-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its driver type.

mod mysql {
    use super::*;
    use sqlx::MySqlConnection;

    pub async fn execute(conn: &mut MySqlConnection, sql: &str, params: &[Param]) -> Result<u64> {
        // Parameterless statements run unprepared; some DDL cannot be prepared
        let result = if params.is_empty() {
            conn.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_mysql_value(query, &param.value);
            }
            query.execute(&mut *conn).await
        };
        result.map(|r| r.rows_affected()).map_err(Error::execution)
    }

    pub async fn fetch_all(
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<ResultSet> {
        let rows = if params.is_empty() {
            conn.fetch_all(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_mysql_value(query, &param.value);
            }
            query.fetch_all(&mut *conn).await
        };
        rows.map(into_result_set).map_err(Error::execution)
    }

    pub async fn fetch_scalar(
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<i64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_mysql_value(query, &param.value);
        }
        let row = query
            .fetch_optional(&mut *conn)
            .await
            .map_err(Error::execution)?
            .ok_or_else(|| Error::invalid_scalar("query returned no row"))?;
        let value: Option<i64> = row
            .try_get(0)
            .map_err(|e| Error::invalid_scalar(format!("non-integer scalar: {}", e)))?;
        value.ok_or_else(|| Error::invalid_scalar("null scalar where a count was expected"))
    }

    pub async fn bulk_insert(
        conn: &mut MySqlConnection,
        sql: &str,
        rows: &[Vec<Value>],
        mut progress: Option<&mut (dyn FnMut(u8) + Send)>,
    ) -> Result<u64> {
        let mut tx = conn.begin().await.map_err(Error::execution)?;
        let total = rows.len();
        let mut inserted = 0u64;
        for (i, row) in rows.iter().enumerate() {
            let mut query = sqlx::query(sql);
            for value in row {
                query = bind_mysql_value(query, value);
            }
            match query.execute(&mut *tx).await {
                Ok(done) => inserted += done.rows_affected(),
                Err(source) => {
                    if let Err(e) = tx.rollback().await {
                        debug!(error = %e, "rollback failed");
                    }
                    return Err(Error::BulkInsert { row: i, source });
                }
            }
            if let Some(ref mut callback) = progress {
                if progress_due(i + 1, total) {
                    callback(progress_percent(i + 1, total));
                }
            }
        }
        tx.commit().await.map_err(Error::execution)?;
        Ok(inserted)
    }
}

mod postgres {
    use super::*;
    use sqlx::PgConnection;

    pub async fn execute(conn: &mut PgConnection, sql: &str, params: &[Param]) -> Result<u64> {
        let result = if params.is_empty() {
            conn.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_postgres_value(query, &param.value);
            }
            query.execute(&mut *conn).await
        };
        result.map(|r| r.rows_affected()).map_err(Error::execution)
    }

    pub async fn fetch_all(
        conn: &mut PgConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<ResultSet> {
        let rows = if params.is_empty() {
            conn.fetch_all(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_postgres_value(query, &param.value);
            }
            query.fetch_all(&mut *conn).await
        };
        rows.map(into_result_set).map_err(Error::execution)
    }

    pub async fn fetch_scalar(
        conn: &mut PgConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<i64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_postgres_value(query, &param.value);
        }
        let row = query
            .fetch_optional(&mut *conn)
            .await
            .map_err(Error::execution)?
            .ok_or_else(|| Error::invalid_scalar("query returned no row"))?;
        let value: Option<i64> = row
            .try_get(0)
            .map_err(|e| Error::invalid_scalar(format!("non-integer scalar: {}", e)))?;
        value.ok_or_else(|| Error::invalid_scalar("null scalar where a count was expected"))
    }

    pub async fn bulk_insert(
        conn: &mut PgConnection,
        sql: &str,
        rows: &[Vec<Value>],
        mut progress: Option<&mut (dyn FnMut(u8) + Send)>,
    ) -> Result<u64> {
        let mut tx = conn.begin().await.map_err(Error::execution)?;
        let total = rows.len();
        let mut inserted = 0u64;
        for (i, row) in rows.iter().enumerate() {
            let mut query = sqlx::query(sql);
            for value in row {
                query = bind_postgres_value(query, value);
            }
            match query.execute(&mut *tx).await {
                Ok(done) => inserted += done.rows_affected(),
                Err(source) => {
                    if let Err(e) = tx.rollback().await {
                        debug!(error = %e, "rollback failed");
                    }
                    return Err(Error::BulkInsert { row: i, source });
                }
            }
            if let Some(ref mut callback) = progress {
                if progress_due(i + 1, total) {
                    callback(progress_percent(i + 1, total));
                }
            }
        }
        tx.commit().await.map_err(Error::execution)?;
        Ok(inserted)
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqliteConnection;

    pub async fn execute(conn: &mut SqliteConnection, sql: &str, params: &[Param]) -> Result<u64> {
        let result = if params.is_empty() {
            conn.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_sqlite_value(query, &param.value);
            }
            query.execute(&mut *conn).await
        };
        result.map(|r| r.rows_affected()).map_err(Error::execution)
    }

    pub async fn fetch_all(
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<ResultSet> {
        let rows = if params.is_empty() {
            conn.fetch_all(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_sqlite_value(query, &param.value);
            }
            query.fetch_all(&mut *conn).await
        };
        rows.map(into_result_set).map_err(Error::execution)
    }

    pub async fn fetch_scalar(
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[Param],
    ) -> Result<i64> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_sqlite_value(query, &param.value);
        }
        let row = query
            .fetch_optional(&mut *conn)
            .await
            .map_err(Error::execution)?
            .ok_or_else(|| Error::invalid_scalar("query returned no row"))?;
        let value: Option<i64> = row
            .try_get(0)
            .map_err(|e| Error::invalid_scalar(format!("non-integer scalar: {}", e)))?;
        value.ok_or_else(|| Error::invalid_scalar("null scalar where a count was expected"))
    }

    pub async fn bulk_insert(
        conn: &mut SqliteConnection,
        sql: &str,
        rows: &[Vec<Value>],
        mut progress: Option<&mut (dyn FnMut(u8) + Send)>,
    ) -> Result<u64> {
        let mut tx = conn.begin().await.map_err(Error::execution)?;
        let total = rows.len();
        let mut inserted = 0u64;
        for (i, row) in rows.iter().enumerate() {
            let mut query = sqlx::query(sql);
            for value in row {
                query = bind_sqlite_value(query, value);
            }
            match query.execute(&mut *tx).await {
                Ok(done) => inserted += done.rows_affected(),
                Err(source) => {
                    if let Err(e) = tx.rollback().await {
                        debug!(error = %e, "rollback failed");
                    }
                    return Err(Error::BulkInsert { row: i, source });
                }
            }
            if let Some(ref mut callback) = progress {
                if progress_due(i + 1, total) {
                    callback(progress_percent(i + 1, total));
                }
            }
        }
        tx.commit().await.map_err(Error::execution)?;
        Ok(inserted)
    }
}
