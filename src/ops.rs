//! Public operation surface.
//!
//! Every operation exists in two forms that share the same internals:
//! a free function taking an explicit [`Backend`] and connection string, and
//! a method on a pre-bound [`Database`] handle. Each call validates its
//! input and builds its SQL *before* touching the network, then opens a
//! scoped connection that is released on every exit path. Connections are
//! never held across calls and never pooled.
//!
//! Table names, column names, and condition fragments are spliced into SQL
//! verbatim - see the trust boundary note in [`crate::sql`].

use crate::backend::Backend;
use crate::connection::DbConnection;
use crate::error::{Error, Result};
use crate::executor;
use crate::models::{ResultSet, TableSchema};
use crate::params;
use crate::sql;
use crate::types::Value;
use tracing::debug;

/// A database handle pre-bound to one backend and connection string.
///
/// Holds no connection and no mutable state: it is a `(Backend, String)`
/// pair, cheap to clone and safe to share across tasks. Every operation
/// opens and releases its own connection.
#[derive(Debug, Clone)]
pub struct Database {
    backend: Backend,
    url: String,
}

impl Database {
    /// Bind a backend and connection string.
    pub fn new(backend: Backend, url: impl Into<String>) -> Self {
        Self {
            backend,
            url: url.into(),
        }
    }

    /// The backend this handle targets.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Insert one row; returns the affected-row count.
    pub async fn insert(&self, table: &str, columns: &[&str], values: &[Value]) -> Result<u64> {
        insert(self.backend, &self.url, table, columns, values).await
    }

    /// Update rows matching `condition`; returns the affected-row count.
    /// Rejects an empty condition with `MissingCondition`.
    pub async fn update(
        &self,
        table: &str,
        columns: &[&str],
        values: &[Value],
        condition: &str,
    ) -> Result<u64> {
        update(self.backend, &self.url, table, columns, values, condition).await
    }

    /// Delete rows matching `condition`; returns the affected-row count.
    /// Rejects an empty condition with `MissingCondition`.
    pub async fn delete(&self, table: &str, condition: &str) -> Result<u64> {
        delete(self.backend, &self.url, table, condition).await
    }

    /// Select the given columns, in the order requested.
    pub async fn select(
        &self,
        table: &str,
        columns: &[&str],
        condition: Option<&str>,
    ) -> Result<ResultSet> {
        select(self.backend, &self.url, table, columns, condition).await
    }

    /// Select all columns.
    pub async fn select_all(&self, table: &str, condition: Option<&str>) -> Result<ResultSet> {
        select_all(self.backend, &self.url, table, condition).await
    }

    /// `COUNT(*)`, optionally filtered.
    pub async fn count(&self, table: &str, condition: Option<&str>) -> Result<i64> {
        count(self.backend, &self.url, table, condition).await
    }

    /// `COUNT(*)` with bound parameters instead of literals in the
    /// condition. The condition must use the dialect's placeholders, in
    /// the order of `param_values`; `param_names` name them for
    /// diagnostics and duplicate detection.
    pub async fn count_with_params(
        &self,
        table: &str,
        param_names: &[&str],
        param_values: &[Value],
        condition: Option<&str>,
    ) -> Result<i64> {
        count_with_params(
            self.backend,
            &self.url,
            table,
            param_names,
            param_values,
            condition,
        )
        .await
    }

    /// `COUNT(DISTINCT column)`, optionally filtered.
    pub async fn count_distinct(
        &self,
        table: &str,
        column: &str,
        condition: Option<&str>,
    ) -> Result<i64> {
        count_distinct(self.backend, &self.url, table, column, condition).await
    }

    /// Best-effort existence probe against the engine's catalog. Any probe
    /// failure, including a failed connection, reports `false`.
    pub async fn table_exists(&self, table: &str) -> bool {
        table_exists(self.backend, &self.url, table).await
    }

    /// Create a table from a schema descriptor.
    ///
    /// **Destructive**: if the table already exists it is dropped first,
    /// without confirmation. Column types come from the dialect's type
    /// mapping.
    pub async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        create_table(self.backend, &self.url, schema).await
    }

    /// Insert a batch of rows in one transaction; returns the number of
    /// rows inserted. No-op on an empty batch. On any row failure the whole
    /// transaction rolls back and `BulkInsert` is returned.
    pub async fn bulk_insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
    ) -> Result<u64> {
        bulk_insert(self.backend, &self.url, table, columns, rows).await
    }

    /// [`Database::bulk_insert`] with a progress callback, invoked with a
    /// percentage every 100 rows and after the final row. The callback is
    /// infallible and cannot affect the transaction outcome.
    pub async fn bulk_insert_with_progress<F>(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
        progress: F,
    ) -> Result<u64>
    where
        F: FnMut(u8) + Send,
    {
        bulk_insert_with_progress(self.backend, &self.url, table, columns, rows, progress).await
    }

    /// Execute a raw caller-trusted statement with positional parameters;
    /// returns the affected-row count.
    pub async fn execute(&self, statement: &str, values: &[Value]) -> Result<u64> {
        execute(self.backend, &self.url, statement, values).await
    }

    /// Run a raw caller-trusted query with positional parameters.
    pub async fn query(&self, statement: &str, values: &[Value]) -> Result<ResultSet> {
        query(self.backend, &self.url, statement, values).await
    }

    /// Connectivity check (`SELECT 1`).
    pub async fn ping(&self) -> Result<()> {
        ping(self.backend, &self.url).await
    }
}

/// Insert one row; returns the affected-row count.
pub async fn insert(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    values: &[Value],
) -> Result<u64> {
    let statement = sql::build_insert(backend, table, columns)?;
    let bound = params::bind(columns, values)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::execute(&mut conn, &statement, &bound).await;
    conn.close().await;
    result
}

/// Update rows matching `condition`; returns the affected-row count.
pub async fn update(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    values: &[Value],
    condition: &str,
) -> Result<u64> {
    let statement = sql::build_update(backend, table, columns, condition)?;
    let bound = params::bind(columns, values)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::execute(&mut conn, &statement, &bound).await;
    conn.close().await;
    result
}

/// Delete rows matching `condition`; returns the affected-row count.
pub async fn delete(backend: Backend, url: &str, table: &str, condition: &str) -> Result<u64> {
    let statement = sql::build_delete(table, condition)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::execute(&mut conn, &statement, &[]).await;
    conn.close().await;
    result
}

/// Select the given columns, in the order requested.
pub async fn select(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    condition: Option<&str>,
) -> Result<ResultSet> {
    let statement = sql::build_select(table, columns, condition)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_all(&mut conn, &statement, &[]).await;
    conn.close().await;
    result
}

/// Select all columns.
pub async fn select_all(
    backend: Backend,
    url: &str,
    table: &str,
    condition: Option<&str>,
) -> Result<ResultSet> {
    let statement = sql::build_select_all(table, condition);
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_all(&mut conn, &statement, &[]).await;
    conn.close().await;
    result
}

/// `COUNT(*)`, optionally filtered.
pub async fn count(
    backend: Backend,
    url: &str,
    table: &str,
    condition: Option<&str>,
) -> Result<i64> {
    let statement = sql::build_count(table, condition);
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_scalar(&mut conn, &statement, &[]).await;
    conn.close().await;
    result
}

/// `COUNT(*)` with bound parameters instead of literals in the condition.
pub async fn count_with_params(
    backend: Backend,
    url: &str,
    table: &str,
    param_names: &[&str],
    param_values: &[Value],
    condition: Option<&str>,
) -> Result<i64> {
    let statement = sql::build_count(table, condition);
    let bound = params::bind(param_names, param_values)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_scalar(&mut conn, &statement, &bound).await;
    conn.close().await;
    result
}

/// `COUNT(DISTINCT column)`, optionally filtered.
pub async fn count_distinct(
    backend: Backend,
    url: &str,
    table: &str,
    column: &str,
    condition: Option<&str>,
) -> Result<i64> {
    let statement = sql::build_count_distinct(table, column, condition);
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_scalar(&mut conn, &statement, &[]).await;
    conn.close().await;
    result
}

/// Best-effort existence probe. Any failure reports `false`.
pub async fn table_exists(backend: Backend, url: &str, table: &str) -> bool {
    match DbConnection::connect(backend, url).await {
        Ok(mut conn) => {
            let found = table_exists_on(&mut conn, table).await;
            conn.close().await;
            found
        }
        Err(e) => {
            debug!(error = %e, table = %table, "existence probe could not connect");
            false
        }
    }
}

/// Probe the catalog of an already-open connection.
async fn table_exists_on(conn: &mut DbConnection, table: &str) -> bool {
    let statement = match conn.backend() {
        Backend::Sqlite => "SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?",
        Backend::MySql => {
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?"
        }
        Backend::Postgres => {
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1"
        }
    };
    let bound = params::positional(&[Value::Text(table.to_string())]);
    match executor::fetch_scalar(conn, statement, &bound).await {
        Ok(_) => true,
        Err(e) => {
            // No row and probe failure both report false: existence checking
            // is best-effort by contract
            debug!(error = %e, table = %table, "existence probe negative");
            false
        }
    }
}

/// Create a table from a schema descriptor, dropping any existing table of
/// the same name first. **Destructive**, no confirmation.
pub async fn create_table(backend: Backend, url: &str, schema: &TableSchema) -> Result<()> {
    let create = sql::build_create_table(backend, schema)?;
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = async {
        if table_exists_on(&mut conn, &schema.name).await {
            let drop = sql::build_drop_table(&schema.name);
            executor::execute(&mut conn, &drop, &[]).await?;
        }
        executor::execute(&mut conn, &create, &[]).await?;
        Ok(())
    }
    .await;
    conn.close().await;
    result
}

/// Insert a batch of rows in one transaction.
pub async fn bulk_insert(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
) -> Result<u64> {
    bulk_insert_inner(backend, url, table, columns, rows, None).await
}

/// [`bulk_insert`] with a progress callback.
pub async fn bulk_insert_with_progress<F>(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
    mut progress: F,
) -> Result<u64>
where
    F: FnMut(u8) + Send,
{
    bulk_insert_inner(backend, url, table, columns, rows, Some(&mut progress)).await
}

async fn bulk_insert_inner(
    backend: Backend,
    url: &str,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Value>],
    progress: Option<&mut (dyn FnMut(u8) + Send)>,
) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }
    // Statement text and placeholder list are built once; each row only
    // rebinds values. All validation happens before any I/O.
    let statement = sql::build_insert(backend, table, columns)?;
    params::ensure_unique(columns)?;
    for row in rows {
        if row.len() != columns.len() {
            return Err(Error::arity_mismatch(columns.len(), row.len()));
        }
    }
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::bulk_insert(&mut conn, &statement, rows, progress).await;
    conn.close().await;
    result
}

/// Execute a raw caller-trusted statement with positional parameters.
pub async fn execute(backend: Backend, url: &str, statement: &str, values: &[Value]) -> Result<u64> {
    let bound = params::positional(values);
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::execute(&mut conn, statement, &bound).await;
    conn.close().await;
    result
}

/// Run a raw caller-trusted query with positional parameters.
pub async fn query(
    backend: Backend,
    url: &str,
    statement: &str,
    values: &[Value],
) -> Result<ResultSet> {
    let bound = params::positional(values);
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_all(&mut conn, statement, &bound).await;
    conn.close().await;
    result
}

/// Connectivity check (`SELECT 1`).
pub async fn ping(backend: Backend, url: &str) -> Result<()> {
    let mut conn = DbConnection::connect(backend, url).await?;
    let result = executor::fetch_scalar(&mut conn, "SELECT 1", &[]).await;
    conn.close().await;
    result.map(|_| ())
}
