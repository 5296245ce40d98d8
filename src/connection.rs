//! Driver resolution and scoped connections.
//!
//! A [`DbConnection`] wraps the driver connection matching a [`Backend`].
//! Connections are opened at the start of an operation and released on every
//! exit path; this layer never pools or caches them.

use crate::backend::Backend;
use crate::error::{Error, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, MySqlConnection, PgConnection, SqliteConnection};
use std::str::FromStr;
use tracing::debug;

/// A live driver connection for one of the supported engines.
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl DbConnection {
    /// Resolve the driver for `backend` and open a connection.
    ///
    /// SQLite connections create the database file if it does not exist,
    /// matching the embedded engine's behavior.
    pub async fn connect(backend: Backend, url: &str) -> Result<Self> {
        debug!(backend = %backend, "opening connection");
        let conn = match backend {
            Backend::Postgres => DbConnection::Postgres(
                PgConnection::connect(url).await.map_err(Error::connection)?,
            ),
            Backend::MySql => DbConnection::MySql(
                MySqlConnection::connect(url)
                    .await
                    .map_err(Error::connection)?,
            ),
            Backend::Sqlite => {
                let options = SqliteConnectOptions::from_str(url)
                    .map_err(Error::connection)?
                    .create_if_missing(true);
                DbConnection::Sqlite(
                    SqliteConnection::connect_with(&options)
                        .await
                        .map_err(Error::connection)?,
                )
            }
        };
        Ok(conn)
    }

    /// The backend this connection talks to.
    pub fn backend(&self) -> Backend {
        match self {
            DbConnection::MySql(_) => Backend::MySql,
            DbConnection::Postgres(_) => Backend::Postgres,
            DbConnection::Sqlite(_) => Backend::Sqlite,
        }
    }

    /// Gracefully close the connection. Failures are logged, not propagated;
    /// dropping a connection also releases it.
    pub async fn close(self) {
        let result = match self {
            DbConnection::MySql(conn) => conn.close().await,
            DbConnection::Postgres(conn) => conn.close().await,
            DbConnection::Sqlite(conn) => conn.close().await,
        };
        if let Err(e) = result {
            debug!(error = %e, "connection close failed");
        }
    }
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DbConnection")
            .field(&self.backend())
            .finish()
    }
}
