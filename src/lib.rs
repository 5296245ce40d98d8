//! unidb - backend-agnostic data access for PostgreSQL, MySQL, and SQLite.
//!
//! One API surface for CRUD statements, bulk loads, and schema-driven table
//! creation against interchangeable relational engines, without callers
//! writing engine-specific SQL or parameter code.
//!
//! ```no_run
//! use unidb::{Backend, Database, Value};
//!
//! # async fn demo() -> unidb::Result<()> {
//! let db = Database::new(Backend::Sqlite, "sqlite:app.db");
//! db.insert("users", &["id", "name"], &[Value::Integer(1), Value::from("Ana")])
//!     .await?;
//! let rows = db.select_all("users", None).await?;
//! assert_eq!(rows.row_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Condition fragments and identifiers are caller-trusted raw SQL - see
//! [`sql`] for the trust boundary contract.

pub mod backend;
pub mod connection;
pub mod error;
mod executor;
pub mod models;
pub mod ops;
pub mod params;
pub mod sql;
pub mod types;

pub use backend::Backend;
pub use connection::DbConnection;
pub use error::{Error, Result};
pub use models::{ColumnDef, ColumnInfo, ResultSet, TableSchema};
pub use ops::Database;
pub use params::Param;
pub use types::{NativeType, Value};
