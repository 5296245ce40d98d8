//! Error types for unidb.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Caller-input errors (`InvalidSchema`, `ArityMismatch`,
//! `DuplicateParameter`, `MissingCondition`) are raised before any I/O is
//! attempted; driver errors keep the underlying cause attached.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported backend: '{name}' (expected postgres, mysql, or sqlite)")]
    UnsupportedBackend { name: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("parameter arity mismatch: {columns} columns but {values} values")]
    ArityMismatch { columns: usize, values: usize },

    #[error("duplicate parameter: {name}")]
    DuplicateParameter { name: String },

    #[error("condition required: an unconditional mass update/delete is rejected; pass an always-true condition to affect all rows")]
    MissingCondition,

    #[error("connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("execution failed: {0}")]
    Execution(#[source] sqlx::Error),

    #[error("bulk insert failed at row {row}; transaction rolled back: {source}")]
    BulkInsert {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid scalar result: {message}")]
    InvalidScalar { message: String },
}

impl Error {
    /// Create an unsupported backend error.
    pub fn unsupported_backend(name: impl Into<String>) -> Self {
        Self::UnsupportedBackend { name: name.into() }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Create an arity mismatch error.
    pub fn arity_mismatch(columns: usize, values: usize) -> Self {
        Self::ArityMismatch { columns, values }
    }

    /// Create a duplicate parameter error.
    pub fn duplicate_parameter(name: impl Into<String>) -> Self {
        Self::DuplicateParameter { name: name.into() }
    }

    /// Wrap a driver error reported while opening a connection.
    pub fn connection(source: sqlx::Error) -> Self {
        Self::Connection(source)
    }

    /// Wrap a driver error reported while executing a statement.
    pub fn execution(source: sqlx::Error) -> Self {
        Self::Execution(source)
    }

    /// Create an invalid scalar error.
    pub fn invalid_scalar(message: impl Into<String>) -> Self {
        Self::InvalidScalar {
            message: message.into(),
        }
    }

    /// Check whether this error was raised by input validation, before any
    /// connection was opened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedBackend { .. }
                | Self::InvalidSchema { .. }
                | Self::ArityMismatch { .. }
                | Self::DuplicateParameter { .. }
                | Self::MissingCondition
        )
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;
