//! Native scalar types and backend-agnostic value handling.
//!
//! This module provides the closed set of native scalar kinds understood by
//! the layer, the unified [`Value`] type used for parameter binding and
//! result extraction, and the per-backend row decoders.
//!
//! # Architecture
//!
//! Conversion uses a two-phase approach:
//! 1. [`categorize`] classifies a reported column type into a [`NativeType`]
//! 2. Backend-specific decoders handle the actual value extraction
//!
//! The `NativeType -> column type keyword` mapping is a total match per
//! backend, so an unmapped type is a compile error rather than a runtime one.

use crate::backend::Backend;
use crate::models::ColumnInfo;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo};

// =============================================================================
// Native Scalar Kinds
// =============================================================================

/// Closed set of native scalar kinds accepted by the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeType {
    Integer,
    Decimal,
    Float,
    DateTime,
    Boolean,
    Text,
}

impl NativeType {
    /// All scalar kinds, in a fixed order.
    pub const ALL: [NativeType; 6] = [
        NativeType::Integer,
        NativeType::Decimal,
        NativeType::Float,
        NativeType::DateTime,
        NativeType::Boolean,
        NativeType::Text,
    ];

    /// Column type keyword for CREATE TABLE in the given backend's dialect.
    ///
    /// SQLite has no dedicated boolean or date/time storage classes:
    /// Boolean folds to INTEGER and DateTime to TEXT.
    pub fn column_type(&self, backend: Backend) -> &'static str {
        match backend {
            Backend::Postgres => match self {
                NativeType::Integer => "BIGINT",
                NativeType::Decimal => "NUMERIC",
                NativeType::Float => "DOUBLE PRECISION",
                NativeType::DateTime => "TIMESTAMPTZ",
                NativeType::Boolean => "BOOLEAN",
                NativeType::Text => "TEXT",
            },
            Backend::MySql => match self {
                NativeType::Integer => "BIGINT",
                NativeType::Decimal => "DECIMAL(38,10)",
                NativeType::Float => "DOUBLE",
                NativeType::DateTime => "DATETIME",
                NativeType::Boolean => "TINYINT(1)",
                NativeType::Text => "TEXT",
            },
            Backend::Sqlite => match self {
                NativeType::Integer => "INTEGER",
                NativeType::Decimal => "REAL",
                NativeType::Float => "REAL",
                NativeType::DateTime => "TEXT",
                NativeType::Boolean => "INTEGER",
                NativeType::Text => "TEXT",
            },
        }
    }
}

/// Classify a column type name reported by the driver into a scalar kind.
///
/// Unrecognized names fall back to [`NativeType::Text`]. SQLite's NUMERIC
/// affinity is a float, not an exact decimal.
pub(crate) fn categorize(type_name: &str, backend: Backend) -> NativeType {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric first - "numeric" would otherwise never match
    if lower.contains("decimal") || lower.contains("numeric") {
        if backend == Backend::Sqlite {
            return NativeType::Float;
        }
        return NativeType::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return NativeType::Boolean;
    }

    if lower.contains("int") || lower.contains("serial") {
        return NativeType::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return NativeType::Float;
    }

    if lower.contains("timestamp") || lower == "datetime" {
        return NativeType::DateTime;
    }

    NativeType::Text
}

// =============================================================================
// Values
// =============================================================================

/// A native scalar value, including the null marker.
///
/// Values are supplied positionally: `columns[i]` always corresponds to
/// `values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL marker
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (stored as i64 for maximum range)
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Exact decimal value
    Decimal(Decimal),
    /// Date/time value (UTC)
    DateTime(DateTime<Utc>),
    /// Text value
    Text(String),
}

impl Value {
    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Infer the scalar kind of this value. `Null` defaults to Text.
    pub fn kind(&self) -> NativeType {
        match self {
            Self::Null => NativeType::Text,
            Self::Boolean(_) => NativeType::Boolean,
            Self::Integer(_) => NativeType::Integer,
            Self::Float(_) => NativeType::Float,
            Self::Decimal(_) => NativeType::Decimal,
            Self::DateTime(_) => NativeType::DateTime,
            Self::Text(_) => NativeType::Text,
        }
    }

    /// Convert to a boolean if possible. Integers map 0/nonzero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Convert to an i64 if possible.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Convert to an f64 if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the text content if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a UTC date/time if possible. Text values are parsed as
    /// RFC 3339 (the form the embedded engine stores).
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Trait for converting driver rows into ordered value sequences.
pub trait RowValues {
    fn column_info(&self) -> Vec<ColumnInfo>;
    fn decode_values(&self) -> Vec<Value>;
}

impl RowValues for MySqlRow {
    fn column_info(&self) -> Vec<ColumnInfo> {
        self.columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect()
    }

    fn decode_values(&self) -> Vec<Value> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize(col.type_info().name(), Backend::MySql);
                mysql::decode_column(self, idx, category)
            })
            .collect()
    }
}

impl RowValues for PgRow {
    fn column_info(&self) -> Vec<ColumnInfo> {
        self.columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect()
    }

    fn decode_values(&self) -> Vec<Value> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize(col.type_info().name(), Backend::Postgres);
                postgres::decode_column(self, idx, category)
            })
            .collect()
    }
}

impl RowValues for SqliteRow {
    fn column_info(&self) -> Vec<ColumnInfo> {
        self.columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect()
    }

    fn decode_values(&self) -> Vec<Value> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize(col.type_info().name(), Backend::Sqlite);
                sqlite::decode_column(self, idx, category)
            })
            .collect()
    }
}

// =============================================================================
// Backend-Specific Decoders
// =============================================================================
//
// Each module below provides the same interface adapted to its driver's type
// system. The structure is intentionally parallel to make differences obvious.

mod mysql {
    use super::*;

    pub fn decode_column(row: &MySqlRow, idx: usize, category: NativeType) -> Value {
        match category {
            NativeType::Decimal => decode_decimal(row, idx),
            NativeType::Integer => decode_integer(row, idx),
            NativeType::Boolean => decode_boolean(row, idx),
            NativeType::Float => decode_float(row, idx),
            NativeType::DateTime => decode_datetime(row, idx),
            NativeType::Text => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &MySqlRow, idx: usize) -> Value {
        match row.try_get::<Option<Decimal>, _>(idx) {
            Ok(Some(v)) => Value::Decimal(v),
            Ok(None) => Value::Null,
            Err(e) => {
                tracing::error!("failed to decode DECIMAL: {:?}", e);
                Value::Null
            }
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Integer(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return Value::Integer(v as i64);
        }
        Value::Null
    }

    fn decode_boolean(row: &MySqlRow, idx: usize) -> Value {
        row.try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Boolean)
            .unwrap_or(Value::Null)
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return Value::Float(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return Value::Float(v as f64);
        }
        Value::Null
    }

    fn decode_datetime(row: &MySqlRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
            return Value::DateTime(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
            return Value::DateTime(v.and_utc());
        }
        Value::Null
    }

    fn decode_text(row: &MySqlRow, idx: usize) -> Value {
        row.try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null)
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, category: NativeType) -> Value {
        match category {
            NativeType::Decimal => decode_decimal(row, idx),
            NativeType::Integer => decode_integer(row, idx),
            NativeType::Boolean => decode_boolean(row, idx),
            NativeType::Float => decode_float(row, idx),
            NativeType::DateTime => decode_datetime(row, idx),
            NativeType::Text => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &PgRow, idx: usize) -> Value {
        match row.try_get::<Option<Decimal>, _>(idx) {
            Ok(Some(v)) => Value::Decimal(v),
            Ok(None) => Value::Null,
            Err(e) => {
                tracing::error!("failed to decode NUMERIC: {:?}", e);
                Value::Null
            }
        }
    }

    // Postgres decoding is width-strict, so each integer width is tried.
    fn decode_integer(row: &PgRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return Value::Integer(v as i64);
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return Value::Integer(v as i64);
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return Value::Integer(v);
        }
        Value::Null
    }

    fn decode_boolean(row: &PgRow, idx: usize) -> Value {
        row.try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Boolean)
            .unwrap_or(Value::Null)
    }

    fn decode_float(row: &PgRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return Value::Float(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return Value::Float(v as f64);
        }
        Value::Null
    }

    fn decode_datetime(row: &PgRow, idx: usize) -> Value {
        if let Ok(Some(v)) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
            return Value::DateTime(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
            return Value::DateTime(v.and_utc());
        }
        Value::Null
    }

    fn decode_text(row: &PgRow, idx: usize) -> Value {
        row.try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null)
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize, category: NativeType) -> Value {
        match category {
            NativeType::Integer => decode_integer(row, idx),
            NativeType::Boolean => decode_boolean(row, idx),
            // SQLite stores decimals with REAL affinity
            NativeType::Float | NativeType::Decimal => decode_float(row, idx),
            // Date/times are stored as TEXT; DateTime never reaches here
            NativeType::DateTime | NativeType::Text => decode_text(row, idx),
        }
    }

    fn decode_integer(row: &SqliteRow, idx: usize) -> Value {
        row.try_get::<Option<i64>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Integer)
            .unwrap_or(Value::Null)
    }

    fn decode_boolean(row: &SqliteRow, idx: usize) -> Value {
        row.try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Boolean)
            .unwrap_or(Value::Null)
    }

    fn decode_float(row: &SqliteRow, idx: usize) -> Value {
        row.try_get::<Option<f64>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null)
    }

    fn decode_text(row: &SqliteRow, idx: usize) -> Value {
        row.try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null)
    }
}
