//! Logical column types, dynamically-typed scalar values, and the
//! `(type, dialect)` dispatch that turns a [`Value`] into ordered bytes.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::EncodeError;
use crate::ordered_bytes::{Direction, OrderedBytesWriter};

/// Which SQL surface a schema speaks. Affects type-string spellings and
/// NULL-ordering (see [`null_tags`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Dialect {
    GoogleStandardSql,
    PostgreSql,
}

/// A logical column type, independent of dialect spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    Int64,
    Float64,
    String,
    Bytes,
    Date,
    Timestamp,
    Numeric,
    PgNumeric,
    Json,
}

impl ColumnType {
    /// Matches a dialect-specific type spelling case-insensitively, ignoring
    /// any parenthesized length/precision suffix (`STRING(MAX)`,
    /// `character varying(255)`, `numeric(10,2)`, ...).
    pub fn from_type_str(dialect: Dialect, raw: &str) -> Option<ColumnType> {
        let base = raw.split('(').next().unwrap_or(raw).trim().to_ascii_lowercase();
        match dialect {
            Dialect::GoogleStandardSql => match base.as_str() {
                "bool" => Some(ColumnType::Bool),
                "int64" => Some(ColumnType::Int64),
                "float64" => Some(ColumnType::Float64),
                "string" => Some(ColumnType::String),
                "bytes" => Some(ColumnType::Bytes),
                "date" => Some(ColumnType::Date),
                "timestamp" => Some(ColumnType::Timestamp),
                "numeric" => Some(ColumnType::Numeric),
                "json" => Some(ColumnType::Json),
                _ => None,
            },
            Dialect::PostgreSql => match base.as_str() {
                "boolean" | "bool" => Some(ColumnType::Bool),
                "bigint" | "int8" => Some(ColumnType::Int64),
                "double precision" | "float8" => Some(ColumnType::Float64),
                "character varying" | "varchar" | "text" | "character" | "char" => {
                    Some(ColumnType::String)
                }
                "bytea" => Some(ColumnType::Bytes),
                "date" => Some(ColumnType::Date),
                "timestamp with time zone"
                | "timestamptz"
                | "timestamp without time zone"
                | "timestamp" => Some(ColumnType::Timestamp),
                "numeric" | "decimal" => Some(ColumnType::PgNumeric),
                "json" | "jsonb" => Some(ColumnType::Json),
                _ => None,
            },
        }
    }

}

/// A dynamically-typed scalar value carried by a mutation.
///
/// `Null` and `Unset` are distinct: `Null` is a present-but-null key column,
/// `Unset` is a write mutation that never mentioned the key column at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Numeric(BigDecimal),
    PgNumeric(BigDecimal),
    Json(String),
    Null,
    Unset,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int64(_) => "Int64",
            Value::Float64(_) => "Float64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Date(_) => "Date",
            Value::Timestamp(_) => "Timestamp",
            Value::Numeric(_) => "Numeric",
            Value::PgNumeric(_) => "PgNumeric",
            Value::Json(_) => "Json",
            Value::Null => "Null",
            Value::Unset => "Unset",
        }
    }
}

/// Epoch day for 1970-01-01, used to turn a [`NaiveDate`] into the
/// days-since-epoch integer the wire format specifies.
fn days_since_epoch(d: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid constant date");
    (d - epoch).num_days() as i32
}

/// The one-byte null tag. Unlike every other primitive this crate writes,
/// the null tag's position is fixed by dialect alone and does not flip with
/// column direction: the seed scenarios (spec.md §8, S1) require NULL to
/// sort before non-null values on a GoogleStandardSql column regardless of
/// whether that column is declared ascending or descending, so only the
/// *value* bytes that follow a present tag get the direction transform.
///
/// The tag bytes live in `{0x01, 0x02}`, deliberately leaving `0x00` (and its
/// descending complement) free for [`UNSET_TAG`] below — see its doc comment
/// for why that separation matters.
mod null_tags {
    use super::Dialect;

    pub const PRESENT_GSQL: u8 = 0x02;
    pub const NULL_GSQL: u8 = 0x01;
    pub const PRESENT_PG: u8 = 0x01;
    pub const NULL_PG: u8 = 0x02;

    pub fn present(dialect: Dialect) -> u8 {
        match dialect {
            Dialect::GoogleStandardSql => PRESENT_GSQL,
            Dialect::PostgreSql => PRESENT_PG,
        }
    }

    pub fn null(dialect: Dialect) -> u8 {
        match dialect {
            Dialect::GoogleStandardSql => NULL_GSQL,
            Dialect::PostgreSql => NULL_PG,
        }
    }
}

/// Unset sorts after every present value when ascending (and before, when
/// descending); `0xFF` complements to `0x00` under the writer's descending
/// transform, which is exactly the reversal we want. `0x00` is never used by
/// [`null_tags`] in either dialect (those occupy `{0x01, 0x02}` only), so
/// neither the ascending nor the descending form of this tag can collide
/// with a null or present tag — `Value::Null` and `Value::Unset` always
/// differ by at least their leading tag byte, in both dialects and both
/// column directions.
pub const UNSET_TAG: u8 = 0xFF;

/// Writes a column's null tag plus, if present, its value bytes.
///
/// `value` must be `Value::Null` or a variant matching `ty`; `Value::Unset`
/// is handled separately by the caller (it has no associated column type to
/// check against).
pub fn encode_scalar(
    writer: &mut OrderedBytesWriter,
    column: &str,
    ty: ColumnType,
    dialect: Dialect,
    value: &Value,
    direction: Direction,
) -> Result<(), EncodeError> {
    if matches!(value, Value::Null) {
        writer.write_fixed_byte(null_tags::null(dialect));
        return Ok(());
    }

    writer.write_fixed_byte(null_tags::present(dialect));

    match (ty, value) {
        (ColumnType::Bool, Value::Bool(v)) => writer.write_bool(*v, direction),
        (ColumnType::Int64, Value::Int64(v)) => writer.write_i64(*v, direction),
        (ColumnType::Float64, Value::Float64(v)) => writer.write_f64(*v, direction),
        (ColumnType::String, Value::String(v)) => writer.write_string(v, direction),
        (ColumnType::Bytes, Value::Bytes(v)) => writer.write_bytes(v, direction),
        (ColumnType::Date, Value::Date(v)) => writer.write_i32(days_since_epoch(*v), direction),
        (ColumnType::Timestamp, Value::Timestamp(v)) => {
            writer.write_timestamp(v.timestamp(), v.timestamp_subsec_nanos() as i32, direction)
        }
        (ColumnType::Numeric, Value::Numeric(v)) => writer.write_numeric(v, direction),
        (ColumnType::PgNumeric, Value::PgNumeric(v)) => writer.write_numeric(v, direction),
        (ColumnType::Json, Value::Json(v)) => writer.write_json_text(v, direction),
        _ => {
            return Err(EncodeError::TypeMismatch {
                column: column.to_string(),
                expected: ty,
                found: value.type_name(),
            })
        }
    }
    Ok(())
}
