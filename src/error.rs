//! Error types for schema construction and mutation encoding.

use thiserror::Error;

/// Failures raised while building a [`Schema`](crate::schema::Schema) from a
/// [`SchemaBuilder`](crate::schema::SchemaBuilder).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A key part named a column that was never declared on the table.
    #[error("table {table:?} declares key column {column:?} which was never added via add_column")]
    UnknownKeyColumn { table: String, column: String },

    /// The same column name was declared twice on the same table.
    #[error("table {table:?} column {column:?} was declared more than once")]
    DuplicateColumn { table: String, column: String },

    /// A type string did not match any known spelling for the dialect.
    #[error("table {table:?} column {column:?} has unrecognized type string {type_str:?} for dialect {dialect:?}")]
    UnknownTypeString {
        table: String,
        column: String,
        type_str: String,
        dialect: crate::scalar::Dialect,
    },
}

/// Failures raised synchronously from [`MutationKeyEncoder::encode_table_name_and_key`](crate::encoder::MutationKeyEncoder::encode_table_name_and_key).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A mutation's value for a key column does not match the column's declared type.
    #[error("column {column:?} expected a value of type {expected:?}, got {found:?}")]
    TypeMismatch {
        column: String,
        expected: crate::scalar::ColumnType,
        found: &'static str,
    },

    /// A mutation shape the encoder deliberately declines to handle.
    #[error("unsupported mutation shape: {0}")]
    Unsupported(String),
}

// Callers embedding this crate in a pipeline that threads `anyhow::Result`
// end to end can `?` straight through without an extra `.map_err`.
impl From<SchemaError> for anyhow::Error {
    fn from(e: SchemaError) -> Self {
        anyhow::Error::new(e)
    }
}

impl From<EncodeError> for anyhow::Error {
    fn from(e: EncodeError) -> Self {
        anyhow::Error::new(e)
    }
}
