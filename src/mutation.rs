//! The mutation shapes the encoder accepts: typed writes and key-set deletes.

use std::collections::HashMap;

use crate::scalar::Value;

/// Which write operation a `Write` mutation represents. Does not affect key
/// encoding — only non-key columns and conflict semantics differ between
/// these, and both are out of this crate's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    Replace,
    InsertOrUpdate,
}

/// An ordered tuple of scalar values, one per key part, used for delete point
/// keys. Values here are never `Value::Unset` — a delete names a fully
/// specified key, not a partial one.
pub type Key = Vec<Value>;

/// A half-open or fully-open range over key tuples. Opaque to the encoder:
/// spec.md's delete-ordering contract only requires that *some* range was
/// given, never its bounds, so this crate never inspects `start`/`end`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyRange {
    pub start: Option<Key>,
    pub end: Option<Key>,
}

/// The set of keys a delete mutation targets.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySet {
    /// Deletes every row in the table.
    All,
    /// Deletes exactly the rows named by these point keys.
    PointKeys(Vec<Key>),
    /// Deletes every row whose key falls in one of these ranges.
    Ranges(Vec<KeyRange>),
}

/// A single row-mutation: either a typed write or a key-set delete.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Write {
        table: String,
        kind: MutationKind,
        column_values: HashMap<String, Value>,
    },
    Delete {
        table: String,
        key_set: KeySet,
    },
}

impl Mutation {
    pub fn table(&self) -> &str {
        match self {
            Mutation::Write { table, .. } => table,
            Mutation::Delete { table, .. } => table,
        }
    }
}
