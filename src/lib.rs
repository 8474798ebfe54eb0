//! A mutation key encoder: converts database row-mutations into opaque byte
//! strings whose unsigned lexicographic order reproduces the logical sort
//! order the target database would impose on the same rows.
//!
//! This is the partitioning key function of a bulk-write pipeline: downstream
//! stages group and sort mutations by the emitted bytes so that writes are
//! delivered in roughly the same physical order the database will store
//! them. Schema acquisition, mutation construction, and the rest of the
//! pipeline are out of scope — this crate exposes a pure
//! [`MutationKeyEncoder::encode_table_name_and_key`] function over an
//! immutable [`Schema`](schema::Schema).

mod encoder;
mod error;
#[cfg(feature = "metrics")]
mod metrics;
mod mutation;
mod ordered_bytes;
mod registry;
mod scalar;
pub mod schema;

pub use encoder::MutationKeyEncoder;
pub use error::{EncodeError, SchemaError};
pub use mutation::{Key, KeyRange, KeySet, Mutation, MutationKind};
pub use ordered_bytes::Direction;
pub use registry::UnknownTableRegistry;
pub use scalar::{ColumnType, Dialect, Value};
pub use schema::{Schema, SchemaBuilder};
