//! The façade: turns a [`Mutation`] into its partitioning key bytes.

use std::sync::Arc;

use tracing::debug;

use crate::error::EncodeError;
use crate::mutation::{Key, KeySet, Mutation};
use crate::ordered_bytes::{Direction, OrderedBytesWriter};
use crate::registry::{UnknownTableRegistry, GLOBAL_REGISTRY};
use crate::scalar::{encode_scalar, Value};
use crate::schema::Schema;

/// Prefix written in place of a table's ordering index when the table is not
/// in the schema. Chosen so the unknown-table group sorts after every known
/// table (whose indices are small non-negative integers written in the same
/// 4-byte big-endian width).
const UNKNOWN_TABLE_PREFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Converts mutations into order-preserving partitioning keys for a single,
/// immutable [`Schema`]. Cheap to construct, stateless beyond the schema
/// reference and a handle to the unknown-table registry; safe to share
/// across worker threads.
#[derive(Debug, Clone)]
pub struct MutationKeyEncoder {
    schema: Arc<Schema>,
    registry: Arc<UnknownTableRegistry>,
}

impl MutationKeyEncoder {
    /// Uses the process-wide default [`UnknownTableRegistry`].
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            registry: default_registry(),
        }
    }

    /// Uses an injected registry instead of the process-wide default —
    /// useful for tests that need isolated counters.
    pub fn with_registry(schema: Arc<Schema>, registry: Arc<UnknownTableRegistry>) -> Self {
        Self { schema, registry }
    }

    /// A snapshot of the unknown-table warning counts seen by this encoder's
    /// registry so far.
    pub fn unknown_tables_warnings_map(&self) -> std::collections::HashMap<String, u64> {
        self.registry.snapshot()
    }

    /// Encodes `mutation` into its partitioning key. Pure and deterministic:
    /// the only side effect is incrementing the unknown-table counter, which
    /// does not influence the returned bytes.
    pub fn encode_table_name_and_key(&self, mutation: &Mutation) -> Result<Vec<u8>, EncodeError> {
        let table_name = mutation.table();

        let Some(table) = self.schema.table(table_name) else {
            self.registry.increment_and_get(table_name);
            debug!(table = table_name, "encoding mutation against unknown table");
            #[cfg(feature = "metrics")]
            {
                crate::metrics::MUTATION_KEY_ENCODE_TOTAL
                    .with_label_values(&["false"])
                    .inc();
                crate::metrics::UNKNOWN_TABLE_WARNINGS_TOTAL
                    .with_label_values(&[table_name])
                    .inc();
            }

            let mut writer = OrderedBytesWriter::new();
            let mut bytes = UNKNOWN_TABLE_PREFIX.to_vec();
            writer.write_string(table_name, Direction::Ascending);
            bytes.extend(writer.into_bytes());

            let mut writer = OrderedBytesWriter::new();
            writer.write_string(&canonical_text(mutation), Direction::Ascending);
            bytes.extend(writer.into_bytes());
            return Ok(bytes);
        };

        #[cfg(feature = "metrics")]
        crate::metrics::MUTATION_KEY_ENCODE_TOTAL
            .with_label_values(&["true"])
            .inc();

        let table_index = self
            .schema
            .table_index(table_name)
            .expect("table present implies an assigned index");
        let mut bytes = table_index.to_be_bytes().to_vec();

        match mutation {
            Mutation::Delete { key_set, .. } => match key_set {
                KeySet::All | KeySet::Ranges(_) => {}
                KeySet::PointKeys(keys) => {
                    if keys.len() != 1 {
                        return Err(EncodeError::Unsupported(format!(
                            "point-key delete on {table_name:?} must name exactly one key, got {}",
                            keys.len()
                        )));
                    }
                    encode_point_key(&mut bytes, table, &keys[0])?;
                }
            },
            Mutation::Write { column_values, .. } => {
                let mut writer = OrderedBytesWriter::new();
                for part in &table.key_parts {
                    let column = table
                        .column(&part.column)
                        .expect("schema invariant: key part columns always exist");
                    match column_values.get(&part.column) {
                        None | Some(Value::Unset) => {
                            writer.write_tag_byte(crate::scalar::UNSET_TAG, part.direction)
                        }
                        Some(value) => encode_scalar(
                            &mut writer,
                            &part.column,
                            column.ty,
                            column.dialect,
                            value,
                            part.direction,
                        )?,
                    }
                }
                bytes.extend(writer.into_bytes());
            }
        }

        Ok(bytes)
    }
}

fn encode_point_key(
    bytes: &mut Vec<u8>,
    table: &crate::schema::Table,
    key: &Key,
) -> Result<(), EncodeError> {
    let mut writer = OrderedBytesWriter::new();
    for (part, value) in table.key_parts.iter().zip(key.iter()) {
        let column = table
            .column(&part.column)
            .expect("schema invariant: key part columns always exist");
        match value {
            Value::Unset => writer.write_tag_byte(crate::scalar::UNSET_TAG, part.direction),
            _ => encode_scalar(
                &mut writer,
                &part.column,
                column.ty,
                column.dialect,
                value,
                part.direction,
            )?,
        }
    }
    bytes.extend(writer.into_bytes());
    Ok(())
}

fn default_registry() -> Arc<UnknownTableRegistry> {
    Arc::clone(&GLOBAL_REGISTRY)
}

/// A stable, deterministic textual rendering of a mutation, used only as a
/// tiebreaker among unknown-table fallback keys. Never semantically
/// interpreted — just needs to be a total, deterministic function of the
/// mutation's contents.
fn canonical_text(mutation: &Mutation) -> String {
    match mutation {
        Mutation::Write {
            table,
            kind,
            column_values,
        } => {
            let mut names: Vec<&String> = column_values.keys().collect();
            names.sort();
            let cols: Vec<String> = names
                .into_iter()
                .map(|n| format!("{n}={:?}", column_values[n]))
                .collect();
            format!("Write{{table={table:?},kind={kind:?},columns=[{}]}}", cols.join(","))
        }
        Mutation::Delete { table, key_set } => {
            format!("Delete{{table={table:?},key_set={:?}}}", canonical_key_set(key_set))
        }
    }
}

fn canonical_key_set(key_set: &KeySet) -> String {
    match key_set {
        KeySet::All => "All".to_string(),
        KeySet::PointKeys(keys) => format!("PointKeys({keys:?})"),
        KeySet::Ranges(ranges) => format!("Ranges({ranges:?})"),
    }
}
