//! In-memory representation of known tables, their columns, and declared key
//! order. Built once via [`SchemaBuilder`] and read-only thereafter.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::ordered_bytes::Direction;
use crate::scalar::{ColumnType, Dialect};

/// One column of a table. Immutable after the owning [`Schema`] is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub dialect: Dialect,
}

/// One column of a table's declared primary key, with its sort direction.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPart {
    pub column: String,
    pub direction: Direction,
}

/// A single table: its columns and the ordered list of key parts that make
/// up its primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: HashMap<String, Column>,
    pub key_parts: Vec<KeyPart>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

/// An immutable, built schema: the set of known tables plus the deterministic
/// by-name table ordering index used as the table-position key prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    tables: HashMap<String, Table>,
    table_order: HashMap<String, u32>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The table's 0-based position in Unicode-codepoint name order, or
    /// `None` if the table is unknown.
    pub fn table_index(&self, name: &str) -> Option<u32> {
        self.table_order.get(name).copied()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[derive(Debug, Clone, Default)]
struct TableBuilder {
    columns: HashMap<String, Column>,
    key_parts: Vec<KeyPart>,
}

/// Builds a [`Schema`] one column/key-part declaration at a time.
///
/// Type strings are matched against the dialect's known spellings, so the
/// same builder (and hence the same dialect) is used for every table added to
/// it — the data model's `Column.dialect` is just a stamp of the builder's
/// dialect at the time each column was declared.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    dialect: Dialect,
    tables: HashMap<String, TableBuilder>,
    /// Preserves insertion order for key parts validation error messages and
    /// for deterministic iteration in tests; the table ordering index itself
    /// is always computed by name at `build()` time regardless of this.
    table_insertion_order: Vec<String>,
}

impl SchemaBuilder {
    /// Defaults to [`Dialect::GoogleStandardSql`] when called via
    /// [`Default::default`]; callers needing PostgreSql semantics pass it
    /// explicitly.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: HashMap::new(),
            table_insertion_order: Vec::new(),
        }
    }

    fn table_mut(&mut self, table: &str) -> &mut TableBuilder {
        if !self.tables.contains_key(table) {
            self.table_insertion_order.push(table.to_string());
        }
        self.tables.entry(table.to_string()).or_default()
    }

    /// Declares a column on `table`. `type_str` is matched case-insensitively
    /// against this builder's dialect.
    pub fn add_column(
        &mut self,
        table: &str,
        column: &str,
        type_str: &str,
    ) -> Result<&mut Self, SchemaError> {
        let dialect = self.dialect;
        let ty = ColumnType::from_type_str(dialect, type_str).ok_or_else(|| {
            SchemaError::UnknownTypeString {
                table: table.to_string(),
                column: column.to_string(),
                type_str: type_str.to_string(),
                dialect,
            }
        })?;

        let tb = self.table_mut(table);
        if tb.columns.contains_key(column) {
            return Err(SchemaError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        tb.columns.insert(
            column.to_string(),
            Column {
                name: column.to_string(),
                ty,
                dialect,
            },
        );
        Ok(self)
    }

    /// Declares that `column` is the next part of `table`'s primary key, in
    /// the direction given. Validity of the reference (the column must exist)
    /// is checked at [`build`](Self::build) time, once all columns are known.
    pub fn add_key_part(&mut self, table: &str, column: &str, descending: bool) -> &mut Self {
        let direction = if descending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        self.table_mut(table).key_parts.push(KeyPart {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Validates and freezes the schema. Computes the table-name ordering
    /// index by sorting table names in Unicode-codepoint order.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut tables = HashMap::with_capacity(self.tables.len());
        for (name, tb) in self.tables {
            for kp in &tb.key_parts {
                if !tb.columns.contains_key(&kp.column) {
                    return Err(SchemaError::UnknownKeyColumn {
                        table: name.clone(),
                        column: kp.column.clone(),
                    });
                }
            }
            tables.insert(
                name.clone(),
                Table {
                    name,
                    columns: tb.columns,
                    key_parts: tb.key_parts,
                },
            );
        }

        let mut names: Vec<&String> = tables.keys().collect();
        names.sort();
        let table_order = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as u32))
            .collect();

        Ok(Schema {
            tables,
            table_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_computes_name_sorted_table_order() {
        let mut b = SchemaBuilder::new(Dialect::GoogleStandardSql);
        b.add_column("zeta", "id", "INT64").unwrap();
        b.add_column("alpha", "id", "INT64").unwrap();
        b.add_column("mid", "id", "INT64").unwrap();
        let schema = b.build().unwrap();
        assert_eq!(schema.table_index("alpha"), Some(0));
        assert_eq!(schema.table_index("mid"), Some(1));
        assert_eq!(schema.table_index("zeta"), Some(2));
    }

    #[test]
    fn unknown_key_column_fails_build() {
        let mut b = SchemaBuilder::new(Dialect::GoogleStandardSql);
        b.add_column("t", "id", "INT64").unwrap();
        b.add_key_part("t", "missing", false);
        let err = b.build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownKeyColumn {
                table: "t".to_string(),
                column: "missing".to_string()
            }
        );
    }

    #[test]
    fn duplicate_column_fails() {
        let mut b = SchemaBuilder::new(Dialect::GoogleStandardSql);
        b.add_column("t", "id", "INT64").unwrap();
        let err = b.add_column("t", "id", "STRING").unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                table: "t".to_string(),
                column: "id".to_string()
            }
        );
    }

    #[test]
    fn unknown_type_string_fails() {
        let mut b = SchemaBuilder::new(Dialect::GoogleStandardSql);
        let err = b.add_column("t", "id", "not_a_type").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTypeString { .. }));
    }
}
