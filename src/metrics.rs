//! Optional Prometheus counters mirroring the [`UnknownTableRegistry`](crate::registry::UnknownTableRegistry)
//! signal, for pipelines that already run a metrics exporter and want the
//! same counts exported without scraping `unknown_tables_warnings_map`.
//!
//! Gated behind the `metrics` feature; the encoder itself never requires
//! these to function — they are purely an export of state it already tracks.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

pub static MUTATION_KEY_ENCODE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "mutation_key_encode_total",
        "Mutations run through encode_table_name_and_key, by table-known outcome",
        &["table_known"]
    )
    .unwrap()
});

pub static UNKNOWN_TABLE_WARNINGS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "mutation_key_unknown_table_warnings_total",
        "Mutations encoded against a table absent from the schema, by table name",
        &["table"]
    )
    .unwrap()
});
