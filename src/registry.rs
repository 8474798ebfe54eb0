//! Process-wide tracking of mutations encoded against tables the schema
//! doesn't know about.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// A concurrent map from table name to a warning counter. Supports
/// concurrent insert via [`DashMap`]'s sharded locking and atomic
/// fetch-add on the counters themselves, so no lock is held across a full
/// `encode` call.
#[derive(Debug, Default)]
pub struct UnknownTableRegistry {
    counts: DashMap<String, AtomicU64>,
}

impl UnknownTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically increments the counter for `table`, creating it at 1 if
    /// this is the first time it's been seen, and returns the new value.
    pub fn increment_and_get(&self, table: &str) -> u64 {
        if let Some(counter) = self.counts.get(table) {
            return counter.fetch_add(1, Ordering::Relaxed) + 1;
        }
        // `entry` is re-checked under the shard lock in case another thread
        // raced us between the `get` miss above and here.
        let counter = self
            .counts
            .entry(table.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// A point-in-time copy of the full counter map.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    /// Clears every counter. Exposed for test harnesses; the map otherwise
    /// has no teardown requirement and may accumulate entries for the life
    /// of the process.
    pub fn reset(&self) {
        self.counts.clear();
    }
}

/// The default process-wide registry, shared by every [`MutationKeyEncoder`](crate::encoder::MutationKeyEncoder)
/// built via [`MutationKeyEncoder::new`](crate::encoder::MutationKeyEncoder::new).
/// Tests and embedders that want isolation should build an encoder with
/// [`MutationKeyEncoder::with_registry`](crate::encoder::MutationKeyEncoder::with_registry)
/// instead of relying on this global.
pub static GLOBAL_REGISTRY: Lazy<Arc<UnknownTableRegistry>> =
    Lazy::new(|| Arc::new(UnknownTableRegistry::new()));
