//! Errors reported by table construction and insertion.

use core::fmt;
use std::collections::TryReserveError;

/// Recoverable failures. Contract violations (stale or foreign cursors) are
/// not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("bucket count must be greater than zero")]
    ZeroBuckets,

    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("requested {requested} buckets, limit is {limit}")]
    CapacityExceeded { requested: usize, limit: usize },

    #[error("invalid table configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}

impl TableError {
    /// True for failures caused by running out of memory or hitting the
    /// configured bucket limit, as opposed to bad arguments.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::Alloc(_) | Self::CapacityExceeded { .. })
    }
}

/// A rejected insert. The table is unchanged and the value comes back to the
/// caller.
#[derive(thiserror::Error)]
#[error("insert of key {key:#x} failed: {source}")]
pub struct InsertError<V> {
    pub key: u64,
    pub value: V,
    #[source]
    pub source: TableError,
}

impl<V> InsertError<V> {
    pub fn into_value(self) -> V {
        self.value
    }
}

// No `V: Debug` bound, so `unwrap` works on any payload.
impl<V> fmt::Debug for InsertError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("key", &self.key)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl<V> From<InsertError<V>> for TableError {
    fn from(e: InsertError<V>) -> Self {
        e.source
    }
}
