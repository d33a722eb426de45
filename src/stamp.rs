//! Table identity and generation stamps.
//!
//! Every table carries a `Stamp`: a process-unique id plus a generation that
//! advances on each structural mutation. Cursors copy the stamp when they are
//! created (and after their own deletes) and compare it against the table on
//! every operation. A mismatch means the cursor is being used against the
//! wrong table or after an out-of-band mutation, and panics.

use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Stamp {
    table: u64,
    generation: u64,
}

impl Stamp {
    /// Stamp for a newly constructed table.
    pub fn fresh() -> Self {
        Self {
            table: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    /// Record a structural mutation.
    #[inline]
    pub fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Panic unless `self` (held by a cursor) still matches `current` (the
    /// table's stamp).
    #[inline]
    #[track_caller]
    pub fn verify(&self, current: &Stamp) {
        assert!(
            self.table == current.table,
            "cursor used with a table other than the one that created it"
        );
        assert!(
            self.generation == current.generation,
            "cursor used after the table was modified outside the cursor \
             (cursor generation {}, table generation {})",
            self.generation,
            current.generation
        );
    }
}
