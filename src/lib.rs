//! chained-table: a single-threaded, separately chained hash table keyed by
//! 64-bit FNV-1a fingerprints, with an external cursor that survives
//! deleting the entry it points at.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keyed storage with insert / lookup / remove, explicit growth with
//!   rollback, and a cursor protocol that tolerates delete-at-cursor.
//! - Layers:
//!   - `hasher`: FNV-1a over bytes (`hash64`), over a little-endian `u64`
//!     (`hash_int64`), and as a `core::hash::Hasher`.
//!   - `Chain`: the ordered links `(key, slot)` of one bucket.
//!   - `BucketArray`: the fixed-size array of chains; the unit a resize
//!     replaces.
//!   - `ChainedTable<V>`: owns a `BucketArray` and a slot arena of payloads;
//!     exposes the map operations and triggers resize.
//!   - `Cursor`: detached position plus table stamp; every operation takes
//!     the table and checks the stamp.
//!
//! Invariants
//! - `bucket_count > 0`.
//! - `len` equals the number of links equals the number of arena slots.
//! - Every link sits in bucket `key % bucket_count`.
//! - Keys are unique across the table.
//!
//! Growth
//! - Before each insert, if `len >= load_factor * bucket_count` (3 by
//!   default) the table builds a `bucket_count * growth_factor` (9 by
//!   default) array from its current links, swaps it in and drops the old
//!   shell. The shell only holds links, so payloads are never touched twice.
//!   If the new array cannot be built the resize is skipped and the insert
//!   proceeds at the current size.
//!
//! Cursor validity
//! - The table carries a `Stamp` (process-unique id plus generation). New
//!   keys, removals, resizes and `clear` bump the generation. Replacing a
//!   value or `get_mut` does not.
//! - A cursor whose stamp no longer matches the table panics on use. A
//!   cursor's own `delete` re-stamps it, so it stays valid while any other
//!   cursor on the table goes stale.
//! - `delete` advances first, then removes the captured key by lookup, then
//!   shifts its in-chain index if it sat after the removed link.
//!
//! Errors
//! - Allocation failure and configured limits come back as `TableError`;
//!   nothing is partially applied. A failed `insert` returns `InsertError`,
//!   which carries the rejected value back. Contract violations panic.
//!
//! Notes and non-goals
//! - Single-threaded; no internal synchronization.
//! - Keys are fixed `u64` fingerprints. There is no custom comparator or
//!   hash family; callers derive keys with [`hash64`] or [`fingerprint`].
//! - No persistence or serialization.

mod bucket_array;
mod chain;
pub mod chained_table;
mod chained_table_proptest;
pub mod config;
pub mod cursor;
pub mod error;
pub mod hasher;
mod stamp;

// Public surface
pub use chained_table::{ChainedTable, Entry, Insertion, Iter, TableStats};
pub use config::TableConfig;
pub use cursor::{Advance, Cursor, Deletion};
pub use error::{InsertError, TableError};
pub use hasher::{fingerprint, hash64, hash_int64, FnvBuildHasher, FnvHasher};
