//! ChainedTable: separately chained storage keyed by 64-bit fingerprints.
//!
//! Payloads live in a slot arena; each bucket's chain holds `(key, slot)`
//! links. Growing the table only rebuilds the links, so payloads never move
//! and a failed resize has nothing to undo.

use crate::bucket_array::BucketArray;
use crate::chain::{EntrySlot, Link};
use crate::config::TableConfig;
use crate::cursor::Cursor;
use crate::error::{InsertError, TableError};
use crate::stamp::Stamp;
use core::fmt;
use core::iter::FusedIterator;
use slotmap::SlotMap;

/// An owned key/value pair handed back by removal, replacement and cursor
/// deletion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry<V> {
    pub key: u64,
    pub value: V,
}

/// Successful outcome of [`ChainedTable::insert`].
#[derive(Debug, Eq, PartialEq)]
pub enum Insertion<V> {
    Inserted,
    /// The key was present; its previous entry is returned, not dropped.
    Replaced(Entry<V>),
}

impl<V> Insertion<V> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Insertion::Inserted)
    }

    pub fn into_replaced(self) -> Option<Entry<V>> {
        match self {
            Insertion::Inserted => None,
            Insertion::Replaced(e) => Some(e),
        }
    }
}

/// Snapshot of the table's shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableStats {
    pub len: usize,
    pub bucket_count: usize,
    pub load_factor: f64,
    pub longest_chain: usize,
    pub empty_buckets: usize,
}

pub struct ChainedTable<V> {
    buckets: BucketArray,
    slots: SlotMap<EntrySlot, V>,
    config: TableConfig,
    stamp: Stamp,
}

impl<V> ChainedTable<V> {
    /// Table with the default configuration.
    pub fn new() -> Self {
        let config = TableConfig::default();
        Self::from_parts(BucketArray::new(config.initial_buckets), config)
    }

    /// Table with `buckets` initial buckets and default growth policy.
    pub fn with_buckets(buckets: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig::default().with_initial_buckets(buckets))
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let buckets = BucketArray::try_with_buckets(config.initial_buckets)?;
        Ok(Self::from_parts(buckets, config))
    }

    fn from_parts(buckets: BucketArray, config: TableConfig) -> Self {
        log::trace!("allocated chained table with {} buckets", buckets.bucket_count());
        Self {
            buckets,
            slots: SlotMap::with_key(),
            config,
            stamp: Stamp::fresh(),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    /// Bucket that `key` maps to under the current bucket count.
    pub fn bucket_of(&self, key: u64) -> usize {
        self.buckets.bucket_of(key)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn stats(&self) -> TableStats {
        let (longest_chain, empty_buckets) = self.buckets.occupancy();
        TableStats {
            len: self.len(),
            bucket_count: self.bucket_count(),
            load_factor: self.load_factor(),
            longest_chain,
            empty_buckets,
        }
    }

    pub fn get(&self, key: u64) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: u64) -> Option<(u64, &V)> {
        let (_, _, link) = self.buckets.find(key)?;
        Some((link.key, self.value_of(&link)))
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.buckets.find(key).is_some()
    }

    /// Mutable access to a stored value. Not a structural change, so live
    /// cursors stay valid.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let (_, _, link) = self.buckets.find(key)?;
        self.slots.get_mut(link.slot)
    }

    /// Insert or replace. Grows first if the load factor has been reached.
    ///
    /// On `Err` the table is unchanged and the error carries `value` back.
    pub fn insert(&mut self, key: u64, value: V) -> Result<Insertion<V>, InsertError<V>> {
        self.grow_if_loaded();

        if let Some((_, _, link)) = self.buckets.find(key) {
            let old = core::mem::replace(&mut self.slots[link.slot], value);
            return Ok(Insertion::Replaced(Entry { key, value: old }));
        }

        // Both reservations happen before anything is linked, so the pushes
        // below cannot allocate.
        let reserved = self
            .slots
            .try_reserve(1)
            .and_then(|()| self.buckets.reserve_for(key));
        let bucket = match reserved {
            Ok(bucket) => bucket,
            Err(e) => {
                return Err(InsertError {
                    key,
                    value,
                    source: e.into(),
                })
            }
        };
        let slot = self.slots.insert(value);
        self.buckets.push_reserved(bucket, Link { key, slot });
        self.stamp.bump();
        Ok(Insertion::Inserted)
    }

    /// Remove `key`, handing its entry to the caller.
    pub fn remove(&mut self, key: u64) -> Option<Entry<V>> {
        self.remove_located(key).map(|(entry, _, _)| entry)
    }

    /// Remove `key` and report the `(bucket, position)` it occupied.
    pub(crate) fn remove_located(&mut self, key: u64) -> Option<(Entry<V>, usize, usize)> {
        let (bucket, pos, _) = self.buckets.find(key)?;
        let link = self.buckets.unlink(bucket, pos);
        let value = self
            .slots
            .remove(link.slot)
            .expect("linked slot must be live in the arena");
        self.stamp.bump();
        Some((Entry { key, value }, bucket, pos))
    }

    /// Drop every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.slots.clear();
        self.stamp.bump();
    }

    /// Tear the table down, passing each remaining payload to `destroy` in
    /// traversal order.
    pub fn free_with<F>(self, mut destroy: F)
    where
        F: FnMut(V),
    {
        let ChainedTable {
            buckets, mut slots, ..
        } = self;
        for link in buckets.links() {
            if let Some(value) = slots.remove(link.slot) {
                destroy(value);
            }
        }
        debug_assert!(slots.is_empty(), "unlinked payloads left in the arena");
    }

    /// External cursor positioned on the first entry, or exhausted if empty.
    pub fn cursor(&self) -> Cursor {
        Cursor::start(self)
    }

    /// Entries in traversal order: bucket by bucket, each chain in insertion
    /// order. Same order as [`ChainedTable::cursor`].
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            bucket: self.buckets.next_occupied(0),
            index: 0,
            remaining: self.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    // Resize: build the wider array from the current links, swap it in, then
    // drop the old shell. The shell only carries links, so no payload is
    // dropped or moved. Any failure leaves the table as it was.
    fn grow_if_loaded(&mut self) {
        let from = self.bucket_count();
        if self.len() < self.config.threshold(from) {
            return;
        }
        match self
            .config
            .grown(from)
            .and_then(|to| self.buckets.rebuilt(to))
        {
            Ok(mut grown) => {
                core::mem::swap(&mut self.buckets, &mut grown);
                drop(grown);
                self.stamp.bump();
                log::debug!(
                    "resized chained table from {} to {} buckets ({} entries, generation {})",
                    from,
                    self.bucket_count(),
                    self.len(),
                    self.stamp.generation()
                );
            }
            Err(e @ TableError::CapacityExceeded { .. }) => {
                log::debug!("resize skipped at {} buckets: {}", from, e);
            }
            Err(e) => {
                log::warn!("resize abandoned at {} buckets: {}", from, e);
            }
        }
    }

    pub(crate) fn buckets(&self) -> &BucketArray {
        &self.buckets
    }

    pub(crate) fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    pub(crate) fn value_of(&self, link: &Link) -> &V {
        &self.slots[link.slot]
    }
}

impl<V> Default for ChainedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for ChainedTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over `(key, &value)` in traversal order.
pub struct Iter<'a, V> {
    table: &'a ChainedTable<V>,
    bucket: Option<usize>,
    index: usize,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        loop {
            let bucket = self.bucket?;
            if let Some(link) = table.buckets.chain(bucket).and_then(|c| c.get(self.index)) {
                self.index += 1;
                self.remaining -= 1;
                return Some((link.key, table.value_of(link)));
            }
            self.bucket = table.buckets.next_occupied(bucket + 1);
            self.index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a ChainedTable<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    #[test]
    fn insert_lookup_replace_remove() {
        let mut t: ChainedTable<&'static str> = ChainedTable::with_buckets(8).unwrap();
        assert_eq!(t.insert(7, "seven").unwrap(), Insertion::Inserted);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(7), Some(&"seven"));
        assert_eq!(t.get_key_value(7), Some((7, &"seven")));
        assert!(t.get(8).is_none());

        let old = t.insert(7, "SEVEN").unwrap().into_replaced().unwrap();
        assert_eq!(old, Entry { key: 7, value: "seven" });
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(7), Some(&"SEVEN"));

        assert_eq!(t.remove(7), Some(Entry { key: 7, value: "SEVEN" }));
        assert_eq!(t.len(), 0);
        assert!(t.get(7).is_none());
        assert!(t.remove(7).is_none());
    }

    #[test]
    fn zero_buckets_rejected() {
        assert!(matches!(
            ChainedTable::<u8>::with_buckets(0),
            Err(TableError::ZeroBuckets)
        ));
    }

    #[test]
    fn colliding_keys_share_a_bucket() {
        let mut t = ChainedTable::with_buckets(4).unwrap();
        for k in [2u64, 6, 10] {
            t.insert(k, k * 100).unwrap();
        }
        assert_eq!(t.bucket_of(2), t.bucket_of(10));
        assert_eq!(t.stats().longest_chain, 3);
        assert_eq!(t.remove(6).map(|e| e.value), Some(600));
        assert_eq!(t.get(2), Some(&200));
        assert_eq!(t.get(10), Some(&1000));
    }

    #[test]
    fn resize_grows_by_nine_and_keeps_entries() {
        let mut t = ChainedTable::with_buckets(4).unwrap();
        for k in 1..=12u64 {
            t.insert(k, k * 10).unwrap();
        }
        // Threshold (3 * 4) reached but not yet acted on.
        assert_eq!(t.bucket_count(), 4);
        t.insert(13, 130).unwrap();
        assert_eq!(t.bucket_count(), 36);
        for k in 14..=20u64 {
            t.insert(k, k * 10).unwrap();
        }
        assert_eq!(t.bucket_count(), 36);
        assert_eq!(t.len(), 20);
        for k in 1..=20u64 {
            assert_eq!(t.get(k), Some(&(k * 10)));
            assert_eq!(t.bucket_of(k), (k % 36) as usize);
        }
    }

    #[test]
    fn resize_blocked_by_limit_keeps_working() {
        let cfg = TableConfig::new()
            .with_initial_buckets(2)
            .with_max_buckets(10);
        let mut t = ChainedTable::with_config(cfg).unwrap();
        for k in 0..50u64 {
            assert_eq!(t.insert(k, k).unwrap(), Insertion::Inserted);
        }
        assert_eq!(t.bucket_count(), 2);
        assert_eq!(t.len(), 50);
        assert!(t.load_factor() > 3.0);
        assert!((0..50u64).all(|k| t.get(k) == Some(&k)));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t = ChainedTable::new();
        t.insert(1, String::from("a")).unwrap();
        t.get_mut(1).unwrap().push('b');
        assert_eq!(t.get(1).map(String::as_str), Some("ab"));
        assert!(t.get_mut(2).is_none());
    }

    #[test]
    fn free_with_visits_every_payload_once() {
        let mut t = ChainedTable::with_buckets(3).unwrap();
        for k in 0..25u64 {
            t.insert(k, k).unwrap();
        }
        t.remove(4);
        let mut seen = Vec::new();
        t.free_with(|v| seen.push(v));
        seen.sort_unstable();
        let expected: Vec<u64> = (0..25).filter(|&k| k != 4).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn drop_releases_payloads_exactly_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        struct Noisy(u64, Rc<RefCell<Vec<u64>>>);
        impl Drop for Noisy {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
            }
        }
        {
            let mut t = ChainedTable::with_buckets(1).unwrap();
            // Forces several resizes while payloads are live.
            for k in 0..40u64 {
                t.insert(k, Noisy(k, log.clone())).unwrap();
            }
            assert!(log.borrow().is_empty(), "resize must not drop payloads");
            let replaced = t.insert(3, Noisy(103, log.clone())).unwrap();
            assert!(log.borrow().is_empty(), "replaced value is handed back");
            drop(replaced);
            assert_eq!(*log.borrow(), vec![3]);
        }
        let mut dropped = log.borrow().clone();
        dropped.sort_unstable();
        let mut expected: Vec<u64> = (0..40).collect();
        expected.push(103);
        expected.sort_unstable();
        assert_eq!(dropped, expected);
    }

    #[test]
    fn iteration_matches_contents() {
        let mut t = ChainedTable::with_buckets(5).unwrap();
        for k in (0..30u64).map(|i| i * 7) {
            t.insert(k, k + 1).unwrap();
        }
        let it = t.iter();
        assert_eq!(it.len(), 30);
        let keys: BTreeSet<u64> = t.keys().collect();
        assert_eq!(keys, (0..30u64).map(|i| i * 7).collect());
        assert!(t.iter().all(|(k, v)| *v == k + 1));
        assert_eq!((&t).into_iter().count(), t.len());
    }

    #[test]
    fn iter_stays_exhausted() {
        fn fused<I: FusedIterator>(it: I) -> I {
            it
        }
        let mut t = ChainedTable::with_buckets(3).unwrap();
        t.insert(1, 'a').unwrap();
        t.insert(4, 'b').unwrap();
        let mut it = fused(t.iter());
        assert_eq!(it.next(), Some((1, &'a')));
        assert_eq!(it.next(), Some((4, &'b')));
        for _ in 0..3 {
            assert_eq!(it.next(), None);
            assert_eq!(it.len(), 0);
        }
    }

    #[test]
    fn clear_keeps_bucket_count() {
        let mut t = ChainedTable::with_buckets(4).unwrap();
        for k in 0..20u64 {
            t.insert(k, ()).unwrap();
        }
        let buckets = t.bucket_count();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), buckets);
        assert_eq!(t.iter().count(), 0);
        assert_eq!(t.insert(1, ()).unwrap(), Insertion::Inserted);
    }

    #[test]
    fn generation_tracks_structural_changes_only() {
        let mut t = ChainedTable::new();
        let g0 = t.stamp().generation();
        t.insert(1, 1).unwrap();
        let g1 = t.stamp().generation();
        assert_ne!(g0, g1);
        t.insert(1, 2).unwrap();
        *t.get_mut(1).unwrap() += 1;
        assert_eq!(t.stamp().generation(), g1, "replace and get_mut are not structural");
        t.remove(1);
        assert_ne!(t.stamp().generation(), g1);
    }

    #[test]
    fn debug_lists_entries() {
        let mut t = ChainedTable::with_buckets(2).unwrap();
        t.insert(1, 'x').unwrap();
        assert_eq!(format!("{:?}", t), "{1: 'x'}");
    }
}
