//! Cursor: an external, deletion-tolerant iterator over a `ChainedTable`.
//!
//! A cursor is plain data: a position plus the stamp of the table that made
//! it. Every operation takes the table as an argument and first checks the
//! stamp, so a cursor used on another table, or after the table was
//! structurally changed by anything other than this cursor's own
//! [`Cursor::delete`], panics instead of reading the wrong entry.
//!
//! Positions follow the table's traversal order: buckets ascending, each
//! chain in insertion order.

use crate::bucket_array::BucketArray;
use crate::chained_table::{ChainedTable, Entry};
use crate::stamp::Stamp;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Position {
    Exhausted,
    At { bucket: usize, index: usize },
}

/// What a [`Cursor::delete`] left the cursor pointing at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Advance {
    /// The cursor now denotes the entry that followed the deleted one.
    Advanced,
    /// The deleted entry was the last one; the cursor is past the end.
    Exhausted,
}

/// Result of deleting the entry under a cursor.
#[derive(Debug, Eq, PartialEq)]
pub struct Deletion<V> {
    pub entry: Entry<V>,
    pub advance: Advance,
}

#[derive(Clone, Debug)]
pub struct Cursor {
    position: Position,
    stamp: Stamp,
}

impl Cursor {
    pub(crate) fn start<V>(table: &ChainedTable<V>) -> Self {
        let position = match table.buckets().next_occupied(0) {
            Some(bucket) if !table.is_empty() => Position::At { bucket, index: 0 },
            _ => Position::Exhausted,
        };
        Self {
            position,
            stamp: *table.stamp(),
        }
    }

    /// True once the cursor has run off the end. Unlike
    /// [`Cursor::past_end`] this needs no table.
    pub fn is_exhausted(&self) -> bool {
        self.position == Position::Exhausted
    }

    /// Step to the next entry. Returns `false`, and becomes exhausted, when
    /// there is none.
    #[track_caller]
    pub fn next<V>(&mut self, table: &ChainedTable<V>) -> bool {
        self.stamp.verify(table.stamp());
        self.step(table.buckets())
    }

    #[track_caller]
    pub fn past_end<V>(&self, table: &ChainedTable<V>) -> bool {
        self.stamp.verify(table.stamp());
        table.is_empty() || self.is_exhausted()
    }

    /// The entry under the cursor, or `None` past the end.
    #[track_caller]
    pub fn get<'t, V>(&self, table: &'t ChainedTable<V>) -> Option<(u64, &'t V)> {
        if self.past_end(table) {
            return None;
        }
        let Position::At { bucket, index } = self.position else {
            return None;
        };
        let link = table.buckets().chain(bucket)?.get(index)?;
        Some((link.key, table.value_of(link)))
    }

    /// Remove the entry under the cursor and move to the one after it.
    ///
    /// The cursor advances before the removal happens, and the removal looks
    /// the captured key up again instead of reusing the position. If the
    /// cursor stayed in the same chain it sits just past the removed link, so
    /// its index is shifted down to follow the survivors.
    ///
    /// Returns `None`, changing nothing, if the cursor is past the end.
    #[track_caller]
    pub fn delete<V>(&mut self, table: &mut ChainedTable<V>) -> Option<Deletion<V>> {
        let (key, _) = self.get(table)?;

        let advance = if self.step(table.buckets()) {
            Advance::Advanced
        } else {
            Advance::Exhausted
        };

        let (entry, bucket, pos) = table
            .remove_located(key)
            .expect("entry under a valid cursor must be removable");
        debug_assert_eq!(entry.key, key);

        if let Position::At { bucket: b, index } = &mut self.position {
            if *b == bucket && *index > pos {
                *index -= 1;
            }
        }
        self.stamp = *table.stamp();

        Some(Deletion { entry, advance })
    }

    fn step(&mut self, buckets: &BucketArray) -> bool {
        let Position::At { bucket, index } = self.position else {
            return false;
        };
        if buckets.len() == 0 {
            self.position = Position::Exhausted;
            return false;
        }
        let chain_len = buckets.chain(bucket).map_or(0, |c| c.len());
        if index + 1 < chain_len {
            self.position = Position::At {
                bucket,
                index: index + 1,
            };
            return true;
        }
        match buckets.next_occupied(bucket + 1) {
            Some(next) => {
                self.position = Position::At {
                    bucket: next,
                    index: 0,
                };
                true
            }
            None => {
                self.position = Position::Exhausted;
                false
            }
        }
    }
}
