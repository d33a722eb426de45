//! Chain: the ordered run of links stored in one bucket.

use std::collections::TryReserveError;

slotmap::new_key_type! {
    /// Arena slot holding one entry's payload.
    pub(crate) struct EntrySlot;
}

/// Chain-resident record. The key is kept inline so scans never touch the
/// payload arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Link {
    pub key: u64,
    pub slot: EntrySlot,
}

/// Links in insertion order. Removal keeps the survivors in order, which the
/// cursor relies on to fix up its position after a delete.
#[derive(Debug, Default)]
pub(crate) struct Chain {
    links: Vec<Link>,
}

impl Chain {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Position of `key`, if linked here.
    #[inline]
    pub fn position(&self, key: u64) -> Option<usize> {
        self.links.iter().position(|l| l.key == key)
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Link> {
        self.links.get(pos)
    }

    /// Make room for one more link without touching the contents.
    pub fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        self.links.try_reserve(1)
    }

    /// Append. Callers reserve first when they need a failure signal.
    pub fn push(&mut self, link: Link) {
        debug_assert!(self.position(link.key).is_none(), "duplicate key in chain");
        self.links.push(link);
    }

    /// Detach the link at `pos`, shifting later links down by one.
    pub fn remove_at(&mut self, pos: usize) -> Link {
        self.links.remove(pos)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Link> {
        self.links.iter()
    }

    pub fn clear(&mut self) {
        self.links.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn links(n: u64) -> (SlotMap<EntrySlot, ()>, Vec<Link>) {
        let mut arena = SlotMap::with_key();
        let v = (0..n)
            .map(|key| Link {
                key,
                slot: arena.insert(()),
            })
            .collect();
        (arena, v)
    }

    #[test]
    fn push_keeps_insertion_order() {
        let (_arena, ls) = links(4);
        let mut c = Chain::new();
        for l in &ls {
            c.try_reserve_one().unwrap();
            c.push(*l);
        }
        assert_eq!(c.len(), 4);
        let keys: Vec<u64> = c.iter().map(|l| l.key).collect();
        assert_eq!(keys, vec![0, 1, 2, 3]);
        assert_eq!(c.position(2), Some(2));
        assert_eq!(c.position(9), None);
    }

    #[test]
    fn remove_at_preserves_survivor_order() {
        let (_arena, ls) = links(5);
        let mut c = Chain::new();
        for l in &ls {
            c.push(*l);
        }
        let gone = c.remove_at(1);
        assert_eq!(gone, ls[1]);
        let keys: Vec<u64> = c.iter().map(|l| l.key).collect();
        assert_eq!(keys, vec![0, 2, 3, 4]);
        assert_eq!(c.get(1).map(|l| l.key), Some(2));
    }

    #[test]
    fn empty_chain() {
        let mut c = Chain::new();
        assert!(c.is_empty());
        assert!(c.get(0).is_none());
        let (_arena, ls) = links(1);
        c.push(ls[0]);
        c.clear();
        assert!(c.is_empty());
    }
}
