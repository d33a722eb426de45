//! BucketArray: the fixed-size array of chains that a resize replaces.

use crate::chain::{Chain, Link};
use crate::error::TableError;
use std::collections::TryReserveError;

/// Invariants: `chains.len() > 0`, `len` equals the total number of links,
/// and every link sits in chain `key % chains.len()`.
#[derive(Debug)]
pub(crate) struct BucketArray {
    chains: Vec<Chain>,
    len: usize,
}

impl BucketArray {
    /// Reserve and initialize `buckets` empty chains. Empty chains do not
    /// allocate, so the only fallible step is the array itself.
    pub fn try_with_buckets(buckets: usize) -> Result<Self, TableError> {
        if buckets == 0 {
            return Err(TableError::ZeroBuckets);
        }
        let mut chains = Vec::new();
        chains.try_reserve_exact(buckets)?;
        chains.resize_with(buckets, Chain::new);
        Ok(Self { chains, len: 0 })
    }

    /// Infallible variant for small, known-good sizes; allocation failure
    /// aborts like any other collection.
    pub fn new(buckets: usize) -> Self {
        assert!(buckets > 0, "bucket count must be greater than zero");
        let mut chains = Vec::with_capacity(buckets);
        chains.resize_with(buckets, Chain::new);
        Self { chains, len: 0 }
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn bucket_of(&self, key: u64) -> usize {
        // Lossless: the remainder is below `chains.len()`, which fits a usize.
        (key % self.chains.len() as u64) as usize
    }

    #[inline]
    pub fn chain(&self, bucket: usize) -> Option<&Chain> {
        self.chains.get(bucket)
    }

    /// Locate `key`: `(bucket, position, link)`.
    pub fn find(&self, key: u64) -> Option<(usize, usize, Link)> {
        let bucket = self.bucket_of(key);
        let chain = &self.chains[bucket];
        let pos = chain.position(key)?;
        chain.get(pos).map(|l| (bucket, pos, *l))
    }

    /// Reserve room for `key` in its chain; returns the bucket to pass to
    /// [`BucketArray::push_reserved`].
    pub fn reserve_for(&mut self, key: u64) -> Result<usize, TryReserveError> {
        let bucket = self.bucket_of(key);
        self.chains[bucket].try_reserve_one()?;
        Ok(bucket)
    }

    pub fn push_reserved(&mut self, bucket: usize, link: Link) {
        debug_assert_eq!(bucket, self.bucket_of(link.key));
        self.chains[bucket].push(link);
        self.len += 1;
    }

    pub fn try_link(&mut self, link: Link) -> Result<(), TryReserveError> {
        let bucket = self.reserve_for(link.key)?;
        self.push_reserved(bucket, link);
        Ok(())
    }

    pub fn unlink(&mut self, bucket: usize, pos: usize) -> Link {
        let link = self.chains[bucket].remove_at(pos);
        self.len -= 1;
        link
    }

    /// First non-empty bucket at or after `from`.
    pub fn next_occupied(&self, from: usize) -> Option<usize> {
        self.chains
            .get(from..)?
            .iter()
            .position(|c| !c.is_empty())
            .map(|off| from + off)
    }

    /// Every link, bucket by bucket, each chain in order.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.chains.iter().flat_map(Chain::iter)
    }

    /// Build a `buckets`-wide array holding the same links. `self` is left
    /// untouched whether or not this succeeds.
    pub fn rebuilt(&self, buckets: usize) -> Result<BucketArray, TableError> {
        let mut grown = BucketArray::try_with_buckets(buckets)?;
        for link in self.links() {
            grown.try_link(*link)?;
        }
        debug_assert_eq!(grown.len, self.len);
        Ok(grown)
    }

    pub fn clear(&mut self) {
        for c in &mut self.chains {
            c.clear();
        }
        self.len = 0;
    }

    /// Length of the longest chain and number of empty buckets.
    pub fn occupancy(&self) -> (usize, usize) {
        self.chains.iter().fold((0, 0), |(longest, empty), c| {
            (longest.max(c.len()), empty + usize::from(c.is_empty()))
        })
    }
}
