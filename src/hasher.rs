//! FNV-1a (64-bit) fingerprints used to derive table keys.

use core::hash::{BuildHasherDefault, Hash, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[inline]
fn fold(mut state: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        state ^= u64::from(b);
        state = state.wrapping_mul(FNV_PRIME);
    }
    state
}

/// FNV-1a over `bytes`.
#[inline]
pub fn hash64(bytes: &[u8]) -> u64 {
    fold(FNV_OFFSET_BASIS, bytes)
}

/// FNV-1a over the little-endian encoding of `value`.
#[inline]
pub fn hash_int64(value: u64) -> u64 {
    hash64(&value.to_le_bytes())
}

/// Streaming FNV-1a state, usable anywhere a `core::hash::Hasher` is expected.
///
/// Feeding the same bytes through `write` in any split produces the same
/// result as a single `hash64` call.
#[derive(Clone, Copy, Debug)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    fn default() -> Self {
        FnvHasher(FNV_OFFSET_BASIS)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = fold(self.0, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

pub type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// Table key for any hashable value.
///
/// Goes through `Hash`, so slices and strings pick up their length prefix or
/// terminator; use [`hash64`] to fingerprint raw bytes.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut h = FnvHasher::default();
    value.hash(&mut h);
    h.finish()
}
