//! Fast non-cryptographic hashing using FxHash.
//!
//! Used for manifest change detection, where a short deterministic hash is
//! enough. Content identity for caching goes through
//! [`crate::freshness::ContentHash`] instead.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute("abc"), compute(b"abc"));
        assert_ne!(compute("abc"), compute("abd"));
    }
}
