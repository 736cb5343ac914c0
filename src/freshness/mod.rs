//! Freshness detection: blake3 content hashes for inputs and includes.

mod hash;
mod includes;

pub use hash::ContentHash;
pub use includes::IncludeHashes;
