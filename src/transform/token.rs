//! Build-time token substitution.
//!
//! - `{MAGIC_TIME}` → Unix timestamp of the build, in seconds
//! - `{MAGIC_HASH}` → short identifier derived from the same timestamp
//!
//! Both tokens are derived from one timestamp taken at the start of the
//! build, so every file of a build sees the same values.

use std::time::{SystemTime, UNIX_EPOCH};

pub const TIME_TOKEN: &str = "{MAGIC_TIME}";
pub const HASH_TOKEN: &str = "{MAGIC_HASH}";

/// Digit alphabet for [`unique_identifier`], most significant digit first.
const ALPHABET: &[u8; 16] = b"if1k2dLJHswO3N45";

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Encode `secs` in base 16 over [`ALPHABET`], without leading-zero padding.
///
/// Two builds within the same second produce the same identifier.
pub fn unique_identifier(secs: u64) -> String {
    let base = ALPHABET.len() as u64;
    let mut digits = Vec::new();
    let mut rest = secs;
    while rest > 0 {
        digits.push(ALPHABET[(rest % base) as usize]);
        rest /= base;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Replace both tokens in `content`.
pub fn substitute(content: &str, now: u64) -> String {
    let mut out = content.replace(TIME_TOKEN, &now.to_string());
    if out.contains(HASH_TOKEN) {
        out = out.replace(HASH_TOKEN, &unique_identifier(now));
    }
    out
}
