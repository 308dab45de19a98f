//! 64-bit mixing primitives shared by the API fingerprint and `Value` hashing.
//!
//! Every fold in the fingerprint goes through [`fold64`] so that the whole
//! hash is a single deterministic chain. Strings are reduced with xxh64 at a
//! fixed seed, which keeps the result stable across processes and platforms.

use xxhash_rust::xxh64::xxh64;

/// Multiplier for the fold chain. Odd, so the map `acc * K` is a bijection
/// on u64 and no fold step loses information on its own.
const FOLD_K: u64 = 0x0100_0000_01b3;

/// Seed for all string hashing. Changing it invalidates every fingerprint.
const STR_SEED: u64 = 0;

/// Fold one 64-bit term into a running hash.
#[inline]
pub fn fold64(acc: u64, term: u64) -> u64 {
    acc.wrapping_mul(FOLD_K) ^ term
}

/// Stable 64-bit hash of a string (xxh64 at a fixed seed).
#[inline]
pub fn hash_str64(s: &str) -> u64 {
    xxh64(s.as_bytes(), STR_SEED)
}

/// Stable 64-bit hash of a byte slice.
#[inline]
pub fn hash_bytes64(bytes: &[u8]) -> u64 {
    xxh64(bytes, STR_SEED)
}

/// Canonical bit pattern of an f32 for hashing: all NaNs collapse to one
/// pattern and negative zero collapses to positive zero, so values that
/// compare equal hash equal.
#[inline]
pub fn canon_f32_bits(v: f32) -> u32 {
    if v == 0.0 {
        0.0f32.to_bits()
    } else if v.is_nan() {
        f32::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// Canonical bit pattern of an f64. See [`canon_f32_bits`].
#[inline]
pub fn canon_f64_bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}
