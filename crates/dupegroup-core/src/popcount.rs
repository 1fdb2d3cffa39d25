//! # Hamming Distance
//!
//! Bit-difference counting between 64-bit perceptual hashes.
//!
//! The distance is `popcount(a XOR b)`. Popcount sums a 256-entry byte table
//! over the 8 bytes of the XOR result; the table is built at compile time and
//! shared read-only by every thread.

/// Number of set bits for every byte value.
pub static POPCOUNT_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 1;
    while i < 256 {
        table[i] = (i & 1) as u8 + table[i >> 1];
        i += 1;
    }
    table
}

/// Number of differing bits between two hashes.
#[inline]
#[must_use]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b)
        .to_le_bytes()
        .iter()
        .map(|&byte| POPCOUNT_TABLE[byte as usize] as u32)
        .sum()
}

/// Distances from `probe` to every hash in `others`, written into `out`.
///
/// `out` is cleared first and reused across calls so a batch allocates once.
/// Distances never exceed 64 and are stored as bytes.
pub fn batch_distances(probe: u64, others: &[u64], out: &mut Vec<u8>) {
    out.clear();
    out.extend(others.iter().map(|&other| hamming_distance(probe, other) as u8));
}
