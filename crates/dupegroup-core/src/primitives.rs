//! # Engine Primitives
//!
//! Compiled-in constants for the dupegroup engine.

/// Width of a perceptual hash in bits. Also the largest possible distance.
pub const HASH_BITS: u32 = 64;

/// Similarity used when the caller does not specify one.
///
/// At 90% two hashes match when at most 6 of their 64 bits differ.
pub const DEFAULT_SIMILARITY_PERCENT: i32 = 90;

/// Upper bound of the similarity scale.
pub const MAX_SIMILARITY_PERCENT: i32 = 100;

/// Number of corpus rows compared per batch.
///
/// Peak scratch memory of the comparator is `O(DEFAULT_CHUNK_SIZE × n)`.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
