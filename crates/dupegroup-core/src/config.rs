//! # Detection Configuration
//!
//! The similarity threshold and the comparator chunk size.
//!
//! `similarity_percent` is the percentage of the 64 hash bits that must agree.
//! It is converted to a maximum Hamming distance with integer arithmetic:
//!
//! ```text
//! max_distance = floor(64 × (100 − similarity_percent) / 100)
//! ```

use crate::primitives::{
    DEFAULT_CHUNK_SIZE, DEFAULT_SIMILARITY_PERCENT, HASH_BITS, MAX_SIMILARITY_PERCENT,
};
use crate::DedupeError;
use serde::{Deserialize, Serialize};

/// Settings for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Required similarity, 0–100.
    pub similarity_percent: i32,
    /// Rows per comparator batch. Must be at least 1.
    pub chunk_size: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_percent: DEFAULT_SIMILARITY_PERCENT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DetectionConfig {
    /// Config with the given similarity and the default chunk size.
    #[must_use]
    pub fn with_similarity(similarity_percent: i32) -> Self {
        Self {
            similarity_percent,
            ..Self::default()
        }
    }

    /// Replace the chunk size.
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reject out-of-range values. No clamping, no substitution.
    pub fn validate(&self) -> Result<(), DedupeError> {
        if !(0..=MAX_SIMILARITY_PERCENT).contains(&self.similarity_percent) {
            return Err(DedupeError::Config(format!(
                "similarity_percent must be within 0..={}, got {}",
                MAX_SIMILARITY_PERCENT, self.similarity_percent
            )));
        }
        if self.chunk_size == 0 {
            return Err(DedupeError::Config(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest Hamming distance that still counts as a match.
    ///
    /// Only meaningful after `validate`; out-of-range similarities saturate
    /// to the nearest bound.
    #[must_use]
    pub fn max_distance(&self) -> u32 {
        let percent = self.similarity_percent.clamp(0, MAX_SIMILARITY_PERCENT) as u32;
        HASH_BITS * (MAX_SIMILARITY_PERCENT as u32 - percent) / MAX_SIMILARITY_PERCENT as u32
    }
}
