//! # Comparator
//!
//! Exact all-pairs Hamming comparison in memory-bounded chunks.
//!
//! Rows are processed `chunk_size` at a time. Each row `i` of a chunk is
//! compared against every `j > i` in one batch, so every unordered pair is
//! visited exactly once and no `n × n` matrix is ever built. Rows of a chunk
//! run on the rayon pool; their results are gathered in row order, so the
//! emitted pair sequence is ascending `(first, second)` for any thread count.
//!
//! Peak scratch memory is `O(chunk_size × n)`.

use crate::popcount::batch_distances;
use crate::MatchPair;
use rayon::prelude::*;

/// Pairwise comparator for a fixed threshold and chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    max_distance: u32,
    chunk_size: usize,
}

impl Comparator {
    /// Create a comparator. A chunk size of 0 is treated as 1.
    #[must_use]
    pub fn new(max_distance: u32, chunk_size: usize) -> Self {
        Self {
            max_distance,
            chunk_size: chunk_size.max(1),
        }
    }

    /// The match threshold in bits.
    #[must_use]
    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Call `emit` for every pair within the threshold. Returns the pair count.
    pub fn for_each_match<F>(&self, hashes: &[u64], mut emit: F) -> usize
    where
        F: FnMut(MatchPair),
    {
        let n = hashes.len();
        let mut emitted = 0usize;
        let mut start = 0usize;

        while start < n {
            let end = start.saturating_add(self.chunk_size).min(n);

            let rows: Vec<Vec<usize>> = (start..end)
                .into_par_iter()
                .map_init(Vec::new, |distances, i| self.row_matches(hashes, i, distances))
                .collect();

            for (offset, row) in rows.into_iter().enumerate() {
                let first = start + offset;
                for second in row {
                    emit(MatchPair { first, second });
                    emitted = emitted.saturating_add(1);
                }
            }

            start = end;
        }

        emitted
    }

    /// Collect every matching pair, ascending.
    #[must_use]
    pub fn matches(&self, hashes: &[u64]) -> Vec<MatchPair> {
        let mut pairs = Vec::new();
        self.for_each_match(hashes, |pair| pairs.push(pair));
        pairs
    }

    /// Indices `j > i` whose distance to row `i` is within the threshold.
    fn row_matches(&self, hashes: &[u64], i: usize, distances: &mut Vec<u8>) -> Vec<usize> {
        let offset = i + 1;
        let Some(rest) = hashes.get(offset..) else {
            return Vec::new();
        };
        batch_distances(hashes[i], rest, distances);

        distances
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d as u32 <= self.max_distance)
            .map(|(k, _)| offset + k)
            .collect()
    }
}
