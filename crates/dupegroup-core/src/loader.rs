//! # Loader
//!
//! Reads the comparable part of the store into a `Corpus`.
//!
//! Only photos with a hash take part. The corpus is sorted by identifier so
//! that corpus indices, group numbering and tie-breaks are all a function of
//! the store contents alone. Every hash is parsed before anything else
//! happens; a single malformed hash aborts the load.

use crate::store::PhotoStore;
use crate::{DedupeError, PerceptualHash, PhotoId, StoredPhoto};

/// The hashed photos of one run, as parallel arrays in identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    ids: Vec<PhotoId>,
    hashes: Vec<u64>,
    qualities: Vec<f64>,
}

impl Corpus {
    /// Build a corpus from stored rows.
    ///
    /// Rows without a hash are skipped. Missing or NaN quality becomes 0.0.
    pub fn from_rows(rows: impl IntoIterator<Item = StoredPhoto>) -> Result<Self, DedupeError> {
        let mut entries: Vec<(PhotoId, u64, f64)> = Vec::new();

        for row in rows {
            let Some(text) = row.hash.as_deref() else {
                continue;
            };
            let hash = PerceptualHash::from_hex(text).ok_or_else(|| DedupeError::Data {
                identifier: row.identifier.clone(),
                message: format!("hash '{}' is not a 64-bit hex value", text),
            })?;
            entries.push((row.identifier, hash.value(), normalize_quality(row.quality)));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(pair) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(DedupeError::Data {
                identifier: pair[0].0.clone(),
                message: "identifier appears more than once".to_string(),
            });
        }

        let mut corpus = Self {
            ids: Vec::with_capacity(entries.len()),
            hashes: Vec::with_capacity(entries.len()),
            qualities: Vec::with_capacity(entries.len()),
        };
        for (id, hash, quality) in entries {
            corpus.ids.push(id);
            corpus.hashes.push(hash);
            corpus.qualities.push(quality);
        }
        Ok(corpus)
    }

    /// Number of photos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no photo has a hash.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Hashes, aligned with `ids`.
    #[must_use]
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// Identifier at a corpus index.
    #[must_use]
    pub fn id(&self, index: usize) -> &PhotoId {
        &self.ids[index]
    }

    /// Quality at a corpus index.
    #[must_use]
    pub fn quality(&self, index: usize) -> f64 {
        self.qualities[index]
    }
}

/// Load every hashed photo of the store, sorted by identifier.
pub fn load_corpus<S: PhotoStore + ?Sized>(store: &S) -> Result<Corpus, DedupeError> {
    Corpus::from_rows(store.photos()?)
}

fn normalize_quality(quality: Option<f64>) -> f64 {
    match quality {
        Some(q) if !q.is_nan() => q,
        _ => 0.0,
    }
}
