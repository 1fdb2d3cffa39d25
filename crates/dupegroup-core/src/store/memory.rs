//! # In-Memory Store
//!
//! `BTreeMap`-backed photo store. Used by tests and by library callers that
//! keep their corpus in memory.

use super::{AssignmentMap, PhotoStore, unknown_photo};
use crate::{Assignment, DedupeError, PhotoId, PhotoInput, StoredPhoto};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    hash: Option<String>,
    quality: Option<f64>,
    assignment: Option<Assignment>,
}

/// A volatile photo store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    rows: BTreeMap<PhotoId, Row>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `photos`.
    #[must_use]
    pub fn with_photos(photos: &[PhotoInput]) -> Self {
        let mut store = Self::new();
        for photo in photos {
            store.put(photo);
        }
        store
    }

    /// Assignment of a single photo, `None` if ungrouped or unknown.
    #[must_use]
    pub fn assignment(&self, identifier: &str) -> Option<Assignment> {
        self.rows
            .get(&PhotoId::new(identifier))
            .and_then(|row| row.assignment)
    }

    fn put(&mut self, photo: &PhotoInput) {
        let row = self.rows.entry(photo.identifier.clone()).or_insert(Row {
            hash: None,
            quality: None,
            assignment: None,
        });
        row.hash.clone_from(&photo.hash);
        row.quality = photo.quality;
    }
}

impl PhotoStore for MemoryStore {
    fn photos(&self) -> Result<Vec<StoredPhoto>, DedupeError> {
        Ok(self
            .rows
            .iter()
            .map(|(id, row)| StoredPhoto {
                identifier: id.clone(),
                hash: row.hash.clone(),
                quality: row.quality,
                assignment: row.assignment,
            })
            .collect())
    }

    fn replace_assignments(&mut self, assignments: &AssignmentMap) -> Result<(), DedupeError> {
        // Validate before touching any row so failure leaves the store as it was.
        if let Some(missing) = assignments.keys().find(|id| !self.rows.contains_key(*id)) {
            return Err(unknown_photo(missing));
        }

        for (id, row) in &mut self.rows {
            row.assignment = assignments.get(id).copied();
        }
        Ok(())
    }

    fn upsert_photos(&mut self, photos: &[PhotoInput]) -> Result<usize, DedupeError> {
        for photo in photos {
            self.put(photo);
        }
        Ok(photos.len())
    }

    fn photo_count(&self) -> Result<usize, DedupeError> {
        Ok(self.rows.len())
    }
}
