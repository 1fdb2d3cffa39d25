//! # Photo Stores
//!
//! The read/write contract between the engine and the photo store.
//!
//! The store owns the corpus. The engine reads every row, and writes back
//! only group assignments, always through `replace_assignments`, which must
//! move the store from the old grouping to the new one atomically.
//!
//! Two backends are provided:
//! - `MemoryStore`: `BTreeMap`-backed, volatile
//! - `RedbStore`: disk-backed redb database, ACID

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::{Assignment, DedupeError, PhotoId, PhotoInput, StoredPhoto};
use std::collections::BTreeMap;

/// Full set of assignments produced by one run, keyed by photo.
///
/// Photos absent from the map are ungrouped.
pub type AssignmentMap = BTreeMap<PhotoId, Assignment>;

/// The photo store contract.
///
/// All fallible operations return `Result<T, DedupeError>`; backend failures
/// surface as `DedupeError::Store`.
pub trait PhotoStore {
    /// Every photo row, in identifier order.
    fn photos(&self) -> Result<Vec<StoredPhoto>, DedupeError>;

    /// Clear every assignment, then apply `assignments`, as one transaction.
    ///
    /// Fails without changing anything if an assigned photo is unknown.
    fn replace_assignments(&mut self, assignments: &AssignmentMap) -> Result<(), DedupeError>;

    /// Insert or update photos. Existing assignments are kept until the next
    /// run. Returns the number of rows written.
    fn upsert_photos(&mut self, photos: &[PhotoInput]) -> Result<usize, DedupeError>;

    /// Total number of photos, hashed or not.
    fn photo_count(&self) -> Result<usize, DedupeError>;

    /// Current assignments of every grouped photo.
    fn assignments(&self) -> Result<AssignmentMap, DedupeError> {
        Ok(self
            .photos()?
            .into_iter()
            .filter_map(|photo| photo.assignment.map(|a| (photo.identifier, a)))
            .collect())
    }
}

/// Error for an assignment that names a photo the store does not hold.
pub(crate) fn unknown_photo(identifier: &PhotoId) -> DedupeError {
    DedupeError::Store(format!(
        "cannot assign unknown photo '{}'; store changed during the run",
        identifier
    ))
}
