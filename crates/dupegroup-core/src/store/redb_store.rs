//! # redb-backed Photo Store
//!
//! A disk-backed photo store using the redb embedded database, providing:
//! - ACID transactions (the whole clear+write of a run commits or aborts)
//! - Crash safety (copy-on-write B-trees)
//! - Single-writer locking of the database file
//!
//! One table maps the photo identifier to its postcard-encoded row.
//! Keys are iterated in byte order, which for UTF-8 strings is the same as
//! identifier order.

use super::{AssignmentMap, PhotoStore, unknown_photo};
use crate::{Assignment, DedupeError, PhotoId, PhotoInput, StoredPhoto};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table for photos: identifier -> serialized `PhotoRow` bytes
const PHOTOS: TableDefinition<&str, &[u8]> = TableDefinition::new("photos");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PhotoRow {
    hash: Option<String>,
    quality: Option<f64>,
    assignment: Option<Assignment>,
}

fn decode_row(bytes: &[u8]) -> Result<PhotoRow, DedupeError> {
    postcard::from_bytes(bytes).map_err(|e| DedupeError::Store(format!("corrupt photo row: {}", e)))
}

fn encode_row(row: &PhotoRow) -> Result<Vec<u8>, DedupeError> {
    postcard::to_allocvec(row).map_err(|e| DedupeError::Store(e.to_string()))
}

/// A disk-backed photo store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a photo database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DedupeError> {
        let db = Database::create(path.as_ref()).map_err(|e| DedupeError::Store(e.to_string()))?;

        // Initialize the table if it doesn't exist
        let write_txn = db
            .begin_write()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        let _ = write_txn
            .open_table(PHOTOS)
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        write_txn
            .commit()
            .map_err(|e| DedupeError::Store(e.to_string()))?;

        Ok(Self { db })
    }

    /// Open a photo database that must already exist.
    ///
    /// Never creates the file; a missing path is a `Store` error.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, DedupeError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DedupeError::Store(format!(
                "database '{}' does not exist",
                path.display()
            )));
        }
        let db = Database::open(path).map_err(|e| DedupeError::Store(e.to_string()))?;
        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), DedupeError> {
        self.db
            .compact()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        Ok(())
    }
}

impl PhotoStore for RedbStore {
    fn photos(&self) -> Result<Vec<StoredPhoto>, DedupeError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        let table = read_txn
            .open_table(PHOTOS)
            .map_err(|e| DedupeError::Store(e.to_string()))?;

        let mut photos = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| DedupeError::Store(e.to_string()))?
        {
            let (key, value) = entry.map_err(|e| DedupeError::Store(e.to_string()))?;
            let row = decode_row(value.value())?;
            photos.push(StoredPhoto {
                identifier: PhotoId::new(key.value()),
                hash: row.hash,
                quality: row.quality,
                assignment: row.assignment,
            });
        }
        Ok(photos)
    }

    fn replace_assignments(&mut self, assignments: &AssignmentMap) -> Result<(), DedupeError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(PHOTOS)
                .map_err(|e| DedupeError::Store(e.to_string()))?;

            // Returning early drops the uncommitted transaction, which aborts it.
            for id in assignments.keys() {
                let exists = table
                    .get(id.as_str())
                    .map_err(|e| DedupeError::Store(e.to_string()))?
                    .is_some();
                if !exists {
                    return Err(unknown_photo(id));
                }
            }

            // Clear and assign in one pass; only rows whose state changes are rewritten.
            let mut updates: Vec<(String, Vec<u8>)> = Vec::new();
            for entry in table
                .iter()
                .map_err(|e| DedupeError::Store(e.to_string()))?
            {
                let (key, value) = entry.map_err(|e| DedupeError::Store(e.to_string()))?;
                let id = PhotoId::new(key.value());
                let mut row = decode_row(value.value())?;
                let next = assignments.get(&id).copied();
                if row.assignment != next {
                    row.assignment = next;
                    updates.push((id.0, encode_row(&row)?));
                }
            }

            for (id, bytes) in &updates {
                table
                    .insert(id.as_str(), bytes.as_slice())
                    .map_err(|e| DedupeError::Store(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        Ok(())
    }

    fn upsert_photos(&mut self, photos: &[PhotoInput]) -> Result<usize, DedupeError> {
        if photos.is_empty() {
            return Ok(0);
        }

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(PHOTOS)
                .map_err(|e| DedupeError::Store(e.to_string()))?;

            for photo in photos {
                let assignment = table
                    .get(photo.identifier.as_str())
                    .map_err(|e| DedupeError::Store(e.to_string()))?
                    .map(|existing| decode_row(existing.value()))
                    .transpose()?
                    .and_then(|row| row.assignment);

                let row = PhotoRow {
                    hash: photo.hash.clone(),
                    quality: photo.quality,
                    assignment,
                };
                let bytes = encode_row(&row)?;
                table
                    .insert(photo.identifier.as_str(), bytes.as_slice())
                    .map_err(|e| DedupeError::Store(e.to_string()))?;
            }
        }
        write_txn
            .commit()
            .map_err(|e| DedupeError::Store(e.to_string()))?;

        Ok(photos.len())
    }

    fn photo_count(&self) -> Result<usize, DedupeError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        let table = read_txn
            .open_table(PHOTOS)
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        let count = table
            .len()
            .map_err(|e| DedupeError::Store(e.to_string()))?;
        Ok(count as usize)
    }
}
