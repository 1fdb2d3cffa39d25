//! # Core Type Definitions
//!
//! This module contains all core types for the dupegroup engine:
//! - Photo identifiers and hashes (`PhotoId`, `PerceptualHash`)
//! - Store-facing records (`PhotoInput`, `StoredPhoto`, `Assignment`)
//! - Per-run grouping output (`MatchPair`, `GroupId`, `DuplicateGroup`, `Summary`)
//! - Error types (`DedupeError`)
//!
//! ## Determinism Guarantees
//!
//! All identifier types implement `Ord` so they can key `BTreeMap`/`BTreeSet`.
//! Nothing in the engine depends on hash-map iteration order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// PHOTO IDENTIFIERS
// =============================================================================

/// Stable, unique identifier of a photo in the external store (its path).
///
/// Lexicographic order of `PhotoId` is the basis of every deterministic
/// ordering in the engine: corpus order, group numbering, lead tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhotoId(pub String);

impl PhotoId {
    /// Create a new identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 64-bit perceptual hash.
///
/// The engine treats the value as opaque bits; only Hamming distance matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    /// Parse the stored hexadecimal representation.
    ///
    /// Accepts an optional `0x`/`0X` prefix and surrounding whitespace.
    /// Shorter strings are zero-extended on the left. Returns `None` for empty
    /// input, any non-hex character, or a value that does not fit in 64 bits.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        // from_str_radix also accepts a leading '+', which is not a hash.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        u64::from_str_radix(digits, 16).ok().map(Self)
    }

    /// Get the raw 64-bit value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// =============================================================================
// STORE RECORDS
// =============================================================================

/// A photo as supplied to the store by the external scanning/scoring steps.
///
/// `hash` is the fixed-width hex string produced by the hashing step;
/// photos without a hash are kept in the store but never compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoInput {
    /// Stable identifier (path).
    pub identifier: PhotoId,
    /// Perceptual hash as hex text, if one has been computed.
    #[serde(default)]
    pub hash: Option<String>,
    /// Quality score, if one has been computed.
    #[serde(default)]
    pub quality: Option<f64>,
}

impl PhotoInput {
    /// Create a new photo input.
    #[must_use]
    pub fn new(identifier: impl Into<String>, hash: Option<&str>, quality: Option<f64>) -> Self {
        Self {
            identifier: PhotoId::new(identifier),
            hash: hash.map(str::to_string),
            quality,
        }
    }
}

/// Sequential duplicate group number, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Get the raw group number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group membership written back to the store for one photo.
///
/// Photos outside any group have no assignment at all (group id "none",
/// lead flag false).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The group the photo belongs to.
    pub group_id: GroupId,
    /// Whether the photo is the group's lead.
    pub is_lead: bool,
}

/// A full row as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPhoto {
    /// Stable identifier (path).
    pub identifier: PhotoId,
    /// Perceptual hash as hex text.
    pub hash: Option<String>,
    /// Quality score.
    pub quality: Option<f64>,
    /// Current group assignment, `None` for ungrouped photos.
    pub assignment: Option<Assignment>,
}

// =============================================================================
// PER-RUN GROUPING OUTPUT
// =============================================================================

/// Two corpus indices whose hashes are within the distance threshold.
///
/// Always normalized so that `first < second`. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchPair {
    /// The lower corpus index.
    pub first: usize,
    /// The higher corpus index.
    pub second: usize,
}

/// A connected component of two or more photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Sequential group number.
    pub id: GroupId,
    /// Corpus indices of the members, ascending.
    pub members: Vec<usize>,
    /// Corpus index of the lead member.
    pub lead: usize,
}

impl DuplicateGroup {
    /// Members that would be hidden behind the lead.
    pub fn hidden_members(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied().filter(|&m| m != self.lead)
    }
}

/// Outcome counters of one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Number of duplicate groups found.
    pub groups: usize,
    /// Total photos belonging to a group.
    pub photos: usize,
    /// Non-lead duplicates (`photos - groups`).
    pub hidden: usize,
}

impl Summary {
    /// Build a summary from group sizes.
    #[must_use]
    pub fn from_group_sizes(sizes: impl IntoIterator<Item = usize>) -> Self {
        let mut groups = 0usize;
        let mut photos = 0usize;
        for size in sizes {
            groups = groups.saturating_add(1);
            photos = photos.saturating_add(size);
        }
        Self {
            groups,
            photos,
            hidden: photos.saturating_sub(groups),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the dupegroup engine.
///
/// - `Config` and `Data` are raised before anything is written
/// - `Store` is propagated from the backend unmodified; no retries
#[derive(Debug, Error)]
pub enum DedupeError {
    /// Invalid configuration (similarity out of range, zero chunk size, bad file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored value cannot be interpreted (malformed hash, duplicate identifier).
    #[error("Data error for '{identifier}': {message}")]
    Data {
        /// The photo whose record is malformed.
        identifier: PhotoId,
        /// What was wrong with it.
        message: String,
    },

    /// The photo store failed to read or write.
    #[error("Store error: {0}")]
    Store(String),
}

// =============================================================================
// TESTS
// =============================================================================
