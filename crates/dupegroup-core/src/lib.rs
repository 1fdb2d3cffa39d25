//! # dupegroup-core
//!
//! The exact duplicate-grouping engine for dupegroup.
//!
//! Given a corpus of photos that each carry a 64-bit perceptual hash and a
//! quality score, the engine finds every pair within a Hamming distance
//! threshold, groups them transitively, and marks one lead per group.
//!
//! ## Pipeline
//!
//! ```text
//! store ──► loader ──► comparator ──► union_find ──► grouping ──► persister ──► store
//!           (sort,     (chunked       (transitive    (ids, leads)  (one
//!            parse)     XOR+popcount)  merge)                       transaction)
//! ```
//!
//! ## Guarantees
//!
//! - Exact: every unordered pair is compared once, O(n²) total
//! - Bounded: comparator scratch memory is O(chunk_size × n)
//! - Deterministic: group numbering and leads depend only on store contents
//! - Atomic: `Config`/`Data` errors write nothing; assignments are replaced
//!   in a single store transaction
//! - Has NO async, NO network, NO logging dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod checksum;
pub mod comparator;
pub mod config;
pub mod detector;
pub mod grouping;
pub mod loader;
pub mod persister;
pub mod popcount;
pub mod primitives;
pub mod store;
pub mod types;
pub mod union_find;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Assignment, DedupeError, DuplicateGroup, GroupId, MatchPair, PerceptualHash, PhotoId,
    PhotoInput, StoredPhoto, Summary,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use comparator::Comparator;
pub use config::DetectionConfig;
pub use detector::{DetectionReport, DuplicateDetector, GroupingPlan, detect_duplicates};
pub use grouping::{assemble_groups, select_lead};
pub use loader::{Corpus, load_corpus};
pub use persister::{PersistedGroup, persisted_groups, persisted_summary};
pub use popcount::hamming_distance;
pub use union_find::DisjointSet;

// =============================================================================
// RE-EXPORTS: Stores
// =============================================================================

pub use store::{AssignmentMap, MemoryStore, PhotoStore, RedbStore};

// =============================================================================
// RE-EXPORTS: Checksums
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use checksum::assignment_checksum;
pub use checksum::canonical_listing;
