//! # Duplicate Detector
//!
//! The run pipeline: load → compare → group → select leads → persist.
//!
//! A run is synchronous and executes to completion or fails as a whole.
//! Configuration is validated before the store is read, and the corpus is
//! fully parsed before anything is compared, so `Config` and `Data` errors
//! never leave a trace in the store. The final write is a single
//! `replace_assignments` transaction.
//!
//! Only one run should target a store at a time; the detector takes no lock.

use crate::comparator::Comparator;
use crate::config::DetectionConfig;
use crate::grouping::assemble_groups;
use crate::loader::{Corpus, load_corpus};
use crate::persister::{build_assignments, persist};
use crate::store::{AssignmentMap, PhotoStore};
use crate::union_find::DisjointSet;
use crate::{DedupeError, DuplicateGroup, Summary};
use serde::{Deserialize, Serialize};

/// Counters describing one run, for the caller to log or display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Similarity used for the run.
    pub similarity_percent: i32,
    /// Hamming distance threshold derived from the similarity.
    pub max_distance: u32,
    /// Number of hashed photos compared.
    pub photos_compared: usize,
    /// Number of pairs within the threshold.
    pub match_pairs: usize,
    /// Group counters.
    pub summary: Summary,
}

/// Everything a run computes before it writes.
#[derive(Debug, Clone)]
pub struct GroupingPlan {
    /// The hashed photos, in identifier order.
    pub corpus: Corpus,
    /// Numbered groups with their leads.
    pub groups: Vec<DuplicateGroup>,
    /// Assignments that persisting the plan would write.
    pub assignments: AssignmentMap,
    /// Run counters.
    pub report: DetectionReport,
}

/// Runs duplicate detection with a fixed, validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    config: DetectionConfig,
}

impl DuplicateDetector {
    /// Create a detector. Fails with `Config` for out-of-range settings.
    pub fn new(config: DetectionConfig) -> Result<Self, DedupeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The detector's configuration.
    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Group an already loaded corpus. Pure; touches no store.
    #[must_use]
    pub fn group(&self, corpus: Corpus) -> GroupingPlan {
        let comparator = Comparator::new(self.config.max_distance(), self.config.chunk_size);

        let mut set = DisjointSet::new(corpus.len());
        let match_pairs = comparator.for_each_match(corpus.hashes(), |pair| {
            set.union(pair.first, pair.second);
        });

        let groups = assemble_groups(&corpus, &mut set);
        let assignments = build_assignments(&corpus, &groups);
        let summary = Summary::from_group_sizes(groups.iter().map(|g| g.members.len()));

        let report = DetectionReport {
            similarity_percent: self.config.similarity_percent,
            max_distance: comparator.max_distance(),
            photos_compared: corpus.len(),
            match_pairs,
            summary,
        };

        GroupingPlan {
            corpus,
            groups,
            assignments,
            report,
        }
    }

    /// Compute the grouping of the store's current contents without writing.
    pub fn plan<S: PhotoStore + ?Sized>(&self, store: &S) -> Result<GroupingPlan, DedupeError> {
        let corpus = load_corpus(store)?;
        Ok(self.group(corpus))
    }

    /// Compute the grouping and replace the store's assignments with it.
    pub fn run<S: PhotoStore + ?Sized>(&self, store: &mut S) -> Result<DetectionReport, DedupeError> {
        let plan = self.plan(store)?;
        persist(store, &plan.assignments)?;
        Ok(plan.report)
    }
}

/// Detect duplicates in `store` and persist the grouping.
///
/// `similarity_percent` must be within 0–100; use
/// [`DEFAULT_SIMILARITY_PERCENT`](crate::primitives::DEFAULT_SIMILARITY_PERCENT)
/// when the caller has no preference.
pub fn detect_duplicates<S: PhotoStore + ?Sized>(
    store: &mut S,
    similarity_percent: i32,
) -> Result<Summary, DedupeError> {
    let detector = DuplicateDetector::new(DetectionConfig::with_similarity(similarity_percent))?;
    Ok(detector.run(store)?.summary)
}
