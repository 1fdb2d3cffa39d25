//! # Persister
//!
//! Converts a run's groups into store assignments and writes them.
//!
//! The write is always a full replacement: every photo's previous group id
//! and lead flag are cleared and the new state is applied in the same store
//! transaction. A run that finds no groups still clears stale markings.

use crate::loader::Corpus;
use crate::store::{AssignmentMap, PhotoStore};
use crate::{Assignment, DedupeError, DuplicateGroup, GroupId, PhotoId, Summary};
use std::collections::BTreeMap;

/// Assignment of every grouped photo for the given groups.
#[must_use]
pub fn build_assignments(corpus: &Corpus, groups: &[DuplicateGroup]) -> AssignmentMap {
    let mut assignments = AssignmentMap::new();
    for group in groups {
        for &member in &group.members {
            assignments.insert(
                corpus.id(member).clone(),
                Assignment {
                    group_id: group.id,
                    is_lead: member == group.lead,
                },
            );
        }
    }
    assignments
}

/// Replace all stored assignments with `assignments`.
pub fn persist<S: PhotoStore + ?Sized>(
    store: &mut S,
    assignments: &AssignmentMap,
) -> Result<(), DedupeError> {
    store.replace_assignments(assignments)
}

/// A group as currently recorded in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedGroup {
    /// Group number.
    pub id: GroupId,
    /// Photo flagged as lead, if the stored state has one.
    pub lead: Option<PhotoId>,
    /// All members in identifier order.
    pub members: Vec<PhotoId>,
}

/// Read the stored assignments back as groups, ordered by group id.
pub fn persisted_groups<S: PhotoStore + ?Sized>(
    store: &S,
) -> Result<Vec<PersistedGroup>, DedupeError> {
    let mut by_id: BTreeMap<GroupId, PersistedGroup> = BTreeMap::new();

    for (photo, assignment) in store.assignments()? {
        let group = by_id
            .entry(assignment.group_id)
            .or_insert_with(|| PersistedGroup {
                id: assignment.group_id,
                lead: None,
                members: Vec::new(),
            });
        if assignment.is_lead {
            group.lead = Some(photo.clone());
        }
        group.members.push(photo);
    }

    Ok(by_id.into_values().collect())
}

/// Summary of the groups currently recorded in the store.
pub fn persisted_summary<S: PhotoStore + ?Sized>(store: &S) -> Result<Summary, DedupeError> {
    let groups = persisted_groups(store)?;
    Ok(Summary::from_group_sizes(groups.iter().map(|g| g.members.len())))
}
