//! # Grouping & Lead Selection
//!
//! Turns union-find components into numbered duplicate groups.
//!
//! - Singletons are dropped.
//! - Groups are numbered from 1 in order of their lexicographically smallest
//!   member identifier. The corpus is sorted by identifier, so this is the
//!   order of each component's smallest index.
//! - The lead is the member with the highest quality; ties go to the smallest
//!   identifier.

use crate::loader::Corpus;
use crate::union_find::DisjointSet;
use crate::{DuplicateGroup, GroupId};
use std::cmp::Ordering;

/// Build the numbered groups of every component with at least two members.
pub fn assemble_groups(corpus: &Corpus, set: &mut DisjointSet) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();

    for members in set.components() {
        if members.len() < 2 {
            continue;
        }
        let Some(lead) = select_lead(corpus, &members) else {
            continue;
        };
        let id = GroupId(groups.len() as u64 + 1);
        groups.push(DuplicateGroup { id, members, lead });
    }

    groups
}

/// Pick the lead of a member list, `None` if it is empty.
///
/// Pure function of the members' quality and identifiers; the order of
/// `members` does not matter.
#[must_use]
pub fn select_lead(corpus: &Corpus, members: &[usize]) -> Option<usize> {
    members.iter().copied().reduce(|best, candidate| {
        if outranks(corpus, candidate, best) {
            candidate
        } else {
            best
        }
    })
}

fn outranks(corpus: &Corpus, candidate: usize, incumbent: usize) -> bool {
    // Loader replaces NaN, so partial_cmp only sees comparable values.
    let by_quality = corpus
        .quality(candidate)
        .partial_cmp(&corpus.quality(incumbent))
        .unwrap_or(Ordering::Equal);

    match by_quality {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => corpus.id(candidate) < corpus.id(incumbent),
    }
}
