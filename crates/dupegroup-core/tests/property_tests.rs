//! # Property-Based Tests
//!
//! Grouping invariants checked with proptest against a brute-force reference.

use dupegroup_core::{
    AssignmentMap, Comparator, DetectionConfig, DuplicateDetector, MemoryStore, PhotoId,
    PhotoInput, PhotoStore, persisted_groups,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const BASES: [u64; 4] = [
    0x0000_0000_0000_0000,
    0xffff_0000_ffff_0000,
    0x0f0f_0f0f_0f0f_0f0f,
    0xffff_ffff_ffff_ffff,
];

const QUALITIES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Photos clustered around a few base hashes so that matches are common.
fn photo_strategy() -> impl Strategy<Value = Vec<PhotoInput>> {
    vec((0usize..4, 0u32..64, 0u32..64, 0u32..64, 0usize..5), 1..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .rev()
            .map(|(i, (base, x, y, z, quality))| {
                let flips = (1u64 << x) | (1u64 << y) | (1u64 << z);
                let hash = BASES[base] ^ flips;
                PhotoInput::new(
                    format!("img-{i:03}"),
                    Some(&format!("{hash:016x}")),
                    Some(QUALITIES[quality]),
                )
            })
            .collect()
    })
}

/// Connected components of the "within threshold" graph, by plain BFS.
fn reference_groups(photos: &[PhotoInput], max_distance: u32) -> BTreeSet<BTreeSet<String>> {
    let mut nodes: Vec<(String, u64)> = photos
        .iter()
        .map(|p| {
            let hash = p
                .hash
                .as_deref()
                .and_then(|h| u64::from_str_radix(h, 16).ok())
                .unwrap_or_default();
            (p.identifier.as_str().to_string(), hash)
        })
        .collect();
    nodes.sort();

    let mut seen = vec![false; nodes.len()];
    let mut groups = BTreeSet::new();
    for start in 0..nodes.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut queue = vec![start];
        let mut component = BTreeSet::new();
        while let Some(i) = queue.pop() {
            component.insert(nodes[i].0.clone());
            for j in 0..nodes.len() {
                if !seen[j] && (nodes[i].1 ^ nodes[j].1).count_ones() <= max_distance {
                    seen[j] = true;
                    queue.push(j);
                }
            }
        }
        if component.len() > 1 {
            groups.insert(component);
        }
    }
    groups
}

fn run(photos: &[PhotoInput], config: DetectionConfig) -> (MemoryStore, AssignmentMap) {
    let mut store = MemoryStore::with_photos(photos);
    DuplicateDetector::new(config)
        .expect("config")
        .run(&mut store)
        .expect("run");
    let assignments = store.assignments().expect("assignments");
    (store, assignments)
}

fn quality_of(photos: &[PhotoInput], id: &PhotoId) -> f64 {
    photos
        .iter()
        .find(|p| &p.identifier == id)
        .and_then(|p| p.quality)
        .unwrap_or_default()
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Groups are exactly the connected components of the match graph.
    #[test]
    fn groups_equal_transitive_closure(
        photos in photo_strategy(),
        similarity in 80i32..=100
    ) {
        let config = DetectionConfig::with_similarity(similarity);
        let (store, _) = run(&photos, config);

        let actual: BTreeSet<BTreeSet<String>> = persisted_groups(&store)
            .expect("groups")
            .into_iter()
            .map(|g| g.members.iter().map(|m| m.as_str().to_string()).collect())
            .collect();

        prop_assert_eq!(actual, reference_groups(&photos, config.max_distance()));
    }

    /// Every group has exactly one lead, of maximal quality, smallest id on ties.
    #[test]
    fn one_lead_per_group_with_max_quality(photos in photo_strategy()) {
        let (store, _) = run(&photos, DetectionConfig::default());

        for group in persisted_groups(&store).expect("groups") {
            prop_assert!(group.members.len() >= 2);
            let lead = group.lead.clone();
            prop_assert!(lead.is_some());
            let lead = lead.unwrap_or_else(|| PhotoId::new(""));

            let lead_quality = quality_of(&photos, &lead);
            for member in &group.members {
                let q = quality_of(&photos, member);
                prop_assert!(q <= lead_quality);
                if q.to_bits() == lead_quality.to_bits() {
                    prop_assert!(lead <= *member);
                }
            }
        }
    }

    /// Group ids are 1..=G, numbered by each group's smallest identifier.
    #[test]
    fn group_ids_are_dense_and_ordered(photos in photo_strategy()) {
        let (store, _) = run(&photos, DetectionConfig::default());
        let groups = persisted_groups(&store).expect("groups");

        let mut previous_min: Option<PhotoId> = None;
        for (index, group) in groups.iter().enumerate() {
            prop_assert_eq!(group.id.value(), index as u64 + 1);
            let min = group.members.iter().min().cloned();
            prop_assert!(min.is_some());
            if let (Some(prev), Some(current)) = (&previous_min, &min) {
                prop_assert!(prev < current);
            }
            previous_min = min;
        }
    }

    /// A second run over unchanged data writes identical assignments.
    #[test]
    fn rerun_is_idempotent(photos in photo_strategy()) {
        let (mut store, first) = run(&photos, DetectionConfig::default());
        DuplicateDetector::new(DetectionConfig::default())
            .expect("config")
            .run(&mut store)
            .expect("rerun");
        prop_assert_eq!(store.assignments().expect("assignments"), first);
    }

    /// Input order does not change the result.
    #[test]
    fn insertion_order_is_irrelevant(photos in photo_strategy()) {
        let (_, forward) = run(&photos, DetectionConfig::default());
        let reversed: Vec<_> = photos.iter().rev().cloned().collect();
        let (_, backward) = run(&reversed, DetectionConfig::default());
        prop_assert_eq!(forward, backward);
    }

    /// Chunk size affects memory only, never the outcome.
    #[test]
    fn chunk_size_is_irrelevant(
        photos in photo_strategy(),
        chunk in 1usize..50
    ) {
        let (_, baseline) = run(&photos, DetectionConfig::default());
        let (_, chunked) = run(&photos, DetectionConfig::default().chunk_size(chunk));
        prop_assert_eq!(baseline, chunked);
    }

    /// The comparator reports each pair once, smaller index first.
    #[test]
    fn comparator_pairs_are_unique(
        hashes in vec(any::<u64>(), 0..60),
        max_distance in 0u32..=64,
        chunk in 1usize..20
    ) {
        let pairs = Comparator::new(max_distance, chunk).matches(&hashes);
        let expected = (0..hashes.len())
            .flat_map(|i| (i + 1..hashes.len()).map(move |j| (i, j)))
            .filter(|&(i, j)| (hashes[i] ^ hashes[j]).count_ones() <= max_distance)
            .count();
        prop_assert_eq!(pairs.len(), expected);

        let mut seen = BTreeMap::new();
        for pair in &pairs {
            prop_assert!(pair.first < pair.second);
            prop_assert!(seen.insert((pair.first, pair.second), ()).is_none());
            prop_assert!((hashes[pair.first] ^ hashes[pair.second]).count_ones() <= max_distance);
        }
    }
}
