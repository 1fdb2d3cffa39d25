//! # Detection Scenario Tests
//!
//! End-to-end runs against concrete corpora.
//!
//! ## Groups
//! - Distance: XOR/popcount edge values
//! - Grouping: transitivity, singletons, lead selection
//! - Thresholds: 0% and 100% boundaries
//! - Lifecycle: idempotence, clearing, error atomicity

#![allow(clippy::unwrap_used, clippy::panic)]

use dupegroup_core::{
    Assignment, DedupeError, DetectionConfig, DuplicateDetector, GroupId, MemoryStore,
    PhotoInput, PhotoStore, RedbStore, Summary, detect_duplicates, hamming_distance,
    persisted_groups,
};
use tempfile::tempdir;

fn photo(id: &str, hash: u64, quality: f64) -> PhotoInput {
    PhotoInput::new(id, Some(&format!("{:016x}", hash)), Some(quality))
}

// a, b, c within 3 bits of each other; e is 5 bits from a but 7-8 bits from
// b and c; d is at least 48 bits from everything.
const HASH_A: u64 = 0x0000_0000_0000_0000;
const HASH_B: u64 = 0x0000_0000_0000_0007;
const HASH_C: u64 = 0x0000_0000_0000_0003;
const HASH_D: u64 = 0xffff_ffff_ffff_0000;
const HASH_E: u64 = 0x0000_0000_0000_1f00;

fn five_photo_store() -> MemoryStore {
    MemoryStore::with_photos(&[
        photo("e", HASH_E, 0.95),
        photo("d", HASH_D, 0.99),
        photo("c", HASH_C, 0.40),
        photo("b", HASH_B, 0.80),
        photo("a", HASH_A, 0.60),
    ])
}

// =============================================================================
// DISTANCE
// =============================================================================

mod distance {
    use super::*;

    #[test]
    fn all_bits_differ() {
        assert_eq!(hamming_distance(0, u64::MAX), 64);
    }

    #[test]
    fn self_distance_is_zero() {
        assert_eq!(hamming_distance(HASH_D, HASH_D), 0);
    }

    #[test]
    fn one_bit_apart() {
        assert_eq!(hamming_distance(0x8000_0000_0000_0000, 0), 1);
    }

    #[test]
    fn scenario_hashes_are_as_described() {
        assert!(hamming_distance(HASH_A, HASH_B) <= 3);
        assert!(hamming_distance(HASH_A, HASH_C) <= 3);
        assert!(hamming_distance(HASH_B, HASH_C) <= 3);
        assert_eq!(hamming_distance(HASH_A, HASH_E), 5);
        assert!(hamming_distance(HASH_B, HASH_E) > 6);
        assert!(hamming_distance(HASH_C, HASH_E) > 6);
        for other in [HASH_A, HASH_B, HASH_C, HASH_E] {
            assert!(hamming_distance(HASH_D, other) >= 40);
        }
    }
}

// =============================================================================
// GROUPING
// =============================================================================

mod grouping {
    use super::*;

    #[test]
    fn five_photo_scenario() {
        let mut store = five_photo_store();
        let summary = detect_duplicates(&mut store, 90).unwrap();

        assert_eq!(
            summary,
            Summary {
                groups: 1,
                photos: 4,
                hidden: 3
            }
        );

        for id in ["a", "b", "c", "e"] {
            let assignment = store.assignment(id).unwrap();
            assert_eq!(assignment.group_id, GroupId(1), "{id}");
        }
        assert_eq!(store.assignment("d"), None);

        // e has the highest quality inside the group; d is higher but ungrouped.
        assert!(store.assignment("e").unwrap().is_lead);
        for id in ["a", "b", "c"] {
            assert!(!store.assignment(id).unwrap().is_lead, "{id}");
        }
    }

    #[test]
    fn transitive_chain_forms_one_group() {
        // Each neighbour differs by 4 bits; the ends differ by 12.
        let mut store = MemoryStore::with_photos(&[
            photo("p1", 0x0000, 0.1),
            photo("p2", 0x000f, 0.2),
            photo("p3", 0x00ff, 0.3),
            photo("p4", 0x0fff, 0.4),
        ]);
        assert!(hamming_distance(0x0000, 0x0fff) > 6);

        let summary = detect_duplicates(&mut store, 90).unwrap();
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.photos, 4);
        assert!(store.assignment("p4").unwrap().is_lead);
    }

    #[test]
    fn group_ids_follow_smallest_identifier() {
        let mut store = MemoryStore::with_photos(&[
            photo("zz-1", 0xff00_0000_0000_0000, 0.5),
            photo("aa-2", 0x0000_0000_0000_0001, 0.5),
            photo("zz-2", 0xff00_0000_0000_0001, 0.5),
            photo("mm-1", 0x0000_0000_0000_0000, 0.5),
        ]);
        detect_duplicates(&mut store, 90).unwrap();

        // {aa-2, mm-1} holds "aa-2", smaller than anything in {zz-1, zz-2}.
        assert_eq!(store.assignment("aa-2").unwrap().group_id, GroupId(1));
        assert_eq!(store.assignment("mm-1").unwrap().group_id, GroupId(1));
        assert_eq!(store.assignment("zz-1").unwrap().group_id, GroupId(2));

        // Equal quality: the smallest identifier leads.
        assert!(store.assignment("aa-2").unwrap().is_lead);
        assert!(store.assignment("zz-1").unwrap().is_lead);
    }

    #[test]
    fn missing_quality_counts_as_zero() {
        let mut store = MemoryStore::with_photos(&[
            PhotoInput::new("a", Some("00"), None),
            PhotoInput::new("b", Some("01"), Some(0.0)),
            PhotoInput::new("c", Some("03"), Some(-0.5)),
        ]);
        detect_duplicates(&mut store, 90).unwrap();

        // a (None → 0.0) ties with b (0.0); "a" is smaller.
        assert!(store.assignment("a").unwrap().is_lead);
        assert!(!store.assignment("b").unwrap().is_lead);
        assert!(!store.assignment("c").unwrap().is_lead);
    }

    #[test]
    fn unhashed_photos_are_never_grouped() {
        let mut store = MemoryStore::with_photos(&[
            photo("a", 0, 0.1),
            photo("b", 0, 0.2),
            PhotoInput::new("c", None, Some(1.0)),
        ]);
        let summary = detect_duplicates(&mut store, 100).unwrap();
        assert_eq!(summary.photos, 2);
        assert_eq!(store.assignment("c"), None);
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

mod thresholds {
    use super::*;

    #[test]
    fn full_similarity_groups_only_identical_hashes() {
        let mut store = MemoryStore::with_photos(&[
            photo("a", 0x1234, 0.1),
            photo("b", 0x1234, 0.2),
            photo("c", 0x1235, 0.3),
        ]);
        let summary = detect_duplicates(&mut store, 100).unwrap();
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.photos, 2);
        assert_eq!(store.assignment("c"), None);
        assert!(store.assignment("b").unwrap().is_lead);
    }

    #[test]
    fn zero_similarity_groups_everything() {
        let mut store = five_photo_store();
        let summary = detect_duplicates(&mut store, 0).unwrap();
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.photos, 5);
        assert_eq!(summary.hidden, 4);
        assert!(store.assignment("d").unwrap().is_lead);
    }

    #[test]
    fn out_of_range_similarity_is_config_error() {
        let mut store = five_photo_store();
        for bad in [-5, 101, 1000] {
            let result = detect_duplicates(&mut store, bad);
            assert!(matches!(result, Err(DedupeError::Config(_))), "{bad}");
        }
        assert!(store.assignments().unwrap().is_empty());
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn rerun_is_idempotent() {
        let mut store = five_photo_store();
        detect_duplicates(&mut store, 90).unwrap();
        let first = store.assignments().unwrap();

        detect_duplicates(&mut store, 90).unwrap();
        assert_eq!(store.assignments().unwrap(), first);
    }

    #[test]
    fn no_match_run_clears_stale_markings() {
        let mut store = five_photo_store();
        detect_duplicates(&mut store, 90).unwrap();
        assert!(!store.assignments().unwrap().is_empty());

        let summary = detect_duplicates(&mut store, 100).unwrap();
        assert_eq!(summary, Summary::default());
        assert!(store.assignments().unwrap().is_empty());
    }

    #[test]
    fn run_after_hashes_cleared_clears_markings() {
        let mut store = five_photo_store();
        detect_duplicates(&mut store, 90).unwrap();

        let unhashed: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| PhotoInput::new(*id, None, None))
            .collect();
        store.upsert_photos(&unhashed).unwrap();

        detect_duplicates(&mut store, 90).unwrap();
        assert!(store.assignments().unwrap().is_empty());
    }

    #[test]
    fn malformed_hash_aborts_without_writing() {
        let mut store = five_photo_store();
        detect_duplicates(&mut store, 90).unwrap();
        let before = store.assignments().unwrap();

        store
            .upsert_photos(&[PhotoInput::new("f", Some("xyz"), Some(1.0))])
            .unwrap();
        let result = detect_duplicates(&mut store, 0);

        match result {
            Err(DedupeError::Data { identifier, .. }) => assert_eq!(identifier.as_str(), "f"),
            other => panic!("expected data error, got {other:?}"),
        }
        assert_eq!(store.assignments().unwrap(), before);
    }

    #[test]
    fn dry_run_plan_matches_persisted_result() {
        let mut store = five_photo_store();
        let detector = DuplicateDetector::new(DetectionConfig::default()).unwrap();

        let plan = detector.plan(&store).unwrap();
        let report = detector.run(&mut store).unwrap();

        assert_eq!(plan.report, report);
        assert_eq!(plan.assignments, store.assignments().unwrap());
    }

    #[test]
    fn redb_store_end_to_end() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("photos.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store
                .upsert_photos(&[
                    photo("a", HASH_A, 0.60),
                    photo("b", HASH_B, 0.80),
                    photo("c", HASH_C, 0.40),
                    photo("d", HASH_D, 0.99),
                    photo("e", HASH_E, 0.95),
                ])
                .expect("upsert");
            detect_duplicates(&mut store, 90).expect("detect");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        let groups = persisted_groups(&store).expect("groups");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, GroupId(1));
        assert_eq!(groups[0].lead.as_ref().map(|id| id.as_str()), Some("e"));
        let members: Vec<_> = groups[0].members.iter().map(|id| id.as_str()).collect();
        assert_eq!(members, vec!["a", "b", "c", "e"]);

        let assignments = store.assignments().expect("assignments");
        assert_eq!(
            assignments.get(&dupegroup_core::PhotoId::new("a")),
            Some(&Assignment {
                group_id: GroupId(1),
                is_lead: false
            })
        );
    }
}
