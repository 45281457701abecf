// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Property-based tests for breakwatch
//!
//! These tests use proptest to check that the filter engine's invariants hold
//! for arbitrary commit sets and filter combinations.

use std::collections::BTreeSet;

use breakwatch::view::{FilterState, sort_newest_first, view};
use breakwatch_classify::{BreakingMethod, ClassifiedCommit};
use breakwatch_github::Commit;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arbitrary_repository() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("org/a".to_string()),
        Just("org/b".to_string()),
        Just("Org/C".to_string()),
        Just("other/x".to_string()),
    ]
}

fn arbitrary_methods() -> impl Strategy<Value = Vec<BreakingMethod>> {
    prop_oneof![
        Just(vec![]),
        Just(vec![BreakingMethod::Keyword]),
        Just(vec![BreakingMethod::Conventional]),
        Just(vec![BreakingMethod::Keyword, BreakingMethod::Conventional]),
        Just(vec![BreakingMethod::Ai]),
    ]
}

fn arbitrary_record() -> impl Strategy<Value = ClassifiedCommit> {
    (
        arbitrary_repository(),
        "[a-zA-Z ]{0,12}",
        "[a-zA-Z!:() ]{0,30}",
        0i64..1_000,
        arbitrary_methods(),
    )
        .prop_map(|(repository, author, message, minutes, methods)| {
            let base = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
            ClassifiedCommit::from_verdict(
                Commit {
                    url: format!("https://github.com/{repository}/commit/{minutes}"),
                    repository,
                    sha: format!("{minutes:040}"),
                    message,
                    author,
                    timestamp: base - Duration::minutes(minutes),
                },
                methods,
            )
            .expect("valid verdict")
        })
}

fn arbitrary_records() -> impl Strategy<Value = Vec<ClassifiedCommit>> {
    prop::collection::vec(arbitrary_record(), 0..40)
}

fn arbitrary_needle() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z/]{1,3}".prop_map(Some),
    ]
}

fn arbitrary_filter() -> impl Strategy<Value = FilterState> {
    (
        arbitrary_needle(),
        arbitrary_needle(),
        prop::collection::btree_set(arbitrary_repository(), 0..3),
        arbitrary_needle(),
        any::<bool>(),
        prop::option::of(0i64..1_000),
    )
        .prop_map(
            |(search, author, repositories, repository_contains, breaking_only, since)| {
                let base = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
                FilterState {
                    search,
                    author,
                    repositories,
                    repository_contains,
                    breaking_only,
                    since: since.map(|m| base - Duration::minutes(m)),
                }
            },
        )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: classified records keep is_breaking consistent with methods
    #[test]
    fn prop_breaking_iff_methods(record in arbitrary_record()) {
        prop_assert_eq!(record.is_breaking(), !record.breaking_methods().is_empty());
        if record.flagged_by(BreakingMethod::Ai) {
            prop_assert_eq!(record.breaking_methods().len(), 1);
        }
    }

    /// Property: every surviving commit satisfies the filter, every dropped
    /// one does not
    #[test]
    fn prop_view_is_exact_filter(records in arbitrary_records(), filter in arbitrary_filter()) {
        let result = view(&records, &filter);
        let expected = records.iter().filter(|r| filter.matches(r)).count();
        prop_assert_eq!(result.total, expected);
        for commit in result.commits() {
            prop_assert!(filter.matches(commit));
        }
    }

    /// Property: breaking_only keeps exactly the breaking commits
    #[test]
    fn prop_breaking_only(records in arbitrary_records()) {
        let result = view(&records, &FilterState::new().breaking_only());
        prop_assert!(result.commits().all(ClassifiedCommit::is_breaking));
        prop_assert_eq!(result.total, records.iter().filter(|r| r.is_breaking()).count());
    }

    /// Property: groups partition the survivors and counts mirror groups
    #[test]
    fn prop_groups_partition(records in arbitrary_records(), filter in arbitrary_filter()) {
        let result = view(&records, &filter);
        let names: BTreeSet<_> = result.groups.iter().map(|g| g.repository.clone()).collect();
        prop_assert_eq!(names.len(), result.groups.len());
        prop_assert_eq!(result.groups.len(), result.counts.len());
        for (group, count) in result.groups.iter().zip(&result.counts) {
            prop_assert!(!group.commits.is_empty());
            prop_assert_eq!(&group.repository, &count.repository);
            prop_assert_eq!(group.commits.len(), count.count);
            prop_assert!(group.commits.iter().all(|c| c.commit.repository == group.repository));
        }
    }

    /// Property: within a group, commits keep their relative input order
    #[test]
    fn prop_groups_preserve_input_order(mut records in arbitrary_records(), filter in arbitrary_filter()) {
        sort_newest_first(&mut records);
        let result = view(&records, &filter);
        for group in &result.groups {
            prop_assert!(group.commits.windows(2).all(|w| w[0].commit.timestamp >= w[1].commit.timestamp));
        }
    }

    /// Property: the view is idempotent and leaves its input untouched
    #[test]
    fn prop_view_idempotent(records in arbitrary_records(), filter in arbitrary_filter()) {
        let before = records.clone();
        let first = serde_json::to_string(&view(&records, &filter)).unwrap();
        let second = serde_json::to_string(&view(&records, &filter)).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(records, before);
    }

    /// Property: adding a predicate never grows the view
    #[test]
    fn prop_narrowing_is_monotonic(records in arbitrary_records(), filter in arbitrary_filter()) {
        let base = view(&records, &filter).total;
        let narrower = FilterState { breaking_only: true, ..filter.clone() };
        prop_assert!(view(&records, &narrower).total <= base);
    }

    /// Property: sorting is stable and newest first
    #[test]
    fn prop_sort_stable(records in arbitrary_records()) {
        let mut sorted = records.clone();
        sort_newest_first(&mut sorted);
        prop_assert!(sorted.windows(2).all(|w| w[0].commit.timestamp >= w[1].commit.timestamp));

        for pair in sorted.windows(2) {
            if pair[0].commit.timestamp == pair[1].commit.timestamp {
                let i = records.iter().position(|r| r == &pair[0]).unwrap();
                let j = records.iter().rposition(|r| r == &pair[1]).unwrap();
                prop_assert!(i <= j);
            }
        }
    }
}
