#![no_main]

//! Fuzz target for the filter engine
//!
//! Arbitrary JSON is decoded as a filter state and applied to a fixed commit
//! set. The view must never panic, never contain more commits than the input,
//! and must be identical when computed twice.

use breakwatch::view::{FilterState, view};
use breakwatch_classify::{BreakingMethod, ClassifiedCommit};
use breakwatch_github::Commit;
use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;

fn records() -> Vec<ClassifiedCommit> {
    let base = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    [
        ("org/a", "alice", "fix bug", vec![]),
        ("org/b", "Bob", "feat!: drop old API", vec![BreakingMethod::Conventional]),
        ("org/a", "", "Deprecate legacy endpoint", vec![BreakingMethod::Keyword]),
        ("org/c", "Ñoño", "日本語 remove", vec![BreakingMethod::Keyword]),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (repository, author, message, methods))| {
        ClassifiedCommit::from_verdict(
            Commit {
                repository: repository.to_string(),
                sha: format!("{i:040x}"),
                message: message.to_string(),
                author: author.to_string(),
                timestamp: base - Duration::hours(i as i64),
                url: format!("https://github.com/{repository}/commit/{i}"),
            },
            methods,
        )
        .expect("valid verdict")
    })
    .collect()
}

fuzz_target!(|data: &[u8]| {
    if let Ok(filter) = serde_json::from_slice::<FilterState>(data) {
        let records = records();
        let first = view(&records, &filter);
        let second = view(&records, &filter);

        assert!(first.total <= records.len());
        assert_eq!(first.groups.len(), first.counts.len());
        assert_eq!(first, second);
    }
});
