#![no_main]

//! Fuzz target for the deterministic detectors
//!
//! Arbitrary subject lines must never panic and must give the same verdict
//! twice.

use breakwatch_classify::{ConventionalDetector, KeywordDetector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(subject) = std::str::from_utf8(data) {
        let keyword = KeywordDetector::new();
        let conventional = ConventionalDetector::new();

        assert_eq!(keyword.matches(subject), keyword.matches(subject));
        assert_eq!(
            conventional.matches(subject, Some(subject)),
            conventional.matches(subject, Some(subject))
        );
    }
});
