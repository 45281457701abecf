#![no_main]

//! Fuzz target for commit page decoding and normalization
//!
//! Arbitrary bytes are decoded as a commits page; every decoded element is
//! normalized. Neither step may panic.

use breakwatch_github::{RawCommit, normalize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(page) = serde_json::from_slice::<Vec<RawCommit>>(data) {
        for raw in page {
            if let Ok(commit) = normalize("fuzz/repo", raw) {
                assert!(!commit.message.contains('\n'));
                let _ = commit.short_sha();
            }
        }
    }
});
