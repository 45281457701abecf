#![no_main]

//! Fuzz target for time window tag parsing
//!
//! Arbitrary strings must either parse to a window whose canonical tag parses
//! back to the same window, or fail with a configuration error.

use breakwatch::window::TimeWindow;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|tag: &str| {
    if let Ok(window) = tag.parse::<TimeWindow>() {
        assert_eq!(window.as_str().parse::<TimeWindow>().ok(), Some(window));
    }
});
