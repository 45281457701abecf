// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! breakwatch-classify: Breaking-change classification for breakwatch
//!
//! This library crate decides whether a commit is a breaking change by
//! running an ordered chain of detectors over its message and fusing their
//! verdicts.

#![warn(missing_docs)]

//! ## Detectors
//!
//! | Method | Detector | Runs |
//! |---|---|---|
//! | `keyword` | [`KeywordDetector`] | always |
//! | `conventional` | [`ConventionalDetector`] | always |
//! | `ai` | [`AiDetector`] | only when nothing before it fired |
//!
//! The AI detector never fails the batch: transport errors, timeouts and
//! unexpected payloads count as a negative verdict and are reported only in
//! [`ClassificationStats::degraded`].
//!
//! ```rust,no_run
//! use breakwatch_classify::Classifier;
//! # async fn run(commits: Vec<breakwatch_github::Commit>) {
//! let classifier = Classifier::deterministic();
//! let outcome = classifier.classify_batch(commits).await;
//! println!("{} of {} flagged", outcome.stats.flagged, outcome.stats.total);
//! # }
//! ```

pub mod ai;
pub mod classifier;
pub mod conventional;
pub mod error;
pub mod keyword;
pub mod method;

pub use ai::{AiDetector, AiOptions};
pub use classifier::{ClassificationOutcome, ClassificationStats, ClassifiedCommit, Classifier};
pub use conventional::ConventionalDetector;
pub use error::{AiError, VerdictError};
pub use keyword::{DEFAULT_KEYWORDS, KeywordDetector};
pub use method::{BreakingMethod, Detection, Detector, Policy};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{AiDetector, AiOptions};
    pub use crate::classifier::{ClassificationStats, ClassifiedCommit, Classifier};
    pub use crate::method::{BreakingMethod, Detection, Detector, Policy};
}
