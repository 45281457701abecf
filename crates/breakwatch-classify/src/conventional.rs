// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Conventional-commit breaking markers
//!
//! A subject such as `feat(api)!: drop v1` or a body containing a
//! `BREAKING CHANGE:` footer marks a breaking change.

use async_trait::async_trait;
use breakwatch_github::Commit;
use breakwatch_github::commit::first_line;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::method::{BreakingMethod, Detection, Detector};

static BREAKING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+(\([^)]*\))?!:").expect("valid breaking prefix regex"));

static BREAKING_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"BREAKING[ -]CHANGE:").expect("valid breaking footer regex"));

/// Matches conventional-commit breaking markers
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalDetector;

impl ConventionalDetector {
    /// Create the detector
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether the subject carries a `type(scope)!:` prefix
    #[must_use]
    pub fn subject_matches(subject: &str) -> bool {
        BREAKING_PREFIX.is_match(first_line(subject))
    }

    /// Whether a message body carries a `BREAKING CHANGE:` footer
    #[must_use]
    pub fn body_matches(body: &str) -> bool {
        BREAKING_FOOTER.is_match(body)
    }

    /// Whether the subject or, when supplied, the body marks a breaking change
    ///
    /// Commit records only keep the subject line, so the classifier always
    /// passes `None` for `body`.
    #[must_use]
    pub fn matches(&self, subject: &str, body: Option<&str>) -> bool {
        Self::subject_matches(subject) || body.is_some_and(Self::body_matches)
    }
}

#[async_trait]
impl Detector for ConventionalDetector {
    fn method(&self) -> BreakingMethod {
        BreakingMethod::Conventional
    }

    async fn detect(&self, commit: &Commit) -> Detection {
        if self.matches(&commit.message, None) {
            Detection::Hit
        } else {
            Detection::Miss
        }
    }
}
