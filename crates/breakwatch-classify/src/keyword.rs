// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Keyword detection

use async_trait::async_trait;
use breakwatch_github::Commit;
use breakwatch_github::commit::first_line;

use crate::method::{BreakingMethod, Detection, Detector};

/// Phrases whose presence in a subject line suggests a breaking change
///
/// `deprecat` is a stem so that "deprecate", "deprecated" and "deprecation"
/// all match.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "breaking",
    "deprecat",
    "removed",
    "incompatible",
    "migration required",
    "no longer supports",
    "remove",
];

/// Case-insensitive substring match against a fixed vocabulary
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    keywords: Vec<String>,
}

impl Default for KeywordDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordDetector {
    /// Detector using [`DEFAULT_KEYWORDS`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_KEYWORDS.iter().copied())
    }

    /// Detector using a custom vocabulary; empty phrases are ignored
    #[must_use]
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The vocabulary, lowercased
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First vocabulary phrase found in the message's first line
    #[must_use]
    pub fn matched(&self, message: &str) -> Option<&str> {
        let subject = first_line(message).to_lowercase();
        self.keywords
            .iter()
            .find(|k| subject.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Whether the message's first line contains any vocabulary phrase
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        self.matched(message).is_some()
    }
}

#[async_trait]
impl Detector for KeywordDetector {
    fn method(&self) -> BreakingMethod {
        BreakingMethod::Keyword
    }

    async fn detect(&self, commit: &Commit) -> Detection {
        if self.matches(&commit.message) {
            Detection::Hit
        } else {
            Detection::Miss
        }
    }
}
