// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Detection methods and the detector strategy trait

use std::fmt;

use async_trait::async_trait;
use breakwatch_github::Commit;
use serde::{Deserialize, Serialize};

/// A method that can flag a commit as breaking
///
/// The derived ordering is the evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakingMethod {
    /// Indicator phrase in the subject line
    Keyword,
    /// Conventional-commit `!:` marker or `BREAKING CHANGE:` footer
    Conventional,
    /// Remote model verdict
    Ai,
}

impl BreakingMethod {
    /// The tag used in serialized output
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Conventional => "conventional",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for BreakingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one detector on one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The detector flagged the commit
    Hit,
    /// The detector did not flag the commit
    Miss,
    /// The detector could not decide; treated as a miss
    Degraded,
}

impl Detection {
    /// Whether this outcome flags the commit
    #[must_use]
    pub fn is_hit(self) -> bool {
        self == Self::Hit
    }
}

/// When a detector in the chain is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Run on every commit
    Always,
    /// Run only if no earlier detector flagged the commit
    WhenUnflagged,
}

/// A breaking-change detection strategy
#[async_trait]
pub trait Detector: Send + Sync {
    /// Method tag recorded when this detector fires
    fn method(&self) -> BreakingMethod;

    /// When the classifier should consult this detector
    fn policy(&self) -> Policy {
        Policy::Always
    }

    /// Inspect a commit
    async fn detect(&self, commit: &Commit) -> Detection;
}
