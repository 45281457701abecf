// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Detector chain and verdict fusion

use breakwatch_github::Commit;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai::{AiDetector, AiOptions};
use crate::conventional::ConventionalDetector;
use crate::error::{AiError, VerdictError};
use crate::keyword::KeywordDetector;
use crate::method::{BreakingMethod, Detection, Detector, Policy};

/// Commits classified concurrently within one batch
pub const DEFAULT_CONCURRENCY: usize = 8;

/// A commit together with its breaking-change verdict
///
/// `breaking_methods` is non-empty exactly when `is_breaking` is true, and
/// an `ai` verdict is never combined with another method. Deserializing a
/// record that violates either rule fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClassifiedCommitRepr")]
pub struct ClassifiedCommit {
    /// The classified commit
    #[serde(flatten)]
    pub commit: Commit,
    is_breaking: bool,
    breaking_methods: Vec<BreakingMethod>,
}

#[derive(Deserialize)]
struct ClassifiedCommitRepr {
    #[serde(flatten)]
    commit: Commit,
    is_breaking: bool,
    #[serde(default)]
    breaking_methods: Vec<BreakingMethod>,
}

impl TryFrom<ClassifiedCommitRepr> for ClassifiedCommit {
    type Error = VerdictError;

    fn try_from(repr: ClassifiedCommitRepr) -> Result<Self, Self::Error> {
        if repr.is_breaking == repr.breaking_methods.is_empty() {
            return Err(VerdictError::Inconsistent {
                is_breaking: repr.is_breaking,
                methods: repr.breaking_methods,
            });
        }
        Self::from_verdict(repr.commit, repr.breaking_methods)
    }
}

impl ClassifiedCommit {
    /// Attach a verdict produced by the detector chain
    ///
    /// Methods are put in evaluation order and deduplicated.
    pub(crate) fn new(commit: Commit, mut methods: Vec<BreakingMethod>) -> Self {
        methods.sort();
        methods.dedup();
        Self {
            commit,
            is_breaking: !methods.is_empty(),
            breaking_methods: methods,
        }
    }

    /// Attach a previously computed verdict to a commit
    ///
    /// Methods are put in evaluation order and deduplicated; the commit is
    /// breaking iff at least one method is given.
    ///
    /// # Errors
    ///
    /// Returns `VerdictError::AiNotAlone` if `ai` is combined with another
    /// method.
    pub fn from_verdict(commit: Commit, methods: Vec<BreakingMethod>) -> Result<Self, VerdictError> {
        let classified = Self::new(commit, methods);
        if classified.flagged_by(BreakingMethod::Ai) && classified.breaking_methods.len() > 1 {
            return Err(VerdictError::AiNotAlone(classified.breaking_methods));
        }
        Ok(classified)
    }

    /// Whether any method flagged the commit
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        self.is_breaking
    }

    /// Methods that flagged the commit, in evaluation order
    #[must_use]
    pub fn breaking_methods(&self) -> &[BreakingMethod] {
        &self.breaking_methods
    }

    /// Whether a specific method flagged the commit
    #[must_use]
    pub fn flagged_by(&self, method: BreakingMethod) -> bool {
        self.breaking_methods.contains(&method)
    }
}

/// Aggregate counts over one classification batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    /// Commits classified
    pub total: usize,
    /// Commits flagged as breaking
    pub flagged: usize,
    /// Commits flagged by the keyword method
    pub keyword: usize,
    /// Commits flagged by the conventional method
    pub conventional: usize,
    /// Commits flagged by the AI method
    pub ai: usize,
    /// Fallback detector invocations
    pub fallback_calls: usize,
    /// Detector invocations that could not decide
    pub degraded: usize,
}

impl ClassificationStats {
    /// Merge stats from another batch
    pub fn merge(&mut self, other: &ClassificationStats) {
        self.total += other.total;
        self.flagged += other.flagged;
        self.keyword += other.keyword;
        self.conventional += other.conventional;
        self.ai += other.ai;
        self.fallback_calls += other.fallback_calls;
        self.degraded += other.degraded;
    }

    fn record(&mut self, commit: &ClassifiedCommit) {
        self.total += 1;
        if commit.is_breaking() {
            self.flagged += 1;
        }
        for method in commit.breaking_methods() {
            match method {
                BreakingMethod::Keyword => self.keyword += 1,
                BreakingMethod::Conventional => self.conventional += 1,
                BreakingMethod::Ai => self.ai += 1,
            }
        }
    }
}

/// Result of classifying a batch
#[derive(Debug, Clone, Default)]
pub struct ClassificationOutcome {
    /// Classified commits, in input order
    pub commits: Vec<ClassifiedCommit>,
    /// Counts over the batch
    pub stats: ClassificationStats,
}

/// Ordered chain of detectors
///
/// `Always` detectors run on every commit; a fallback runs only if nothing
/// before it in the chain fired. A detector is a fallback if its policy is
/// `WhenUnflagged` or its method is `ai`. Every other detector is kept ahead
/// of every fallback, whatever order they are added in.
pub struct Classifier {
    detectors: Vec<Box<dyn Detector>>,
    concurrency: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl Classifier {
    /// Keyword and conventional detectors only
    #[must_use]
    pub fn deterministic() -> Self {
        Self::from_detectors(vec![
            Box::new(KeywordDetector::new()),
            Box::new(ConventionalDetector::new()),
        ])
    }

    /// Keyword and conventional detectors, with the AI detector as fallback
    ///
    /// # Errors
    ///
    /// Returns `AiError::Client` if the AI HTTP client cannot be built.
    pub fn with_ai(options: AiOptions) -> Result<Self, AiError> {
        let mut classifier = Self::deterministic();
        classifier.push(Box::new(AiDetector::new(options)?));
        Ok(classifier)
    }

    /// Chain of arbitrary detectors
    ///
    /// Detectors keep their relative order within each policy; fallbacks are
    /// moved behind every `Always` detector.
    #[must_use]
    pub fn from_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        let mut classifier = Self {
            detectors: Vec::with_capacity(detectors.len()),
            concurrency: DEFAULT_CONCURRENCY,
        };
        for detector in detectors {
            classifier.push(detector);
        }
        classifier
    }

    /// Commits classified at once by [`Classifier::classify_batch`]
    ///
    /// Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Add a detector to the chain
    ///
    /// A fallback goes to the end; any other detector goes in front of the
    /// first fallback.
    pub fn push(&mut self, detector: Box<dyn Detector>) {
        let at = if is_fallback(detector.as_ref()) {
            self.detectors.len()
        } else {
            self.detectors
                .iter()
                .position(|d| is_fallback(d.as_ref()))
                .unwrap_or(self.detectors.len())
        };
        self.detectors.insert(at, detector);
    }

    /// Methods of the detectors in the chain, in order
    #[must_use]
    pub fn methods(&self) -> Vec<BreakingMethod> {
        self.detectors.iter().map(|d| d.method()).collect()
    }

    /// Classify one commit
    pub async fn classify(&self, commit: Commit) -> ClassifiedCommit {
        self.classify_one(commit).await.0
    }

    /// Classify a batch, returning the verdicts in input order and batch counts
    ///
    /// Up to the configured concurrency of commits are in flight at once, so
    /// a slow fallback detector does not serialize the whole batch.
    pub async fn classify_batch(&self, commits: Vec<Commit>) -> ClassificationOutcome {
        let results: Vec<(ClassifiedCommit, ClassificationStats)> = stream::iter(commits)
            .map(|commit| self.classify_one(commit))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut stats = ClassificationStats::default();
        let mut classified = Vec::with_capacity(results.len());
        for (commit, commit_stats) in results {
            stats.merge(&commit_stats);
            classified.push(commit);
        }

        info!(
            total = stats.total,
            flagged = stats.flagged,
            keyword = stats.keyword,
            conventional = stats.conventional,
            ai = stats.ai,
            fallback_calls = stats.fallback_calls,
            degraded = stats.degraded,
            "Classified commits"
        );

        ClassificationOutcome {
            commits: classified,
            stats,
        }
    }

    async fn classify_one(&self, commit: Commit) -> (ClassifiedCommit, ClassificationStats) {
        let mut stats = ClassificationStats::default();
        let mut methods: Vec<BreakingMethod> = Vec::new();
        for detector in &self.detectors {
            if is_fallback(detector.as_ref()) {
                if !methods.is_empty() {
                    continue;
                }
                stats.fallback_calls += 1;
            }
            match detector.detect(&commit).await {
                Detection::Hit => methods.push(detector.method()),
                Detection::Miss => {}
                Detection::Degraded => stats.degraded += 1,
            }
        }

        let classified = ClassifiedCommit::new(commit, methods);
        stats.record(&classified);
        (classified, stats)
    }
}

fn is_fallback(detector: &dyn Detector) -> bool {
    detector.policy() == Policy::WhenUnflagged || detector.method() == BreakingMethod::Ai
}
