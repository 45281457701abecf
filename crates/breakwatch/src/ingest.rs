// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Multi-repository ingestion
//!
//! The [`Ingestor`] fetches every configured repository concurrently,
//! normalizes and window-checks the raw payloads, classifies the whole batch
//! once, and sorts it newest first. A repository that fails to fetch is
//! reported in [`Report::failures`] and contributes no commits; its siblings
//! are unaffected.
//!
//! # Example
//!
//! ```no_run
//! use breakwatch::ingest::Ingestor;
//! use breakwatch::window::TimeWindow;
//! use breakwatch_classify::Classifier;
//! use breakwatch_github::{CommitFetcher, FetcherOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = CommitFetcher::new(FetcherOptions::default())?;
//! let ingestor = Ingestor::new(fetcher, Classifier::deterministic());
//!
//! let report = ingestor
//!     .ingest(&["openedx/edx-platform".to_string()], TimeWindow::OneWeek)
//!     .await?;
//! println!("{} commits, {} breaking", report.commits.len(), report.classification.flagged);
//! # Ok(())
//! # }
//! ```

use breakwatch_classify::{ClassificationStats, ClassifiedCommit, Classifier};
use breakwatch_github::{Commit, CommitFetcher, FetchError, RawCommit, normalize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::view::{CommitView, FilterState, sort_newest_first, view};
use crate::window::TimeWindow;

// ============================================================================
// Error Types
// ============================================================================

/// Ingestion errors
///
/// Per-repository fetch failures are not errors at this level; they are
/// recorded in the report.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Nothing to ingest
    #[error("No repositories to ingest")]
    EmptyRepositoryList,

    /// A fetch task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    Task(#[from] JoinError),
}

// ============================================================================
// Report
// ============================================================================

/// A repository that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFailure {
    /// Repository identifier
    pub repository: String,
    /// Human-readable cause
    pub error: String,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Raw payloads received across all repositories
    pub fetched: usize,
    /// Payloads skipped because a required field was missing
    pub malformed: usize,
    /// Commits dropped because they were authored before the cutoff
    pub out_of_window: usize,
    /// Repositories fetched successfully
    pub repositories_succeeded: usize,
    /// Repositories that failed to fetch
    pub repositories_failed: usize,
}

impl IngestStats {
    /// Merge stats from another repository or run
    pub fn merge(&mut self, other: &IngestStats) {
        self.fetched += other.fetched;
        self.malformed += other.malformed;
        self.out_of_window += other.out_of_window;
        self.repositories_succeeded += other.repositories_succeeded;
        self.repositories_failed += other.repositories_failed;
    }
}

/// Output of one ingestion run, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// When the run started; the reference instant for the window
    pub generated_at: DateTime<Utc>,
    /// Window the commits were fetched with
    pub window: TimeWindow,
    /// Earliest authorship time included
    pub since: DateTime<Utc>,
    /// Repositories requested, in configured order
    pub repositories: Vec<String>,
    /// Classified commits, newest first
    pub commits: Vec<ClassifiedCommit>,
    /// Repositories absent from `commits` because their fetch failed
    #[serde(default)]
    pub failures: Vec<RepositoryFailure>,
    /// Ingestion statistics
    #[serde(default)]
    pub stats: IngestStats,
    /// Classification statistics
    #[serde(default)]
    pub classification: ClassificationStats,
}

impl Report {
    /// Whether every repository was fetched
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Filter and group the report's commits
    #[must_use]
    pub fn view(&self, filter: &FilterState) -> CommitView {
        view(&self.commits, filter)
    }
}

// ============================================================================
// Ingestor
// ============================================================================

/// Fetches, normalizes and classifies commits from several repositories
pub struct Ingestor {
    fetcher: CommitFetcher,
    classifier: Classifier,
}

impl Ingestor {
    /// Create an ingestor
    #[must_use]
    pub fn new(fetcher: CommitFetcher, classifier: Classifier) -> Self {
        Self {
            fetcher,
            classifier,
        }
    }

    /// The fetcher in use
    #[must_use]
    pub fn fetcher(&self) -> &CommitFetcher {
        &self.fetcher
    }

    /// The classifier in use
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Ingest `repositories` over `window` ending now
    ///
    /// # Errors
    ///
    /// See [`Ingestor::ingest_at`].
    pub async fn ingest(
        &self,
        repositories: &[String],
        window: TimeWindow,
    ) -> Result<Report, IngestError> {
        self.ingest_at(repositories, window, Utc::now()).await
    }

    /// Ingest `repositories` over `window` ending at `reference`
    ///
    /// Repositories are fetched concurrently; pages within a repository are
    /// fetched sequentially. Results are merged in the order of
    /// `repositories` once every fetch has finished.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::EmptyRepositoryList` if `repositories` is empty
    /// and `IngestError::Task` if a fetch task panics.
    pub async fn ingest_at(
        &self,
        repositories: &[String],
        window: TimeWindow,
        reference: DateTime<Utc>,
    ) -> Result<Report, IngestError> {
        if repositories.is_empty() {
            return Err(IngestError::EmptyRepositoryList);
        }

        let since = window.cutoff(reference);
        info!(
            repositories = repositories.len(),
            %window,
            %since,
            authenticated = self.fetcher.is_authenticated(),
            "Starting ingestion"
        );

        let fetched = self.fetch_all(repositories, since).await?;

        let mut stats = IngestStats::default();
        let mut failures = Vec::new();
        let mut commits = Vec::new();

        for (repository, result) in repositories.iter().zip(fetched) {
            let mut repository_stats = IngestStats::default();
            match result {
                Ok(raw) => {
                    repository_stats.repositories_succeeded = 1;
                    repository_stats.fetched = raw.len();
                    commits.extend(normalize_page(repository, raw, since, &mut repository_stats));
                    debug!(
                        repository = %repository,
                        fetched = repository_stats.fetched,
                        malformed = repository_stats.malformed,
                        out_of_window = repository_stats.out_of_window,
                        "Repository normalized"
                    );
                }
                Err(e) => {
                    warn!(repository = %repository, error = %e, "Repository fetch failed");
                    repository_stats.repositories_failed = 1;
                    failures.push(RepositoryFailure {
                        repository: repository.clone(),
                        error: e.to_string(),
                    });
                }
            }
            stats.merge(&repository_stats);
        }

        let outcome = self.classifier.classify_batch(commits).await;
        let mut classified = outcome.commits;
        sort_newest_first(&mut classified);

        info!(
            commits = classified.len(),
            breaking = outcome.stats.flagged,
            failed = stats.repositories_failed,
            malformed = stats.malformed,
            "Ingestion complete"
        );

        Ok(Report {
            generated_at: reference,
            window,
            since,
            repositories: repositories.to_vec(),
            commits: classified,
            failures,
            stats,
            classification: outcome.stats,
        })
    }

    /// Fetch every repository concurrently, returning results in input order
    async fn fetch_all(
        &self,
        repositories: &[String],
        since: DateTime<Utc>,
    ) -> Result<Vec<Result<Vec<RawCommit>, FetchError>>, IngestError> {
        let mut tasks = JoinSet::new();
        for (position, repository) in repositories.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let repository = repository.clone();
            tasks.spawn(async move {
                debug!(repository = %repository, "Fetching");
                let result = fetcher.fetch(&repository, since).await;
                (position, result)
            });
        }

        let mut slots: Vec<Option<Result<Vec<RawCommit>, FetchError>>> =
            repositories.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (position, result) = joined?;
            slots[position] = Some(result);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Normalize one repository's payloads, dropping malformed and stale ones
fn normalize_page(
    repository: &str,
    raw: Vec<RawCommit>,
    since: DateTime<Utc>,
    stats: &mut IngestStats,
) -> Vec<Commit> {
    let mut commits = Vec::with_capacity(raw.len());
    for payload in raw {
        match normalize(repository, payload) {
            Ok(commit) if commit.timestamp < since => {
                debug!(repository, sha = commit.short_sha(), "Commit outside window");
                stats.out_of_window += 1;
            }
            Ok(commit) => commits.push(commit),
            Err(e) => {
                warn!(repository, error = %e, "Skipping malformed commit");
                stats.malformed += 1;
            }
        }
    }
    commits
}
