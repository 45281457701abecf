// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Aggregation and filtering of classified commits
//!
//! [`view`] is a pure function: it takes the full classified set and a
//! [`FilterState`], and returns the surviving commits grouped by repository
//! together with per-repository counts for charting. It never mutates its
//! input, never fails, and gives identical output for identical input, so it
//! can be re-run on every filter change.
//!
//! # Example
//!
//! ```
//! use breakwatch::view::{FilterState, view};
//!
//! let records = Vec::new();
//! let filter = FilterState::new().author("alice").breaking_only();
//! let grouped = view(&records, &filter);
//! assert!(grouped.is_empty());
//! ```

use std::collections::{BTreeSet, HashMap};

use breakwatch_classify::ClassifiedCommit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::window::TimeWindow;

// ============================================================================
// Filter State
// ============================================================================

/// A combination of filter predicates
///
/// Every predicate is a no-op when unset or empty. A commit survives only if
/// it satisfies every active predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Case-insensitive substring of message, author or repository
    pub search: Option<String>,
    /// Case-insensitive substring of the author name
    pub author: Option<String>,
    /// Repositories to include; an empty set places no restriction
    pub repositories: BTreeSet<String>,
    /// Case-insensitive substring of the repository identifier
    pub repository_contains: Option<String>,
    /// Keep only breaking commits
    pub breaking_only: bool,
    /// Keep only commits authored at or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl FilterState {
    /// A filter that keeps everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `term` against message, author and repository
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Match `fragment` against the author name
    #[must_use]
    pub fn author(mut self, fragment: impl Into<String>) -> Self {
        self.author = Some(fragment.into());
        self
    }

    /// Add `repository` to the inclusion set
    #[must_use]
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repositories.insert(repository.into());
        self
    }

    /// Match `fragment` against the repository identifier
    #[must_use]
    pub fn repository_contains(mut self, fragment: impl Into<String>) -> Self {
        self.repository_contains = Some(fragment.into());
        self
    }

    /// Keep only breaking commits
    #[must_use]
    pub fn breaking_only(mut self) -> Self {
        self.breaking_only = true;
        self
    }

    /// Keep only commits authored at or after `since`
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Keep only commits inside `window` ending at `reference`
    #[must_use]
    pub fn within(self, window: TimeWindow, reference: DateTime<Utc>) -> Self {
        self.since(window.cutoff(reference))
    }

    /// Whether no predicate is active
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        Matcher::new(self).is_unrestricted()
    }

    /// Whether `record` satisfies every active predicate
    #[must_use]
    pub fn matches(&self, record: &ClassifiedCommit) -> bool {
        Matcher::new(self).accepts(record)
    }
}

/// Filter state with needles lowercased once per view
struct Matcher<'a> {
    search: Option<String>,
    author: Option<String>,
    repositories: &'a BTreeSet<String>,
    repository_contains: Option<String>,
    breaking_only: bool,
    since: Option<DateTime<Utc>>,
}

fn needle(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| v.to_lowercase())
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl<'a> Matcher<'a> {
    fn new(filter: &'a FilterState) -> Self {
        Self {
            search: needle(filter.search.as_ref()),
            author: needle(filter.author.as_ref()),
            repositories: &filter.repositories,
            repository_contains: needle(filter.repository_contains.as_ref()),
            breaking_only: filter.breaking_only,
            since: filter.since,
        }
    }

    fn is_unrestricted(&self) -> bool {
        self.search.is_none()
            && self.author.is_none()
            && self.repositories.is_empty()
            && self.repository_contains.is_none()
            && !self.breaking_only
            && self.since.is_none()
    }

    fn accepts(&self, record: &ClassifiedCommit) -> bool {
        let commit = &record.commit;

        if self.breaking_only && !record.is_breaking() {
            return false;
        }
        if self.since.is_some_and(|since| commit.timestamp < since) {
            return false;
        }
        if !self.repositories.is_empty() && !self.repositories.contains(&commit.repository) {
            return false;
        }
        if let Some(fragment) = &self.repository_contains
            && !contains_folded(&commit.repository, fragment)
        {
            return false;
        }
        if let Some(fragment) = &self.author
            && !contains_folded(&commit.author, fragment)
        {
            return false;
        }
        if let Some(term) = &self.search
            && !(contains_folded(&commit.message, term)
                || contains_folded(&commit.author, term)
                || contains_folded(&commit.repository, term))
        {
            return false;
        }
        true
    }
}

// ============================================================================
// View
// ============================================================================

/// Surviving commits of one repository, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryGroup {
    /// Repository identifier
    pub repository: String,
    /// Commits in input order
    pub commits: Vec<ClassifiedCommit>,
}

/// Chart-ready count for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCount {
    /// Repository identifier
    pub repository: String,
    /// Number of surviving commits
    pub count: usize,
}

/// Result of applying a [`FilterState`] to a commit set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitView {
    /// Groups in order of their first surviving commit
    pub groups: Vec<RepositoryGroup>,
    /// One count per group, in group order
    pub counts: Vec<RepositoryCount>,
    /// Total surviving commits
    pub total: usize,
}

impl CommitView {
    /// Whether nothing survived the filter
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Group for `repository`, if any commit of it survived
    #[must_use]
    pub fn group(&self, repository: &str) -> Option<&RepositoryGroup> {
        self.groups.iter().find(|g| g.repository == repository)
    }

    /// All surviving commits, group by group
    pub fn commits(&self) -> impl Iterator<Item = &ClassifiedCommit> {
        self.groups.iter().flat_map(|g| g.commits.iter())
    }

    /// Number of surviving breaking commits
    #[must_use]
    pub fn breaking(&self) -> usize {
        self.commits().filter(|c| c.is_breaking()).count()
    }

    /// Distinct authors among the surviving commits, in view order
    #[must_use]
    pub fn authors(&self) -> Vec<&str> {
        let mut authors: Vec<&str> = Vec::new();
        for commit in self.commits() {
            let author = commit.commit.author.as_str();
            if !author.is_empty() && !authors.contains(&author) {
                authors.push(author);
            }
        }
        authors
    }

    /// Repositories with at least one surviving commit, in view order
    #[must_use]
    pub fn repositories(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.repository.as_str()).collect()
    }
}

/// Filter `records` and group the survivors by repository
///
/// Groups appear in the order their first surviving commit appears in
/// `records`; within a group, commits keep their input order.
#[must_use]
pub fn view(records: &[ClassifiedCommit], filter: &FilterState) -> CommitView {
    let matcher = Matcher::new(filter);
    let mut groups: Vec<RepositoryGroup> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| matcher.accepts(r)) {
        let repository = record.commit.repository.as_str();
        let slot = *slots.entry(repository).or_insert_with(|| {
            groups.push(RepositoryGroup {
                repository: repository.to_string(),
                commits: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].commits.push(record.clone());
    }

    let counts: Vec<RepositoryCount> = groups
        .iter()
        .map(|g| RepositoryCount {
            repository: g.repository.clone(),
            count: g.commits.len(),
        })
        .collect();
    let total = counts.iter().map(|c| c.count).sum();

    CommitView {
        groups,
        counts,
        total,
    }
}

/// Sort newest first by authorship time
///
/// The sort is stable: commits with equal timestamps keep their relative
/// order.
pub fn sort_newest_first(records: &mut [ClassifiedCommit]) {
    records.sort_by(|a, b| b.commit.timestamp.cmp(&a.commit.timestamp));
}
