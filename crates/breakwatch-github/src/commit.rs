// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit payloads and the normalized commit record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// One element of the GitHub "list commits" response
///
/// All fields are optional so that a single malformed element does not fail
/// the decode of a whole page; [`normalize`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    /// Commit SHA
    #[serde(default)]
    pub sha: Option<String>,
    /// Permalink to the commit on the web UI
    #[serde(default)]
    pub html_url: Option<String>,
    /// Git-level commit data
    #[serde(default)]
    pub commit: Option<RawCommitDetail>,
}

/// The `commit` object nested in a [`RawCommit`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommitDetail {
    /// Full commit message
    #[serde(default)]
    pub message: Option<String>,
    /// Authorship information
    #[serde(default)]
    pub author: Option<RawAuthor>,
}

/// Author signature of a commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Authorship time as an RFC 3339 string
    #[serde(default)]
    pub date: Option<String>,
}

/// A normalized commit, ready for classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Repository identifier (`owner/name`)
    pub repository: String,
    /// Commit SHA (may be empty if the source omitted it)
    pub sha: String,
    /// First line of the commit message
    pub message: String,
    /// Author display name (may be empty)
    pub author: String,
    /// Authorship timestamp
    pub timestamp: DateTime<Utc>,
    /// Permalink to the commit
    pub url: String,
}

impl Commit {
    /// Get the short SHA (first 7 characters)
    #[must_use]
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map_or(self.sha.len(), |(i, _)| i);
        &self.sha[..end]
    }

    /// Build a commit record from a raw payload
    ///
    /// # Errors
    ///
    /// See [`normalize`].
    pub fn from_raw(repository: &str, raw: RawCommit) -> Result<Self, NormalizeError> {
        normalize(repository, raw)
    }
}

/// Return the text before the first line break
#[must_use]
pub fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Map a raw commit payload onto a [`Commit`]
///
/// Only the first line of the message is kept. A missing author name
/// becomes an empty string; a missing message, author date or permalink is
/// rejected.
///
/// # Errors
///
/// Returns `NormalizeError::MalformedInput` naming the first required field
/// that is absent or unparseable.
pub fn normalize(repository: &str, raw: RawCommit) -> Result<Commit, NormalizeError> {
    let sha = raw.sha.unwrap_or_default();
    let malformed = |field: &'static str| NormalizeError::MalformedInput {
        repository: repository.to_string(),
        sha: if sha.is_empty() {
            "<unknown>".to_string()
        } else {
            sha.clone()
        },
        field,
    };

    let detail = raw.commit.ok_or_else(|| malformed("commit"))?;
    let message = detail.message.ok_or_else(|| malformed("message"))?;
    let author = detail.author.unwrap_or_default();
    let date = author.date.ok_or_else(|| malformed("author.date"))?;
    let timestamp = DateTime::parse_from_rfc3339(&date)
        .map_err(|_| malformed("author.date"))?
        .with_timezone(&Utc);
    let url = raw.html_url.ok_or_else(|| malformed("html_url"))?;

    Ok(Commit {
        repository: repository.to_string(),
        message: first_line(&message).to_string(),
        author: author.name.unwrap_or_default(),
        timestamp,
        url,
        sha,
    })
}
