// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for breakwatch-github

use thiserror::Error;

/// Errors that can occur while fetching commits for one repository
///
/// Every variant carries the repository it belongs to; a fetch error is
/// fatal for that repository only.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Repository identifier is not of the form `owner/name`
    #[error("Invalid repository identifier: {repository}")]
    InvalidRepository {
        /// The rejected identifier
        repository: String,
    },

    /// The request for a page could not be sent or its body not read
    #[error("Request for {repository} page {page} failed: {source}")]
    Http {
        /// Repository being fetched
        repository: String,
        /// 1-based page index
        page: u32,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered a page request with a non-success status
    #[error("GitHub returned {status} for {repository} page {page}: {message}")]
    Status {
        /// Repository being fetched
        repository: String,
        /// 1-based page index
        page: u32,
        /// HTTP status code
        status: u16,
        /// Response body or status reason
        message: String,
    },

    /// The API refused the request because the rate limit is exhausted
    #[error("GitHub rate limit exhausted for {repository} page {page} (resets at {reset:?})")]
    RateLimited {
        /// Repository being fetched
        repository: String,
        /// 1-based page index
        page: u32,
        /// Unix timestamp at which the limit resets, when reported
        reset: Option<i64>,
    },

    /// A page body was not a JSON array of commits
    #[error("Could not decode {repository} page {page}: {source}")]
    Decode {
        /// Repository being fetched
        repository: String,
        /// 1-based page index
        page: u32,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Repository the error belongs to, when known
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        match self {
            Self::InvalidRepository { repository }
            | Self::Http { repository, .. }
            | Self::Status { repository, .. }
            | Self::RateLimited { repository, .. }
            | Self::Decode { repository, .. } => Some(repository),
            Self::Client(_) => None,
        }
    }
}

/// Errors that can occur while normalizing a raw commit payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A required field is absent or unparseable
    #[error("Malformed commit {sha} in {repository}: missing or invalid {field}")]
    MalformedInput {
        /// Repository the payload came from
        repository: String,
        /// Commit SHA, or `<unknown>` when absent
        sha: String,
        /// Name of the offending field
        field: &'static str,
    },
}
