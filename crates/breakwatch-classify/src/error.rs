// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for breakwatch-classify

use thiserror::Error;

use crate::method::BreakingMethod;

/// Errors from the AI classification endpoint
///
/// These never leave the classifier; [`crate::AiDetector`] turns every one
/// of them into [`crate::Detection::Degraded`].
#[derive(Debug, Error)]
pub enum AiError {
    /// The HTTP client could not be constructed
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("AI request timed out after {0} ms")]
    Timeout(u128),

    /// The request could not be sent or the body not read
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("AI endpoint returned {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response carried no completion text
    #[error("AI response contained no completion")]
    EmptyResponse,
}

/// A verdict that breaks the classification invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerdictError {
    /// `is_breaking` disagrees with the method list
    #[error("is_breaking={is_breaking} but breaking_methods={methods:?}")]
    Inconsistent {
        /// The stored flag
        is_breaking: bool,
        /// The stored methods
        methods: Vec<BreakingMethod>,
    },

    /// The AI fallback was combined with a deterministic method
    #[error("ai verdict cannot be combined with other methods: {0:?}")]
    AiNotAlone(Vec<BreakingMethod>),
}
