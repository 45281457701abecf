// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! breakwatch-github: GitHub commit history ingestion for breakwatch
//!
//! This library crate fetches recent commits from the GitHub REST API,
//! following pagination, and normalizes the raw payloads into [`Commit`]
//! records for classification by breakwatch-classify.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use breakwatch_github::{CommitFetcher, FetcherOptions, normalize};
//! use chrono::{Duration, Utc};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = CommitFetcher::new(FetcherOptions::default())?;
//! let since = Utc::now() - Duration::days(1);
//! let raw = fetcher.fetch("openedx/edx-platform", since).await?;
//!
//! for r in raw {
//!     let c = normalize("openedx/edx-platform", r)?;
//!     println!("{} - {}", c.short_sha(), c.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod commit;
pub mod error;
pub mod fetcher;

pub use commit::{Commit, RawAuthor, RawCommit, RawCommitDetail, normalize};
pub use error::{FetchError, NormalizeError};
pub use fetcher::{CommitFetcher, CommitPages, FetcherOptions, validate_repository};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{Commit, RawCommit, normalize};
    pub use crate::error::{FetchError, NormalizeError};
    pub use crate::fetcher::{CommitFetcher, FetcherOptions};
}
