// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! breakwatch library
//!
//! This module exports the core functionality of breakwatch for use in
//! integration tests and as a library: configuration, time windows, the
//! multi-repository ingestion pipeline, and the aggregation and filter
//! engine that presentation layers drive.

#![warn(missing_docs)]

pub mod config;
pub mod ingest;
pub mod view;
pub mod window;

pub use config::{Command, Config, ConfigError, ViewArgs};
pub use ingest::{IngestError, IngestStats, Ingestor, Report, RepositoryFailure};
pub use view::{CommitView, FilterState, RepositoryCount, RepositoryGroup, sort_newest_first, view};
pub use window::TimeWindow;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::ingest::{Ingestor, Report};
    pub use crate::view::{CommitView, FilterState, view};
    pub use crate::window::TimeWindow;
    pub use breakwatch_classify::{BreakingMethod, ClassifiedCommit, Classifier};
}
