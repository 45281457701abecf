// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for breakwatch
//!
//! This module provides the command-line configuration: which repositories to
//! scan, credentials for GitHub and the optional AI classifier, the fetch
//! window, output, and logging options. Every option can also be supplied via
//! an environment variable.

use std::path::PathBuf;
use std::time::Duration;

use breakwatch_classify::{AiOptions, ai};
use breakwatch_github::{FetcherOptions, fetcher, validate_repository};
use clap::{Args, Parser, Subcommand};

use crate::view::FilterState;
use crate::window::TimeWindow;

/// Repositories scanned when none are configured
pub const DEFAULT_REPOSITORIES: &[&str] = &[
    "openedx/edx-platform",
    "openedx/frontend-app-learning",
    "openedx/frontend-app-authoring",
    "openedx/frontend-app-discussions",
];

fn default_repositories() -> Vec<String> {
    DEFAULT_REPOSITORIES.iter().map(|r| (*r).to_string()).collect()
}

/// Breakwatch - flag breaking changes in recent GitHub commits
#[derive(Parser, Debug, Clone)]
#[command(name = "breakwatch")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to fetching and classifying)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Repository to scan, as owner/name
    ///
    /// May be repeated, or given as a comma-separated list.
    #[arg(
        short,
        long = "repo",
        env = "BREAKWATCH_REPOS",
        value_delimiter = ',',
        default_values_t = default_repositories()
    )]
    pub repositories: Vec<String>,

    /// GitHub token; requests are unauthenticated (and heavily rate-limited)
    /// without one
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "BREAKWATCH_API_URL", default_value = fetcher::DEFAULT_API_URL)]
    pub api_url: String,

    /// Commits requested per page (1-100)
    #[arg(long, default_value_t = fetcher::MAX_PER_PAGE)]
    pub per_page: u32,

    /// How far back to fetch: "1 day", "2 days", "1 week" or "1 month"
    #[arg(short, long, env = "BREAKWATCH_WINDOW", default_value = "1 month")]
    pub window: TimeWindow,

    /// API key for the AI fallback classifier; the fallback is disabled
    /// without one
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub ai_key: Option<String>,

    /// Chat-completions endpoint for the AI fallback
    #[arg(long, env = "BREAKWATCH_AI_URL", default_value = ai::DEFAULT_AI_URL)]
    pub ai_url: String,

    /// Model used by the AI fallback
    #[arg(long, env = "BREAKWATCH_AI_MODEL", default_value = ai::DEFAULT_AI_MODEL)]
    pub ai_model: String,

    /// Timeout for each AI request, in milliseconds
    #[arg(long, default_value_t = 800)]
    pub ai_timeout_ms: u64,

    /// Write JSON output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so that JSON on stdout stays clean.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Filter and group a previously saved report
    ///
    /// Example:
    ///   breakwatch -o report.json
    ///   breakwatch view --input report.json --breaking-only --within "1 week"
    View(ViewArgs),
}

/// Filters for the `view` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Report produced by a previous run
    #[arg(short, long)]
    pub input: PathBuf,

    /// Case-insensitive text matched against message, author and repository
    #[arg(short, long)]
    pub search: Option<String>,

    /// Case-insensitive author substring
    #[arg(short, long)]
    pub author: Option<String>,

    /// Only include these repositories (repeatable)
    #[arg(long = "repo-filter")]
    pub repositories: Vec<String>,

    /// Case-insensitive repository substring
    #[arg(long)]
    pub repo_contains: Option<String>,

    /// Only include breaking commits
    #[arg(short, long, default_value = "false")]
    pub breaking_only: bool,

    /// Narrow to commits authored within this window of the report time
    #[arg(long)]
    pub within: Option<TimeWindow>,
}

impl ViewArgs {
    /// Build the filter state these arguments describe
    ///
    /// `reference` anchors `--within`; pass the report's generation time so
    /// that re-viewing an old report gives the same answer.
    #[must_use]
    pub fn filter(&self, reference: chrono::DateTime<chrono::Utc>) -> FilterState {
        let mut filter = FilterState::new();
        if let Some(search) = &self.search {
            filter = filter.search(search);
        }
        if let Some(author) = &self.author {
            filter = filter.author(author);
        }
        for repository in &self.repositories {
            filter = filter.repository(repository);
        }
        if let Some(fragment) = &self.repo_contains {
            filter = filter.repository_contains(fragment);
        }
        if self.breaking_only {
            filter = filter.breaking_only();
        }
        if let Some(window) = self.within {
            filter = filter.within(window, reference);
        }
        filter
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            repositories: default_repositories(),
            token: None,
            api_url: fetcher::DEFAULT_API_URL.to_string(),
            per_page: fetcher::MAX_PER_PAGE,
            window: TimeWindow::widest(),
            ai_key: None,
            ai_url: ai::DEFAULT_AI_URL.to_string(),
            ai_model: ai::DEFAULT_AI_MODEL.to_string(),
            ai_timeout_ms: 800,
            output: None,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Configured repositories, trimmed, with blanks and duplicates removed
    #[must_use]
    pub fn repositories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for repository in self.repositories.iter().map(|r| r.trim()) {
            if !repository.is_empty() && !seen.iter().any(|s: &String| s == repository) {
                seen.push(repository.to_string());
            }
        }
        seen
    }

    /// Options for the commit fetcher
    #[must_use]
    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions::default()
            .with_api_url(self.api_url.clone())
            .with_token(self.token.clone())
            .with_per_page(self.per_page)
    }

    /// Options for the AI fallback, when a key is configured
    #[must_use]
    pub fn ai_options(&self) -> Option<AiOptions> {
        self.ai_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|key| {
                AiOptions::new(key)
                    .with_api_url(self.ai_url.clone())
                    .with_model(self.ai_model.clone())
                    .with_timeout(Duration::from_millis(self.ai_timeout_ms))
            })
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No repositories are configured
    /// - A repository is not of the form `owner/name`
    /// - `--per-page` is outside 1-100
    /// - `--ai-timeout-ms` is zero
    /// - The `view` input file does not exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        let repositories = self.repositories();
        if repositories.is_empty() {
            return Err(ConfigError::EmptyRepositoryList);
        }
        for repository in &repositories {
            validate_repository(repository)
                .map_err(|_| ConfigError::InvalidRepository(repository.clone()))?;
        }

        if !(1..=fetcher::MAX_PER_PAGE).contains(&self.per_page) {
            return Err(ConfigError::InvalidConfiguration(format!(
                "--per-page must be between 1 and {}, got {}",
                fetcher::MAX_PER_PAGE,
                self.per_page
            )));
        }

        if self.ai_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "--ai-timeout-ms must be greater than zero".to_string(),
            ));
        }

        if let Some(Command::View(args)) = &self.command {
            if !args.input.exists() {
                return Err(ConfigError::InputNotFound(args.input.clone()));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No repositories to scan
    #[error("Invalid configuration: no repositories configured")]
    EmptyRepositoryList,

    /// Repository identifier is not of the form `owner/name`
    #[error("Invalid configuration: repository {0:?} is not of the form owner/name")]
    InvalidRepository(String),

    /// A filter window reaches further back than the data was fetched
    #[error("Invalid configuration: filter window {filter} is wider than the fetch window {fetch}")]
    WindowTooWide {
        /// The requested filter window
        filter: TimeWindow,
        /// The window the data was fetched with
        fetch: TimeWindow,
    },

    /// Report file for `view` not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),
}
