// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! breakwatch: flag breaking changes in recent GitHub commits
//!
//! By default the binary fetches the configured repositories, classifies
//! every commit, and writes the resulting report as JSON. The `view`
//! subcommand filters and groups a saved report.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use breakwatch::config::{Command, Config, ViewArgs};
use breakwatch::ingest::{Ingestor, Report};
use breakwatch_classify::Classifier;
use breakwatch_github::CommitFetcher;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .with_writer(io::stderr)
        .init();

    config.validate()?;

    match &config.command {
        Some(Command::View(args)) => run_view(&config, args),
        None => run_ingest(&config).await,
    }
}

async fn run_ingest(config: &Config) -> Result<()> {
    let fetcher = CommitFetcher::new(config.fetcher_options())?;
    let classifier = match config.ai_options() {
        Some(options) => Classifier::with_ai(options)?,
        None => Classifier::deterministic(),
    };
    info!(methods = ?classifier.methods(), "Classifier ready");

    let repositories = config.repositories();
    let report = Ingestor::new(fetcher, classifier)
        .ingest(&repositories, config.window)
        .await?;

    for failure in &report.failures {
        error!(repository = %failure.repository, "{}", failure.error);
    }

    write_json(&report, config.output.as_deref())?;

    if report.failures.len() == report.repositories.len() {
        bail!("every repository failed to fetch");
    }
    Ok(())
}

fn run_view(config: &Config, args: &ViewArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let report: Report = serde_json::from_str(&text)
        .with_context(|| format!("parsing report {}", args.input.display()))?;

    if let Some(within) = args.within {
        report.window.ensure_covers(within)?;
    }

    let filter = args.filter(report.generated_at);
    let grouped = report.view(&filter);
    info!(
        total = grouped.total,
        breaking = grouped.breaking(),
        repositories = grouped.groups.len(),
        "Filtered report"
    );

    write_json(&grouped, config.output.as_deref())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
