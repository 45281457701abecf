// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end ingestion tests against mock GitHub and chat-completion APIs


use std::time::Duration as StdDuration;

use breakwatch::ingest::{IngestStats, Ingestor, Report};
use breakwatch::view::FilterState;
use breakwatch::window::TimeWindow;
use breakwatch_classify::{AiOptions, BreakingMethod, Classifier};
use breakwatch_github::{CommitFetcher, FetcherOptions};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use similar_asserts::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{TempTestDir, commit_page, commit_payload, commits_path};

const REPO_A: &str = "openedx/edx-platform";
const REPO_B: &str = "openedx/frontend-app-learning";
const REPO_C: &str = "openedx/frontend-platform";

fn repos(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn ingestor(server: &MockServer) -> Ingestor {
    let fetcher = CommitFetcher::new(FetcherOptions::default().with_api_url(server.uri()))
        .expect("fetcher");
    Ingestor::new(fetcher, Classifier::deterministic())
}

async fn mount_page(server: &MockServer, repository: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(commits_path(repository)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_failure(server: &MockServer, repository: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(commits_path(repository)))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(json!({"message": "Server Error"})),
        )
        .mount(server)
        .await;
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_failed_repository_does_not_suppress_others() {
    let server = MockServer::start().await;
    let reference = now();

    mount_page(&server, REPO_A, commit_page(REPO_A, &["fix: a1", "fix: a2"], reference)).await;
    mount_failure(&server, REPO_B, 500).await;
    mount_page(&server, REPO_C, commit_page(REPO_C, &["fix: c1"], reference)).await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A, REPO_B, REPO_C]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    assert_eq!(report.commits.len(), 3);
    assert!(report.commits.iter().all(|c| c.commit.repository != REPO_B));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].repository, REPO_B);
    assert!(report.failures[0].error.contains("500"));
    assert_eq!(report.stats.repositories_succeeded, 2);
    assert_eq!(report.stats.repositories_failed, 1);
    assert!(!report.is_complete());
}

#[tokio::test]
async fn test_failure_on_later_page_discards_partial_repository() {
    let server = MockServer::start().await;
    let reference = now();
    let next = format!("<{}{}?page=2>; rel=\"next\"", server.uri(), commits_path(REPO_A));

    Mock::given(method("GET"))
        .and(path(commits_path(REPO_A)))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(commit_page(REPO_A, &["fix: partial"], reference)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(commits_path(REPO_A)))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_page(&server, REPO_B, commit_page(REPO_B, &["fix: b1"], reference)).await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A, REPO_B]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    let messages: Vec<_> = report.commits.iter().map(|c| c.commit.message.as_str()).collect();
    assert_eq!(messages, vec!["fix: b1"]);
    assert_eq!(report.failures[0].repository, REPO_A);
}

#[tokio::test]
async fn test_every_repository_failing_still_yields_report() {
    let server = MockServer::start().await;
    mount_failure(&server, REPO_A, 404).await;
    mount_failure(&server, REPO_B, 500).await;

    let report = ingestor(&server)
        .ingest(&repos(&[REPO_A, REPO_B]), TimeWindow::OneDay)
        .await
        .expect("ingest");

    assert!(report.commits.is_empty());
    let failed: Vec<_> = report.failures.iter().map(|f| f.repository.as_str()).collect();
    assert_eq!(failed, vec![REPO_A, REPO_B]);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_full_page_then_empty_page_yields_exactly_one_hundred() {
    let server = MockServer::start().await;
    let reference = now();
    let messages: Vec<String> = (0..100).map(|i| format!("chore: commit {i}")).collect();
    let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
    let next = format!("<{}{}?page=2>; rel=\"next\"", server.uri(), commits_path(REPO_A));

    Mock::given(method("GET"))
        .and(path(commits_path(REPO_A)))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(commit_page(REPO_A, &refs, reference)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(commits_path(REPO_A)))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    assert_eq!(report.commits.len(), 100);
    assert_eq!(report.stats.fetched, 100);
}

// ============================================================================
// Normalization
// ============================================================================

#[tokio::test]
async fn test_malformed_and_stale_commits_are_skipped() {
    let server = MockServer::start().await;
    let reference = now();
    let page = json!([
        commit_payload(REPO_A, "aaa", "fix: good\n\nbody text", "Alice", reference - Duration::hours(1)),
        {"sha": "bbb", "html_url": "https://github.com/x/y/commit/bbb",
         "commit": {"author": {"name": "Bob", "date": reference.to_rfc3339()}}},
        {"sha": "ccc", "commit": {"message": "no permalink",
         "author": {"name": "Carol", "date": reference.to_rfc3339()}}},
        {"sha": "ddd", "html_url": "https://github.com/x/y/commit/ddd",
         "commit": {"message": "bad date", "author": {"name": "Dan", "date": "yesterday"}}},
        commit_payload(REPO_A, "eee", "fix: too old", "Eve", reference - Duration::days(3)),
    ]);
    mount_page(&server, REPO_A, page).await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    assert_eq!(report.commits.len(), 1);
    assert_eq!(report.commits[0].commit.message, "fix: good");
    assert_eq!(report.commits[0].commit.author, "Alice");
    assert_eq!(report.stats.fetched, 5);
    assert_eq!(report.stats.malformed, 3);
    assert_eq!(report.stats.out_of_window, 1);
}

#[tokio::test]
async fn test_stats_are_summed_across_repositories() {
    let server = MockServer::start().await;
    let reference = now();
    mount_page(
        &server,
        REPO_A,
        json!([
            commit_payload(REPO_A, "a1", "fix: one", "Alice", reference - Duration::hours(1)),
            {"sha": "a2", "commit": {"message": "no permalink",
             "author": {"name": "Alice", "date": reference.to_rfc3339()}}},
        ]),
    )
    .await;
    mount_page(
        &server,
        REPO_B,
        json!([
            commit_payload(REPO_B, "b1", "fix: two", "Bob", reference - Duration::hours(2)),
            commit_payload(REPO_B, "b2", "fix: old", "Bob", reference - Duration::days(5)),
            commit_payload(REPO_B, "b3", "fix: three", "Bob", reference - Duration::hours(3)),
        ]),
    )
    .await;
    mount_failure(&server, REPO_C, 500).await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A, REPO_B, REPO_C]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    assert_eq!(
        report.stats,
        IngestStats {
            fetched: 5,
            malformed: 1,
            out_of_window: 1,
            repositories_succeeded: 2,
            repositories_failed: 1,
        }
    );
    assert_eq!(report.commits.len(), 3);
}

// ============================================================================
// Classification and ordering
// ============================================================================

#[tokio::test]
async fn test_commits_classified_and_sorted_newest_first_across_repositories() {
    let server = MockServer::start().await;
    let reference = now();

    mount_page(
        &server,
        REPO_A,
        json!([
            commit_payload(REPO_A, "a1", "feat(api)!: drop v1", "Alice", reference - Duration::hours(2)),
            commit_payload(REPO_A, "a2", "fix: typo", "Alice", reference - Duration::hours(6)),
        ]),
    )
    .await;
    mount_page(
        &server,
        REPO_B,
        json!([
            commit_payload(REPO_B, "b1", "Deprecate legacy endpoint", "Bob", reference - Duration::hours(1)),
            commit_payload(REPO_B, "b2", "docs: notes", "Bob", reference - Duration::hours(4)),
        ]),
    )
    .await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A, REPO_B]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    let order: Vec<_> = report.commits.iter().map(|c| c.commit.sha.as_str()).collect();
    assert_eq!(order, vec!["b1", "a1", "b2", "a2"]);

    assert_eq!(report.commits[0].breaking_methods(), &[BreakingMethod::Keyword]);
    assert_eq!(report.commits[1].breaking_methods(), &[BreakingMethod::Conventional]);
    assert!(!report.commits[2].is_breaking());
    assert_eq!(report.classification.total, 4);
    assert_eq!(report.classification.flagged, 2);
    assert_eq!(report.classification.fallback_calls, 0);

    for commit in &report.commits {
        assert_eq!(commit.is_breaking(), !commit.breaking_methods().is_empty());
    }
}

#[tokio::test]
async fn test_ai_fallback_only_for_unflagged_commits() {
    let server = MockServer::start().await;
    let reference = now();

    mount_page(
        &server,
        REPO_A,
        json!([
            commit_payload(REPO_A, "a1", "feat!: drop v1", "Alice", reference - Duration::hours(1)),
            commit_payload(REPO_A, "a2", "Rework grading backend", "Alice", reference - Duration::hours(2)),
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "yes"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = CommitFetcher::new(FetcherOptions::default().with_api_url(server.uri()))
        .expect("fetcher");
    let classifier = Classifier::with_ai(
        AiOptions::new("test-key")
            .with_api_url(format!("{}/v1/chat/completions", server.uri()))
            .with_timeout(StdDuration::from_millis(500)),
    )
    .expect("classifier");

    let report = Ingestor::new(fetcher, classifier)
        .ingest_at(&repos(&[REPO_A]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");

    assert_eq!(report.commits[0].breaking_methods(), &[BreakingMethod::Conventional]);
    assert_eq!(report.commits[1].breaking_methods(), &[BreakingMethod::Ai]);
    assert_eq!(report.classification.fallback_calls, 1);
    assert_eq!(report.classification.ai, 1);
}

// ============================================================================
// Report hand-off
// ============================================================================

#[tokio::test]
async fn test_saved_report_can_be_viewed() {
    let server = MockServer::start().await;
    let reference = now();
    mount_page(
        &server,
        REPO_A,
        commit_page(REPO_A, &["feat!: new settings", "fix: nothing"], reference),
    )
    .await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A]), TimeWindow::OneWeek, reference)
        .await
        .expect("ingest");

    let dir = TempTestDir::new("saved_report");
    let file = dir.create_file(
        "report.json",
        &serde_json::to_string_pretty(&report).expect("serialize"),
    );
    let loaded: Report =
        serde_json::from_str(&std::fs::read_to_string(file).expect("read")).expect("parse");

    assert_eq!(loaded, report);
    assert_eq!(loaded.window, TimeWindow::OneWeek);

    let breaking = loaded.view(&FilterState::new().breaking_only());
    assert_eq!(breaking.total, 1);
    assert_eq!(breaking.counts[0].repository, REPO_A);
}

#[tokio::test]
async fn test_saved_report_with_combined_ai_verdict_is_rejected() {
    let server = MockServer::start().await;
    let reference = now();
    mount_page(
        &server,
        REPO_A,
        commit_page(REPO_A, &["Remove legacy courseware"], reference),
    )
    .await;

    let report = ingestor(&server)
        .ingest_at(&repos(&[REPO_A]), TimeWindow::OneDay, reference)
        .await
        .expect("ingest");
    assert_eq!(report.commits[0].breaking_methods(), &[BreakingMethod::Keyword]);

    let mut json = serde_json::to_value(&report).expect("serialize");
    json["commits"][0]["breaking_methods"] = json!(["keyword", "ai"]);
    assert!(serde_json::from_value::<Report>(json).is_err());
}
