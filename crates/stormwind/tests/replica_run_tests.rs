//! Whole-suite runs against the offline replica.
//!
//! These drive every scenario through the real runner, fixture graph and
//! session handling, with the in-memory engine standing in for chromium.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pagekit::prelude::*;
use pagekit::{SuiteConfig, SuiteReport, TestStatus};
use std::sync::Arc;
use stormwind::scenarios::NIGHTLY;
use stormwind::{replica, suite};

fn config(output: &tempfile::TempDir) -> SuiteConfig {
    SuiteConfig {
        output_dir: output.path().to_path_buf(),
        ..suite::replica_config(&SuiteConfig::default())
    }
}

fn failures(report: &SuiteReport) -> String {
    report
        .failures()
        .iter()
        .map(|o| format!("{}: {}", o.title, o.last_error().unwrap_or("?")))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn run(config: &SuiteConfig, filter: &ScenarioFilter) -> SuiteReport {
    let runner = suite::runner(config, Arc::new(replica::browser())).unwrap();
    runner.run(&suite::catalogue(), filter).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_whole_catalogue_passes_against_replica() {
    let output = tempfile::tempdir().unwrap();
    let config = config(&output);
    let quick: Vec<String> = suite::catalogue()
        .iter()
        .filter(|s| !s.tags().iter().any(|t| t == NIGHTLY))
        .map(Scenario::title)
        .collect();
    assert!(!quick.is_empty());

    let report = run(&config, &ScenarioFilter::all()).await;
    assert!(report.all_passed(), "failed scenarios:\n{}", failures(&report));
    for title in quick {
        assert!(
            report.outcomes.iter().any(|o| o.title == title),
            "{title} missing from the report"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_nightly_filter_runs_walkthroughs_only() {
    let output = tempfile::tempdir().unwrap();
    let config = config(&output);
    let report = run(&config, &ScenarioFilter::all().with_tags([NIGHTLY])).await;

    assert!(report.all_passed(), "failed scenarios:\n{}", failures(&report));
    assert!(report.summary().total > 0);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.tags.iter().any(|t| t == NIGHTLY)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_workers_keep_sessions_apart() {
    let output = tempfile::tempdir().unwrap();
    let config = SuiteConfig {
        workers: 4,
        fully_parallel: true,
        ..config(&output)
    };
    let report = run(&config, &ScenarioFilter::all().with_pattern("student/")).await;
    assert!(report.all_passed(), "failed scenarios:\n{}", failures(&report));
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == TestStatus::Passed));
}

#[tokio::test]
async fn test_wrong_password_fails_every_signed_in_scenario() {
    let output = tempfile::tempdir().unwrap();
    let mut config = config(&output);
    config.credentials = CredentialStore::new()
        .with(Role::Admin, Credentials::new(replica::ADMIN_EMAIL, "wrong"))
        .with(
            Role::Student,
            Credentials::new(replica::STUDENT_EMAIL, replica::STUDENT_PASSWORD),
        );
    let report = run(&config, &ScenarioFilter::all().with_pattern("admin/dashboard")).await;

    assert!(!report.all_passed());
    assert!(report
        .failures()
        .iter()
        .all(|o| o.title.starts_with("admin/dashboard")));
}
