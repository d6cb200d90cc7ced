//! Suite reports: per-test outcomes and their list, JSON and JUnit renderings.

use crate::result::{PageKitError, PageKitResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Final status of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Passed on the first attempt
    Passed,
    /// Every attempt failed
    Failed,
    /// Failed at least once, then passed on a retry
    Flaky,
    /// Not run (filtered out or stopped by fail-fast)
    Skipped,
}

impl TestStatus {
    /// Passed or flaky
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }

    /// Failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Flaky => "flaky",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One run of a scenario body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Wall time of the attempt
    pub duration_ms: u64,
    /// Error message when the attempt failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error category (see [`PageKitError::category`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Screenshots and traces written for the attempt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
}

impl AttemptRecord {
    /// Successful attempt
    #[must_use]
    pub const fn passed(attempt: u32, duration_ms: u64) -> Self {
        Self {
            attempt,
            duration_ms,
            error: None,
            category: None,
            artifacts: Vec::new(),
        }
    }

    /// Failed attempt
    #[must_use]
    pub fn failed(attempt: u32, duration_ms: u64, error: &PageKitError) -> Self {
        Self {
            attempt,
            duration_ms,
            error: Some(error.to_string()),
            category: Some(error.category().to_string()),
            artifacts: Vec::new(),
        }
    }

    /// Whether the attempt failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of one scenario across all its attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Full title (`suite > name`)
    pub title: String,
    /// Suite path the scenario belongs to
    pub suite: String,
    /// Scenario tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Final status
    pub status: TestStatus,
    /// Sum of attempt durations
    pub duration_ms: u64,
    /// Attempts in order
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

impl TestOutcome {
    /// Outcome derived from the attempts that ran
    #[must_use]
    pub fn from_attempts(
        title: impl Into<String>,
        suite: impl Into<String>,
        tags: Vec<String>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let status = match attempts.last() {
            None => TestStatus::Skipped,
            Some(last) if last.is_failed() => TestStatus::Failed,
            Some(_) if attempts.len() > 1 => TestStatus::Flaky,
            Some(_) => TestStatus::Passed,
        };
        Self {
            title: title.into(),
            suite: suite.into(),
            tags,
            status,
            duration_ms: attempts.iter().map(|a| a.duration_ms).sum(),
            attempts,
        }
    }

    /// Scenario that never ran
    #[must_use]
    pub fn skipped(title: impl Into<String>, suite: impl Into<String>, tags: Vec<String>) -> Self {
        Self::from_attempts(title, suite, tags, Vec::new())
    }

    /// Error of the last failed attempt
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.attempts.iter().rev().find_map(|a| a.error.as_deref())
    }

    /// Artifacts of every attempt
    pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
        self.attempts.iter().flat_map(|a| a.artifacts.iter())
    }
}

/// Counts per status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Scenarios in the report
    pub total: usize,
    /// Passed first time
    pub passed: usize,
    /// Failed
    pub failed: usize,
    /// Passed on a retry
    pub flaky: usize,
    /// Not run
    pub skipped: usize,
}

/// Output format of a suite report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// One line per scenario
    #[default]
    List,
    /// The whole report as JSON
    Json,
    /// JUnit XML for CI servers
    Junit,
}

impl ReporterKind {
    /// Name as used in configuration and on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Json => "json",
            Self::Junit => "junit",
        }
    }

    /// Report file name inside the output directory
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::List => "report.txt",
            Self::Json => "report.json",
            Self::Junit => "junit.xml",
        }
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReporterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "line" => Ok(Self::List),
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::Junit),
            other => Err(format!("unknown reporter '{other}'")),
        }
    }
}

// =============================================================================
// SUITE REPORT
// =============================================================================

/// Outcomes of one suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub name: String,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// Wall time of the run
    pub duration_ms: u64,
    /// Outcomes in catalogue order
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteReport {
    /// Empty report started now
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            duration_ms: 0,
            outcomes: Vec::new(),
        }
    }

    /// Counts per status
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.outcomes.len(),
            ..ReportSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Flaky => summary.flaky += 1,
                TestStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// No scenario failed (flaky counts as passed)
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.outcomes.iter().any(|o| o.status.is_failed())
    }

    /// Failed outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&TestOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary_line(&self) -> String {
        let s = self.summary();
        format!(
            "{}: {} passed, {} failed, {} flaky, {} skipped ({} total) in {:.1}s",
            self.name,
            s.passed,
            s.failed,
            s.flaky,
            s.skipped,
            s.total,
            self.duration_ms as f64 / 1000.0
        )
    }

    /// Render in `kind`
    ///
    /// # Errors
    ///
    /// Serialization errors for JSON.
    pub fn render(&self, kind: ReporterKind) -> PageKitResult<String> {
        match kind {
            ReporterKind::List => Ok(self.render_list()),
            ReporterKind::Json => Ok(serde_json::to_string_pretty(self)?),
            ReporterKind::Junit => Ok(self.render_junit()),
        }
    }

    /// Plain-text list
    #[must_use]
    pub fn render_list(&self) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            let _ = writeln!(
                out,
                "  {:<7} {} ({}ms)",
                outcome.status.as_str(),
                outcome.title,
                outcome.duration_ms
            );
            if outcome.status != TestStatus::Passed {
                for attempt in outcome.attempts.iter().filter(|a| a.is_failed()) {
                    let _ = writeln!(
                        out,
                        "          attempt {}: {}",
                        attempt.attempt,
                        attempt.error.as_deref().unwrap_or_default()
                    );
                }
            }
        }
        out.push_str(&self.summary_line());
        out.push('\n');
        out
    }

    /// JUnit XML
    #[must_use]
    pub fn render_junit(&self) -> String {
        let summary = self.summary();
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
            escape_xml(&self.name),
            summary.total,
            summary.failed,
            summary.skipped,
            self.duration_ms as f64 / 1000.0,
            self.started_at.to_rfc3339()
        );

        for outcome in &self.outcomes {
            let _ = writeln!(
                xml,
                r#"  <testcase name="{}" classname="{}" time="{:.3}">"#,
                escape_xml(&outcome.title),
                escape_xml(&outcome.suite),
                outcome.duration_ms as f64 / 1000.0
            );
            match outcome.status {
                TestStatus::Failed => {
                    let error = outcome.last_error().unwrap_or_default();
                    let kind = outcome
                        .attempts
                        .last()
                        .and_then(|a| a.category.as_deref())
                        .unwrap_or("error");
                    let _ = writeln!(
                        xml,
                        r#"    <failure message="{}" type="{}">{}</failure>"#,
                        escape_xml(error),
                        escape_xml(kind),
                        escape_xml(error)
                    );
                }
                TestStatus::Skipped => xml.push_str("    <skipped/>\n"),
                TestStatus::Flaky => {
                    let _ = writeln!(
                        xml,
                        "    <system-out>flaky: passed on attempt {}</system-out>",
                        outcome.attempts.len()
                    );
                }
                TestStatus::Passed => {}
            }
            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Render in `kind` and write to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// I/O or serialization errors.
    pub fn write(&self, kind: ReporterKind, path: &Path) -> PageKitResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render(kind)?)?;
        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn timeout() -> PageKitError {
        PageKitError::Timeout {
            operation: "wait for get_by_role(dialog)".into(),
            expected: "visible".into(),
            elapsed_ms: 5000,
        }
    }

    fn report() -> SuiteReport {
        let mut report = SuiteReport::new("stormwind");
        report.duration_ms = 2500;
        report.outcomes = vec![
            TestOutcome::from_attempts(
                "admin > dashboard",
                "admin",
                vec!["smoke".into()],
                vec![AttemptRecord::passed(1, 900)],
            ),
            TestOutcome::from_attempts(
                "student > leaderboard",
                "student",
                Vec::new(),
                vec![
                    AttemptRecord::failed(1, 500, &timeout()),
                    AttemptRecord::passed(2, 400),
                ],
            ),
            TestOutcome::from_attempts(
                "student > <webinars>",
                "student",
                Vec::new(),
                vec![
                    AttemptRecord::failed(1, 300, &timeout()),
                    AttemptRecord::failed(2, 300, &timeout()),
                ],
            ),
            TestOutcome::skipped("nightly > sweep", "nightly", Vec::new()),
        ];
        report
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_from_attempts() {
            let r = report();
            let statuses: Vec<TestStatus> = r.outcomes.iter().map(|o| o.status).collect();
            assert_eq!(
                statuses,
                vec![
                    TestStatus::Passed,
                    TestStatus::Flaky,
                    TestStatus::Failed,
                    TestStatus::Skipped
                ]
            );
            assert_eq!(r.outcomes[1].duration_ms, 900);
            assert!(r.outcomes[2].last_error().unwrap().starts_with("Timed out"));
        }

        #[test]
        fn test_flaky_counts_as_passed() {
            assert!(TestStatus::Flaky.is_passed());
            let mut r = report();
            assert!(!r.all_passed());
            r.outcomes.remove(2);
            assert!(r.all_passed());
        }

        #[test]
        fn test_reporter_kind_parsing() {
            assert_eq!("JUnit".parse::<ReporterKind>(), Ok(ReporterKind::Junit));
            assert_eq!("list".parse::<ReporterKind>(), Ok(ReporterKind::List));
            assert!("html".parse::<ReporterKind>().is_err());
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_summary() {
            let r = report();
            let s = r.summary();
            assert_eq!((s.total, s.passed, s.failed, s.flaky, s.skipped), (4, 1, 1, 1, 1));
            let line = r.summary_line();
            assert!(line.starts_with("stormwind: 1 passed, 1 failed, 1 flaky, 1 skipped"));
            assert!(line.contains("2.5s"));
        }

        #[test]
        fn test_render_list() {
            let list = report().render_list();
            assert!(list.contains("passed  admin > dashboard (900ms)"));
            assert!(list.contains("attempt 1: Timed out after 5000ms"));
        }

        #[test]
        fn test_render_junit() {
            let xml = report().render_junit();
            assert!(xml.contains(r#"tests="4" failures="1" skipped="1""#));
            assert!(xml.contains("student &gt; &lt;webinars&gt;"));
            assert!(xml.contains(r#"type="timeout""#));
            assert!(xml.contains("<skipped/>"));
            assert!(xml.contains("flaky: passed on attempt 2"));
        }

        #[test]
        fn test_json_round_trip_and_write() {
            let r = report();
            let json = r.render(ReporterKind::Json).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["outcomes"][1]["status"], "flaky");
            assert_eq!(serde_json::from_str::<SuiteReport>(&json).unwrap(), r);

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("out").join(ReporterKind::Junit.file_name());
            r.write(ReporterKind::Junit, &path).unwrap();
            assert!(std::fs::read_to_string(path).unwrap().contains("<testsuite"));
        }
    }

    mod escape_xml_tests {
        use super::*;

        #[test]
        fn test_escape_special_chars() {
            assert_eq!(escape_xml("a & b"), "a &amp; b");
            assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
            assert_eq!(escape_xml("plain"), "plain");
        }
    }
}
