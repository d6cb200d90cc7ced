//! Progress and status output on stderr

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pagekit::{RunObserver, SuiteReport, TestOutcome, TestStatus};

/// Live progress of a suite run: a bar plus one status line per finished
/// scenario
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(line),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }

    fn label(&self, status: TestStatus) -> String {
        let (symbol, plain) = match status {
            TestStatus::Passed => ("✓", "PASS"),
            TestStatus::Failed => ("✗", "FAIL"),
            TestStatus::Flaky => ("~", "FLAKY"),
            TestStatus::Skipped => ("-", "SKIP"),
        };
        if !self.use_color {
            return plain.to_string();
        }
        let styled = style(symbol).bold();
        match status {
            TestStatus::Passed => styled.green(),
            TestStatus::Failed => styled.red(),
            TestStatus::Flaky => styled.yellow(),
            TestStatus::Skipped => styled.dim(),
        }
        .to_string()
    }

    /// Status line of one outcome
    #[must_use]
    pub fn outcome_line(&self, outcome: &TestOutcome) -> String {
        let mut line = format!(
            "{} {} ({} ms)",
            self.label(outcome.status),
            outcome.title,
            outcome.duration_ms
        );
        if let Some(error) = outcome.last_error().filter(|_| outcome.status.is_failed()) {
            line.push_str("\n    ");
            line.push_str(error);
        }
        line
    }

    /// Print a failure message; shown even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Summary of a finished run
    pub fn summary(&self, report: &SuiteReport) {
        let line = report.summary_line();
        if report.all_passed() {
            if !self.quiet {
                let line = if self.use_color {
                    style(line).green().to_string()
                } else {
                    line
                };
                self.line(&line);
            }
        } else {
            let line = if self.use_color {
                style(line).red().bold().to_string()
            } else {
                line
            };
            self.line(&line);
        }
    }
}

impl RunObserver for ProgressReporter {
    fn attempt_started(&self, title: &str, attempt: u32) {
        if let Some(ref pb) = self.progress_bar {
            let message = if attempt > 1 {
                format!("{title} (retry {})", attempt - 1)
            } else {
                title.to_string()
            };
            pb.set_message(message);
        }
    }

    fn scenario_finished(&self, outcome: &TestOutcome) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
        if outcome.status.is_failed() || !self.quiet {
            self.line(&self.outcome_line(outcome));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pagekit::reporter::AttemptRecord;
    use pagekit::PageKitError;

    fn failed_outcome() -> TestOutcome {
        let error = PageKitError::AssertionFailed {
            message: "leaderboard heading is hidden".to_string(),
        };
        TestOutcome::from_attempts(
            "student/leaderboard > should load",
            "student/leaderboard",
            Vec::new(),
            vec![AttemptRecord::failed(1, 12, &error)],
        )
    }

    #[test]
    fn test_plain_outcome_line_carries_error() {
        let reporter = ProgressReporter::new(false, false);
        let line = reporter.outcome_line(&failed_outcome());
        assert!(line.starts_with("FAIL student/leaderboard > should load"));
        assert!(line.contains("leaderboard heading is hidden"));
    }

    #[test]
    fn test_skipped_outcome_has_no_error_line() {
        let reporter = ProgressReporter::new(false, true);
        let outcome = TestOutcome::skipped("admin > later", "admin", Vec::new());
        assert_eq!(reporter.outcome_line(&outcome), "SKIP admin > later (0 ms)");
    }

    #[test]
    fn test_quiet_reporter_never_starts_a_bar() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_progress(10, "running");
        assert!(reporter.progress_bar.is_none());
    }
}
