//! The `test` command: pick an engine, run the catalogue, write the report

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use pagekit::prelude::*;
use pagekit::{ReporterKind, RunObserver, RunnerOptions, SuiteConfig, SuiteReport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the Stormwind catalogue with CLI progress output
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    fail_fast: bool,
}

impl TestRunner {
    /// Runner printing per `config`
    #[must_use]
    pub const fn new(config: CliConfig) -> Self {
        Self {
            config,
            fail_fast: false,
        }
    }

    /// Stop starting scenarios after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Browser for the configured engine; the mock engine serves the
    /// offline replica
    ///
    /// # Errors
    ///
    /// Launch errors.
    pub fn browser(suite: &SuiteConfig) -> CliResult<Arc<dyn BrowserDriver>> {
        match suite.browser {
            BrowserEngine::Mock => Ok(Arc::new(stormwind::replica::browser())),
            BrowserEngine::Chromium => Ok(pagekit::launch_browser(suite)?),
        }
    }

    /// Run the scenarios `filter` selects and write the report into the
    /// output directory
    ///
    /// # Errors
    ///
    /// [`CliError::TestFailures`] when any scenario failed, or the error
    /// that kept the run from starting.
    pub async fn run(&self, suite: &SuiteConfig, filter: &ScenarioFilter) -> CliResult<SuiteReport> {
        let catalogue = stormwind::catalogue();
        let selected = catalogue.select(filter).len();
        if selected == 0 {
            return Err(CliError::invalid_argument(
                "no scenario matches the filter; see `pagekit list`",
            ));
        }

        let mut progress = ProgressReporter::new(
            self.config.color.should_color(),
            self.config.verbosity.is_quiet(),
        );
        progress.info(&format!(
            "running {selected} scenario(s) on {} against {}",
            suite.browser, suite.base_url
        ));
        progress.start_progress(selected as u64, "starting");
        let progress = Arc::new(progress);

        let browser = Self::browser(suite)?;
        let options = RunnerOptions::from_config(suite).with_fail_fast(self.fail_fast);
        let runner = stormwind::runner_with_options(suite, Arc::clone(&browser), options)?
            .with_observer(Arc::clone(&progress) as Arc<dyn RunObserver>);
        let result = runner.run(&catalogue, filter).await;
        if let Err(e) = browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        let report = result?;
        progress.finish();

        let path = report_path(suite);
        report.write(suite.reporter, &path)?;
        info!(path = %path.display(), reporter = %suite.reporter, "report written");
        if suite.reporter != ReporterKind::List {
            println!("{}", report.render(suite.reporter)?);
        }
        progress.summary(&report);

        if report.all_passed() {
            Ok(report)
        } else {
            Err(CliError::test_failures(format!(
                "{} scenario(s) failed",
                report.summary().failed
            )))
        }
    }
}

/// Where the report for the configured reporter goes
#[must_use]
pub fn report_path(suite: &SuiteConfig) -> PathBuf {
    suite.output_dir.join(suite.reporter.file_name())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    fn replica_suite(dir: &tempfile::TempDir) -> SuiteConfig {
        SuiteConfig {
            output_dir: dir.path().to_path_buf(),
            reporter: ReporterKind::Junit,
            ..stormwind::suite::replica_config(&SuiteConfig::default())
        }
    }

    #[test]
    fn test_report_path_follows_reporter() {
        let suite = SuiteConfig {
            output_dir: PathBuf::from("out"),
            reporter: ReporterKind::Json,
            ..SuiteConfig::default()
        };
        assert_eq!(report_path(&suite), PathBuf::from("out/report.json"));
    }

    #[tokio::test]
    async fn test_replica_run_writes_junit() {
        let dir = tempfile::tempdir().unwrap();
        let suite = replica_suite(&dir);
        let filter = ScenarioFilter::all().with_pattern("admin/dashboard");
        let report = TestRunner::new(quiet()).run(&suite, &filter).await.unwrap();
        assert!(report.summary().total >= 3);
        let xml = std::fs::read_to_string(report_path(&suite)).unwrap();
        assert!(xml.contains("<testsuite"));
    }

    #[tokio::test]
    async fn test_empty_selection_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let filter = ScenarioFilter::all().with_pattern("no such scenario");
        let err = TestRunner::new(quiet())
            .run(&replica_suite(&dir), &filter)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
