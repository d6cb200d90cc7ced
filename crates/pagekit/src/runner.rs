//! Suite execution.
//!
//! Each attempt of a scenario gets a fresh [`FixtureScope`] and a fresh
//! [`RecordingBrowser`] over the shared engine. A failed attempt is re-run
//! from scratch up to `retries` times; nothing inside an attempt is retried.
//! Failure screenshots are taken before teardown closes the sessions.

use crate::artifacts::{test_artifact_dir, ArtifactConfig, RecordingBrowser};
use crate::config::SuiteConfig;
use crate::driver::BrowserDriver;
use crate::fixture::{panic_message, FixtureGraph, FixtureScope};
use crate::harness::{Scenario, ScenarioCatalogue, ScenarioFilter};
use crate::reporter::{AttemptRecord, SuiteReport, TestOutcome};
use crate::result::{PageKitError, PageKitResult};
use crate::trace::ExecutionTrace;
use crate::wait::millis;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn, Instrument};

// =============================================================================
// OPTIONS
// =============================================================================

/// How a suite is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Whole-test retries after a failure
    pub retries: u32,
    /// Units running at once
    pub workers: usize,
    /// Run scenarios of one suite in parallel too
    pub fully_parallel: bool,
    /// Budget of one attempt unless the scenario overrides it
    pub test_timeout: Duration,
    /// Stop starting scenarios after the first failure
    pub fail_fast: bool,
    /// Screenshot and trace policies
    pub artifacts: ArtifactConfig,
    /// Root of per-test artifact directories
    pub output_dir: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from_config(&SuiteConfig::default())
    }
}

impl RunnerOptions {
    /// Options taken from a suite configuration
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            retries: config.retries,
            workers: config.workers.max(1),
            fully_parallel: config.fully_parallel,
            test_timeout: config.test_timeout(),
            fail_fast: false,
            artifacts: config.artifacts,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Set fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set retries
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set workers (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the per-test timeout
    #[must_use]
    pub const fn with_test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }
}

// =============================================================================
// HOOKS
// =============================================================================

/// What the setup hook gets for one attempt
#[derive(Debug, Clone)]
pub struct AttemptEnv {
    /// Full scenario title
    pub title: String,
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Browser for this attempt (records into the attempt's trace)
    pub browser: Arc<dyn BrowserDriver>,
}

type ScopeSetup = Arc<dyn Fn(&FixtureScope, &AttemptEnv) -> PageKitResult<()> + Send + Sync>;

/// Progress callbacks
pub trait RunObserver: Send + Sync {
    /// An attempt is about to start
    fn attempt_started(&self, _title: &str, _attempt: u32) {}

    /// A scenario reached its final status
    fn scenario_finished(&self, _outcome: &TestOutcome) {}
}

#[derive(Debug)]
struct Silent;

impl RunObserver for Silent {}

// =============================================================================
// RUNNER
// =============================================================================

/// Runs a scenario catalogue against one fixture graph and one engine
pub struct SuiteRunner {
    name: String,
    graph: Arc<FixtureGraph>,
    browser: Arc<dyn BrowserDriver>,
    options: RunnerOptions,
    setup: ScopeSetup,
    observer: Arc<dyn RunObserver>,
}

impl fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("name", &self.name)
            .field("fixtures", &self.graph.len())
            .field("engine", &self.browser.engine())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    /// Runner with no setup hook
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        graph: Arc<FixtureGraph>,
        browser: Arc<dyn BrowserDriver>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            name: name.into(),
            graph,
            browser,
            options,
            setup: Arc::new(|_, _| Ok(())),
            observer: Arc::new(Silent),
        }
    }

    /// Hook providing external fixtures to every fresh scope
    #[must_use]
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&FixtureScope, &AttemptEnv) -> PageKitResult<()> + Send + Sync + 'static,
    {
        self.setup = Arc::new(setup);
        self
    }

    /// Progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run the scenarios `filter` selects.
    ///
    /// Fixture requirements of the whole catalogue are checked before
    /// anything runs. Outcomes keep catalogue order.
    ///
    /// # Errors
    ///
    /// Fixture validation errors; scenario failures are reported in the
    /// returned report instead.
    pub async fn run(
        &self,
        catalogue: &ScenarioCatalogue,
        filter: &ScenarioFilter,
    ) -> PageKitResult<SuiteReport> {
        catalogue.validate(&self.graph)?;
        let selected = catalogue.select(filter);
        let started = Instant::now();
        let mut report = SuiteReport::new(self.name.clone());
        info!(
            suite = %self.name,
            scenarios = selected.len(),
            workers = self.options.workers,
            retries = self.options.retries,
            "run started"
        );

        let stop = AtomicBool::new(false);
        let units = self.units(&selected);
        let mut outcomes: Vec<(usize, TestOutcome)> = stream::iter(units)
            .map(|unit| self.run_unit(unit, &stop))
            .buffer_unordered(self.options.workers)
            .flat_map(stream::iter)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        report.outcomes = outcomes.into_iter().map(|(_, o)| o).collect();
        report.duration_ms = millis(started.elapsed());
        info!(summary = %report.summary_line(), "run finished");
        Ok(report)
    }

    /// Scheduling units: one per scenario when fully parallel, else one per
    /// suite with its scenarios in order
    fn units<'a>(&self, selected: &[&'a Scenario]) -> Vec<Vec<(usize, &'a Scenario)>> {
        if self.options.fully_parallel {
            return selected
                .iter()
                .enumerate()
                .map(|(i, s)| vec![(i, *s)])
                .collect();
        }
        let mut units: Vec<Vec<(usize, &Scenario)>> = Vec::new();
        for (index, scenario) in selected.iter().enumerate() {
            match units
                .iter_mut()
                .find(|u| u.first().is_some_and(|(_, s)| s.suite() == scenario.suite()))
            {
                Some(unit) => unit.push((index, *scenario)),
                None => units.push(vec![(index, *scenario)]),
            }
        }
        units
    }

    async fn run_unit(
        &self,
        unit: Vec<(usize, &Scenario)>,
        stop: &AtomicBool,
    ) -> Vec<(usize, TestOutcome)> {
        let mut outcomes = Vec::with_capacity(unit.len());
        for (index, scenario) in unit {
            let tags = scenario.tags().to_vec();
            let outcome = if stop.load(Ordering::SeqCst) {
                TestOutcome::skipped(scenario.title(), scenario.suite(), tags)
            } else if let Some(reason) = scenario.skip_reason() {
                info!(test = %scenario.title(), %reason, "skipped");
                TestOutcome::skipped(scenario.title(), scenario.suite(), tags)
            } else {
                self.run_scenario(scenario).await
            };
            if outcome.status.is_failed() && self.options.fail_fast {
                stop.store(true, Ordering::SeqCst);
            }
            self.observer.scenario_finished(&outcome);
            outcomes.push((index, outcome));
        }
        outcomes
    }

    /// Run one scenario with retries
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestOutcome {
        let title = scenario.title();
        let mut attempts = Vec::new();
        for attempt in 1..=self.options.retries.saturating_add(1) {
            self.observer.attempt_started(&title, attempt);
            let span = info_span!("test", title = %title, attempt);
            let record = self.run_attempt(scenario, attempt).instrument(span).await;
            let failed = record.is_failed();
            attempts.push(record);
            if !failed {
                break;
            }
        }
        let outcome = TestOutcome::from_attempts(
            title,
            scenario.suite(),
            scenario.tags().to_vec(),
            attempts,
        );
        info!(test = %outcome.title, status = %outcome.status, "scenario finished");
        outcome
    }

    async fn run_attempt(&self, scenario: &Scenario, attempt: u32) -> AttemptRecord {
        let title = scenario.title();
        let policies = self.options.artifacts;
        let trace = policies
            .trace
            .should_record(attempt)
            .then(|| Arc::new(ExecutionTrace::new(title.clone(), attempt)));
        let recording = Arc::new(RecordingBrowser::new(
            Arc::clone(&self.browser),
            trace.clone(),
        ));
        let env = AttemptEnv {
            title: title.clone(),
            attempt,
            browser: Arc::clone(&recording) as Arc<dyn BrowserDriver>,
        };
        let started = Instant::now();
        let scope = self.graph.scope();

        let result = match (self.setup)(&scope, &env) {
            Ok(()) => self.run_body(scenario, &scope).await,
            Err(e) => Err(e),
        };
        let failed = result.is_err();
        let dir = test_artifact_dir(&self.options.output_dir, &title);
        let mut artifacts = Vec::new();
        if policies.screenshot.should_capture(failed) {
            artifacts.extend(
                recording
                    .capture_screenshots(&dir, &format!("attempt-{attempt}"))
                    .await,
            );
        }
        let teardown = scope.teardown().await;
        if let Some(trace) = trace.filter(|_| policies.trace.should_keep(failed)) {
            if let Some(path) = save_trace(&trace, &dir, attempt) {
                artifacts.push(path);
            }
        }
        let duration_ms = millis(started.elapsed());

        let mut record = match result.and(teardown) {
            Ok(()) => AttemptRecord::passed(attempt, duration_ms),
            Err(e) => {
                warn!(error = %e, category = e.category(), "attempt failed");
                AttemptRecord::failed(attempt, duration_ms, &e)
            }
        };
        record.artifacts = artifacts;
        record
    }

    async fn run_body(&self, scenario: &Scenario, scope: &FixtureScope) -> PageKitResult<()> {
        let budget = scenario.timeout().unwrap_or(self.options.test_timeout);
        let body = AssertUnwindSafe(scenario.run(scope.clone())).catch_unwind();
        match tokio::time::timeout(budget, body).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(PageKitError::AssertionFailed {
                message: format!("test panicked: {}", panic_message(panic.as_ref())),
            }),
            Err(_) => Err(PageKitError::Timeout {
                operation: format!("test '{}'", scenario.title()),
                expected: "completion".to_string(),
                elapsed_ms: millis(budget),
            }),
        }
    }
}

fn save_trace(trace: &ExecutionTrace, dir: &Path, attempt: u32) -> Option<PathBuf> {
    let path = dir.join(format!("trace-{attempt}.json"));
    match trace.archive().save_json(&path) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "trace not saved");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::artifacts::{ScreenshotPolicy, TracePolicy};
    use crate::mock::{MockBrowser, MockRoute, MockSite};
    use crate::reporter::TestStatus;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    fn graph() -> Arc<FixtureGraph> {
        Arc::new(
            FixtureGraph::builder()
                .external("browser")
                .fixture("page", &["browser"], |deps| async move {
                    let browser = deps.get::<Arc<dyn BrowserDriver>>("browser")?;
                    let context = browser.new_context().await?;
                    let page = context.new_page().await?;
                    page.goto("https://lms.example.com/").await?;
                    Ok::<_, PageKitError>(page)
                })
                .build()
                .unwrap(),
        )
    }

    fn runner(options: RunnerOptions) -> SuiteRunner {
        let site = MockSite::new().route(MockRoute::html("/", "<html><body>Home</body></html>"));
        let browser: Arc<dyn BrowserDriver> = Arc::new(MockBrowser::new(site));
        SuiteRunner::new("unit", graph(), browser, options).with_setup(|scope, env| {
            scope.provide("browser", Arc::clone(&env.browser))
        })
    }

    fn options(dir: &Path) -> RunnerOptions {
        RunnerOptions {
            output_dir: dir.to_path_buf(),
            test_timeout: Duration::from_secs(5),
            ..RunnerOptions::default()
        }
    }

    fn passing(suite: &str, name: &str) -> Scenario {
        Scenario::new(suite, name, |_scope| async { Ok(()) })
    }

    fn failing(suite: &str, name: &str) -> Scenario {
        Scenario::new(suite, name, |_scope| async {
            Err(PageKitError::assertion("dashboard", "visible", "it was hidden"))
        })
    }

    mod status_tests {
        use super::*;

        #[tokio::test]
        async fn test_pass_fail_and_order() {
            let dir = tempfile::tempdir().unwrap();
            let catalogue = ScenarioCatalogue::new()
                .with(passing("a", "one"))
                .with(failing("b", "two"))
                .with(passing("a", "three"));
            let report = runner(options(dir.path()).with_workers(2))
                .run(&catalogue, &ScenarioFilter::all())
                .await
                .unwrap();
            let titles: Vec<&str> = report.outcomes.iter().map(|o| o.title.as_str()).collect();
            assert_eq!(titles, vec!["a > one", "b > two", "a > three"]);
            assert_eq!(report.outcomes[1].status, TestStatus::Failed);
            assert_eq!(report.outcomes[1].attempts[0].category.as_deref(), Some("assertion"));
            assert!(!report.all_passed());
        }

        #[tokio::test]
        async fn test_retry_from_fresh_scope_marks_flaky() {
            let dir = tempfile::tempdir().unwrap();
            let runs = Arc::new(AtomicU32::new(0));
            let scopes = Arc::new(Mutex::new(Vec::new()));
            let (r, s) = (Arc::clone(&runs), Arc::clone(&scopes));
            let flaky = Scenario::new("a", "flaky", move |scope: FixtureScope| {
                let runs = Arc::clone(&r);
                let scopes = Arc::clone(&s);
                async move {
                    let page = scope.get::<Arc<dyn crate::driver::PageDriver>>("page").await?;
                    scopes.lock().unwrap().push(page.id().to_string());
                    if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                        return Err(PageKitError::PageError {
                            message: "first try".into(),
                        });
                    }
                    Ok::<(), PageKitError>(())
                }
            })
            .uses(&["page"]);
            let report = runner(options(dir.path()).with_retries(2))
                .run(&ScenarioCatalogue::new().with(flaky), &ScenarioFilter::all())
                .await
                .unwrap();
            assert_eq!(report.outcomes[0].status, TestStatus::Flaky);
            assert_eq!(report.outcomes[0].attempts.len(), 2);
            let scopes = scopes.lock().unwrap();
            assert_eq!(scopes.len(), 2);
            assert_ne!(scopes[0], scopes[1]);
            assert!(report.all_passed());
        }

        #[tokio::test]
        async fn test_timeout_and_panic_fail_the_attempt() {
            let dir = tempfile::tempdir().unwrap();
            let slow = Scenario::new("a", "slow", |_scope| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .with_timeout(Duration::from_millis(50));
            let panics = Scenario::new("a", "panics", |_scope| async {
                let missing: Option<()> = None;
                missing.expect("card should exist");
                Ok::<(), PageKitError>(())
            });
            let report = runner(options(dir.path()))
                .run(
                    &ScenarioCatalogue::new().with(slow).with(panics),
                    &ScenarioFilter::all(),
                )
                .await
                .unwrap();
            assert_eq!(report.outcomes[0].attempts[0].category.as_deref(), Some("timeout"));
            assert!(report.outcomes[1]
                .last_error()
                .unwrap()
                .contains("test panicked: card should exist"));
        }

        #[tokio::test]
        async fn test_fail_fast_skips_the_rest() {
            let dir = tempfile::tempdir().unwrap();
            let catalogue = ScenarioCatalogue::new()
                .with(failing("a", "one"))
                .with(passing("a", "two"))
                .with(passing("a", "three").skipped("not on staging"));
            let report = runner(options(dir.path()).with_fail_fast(true))
                .run(&catalogue, &ScenarioFilter::all())
                .await
                .unwrap();
            let statuses: Vec<TestStatus> = report.outcomes.iter().map(|o| o.status).collect();
            assert_eq!(
                statuses,
                vec![TestStatus::Failed, TestStatus::Skipped, TestStatus::Skipped]
            );
        }

        #[tokio::test]
        async fn test_unknown_fixture_fails_before_running() {
            let dir = tempfile::tempdir().unwrap();
            let ran = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&ran);
            let first = Scenario::new("a", "first", move |_scope| {
                flag.store(true, Ordering::SeqCst);
                async { Ok(()) }
            });
            let catalogue = ScenarioCatalogue::new()
                .with(first)
                .with(passing("a", "second").uses(&["nope"]));
            let err = runner(options(dir.path()))
                .run(&catalogue, &ScenarioFilter::all())
                .await
                .unwrap_err();
            assert!(matches!(err, PageKitError::UnknownFixture { .. }));
            assert!(!ran.load(Ordering::SeqCst));
        }
    }

    mod artifact_tests {
        use super::*;

        #[tokio::test]
        async fn test_failure_screenshot_and_trace() {
            let dir = tempfile::tempdir().unwrap();
            let mut opts = options(dir.path()).with_retries(1);
            opts.artifacts = ArtifactConfig {
                screenshot: ScreenshotPolicy::OnlyOnFailure,
                trace: TracePolicy::RetainOnFailure,
            };
            let broken = Scenario::new("student", "broken", |scope: FixtureScope| async move {
                let _page = scope.get::<Arc<dyn crate::driver::PageDriver>>("page").await?;
                Err::<(), PageKitError>(PageKitError::PageError {
                    message: "boom".into(),
                })
            })
            .uses(&["page"]);
            let report = runner(opts)
                .run(&ScenarioCatalogue::new().with(broken), &ScenarioFilter::all())
                .await
                .unwrap();
            let outcome = &report.outcomes[0];
            assert_eq!(outcome.attempts.len(), 2);
            let test_dir = dir.path().join("student---broken");
            assert!(test_dir.join("attempt-1-1.png").exists());
            assert!(test_dir.join("trace-2.json").exists());
            let trace =
                crate::trace::TraceArchive::load_json(&test_dir.join("trace-1.json")).unwrap();
            assert!(!trace.events.is_empty());
            assert_eq!(outcome.artifacts().count(), 4);
        }

        #[tokio::test]
        async fn test_passing_attempt_keeps_nothing_by_default() {
            let dir = tempfile::tempdir().unwrap();
            let ok = Scenario::new("a", "ok", |scope: FixtureScope| async move {
                let _page = scope.get::<Arc<dyn crate::driver::PageDriver>>("page").await?;
                Ok::<(), PageKitError>(())
            })
            .uses(&["page"]);
            let report = runner(options(dir.path()))
                .run(&ScenarioCatalogue::new().with(ok), &ScenarioFilter::all())
                .await
                .unwrap();
            assert_eq!(report.outcomes[0].artifacts().count(), 0);
            assert!(!dir.path().join("a---ok").exists());
        }
    }
}
