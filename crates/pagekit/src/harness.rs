//! Scenarios and the catalogue they are registered in.

use crate::fixture::{FixtureGraph, FixtureScope};
use crate::result::{PageKitError, PageKitResult};
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Future returned by a scenario body
pub type ScenarioFuture = BoxFuture<'static, PageKitResult<()>>;

type ScenarioBody = Arc<dyn Fn(FixtureScope) -> ScenarioFuture + Send + Sync>;

/// One end-to-end test: a named async body plus the fixtures it uses
#[derive(Clone)]
pub struct Scenario {
    suite: String,
    name: String,
    tags: Vec<String>,
    fixtures: Vec<String>,
    timeout: Option<Duration>,
    skip: Option<String>,
    body: ScenarioBody,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("title", &self.title())
            .field("tags", &self.tags)
            .field("fixtures", &self.fixtures)
            .field("timeout", &self.timeout)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Scenario `name` in `suite` (`admin`, `student/leaderboard`, ...)
    #[must_use]
    pub fn new<F, Fut>(suite: impl Into<String>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(FixtureScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PageKitResult<()>> + Send + 'static,
    {
        Self {
            suite: suite.into(),
            name: name.into(),
            tags: Vec::new(),
            fixtures: Vec::new(),
            timeout: None,
            skip: None,
            body: Arc::new(move |scope| Box::pin(body(scope))),
        }
    }

    /// Add tags; a leading `@` is dropped
    #[must_use]
    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags
            .extend(tags.iter().map(|t| t.trim_start_matches('@').to_string()));
        self
    }

    /// Declare the fixtures the body requests
    #[must_use]
    pub fn uses(mut self, fixtures: &[&str]) -> Self {
        self.fixtures.extend(fixtures.iter().map(ToString::to_string));
        self
    }

    /// Override the per-test timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register without running
    #[must_use]
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    /// Suite path
    #[must_use]
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `suite > name`
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} > {}", self.suite, self.name)
    }

    /// Tags without `@`
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Declared fixtures
    #[must_use]
    pub fn fixtures(&self) -> &[String] {
        &self.fixtures
    }

    /// Timeout override
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Why the scenario is skipped
    #[must_use]
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref()
    }

    /// Start the body against `scope`
    #[must_use]
    pub fn run(&self, scope: FixtureScope) -> ScenarioFuture {
        (self.body)(scope)
    }
}

/// Title and tag selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    pattern: Option<String>,
    tags: Vec<String>,
}

impl ScenarioFilter {
    /// Filter selecting everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep titles containing `pattern` (case-insensitive)
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.pattern = (!pattern.trim().is_empty()).then(|| pattern.trim().to_lowercase());
        self
    }

    /// Keep scenarios carrying any of `tags`
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.extend(
            tags.into_iter()
                .map(|t| t.as_ref().trim_start_matches('@').to_string()),
        );
        self
    }

    /// Whether `scenario` is selected
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let title_ok = self
            .pattern
            .as_ref()
            .map_or(true, |p| scenario.title().to_lowercase().contains(p));
        let tags_ok =
            self.tags.is_empty() || self.tags.iter().any(|t| scenario.tags.contains(t));
        title_ok && tags_ok
    }
}

/// Ordered set of scenarios with unique titles
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalogue {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalogue {
    /// Empty catalogue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario
    #[must_use]
    pub fn with(mut self, scenario: Scenario) -> Self {
        self.push(scenario);
        self
    }

    /// Append a scenario
    pub fn push(&mut self, scenario: Scenario) {
        self.scenarios.push(scenario);
    }

    /// Append every scenario of `other`
    pub fn extend(&mut self, other: Self) {
        self.scenarios.extend(other.scenarios);
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether there are none
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenarios in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Scenario by full title
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.title() == title)
    }

    /// Scenarios selected by `filter`, in registration order
    #[must_use]
    pub fn select(&self, filter: &ScenarioFilter) -> Vec<&Scenario> {
        self.scenarios.iter().filter(|s| filter.matches(s)).collect()
    }

    /// Distinct suite paths, in first-seen order
    #[must_use]
    pub fn suites(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.scenarios
            .iter()
            .map(Scenario::suite)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Reject duplicate titles and fixtures `graph` does not declare
    ///
    /// # Errors
    ///
    /// [`PageKitError::FixtureError`] for a duplicate title,
    /// [`PageKitError::UnknownFixture`] for an undeclared fixture.
    pub fn validate(&self, graph: &FixtureGraph) -> PageKitResult<()> {
        let mut titles = HashSet::new();
        for scenario in &self.scenarios {
            let title = scenario.title();
            let required: Vec<&str> = scenario.fixtures.iter().map(String::as_str).collect();
            graph.validate_required(&title, &required)?;
            if !titles.insert(title.clone()) {
                return Err(PageKitError::FixtureError {
                    message: format!("scenario '{title}' is registered twice"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn noop(suite: &str, name: &str) -> Scenario {
        Scenario::new(suite, name, |_scope| async { Ok(()) })
    }

    fn catalogue() -> ScenarioCatalogue {
        ScenarioCatalogue::new()
            .with(noop("admin", "dashboard loads").tagged(&["@smoke"]).uses(&["adminDashboard"]))
            .with(noop("admin", "learning paths").uses(&["manageLearningPaths"]))
            .with(noop("student", "leaderboard export").tagged(&["nightly"]))
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_title_and_tags() {
            let c = catalogue();
            let first = c.iter().next().unwrap();
            assert_eq!(first.title(), "admin > dashboard loads");
            assert_eq!(first.tags(), ["smoke".to_string()]);
            assert!(c.get("student > leaderboard export").is_some());
            assert_eq!(c.suites(), vec!["admin", "student"]);
        }

        #[tokio::test]
        async fn test_body_runs_against_scope() {
            let graph = Arc::new(
                FixtureGraph::builder()
                    .fixture("answer", &[], |_deps| async { Ok(42_u32) })
                    .build()
                    .unwrap(),
            );
            let scenario = Scenario::new("unit", "reads fixture", |scope: FixtureScope| async move {
                let answer = scope.get::<u32>("answer").await?;
                assert_eq!(*answer, 42);
                Ok::<(), PageKitError>(())
            });
            scenario.run(graph.scope()).await.unwrap();
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_pattern_is_case_insensitive_substring() {
            let c = catalogue();
            let filter = ScenarioFilter::all().with_pattern("ADMIN >");
            assert_eq!(c.select(&filter).len(), 2);
            assert_eq!(c.select(&ScenarioFilter::all().with_pattern("  ")).len(), 3);
        }

        #[test]
        fn test_tags_match_any() {
            let c = catalogue();
            let filter = ScenarioFilter::all().with_tags(["@nightly", "smoke"]);
            let titles: Vec<String> = c.select(&filter).iter().map(|s| s.title()).collect();
            assert_eq!(titles, vec!["admin > dashboard loads", "student > leaderboard export"]);
            let both = ScenarioFilter::all().with_pattern("admin").with_tags(["nightly"]);
            assert!(c.select(&both).is_empty());
        }
    }

    mod validate_tests {
        use super::*;

        fn graph() -> FixtureGraph {
            FixtureGraph::builder()
                .fixture("adminDashboard", &[], |_deps| async { Ok(()) })
                .fixture("manageLearningPaths", &[], |_deps| async { Ok(()) })
                .build()
                .unwrap()
        }

        #[test]
        fn test_unknown_fixture_is_reported_with_scenario() {
            let err = catalogue()
                .with(noop("student", "classroom").uses(&["myClassroom"]))
                .validate(&graph())
                .unwrap_err();
            match err {
                PageKitError::UnknownFixture { name, required_by } => {
                    assert_eq!(name, "myClassroom");
                    assert_eq!(required_by, "student > classroom");
                }
                other => panic!("unexpected error {other}"),
            }
        }

        #[test]
        fn test_duplicate_titles_rejected() {
            assert!(catalogue().validate(&graph()).is_ok());
            let dup = catalogue().with(noop("admin", "learning paths"));
            assert!(matches!(
                dup.validate(&graph()),
                Err(PageKitError::FixtureError { .. })
            ));
        }
    }
}
