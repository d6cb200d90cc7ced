//! Wiring of the Stormwind suite into a [`SuiteRunner`].

use crate::{fixtures, replica, scenarios};
use pagekit::prelude::*;
use pagekit::{RunnerOptions, SuiteConfig, SuiteRunner, TimeoutConfig};
use std::sync::Arc;
use tracing::info;

/// Name the suite reports under
pub const SUITE_NAME: &str = "stormwind";

/// Runner over `browser` with the fixture graph and options from `config`.
///
/// Every attempt gets a fresh session ledger and the shared configuration
/// and page settings as external fixtures.
///
/// # Errors
///
/// [`PageKitError::ConfigError`] when `config` is invalid, or a fixture
/// graph error.
pub fn runner(config: &SuiteConfig, browser: Arc<dyn BrowserDriver>) -> PageKitResult<SuiteRunner> {
    runner_with_options(config, browser, RunnerOptions::from_config(config))
}

/// [`runner`] with explicit options, for callers that override fail-fast
/// or the worker count
///
/// # Errors
///
/// As [`runner`].
pub fn runner_with_options(
    config: &SuiteConfig,
    browser: Arc<dyn BrowserDriver>,
    options: RunnerOptions,
) -> PageKitResult<SuiteRunner> {
    config.validate()?;
    let graph = Arc::new(fixtures::graph()?);
    let settings = Arc::new(config.page_settings()?);
    let shared = Arc::new(config.clone());
    info!(
        base_url = %config.base_url,
        engine = %browser.engine(),
        fixtures = graph.len(),
        "suite ready"
    );
    Ok(SuiteRunner::new(SUITE_NAME, graph, browser, options).with_setup(
        move |scope, env| fixtures::provide_externals(scope, env, &shared, &settings),
    ))
}

/// `config` pointed at the offline replica, with waits short enough for
/// in-memory pages. Roles without complete credentials get the replica's
/// accounts.
#[must_use]
pub fn replica_config(config: &SuiteConfig) -> SuiteConfig {
    let mut credentials = replica::credentials();
    for role in Role::ALL {
        if let Ok(configured) = config.credentials.get(role) {
            credentials = credentials.with(role, configured.clone());
        }
    }
    SuiteConfig {
        base_url: replica::BASE_URL.to_string(),
        browser: BrowserEngine::Mock,
        credentials,
        timeouts: TimeoutConfig {
            test_ms: 30_000,
            expect_ms: 1_000,
            action_ms: 1_000,
            navigation_ms: 2_000,
        },
        ..config.clone()
    }
}

/// Every scenario of the suite
#[must_use]
pub fn catalogue() -> ScenarioCatalogue {
    scenarios::catalogue()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_replica_config_keeps_run_options() {
        let base = SuiteConfig {
            retries: 2,
            workers: 3,
            ..SuiteConfig::default()
        };
        let config = replica_config(&base);
        assert_eq!(config.browser, BrowserEngine::Mock);
        assert_eq!(config.base_url, replica::BASE_URL);
        assert_eq!(config.retries, 2);
        assert_eq!(config.workers, 3);
        assert!(config.credentials.get(Role::Student).is_ok());
        config.validate().unwrap();
    }

    #[test]
    fn test_replica_config_keeps_complete_credentials() {
        let base = SuiteConfig {
            credentials: CredentialStore::new()
                .with(Role::Admin, Credentials::new("lead@example.com", "pw"))
                .with(Role::Student, Credentials::new("", "only-a-password")),
            ..SuiteConfig::default()
        };
        let config = replica_config(&base);
        assert_eq!(config.credentials.get(Role::Admin).unwrap().email, "lead@example.com");
        assert_eq!(
            config.credentials.get(Role::Student).unwrap().email,
            replica::STUDENT_EMAIL
        );
    }

    #[test]
    fn test_runner_rejects_invalid_config() {
        let config = SuiteConfig {
            workers: 0,
            ..replica_config(&SuiteConfig::default())
        };
        let browser: Arc<dyn BrowserDriver> = Arc::new(replica::browser());
        assert!(matches!(
            runner(&config, browser),
            Err(PageKitError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_runner_takes_options_from_config() {
        let config = SuiteConfig {
            retries: 1,
            ..replica_config(&SuiteConfig::default())
        };
        let runner = runner(&config, Arc::new(replica::browser())).unwrap();
        assert_eq!(runner.options().retries, 1);
    }
}
