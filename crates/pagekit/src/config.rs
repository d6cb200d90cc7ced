//! Suite configuration.
//!
//! Layers, later wins: built-in defaults, the YAML file (`pagekit.yaml`),
//! the environment, then whatever the command line sets on the loaded
//! value. Environment variables:
//!
//! | variable | effect |
//! |----------|--------|
//! | `BASE_URL` | application base URL |
//! | `CI` | two retries unless the file sets `retries` |
//! | `CHROMIUM_PATH` | browser executable |
//! | `PAGEKIT_<ROLE>_EMAIL`, `PAGEKIT_<ROLE>_PASSWORD` | role credentials |

use crate::artifacts::ArtifactConfig;
use crate::auth::CredentialStore;
use crate::driver::{BrowserEngine, DriverConfig};
use crate::page::PageSettings;
use crate::reporter::ReporterKind;
use crate::result::{PageKitError, PageKitResult};
use crate::wait::{
    Timeouts, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_EXPECT_TIMEOUT_MS, DEFAULT_NAVIGATION_TIMEOUT_MS,
    DEFAULT_TEST_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Base URL used when neither the file nor `BASE_URL` sets one
pub const DEFAULT_BASE_URL: &str = "https://test-spectre.pantheonsite.io/";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pagekit.yaml";

/// Retries applied when running under CI
pub const CI_RETRIES: u32 = 2;

/// Browser viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Timeout budgets in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole test, all waits included
    pub test_ms: u64,
    /// Assertions
    pub expect_ms: u64,
    /// Element actions
    pub action_ms: u64,
    /// Navigation and load states
    pub navigation_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            test_ms: DEFAULT_TEST_TIMEOUT_MS,
            expect_ms: DEFAULT_EXPECT_TIMEOUT_MS,
            action_ms: DEFAULT_ACTION_TIMEOUT_MS,
            navigation_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}

/// Everything a suite run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application base URL; relative navigation resolves against it
    pub base_url: String,
    /// Engine driving the pages
    pub browser: BrowserEngine,
    /// Run without a window
    pub headless: bool,
    /// Keep the browser sandbox on
    pub sandbox: bool,
    /// Viewport size
    pub viewport: Viewport,
    /// Timeout budgets
    pub timeouts: TimeoutConfig,
    /// Whole-test retries after a failure
    pub retries: u32,
    /// Scenarios running at once
    pub workers: usize,
    /// Allow scenarios of one suite file to run in parallel
    pub fully_parallel: bool,
    /// Report format
    pub reporter: ReporterKind,
    /// Root of reports, screenshots and traces
    pub output_dir: PathBuf,
    /// Failure artifact policies
    pub artifacts: ArtifactConfig,
    /// Explicit browser executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromium_path: Option<PathBuf>,
    /// Role credentials
    pub credentials: CredentialStore,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserEngine::default(),
            headless: true,
            sandbox: true,
            viewport: Viewport::default(),
            timeouts: TimeoutConfig::default(),
            retries: 0,
            workers: 1,
            fully_parallel: false,
            reporter: ReporterKind::default(),
            output_dir: PathBuf::from("test-results"),
            artifacts: ArtifactConfig::default(),
            chromium_path: None,
            credentials: CredentialStore::default(),
        }
    }
}

/// Process environment lookup; empty values count as unset
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl SuiteConfig {
    /// Parse YAML, reporting whether `retries` was set explicitly
    ///
    /// # Errors
    ///
    /// [`PageKitError::Yaml`] on malformed input.
    pub fn parse_yaml(yaml: &str) -> PageKitResult<(Self, bool)> {
        let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml)?;
        if value.is_null() {
            return Ok((Self::default(), false));
        }
        let explicit_retries = value.get("retries").is_some();
        Ok((serde_yaml_ng::from_value(value)?, explicit_retries))
    }

    /// Defaults, then `path` (when given), then the environment from `lookup`
    ///
    /// # Errors
    ///
    /// [`PageKitError::ConfigError`] when the file cannot be read, YAML
    /// errors when it cannot be parsed.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> PageKitResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, explicit_retries) = match path {
            Some(path) => {
                let yaml =
                    std::fs::read_to_string(path).map_err(|e| PageKitError::ConfigError {
                        message: format!("cannot read {}: {e}", path.display()),
                    })?;
                info!(path = %path.display(), "configuration file loaded");
                Self::parse_yaml(&yaml)?
            }
            None => (Self::default(), false),
        };
        config.apply_env(lookup, explicit_retries);
        Ok(config)
    }

    /// Overlay environment variables
    pub fn apply_env<F>(&mut self, lookup: F, explicit_retries: bool)
    where
        F: Fn(&str) -> Option<String>,
    {
        if !explicit_retries && lookup("CI").is_some() {
            self.retries = CI_RETRIES;
            debug!(retries = self.retries, "CI detected");
        }
        if let Some(base_url) = lookup("BASE_URL") {
            debug!(%base_url, "base URL overridden from environment");
            self.base_url = base_url;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            self.chromium_path = Some(PathBuf::from(path));
        }
        self.credentials.apply_env(&lookup);
    }

    /// Reject values no run can work with
    ///
    /// # Errors
    ///
    /// [`PageKitError::ConfigError`] naming the offending field.
    pub fn validate(&self) -> PageKitResult<()> {
        let invalid = |message: String| Err(PageKitError::ConfigError { message });
        if self.workers == 0 {
            return invalid("workers must be at least 1".to_string());
        }
        let t = &self.timeouts;
        for (name, value) in [
            ("test_ms", t.test_ms),
            ("expect_ms", t.expect_ms),
            ("action_ms", t.action_ms),
            ("navigation_ms", t.navigation_ms),
        ] {
            if value == 0 {
                return invalid(format!("timeouts.{name} must be greater than zero"));
            }
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return invalid("viewport must be non-empty".to_string());
        }
        let _ = self.base_url()?;
        Ok(())
    }

    /// Parsed base URL
    ///
    /// # Errors
    ///
    /// [`PageKitError::ConfigError`] unless it is an absolute http(s) URL.
    pub fn base_url(&self) -> PageKitResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| PageKitError::ConfigError {
            message: format!("base_url {:?} is not a valid URL: {e}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PageKitError::ConfigError {
                message: format!("base_url {:?} must use http or https", self.base_url),
            });
        }
        Ok(url)
    }

    /// Wait budgets for pages and locators
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        Timeouts::default()
            .with_expect(Duration::from_millis(self.timeouts.expect_ms))
            .with_action(Duration::from_millis(self.timeouts.action_ms))
            .with_navigation(Duration::from_millis(self.timeouts.navigation_ms))
    }

    /// Budget for one test attempt
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.test_ms)
    }

    /// Browser launch settings
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::new()
            .with_headless(self.headless)
            .with_viewport(self.viewport.width, self.viewport.height);
        if let Some(path) = &self.chromium_path {
            config = config.with_executable(path);
        }
        if !self.sandbox {
            config = config.with_no_sandbox();
        }
        config
    }

    /// Settings shared by every page of the run
    ///
    /// # Errors
    ///
    /// See [`Self::base_url`].
    pub fn page_settings(&self) -> PageKitResult<PageSettings> {
        Ok(PageSettings::default()
            .with_base_url(self.base_url()?)
            .with_timeouts(self.timeouts())
            .with_screenshot_dir(self.output_dir.join("screenshots")))
    }

    /// Copy safe to print
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            credentials: self.credentials.redacted(),
            ..self.clone()
        }
    }

    /// YAML rendering of [`Self::redacted`]
    ///
    /// # Errors
    ///
    /// Serialization errors.
    pub fn to_redacted_yaml(&self) -> PageKitResult<String> {
        Ok(serde_yaml_ng::to_string(&self.redacted())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::artifacts::{ScreenshotPolicy, TracePolicy};
    use crate::auth::{Credentials, Role};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_defaults_match_runner_settings() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.browser, BrowserEngine::Chromium);
            assert!(config.headless);
            assert_eq!(config.viewport, Viewport { width: 1280, height: 720 });
            assert_eq!(config.timeouts.test_ms, 60_000);
            assert_eq!(config.timeouts.expect_ms, 5_000);
            assert_eq!(config.retries, 0);
            assert_eq!(config.workers, 1);
            assert!(!config.fully_parallel);
            assert_eq!(config.reporter, ReporterKind::List);
            assert_eq!(config.artifacts.screenshot, ScreenshotPolicy::OnlyOnFailure);
            assert_eq!(config.artifacts.trace, TracePolicy::OnFirstRetry);
            config.validate().unwrap();
        }

        #[test]
        fn test_derived_settings() {
            let config = SuiteConfig::default();
            assert_eq!(config.test_timeout(), Duration::from_secs(60));
            assert_eq!(config.timeouts().navigation, Duration::from_secs(30));
            let settings = config.page_settings().unwrap();
            assert_eq!(settings.screenshot_dir, PathBuf::from("test-results/screenshots"));
            let driver = config.driver_config();
            assert_eq!((driver.viewport_width, driver.viewport_height), (1280, 720));
            assert!(driver.headless);
        }
    }

    mod layering_tests {
        use super::*;

        #[test]
        fn test_yaml_overrides_defaults() {
            let (config, explicit) = SuiteConfig::parse_yaml(
                "base_url: https://staging.example.com/\nworkers: 3\ntimeouts:\n  expect_ms: 8000\n",
            )
            .unwrap();
            assert!(!explicit);
            assert_eq!(config.workers, 3);
            assert_eq!(config.timeouts.expect_ms, 8000);
            assert_eq!(config.timeouts.test_ms, 60_000);
        }

        #[test]
        fn test_empty_yaml_is_default() {
            let (config, explicit) = SuiteConfig::parse_yaml("").unwrap();
            assert_eq!(config, SuiteConfig::default());
            assert!(!explicit);
        }

        #[test]
        fn test_ci_sets_retries_unless_explicit() {
            let mut config = SuiteConfig::default();
            config.apply_env(env(&[("CI", "true")]), false);
            assert_eq!(config.retries, CI_RETRIES);

            let (mut config, explicit) = SuiteConfig::parse_yaml("retries: 0\n").unwrap();
            config.apply_env(env(&[("CI", "1")]), explicit);
            assert_eq!(config.retries, 0);
        }

        #[test]
        fn test_environment_overrides() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(DEFAULT_CONFIG_FILE);
            std::fs::write(
                &path,
                "base_url: https://file.example.com/\ncredentials:\n  admin:\n    email: a@x.io\n    password: from-file\n",
            )
            .unwrap();
            let config = SuiteConfig::load(
                Some(&path),
                env(&[
                    ("BASE_URL", "https://env.example.com/"),
                    ("CHROMIUM_PATH", "/opt/chromium"),
                    ("PAGEKIT_ADMIN_PASSWORD", "from-env"),
                ]),
            )
            .unwrap();
            assert_eq!(config.base_url, "https://env.example.com/");
            assert_eq!(config.chromium_path, Some(PathBuf::from("/opt/chromium")));
            let admin = config.credentials.get(Role::Admin).unwrap();
            assert_eq!(admin, &Credentials::new("a@x.io", "from-env"));
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = SuiteConfig::load(Some(Path::new("/nonexistent/pagekit.yaml")), env(&[]))
                .unwrap_err();
            assert!(matches!(err, PageKitError::ConfigError { .. }));
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_rejects_zero_workers_and_timeouts() {
            let config = SuiteConfig {
                workers: 0,
                ..SuiteConfig::default()
            };
            assert!(config.validate().unwrap_err().to_string().contains("workers"));

            let mut config = SuiteConfig::default();
            config.timeouts.navigation_ms = 0;
            assert!(config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("timeouts.navigation_ms"));
        }

        #[test]
        fn test_rejects_bad_base_url() {
            for bad in ["not a url", "ftp://example.com/", "/relative"] {
                let config = SuiteConfig {
                    base_url: bad.to_string(),
                    ..SuiteConfig::default()
                };
                assert!(config.validate().is_err(), "{bad} accepted");
            }
        }

        #[test]
        fn test_redacted_yaml_hides_passwords() {
            let config = SuiteConfig {
                credentials: CredentialStore::new()
                    .with(Role::Student, Credentials::new("s@x.io", "hunter2")),
                ..SuiteConfig::default()
            };
            let yaml = config.to_redacted_yaml().unwrap();
            assert!(yaml.contains("s@x.io"));
            assert!(!yaml.contains("hunter2"));
            assert!(yaml.contains("<redacted>"));
        }
    }
}
