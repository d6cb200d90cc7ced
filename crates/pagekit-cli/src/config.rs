//! CLI configuration and the layered suite configuration.
//!
//! Suite settings come from the YAML file, then the environment, then the
//! flags of the `test` command.

use crate::commands::{ColorArg, TestArgs};
use crate::error::{CliError, CliResult};
use pagekit::config::DEFAULT_CONFIG_FILE;
use pagekit::{BrowserEngine, SuiteConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Level for a `-v` count; `quiet` wins
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Output settings shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// File to read: the explicit one, else `pagekit.yaml` in `dir` if present
#[must_use]
pub fn config_path(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = dir.join(DEFAULT_CONFIG_FILE);
    default.is_file().then_some(default)
}

/// Defaults, then the file, then the environment `lookup` answers for
///
/// # Errors
///
/// [`CliError::PageKit`] when the file cannot be read or parsed.
pub fn load_suite_config<F>(path: Option<&Path>, lookup: F) -> CliResult<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    debug!(path = ?path, "loading configuration");
    Ok(SuiteConfig::load(path, lookup)?)
}

/// Overlay the `test` command's flags
pub fn apply_test_args(config: &mut SuiteConfig, args: &TestArgs) {
    if let Some(engine) = args.browser {
        config.browser = engine.into();
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(reporter) = args.reporter {
        config.reporter = reporter.into();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(output) = &args.output {
        config.output_dir.clone_from(output);
    }
}

/// Final checks on the layered configuration; the mock engine gets the
/// replica's address, accounts and waits
///
/// # Errors
///
/// [`CliError::Config`] naming the offending value.
pub fn finish(config: SuiteConfig) -> CliResult<SuiteConfig> {
    let config = match config.browser {
        BrowserEngine::Mock => stormwind::suite::replica_config(&config),
        BrowserEngine::Chromium => config,
    };
    config
        .validate()
        .map_err(|e| CliError::config(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{EngineArg, ReporterArg};
    use pagekit::ReporterKind;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod layering_tests {
        use super::*;

        #[test]
        fn test_flags_override_file_and_environment() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("pagekit.yaml");
            std::fs::write(&path, "workers: 2\nretries: 1\nbase_url: https://file.example.com/\n")
                .unwrap();
            let mut config = load_suite_config(
                Some(&path),
                env(&[("BASE_URL", "https://env.example.com/")]),
            )
            .unwrap();
            assert_eq!(config.base_url, "https://env.example.com/");
            assert_eq!(config.workers, 2);

            let args = TestArgs {
                workers: Some(6),
                reporter: Some(ReporterArg::Junit),
                headed: true,
                ..TestArgs::default()
            };
            apply_test_args(&mut config, &args);
            assert_eq!(config.workers, 6);
            assert_eq!(config.retries, 1);
            assert_eq!(config.reporter, ReporterKind::Junit);
            assert!(!config.headless);
        }

        #[test]
        fn test_default_file_is_picked_up_when_present() {
            let dir = tempfile::tempdir().unwrap();
            assert_eq!(config_path(None, dir.path()), None);
            std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "workers: 1\n").unwrap();
            assert_eq!(
                config_path(None, dir.path()),
                Some(dir.path().join(DEFAULT_CONFIG_FILE))
            );
            let explicit = Path::new("/tmp/other.yaml");
            assert_eq!(
                config_path(Some(explicit), dir.path()),
                Some(explicit.to_path_buf())
            );
        }
    }

    mod finish_tests {
        use super::*;

        #[test]
        fn test_mock_engine_points_at_replica() {
            let mut config = SuiteConfig::default();
            apply_test_args(
                &mut config,
                &TestArgs {
                    browser: Some(EngineArg::Mock),
                    retries: Some(3),
                    ..TestArgs::default()
                },
            );
            let config = finish(config).unwrap();
            assert_eq!(config.base_url, stormwind::replica::BASE_URL);
            assert_eq!(config.retries, 3);
        }

        #[test]
        fn test_zero_workers_is_a_config_error() {
            let config = SuiteConfig {
                workers: 0,
                ..SuiteConfig::default()
            };
            assert!(matches!(finish(config), Err(CliError::Config { .. })));
        }
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(3, false), Verbosity::Debug);
        assert!(Verbosity::from_flags(2, true).is_quiet());
    }
}
