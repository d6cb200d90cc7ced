//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use pagekit::{BrowserEngine, LogFormat, ReporterKind};
use std::path::PathBuf;

/// PageKit: page-object end-to-end runner for the Stormwind LMS suite
#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, value_enum, default_value = "pretty", global = true, env = "PAGEKIT_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Configuration file (defaults to ./pagekit.yaml when present)
    #[arg(short, long, global = true, env = "PAGEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Test(TestArgs),

    /// List the scenario catalogue
    List(ListArgs),

    /// Validate the fixture graph and show resolution orders
    Fixtures(FixturesArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the test command
#[derive(Parser, Debug, Default)]
pub struct TestArgs {
    /// Browser engine; `mock` runs against the offline replica
    #[arg(short, long, value_enum)]
    pub browser: Option<EngineArg>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Scenarios running at once
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Whole-test retries after a failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub reporter: Option<ReporterArg>,

    /// Only titles containing this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only scenarios with this tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Application base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Root of reports, screenshots and traces
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop starting scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Only titles containing this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only scenarios with this tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Print the catalogue as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the fixtures command
#[derive(Parser, Debug, Default)]
pub struct FixturesArgs {
    /// Only this fixture
    pub name: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// Apply the replica overrides `--browser mock` would
    #[arg(long)]
    pub mock: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Browser engine argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineArg {
    /// Chromium over CDP
    Chromium,
    /// In-memory engine serving the offline replica
    Mock,
}

impl From<EngineArg> for BrowserEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Chromium => Self::Chromium,
            EngineArg::Mock => Self::Mock,
        }
    }
}

/// Reporter argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReporterArg {
    /// One line per scenario
    List,
    /// Whole report as JSON
    Json,
    /// JUnit XML
    Junit,
}

impl From<ReporterArg> for ReporterKind {
    fn from(arg: ReporterArg) -> Self {
        match arg {
            ReporterArg::List => Self::List,
            ReporterArg::Json => Self::Json,
            ReporterArg::Junit => Self::Junit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_test_command() {
            let cli = Cli::try_parse_from([
                "pagekit", "test", "--browser", "mock", "-j", "4", "--tag", "nightly", "--tag",
                "smoke", "--reporter", "junit",
            ])
            .unwrap();
            let Commands::Test(args) = cli.command else {
                panic!("expected the test command");
            };
            assert_eq!(args.browser, Some(EngineArg::Mock));
            assert_eq!(args.workers, Some(4));
            assert_eq!(args.tags, ["nightly", "smoke"]);
            assert_eq!(args.reporter, Some(ReporterArg::Junit));
            assert!(!args.headed);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["pagekit", "list", "-vv", "--color", "never"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.color, ColorArg::Never);
            assert!(matches!(cli.command, Commands::List(_)));
        }

        #[test]
        fn test_subcommand_is_required() {
            assert!(Cli::try_parse_from(["pagekit"]).is_err());
        }

        #[test]
        fn test_unknown_engine_is_rejected() {
            assert!(Cli::try_parse_from(["pagekit", "test", "--browser", "webkit"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_argument_conversions() {
            assert_eq!(BrowserEngine::from(EngineArg::Mock), BrowserEngine::Mock);
            assert_eq!(ReporterKind::from(ReporterArg::Json), ReporterKind::Json);
            assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
        }
    }
}
