//! PageKit CLI library
//!
//! Command definitions, configuration layering and the command handlers
//! behind the `pagekit` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, EngineArg, FixturesArgs, ListArgs, LogFormatArg,
    ReporterArg, TestArgs,
};
pub use config::{
    apply_test_args, config_path, finish, load_suite_config, CliConfig, ColorChoice, Verbosity,
};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{report_path, TestRunner};
