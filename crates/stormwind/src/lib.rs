//! End-to-end suite for the Stormwind LMS.
//!
//! Page objects for the admin (team manager) and student screens, the fixture
//! graph that signs each role in once per test, the scenario catalogue, and
//! an offline [`replica`] of the site for the in-memory engine.
//!
//! ```no_run
//! # async fn demo() -> pagekit::PageKitResult<()> {
//! use pagekit::prelude::*;
//! use pagekit::SuiteConfig;
//! use std::sync::Arc;
//!
//! let config = stormwind::suite::replica_config(&SuiteConfig::default());
//! let runner = stormwind::suite::runner(&config, Arc::new(stormwind::replica::browser()))?;
//! let report = runner
//!     .run(&stormwind::suite::catalogue(), &ScenarioFilter::all())
//!     .await?;
//! println!("{} passed", report.summary().passed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod admin;
pub mod fixtures;
pub mod login;
pub mod replica;
pub mod scenarios;
pub mod student;
pub mod suite;
pub mod urls;

pub use suite::{catalogue, runner, runner_with_options, SUITE_NAME};
