//! PageKit: page-object end-to-end testing for server-rendered web apps.
//!
//! A test suite is built from four layers:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Scenario catalogue ──► SuiteRunner ──► SuiteReport (list/json/xml)│
//! │        │                   │                                      │
//! │        ▼                   ▼                                      │
//! │  FixtureGraph ──► Session / PageObject / Modal ──► Locator        │
//! │                                           │                       │
//! │                                           ▼                       │
//! │                   BrowserDriver (chromium over CDP | mock engine) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locators are declarative [`LocatorDescriptor`]s resolved lazily on every
//! action, so a page object never holds an element that could go stale.
//! The in-memory [`mock`] engine serves static HTML and resolves descriptors
//! with the same rules as the chromium driver, which keeps the whole stack
//! testable without a browser.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod artifacts;
pub mod auth;
#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod driver;
pub mod fixture;
pub mod harness;
pub mod locator;
pub mod logging;
#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
pub mod mock;
pub mod modal;
pub mod page;
pub mod page_object;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod selector;
pub mod session;
pub mod trace;
pub mod wait;

pub use artifacts::{ArtifactConfig, RecordingBrowser, ScreenshotPolicy, TracePolicy};
pub use auth::{AuthState, CredentialStore, Credentials, LoginForm, LoginLocators, Role};
#[cfg(feature = "browser")]
pub use browser::ChromiumBrowser;
pub use config::{SuiteConfig, TimeoutConfig, Viewport};
pub use driver::{
    BrowserDriver, BrowserEngine, ContextDriver, DriverConfig, ElementAction, ElementInfo,
    PageDriver, PopupListener,
};
pub use fixture::{FixtureDeps, FixtureGraph, FixtureGraphBuilder, FixtureKind, FixtureScope};
pub use harness::{Scenario, ScenarioCatalogue, ScenarioFilter};
pub use locator::Locator;
pub use logging::LogFormat;
pub use modal::{Modal, ModalEvent, ModalState};
pub use page::{Page, PageSettings};
pub use page_object::{PageObject, SectionCheck, UrlPattern};
pub use reporter::{ReportSummary, ReporterKind, SuiteReport, TestOutcome, TestStatus};
pub use result::{PageKitError, PageKitResult};
pub use runner::{RunObserver, RunnerOptions, SuiteRunner};
pub use selector::{AriaRole, Filter, LocatorDescriptor, Pick, Step, Strategy, TextMatch};
pub use session::{LoginProcedure, Session, SessionLedger, SessionLease};
pub use trace::{ExecutionTrace, TraceArchive, TraceEvent, TraceEventKind};
pub use wait::{LoadState, Timeouts, WaitState};

/// Launch the driver `config` names
///
/// The mock engine needs a site and cannot be launched from configuration
/// alone; pass it to [`mock::MockBrowser`] directly.
///
/// # Errors
///
/// [`PageKitError::ConfigError`] for the mock engine, or for chromium when
/// the crate was built without the `browser` feature.
pub fn launch_browser(config: &SuiteConfig) -> PageKitResult<std::sync::Arc<dyn BrowserDriver>> {
    match config.browser {
        #[cfg(feature = "browser")]
        BrowserEngine::Chromium => Ok(std::sync::Arc::new(ChromiumBrowser::new(
            config.driver_config(),
        ))),
        #[cfg(not(feature = "browser"))]
        BrowserEngine::Chromium => Err(PageKitError::ConfigError {
            message: "chromium support requires the `browser` feature".to_string(),
        }),
        BrowserEngine::Mock => Err(PageKitError::ConfigError {
            message: "the mock engine is built from a site, not from configuration".to_string(),
        }),
    }
}

/// Everything a suite usually imports
pub mod prelude {
    pub use crate::auth::{CredentialStore, Credentials, Role};
    pub use crate::driver::{BrowserDriver, BrowserEngine, ElementInfo};
    pub use crate::fixture::{FixtureDeps, FixtureGraph, FixtureScope};
    pub use crate::harness::{Scenario, ScenarioCatalogue, ScenarioFilter};
    pub use crate::locator::Locator;
    pub use crate::modal::{Modal, ModalState};
    pub use crate::page::Page;
    pub use crate::page_object::{PageObject, UrlPattern};
    pub use crate::result::{PageKitError, PageKitResult};
    pub use crate::selector::{AriaRole, LocatorDescriptor, TextMatch};
    pub use crate::session::{Session, SessionLedger};
    pub use crate::wait::LoadState;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_engine_is_not_launchable_from_config() {
        let config = SuiteConfig {
            browser: BrowserEngine::Mock,
            ..SuiteConfig::default()
        };
        assert!(matches!(
            launch_browser(&config),
            Err(PageKitError::ConfigError { .. })
        ));
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_chromium_needs_browser_feature() {
        let err = launch_browser(&SuiteConfig::default()).unwrap_err();
        assert!(err.to_string().contains("`browser` feature"));
    }
}
