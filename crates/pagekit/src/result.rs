//! Result and error types for pagekit.

use thiserror::Error;

/// Result type for pagekit operations
pub type PageKitResult<T> = Result<T, PageKitError>;

/// Errors that can occur while driving a page under test
#[derive(Debug, Error)]
pub enum PageKitError {
    /// No element matched a locator that needed one
    #[error("No element matches {description} (waited {waited_ms}ms)")]
    LocatorNotFound {
        /// Human-readable locator description
        description: String,
        /// How long resolution was retried
        waited_ms: u64,
    },

    /// Several elements matched where exactly one was required
    #[error("Ambiguous locator {description}: resolved to {count} elements, add first()/nth()/last() or a narrower filter")]
    AmbiguousLocator {
        /// Human-readable locator description
        description: String,
        /// Number of elements matched
        count: usize,
    },

    /// A locator descriptor failed static validation
    #[error("Invalid locator {description}: {message}")]
    InvalidLocator {
        /// Human-readable locator description
        description: String,
        /// What is wrong with it
        message: String,
    },

    /// A wait did not reach its target state in time
    #[error("Timed out after {elapsed_ms}ms: {operation} (expected {expected})")]
    Timeout {
        /// The operation that was waiting
        operation: String,
        /// The state that was expected
        expected: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message, carrying expected and actual values
        message: String,
    },

    /// The login flow never reached the password step or was rejected
    #[error("Authentication failed for {role}: {message}")]
    AuthenticationFailed {
        /// Role whose credentials were used
        role: String,
        /// Error message
        message: String,
    },

    /// The fixture graph contains a dependency cycle
    #[error("Fixture dependency cycle: {}", cycle.join(" -> "))]
    FixtureCycle {
        /// Fixture names along the cycle, first name repeated at the end
        cycle: Vec<String>,
    },

    /// A fixture name is not part of the graph
    #[error("Unknown fixture '{name}' required by '{required_by}'")]
    UnknownFixture {
        /// Missing fixture name
        name: String,
        /// Fixture or scenario that asked for it
        required_by: String,
    },

    /// Fixture error (construction/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Operation on a page that was already closed
    #[error("Page {page} is closed")]
    PageClosed {
        /// Page identifier
        page: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// A modal did not reach the state its transition required
    #[error("Modal '{modal}' expected {expected} but was {actual} after {elapsed_ms}ms")]
    ModalTransition {
        /// Modal name
        modal: String,
        /// Expected state
        expected: String,
        /// Observed state
        actual: String,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PageKitError {
    /// Whether this error comes from locator resolution
    #[must_use]
    pub const fn is_locator_failure(&self) -> bool {
        matches!(
            self,
            Self::LocatorNotFound { .. } | Self::AmbiguousLocator { .. } | Self::InvalidLocator { .. }
        )
    }

    /// Whether this error is a timeout of any kind
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ModalTransition { .. })
    }

    /// Stable category name used in reports
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::LocatorNotFound { .. }
            | Self::AmbiguousLocator { .. }
            | Self::InvalidLocator { .. } => "locator",
            Self::Timeout { .. } | Self::ModalTransition { .. } => "timeout",
            Self::AssertionFailed { .. } => "assertion",
            Self::AuthenticationFailed { .. } => "authentication",
            Self::FixtureCycle { .. } | Self::UnknownFixture { .. } | Self::FixtureError { .. } => {
                "fixture"
            }
            Self::NavigationError { .. }
            | Self::PageError { .. }
            | Self::PageClosed { .. }
            | Self::BrowserLaunchError { .. } => "browser",
            Self::InvalidState { .. } => "state",
            Self::ConfigError { .. } | Self::Yaml(_) => "config",
            Self::Io(_) | Self::Json(_) => "io",
        }
    }

    /// Build an assertion failure from expected/actual values
    #[must_use]
    pub fn assertion(subject: &str, expected: &str, actual: &str) -> Self {
        Self::AssertionFailed {
            message: format!("{subject}: expected {expected}, but {actual}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = PageKitError::FixtureCycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Fixture dependency cycle: a -> b -> a");
        assert_eq!(err.category(), "fixture");
    }

    #[test]
    fn test_locator_failures_are_classified() {
        let err = PageKitError::LocatorNotFound {
            description: "get_by_role(button, name=\"Enter\")".into(),
            waited_ms: 5000,
        };
        assert!(err.is_locator_failure());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("get_by_role(button"));
    }

    #[test]
    fn test_timeout_carries_operation_and_elapsed() {
        let err = PageKitError::Timeout {
            operation: "wait for locator(\".modal\")".into(),
            expected: "visible".into(),
            elapsed_ms: 5003,
        };
        let text = err.to_string();
        assert!(text.contains("5003ms"));
        assert!(text.contains("expected visible"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_assertion_helper() {
        let err = PageKitError::assertion("text of h5#modalLabel", "'Intro'", "got 'Outro'");
        assert_eq!(
            err.to_string(),
            "Assertion failed: text of h5#modalLabel: expected 'Intro', but got 'Outro'"
        );
    }

    #[test]
    fn test_io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PageKitError = io.into();
        assert_eq!(err.category(), "io");
    }
}
