//! Error types for the CLI

use pagekit::PageKitError;
use std::process::ExitCode;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// At least one scenario failed
    #[error("Test run failed: {message}")]
    TestFailures {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PageKit library error
    #[error("PageKit error: {0}")]
    PageKit(#[from] PageKitError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a test failure error
    #[must_use]
    pub fn test_failures(message: impl Into<String>) -> Self {
        Self::TestFailures {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code: 1 when scenarios failed, 2 for everything that
    /// kept the run from happening
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::TestFailures { .. } => ExitCode::from(1),
            _ => ExitCode::from(2),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_test_failures_error() {
        let err = CliError::test_failures("2 scenario(s) failed");
        assert!(err.to_string().contains("Test run failed"));
        assert_eq!(err.exit_code(), ExitCode::from(1));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad arg");
        assert!(err.to_string().contains("Invalid argument"));
        assert_eq!(err.exit_code(), ExitCode::from(2));
    }

    #[test]
    fn test_pagekit_error_from() {
        let err: CliError = PageKitError::ConfigError {
            message: "workers must be at least 1".to_string(),
        }
        .into();
        assert!(err.to_string().contains("workers"));
        assert_eq!(err.exit_code(), ExitCode::from(2));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
