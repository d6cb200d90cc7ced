//! Wait primitives.
//!
//! Every suspension point in pagekit goes through [`poll_until`]: the check
//! runs immediately, then on a fixed interval until it yields a value or the
//! deadline passes. There is no retry beyond the deadline; callers turn
//! [`WaitOutcome::TimedOut`] into a [`crate::PageKitError::Timeout`] carrying
//! what they were waiting for.

use crate::result::PageKitResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for `expect`-style assertions (5 seconds)
pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for element actions (5 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for navigation and load states (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for a whole test (60 seconds)
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 60_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page readiness levels, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// `DOMContentLoaded` fired: the document is parsed
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    /// `load` fired: subresources are loaded
    Load,
    /// No network activity for [`NETWORK_IDLE_THRESHOLD_MS`]
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

impl LoadState {
    /// Name used in logs and error messages
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::DomContentLoaded => "domcontentloaded",
            Self::Load => "load",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Whether reaching `self` implies `other` was reached
    #[must_use]
    pub fn satisfies(&self, other: Self) -> bool {
        *self >= other
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Load
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

// =============================================================================
// ELEMENT WAIT STATE
// =============================================================================

/// Target state of a locator wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitState {
    /// Attached and visible
    Visible,
    /// Detached, or attached but not visible
    Hidden,
    /// Present in the DOM
    Attached,
    /// Not present in the DOM
    Detached,
}

impl WaitState {
    /// Whether an observed match set satisfies this state.
    ///
    /// `visible` lists the visibility of every matched element.
    #[must_use]
    pub fn is_satisfied_by(&self, visible: &[bool]) -> bool {
        match self {
            Self::Visible => visible.iter().any(|v| *v),
            Self::Hidden => visible.iter().all(|v| !*v),
            Self::Attached => !visible.is_empty(),
            Self::Detached => visible.is_empty(),
        }
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Attached => "attached",
            Self::Detached => "detached",
        })
    }
}

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeout budget shared by a page and every locator created from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Assertions (`assert_visible`, `assert_text_contains`, ...)
    pub expect: Duration,
    /// Element actions (`click`, `fill`, ...)
    pub action: Duration,
    /// Navigation and load states
    pub navigation: Duration,
    /// Poll interval
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            expect: Duration::from_millis(DEFAULT_EXPECT_TIMEOUT_MS),
            action: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            navigation: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl Timeouts {
    /// Set the assertion timeout
    #[must_use]
    pub const fn with_expect(mut self, timeout: Duration) -> Self {
        self.expect = timeout;
        self
    }

    /// Set the action timeout
    #[must_use]
    pub const fn with_action(mut self, timeout: Duration) -> Self {
        self.action = timeout;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation(mut self, timeout: Duration) -> Self {
        self.navigation = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Result of [`poll_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    /// The check produced a value
    Ready {
        /// Produced value
        value: T,
        /// Time until it was produced
        elapsed: Duration,
    },
    /// The deadline passed first
    TimedOut {
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl<T> WaitOutcome<T> {
    /// The value, if the wait succeeded
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::TimedOut { .. } => None,
        }
    }

    /// Time spent waiting
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Ready { elapsed, .. } | Self::TimedOut { elapsed } => *elapsed,
        }
    }
}

/// Convert a duration to whole milliseconds for error messages
#[must_use]
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Poll `check` until it returns `Some`, the deadline passes, or it errors.
///
/// The check always runs at least once, and once more at the deadline, so a
/// zero timeout still observes the current state. Errors from the check abort
/// the wait immediately.
///
/// # Errors
///
/// Propagates the first error returned by `check`.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> PageKitResult<WaitOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PageKitResult<Option<T>>>,
{
    let start = Instant::now();
    let interval = interval.max(Duration::from_millis(1));
    loop {
        if let Some(value) = check().await? {
            return Ok(WaitOutcome::Ready {
                value,
                elapsed: start.elapsed(),
            });
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut { elapsed });
        }
        tokio::time::sleep(interval.min(timeout - elapsed)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::PageKitError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    mod load_state_tests {
        use super::*;

        #[test]
        fn test_ordering_reflects_strength() {
            assert!(LoadState::NetworkIdle.satisfies(LoadState::Load));
            assert!(LoadState::Load.satisfies(LoadState::DomContentLoaded));
            assert!(!LoadState::DomContentLoaded.satisfies(LoadState::Load));
        }

        #[test]
        fn test_serde_names() {
            let json = serde_json::to_string(&LoadState::DomContentLoaded).unwrap();
            assert_eq!(json, "\"domcontentloaded\"");
            let parsed: LoadState = serde_json::from_str("\"networkidle\"").unwrap();
            assert_eq!(parsed, LoadState::NetworkIdle);
            assert_eq!(LoadState::default(), LoadState::Load);
        }
    }

    mod wait_state_tests {
        use super::*;

        #[test]
        fn test_satisfaction() {
            assert!(WaitState::Visible.is_satisfied_by(&[false, true]));
            assert!(!WaitState::Visible.is_satisfied_by(&[]));
            assert!(WaitState::Hidden.is_satisfied_by(&[]));
            assert!(WaitState::Hidden.is_satisfied_by(&[false]));
            assert!(!WaitState::Hidden.is_satisfied_by(&[true]));
            assert!(WaitState::Attached.is_satisfied_by(&[false]));
            assert!(WaitState::Detached.is_satisfied_by(&[]));
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_ready_after_a_few_checks() {
            let calls = Arc::new(AtomicU32::new(0));
            let c = calls.clone();
            let outcome = poll_until(Duration::from_secs(1), Duration::from_millis(5), move || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Ok(if n >= 2 { Some(n) } else { None })
                }
            })
            .await
            .unwrap();
            assert_eq!(outcome.ready(), Some(2));
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn test_times_out() {
            let outcome = poll_until(Duration::from_millis(30), Duration::from_millis(5), || async {
                Ok::<Option<()>, PageKitError>(None)
            })
            .await
            .unwrap();
            assert!(matches!(outcome, WaitOutcome::TimedOut { .. }));
            assert!(outcome.elapsed() >= Duration::from_millis(30));
        }

        #[tokio::test]
        async fn test_zero_timeout_still_checks_once() {
            let outcome = poll_until(Duration::ZERO, Duration::from_millis(5), || async {
                Ok::<_, PageKitError>(Some(7))
            })
            .await
            .unwrap();
            assert_eq!(outcome.ready(), Some(7));
        }

        #[tokio::test]
        async fn test_check_error_aborts() {
            let result = poll_until(Duration::from_secs(5), Duration::from_millis(5), || async {
                Err::<Option<()>, _>(PageKitError::PageClosed {
                    page: "p1".into(),
                })
            })
            .await;
            assert!(matches!(result, Err(PageKitError::PageClosed { .. })));
        }
    }
}
