//! Modal dialogs as explicit state machines.
//!
//! ```text
//! Closed --open--> Opening --shown--> Open --close--> Closing --hidden--> Closed
//!                     |                                  |
//!                     +------- timeout (observed) -------+
//! ```
//!
//! Opening and Closing are bounded waits on the modal's root locator. When
//! the expected state is not reached in time the transition fails with
//! [`PageKitError::ModalTransition`] and the machine settles on whatever
//! the DOM shows. The resting states are re-read from the DOM before every
//! transition, so a dialog dismissed by a reload or a submit can be opened
//! again.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::{PageKitError, PageKitResult};
use crate::wait::{millis, WaitState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Lifecycle state of a modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalState {
    /// Not displayed
    #[default]
    Closed,
    /// Triggered, waiting to become visible
    Opening,
    /// Displayed
    Open,
    /// Dismissed, waiting to disappear
    Closing,
}

/// Input to the modal state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalEvent {
    /// The open trigger fired
    Open,
    /// The root became visible
    Shown,
    /// The close trigger fired
    Close,
    /// The root disappeared
    Hidden,
}

impl ModalState {
    /// Next state, or `None` when `event` is illegal in this state
    #[must_use]
    pub const fn next(self, event: ModalEvent) -> Option<Self> {
        match (self, event) {
            (Self::Closed, ModalEvent::Open) => Some(Self::Opening),
            (Self::Opening, ModalEvent::Shown) => Some(Self::Open),
            (Self::Opening | Self::Closing, ModalEvent::Hidden) => Some(Self::Closed),
            (Self::Open, ModalEvent::Close) => Some(Self::Closing),
            (Self::Closing, ModalEvent::Shown) => Some(Self::Open),
            _ => None,
        }
    }

    /// Whether the modal is mid-transition
    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// State name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A modal on a page
pub struct Modal {
    name: String,
    page: Page,
    root: Locator,
    open_trigger: Option<Locator>,
    close_trigger: Option<Locator>,
    timeout: Duration,
    state: Mutex<ModalState>,
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("name", &self.name)
            .field("root", &self.root.description())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Modal {
    /// Modal whose visibility is tracked through `root`
    #[must_use]
    pub fn new(name: impl Into<String>, page: &Page, root: Locator) -> Self {
        Self {
            name: name.into(),
            page: page.clone(),
            root,
            open_trigger: None,
            close_trigger: None,
            timeout: page.timeouts().expect,
            state: Mutex::new(ModalState::Closed),
        }
    }

    /// Locator clicked by [`Self::open`]
    #[must_use]
    pub fn opened_by(mut self, trigger: Locator) -> Self {
        self.open_trigger = Some(trigger);
        self
    }

    /// Locator clicked by [`Self::close`]; without one, Escape is pressed on the root
    #[must_use]
    pub fn closed_by(mut self, trigger: Locator) -> Self {
        self.close_trigger = Some(trigger);
        self
    }

    /// Bound for the Opening and Closing waits
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same modal definition over another page, starting Closed
    #[must_use]
    pub fn rebind(&self, page: &Page) -> Self {
        let relocate = |l: &Locator| page.locate(l.descriptor().clone());
        Self {
            name: self.name.clone(),
            page: page.clone(),
            root: relocate(&self.root),
            open_trigger: self.open_trigger.as_ref().map(relocate),
            close_trigger: self.close_trigger.as_ref().map(relocate),
            timeout: self.timeout,
            state: Mutex::new(ModalState::Closed),
        }
    }

    /// Modal name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root locator
    #[must_use]
    pub fn root(&self) -> &Locator {
        &self.root
    }

    /// Tracked state
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.state.lock().map_or(ModalState::Closed, |s| *s)
    }

    /// Whether the root is currently visible in the DOM
    ///
    /// # Errors
    ///
    /// [`PageKitError::AmbiguousLocator`] or engine errors.
    pub async fn is_open(&self) -> PageKitResult<bool> {
        self.root.is_visible().await
    }

    /// Click the open trigger and wait for the modal to show
    ///
    /// # Errors
    ///
    /// [`PageKitError::InvalidState`] unless the dialog is closed,
    /// [`PageKitError::ModalTransition`] when it never shows, or errors from
    /// clicking the trigger.
    pub async fn open(&self) -> PageKitResult<()> {
        let trigger = self.open_trigger.clone().ok_or_else(|| PageKitError::InvalidState {
            message: format!("modal '{}' has no open trigger", self.name),
        })?;
        self.open_with(|| async move { trigger.click().await }).await
    }

    /// Run `trigger` and wait for the modal to show
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub async fn open_with<F, Fut>(&self, trigger: F) -> PageKitResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PageKitResult<()>>,
    {
        self.sync().await;
        self.transition(ModalEvent::Open)?;
        info!(modal = %self.name, "opening");
        if let Err(e) = trigger().await {
            self.settle().await;
            return Err(e);
        }
        self.await_state(ModalState::Open, WaitState::Visible).await
    }

    /// Click the close trigger (or press Escape) and wait for the modal to disappear
    ///
    /// # Errors
    ///
    /// [`PageKitError::InvalidState`] unless the dialog is open,
    /// [`PageKitError::ModalTransition`] when it never disappears.
    pub async fn close(&self) -> PageKitResult<()> {
        match self.close_trigger.clone() {
            Some(trigger) => self.close_with(|| async move { trigger.click().await }).await,
            None => {
                let root = self.root.clone();
                self.close_with(|| async move { root.press("Escape").await })
                    .await
            }
        }
    }

    /// Run `trigger` and wait for the modal to disappear
    ///
    /// # Errors
    ///
    /// See [`Self::close`].
    pub async fn close_with<F, Fut>(&self, trigger: F) -> PageKitResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PageKitResult<()>>,
    {
        self.sync().await;
        self.transition(ModalEvent::Close)?;
        info!(modal = %self.name, "closing");
        if let Err(e) = trigger().await {
            self.settle().await;
            return Err(e);
        }
        self.await_state(ModalState::Closed, WaitState::Hidden).await
    }

    fn transition(&self, event: ModalEvent) -> PageKitResult<ModalState> {
        let mut state = self.state.lock().map_err(|_| PageKitError::InvalidState {
            message: format!("modal '{}' state lock poisoned", self.name),
        })?;
        let next = state.next(event).ok_or_else(|| PageKitError::InvalidState {
            message: format!("modal '{}' cannot handle {event:?} while {}", self.name, *state),
        })?;
        debug!(modal = %self.name, from = %*state, to = %next, "transition");
        *state = next;
        Ok(next)
    }

    fn set(&self, value: ModalState) {
        if let Ok(mut state) = self.state.lock() {
            *state = value;
        }
    }

    /// Re-read a resting state from the DOM; transitional states are left
    /// to the transition in flight
    async fn sync(&self) {
        let tracked = self.state();
        if tracked.is_transitional() {
            return;
        }
        let observed = self.settle().await;
        if observed != tracked {
            debug!(modal = %self.name, tracked = %tracked, observed = %observed, "resynced from DOM");
        }
    }

    /// Settle a transitional state on what the DOM shows
    async fn settle(&self) -> ModalState {
        let observed = match self.root.is_visible().await {
            Ok(true) => ModalState::Open,
            _ => ModalState::Closed,
        };
        self.set(observed);
        observed
    }

    async fn await_state(&self, target: ModalState, wait: WaitState) -> PageKitResult<()> {
        let started = Instant::now();
        match self.root.wait_for(wait, Some(self.timeout)).await {
            Ok(()) => {
                let event = if target == ModalState::Open {
                    ModalEvent::Shown
                } else {
                    ModalEvent::Hidden
                };
                self.transition(event)?;
                info!(modal = %self.name, state = %target, elapsed_ms = millis(started.elapsed()), "settled");
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                let actual = self.settle().await;
                Err(PageKitError::ModalTransition {
                    modal: self.name.clone(),
                    expected: target.to_string(),
                    actual: actual.to_string(),
                    elapsed_ms: millis(started.elapsed()),
                })
            }
            Err(e) => {
                self.settle().await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod state_machine_tests {
        use super::*;

        #[test]
        fn test_round_trip() {
            let mut state = ModalState::Closed;
            for event in [
                ModalEvent::Open,
                ModalEvent::Shown,
                ModalEvent::Close,
                ModalEvent::Hidden,
            ] {
                state = state.next(event).unwrap();
            }
            assert_eq!(state, ModalState::Closed);
        }

        #[test]
        fn test_illegal_events() {
            assert_eq!(ModalState::Closed.next(ModalEvent::Close), None);
            assert_eq!(ModalState::Open.next(ModalEvent::Open), None);
            assert_eq!(ModalState::Closed.next(ModalEvent::Shown), None);
        }

        #[test]
        fn test_failed_transitions_settle() {
            assert_eq!(ModalState::Opening.next(ModalEvent::Hidden), Some(ModalState::Closed));
            assert_eq!(ModalState::Closing.next(ModalEvent::Shown), Some(ModalState::Open));
            assert!(ModalState::Opening.is_transitional());
            assert!(!ModalState::Open.is_transitional());
        }
    }

    mod dom_tests {
        use super::*;
        use crate::driver::{BrowserDriver, ContextDriver};
        use crate::mock::{MockAction, MockBrowser, MockRoute, MockSite};
        use crate::page::PageSettings;
        use crate::selector::AriaRole;
        use crate::wait::Timeouts;
        use url::Url;

        async fn open_page() -> (MockBrowser, Page) {
            let site = MockSite::new().route(
                MockRoute::html(
                    "/my_classroom",
                    r#"<html><body>
                        <button id="support">Contact Support</button>
                        <button id="broken">Broken</button>
                        <div data-fragment="support" role="dialog">
                            <h2>Contact Support</h2>
                            <button class="send">Send</button>
                            <button class="close">Close</button>
                        </div>
                    </body></html>"#,
                )
                .on_click(".send", MockAction::Hide("support".into()))
                .on_click(
                    "#support",
                    MockAction::ShowAfter("support".into(), Duration::from_millis(20)),
                )
                .on_click(".close", MockAction::Hide("support".into())),
            );
            let browser = MockBrowser::new(site);
            let context = browser.new_context().await.unwrap();
            let settings = PageSettings::default()
                .with_base_url(Url::parse("https://lms.example.com/").unwrap())
                .with_timeouts(
                    Timeouts::default()
                        .with_expect(Duration::from_millis(150))
                        .with_action(Duration::from_millis(150))
                        .with_poll_interval(Duration::from_millis(10)),
                );
            let page = Page::new(context.new_page().await.unwrap(), settings);
            page.goto("/my_classroom").await.unwrap();
            (browser, page)
        }

        fn support(page: &Page) -> Modal {
            Modal::new("contact support", page, page.get_by_role(AriaRole::Dialog))
                .opened_by(page.locator("#support"))
                .closed_by(page.get_by_role(AriaRole::Dialog).get_by_text("Close"))
        }

        #[tokio::test]
        async fn test_open_close_open() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            modal.open().await.unwrap();
            assert_eq!(modal.state(), ModalState::Open);
            assert!(modal.is_open().await.unwrap());
            modal.close().await.unwrap();
            assert_eq!(modal.state(), ModalState::Closed);
            assert!(!modal.is_open().await.unwrap());
            modal.open().await.unwrap();
            assert_eq!(modal.state(), ModalState::Open);
        }

        #[tokio::test]
        async fn test_double_open_is_rejected() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            modal.open().await.unwrap();
            let err = modal.open().await.unwrap_err();
            assert!(matches!(err, PageKitError::InvalidState { .. }));
        }

        #[tokio::test]
        async fn test_open_that_never_shows_fails_with_transition_error() {
            let (_browser, page) = open_page().await;
            let modal = Modal::new("contact support", &page, page.get_by_role(AriaRole::Dialog))
                .opened_by(page.locator("#broken"))
                .with_timeout(Duration::from_millis(50));
            let err = modal.open().await.unwrap_err();
            match err {
                PageKitError::ModalTransition {
                    modal, expected, actual, ..
                } => {
                    assert_eq!(modal, "contact support");
                    assert_eq!(expected, "open");
                    assert_eq!(actual, "closed");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(modal.state(), ModalState::Closed);
        }

        #[tokio::test]
        async fn test_reopens_after_reload_dismissed_it() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            modal.open().await.unwrap();
            page.goto("/my_classroom").await.unwrap();
            assert!(!modal.is_open().await.unwrap());
            assert_eq!(modal.state(), ModalState::Open);

            modal.open().await.unwrap();
            assert_eq!(modal.state(), ModalState::Open);
            modal.close().await.unwrap();
            assert_eq!(modal.state(), ModalState::Closed);
        }

        #[tokio::test]
        async fn test_reopens_after_in_dialog_submit_closed_it() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            modal.open().await.unwrap();
            page.locator(".send").click().await.unwrap();
            modal.open().await.unwrap();
            assert!(modal.is_open().await.unwrap());
        }

        #[tokio::test]
        async fn test_close_after_outside_dismissal_is_rejected() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            modal.open().await.unwrap();
            page.goto("/my_classroom").await.unwrap();
            assert!(matches!(
                modal.close().await.unwrap_err(),
                PageKitError::InvalidState { .. }
            ));
            assert_eq!(modal.state(), ModalState::Closed);
        }

        #[tokio::test]
        async fn test_close_without_trigger_when_closed_is_rejected() {
            let (_browser, page) = open_page().await;
            let modal = support(&page);
            assert!(matches!(
                modal.close().await.unwrap_err(),
                PageKitError::InvalidState { .. }
            ));
        }
    }
}
