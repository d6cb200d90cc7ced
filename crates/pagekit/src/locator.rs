//! Lazy element handles.
//!
//! A [`Locator`] pairs a [`LocatorDescriptor`] with the page it was created
//! from. Creating one does nothing; every query or action re-resolves the
//! descriptor against the current DOM. Actions are strict: they need exactly
//! one match, and more than one is an [`PageKitError::AmbiguousLocator`]
//! defect, never silently narrowed to the first.

use crate::driver::{ElementAction, ElementInfo, PageDriver};
use crate::result::{PageKitError, PageKitResult};
use crate::selector::{AriaRole, Filter, LocatorDescriptor, TextMatch};
use crate::wait::{millis, poll_until, Timeouts, WaitOutcome, WaitState};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Element handle bound to one page
#[derive(Clone)]
pub struct Locator {
    driver: Arc<dyn PageDriver>,
    descriptor: LocatorDescriptor,
    timeouts: Timeouts,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("page", &self.driver.id())
            .field("descriptor", &self.descriptor.to_string())
            .finish()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

impl Locator {
    pub(crate) fn new(
        driver: Arc<dyn PageDriver>,
        descriptor: LocatorDescriptor,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            driver,
            descriptor,
            timeouts,
        }
    }

    fn derive(&self, descriptor: LocatorDescriptor) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            descriptor,
            timeouts: self.timeouts,
        }
    }

    /// The underlying descriptor
    #[must_use]
    pub const fn descriptor(&self) -> &LocatorDescriptor {
        &self.descriptor
    }

    /// Human-readable description used in errors
    #[must_use]
    pub fn description(&self) -> String {
        self.descriptor.to_string()
    }

    /// Override the timeouts of this handle
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Timeouts this handle waits with
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    // =========================================================================
    // REFINEMENT
    // =========================================================================

    /// Descendants matching a CSS selector
    #[must_use]
    pub fn locator(&self, css: &str) -> Self {
        self.scoped(LocatorDescriptor::css(css))
    }

    /// Descendants with a role
    #[must_use]
    pub fn get_by_role(&self, role: AriaRole) -> Self {
        self.scoped(LocatorDescriptor::role(role))
    }

    /// Innermost descendants whose text matches
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<TextMatch>) -> Self {
        self.scoped(LocatorDescriptor::text(text))
    }

    /// Descendant inputs by placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<TextMatch>) -> Self {
        self.scoped(LocatorDescriptor::placeholder(text))
    }

    /// Descendant controls by label
    #[must_use]
    pub fn get_by_label(&self, text: impl Into<TextMatch>) -> Self {
        self.scoped(LocatorDescriptor::label(text))
    }

    /// Descendants by `data-testid`
    #[must_use]
    pub fn get_by_test_id(&self, id: &str) -> Self {
        self.scoped(LocatorDescriptor::test_id(id))
    }

    /// Descendants matching an arbitrary descriptor
    #[must_use]
    pub fn scoped(&self, inner: LocatorDescriptor) -> Self {
        self.derive(self.descriptor.clone().child(inner))
    }

    /// Accessible name for role locators, text filter otherwise
    #[must_use]
    pub fn named(&self, name: impl Into<TextMatch>) -> Self {
        self.derive(self.descriptor.clone().named(name))
    }

    /// Add a filter
    #[must_use]
    pub fn filter(&self, filter: Filter) -> Self {
        self.derive(self.descriptor.clone().filter(filter))
    }

    /// Keep matches whose text matches
    #[must_use]
    pub fn has_text(&self, text: impl Into<TextMatch>) -> Self {
        self.derive(self.descriptor.clone().has_text(text))
    }

    /// Keep matches whose text does not match
    #[must_use]
    pub fn has_not_text(&self, text: impl Into<TextMatch>) -> Self {
        self.derive(self.descriptor.clone().has_not_text(text))
    }

    /// Keep matches containing `inner`
    #[must_use]
    pub fn has(&self, inner: &Self) -> Self {
        self.derive(self.descriptor.clone().has(inner.descriptor.clone()))
    }

    /// Keep matches not containing `inner`
    #[must_use]
    pub fn has_not(&self, inner: &Self) -> Self {
        self.derive(self.descriptor.clone().has_not(inner.descriptor.clone()))
    }

    /// Keep visible (or hidden) matches
    #[must_use]
    pub fn visible(&self, visible: bool) -> Self {
        self.derive(self.descriptor.clone().visible(visible))
    }

    /// First match
    #[must_use]
    pub fn first(&self) -> Self {
        self.derive(self.descriptor.clone().first())
    }

    /// Last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.derive(self.descriptor.clone().last())
    }

    /// Zero-based match
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.derive(self.descriptor.clone().nth(index))
    }

    /// Union with another locator on the same page
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        self.derive(self.descriptor.clone().or(other.descriptor.clone()))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Every current match, in document order
    ///
    /// # Errors
    ///
    /// Returns an error for invalid descriptors or a closed page.
    pub async fn all(&self) -> PageKitResult<Vec<ElementInfo>> {
        self.descriptor.validate()?;
        self.driver.query(&self.descriptor).await
    }

    /// Number of current matches
    ///
    /// # Errors
    ///
    /// Returns an error for invalid descriptors or a closed page.
    pub async fn count(&self) -> PageKitResult<usize> {
        Ok(self.all().await?.len())
    }

    /// Text of every current match
    ///
    /// # Errors
    ///
    /// Returns an error for invalid descriptors or a closed page.
    pub async fn all_text_contents(&self) -> PageKitResult<Vec<String>> {
        Ok(self.all().await?.into_iter().map(|e| e.text).collect())
    }

    /// Whether the single match is visible right now. No match is not visible.
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::AmbiguousLocator`] for several matches.
    pub async fn is_visible(&self) -> PageKitResult<bool> {
        let found = self.all().await?;
        match found.as_slice() {
            [] => Ok(false),
            [only] => Ok(only.visible),
            many => Err(self.ambiguous(many.len())),
        }
    }

    /// Negation of [`Self::is_visible`]
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::AmbiguousLocator`] for several matches.
    pub async fn is_hidden(&self) -> PageKitResult<bool> {
        Ok(!self.is_visible().await?)
    }

    /// Checked state of the single match
    ///
    /// # Errors
    ///
    /// Fails if the element is not a checkbox or radio.
    pub async fn is_checked(&self) -> PageKitResult<bool> {
        let info = self.resolve_one("read checked state of", false).await?;
        info.checked.ok_or_else(|| PageKitError::PageError {
            message: format!("{} is not a checkbox or radio", self.descriptor),
        })
    }

    /// Text content of the single match
    ///
    /// # Errors
    ///
    /// Fails if nothing (or more than one element) matches in time.
    pub async fn text_content(&self) -> PageKitResult<String> {
        Ok(self.resolve_one("read text of", false).await?.text)
    }

    /// Value of the single matching form control
    ///
    /// # Errors
    ///
    /// Fails if the element is not a form control.
    pub async fn input_value(&self) -> PageKitResult<String> {
        let info = self.resolve_one("read value of", false).await?;
        info.value.ok_or_else(|| PageKitError::PageError {
            message: format!("{} is not an input, textarea or select", self.descriptor),
        })
    }

    /// Attribute of the single match
    ///
    /// # Errors
    ///
    /// Fails if nothing (or more than one element) matches in time.
    pub async fn get_attribute(&self, name: &str) -> PageKitResult<Option<String>> {
        let info = self.resolve_one("read attribute of", false).await?;
        Ok(info.attribute(name).map(ToString::to_string))
    }

    /// Wait until the match set reaches `state`.
    ///
    /// Uses the expect timeout when `timeout` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::Timeout`] carrying the description and elapsed
    /// time, or [`PageKitError::AmbiguousLocator`] for several matches.
    pub async fn wait_for(&self, state: WaitState, timeout: Option<Duration>) -> PageKitResult<()> {
        self.descriptor.validate()?;
        let timeout = timeout.unwrap_or(self.timeouts.expect);
        let driver = &self.driver;
        let descriptor = &self.descriptor;
        let outcome = poll_until(timeout, self.timeouts.poll_interval, move || async move {
            let found = driver.query(descriptor).await?;
            if found.len() > 1 {
                return Err(PageKitError::AmbiguousLocator {
                    description: descriptor.to_string(),
                    count: found.len(),
                });
            }
            let visible: Vec<bool> = found.iter().map(|e| e.visible).collect();
            Ok(state.is_satisfied_by(&visible).then_some(()))
        })
        .await?;
        match outcome {
            WaitOutcome::Ready { elapsed, .. } => {
                debug!(locator = %self.descriptor, state = %state, elapsed_ms = millis(elapsed), "wait satisfied");
                Ok(())
            }
            WaitOutcome::TimedOut { elapsed } => Err(PageKitError::Timeout {
                operation: format!("wait for {}", self.descriptor),
                expected: state.to_string(),
                elapsed_ms: millis(elapsed),
            }),
        }
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click the single visible match
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn click(&self) -> PageKitResult<()> {
        self.act(ElementAction::Click).await
    }

    /// Replace the value of the single visible match
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors (including non-editable targets).
    pub async fn fill(&self, value: &str) -> PageKitResult<()> {
        self.act(ElementAction::Fill {
            value: value.to_string(),
        })
        .await
    }

    /// Empty the single visible match
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn clear(&self) -> PageKitResult<()> {
        self.act(ElementAction::Clear).await
    }

    /// Press a key on the single visible match
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn press(&self, key: &str) -> PageKitResult<()> {
        self.act(ElementAction::Press {
            key: key.to_string(),
        })
        .await
    }

    /// Check a checkbox
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn check(&self) -> PageKitResult<()> {
        self.act(ElementAction::SetChecked { checked: true }).await
    }

    /// Uncheck a checkbox
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn uncheck(&self) -> PageKitResult<()> {
        self.act(ElementAction::SetChecked { checked: false }).await
    }

    /// Select an option by value or label
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn select_option(&self, value: &str) -> PageKitResult<()> {
        self.act(ElementAction::SelectOption {
            value: value.to_string(),
        })
        .await
    }

    /// Scroll the single visible match into view
    ///
    /// # Errors
    ///
    /// Locator, timeout or engine errors.
    pub async fn scroll_into_view(&self) -> PageKitResult<()> {
        self.act(ElementAction::ScrollIntoView).await
    }

    async fn act(&self, action: ElementAction) -> PageKitResult<()> {
        let _ = self.resolve_one(action.verb(), true).await?;
        debug!(locator = %self.descriptor, action = action.verb(), "perform");
        self.driver.perform(&self.descriptor, 0, &action).await
    }

    /// Wait for exactly one match (visible if `require_visible`) within the
    /// action timeout.
    async fn resolve_one(&self, operation: &str, require_visible: bool) -> PageKitResult<ElementInfo> {
        self.descriptor.validate()?;
        let driver = &self.driver;
        let descriptor = &self.descriptor;
        let seen = AtomicBool::new(false);
        let seen = &seen;
        let outcome = poll_until(self.timeouts.action, self.timeouts.poll_interval, move || async move {
            let mut found = driver.query(descriptor).await?;
            match found.len() {
                0 => Ok(None),
                1 => {
                    seen.store(true, Ordering::SeqCst);
                    let info = found.remove(0);
                    Ok((info.visible || !require_visible).then_some(info))
                }
                count => Err(PageKitError::AmbiguousLocator {
                    description: descriptor.to_string(),
                    count,
                }),
            }
        })
        .await?;
        match outcome {
            WaitOutcome::Ready { value, .. } => Ok(value),
            WaitOutcome::TimedOut { elapsed } if !seen.load(Ordering::SeqCst) => {
                Err(PageKitError::LocatorNotFound {
                    description: self.descriptor.to_string(),
                    waited_ms: millis(elapsed),
                })
            }
            WaitOutcome::TimedOut { elapsed } => Err(PageKitError::Timeout {
                operation: format!("{operation} {}", self.descriptor),
                expected: "visible".to_string(),
                elapsed_ms: millis(elapsed),
            }),
        }
    }

    fn ambiguous(&self, count: usize) -> PageKitError {
        PageKitError::AmbiguousLocator {
            description: self.descriptor.to_string(),
            count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{BrowserDriver, ContextDriver};
    use crate::mock::{MockAction, MockBrowser, MockRoute, MockSite};

    const HTML: &str = r#"<html><body>
        <ul class="cards">
          <li class="card"><span class="title">Computer Hardware Support</span></li>
          <li class="card"><span class="title">Network Basics</span></li>
        </ul>
        <input id="search" placeholder="Search for a skills assessment">
        <button id="reveal">Reveal</button>
        <p data-fragment="late">Loaded late</p>
        <p style="display:none" id="ghost">Ghost</p>
        <input type="checkbox" id="pick">
    </body></html>"#;

    async fn locator(descriptor: LocatorDescriptor) -> (MockBrowser, Locator) {
        let site = MockSite::new().route(
            MockRoute::html("/", HTML)
                .on_click("#reveal", MockAction::ShowAfter("late".into(), Duration::from_millis(30))),
        );
        let browser = MockBrowser::new(site);
        let context = browser.new_context().await.unwrap();
        let page = context.new_page().await.unwrap();
        page.goto("https://lms.example.com/").await.unwrap();
        let timeouts = Timeouts::default()
            .with_action(Duration::from_millis(150))
            .with_expect(Duration::from_millis(150))
            .with_poll_interval(Duration::from_millis(10));
        (browser, Locator::new(page, descriptor, timeouts))
    }

    mod strictness_tests {
        use super::*;

        #[tokio::test]
        async fn test_ambiguous_action_fails_immediately() {
            let (_browser, cards) = locator(LocatorDescriptor::css("li.card")).await;
            let err = cards.click().await.unwrap_err();
            assert!(matches!(err, PageKitError::AmbiguousLocator { count: 2, .. }));
            assert_eq!(cards.count().await.unwrap(), 2);
            assert!(cards.first().click().await.is_ok());
        }

        #[tokio::test]
        async fn test_missing_element_is_locator_not_found() {
            let (_browser, missing) = locator(LocatorDescriptor::css("#nope")).await;
            let err = missing.click().await.unwrap_err();
            match err {
                PageKitError::LocatorNotFound {
                    description,
                    waited_ms,
                } => {
                    assert_eq!(description, "locator(\"#nope\")");
                    assert!(waited_ms >= 150);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_hidden_element_times_out() {
            let (_browser, ghost) = locator(LocatorDescriptor::css("#ghost")).await;
            let err = ghost.click().await.unwrap_err();
            assert!(matches!(err, PageKitError::Timeout { .. }));
            assert_eq!(ghost.text_content().await.unwrap(), "Ghost");
        }

        #[tokio::test]
        async fn test_invalid_descriptor_fails_before_querying() {
            let (_browser, bad) = locator(LocatorDescriptor::css("li[")).await;
            assert!(matches!(
                bad.count().await.unwrap_err(),
                PageKitError::InvalidLocator { .. }
            ));
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_scoped_queries_and_text() {
            let (_browser, cards) = locator(LocatorDescriptor::css("ul.cards")).await;
            let titles = cards.locator(".title");
            assert_eq!(
                titles.all_text_contents().await.unwrap(),
                vec!["Computer Hardware Support", "Network Basics"]
            );
            let hardware = cards.locator("li.card").has_text("hardware");
            assert_eq!(hardware.count().await.unwrap(), 1);
            assert!(hardware.is_visible().await.unwrap());
        }

        #[tokio::test]
        async fn test_fill_and_read_value() {
            let (_browser, search) = locator(LocatorDescriptor::placeholder("Search for a skills assessment")).await;
            search.fill("Computer Hardware Support").await.unwrap();
            assert_eq!(search.input_value().await.unwrap(), "Computer Hardware Support");
            search.clear().await.unwrap();
            assert_eq!(search.input_value().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_checkbox_round_trip() {
            let (_browser, pick) = locator(LocatorDescriptor::css("#pick")).await;
            assert!(!pick.is_checked().await.unwrap());
            pick.check().await.unwrap();
            assert!(pick.is_checked().await.unwrap());
            pick.uncheck().await.unwrap();
            assert!(!pick.is_checked().await.unwrap());
        }

        #[tokio::test]
        async fn test_same_locator_resolves_to_same_element() {
            let (_browser, title) = locator(LocatorDescriptor::css(".title")).await;
            let title = title.nth(1);
            let a = title.all().await.unwrap();
            let b = title.all().await.unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), 1);
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_visible_after_delay() {
            let (_browser, reveal) = locator(LocatorDescriptor::css("#reveal")).await;
            let late = reveal.derive(LocatorDescriptor::text("Loaded late"));
            assert!(late.is_hidden().await.unwrap());
            reveal.click().await.unwrap();
            late.wait_for(WaitState::Visible, None).await.unwrap();
            assert!(late.is_visible().await.unwrap());
        }

        #[tokio::test]
        async fn test_wait_for_times_out_with_description() {
            let (_browser, ghost) = locator(LocatorDescriptor::css("#ghost")).await;
            let err = ghost
                .wait_for(WaitState::Visible, Some(Duration::from_millis(40)))
                .await
                .unwrap_err();
            match err {
                PageKitError::Timeout {
                    operation,
                    expected,
                    elapsed_ms,
                } => {
                    assert!(operation.contains("#ghost"));
                    assert_eq!(expected, "visible");
                    assert!(elapsed_ms >= 40);
                }
                other => panic!("unexpected {other:?}"),
            }
            ghost.wait_for(WaitState::Hidden, None).await.unwrap();
            ghost.wait_for(WaitState::Attached, None).await.unwrap();
        }
    }
}
