//! Base page: navigation, waits and assertions shared by every page object.
//!
//! [`Page`] is a cheap, cloneable handle. Page objects embed it rather than
//! extending it; it carries no mutable state of its own beyond the driver
//! and the immutable [`PageSettings`].

use crate::driver::{ElementInfo, PageDriver};
use crate::locator::Locator;
use crate::page_object::UrlPattern;
use crate::result::{PageKitError, PageKitResult};
use crate::selector::{AriaRole, LocatorDescriptor, TextMatch};
use crate::wait::{millis, poll_until, LoadState, Timeouts, WaitOutcome, WaitState};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Immutable settings shared by a page and every page it opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Base for relative navigation
    pub base_url: Option<Url>,
    /// Wait budgets
    pub timeouts: Timeouts,
    /// Where [`Page::screenshot`] writes
    pub screenshot_dir: PathBuf,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeouts: Timeouts::default(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}

impl PageSettings {
    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }
}

/// Handle to one browser tab
#[derive(Clone)]
pub struct Page {
    driver: Arc<dyn PageDriver>,
    settings: Arc<PageSettings>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.driver.id())
            .field("url", &self.driver.url())
            .finish()
    }
}

impl Page {
    /// Wrap a driver page
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, settings: PageSettings) -> Self {
        Self::with_settings(driver, Arc::new(settings))
    }

    /// Wrap a driver page sharing existing settings
    #[must_use]
    pub fn with_settings(driver: Arc<dyn PageDriver>, settings: Arc<PageSettings>) -> Self {
        Self { driver, settings }
    }

    /// Underlying driver page
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Settings
    #[must_use]
    pub fn settings(&self) -> &Arc<PageSettings> {
        &self.settings
    }

    /// Wait budgets
    #[must_use]
    pub fn timeouts(&self) -> Timeouts {
        self.settings.timeouts
    }

    /// Page identifier
    #[must_use]
    pub fn id(&self) -> &str {
        self.driver.id()
    }

    // =========================================================================
    // LOCATORS
    // =========================================================================

    /// Locator for an arbitrary descriptor
    #[must_use]
    pub fn locate(&self, descriptor: LocatorDescriptor) -> Locator {
        Locator::new(Arc::clone(&self.driver), descriptor, self.settings.timeouts)
    }

    /// CSS locator
    #[must_use]
    pub fn locator(&self, css: &str) -> Locator {
        self.locate(LocatorDescriptor::css(css))
    }

    /// Role locator
    #[must_use]
    pub fn get_by_role(&self, role: AriaRole) -> Locator {
        self.locate(LocatorDescriptor::role(role))
    }

    /// Text locator
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<TextMatch>) -> Locator {
        self.locate(LocatorDescriptor::text(text))
    }

    /// Placeholder locator
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<TextMatch>) -> Locator {
        self.locate(LocatorDescriptor::placeholder(text))
    }

    /// Label locator
    #[must_use]
    pub fn get_by_label(&self, text: impl Into<TextMatch>) -> Locator {
        self.locate(LocatorDescriptor::label(text))
    }

    /// Test-id locator
    #[must_use]
    pub fn get_by_test_id(&self, id: &str) -> Locator {
        self.locate(LocatorDescriptor::test_id(id))
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Resolve `url` against the base URL
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::NavigationError`] for relative URLs without a
    /// base, or unparsable input.
    pub fn resolve_url(&self, url: &str) -> PageKitResult<Url> {
        let resolved = match (&self.settings.base_url, Url::parse(url)) {
            (_, Ok(absolute)) => Ok(absolute),
            (Some(base), Err(url::ParseError::RelativeUrlWithoutBase)) => base.join(url),
            (None, Err(url::ParseError::RelativeUrlWithoutBase)) => {
                return Err(PageKitError::NavigationError {
                    url: url.to_string(),
                    message: "relative URL and no base URL configured".to_string(),
                })
            }
            (_, Err(e)) => Err(e),
        };
        resolved.map_err(|e| PageKitError::NavigationError {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Navigate and wait for `readiness`
    ///
    /// # Errors
    ///
    /// Navigation errors, or [`PageKitError::Timeout`] after the navigation
    /// timeout.
    pub async fn navigate(&self, url: &str, readiness: LoadState) -> PageKitResult<()> {
        let target = self.resolve_url(url)?;
        info!(page = %self.id(), url = %target, readiness = %readiness, "navigate");
        let timeout = self.settings.timeouts.navigation;
        let started = std::time::Instant::now();
        tokio::time::timeout(timeout, self.driver.goto(target.as_str()))
            .await
            .map_err(|_| PageKitError::Timeout {
                operation: format!("navigate to {target}"),
                expected: "navigation committed".to_string(),
                elapsed_ms: millis(started.elapsed()),
            })??;
        self.wait_for_load_state(readiness).await
    }

    /// Navigate and wait for `load`
    ///
    /// # Errors
    ///
    /// See [`Self::navigate`].
    pub async fn goto(&self, url: &str) -> PageKitResult<()> {
        self.navigate(url, LoadState::Load).await
    }

    /// Wait for the current document to reach `state`
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::Timeout`] after the navigation timeout.
    pub async fn wait_for_load_state(&self, state: LoadState) -> PageKitResult<()> {
        let driver = &self.driver;
        let outcome = poll_until(
            self.settings.timeouts.navigation,
            self.settings.timeouts.poll_interval,
            move || async move { Ok(driver.load_state_reached(state).await?.then_some(())) },
        )
        .await?;
        match outcome {
            WaitOutcome::Ready { .. } => Ok(()),
            WaitOutcome::TimedOut { elapsed } => Err(PageKitError::Timeout {
                operation: format!("wait for load state of {}", self.current_url()),
                expected: state.to_string(),
                elapsed_ms: millis(elapsed),
            }),
        }
    }

    /// Current URL
    #[must_use]
    pub fn current_url(&self) -> String {
        self.driver.url()
    }

    /// Whether the current URL contains `fragment`
    #[must_use]
    pub fn url_contains(&self, fragment: &str) -> bool {
        self.current_url().contains(fragment)
    }

    /// Wait until the path of the current URL matches `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::Timeout`] after the navigation timeout.
    pub async fn wait_for_url(&self, pattern: &UrlPattern) -> PageKitResult<()> {
        self.wait_for_url_where(&format!("url matching {}", pattern.pattern()), |url| {
            Url::parse(url).is_ok_and(|u| pattern.matches(u.path()))
        })
        .await
    }

    /// Wait until the current URL contains `fragment`
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::Timeout`] after the navigation timeout.
    pub async fn wait_for_url_contains(&self, fragment: &str) -> PageKitResult<()> {
        self.wait_for_url_where(&format!("url containing {fragment:?}"), |url| {
            url.contains(fragment)
        })
        .await
    }

    async fn wait_for_url_where<P>(&self, expected: &str, predicate: P) -> PageKitResult<()>
    where
        P: Fn(&str) -> bool + Send + Sync,
    {
        let driver = &self.driver;
        let predicate = &predicate;
        let outcome = poll_until(
            self.settings.timeouts.navigation,
            self.settings.timeouts.poll_interval,
            move || async move { Ok(predicate(&driver.url()).then_some(())) },
        )
        .await?;
        match outcome {
            WaitOutcome::Ready { .. } => Ok(()),
            WaitOutcome::TimedOut { elapsed } => Err(PageKitError::Timeout {
                operation: format!("wait for url (currently {})", self.current_url()),
                expected: expected.to_string(),
                elapsed_ms: millis(elapsed),
            }),
        }
    }

    /// Wait for a locator to reach `state`; see [`Locator::wait_for`]
    ///
    /// # Errors
    ///
    /// [`PageKitError::Timeout`] or [`PageKitError::AmbiguousLocator`].
    pub async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Option<Duration>,
    ) -> PageKitResult<()> {
        locator.wait_for(state, timeout).await
    }

    /// Sleep for a fixed duration
    pub async fn wait_for_timeout(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    // =========================================================================
    // ASSERTIONS
    // =========================================================================

    /// Assert the locator resolves to one visible element
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] naming the actual state.
    pub async fn assert_visible(&self, locator: &Locator) -> PageKitResult<()> {
        self.expect_one(locator, "to be visible", false, |info| {
            if info.visible {
                Ok(())
            } else {
                Err("it was hidden".to_string())
            }
        })
        .await
    }

    /// Assert the locator resolves to nothing, or to one hidden element
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] naming the actual state.
    pub async fn assert_hidden(&self, locator: &Locator) -> PageKitResult<()> {
        self.expect_one(locator, "to be hidden", true, |info| {
            if info.visible {
                Err("it was visible".to_string())
            } else {
                Ok(())
            }
        })
        .await
    }

    /// Assert the text of the single match
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] naming the actual text.
    pub async fn assert_text_contains(
        &self,
        locator: &Locator,
        text: impl Into<TextMatch>,
    ) -> PageKitResult<()> {
        let text = text.into();
        let expected = format!("text matching {text}");
        self.expect_one(locator, &expected, false, |info| {
            if text.matches(&info.text) {
                Ok(())
            } else {
                Err(format!("its text was {:?}", info.text))
            }
        })
        .await
    }

    /// Assert the value of the single matching form control
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] naming the actual value.
    pub async fn assert_value(&self, locator: &Locator, value: &str) -> PageKitResult<()> {
        let expected = format!("value {value:?}");
        self.expect_one(locator, &expected, false, |info| match &info.value {
            Some(actual) if actual == value => Ok(()),
            Some(actual) => Err(format!("its value was {actual:?}")),
            None => Err("it is not a form control".to_string()),
        })
        .await
    }

    /// Assert at least `n` visible matches
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] with the observed counts.
    pub async fn assert_count_at_least(&self, locator: &Locator, n: usize) -> PageKitResult<()> {
        let actual = Mutex::new(String::from("nothing was observed"));
        let last = &actual;
        let outcome = poll_until(
            self.settings.timeouts.expect,
            self.settings.timeouts.poll_interval,
            move || async move {
                let found = locator.all().await?;
                let visible = found.iter().filter(|e| e.visible).count();
                if visible >= n {
                    return Ok(Some(()));
                }
                if let Ok(mut slot) = last.lock() {
                    *slot = format!("{visible} visible of {} matched", found.len());
                }
                Ok(None)
            },
        )
        .await?;
        match outcome {
            WaitOutcome::Ready { .. } => Ok(()),
            WaitOutcome::TimedOut { .. } => Err(PageKitError::assertion(
                &locator.description(),
                &format!("at least {n} visible"),
                &take(&actual),
            )),
        }
    }

    /// Assert the current URL contains `fragment`
    ///
    /// # Errors
    ///
    /// [`PageKitError::AssertionFailed`] with the actual URL.
    pub async fn assert_url_contains(&self, fragment: &str) -> PageKitResult<()> {
        let timeout = self.settings.timeouts.expect;
        if self.wait_for_url_contains_within(fragment, timeout).await? {
            Ok(())
        } else {
            Err(PageKitError::assertion(
                "page url",
                &format!("to contain {fragment:?}"),
                &format!("it was {}", self.current_url()),
            ))
        }
    }

    async fn wait_for_url_contains_within(
        &self,
        fragment: &str,
        timeout: Duration,
    ) -> PageKitResult<bool> {
        let driver = &self.driver;
        let outcome = poll_until(timeout, self.settings.timeouts.poll_interval, move || async move {
            Ok(driver.url().contains(fragment).then_some(()))
        })
        .await?;
        Ok(outcome.ready().is_some())
    }

    /// Poll until the locator resolves to at most one element satisfying
    /// `check`. An empty match set satisfies only when `allow_empty`.
    async fn expect_one<C>(
        &self,
        locator: &Locator,
        expected: &str,
        allow_empty: bool,
        check: C,
    ) -> PageKitResult<()>
    where
        C: Fn(&ElementInfo) -> Result<(), String> + Send + Sync,
    {
        let actual = Mutex::new(String::from("no element matched"));
        let last = &actual;
        let check = &check;
        let outcome = poll_until(
            self.settings.timeouts.expect,
            self.settings.timeouts.poll_interval,
            move || async move {
                let found = locator.all().await?;
                let verdict = match found.as_slice() {
                    [] if allow_empty => Ok(()),
                    [] => Err("no element matched".to_string()),
                    [only] => check(only),
                    many => {
                        return Err(PageKitError::AmbiguousLocator {
                            description: locator.description(),
                            count: many.len(),
                        })
                    }
                };
                match verdict {
                    Ok(()) => Ok(Some(())),
                    Err(observed) => {
                        if let Ok(mut slot) = last.lock() {
                            *slot = observed;
                        }
                        Ok(None)
                    }
                }
            },
        )
        .await?;
        match outcome {
            WaitOutcome::Ready { .. } => {
                debug!(locator = %locator, expected, "assertion passed");
                Ok(())
            }
            WaitOutcome::TimedOut { .. } => Err(PageKitError::assertion(
                &locator.description(),
                expected,
                &take(&actual),
            )),
        }
    }

    // =========================================================================
    // POPUPS / ARTIFACTS / LIFECYCLE
    // =========================================================================

    /// Run `trigger` and return the page it opens.
    ///
    /// The popup listener is registered before the trigger runs, so a page
    /// opened by the trigger can never be missed. The new page shares this
    /// page's settings and is returned once it reached `readiness`.
    ///
    /// # Errors
    ///
    /// Errors from the trigger, or [`PageKitError::Timeout`] if no page opens
    /// within the navigation timeout.
    pub async fn expect_popup<F, Fut>(&self, trigger: F, readiness: LoadState) -> PageKitResult<Page>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PageKitResult<()>>,
    {
        let mut listener = self.driver.subscribe_popups().await?;
        let started = std::time::Instant::now();
        trigger().await?;
        let timeout = self.settings.timeouts.navigation;
        let popup = listener
            .next_popup(timeout.saturating_sub(started.elapsed()))
            .await
            .ok_or_else(|| PageKitError::Timeout {
                operation: format!("wait for a page opened by {}", self.id()),
                expected: "new page".to_string(),
                elapsed_ms: millis(started.elapsed()),
            })?;
        let page = Self::with_settings(popup, Arc::clone(&self.settings));
        info!(opener = %self.id(), popup = %page.id(), url = %page.current_url(), "popup opened");
        page.wait_for_load_state(readiness).await?;
        Ok(page)
    }

    /// Write a PNG screenshot to `<screenshot_dir>/<name>.png`
    ///
    /// # Errors
    ///
    /// Engine or I/O errors.
    pub async fn screenshot(&self, name: &str) -> PageKitResult<PathBuf> {
        let bytes = self.driver.screenshot().await?;
        tokio::fs::create_dir_all(&self.settings.screenshot_dir).await?;
        let path = self
            .settings
            .screenshot_dir
            .join(format!("{}.png", sanitize_file_name(name)));
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), "screenshot written");
        Ok(path)
    }

    /// Close this page; other pages are unaffected
    ///
    /// # Errors
    ///
    /// Engine errors.
    pub async fn close(&self) -> PageKitResult<()> {
        debug!(page = %self.id(), "close page");
        self.driver.close().await
    }

    /// Whether the page was closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.driver.is_closed()
    }
}

fn take(slot: &Mutex<String>) -> String {
    slot.lock().map(|s| s.clone()).unwrap_or_default()
}

/// Replace everything but ASCII alphanumerics, `-` and `_` with `-`
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "screenshot".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{BrowserDriver, ContextDriver};
    use crate::mock::{LoadTiming, MockAction, MockBrowser, MockRoute, MockSite};

    fn site() -> MockSite {
        MockSite::new()
            .route(
                MockRoute::html(
                    "/my_classroom",
                    r#"<html><body>
                        <h1>Welcome back, Santi</h1>
                        <a href="https://feedback.example.com/" target="_blank">Send Ideas</a>
                        <a href="/courses/lp">Learning Paths</a>
                        <input id="msg" placeholder="Message">
                        <button id="show">Show</button>
                        <div data-fragment="panel"><p>Panel</p></div>
                        <div class="card">A</div><div class="card">B</div>
                    </body></html>"#,
                )
                .on_click("#show", MockAction::ShowAfter("panel".into(), Duration::from_millis(20))),
            )
            .route(MockRoute::html("/courses/lp", "<html><body><h1>Paths</h1></body></html>"))
            .route(
                MockRoute::html("/", "<html><body><h1>Hi there</h1></body></html>")
                    .on_host("feedback.example.com")
                    .with_timing(LoadTiming::staggered(Duration::ZERO, Duration::from_millis(30))),
            )
    }

    async fn open() -> (MockBrowser, Arc<dyn ContextDriver>, Page) {
        let browser = MockBrowser::new(site());
        let context = browser.new_context().await.unwrap();
        let driver = context.new_page().await.unwrap();
        let settings = PageSettings::default()
            .with_base_url(Url::parse("https://lms.example.com/").unwrap())
            .with_timeouts(
                Timeouts::default()
                    .with_expect(Duration::from_millis(120))
                    .with_action(Duration::from_millis(120))
                    .with_navigation(Duration::from_millis(500))
                    .with_poll_interval(Duration::from_millis(10)),
            );
        let page = Page::new(driver, settings);
        page.goto("/my_classroom").await.unwrap();
        (browser, context, page)
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_resolve_url_against_base() {
            let (_browser, _context, page) = open().await;
            assert_eq!(
                page.resolve_url("/user/login").unwrap().as_str(),
                "https://lms.example.com/user/login"
            );
            assert_eq!(
                page.resolve_url("https://feedback.example.com/").unwrap().as_str(),
                "https://feedback.example.com/"
            );
        }

        #[tokio::test]
        async fn test_relative_navigation_and_url_reads() {
            let (_browser, _context, page) = open().await;
            assert_eq!(page.current_url(), "https://lms.example.com/my_classroom");
            assert!(page.url_contains("my_classroom"));
            page.get_by_role(AriaRole::Link).named("Learning Paths").click().await.unwrap();
            page.wait_for_url(&UrlPattern::new("/courses/lp")).await.unwrap();
            page.assert_url_contains("/courses/lp").await.unwrap();
        }

        #[tokio::test]
        async fn test_relative_url_without_base_is_rejected() {
            let browser = MockBrowser::new(site());
            let context = browser.new_context().await.unwrap();
            let page = Page::new(context.new_page().await.unwrap(), PageSettings::default());
            let err = page.goto("/my_classroom").await.unwrap_err();
            assert!(matches!(err, PageKitError::NavigationError { .. }));
        }

        #[tokio::test]
        async fn test_navigation_is_idempotent() {
            let (_browser, _context, page) = open().await;
            page.goto("/my_classroom").await.unwrap();
            let first = page.current_url();
            page.goto("/my_classroom").await.unwrap();
            assert_eq!(first, page.current_url());
        }
    }

    mod assertion_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible_and_hidden() {
            let (_browser, _context, page) = open().await;
            page.assert_visible(&page.get_by_text("Welcome back,")).await.unwrap();
            page.assert_hidden(&page.get_by_text("Panel")).await.unwrap();
            page.assert_hidden(&page.locator("#does-not-exist")).await.unwrap();
            page.locator("#show").click().await.unwrap();
            page.assert_visible(&page.get_by_text("Panel")).await.unwrap();
        }

        #[tokio::test]
        async fn test_failure_messages_carry_actual_state() {
            let (_browser, _context, page) = open().await;
            let err = page.assert_visible(&page.locator("#nope")).await.unwrap_err();
            assert_eq!(
                err.to_string(),
                "Assertion failed: locator(\"#nope\"): expected to be visible, but no element matched"
            );
            let err = page.assert_visible(&page.get_by_text("Panel")).await.unwrap_err();
            assert!(err.to_string().ends_with("but it was hidden"));
            let err = page.assert_visible(&page.locator(".card")).await.unwrap_err();
            assert!(matches!(err, PageKitError::AmbiguousLocator { count: 2, .. }));
        }

        #[tokio::test]
        async fn test_value_text_and_counts() {
            let (_browser, _context, page) = open().await;
            let msg = page.get_by_placeholder("Message");
            msg.fill("testing text").await.unwrap();
            page.assert_value(&msg, "testing text").await.unwrap();
            let err = page.assert_value(&msg, "other").await.unwrap_err();
            assert!(err.to_string().contains("its value was \"testing text\""));
            page.assert_text_contains(&page.locator("h1"), "welcome back").await.unwrap();
            page.assert_count_at_least(&page.locator(".card"), 2).await.unwrap();
            let err = page.assert_count_at_least(&page.locator(".card"), 3).await.unwrap_err();
            assert!(err.to_string().contains("2 visible of 2 matched"));
        }
    }

    mod popup_tests {
        use super::*;

        #[tokio::test]
        async fn test_expect_popup_returns_independent_page() {
            let (_browser, context, page) = open().await;
            let link = page.get_by_role(AriaRole::Link).named("Send Ideas");
            let popup = page
                .expect_popup(|| link.click(), LoadState::NetworkIdle)
                .await
                .unwrap();
            assert!(popup.url_contains("feedback.example.com"));
            popup.assert_visible(&popup.get_by_text("Hi there")).await.unwrap();
            assert_eq!(context.pages().len(), 2);
            popup.close().await.unwrap();
            assert!(popup.is_closed());
            assert!(!page.is_closed());
            assert_eq!(page.current_url(), "https://lms.example.com/my_classroom");
        }

        #[tokio::test]
        async fn test_expect_popup_times_out_when_nothing_opens() {
            let (_browser, _context, page) = open().await;
            let show = page.locator("#show");
            let err = page
                .expect_popup(|| show.click(), LoadState::Load)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_screenshot_written_under_dir() {
            let dir = tempfile::tempdir().unwrap();
            let browser = MockBrowser::new(site());
            let context = browser.new_context().await.unwrap();
            let page = Page::new(
                context.new_page().await.unwrap(),
                PageSettings::default().with_screenshot_dir(dir.path()),
            );
            let path = page.screenshot("admin dashboard/1").await.unwrap();
            assert_eq!(path, dir.path().join("admin-dashboard-1.png"));
            assert!(path.exists());
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Leaderboard: export"), "Leaderboard--export");
        assert_eq!(sanitize_file_name("///"), "screenshot");
    }
}
