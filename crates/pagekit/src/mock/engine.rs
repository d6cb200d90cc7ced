//! Driver implementation for the in-memory engine.

use crate::driver::{
    BrowserDriver, BrowserEngine, ContextDriver, ElementAction, ElementInfo, PageDriver,
    PopupListener, PopupSender,
};
use crate::mock::dom::{DomState, FragmentState, Snapshot};
use crate::mock::site::{ActionContext, Effect, LoadTiming, MockSite, Rendered, Trigger};
use crate::result::{PageKitError, PageKitResult};
use crate::selector::LocatorDescriptor;
use crate::wait::LoadState;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};
use url::Url;

/// 1x1 transparent PNG returned by [`MockPage::screenshot`]
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60, 0x00, 0x02, 0x00,
    0x00, 0x05, 0x00, 0x01, 0x7a, 0x5e, 0xab, 0x3f, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

const BLANK_URL: &str = "about:blank";

fn poisoned(what: &str) -> PageKitError {
    PageKitError::InvalidState {
        message: format!("{what} lock poisoned"),
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// In-memory browser serving a [`MockSite`]
#[derive(Debug)]
pub struct MockBrowser {
    site: Arc<MockSite>,
    contexts: Mutex<Vec<Arc<MockContext>>>,
    counter: AtomicU64,
    closed: AtomicBool,
}

impl MockBrowser {
    /// Browser over `site`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self::shared(Arc::new(site))
    }

    /// Browser over a site shared with other browsers
    #[must_use]
    pub fn shared(site: Arc<MockSite>) -> Self {
        Self {
            site,
            contexts: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// The served site
    #[must_use]
    pub fn site(&self) -> &Arc<MockSite> {
        &self.site
    }
}

#[async_trait]
impl BrowserDriver for MockBrowser {
    fn engine(&self) -> BrowserEngine {
        BrowserEngine::Mock
    }

    async fn new_context(&self) -> PageKitResult<Arc<dyn ContextDriver>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::InvalidState {
                message: "browser is closed".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let context = MockContext::new(format!("mock-context-{n}"), Arc::clone(&self.site));
        self.contexts
            .lock()
            .map_err(|_| poisoned("browser"))?
            .push(Arc::clone(&context));
        tracing::debug!(context = %context.id, "mock context created");
        Ok(context)
    }

    async fn close(&self) -> PageKitResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        let contexts: Vec<Arc<MockContext>> =
            std::mem::take(&mut *self.contexts.lock().map_err(|_| poisoned("browser"))?);
        for context in contexts {
            context.shutdown()?;
        }
        Ok(())
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Isolated context: own pages and own sign-in state
#[derive(Debug)]
pub struct MockContext {
    id: String,
    me: Weak<MockContext>,
    site: Arc<MockSite>,
    pages: Mutex<Vec<Arc<MockPage>>>,
    account: Mutex<Option<String>>,
    counter: AtomicU64,
    closed: AtomicBool,
}

impl MockContext {
    fn new(id: String, site: Arc<MockSite>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id,
            me: me.clone(),
            site,
            pages: Mutex::new(Vec::new()),
            account: Mutex::new(None),
            counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Email the context is signed in as
    ///
    /// # Errors
    ///
    /// Fails only if the lock is poisoned.
    pub fn account(&self) -> PageKitResult<Option<String>> {
        Ok(self.account.lock().map_err(|_| poisoned("context"))?.clone())
    }

    fn set_account(&self, account: Option<String>) -> PageKitResult<()> {
        *self.account.lock().map_err(|_| poisoned("context"))? = account;
        Ok(())
    }

    fn open_page(&self) -> PageKitResult<Arc<MockPage>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::InvalidState {
                message: format!("context {} is closed", self.id),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let page = Arc::new(MockPage::new(
            format!("{}-page-{n}", self.id),
            self.me.clone(),
            Arc::clone(&self.site),
        )?);
        self.pages
            .lock()
            .map_err(|_| poisoned("context"))?
            .push(Arc::clone(&page));
        Ok(page)
    }

    fn forget(&self, page_id: &str) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.retain(|p| p.id != page_id);
        }
    }

    fn shutdown(&self) -> PageKitResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        let pages: Vec<Arc<MockPage>> =
            std::mem::take(&mut *self.pages.lock().map_err(|_| poisoned("context"))?);
        for page in pages {
            page.closed.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl ContextDriver for MockContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self) -> PageKitResult<Arc<dyn PageDriver>> {
        let page: Arc<dyn PageDriver> = self.open_page()?;
        Ok(page)
    }

    fn pages(&self) -> Vec<Arc<dyn PageDriver>> {
        self.pages
            .lock()
            .map(|pages| {
                pages
                    .iter()
                    .map(|p| Arc::clone(p) as Arc<dyn PageDriver>)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn close(&self) -> PageKitResult<()> {
        tracing::debug!(context = %self.id, "mock context closed");
        self.shutdown()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// =============================================================================
// PAGE
// =============================================================================

#[derive(Debug, Clone)]
struct Scheduled {
    at: Instant,
    fragment: String,
    state: FragmentState,
}

#[derive(Debug)]
struct PageState {
    url: Url,
    html: String,
    dom: DomState,
    route: Option<usize>,
    timing: LoadTiming,
    navigated_at: Instant,
    scheduled: Vec<Scheduled>,
}

impl PageState {
    fn blank() -> PageKitResult<Self> {
        let url = Url::parse(BLANK_URL).map_err(|e| PageKitError::PageError {
            message: e.to_string(),
        })?;
        Ok(Self {
            url,
            html: String::from("<html><head></head><body></body></html>"),
            dom: DomState::default(),
            route: None,
            timing: LoadTiming::default(),
            navigated_at: Instant::now(),
            scheduled: Vec::new(),
        })
    }

    fn load(&mut self, rendered: Rendered) {
        self.url = rendered.url;
        self.html = rendered.html;
        self.dom = DomState::default();
        self.route = rendered.route;
        self.timing = rendered.timing;
        self.navigated_at = Instant::now();
        self.scheduled.clear();
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<Scheduled>, Vec<Scheduled>) =
            self.scheduled.drain(..).partition(|s| s.at <= now);
        self.scheduled = pending;
        for item in due {
            self.dom.set_fragment(item.fragment, item.state);
        }
    }

    fn fragment_state(&self, name: &str) -> Option<FragmentState> {
        self.dom.fragments.get(name).copied()
    }
}

/// One tab of the in-memory engine
#[derive(Debug)]
pub struct MockPage {
    id: String,
    context: Weak<MockContext>,
    site: Arc<MockSite>,
    state: Mutex<PageState>,
    popups: Mutex<Vec<PopupSender>>,
    closed: AtomicBool,
}

impl MockPage {
    fn new(id: String, context: Weak<MockContext>, site: Arc<MockSite>) -> PageKitResult<Self> {
        Ok(Self {
            id,
            context,
            site,
            state: Mutex::new(PageState::blank()?),
            popups: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> PageKitResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::PageClosed {
                page: self.id.clone(),
            });
        }
        Ok(())
    }

    fn context(&self) -> PageKitResult<Arc<MockContext>> {
        self.context
            .upgrade()
            .ok_or_else(|| PageKitError::PageClosed {
                page: self.id.clone(),
            })
    }

    fn lock_state(&self) -> PageKitResult<MutexGuard<'_, PageState>> {
        self.state.lock().map_err(|_| poisoned("page"))
    }

    /// Current HTML source, as last rendered
    ///
    /// # Errors
    ///
    /// Fails only if the lock is poisoned.
    pub fn html(&self) -> PageKitResult<String> {
        Ok(self.lock_state()?.html.clone())
    }

    fn navigate_sync(&self, target: &str) -> PageKitResult<()> {
        self.ensure_open()?;
        let url = {
            let state = self.lock_state()?;
            match Url::parse(target) {
                Ok(url) => url,
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    state
                        .url
                        .join(target)
                        .map_err(|e| PageKitError::NavigationError {
                            url: target.to_string(),
                            message: e.to_string(),
                        })?
                }
                Err(e) => {
                    return Err(PageKitError::NavigationError {
                        url: target.to_string(),
                        message: e.to_string(),
                    })
                }
            }
        };
        let account = self.context()?.account()?;
        let rendered = self.site.render(&url, account.as_deref())?;
        tracing::debug!(page = %self.id, url = %rendered.url, "mock navigation committed");
        self.lock_state()?.load(rendered);
        Ok(())
    }

    fn query_sync(&self, locator: &LocatorDescriptor) -> PageKitResult<Vec<ElementInfo>> {
        self.ensure_open()?;
        let mut state = self.lock_state()?;
        state.apply_due();
        let html = Html::parse_document(&state.html);
        let snapshot = Snapshot::build(&html, &state.dom);
        Ok(snapshot
            .resolve(locator)
            .into_iter()
            .filter_map(|i| snapshot.info(i))
            .collect())
    }

    /// Apply `action`, then run any behaviours it triggers. Effects that touch
    /// only this page are applied here; the rest are returned.
    fn perform_sync(
        &self,
        locator: &LocatorDescriptor,
        index: usize,
        action: &ElementAction,
    ) -> PageKitResult<Vec<Effect>> {
        self.ensure_open()?;
        let account = self.context()?.account()?;
        let mut state = self.lock_state()?;
        state.apply_due();

        // Phase 1: find the target and the state change the action implies.
        let (key, trigger, change) = {
            let html = Html::parse_document(&state.html);
            let snapshot = Snapshot::build(&html, &state.dom);
            let target = snapshot
                .resolve(locator)
                .get(index)
                .copied()
                .ok_or_else(|| PageKitError::PageError {
                    message: format!("{locator} has no match at index {index}"),
                })?;
            let key = snapshot
                .entry(target)
                .map(|e| e.key.clone())
                .unwrap_or_default();
            let (trigger, change) = plan(&snapshot, target, locator, action)?;
            (key, trigger, change)
        };

        // Phase 2: apply it.
        match change {
            Some(Change::Value(value)) => {
                let _ = state.dom.values.insert(key.clone(), value);
            }
            Some(Change::Checked(checked)) => {
                let _ = state.dom.checked.insert(key.clone(), checked);
            }
            None => {}
        }

        // Phase 3: dispatch behaviours against the updated document.
        let Some(trigger) = trigger else {
            return Ok(Vec::new());
        };
        let effects = {
            let html = Html::parse_document(&state.html);
            let snapshot = Snapshot::build(&html, &state.dom);
            match snapshot.index_of_key(&key) {
                Some(target) => {
                    let mut store = self.site.store()?;
                    dispatch(
                        &self.site,
                        &snapshot,
                        target,
                        &trigger,
                        state.route,
                        &state.url,
                        account.as_deref(),
                        &mut store,
                    )?
                }
                None => Vec::new(),
            }
        };

        // Phase 4: page-local effects now, the rest after the lock is released.
        let mut outer = Vec::new();
        for effect in effects {
            match effect {
                Effect::Fragment {
                    name,
                    visible,
                    after,
                } => {
                    let target = match visible {
                        Some(true) => FragmentState::Visible,
                        Some(false) => FragmentState::Hidden,
                        None => match state.fragment_state(&name) {
                            Some(FragmentState::Visible) => FragmentState::Hidden,
                            _ => FragmentState::Visible,
                        },
                    };
                    if after.is_zero() {
                        state.dom.set_fragment(name, target);
                    } else {
                        state.scheduled.push(Scheduled {
                            at: Instant::now() + after,
                            fragment: name,
                            state: target,
                        });
                    }
                }
                Effect::SetValue { key, value } => {
                    let _ = state.dom.values.insert(key, value);
                }
                other => outer.push(other),
            }
        }
        Ok(outer)
    }

    fn apply_outer(&self, effects: Vec<Effect>) -> PageKitResult<()> {
        for effect in effects {
            match effect {
                Effect::SignIn(email) => self.context()?.set_account(Some(email))?,
                Effect::SignOut => self.context()?.set_account(None)?,
                Effect::Navigate(url) => self.navigate_sync(&url)?,
                Effect::OpenPopup(url) => self.open_popup(&url)?,
                Effect::Fragment { .. } | Effect::SetValue { .. } => {}
            }
        }
        Ok(())
    }

    fn open_popup(&self, target: &str) -> PageKitResult<()> {
        let base = self.lock_state()?.url.clone();
        let absolute = base
            .join(target)
            .map_err(|e| PageKitError::NavigationError {
                url: target.to_string(),
                message: e.to_string(),
            })?;
        let popup = self.context()?.open_page()?;
        popup.navigate_sync(absolute.as_str())?;
        tracing::debug!(opener = %self.id, popup = %popup.id, url = %absolute, "mock popup opened");
        let mut listeners = self.popups.lock().map_err(|_| poisoned("popup"))?;
        listeners.retain(|sender| sender.send(Arc::clone(&popup) as Arc<dyn PageDriver>).is_ok());
        Ok(())
    }
}

enum Change {
    Value(String),
    Checked(bool),
}

fn plan(
    snapshot: &Snapshot<'_>,
    target: usize,
    locator: &LocatorDescriptor,
    action: &ElementAction,
) -> PageKitResult<(Option<Trigger>, Option<Change>)> {
    let not_applicable = |what: &str| PageKitError::PageError {
        message: format!("cannot {} {locator}: {what}", action.verb()),
    };
    let planned = match action {
        ElementAction::Click => {
            let change = if snapshot.is_toggle(target) {
                let is_radio = snapshot
                    .entry(target)
                    .and_then(|e| e.attr("type"))
                    .is_some_and(|t| t.eq_ignore_ascii_case("radio"));
                let current = snapshot.checked_of(target).unwrap_or(false);
                Some(Change::Checked(is_radio || !current))
            } else {
                None
            };
            (Some(Trigger::Click), change)
        }
        ElementAction::Fill { value } => {
            if !snapshot.is_editable(target) {
                return Err(not_applicable("element is not editable"));
            }
            (Some(Trigger::Change), Some(Change::Value(value.clone())))
        }
        ElementAction::Clear => {
            if !snapshot.is_editable(target) {
                return Err(not_applicable("element is not editable"));
            }
            (Some(Trigger::Change), Some(Change::Value(String::new())))
        }
        ElementAction::Press { key } => (Some(Trigger::Press(key.clone())), None),
        ElementAction::SetChecked { checked } => {
            if !snapshot.is_toggle(target) {
                return Err(not_applicable("element is not a checkbox or radio"));
            }
            if snapshot.checked_of(target) == Some(*checked) {
                (None, None)
            } else {
                (Some(Trigger::Change), Some(Change::Checked(*checked)))
            }
        }
        ElementAction::SelectOption { value } => {
            let is_select = snapshot.entry(target).is_some_and(|e| e.tag == "select");
            if !is_select {
                return Err(not_applicable("element is not a <select>"));
            }
            let option = snapshot
                .option_matching(target, value)
                .ok_or_else(|| not_applicable(&format!("no option {value:?}")))?;
            (Some(Trigger::Change), Some(Change::Value(option)))
        }
        ElementAction::ScrollIntoView => (None, None),
    };
    Ok(planned)
}

/// Walk from the target to the root; the first level with matching behaviours
/// fires all of them. A bare `a[href]` reached first navigates (or opens a
/// popup for `target="_blank"`).
#[allow(clippy::too_many_arguments)]
fn dispatch(
    site: &MockSite,
    snapshot: &Snapshot<'_>,
    target: usize,
    trigger: &Trigger,
    route: Option<usize>,
    url: &Url,
    account: Option<&str>,
    store: &mut crate::mock::site::MockStore,
) -> PageKitResult<Vec<Effect>> {
    let Some(element) = snapshot.info(target) else {
        return Ok(Vec::new());
    };
    let mut ctx = ActionContext::new(snapshot, element, url, account, site, store);
    for level in snapshot.ancestors_inclusive(target) {
        let mut fired = false;
        for behaviour in site.behaviours_for(route) {
            if !MockSite::accepts(behaviour, trigger) {
                continue;
            }
            let Ok(selector) = Selector::parse(&behaviour.selector) else {
                continue;
            };
            if snapshot.matches_css(level, &selector) {
                tracing::trace!(selector = %behaviour.selector, action = ?behaviour.action, "mock behaviour fired");
                ctx.apply(&behaviour.action)?;
                fired = true;
            }
        }
        if fired {
            break;
        }
        if *trigger == Trigger::Click {
            if let Some(entry) = snapshot.entry(level) {
                if entry.tag == "a" {
                    if let Some(href) = entry.attr("href") {
                        let href = href.trim();
                        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                            break;
                        }
                        if entry.attr("target").is_some_and(|t| t == "_blank") {
                            ctx.open_popup(href);
                        } else {
                            ctx.navigate(href);
                        }
                        break;
                    }
                }
            }
        }
    }
    Ok(ctx.into_effects())
}

#[async_trait]
impl PageDriver for MockPage {
    fn id(&self) -> &str {
        &self.id
    }

    fn url(&self) -> String {
        self.state
            .lock()
            .map(|s| s.url.to_string())
            .unwrap_or_default()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn goto(&self, url: &str) -> PageKitResult<()> {
        self.navigate_sync(url)
    }

    async fn load_state_reached(&self, state: LoadState) -> PageKitResult<bool> {
        self.ensure_open()?;
        let mut page = self.lock_state()?;
        page.apply_due();
        Ok(page.navigated_at.elapsed() >= page.timing.for_state(state))
    }

    async fn query(&self, locator: &LocatorDescriptor) -> PageKitResult<Vec<ElementInfo>> {
        self.query_sync(locator)
    }

    async fn perform(
        &self,
        locator: &LocatorDescriptor,
        index: usize,
        action: &ElementAction,
    ) -> PageKitResult<()> {
        let outer = self.perform_sync(locator, index, action)?;
        self.apply_outer(outer)
    }

    async fn subscribe_popups(&self) -> PageKitResult<PopupListener> {
        self.ensure_open()?;
        let (sender, listener) = PopupListener::channel();
        self.popups
            .lock()
            .map_err(|_| poisoned("popup"))?
            .push(sender);
        Ok(listener)
    }

    async fn screenshot(&self) -> PageKitResult<Vec<u8>> {
        self.ensure_open()?;
        Ok(BLANK_PNG.to_vec())
    }

    async fn close(&self) -> PageKitResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            if let Some(context) = self.context.upgrade() {
                context.forget(&self.id);
            }
            tracing::debug!(page = %self.id, "mock page closed");
        }
        Ok(())
    }
}

/// Wait helper for tests that need a delayed fragment to land
#[cfg(test)]
async fn settle(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::site::{MockAction, MockRoute};
    use crate::selector::AriaRole;

    const LOGIN: &str = r#"<html><body>
        <input id="email" type="email" placeholder="Email">
        <button id="enter">Enter</button>
        <div data-fragment="password-step">
          <input id="password" type="password" placeholder="Password">
          <button id="login">Log in</button>
        </div>
        <p data-fragment="error">Invalid credentials</p>
    </body></html>"#;

    fn site() -> MockSite {
        MockSite::new()
            .login_path("/user/login")
            .account("admin@example.com", "secret", "/home")
            .route(
                MockRoute::html("/user/login", LOGIN)
                    .on_click(
                        "#enter",
                        MockAction::custom(|ctx| {
                            if ctx.value_of("#email").is_some_and(|e| !e.is_empty()) {
                                ctx.show_after("password-step", Duration::from_millis(30));
                            }
                            Ok(())
                        }),
                    )
                    .on_click(
                        "#login",
                        MockAction::custom(|ctx| {
                            let email = ctx.value_of("#email").unwrap_or_default();
                            let password = ctx.value_of("#password").unwrap_or_default();
                            match ctx.verify_credentials(&email, &password) {
                                Some(account) => {
                                    ctx.sign_in(account.email);
                                    ctx.navigate(account.landing);
                                }
                                None => ctx.show("error"),
                            }
                            Ok(())
                        }),
                    ),
            )
            .route(
                MockRoute::html(
                    "/home",
                    r#"<html><body>
                        <a href="/other">Other</a>
                        <a href="https://feedback.example.com/" target="_blank">Ideas</a>
                        <button class="open">Open modal</button>
                        <div data-fragment="modal" role="dialog"><h5>Live Schedule</h5><button class="x">Close</button></div>
                        <input type="checkbox" id="c">
                    </body></html>"#,
                )
                .protected()
                .on_click(".open", MockAction::Show("modal".into()))
                .on_click(".x", MockAction::Hide("modal".into()))
                .with_timing(LoadTiming::staggered(Duration::ZERO, Duration::from_millis(40))),
            )
            .route(MockRoute::html("/other", "<html><body><h1>Other</h1></body></html>"))
            .route(
                MockRoute::html("/", "<html><body><h1>Hi there</h1></body></html>")
                    .on_host("feedback.example.com"),
            )
    }

    async fn page(browser: &MockBrowser) -> Arc<dyn PageDriver> {
        let context = browser.new_context().await.unwrap();
        context.new_page().await.unwrap()
    }

    async fn click(page: &Arc<dyn PageDriver>, css: &str) {
        page.perform(&LocatorDescriptor::css(css), 0, &ElementAction::Click)
            .await
            .unwrap();
    }

    async fn fill(page: &Arc<dyn PageDriver>, css: &str, value: &str) {
        page.perform(
            &LocatorDescriptor::css(css),
            0,
            &ElementAction::Fill {
                value: value.into(),
            },
        )
        .await
        .unwrap();
    }

    async fn login(page: &Arc<dyn PageDriver>) {
        page.goto("https://lms.example.com/user/login").await.unwrap();
        fill(page, "#email", "admin@example.com").await;
        click(page, "#enter").await;
        settle(Duration::from_millis(40)).await;
        fill(page, "#password", "secret").await;
        click(page, "#login").await;
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_protected_route_requires_sign_in() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            page.goto("https://lms.example.com/home").await.unwrap();
            assert!(page.url().contains("/user/login"));
            let links = page
                .query(&LocatorDescriptor::role(AriaRole::Link).named("Other"))
                .await
                .unwrap();
            assert!(links.is_empty());
        }

        #[tokio::test]
        async fn test_login_flow_and_default_links() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            login(&page).await;
            assert_eq!(page.url(), "https://lms.example.com/home");
            click(&page, "a[href='/other']").await;
            assert_eq!(page.url(), "https://lms.example.com/other");
        }

        #[tokio::test]
        async fn test_password_step_appears_after_delay() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            page.goto("https://lms.example.com/user/login").await.unwrap();
            fill(&page, "#email", "admin@example.com").await;
            click(&page, "#enter").await;
            let password = LocatorDescriptor::css("#password");
            assert!(!page.query(&password).await.unwrap()[0].visible);
            settle(Duration::from_millis(40)).await;
            assert!(page.query(&password).await.unwrap()[0].visible);
        }

        #[tokio::test]
        async fn test_wrong_password_shows_error() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            page.goto("https://lms.example.com/user/login").await.unwrap();
            fill(&page, "#email", "admin@example.com").await;
            click(&page, "#enter").await;
            settle(Duration::from_millis(40)).await;
            fill(&page, "#password", "nope").await;
            click(&page, "#login").await;
            assert!(page.url().contains("/user/login"));
            let error = page.query(&LocatorDescriptor::text("Invalid credentials")).await.unwrap();
            assert!(error[0].visible);
        }

        #[tokio::test]
        async fn test_contexts_do_not_share_sign_in() {
            let browser = MockBrowser::new(site());
            let first = page(&browser).await;
            login(&first).await;
            let second = page(&browser).await;
            second.goto("https://lms.example.com/home").await.unwrap();
            assert!(second.url().contains("/user/login"));
        }

        #[tokio::test]
        async fn test_load_states_follow_route_timing() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            login(&page).await;
            assert!(page.load_state_reached(LoadState::Load).await.unwrap());
            assert!(!page.load_state_reached(LoadState::NetworkIdle).await.unwrap());
            settle(Duration::from_millis(50)).await;
            assert!(page.load_state_reached(LoadState::NetworkIdle).await.unwrap());
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_fragment_show_and_hide() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            login(&page).await;
            let dialog = LocatorDescriptor::role(AriaRole::Dialog);
            assert!(page.query(&dialog).await.unwrap().is_empty());
            click(&page, ".open").await;
            assert_eq!(page.query(&dialog).await.unwrap().len(), 1);
            click(&page, ".x").await;
            assert!(page.query(&dialog).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_checkbox_and_fill_errors() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            login(&page).await;
            let checkbox = LocatorDescriptor::css("#c");
            page.perform(&checkbox, 0, &ElementAction::SetChecked { checked: true })
                .await
                .unwrap();
            assert_eq!(page.query(&checkbox).await.unwrap()[0].checked, Some(true));
            let err = page
                .perform(
                    &checkbox,
                    0,
                    &ElementAction::Fill {
                        value: "x".into(),
                    },
                )
                .await
                .unwrap_err();
            assert!(err.to_string().contains("not editable"));
        }

        #[tokio::test]
        async fn test_popup_reaches_registered_listener_only() {
            let browser = MockBrowser::new(site());
            let context = browser.new_context().await.unwrap();
            let page = context.new_page().await.unwrap();
            login(&page).await;
            let mut listener = page.subscribe_popups().await.unwrap();
            click(&page, "a[target='_blank']").await;
            let popup = listener
                .next_popup(Duration::from_millis(100))
                .await
                .expect("popup");
            assert_eq!(popup.url(), "https://feedback.example.com/");
            assert_eq!(context.pages().len(), 2);
            popup.close().await.unwrap();
            assert_eq!(context.pages().len(), 1);
            assert_eq!(page.url(), "https://lms.example.com/home");
        }

        #[tokio::test]
        async fn test_closed_page_rejects_operations() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            page.close().await.unwrap();
            assert!(page.is_closed());
            let err = page.goto("https://lms.example.com/other").await.unwrap_err();
            assert!(matches!(err, PageKitError::PageClosed { .. }));
        }

        #[tokio::test]
        async fn test_screenshot_is_png() {
            let browser = MockBrowser::new(site());
            let page = page(&browser).await;
            let png = page.screenshot().await.unwrap();
            assert_eq!(&png[1..4], b"PNG");
        }
    }
}
