//! Declarative description of a site served by the in-memory engine.
//!
//! A [`MockSite`] is a set of [`MockRoute`]s (host + path pattern → HTML),
//! site-wide [`Behaviour`]s, test accounts and a shared [`MockStore`]. The
//! store plays the part of the server's database: it is shared by every
//! context of a browser, so state written by one session is visible to the
//! next page load of any other.

use crate::driver::ElementInfo;
use crate::mock::dom::Snapshot;
use crate::page_object::UrlPattern;
use crate::result::{PageKitError, PageKitResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// Redirect hops followed before a navigation is declared broken
const MAX_REDIRECTS: usize = 5;

const NOT_FOUND_HTML: &str =
    "<html><head><title>Not found</title></head><body><h1>Page not found</h1></body></html>";

// =============================================================================
// RENDERING
// =============================================================================

/// Inputs available to a route renderer
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Requested URL
    pub url: &'a Url,
    /// Named path parameters
    pub params: &'a HashMap<String, String>,
    /// Email of the signed-in account, if any
    pub account: Option<&'a str>,
    /// Shared site data
    pub store: &'a MockStore,
}

impl RenderContext<'_> {
    /// Query-string parameter
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Produces the HTML of a route
pub type Renderer = Arc<dyn Fn(&RenderContext<'_>) -> String + Send + Sync>;

/// Closure run when a [`MockAction::Custom`] fires
pub type CustomAction = Arc<dyn Fn(&mut ActionContext<'_>) -> PageKitResult<()> + Send + Sync>;

/// Time after navigation at which each load state is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadTiming {
    /// `domcontentloaded`
    pub dom_content_loaded: Duration,
    /// `load`
    pub load: Duration,
    /// `networkidle`
    pub network_idle: Duration,
}

impl LoadTiming {
    /// Timing where `load` and `networkidle` trail the parse by fixed delays
    #[must_use]
    pub const fn staggered(load: Duration, network_idle: Duration) -> Self {
        Self {
            dom_content_loaded: Duration::ZERO,
            load,
            network_idle,
        }
    }

    /// Delay for a given state
    #[must_use]
    pub const fn for_state(&self, state: crate::wait::LoadState) -> Duration {
        match state {
            crate::wait::LoadState::DomContentLoaded => self.dom_content_loaded,
            crate::wait::LoadState::Load => self.load,
            crate::wait::LoadState::NetworkIdle => self.network_idle,
        }
    }
}

// =============================================================================
// BEHAVIOURS
// =============================================================================

/// What a behaviour does when it fires
#[derive(Clone)]
pub enum MockAction {
    /// Navigate the page (relative URLs resolve against the current one)
    Navigate(String),
    /// Make a fragment visible
    Show(String),
    /// Hide a fragment
    Hide(String),
    /// Flip a fragment between visible and hidden
    Toggle(String),
    /// Make a fragment visible after a delay
    ShowAfter(String, Duration),
    /// Hide a fragment after a delay
    HideAfter(String, Duration),
    /// Open a URL in a new page of the same context
    OpenPopup(String),
    /// Arbitrary logic over an [`ActionContext`]
    Custom(CustomAction),
}

impl MockAction {
    /// Wrap a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> PageKitResult<()> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for MockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(url) => write!(f, "Navigate({url})"),
            Self::Show(name) => write!(f, "Show({name})"),
            Self::Hide(name) => write!(f, "Hide({name})"),
            Self::Toggle(name) => write!(f, "Toggle({name})"),
            Self::ShowAfter(name, d) => write!(f, "ShowAfter({name}, {d:?})"),
            Self::HideAfter(name, d) => write!(f, "HideAfter({name}, {d:?})"),
            Self::OpenPopup(url) => write!(f, "OpenPopup({url})"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Event a behaviour listens for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Click on the element or a descendant
    Click,
    /// Key press while the element is focused
    Press(String),
    /// Value or checked state changed
    Change,
}

impl Trigger {
    fn accepts(&self, fired: &Self) -> bool {
        match (self, fired) {
            (Self::Press(a), Self::Press(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        }
    }
}

/// Trigger + CSS target + action
#[derive(Debug, Clone)]
pub struct Behaviour {
    /// Event
    pub trigger: Trigger,
    /// Elements it is bound to
    pub selector: String,
    /// Effect
    pub action: MockAction,
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Change requested by an action, applied by the engine once the action
/// returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fragment visibility change
    Fragment {
        /// Fragment name
        name: String,
        /// `Some(true)` show, `Some(false)` hide, `None` toggle
        visible: Option<bool>,
        /// Delay before it applies
        after: Duration,
    },
    /// Form value change by element key
    SetValue {
        /// Element key
        key: String,
        /// New value
        value: String,
    },
    /// Navigate the page
    Navigate(String),
    /// Open a popup page
    OpenPopup(String),
    /// Sign the context in
    SignIn(String),
    /// Sign the context out
    SignOut,
}

/// View of the page handed to [`MockAction::Custom`] closures
pub struct ActionContext<'a> {
    snapshot: &'a Snapshot<'a>,
    element: ElementInfo,
    url: &'a Url,
    account: Option<&'a str>,
    site: &'a MockSite,
    store: &'a mut MockStore,
    effects: Vec<Effect>,
}

impl fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("element", &self.element.key)
            .field("url", &self.url.as_str())
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        snapshot: &'a Snapshot<'a>,
        element: ElementInfo,
        url: &'a Url,
        account: Option<&'a str>,
        site: &'a MockSite,
        store: &'a mut MockStore,
    ) -> Self {
        Self {
            snapshot,
            element,
            url,
            account,
            site,
            store,
            effects: Vec::new(),
        }
    }

    pub(crate) fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    /// The element the event fired on
    #[must_use]
    pub const fn element(&self) -> &ElementInfo {
        &self.element
    }

    /// Current page URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        self.url
    }

    /// Signed-in account email
    #[must_use]
    pub const fn account(&self) -> Option<&str> {
        self.account
    }

    /// Current value of the first element matching `css`
    #[must_use]
    pub fn value_of(&self, css: &str) -> Option<String> {
        self.snapshot
            .first_css(css)
            .and_then(|i| self.snapshot.value_of(i))
    }

    /// Text of the first element matching `css`
    #[must_use]
    pub fn text_of(&self, css: &str) -> Option<String> {
        self.snapshot
            .first_css(css)
            .and_then(|i| self.snapshot.entry(i))
            .map(|e| e.text.clone())
    }

    /// Shared site data
    pub fn store(&mut self) -> &mut MockStore {
        self.store
    }

    /// Account whose email and password both match
    #[must_use]
    pub fn verify_credentials(&self, email: &str, password: &str) -> Option<Account> {
        self.site
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()) && a.password == password)
            .cloned()
    }

    /// Whether an account exists for `email`
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.site
            .accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Show a fragment
    pub fn show(&mut self, fragment: &str) {
        self.fragment(fragment, Some(true), Duration::ZERO);
    }

    /// Hide a fragment
    pub fn hide(&mut self, fragment: &str) {
        self.fragment(fragment, Some(false), Duration::ZERO);
    }

    /// Show a fragment after `delay`
    pub fn show_after(&mut self, fragment: &str, delay: Duration) {
        self.fragment(fragment, Some(true), delay);
    }

    fn fragment(&mut self, name: &str, visible: Option<bool>, after: Duration) {
        self.effects.push(Effect::Fragment {
            name: name.to_string(),
            visible,
            after,
        });
    }

    /// Set the value of the first element matching `css`
    pub fn set_value(&mut self, css: &str, value: impl Into<String>) {
        if let Some(entry) = self.snapshot.first_css(css).and_then(|i| self.snapshot.entry(i)) {
            self.effects.push(Effect::SetValue {
                key: entry.key.clone(),
                value: value.into(),
            });
        }
    }

    /// Navigate once the action returns
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.effects.push(Effect::Navigate(url.into()));
    }

    /// Open a popup once the action returns
    pub fn open_popup(&mut self, url: impl Into<String>) {
        self.effects.push(Effect::OpenPopup(url.into()));
    }

    /// Sign the browsing context in as `email`
    pub fn sign_in(&mut self, email: impl Into<String>) {
        self.effects.push(Effect::SignIn(email.into()));
    }

    /// Sign the browsing context out
    pub fn sign_out(&mut self) {
        self.effects.push(Effect::SignOut);
    }

    pub(crate) fn apply(&mut self, action: &MockAction) -> PageKitResult<()> {
        match action {
            MockAction::Navigate(url) => self.navigate(url.clone()),
            MockAction::Show(name) => self.fragment(name, Some(true), Duration::ZERO),
            MockAction::Hide(name) => self.fragment(name, Some(false), Duration::ZERO),
            MockAction::Toggle(name) => self.fragment(name, None, Duration::ZERO),
            MockAction::ShowAfter(name, delay) => self.fragment(name, Some(true), *delay),
            MockAction::HideAfter(name, delay) => self.fragment(name, Some(false), *delay),
            MockAction::OpenPopup(url) => self.open_popup(url.clone()),
            MockAction::Custom(f) => f(self)?,
        }
        Ok(())
    }
}

// =============================================================================
// STORE / ACCOUNTS
// =============================================================================

/// Server-side data shared by every page of a site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockStore {
    lists: BTreeMap<String, Vec<String>>,
    values: BTreeMap<String, String>,
}

impl MockStore {
    /// Items of a named list (empty when absent)
    #[must_use]
    pub fn list(&self, name: &str) -> &[String] {
        self.lists.get(name).map_or(&[], Vec::as_slice)
    }

    /// Replace a named list
    pub fn set_list(&mut self, name: impl Into<String>, items: Vec<String>) {
        let _ = self.lists.insert(name.into(), items);
    }

    /// Move `item` from one list to the end of another. Returns whether it
    /// was present.
    pub fn move_item(&mut self, from: &str, to: &str, item: &str) -> bool {
        let Some(source) = self.lists.get_mut(from) else {
            return false;
        };
        let Some(pos) = source.iter().position(|i| i == item) else {
            return false;
        };
        let moved = source.remove(pos);
        self.lists.entry(to.to_string()).or_default().push(moved);
        true
    }

    /// Named scalar value
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set a named scalar value
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self.values.insert(name.into(), value.into());
    }
}

/// Test account known to the site
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Login email
    pub email: String,
    /// Password
    pub password: String,
    /// Path the login flow lands on
    pub landing: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("landing", &self.landing)
            .finish()
    }
}

// =============================================================================
// ROUTES / SITE
// =============================================================================

/// One servable page
#[derive(Clone)]
pub struct MockRoute {
    host: Option<String>,
    pattern: UrlPattern,
    renderer: Renderer,
    protected: bool,
    timing: LoadTiming,
    behaviours: Vec<Behaviour>,
}

impl fmt::Debug for MockRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRoute")
            .field("host", &self.host)
            .field("pattern", &self.pattern.pattern())
            .field("protected", &self.protected)
            .field("behaviours", &self.behaviours.len())
            .finish_non_exhaustive()
    }
}

impl MockRoute {
    /// Route serving fixed HTML
    #[must_use]
    pub fn html(pattern: &str, html: impl Into<String>) -> Self {
        let html = html.into();
        Self::render(pattern, move |_| html.clone())
    }

    /// Route rendering HTML per request
    #[must_use]
    pub fn render<F>(pattern: &str, renderer: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            host: None,
            pattern: UrlPattern::new(pattern),
            renderer: Arc::new(renderer),
            protected: false,
            timing: LoadTiming::default(),
            behaviours: Vec::new(),
        }
    }

    /// Only match requests to `host`
    #[must_use]
    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Require a signed-in context; others are sent to the login page
    #[must_use]
    pub const fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    /// Set load-state timing
    #[must_use]
    pub const fn with_timing(mut self, timing: LoadTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Bind an action to clicks on `selector`
    #[must_use]
    pub fn on_click(mut self, selector: impl Into<String>, action: MockAction) -> Self {
        self.behaviours.push(Behaviour {
            trigger: Trigger::Click,
            selector: selector.into(),
            action,
        });
        self
    }

    /// Bind an action to a key press on `selector`
    #[must_use]
    pub fn on_press(
        mut self,
        selector: impl Into<String>,
        key: impl Into<String>,
        action: MockAction,
    ) -> Self {
        self.behaviours.push(Behaviour {
            trigger: Trigger::Press(key.into()),
            selector: selector.into(),
            action,
        });
        self
    }

    /// Bind an action to value changes on `selector`
    #[must_use]
    pub fn on_change(mut self, selector: impl Into<String>, action: MockAction) -> Self {
        self.behaviours.push(Behaviour {
            trigger: Trigger::Change,
            selector: selector.into(),
            action,
        });
        self
    }

    fn matches(&self, url: &Url) -> bool {
        let host_ok = self
            .host
            .as_deref()
            .map_or(true, |h| url.host_str().is_some_and(|u| u.eq_ignore_ascii_case(h)));
        host_ok && self.pattern.matches(url.path())
    }
}

/// A page produced by [`MockSite::render`]
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Final URL after redirects
    pub url: Url,
    /// Document source
    pub html: String,
    /// Load-state timing
    pub timing: LoadTiming,
    /// Index of the serving route (`None` for the not-found page)
    pub route: Option<usize>,
}

/// A whole site for the in-memory engine
#[derive(Debug, Default)]
pub struct MockSite {
    routes: Vec<MockRoute>,
    behaviours: Vec<Behaviour>,
    accounts: Vec<Account>,
    login_path: Option<String>,
    store: Mutex<MockStore>,
}

impl MockSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route; earlier routes win
    #[must_use]
    pub fn route(mut self, route: MockRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// Site-wide click behaviour (after route behaviours)
    #[must_use]
    pub fn on_click(mut self, selector: impl Into<String>, action: MockAction) -> Self {
        self.behaviours.push(Behaviour {
            trigger: Trigger::Click,
            selector: selector.into(),
            action,
        });
        self
    }

    /// Register a test account
    #[must_use]
    pub fn account(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        landing: impl Into<String>,
    ) -> Self {
        self.accounts.push(Account {
            email: email.into(),
            password: password.into(),
            landing: landing.into(),
        });
        self
    }

    /// Path protected routes redirect to
    #[must_use]
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Seed a store list
    #[must_use]
    pub fn seed_list(self, name: &str, items: &[&str]) -> Self {
        if let Ok(mut store) = self.store.lock() {
            store.set_list(name, items.iter().map(ToString::to_string).collect());
        }
        self
    }

    /// Registered accounts
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Lock the shared store
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::InvalidState`] if the lock is poisoned.
    pub fn store(&self) -> PageKitResult<MutexGuard<'_, MockStore>> {
        self.store.lock().map_err(|_| PageKitError::InvalidState {
            message: "mock store lock poisoned".to_string(),
        })
    }

    /// Route by index
    #[must_use]
    pub fn route_at(&self, index: usize) -> Option<&MockRoute> {
        self.routes.get(index)
    }

    /// Behaviours in dispatch order for a page served by `route`
    pub(crate) fn behaviours_for(&self, route: Option<usize>) -> impl Iterator<Item = &Behaviour> {
        route
            .and_then(|r| self.routes.get(r))
            .map(|r| r.behaviours.as_slice())
            .unwrap_or_default()
            .iter()
            .chain(self.behaviours.iter())
    }

    pub(crate) fn accepts(behaviour: &Behaviour, fired: &Trigger) -> bool {
        behaviour.trigger.accepts(fired)
    }

    /// Render `url` for a context signed in as `account`, following login
    /// redirects for protected routes.
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::NavigationError`] on redirect loops.
    pub fn render(&self, url: &Url, account: Option<&str>) -> PageKitResult<Rendered> {
        let mut url = url.clone();
        for _ in 0..=MAX_REDIRECTS {
            let Some((index, route)) = self.routes.iter().enumerate().find(|(_, r)| r.matches(&url))
            else {
                return Ok(Rendered {
                    url,
                    html: NOT_FOUND_HTML.to_string(),
                    timing: LoadTiming::default(),
                    route: None,
                });
            };
            if route.protected && account.is_none() {
                if let Some(login) = &self.login_path {
                    let mut redirect = url.join(login).map_err(|e| PageKitError::NavigationError {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                    let _ = redirect
                        .query_pairs_mut()
                        .append_pair("destination", url.path());
                    tracing::debug!(from = %url, to = %redirect, "redirecting to login");
                    url = redirect;
                    continue;
                }
            }
            let params = route.pattern.extract_params(url.path());
            let store = self.store()?;
            let html = (route.renderer)(&RenderContext {
                url: &url,
                params: &params,
                account,
                store: &store,
            });
            return Ok(Rendered {
                url,
                html,
                timing: route.timing,
                route: Some(index),
            });
        }
        Err(PageKitError::NavigationError {
            url: url.to_string(),
            message: format!("more than {MAX_REDIRECTS} redirects"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn site() -> MockSite {
        MockSite::new()
            .login_path("/user/login")
            .route(MockRoute::html("/user/login", "<html><body><form></form></body></html>"))
            .route(
                MockRoute::render("/team/:team/reporting/:report", |ctx| {
                    format!(
                        "<html><body><h1>Report {} for {}</h1></body></html>",
                        ctx.params["report"],
                        ctx.account.unwrap_or("nobody")
                    )
                })
                .protected(),
            )
            .route(MockRoute::html("/", "<html><body>home</body></html>").on_host("feedback.example.com"))
            .account("admin@example.com", "secret", "/team/1/reporting/2")
            .seed_list("active", &["Mobile Manager Active LP"])
    }

    #[test]
    fn test_protected_route_redirects_to_login() {
        let site = site();
        let url = Url::parse("https://lms.example.com/team/1/reporting/2").unwrap();
        let rendered = site.render(&url, None).unwrap();
        assert_eq!(rendered.url.path(), "/user/login");
        assert_eq!(
            rendered.url.query(),
            Some("destination=%2Fteam%2F1%2Freporting%2F2")
        );
        let signed_in = site.render(&url, Some("admin@example.com")).unwrap();
        assert!(signed_in.html.contains("Report 2 for admin@example.com"));
    }

    #[test]
    fn test_unknown_route_renders_not_found() {
        let site = site();
        let url = Url::parse("https://lms.example.com/nowhere").unwrap();
        let rendered = site.render(&url, None).unwrap();
        assert!(rendered.route.is_none());
        assert!(rendered.html.contains("Page not found"));
    }

    #[test]
    fn test_host_restricted_routes() {
        let site = site();
        let other = Url::parse("https://lms.example.com/").unwrap();
        assert!(site.render(&other, None).unwrap().route.is_none());
        let feedback = Url::parse("https://feedback.example.com/").unwrap();
        assert!(site.render(&feedback, None).unwrap().html.contains("home"));
    }

    #[test]
    fn test_store_move_item() {
        let site = site();
        let mut store = site.store().unwrap();
        assert!(store.move_item("active", "archived", "Mobile Manager Active LP"));
        assert!(store.list("active").is_empty());
        assert_eq!(store.list("archived"), ["Mobile Manager Active LP".to_string()]);
        assert!(!store.move_item("active", "archived", "missing"));
    }

    #[test]
    fn test_account_debug_redacts_password() {
        let site = site();
        let text = format!("{:?}", site.accounts()[0]);
        assert!(!text.contains("secret"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn test_press_trigger_ignores_case() {
        assert!(Trigger::Press("Enter".into()).accepts(&Trigger::Press("enter".into())));
        assert!(!Trigger::Click.accepts(&Trigger::Change));
    }
}
