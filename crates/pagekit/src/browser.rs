//! Chromium driver over the `DevTools` protocol.
//!
//! Every context is its own browser process with a throwaway profile
//! directory, which gives contexts separate cookie jars without relying on
//! CDP browser contexts. Locators are resolved in the page by `resolver.js`,
//! which follows the same matching rules as the in-memory engine.

use crate::driver::{
    BrowserDriver, BrowserEngine, ContextDriver, DriverConfig, ElementAction, ElementInfo,
    PageDriver, PopupListener,
};
use crate::result::{PageKitError, PageKitResult};
use crate::selector::LocatorDescriptor;
use crate::wait::{LoadState, NETWORK_IDLE_THRESHOLD_MS};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventFrameNavigated, EventNavigatedWithinDocument,
};
use chromiumoxide::cdp::browser_protocol::target::{EventTargetCreated, TargetId};
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;

const RESOLVER: &str = include_str!("resolver.js");
const BLANK_URL: &str = "about:blank";
const TARGET_ATTR: &str = "data-pagekit-target";
const POPUP_ATTACH_ATTEMPTS: u32 = 50;
const POPUP_ATTACH_INTERVAL: Duration = Duration::from_millis(100);

fn poisoned(what: &str) -> PageKitError {
    PageKitError::InvalidState {
        message: format!("{what} lock poisoned"),
    }
}

fn page_error(e: impl std::fmt::Display) -> PageKitError {
    PageKitError::PageError {
        message: e.to_string(),
    }
}

/// What every resolver entry point returns
#[derive(Debug, Deserialize)]
struct Reply {
    href: String,
    ready: String,
    #[serde(default)]
    idle: bool,
    #[serde(default)]
    elements: Vec<ElementInfo>,
    #[serde(default)]
    error: Option<String>,
}

impl Reply {
    fn into_result(self) -> PageKitResult<Self> {
        match self.error {
            Some(message) => Err(PageKitError::PageError { message }),
            None => Ok(self),
        }
    }
}

fn script(call: &str) -> String {
    format!("{RESOLVER}\n{call}")
}

// =============================================================================
// BROWSER
// =============================================================================

/// Chromium launcher; each context is a separate browser process
#[derive(Debug)]
pub struct ChromiumBrowser {
    config: DriverConfig,
    contexts: Mutex<Vec<Arc<ChromiumContext>>>,
    counter: AtomicU64,
    closed: AtomicBool,
}

impl ChromiumBrowser {
    /// Driver launching chromium with `config`
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            contexts: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Launch configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    async fn launch(&self, id: String) -> PageKitResult<Arc<ChromiumContext>> {
        let profile = tempfile::Builder::new().prefix("pagekit-profile-").tempdir()?;

        let mut builder = CdpConfig::builder()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .request_timeout(self.config.launch_timeout)
            .user_data_dir(profile.path());

        if !self.config.headless {
            builder = builder.with_head();
        }

        if !self.config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = self.config.executable {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| PageKitError::BrowserLaunchError { message })?;

        let launched = tokio::time::timeout(self.config.launch_timeout, CdpBrowser::launch(cdp_config))
            .await
            .map_err(|_| PageKitError::BrowserLaunchError {
                message: format!(
                    "chromium did not start within {}ms",
                    self.config.launch_timeout.as_millis()
                ),
            })?;
        let (browser, mut handler) = launched.map_err(|e| PageKitError::BrowserLaunchError {
            message: e.to_string(),
        })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(context = %id, profile = %profile.path().display(), "chromium context launched");
        Ok(ChromiumContext::new(id, browser, handle, profile))
    }
}

#[async_trait]
impl BrowserDriver for ChromiumBrowser {
    fn engine(&self) -> BrowserEngine {
        BrowserEngine::Chromium
    }

    async fn new_context(&self) -> PageKitResult<Arc<dyn ContextDriver>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::InvalidState {
                message: "browser is closed".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let context = self.launch(format!("chromium-context-{n}")).await?;
        self.contexts
            .lock()
            .map_err(|_| poisoned("browser"))?
            .push(Arc::clone(&context));
        Ok(context)
    }

    async fn close(&self) -> PageKitResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        let contexts: Vec<Arc<ChromiumContext>> =
            std::mem::take(&mut *self.contexts.lock().map_err(|_| poisoned("browser"))?);
        let mut first_error = None;
        for context in contexts {
            if let Err(e) = context.shutdown().await {
                tracing::warn!(context = %context.id, error = %e, "closing chromium context failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// One chromium process with its own profile
#[derive(Debug)]
pub struct ChromiumContext {
    id: String,
    me: Weak<ChromiumContext>,
    browser: tokio::sync::Mutex<CdpBrowser>,
    handler: Mutex<Option<JoinHandle<()>>>,
    pages: Mutex<Vec<Arc<ChromiumPage>>>,
    counter: AtomicU64,
    closed: AtomicBool,
    _profile: TempDir,
}

impl ChromiumContext {
    fn new(id: String, browser: CdpBrowser, handler: JoinHandle<()>, profile: TempDir) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id,
            me: me.clone(),
            browser: tokio::sync::Mutex::new(browser),
            handler: Mutex::new(Some(handler)),
            pages: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            _profile: profile,
        })
    }

    fn ensure_open(&self) -> PageKitResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::InvalidState {
                message: format!("context {} is closed", self.id),
            });
        }
        Ok(())
    }

    async fn register(&self, inner: CdpPage) -> PageKitResult<Arc<ChromiumPage>> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let page = ChromiumPage::attach(format!("{}-page-{n}", self.id), inner, self.me.clone()).await?;
        self.pages
            .lock()
            .map_err(|_| poisoned("context"))?
            .push(Arc::clone(&page));
        Ok(page)
    }

    /// Wrap a target the browser opened on its own (a popup)
    async fn adopt(&self, target: &TargetId) -> PageKitResult<Arc<ChromiumPage>> {
        for _ in 0..POPUP_ATTACH_ATTEMPTS {
            let found = {
                let browser = self.browser.lock().await;
                browser
                    .pages()
                    .await
                    .map_err(page_error)?
                    .into_iter()
                    .find(|p| p.target_id() == target)
            };
            if let Some(inner) = found {
                return self.register(inner).await;
            }
            tokio::time::sleep(POPUP_ATTACH_INTERVAL).await;
        }
        Err(PageKitError::PageError {
            message: format!("popup target {target:?} never attached"),
        })
    }

    fn forget(&self, page_id: &str) {
        if let Ok(mut pages) = self.pages.lock() {
            pages.retain(|p| p.id != page_id);
        }
    }

    async fn shutdown(&self) -> PageKitResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let pages: Vec<Arc<ChromiumPage>> =
            std::mem::take(&mut *self.pages.lock().map_err(|_| poisoned("context"))?);
        for page in pages {
            page.mark_closed();
        }
        let result = {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map(|_| ())
                .map_err(|e| PageKitError::BrowserLaunchError {
                    message: e.to_string(),
                })
        };
        if let Some(handler) = self.handler.lock().map_err(|_| poisoned("context"))?.take() {
            handler.abort();
        }
        tracing::debug!(context = %self.id, "chromium context closed");
        result
    }
}

#[async_trait]
impl ContextDriver for ChromiumContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self) -> PageKitResult<Arc<dyn PageDriver>> {
        self.ensure_open()?;
        let inner = {
            let browser = self.browser.lock().await;
            browser.new_page(BLANK_URL).await.map_err(page_error)?
        };
        let page: Arc<dyn PageDriver> = self.register(inner).await?;
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
        self.shutdown().await
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// =============================================================================
// PAGE
// =============================================================================

/// One chromium tab
#[derive(Debug)]
pub struct ChromiumPage {
    id: String,
    inner: CdpPage,
    context: Weak<ChromiumContext>,
    url: Arc<Mutex<String>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl ChromiumPage {
    async fn attach(
        id: String,
        inner: CdpPage,
        context: Weak<ChromiumContext>,
    ) -> PageKitResult<Arc<Self>> {
        let initial = inner
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| BLANK_URL.to_string());
        let url = Arc::new(Mutex::new(initial));

        // Main-frame navigations, including same-document ones, keep the
        // cached URL current for the synchronous `url()` accessor.
        let mut navigated = inner
            .event_listener::<EventFrameNavigated>()
            .await
            .map_err(page_error)?;
        let mut within = inner
            .event_listener::<EventNavigatedWithinDocument>()
            .await
            .map_err(page_error)?;
        let mut main_frame = inner.mainframe().await.ok().flatten();
        let cache = Arc::clone(&url);
        let watcher = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = navigated.next() => {
                        if event.frame.parent_id.is_none() {
                            main_frame = Some(event.frame.id.clone());
                            let href = format!(
                                "{}{}",
                                event.frame.url,
                                event.frame.url_fragment.as_deref().unwrap_or_default()
                            );
                            if let Ok(mut current) = cache.lock() {
                                *current = href;
                            }
                        }
                    }
                    Some(event) = within.next() => {
                        if main_frame.as_ref() == Some(&event.frame_id) {
                            if let Ok(mut current) = cache.lock() {
                                current.clone_from(&event.url);
                            }
                        }
                    }
                    else => break,
                }
            }
        });

        Ok(Arc::new(Self {
            id,
            inner,
            context,
            url,
            watcher: Mutex::new(Some(watcher)),
            closed: AtomicBool::new(false),
        }))
    }

    fn ensure_open(&self) -> PageKitResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PageKitError::PageClosed {
                page: self.id.clone(),
            });
        }
        Ok(())
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(task) = watcher.take() {
                task.abort();
            }
        }
    }

    fn remember_url(&self, href: &str) {
        if let Ok(mut current) = self.url.lock() {
            if *current != href {
                *current = href.to_string();
            }
        }
    }

    async fn call(&self, call: &str) -> PageKitResult<Reply> {
        self.ensure_open()?;
        let reply: Reply = self
            .inner
            .evaluate(script(call))
            .await
            .map_err(page_error)?
            .into_value()
            .map_err(page_error)?;
        self.remember_url(&reply.href);
        Ok(reply)
    }

    async fn mark(&self, locator: &LocatorDescriptor, index: usize, token: &str) -> PageKitResult<ElementInfo> {
        let descriptor = serde_json::to_string(locator)?;
        let token_json = serde_json::to_string(token)?;
        let reply = self
            .call(&format!("window.__pagekit.mark({descriptor}, {index}, {token_json})"))
            .await?
            .into_result()
            .map_err(|e| PageKitError::PageError {
                message: format!("{}: {e}", locator.to_string()),
            })?;
        reply
            .elements
            .into_iter()
            .next()
            .ok_or_else(|| PageKitError::PageError {
                message: format!("{}: target vanished", locator.to_string()),
            })
    }

    async fn act(&self, token: &str, info: &ElementInfo, action: &ElementAction) -> PageKitResult<()> {
        let token_json = serde_json::to_string(token)?;
        let element = self
            .inner
            .find_element(format!("[{TARGET_ATTR}=\"{token}\"]"))
            .await
            .map_err(page_error)?;
        match action {
            ElementAction::Click => {
                element.click().await.map_err(page_error)?;
            }
            ElementAction::Fill { value } => {
                self.call(&format!("window.__pagekit.clear({token_json})"))
                    .await?
                    .into_result()?;
                element.focus().await.map_err(page_error)?;
                element.type_str(value).await.map_err(page_error)?;
            }
            ElementAction::Clear => {
                self.call(&format!("window.__pagekit.clear({token_json})"))
                    .await?
                    .into_result()?;
            }
            ElementAction::Press { key } => {
                element.focus().await.map_err(page_error)?;
                element.press_key(key).await.map_err(page_error)?;
            }
            ElementAction::SetChecked { checked } => {
                if info.checked.is_none() {
                    return Err(PageKitError::PageError {
                        message: format!("<{}> is not a checkbox or radio", info.tag),
                    });
                }
                if info.checked != Some(*checked) {
                    element.click().await.map_err(page_error)?;
                }
            }
            ElementAction::SelectOption { value } => {
                let wanted = serde_json::to_string(value)?;
                self.call(&format!("window.__pagekit.select({token_json}, {wanted})"))
                    .await?
                    .into_result()?;
            }
            ElementAction::ScrollIntoView => {
                element.scroll_into_view().await.map_err(page_error)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    fn id(&self) -> &str {
        &self.id
    }

    fn url(&self) -> String {
        self.url
            .lock()
            .map(|u| u.clone())
            .unwrap_or_else(|_| BLANK_URL.to_string())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn goto(&self, url: &str) -> PageKitResult<()> {
        self.ensure_open()?;
        self.inner
            .goto(url)
            .await
            .map_err(|e| PageKitError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if let Ok(Some(committed)) = self.inner.url().await {
            self.remember_url(&committed);
        }
        tracing::debug!(page = %self.id, url = %url, "chromium navigation committed");
        Ok(())
    }

    async fn load_state_reached(&self, state: LoadState) -> PageKitResult<bool> {
        let reply = self
            .call(&format!("window.__pagekit.state({NETWORK_IDLE_THRESHOLD_MS})"))
            .await?;
        Ok(match state {
            LoadState::DomContentLoaded => reply.ready != "loading",
            LoadState::Load => reply.ready == "complete",
            LoadState::NetworkIdle => reply.idle,
        })
    }

    async fn query(&self, locator: &LocatorDescriptor) -> PageKitResult<Vec<ElementInfo>> {
        let descriptor = serde_json::to_string(locator)?;
        let reply = self
            .call(&format!("window.__pagekit.query({descriptor})"))
            .await?
            .into_result()
            .map_err(|e| PageKitError::InvalidLocator {
                description: locator.to_string(),
                message: e.to_string(),
            })?;
        Ok(reply.elements)
    }

    async fn perform(
        &self,
        locator: &LocatorDescriptor,
        index: usize,
        action: &ElementAction,
    ) -> PageKitResult<()> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let info = self.mark(locator, index, &token).await?;
        let result = self.act(&token, &info, action).await;
        // The action may have navigated away; a failed unmark is harmless then.
        if let Ok(token_json) = serde_json::to_string(&token) {
            let _ = self
                .call(&format!("window.__pagekit.unmark({token_json})"))
                .await;
        }
        tracing::trace!(page = %self.id, verb = action.verb(), locator = %locator.to_string(), "chromium action");
        result
    }

    async fn subscribe_popups(&self) -> PageKitResult<PopupListener> {
        self.ensure_open()?;
        let context = self.context.upgrade().ok_or_else(|| PageKitError::InvalidState {
            message: format!("context of page {} is gone", self.id),
        })?;
        let mut created = {
            let browser = context.browser.lock().await;
            browser
                .event_listener::<EventTargetCreated>()
                .await
                .map_err(page_error)?
        };
        let opener = self.inner.target_id().clone();
        let weak = Arc::downgrade(&context);
        drop(context);

        let (sender, listener) = PopupListener::channel();
        let task = tokio::spawn(async move {
            while let Some(event) = created.next().await {
                let info = &event.target_info;
                if info.r#type != "page" || info.opener_id.as_ref() != Some(&opener) {
                    continue;
                }
                let Some(context) = weak.upgrade() else {
                    break;
                };
                match context.adopt(&info.target_id).await {
                    Ok(popup) => {
                        tracing::debug!(popup = %popup.id, "chromium popup opened");
                        if sender.send(popup as Arc<dyn PageDriver>).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "popup could not be attached"),
                }
            }
        });
        Ok(listener.with_task(task))
    }

    async fn screenshot(&self) -> PageKitResult<Vec<u8>> {
        self.ensure_open()?;
        self.inner
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await
            .map_err(page_error)
    }

    async fn close(&self) -> PageKitResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.mark_closed();
        if let Some(context) = self.context.upgrade() {
            context.forget(&self.id);
        }
        self.inner.clone().close().await.map_err(page_error)?;
        tracing::debug!(page = %self.id, "chromium page closed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_error_becomes_page_error() {
        let reply: Reply = serde_json::from_str(
            r#"{"href":"about:blank","ready":"complete","error":"element is not visible"}"#,
        )
        .unwrap();
        assert!(reply.elements.is_empty());
        assert!(!reply.idle);
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Page error: element is not visible");
    }

    #[test]
    fn test_reply_carries_elements() {
        let reply: Reply = serde_json::from_str::<Reply>(
            r#"{"href":"https://x.test/user/login","ready":"interactive","elements":[
                {"key":"html:0/body:1/input:0","tag":"input","text":"","visible":true,
                 "value":"","checked":null,"attributes":{"id":"email-only"}}]}"#,
        )
        .unwrap()
        .into_result()
        .unwrap();
        assert_eq!(reply.ready, "interactive");
        assert_eq!(reply.elements[0].attribute("id"), Some("email-only"));
    }

    #[test]
    fn test_script_installs_resolver_before_call() {
        let s = script("window.__pagekit.query({\"steps\":[]})");
        assert!(s.starts_with("// In-page locator resolver"));
        assert!(s.ends_with("window.__pagekit.query({\"steps\":[]})"));
    }

    #[tokio::test]
    async fn test_closed_browser_refuses_contexts() {
        let browser = ChromiumBrowser::new(DriverConfig::default());
        browser.close().await.unwrap();
        assert!(matches!(
            browser.new_context().await,
            Err(PageKitError::InvalidState { .. })
        ));
        assert_eq!(browser.engine(), BrowserEngine::Chromium);
    }
}
