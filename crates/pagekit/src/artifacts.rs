//! Failure artifacts: screenshot and trace policies plus a recording
//! browser decorator that feeds an [`ExecutionTrace`].

use crate::driver::{
    BrowserDriver, BrowserEngine, ContextDriver, ElementAction, ElementInfo, PageDriver,
    PopupListener,
};
use crate::page::sanitize_file_name;
use crate::result::PageKitResult;
use crate::selector::LocatorDescriptor;
use crate::trace::{ExecutionTrace, TraceEventKind};
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

// =============================================================================
// POLICIES
// =============================================================================

/// When screenshots are taken at the end of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotPolicy {
    /// Never
    Off,
    /// After every attempt
    On,
    /// After failed attempts
    #[default]
    OnlyOnFailure,
}

impl ScreenshotPolicy {
    /// Whether an attempt with this outcome gets screenshots
    #[must_use]
    pub const fn should_capture(&self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::OnlyOnFailure => failed,
        }
    }
}

/// When traces are recorded and kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TracePolicy {
    /// Never
    Off,
    /// Every attempt
    On,
    /// Only the first retry (attempt 2)
    #[default]
    OnFirstRetry,
    /// Every attempt, kept only when it failed
    RetainOnFailure,
}

impl TracePolicy {
    /// Whether attempt `attempt` (1-based) is recorded
    #[must_use]
    pub const fn should_record(&self, attempt: u32) -> bool {
        match self {
            Self::Off => false,
            Self::On | Self::RetainOnFailure => true,
            Self::OnFirstRetry => attempt == 2,
        }
    }

    /// Whether a recorded attempt is written out
    #[must_use]
    pub const fn should_keep(&self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On | Self::OnFirstRetry => true,
            Self::RetainOnFailure => failed,
        }
    }
}

/// Artifact settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Screenshot policy
    pub screenshot: ScreenshotPolicy,
    /// Trace policy
    pub trace: TracePolicy,
}

/// Directory holding one test's artifacts: `<output>/<slug>`
#[must_use]
pub fn test_artifact_dir(output_dir: &Path, test_title: &str) -> PathBuf {
    output_dir.join(sanitize_file_name(&test_title.to_ascii_lowercase()))
}

// =============================================================================
// RECORDING DECORATOR
// =============================================================================

/// Browser decorator recording every driver call into a trace and
/// remembering the contexts it opened
pub struct RecordingBrowser {
    inner: Arc<dyn BrowserDriver>,
    trace: Option<Arc<ExecutionTrace>>,
    contexts: Mutex<Vec<Arc<dyn ContextDriver>>>,
}

impl fmt::Debug for RecordingBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingBrowser")
            .field("engine", &self.inner.engine())
            .field("tracing", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl RecordingBrowser {
    /// Wrap `inner`; without a trace only contexts are remembered
    #[must_use]
    pub fn new(inner: Arc<dyn BrowserDriver>, trace: Option<Arc<ExecutionTrace>>) -> Self {
        Self {
            inner,
            trace,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Contexts opened through this browser that are still open
    #[must_use]
    pub fn open_contexts(&self) -> Vec<Arc<dyn ContextDriver>> {
        self.contexts
            .lock()
            .map(|c| c.iter().filter(|c| !c.is_closed()).cloned().collect())
            .unwrap_or_default()
    }

    /// Screenshot every open page into `dir` as `<prefix>-<n>.png`
    ///
    /// Failures are logged and skipped; returns the written files.
    pub async fn capture_screenshots(&self, dir: &Path, prefix: &str) -> Vec<PathBuf> {
        let mut written = Vec::new();
        let pages: Vec<Arc<dyn PageDriver>> = self
            .open_contexts()
            .iter()
            .flat_map(|c| c.pages())
            .filter(|p| !p.is_closed())
            .collect();
        if pages.is_empty() {
            return written;
        }
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!(dir = %dir.display(), error = %e, "cannot create screenshot directory");
            return written;
        }
        for (n, page) in pages.iter().enumerate() {
            let path = dir.join(format!("{prefix}-{}.png", n + 1));
            match page.screenshot().await {
                Ok(bytes) => match tokio::fs::write(&path, bytes).await {
                    Ok(()) => written.push(path),
                    Err(e) => warn!(path = %path.display(), error = %e, "screenshot write failed"),
                },
                Err(e) => warn!(page = %page.id(), error = %e, "screenshot failed"),
            }
        }
        debug!(count = written.len(), "failure screenshots captured");
        written
    }
}

fn record<T>(
    trace: Option<&Arc<ExecutionTrace>>,
    target: &str,
    kind: TraceEventKind,
    result: &PageKitResult<T>,
) {
    if let Some(trace) = trace {
        trace.record(target, kind, result.as_ref().err().map(ToString::to_string));
    }
}

#[async_trait]
impl BrowserDriver for RecordingBrowser {
    fn engine(&self) -> BrowserEngine {
        self.inner.engine()
    }

    async fn new_context(&self) -> PageKitResult<Arc<dyn ContextDriver>> {
        let result = self.inner.new_context().await;
        let target = result.as_ref().map_or("browser", |c| c.id()).to_string();
        record(self.trace.as_ref(), &target, TraceEventKind::NewContext, &result);
        let context: Arc<dyn ContextDriver> = Arc::new(RecordingContext {
            inner: result?,
            trace: self.trace.clone(),
        });
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.push(Arc::clone(&context));
        }
        Ok(context)
    }

    async fn close(&self) -> PageKitResult<()> {
        self.inner.close().await
    }
}

#[derive(Debug)]
struct RecordingContext {
    inner: Arc<dyn ContextDriver>,
    trace: Option<Arc<ExecutionTrace>>,
}

fn wrap_page(inner: Arc<dyn PageDriver>, trace: Option<Arc<ExecutionTrace>>) -> Arc<dyn PageDriver> {
    Arc::new(RecordingPage { inner, trace })
}

#[async_trait]
impl ContextDriver for RecordingContext {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn new_page(&self) -> PageKitResult<Arc<dyn PageDriver>> {
        let result = self.inner.new_page().await;
        record(self.trace.as_ref(), self.inner.id(), TraceEventKind::NewPage, &result);
        Ok(wrap_page(result?, self.trace.clone()))
    }

    fn pages(&self) -> Vec<Arc<dyn PageDriver>> {
        self.inner
            .pages()
            .into_iter()
            .map(|p| wrap_page(p, self.trace.clone()))
            .collect()
    }

    async fn close(&self) -> PageKitResult<()> {
        let result = self.inner.close().await;
        record(self.trace.as_ref(), self.inner.id(), TraceEventKind::Close, &result);
        result
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[derive(Debug)]
struct RecordingPage {
    inner: Arc<dyn PageDriver>,
    trace: Option<Arc<ExecutionTrace>>,
}

#[async_trait]
impl PageDriver for RecordingPage {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn url(&self) -> String {
        self.inner.url()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    async fn goto(&self, url: &str) -> PageKitResult<()> {
        let result = self.inner.goto(url).await;
        record(
            self.trace.as_ref(),
            self.id(),
            TraceEventKind::Navigate {
                url: url.to_string(),
            },
            &result,
        );
        result
    }

    async fn load_state_reached(&self, state: LoadState) -> PageKitResult<bool> {
        self.inner.load_state_reached(state).await
    }

    async fn query(&self, locator: &LocatorDescriptor) -> PageKitResult<Vec<ElementInfo>> {
        let result = self.inner.query(locator).await;
        let matched = result.as_ref().map_or(0, Vec::len);
        record(
            self.trace.as_ref(),
            self.id(),
            TraceEventKind::Query {
                locator: locator.to_string(),
                matched,
            },
            &result,
        );
        result
    }

    async fn perform(
        &self,
        locator: &LocatorDescriptor,
        index: usize,
        action: &ElementAction,
    ) -> PageKitResult<()> {
        let result = self.inner.perform(locator, index, action).await;
        record(
            self.trace.as_ref(),
            self.id(),
            TraceEventKind::Action {
                locator: locator.to_string(),
                action: action.verb().to_string(),
            },
            &result,
        );
        result
    }

    async fn subscribe_popups(&self) -> PageKitResult<PopupListener> {
        let mut inner = self.inner.subscribe_popups().await?;
        let (sender, listener) = PopupListener::channel();
        let trace = self.trace.clone();
        let opener = self.id().to_string();
        let task = tokio::spawn(async move {
            // Forward until the outer listener goes away
            while let Some(popup) = inner.next_popup(std::time::Duration::from_secs(3600)).await {
                if let Some(trace) = &trace {
                    trace.record(&opener, TraceEventKind::Popup { url: popup.url() }, None);
                }
                if sender.send(wrap_page(popup, trace.clone())).is_err() {
                    break;
                }
            }
        });
        Ok(listener.with_task(task))
    }

    async fn screenshot(&self) -> PageKitResult<Vec<u8>> {
        let result = self.inner.screenshot().await;
        record(self.trace.as_ref(), self.id(), TraceEventKind::Screenshot, &result);
        result
    }

    async fn close(&self) -> PageKitResult<()> {
        let result = self.inner.close().await;
        record(self.trace.as_ref(), self.id(), TraceEventKind::Close, &result);
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockBrowser, MockRoute, MockSite};
    use crate::page::{Page, PageSettings};
    use crate::selector::AriaRole;
    use crate::wait::Timeouts;
    use std::time::Duration;
    use url::Url;

    mod policy_tests {
        use super::*;

        #[test]
        fn test_screenshot_policy() {
            assert!(ScreenshotPolicy::OnlyOnFailure.should_capture(true));
            assert!(!ScreenshotPolicy::OnlyOnFailure.should_capture(false));
            assert!(ScreenshotPolicy::On.should_capture(false));
            assert!(!ScreenshotPolicy::Off.should_capture(true));
        }

        #[test]
        fn test_trace_policy() {
            assert!(!TracePolicy::OnFirstRetry.should_record(1));
            assert!(TracePolicy::OnFirstRetry.should_record(2));
            assert!(!TracePolicy::OnFirstRetry.should_record(3));
            assert!(TracePolicy::RetainOnFailure.should_record(1));
            assert!(!TracePolicy::RetainOnFailure.should_keep(false));
            assert!(!TracePolicy::Off.should_record(2));
        }

        #[test]
        fn test_policy_names() {
            let config: ArtifactConfig =
                serde_yaml_ng::from_str("screenshot: only-on-failure\ntrace: retain-on-failure\n")
                    .unwrap();
            assert_eq!(config.screenshot, ScreenshotPolicy::OnlyOnFailure);
            assert_eq!(config.trace, TracePolicy::RetainOnFailure);
        }

        #[test]
        fn test_artifact_dir_slug() {
            assert_eq!(
                test_artifact_dir(Path::new("out"), "Student > Leaderboard: export"),
                Path::new("out").join("student---leaderboard--export")
            );
        }
    }

    mod recording_tests {
        use super::*;

        fn site() -> MockSite {
            MockSite::new()
                .route(
                    MockRoute::html("/", "<html><body>Ideas</body></html>")
                        .on_host("ideas.example.com"),
                )
                .route(MockRoute::html(
                    "/",
                    r#"<html><body>
                        <a href="https://ideas.example.com/" target="_blank">Send Ideas</a>
                    </body></html>"#,
                ))
        }

        #[tokio::test]
        async fn test_calls_and_popups_are_traced() {
            let mock: Arc<dyn BrowserDriver> = Arc::new(MockBrowser::new(site()));
            let trace = Arc::new(ExecutionTrace::new("t", 1));
            let browser = RecordingBrowser::new(mock, Some(Arc::clone(&trace)));
            let context = browser.new_context().await.unwrap();
            let settings = PageSettings::default()
                .with_base_url(Url::parse("https://lms.example.com/").unwrap())
                .with_timeouts(
                    Timeouts::default()
                        .with_navigation(Duration::from_millis(300))
                        .with_poll_interval(Duration::from_millis(10)),
                );
            let page = Page::new(context.new_page().await.unwrap(), settings);
            page.goto("/").await.unwrap();
            let link = page.get_by_role(AriaRole::Link).named("Send Ideas");
            let popup = page
                .expect_popup(|| link.click(), LoadState::Load)
                .await
                .unwrap();
            popup.close().await.unwrap();

            let kinds: Vec<String> = trace
                .archive()
                .events
                .iter()
                .map(|e| serde_json::to_value(&e.kind).unwrap()["kind"].as_str().unwrap().to_string())
                .collect();
            for expected in ["new_context", "new_page", "navigate", "action", "popup", "close"] {
                assert!(kinds.iter().any(|k| k == expected), "missing {expected} in {kinds:?}");
            }
            assert_eq!(browser.open_contexts().len(), 1);
        }

        #[tokio::test]
        async fn test_capture_screenshots_of_open_pages() {
            let mock: Arc<dyn BrowserDriver> = Arc::new(MockBrowser::new(site()));
            let browser = RecordingBrowser::new(mock, None);
            let context = browser.new_context().await.unwrap();
            let _first = context.new_page().await.unwrap();
            let _second = context.new_page().await.unwrap();
            let dir = tempfile::tempdir().unwrap();
            let written = browser.capture_screenshots(dir.path(), "failure").await;
            assert_eq!(written.len(), 2);
            assert!(dir.path().join("failure-2.png").exists());
            context.close().await.unwrap();
            assert!(browser.open_contexts().is_empty());
        }
    }
}
