//! Driver abstraction over browser engines.
//!
//! The three traits mirror the browser object model: a [`BrowserDriver`]
//! hands out isolated [`ContextDriver`]s (one cookie jar each), and a context
//! owns [`PageDriver`]s (tabs). Everything above this module (locators,
//! pages, page objects, sessions) talks to these traits only, so the CDP
//! backend and the in-memory engine are interchangeable.
//!
//! Element interaction is expressed as a descriptor plus an index into its
//! match set: engines never hand out element handles that could go stale.

use crate::result::PageKitResult;
use crate::selector::LocatorDescriptor;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// =============================================================================
// ENGINE / CONFIG
// =============================================================================

/// Which engine drives the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Chromium over the `DevTools` protocol
    #[default]
    Chromium,
    /// In-memory engine over static HTML
    Mock,
}

impl BrowserEngine {
    /// Engine name as used on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BrowserEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Self::Chromium),
            "mock" => Ok(Self::Mock),
            other => Err(format!("unknown browser engine '{other}'")),
        }
    }
}

/// Launch configuration for a browser driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Explicit browser executable
    pub executable: Option<PathBuf>,
    /// Keep the browser sandbox enabled
    pub sandbox: bool,
    /// Budget for launching the browser and opening pages
    pub launch_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            executable: None,
            sandbox: true,
            launch_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create a new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set the browser executable
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Disable the sandbox (containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// Snapshot of one resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Stable structural identity (tag/sibling-index path from the root)
    pub key: String,
    /// Lower-case tag name
    pub tag: String,
    /// Whitespace-normalized text content
    pub text: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Current value of form controls
    #[serde(default)]
    pub value: Option<String>,
    /// Checked state of checkboxes and radios
    #[serde(default)]
    pub checked: Option<bool>,
    /// Element attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ElementInfo {
    /// Attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Interaction applied to one element of a match set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementAction {
    /// Mouse click
    Click,
    /// Replace the value of an editable element
    Fill {
        /// New value
        value: String,
    },
    /// Empty an editable element
    Clear,
    /// Key press while focused (`Enter`, `Escape`, ...)
    Press {
        /// Key name
        key: String,
    },
    /// Set a checkbox/radio state
    SetChecked {
        /// Target state
        checked: bool,
    },
    /// Select an `<option>` by value or label
    SelectOption {
        /// Option value or label
        value: String,
    },
    /// Scroll the element into the viewport
    ScrollIntoView,
}

impl ElementAction {
    /// Short verb for logs and error messages
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Fill { .. } => "fill",
            Self::Clear => "clear",
            Self::Press { .. } => "press",
            Self::SetChecked { checked: true } => "check",
            Self::SetChecked { checked: false } => "uncheck",
            Self::SelectOption { .. } => "select_option",
            Self::ScrollIntoView => "scroll_into_view",
        }
    }

    /// Whether the target must be visible before acting
    #[must_use]
    pub const fn requires_visible(&self) -> bool {
        true
    }
}

// =============================================================================
// POPUPS
// =============================================================================

/// Sending half of a popup subscription, held by engines
pub type PopupSender = mpsc::UnboundedSender<Arc<dyn PageDriver>>;

/// Subscription to pages opened by one page (new tabs/windows).
///
/// Only pages opened after the subscription was created are delivered.
#[derive(Debug)]
pub struct PopupListener {
    receiver: mpsc::UnboundedReceiver<Arc<dyn PageDriver>>,
    task: Option<JoinHandle<()>>,
}

impl PopupListener {
    /// Create a subscription and the sender engines push popups into
    #[must_use]
    pub fn channel() -> (PopupSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            sender,
            Self {
                receiver,
                task: None,
            },
        )
    }

    /// Tie a background task to the subscription; it is aborted on drop
    #[must_use]
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Wait up to `timeout` for the next popup
    pub async fn next_popup(&mut self, timeout: Duration) -> Option<Arc<dyn PageDriver>> {
        tokio::time::timeout(timeout, self.receiver.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for PopupListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// A launched browser
#[async_trait]
pub trait BrowserDriver: Send + Sync + fmt::Debug {
    /// Engine behind this driver
    fn engine(&self) -> BrowserEngine;

    /// Open a new isolated context (separate cookies and storage)
    async fn new_context(&self) -> PageKitResult<Arc<dyn ContextDriver>>;

    /// Shut the browser down
    async fn close(&self) -> PageKitResult<()>;
}

/// An isolated browsing context
#[async_trait]
pub trait ContextDriver: Send + Sync + fmt::Debug {
    /// Context identifier
    fn id(&self) -> &str;

    /// Open a blank page
    async fn new_page(&self) -> PageKitResult<Arc<dyn PageDriver>>;

    /// Pages that are still open, opener pages first
    fn pages(&self) -> Vec<Arc<dyn PageDriver>>;

    /// Close the context and every page in it
    async fn close(&self) -> PageKitResult<()>;

    /// Whether [`ContextDriver::close`] ran
    fn is_closed(&self) -> bool;
}

/// One tab
#[async_trait]
pub trait PageDriver: Send + Sync + fmt::Debug {
    /// Page identifier
    fn id(&self) -> &str;

    /// Current URL, as last committed by navigation
    fn url(&self) -> String;

    /// Whether the page was closed
    fn is_closed(&self) -> bool;

    /// Start navigating to an absolute URL and return once it is committed
    async fn goto(&self, url: &str) -> PageKitResult<()>;

    /// Whether the current document reached `state`
    async fn load_state_reached(&self, state: LoadState) -> PageKitResult<bool>;

    /// Resolve a descriptor against the current DOM, in document order
    async fn query(&self, locator: &LocatorDescriptor) -> PageKitResult<Vec<ElementInfo>>;

    /// Apply `action` to match `index` of `locator`
    async fn perform(
        &self,
        locator: &LocatorDescriptor,
        index: usize,
        action: &ElementAction,
    ) -> PageKitResult<()>;

    /// Subscribe to pages this page opens from now on
    async fn subscribe_popups(&self) -> PageKitResult<PopupListener>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> PageKitResult<Vec<u8>>;

    /// Close the page; other pages of the context are unaffected
    async fn close(&self) -> PageKitResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_parsing() {
        assert_eq!("chromium".parse::<BrowserEngine>(), Ok(BrowserEngine::Chromium));
        assert_eq!("Mock".parse::<BrowserEngine>(), Ok(BrowserEngine::Mock));
        assert!("webkit".parse::<BrowserEngine>().is_err());
        assert_eq!(BrowserEngine::default().to_string(), "chromium");
    }

    #[test]
    fn test_driver_config_builder() {
        let config = DriverConfig::new()
            .with_headless(false)
            .with_viewport(800, 600)
            .with_executable("/usr/bin/chromium")
            .with_no_sandbox();
        assert!(!config.headless);
        assert_eq!((config.viewport_width, config.viewport_height), (800, 600));
        assert!(!config.sandbox);
        assert_eq!(config.executable, Some(PathBuf::from("/usr/bin/chromium")));
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_value(ElementAction::Fill {
            value: "santi".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "fill");
        assert_eq!(json["value"], "santi");
        assert_eq!(ElementAction::SetChecked { checked: false }.verb(), "uncheck");
    }

    #[test]
    fn test_element_info_deserializes_with_defaults() {
        let info: ElementInfo = serde_json::from_str(
            r#"{"key":"html:0/body:0/a:0","tag":"a","text":"Next","visible":true}"#,
        )
        .unwrap();
        assert_eq!(info.value, None);
        assert!(info.attributes.is_empty());
        assert_eq!(info.attribute("href"), None);
    }

    #[tokio::test]
    async fn test_popup_listener_times_out_without_popups() {
        let (_sender, mut listener) = PopupListener::channel();
        assert!(listener
            .next_popup(Duration::from_millis(10))
            .await
            .is_none());
    }
}
