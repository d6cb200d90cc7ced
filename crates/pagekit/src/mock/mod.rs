//! In-memory browser engine.
//!
//! Serves a declarative [`MockSite`] through the same driver traits as the
//! CDP backend, so page objects, fixtures and scenarios run unchanged and
//! offline. Locator resolution follows the same rules as the in-page
//! resolver used by the `chromium` engine.
//!
//! ```
//! use pagekit::mock::{MockAction, MockBrowser, MockRoute, MockSite};
//!
//! let site = MockSite::new().route(
//!     MockRoute::html("/", r#"<html><body>
//!         <button id="open">Contact Support</button>
//!         <div data-fragment="support" role="dialog">Contact Support</div>
//!     </body></html>"#)
//!     .on_click("#open", MockAction::Show("support".into())),
//! );
//! let browser = MockBrowser::new(site);
//! # let _ = browser;
//! ```

mod dom;
mod engine;
mod site;

pub use dom::{DomState, FragmentState, Snapshot, FRAGMENT_ATTR, FRAGMENT_INITIAL_ATTR};
pub use engine::{MockBrowser, MockContext, MockPage};
pub use site::{
    Account, ActionContext, Behaviour, CustomAction, Effect, LoadTiming, MockAction, MockRoute,
    MockSite, MockStore, RenderContext, Renderer, Rendered, Trigger,
};
