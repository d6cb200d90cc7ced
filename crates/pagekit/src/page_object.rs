//! Page Object Model support.
//!
//! A page object embeds a [`Page`] and a set of [`Locator`]s built from it.
//! Construction performs no I/O; every method that touches the browser is
//! async and goes through the embedded page.

use crate::locator::Locator;
use crate::page::Page;
use crate::result::{PageKitError, PageKitResult};
use crate::selector::TextMatch;
use crate::wait::LoadState;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Trait for page objects representing a page, tab, modal or component.
///
/// # Example
///
/// ```
/// use pagekit::{AriaRole, Locator, Page, PageObject};
///
/// struct LoginPage {
///     page: Page,
///     email: Locator,
/// }
///
/// impl LoginPage {
///     fn new(page: Page) -> Self {
///         Self { email: page.get_by_role(AriaRole::Textbox).named("Email"), page }
///     }
/// }
///
/// impl PageObject for LoginPage {
///     fn page(&self) -> &Page {
///         &self.page
///     }
///
///     fn path(&self) -> &str {
///         "/user/login"
///     }
///
///     fn rebind(&self, page: Page) -> Self {
///         Self::new(page)
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Embedded page handle
    fn page(&self) -> &Page;

    /// Path (relative to the base URL) that [`Self::goto`] opens
    fn path(&self) -> &str;

    /// Substring of the URL proving the browser is on this page
    fn url_marker(&self) -> &str {
        self.path()
    }

    /// Readiness [`Self::goto`] waits for
    fn load_state(&self) -> LoadState {
        LoadState::Load
    }

    /// Short name for logs and reports
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Navigate to [`Self::path`]
    ///
    /// # Errors
    ///
    /// Navigation errors and timeouts from [`Page::navigate`].
    async fn goto(&self) -> PageKitResult<()> {
        debug!(page_object = self.name(), path = self.path(), "goto");
        self.page().navigate(self.path(), self.load_state()).await
    }

    /// Whether the current URL contains [`Self::url_marker`]
    fn is_on_correct_url(&self) -> bool {
        self.page().url_contains(self.url_marker())
    }

    /// The same page object over another page (a new tab)
    fn rebind(&self, page: Page) -> Self
    where
        Self: Sized;
}

// =============================================================================
// URL PATTERNS
// =============================================================================

/// Path pattern for page objects and routes
///
/// Patterns support literal segments (`/login`), wildcards (`/team/*`) and
/// named parameters (`/team/:team/reporting/:report`). Wildcards and
/// parameters each consume exactly one segment; `**` as the last segment
/// consumes the rest of the path, including nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Rest,
    Parameter(String),
}

impl UrlPattern {
    /// Parse a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split(pattern)
            .map(|s| match s {
                "*" => UrlSegment::Wildcard,
                "**" => UrlSegment::Rest,
                _ => s.strip_prefix(':').map_or_else(
                    || UrlSegment::Literal(s.to_string()),
                    |name| UrlSegment::Parameter(name.to_string()),
                ),
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether `path` matches; query and fragment are ignored
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = split(strip_query(path)).collect();
        let (fixed, open_ended) = match self.segments.split_last() {
            Some((UrlSegment::Rest, fixed)) => (fixed, true),
            _ => (self.segments.as_slice(), false),
        };
        if open_ended {
            if path_segments.len() < fixed.len() {
                return false;
            }
        } else if path_segments.len() != fixed.len() {
            return false;
        }
        fixed
            .iter()
            .zip(&path_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(literal) => literal == actual,
                UrlSegment::Wildcard | UrlSegment::Rest | UrlSegment::Parameter(_) => true,
            })
    }

    /// Named parameters of a matching path
    #[must_use]
    pub fn extract_params(&self, path: &str) -> HashMap<String, String> {
        let path_segments: Vec<&str> = split(strip_query(path)).collect();
        self.segments
            .iter()
            .zip(&path_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), (*value).to_string())),
                _ => None,
            })
            .collect()
    }

    /// Original pattern text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

// =============================================================================
// SECTION CHECKS
// =============================================================================

#[derive(Debug, Clone)]
enum Check {
    Visible(Locator),
    Hidden(Locator),
    Text(Locator, TextMatch),
    CountAtLeast(Locator, usize),
    UrlContains(String),
}

/// Composite assertion over one named section of a page.
///
/// Checks run in insertion order and stop at the first failure, whose
/// message is prefixed with `[section]`.
#[derive(Debug, Clone)]
#[must_use]
pub struct SectionCheck<'a> {
    section: String,
    page: &'a Page,
    checks: Vec<Check>,
}

impl<'a> SectionCheck<'a> {
    /// Start a section on `page`
    pub fn new(section: impl Into<String>, page: &'a Page) -> Self {
        Self {
            section: section.into(),
            page,
            checks: Vec::new(),
        }
    }

    /// Require the locator to be visible
    pub fn visible(mut self, locator: &Locator) -> Self {
        self.checks.push(Check::Visible(locator.clone()));
        self
    }

    /// Require every locator to be visible
    pub fn all_visible<'l>(mut self, locators: impl IntoIterator<Item = &'l Locator>) -> Self {
        self.checks
            .extend(locators.into_iter().cloned().map(Check::Visible));
        self
    }

    /// Require the locator to be hidden or absent
    pub fn hidden(mut self, locator: &Locator) -> Self {
        self.checks.push(Check::Hidden(locator.clone()));
        self
    }

    /// Require the locator's text to match
    pub fn text(mut self, locator: &Locator, text: impl Into<TextMatch>) -> Self {
        self.checks.push(Check::Text(locator.clone(), text.into()));
        self
    }

    /// Require at least `n` visible matches
    pub fn count_at_least(mut self, locator: &Locator, n: usize) -> Self {
        self.checks.push(Check::CountAtLeast(locator.clone(), n));
        self
    }

    /// Require the current URL to contain `fragment`
    pub fn url_contains(mut self, fragment: impl Into<String>) -> Self {
        self.checks.push(Check::UrlContains(fragment.into()));
        self
    }

    /// Number of queued checks
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether no checks are queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run the checks
    ///
    /// # Errors
    ///
    /// The first failing check's error, attributed to the section.
    pub async fn verify(self) -> PageKitResult<()> {
        for check in &self.checks {
            let outcome = match check {
                Check::Visible(locator) => self.page.assert_visible(locator).await,
                Check::Hidden(locator) => self.page.assert_hidden(locator).await,
                Check::Text(locator, text) => {
                    self.page.assert_text_contains(locator, text.clone()).await
                }
                Check::CountAtLeast(locator, n) => {
                    self.page.assert_count_at_least(locator, *n).await
                }
                Check::UrlContains(fragment) => self.page.assert_url_contains(fragment).await,
            };
            outcome.map_err(|e| attribute(e, &self.section))?;
        }
        debug!(section = %self.section, checks = self.checks.len(), "section complete");
        Ok(())
    }
}

fn attribute(error: PageKitError, section: &str) -> PageKitError {
    match error {
        PageKitError::AssertionFailed { message } => PageKitError::AssertionFailed {
            message: format!("[{section}] {message}"),
        },
        PageKitError::Timeout {
            operation,
            expected,
            elapsed_ms,
        } => PageKitError::Timeout {
            operation: format!("[{section}] {operation}"),
            expected,
            elapsed_ms,
        },
        PageKitError::AmbiguousLocator { description, count } => {
            PageKitError::AmbiguousLocator {
                description: format!("[{section}] {description}"),
                count,
            }
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod url_pattern_tests {
        use super::*;

        #[test]
        fn test_literal() {
            let pattern = UrlPattern::new("/user/login");
            assert!(pattern.matches("/user/login"));
            assert!(pattern.matches("/user/login/"));
            assert!(pattern.matches("/user/login?destination=/my_classroom"));
            assert!(!pattern.matches("/user"));
            assert!(!pattern.matches("/user/logout"));
        }

        #[test]
        fn test_root() {
            let pattern = UrlPattern::new("/");
            assert!(pattern.matches("/"));
            assert!(pattern.matches(""));
            assert!(!pattern.matches("/courses"));
        }

        #[test]
        fn test_wildcard_consumes_one_segment() {
            let pattern = UrlPattern::new("/team/*/reporting/*");
            assert!(pattern.matches("/team/19126/reporting/145164"));
            assert!(!pattern.matches("/team/19126/reporting"));
        }

        #[test]
        fn test_rest_consumes_remaining() {
            let pattern = UrlPattern::new("/my_classroom/**");
            assert!(pattern.matches("/my_classroom"));
            assert!(pattern.matches("/my_classroom/live/schedule"));
            assert!(!pattern.matches("/courses"));
        }

        #[test]
        fn test_extract_params() {
            let pattern = UrlPattern::new("/team/:team/reporting/:report");
            let params = pattern.extract_params("/team/19126/reporting/145164?tab=licenses");
            assert_eq!(params.get("team").map(String::as_str), Some("19126"));
            assert_eq!(params.get("report").map(String::as_str), Some("145164"));
            assert_eq!(pattern.pattern(), "/team/:team/reporting/:report");
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_literal_pattern_matches_itself(
                segments in prop::collection::vec("[a-z0-9_]{1,8}", 0..5)
            ) {
                let path = format!("/{}", segments.join("/"));
                prop_assert!(UrlPattern::new(&path).matches(&path));
            }

            #[test]
            fn prop_parameters_round_trip(
                values in prop::collection::vec("[a-z0-9]{1,8}", 1..4)
            ) {
                let pattern: Vec<String> = (0..values.len()).map(|i| format!(":p{i}")).collect();
                let pattern = UrlPattern::new(&format!("/{}", pattern.join("/")));
                let path = format!("/{}", values.join("/"));
                prop_assert!(pattern.matches(&path));
                let params = pattern.extract_params(&path);
                for (i, value) in values.iter().enumerate() {
                    prop_assert_eq!(params.get(&format!("p{i}")), Some(value));
                }
            }
        }
    }

    mod section_tests {
        use super::*;
        use crate::driver::{BrowserDriver, ContextDriver};
        use crate::mock::{MockBrowser, MockRoute, MockSite};
        use crate::page::PageSettings;
        use crate::wait::Timeouts;
        use std::time::Duration;
        use url::Url;

        async fn open() -> (MockBrowser, Page) {
            let site = MockSite::new().route(MockRoute::html(
                "/footer",
                r#"<html><body><footer>
                    <a href="/privacy">Privacy Policy</a>
                    <a href="/terms" hidden>Terms of Use</a>
                </footer></body></html>"#,
            ));
            let browser = MockBrowser::new(site);
            let context = browser.new_context().await.unwrap();
            let settings = PageSettings::default()
                .with_base_url(Url::parse("https://lms.example.com/").unwrap())
                .with_timeouts(
                    Timeouts::default()
                        .with_expect(Duration::from_millis(60))
                        .with_poll_interval(Duration::from_millis(10)),
                );
            let page = Page::new(context.new_page().await.unwrap(), settings);
            page.goto("/footer").await.unwrap();
            (browser, page)
        }

        #[tokio::test]
        async fn test_passes_when_all_checks_pass() {
            let (_browser, page) = open().await;
            let privacy = page.get_by_text("Privacy Policy");
            SectionCheck::new("footer", &page)
                .visible(&privacy)
                .text(&privacy, "privacy")
                .url_contains("/footer")
                .verify()
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_fails_fast_naming_section() {
            let (_browser, page) = open().await;
            let check = SectionCheck::new("footer links", &page)
                .all_visible([&page.get_by_text("Terms of Use"), &page.locator("#missing")]);
            assert_eq!(check.len(), 2);
            let err = check.verify().await.unwrap_err();
            let message = err.to_string();
            assert!(message.contains("[footer links]"));
            assert!(message.contains("Terms of Use"));
            assert!(!message.contains("#missing"));
        }
    }
}
