//! Typed locator descriptors.
//!
//! A [`LocatorDescriptor`] is a pure value: a chain of [`Step`]s, each made of
//! a [`Strategy`], optional [`Filter`]s and an optional [`Pick`]. Every engine
//! resolves a descriptor the same way:
//!
//! 1. Start from the document root.
//! 2. For each step, collect the descendants of the current scope set that
//!    match the strategy, in document order, without duplicates.
//! 3. Keep the ones that pass every filter.
//! 4. Apply the pick (`first`/`nth`/`last`), if any.
//! 5. The result becomes the scope set for the next step.
//!
//! Descriptors serialize to JSON so the CDP backend can hand them to the
//! in-page resolver unchanged.

use crate::result::{PageKitError, PageKitResult};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collapse runs of whitespace and trim the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// TEXT MATCHING
// =============================================================================

/// How a piece of text (accessible name, text content, placeholder) is matched.
///
/// Both sides are whitespace-normalized before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextMatch {
    /// Case-insensitive substring match (the default for plain strings)
    Contains {
        /// Text to look for
        value: String,
    },
    /// Case-sensitive full match
    Exact {
        /// Text that must match exactly
        value: String,
    },
    /// Regular expression search
    Regex {
        /// Pattern source
        source: String,
        /// Match without regard to case
        ignore_case: bool,
    },
}

impl TextMatch {
    /// Case-insensitive substring match
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self::Contains {
            value: value.into(),
        }
    }

    /// Exact, case-sensitive match
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact {
            value: value.into(),
        }
    }

    /// Regular expression match
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Self::Regex {
            source: source.into(),
            ignore_case: false,
        }
    }

    /// Case-insensitive regular expression match
    #[must_use]
    pub fn regex_ci(source: impl Into<String>) -> Self {
        Self::Regex {
            source: source.into(),
            ignore_case: true,
        }
    }

    /// Test `actual` against this matcher
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        let actual = normalize_whitespace(actual);
        match self {
            Self::Contains { value } => actual
                .to_lowercase()
                .contains(&normalize_whitespace(value).to_lowercase()),
            Self::Exact { value } => actual == normalize_whitespace(value),
            Self::Regex {
                source,
                ignore_case,
            } => RegexBuilder::new(source)
                .case_insensitive(*ignore_case)
                .build()
                .map(|re| re.is_match(&actual))
                .unwrap_or(false),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Contains { value } | Self::Exact { value } => {
                if normalize_whitespace(value).is_empty() {
                    Err("text matcher is empty".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Regex {
                source,
                ignore_case,
            } => RegexBuilder::new(source)
                .case_insensitive(*ignore_case)
                .build()
                .map(|_| ())
                .map_err(|e| format!("invalid pattern /{source}/: {e}")),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(value: &str) -> Self {
        Self::contains(value)
    }
}

impl From<String> for TextMatch {
    fn from(value: String) -> Self {
        Self::contains(value)
    }
}

impl From<&String> for TextMatch {
    fn from(value: &String) -> Self {
        Self::contains(value.as_str())
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains { value } => write!(f, "{value:?}"),
            Self::Exact { value } => write!(f, "{value:?}[exact]"),
            Self::Regex {
                source,
                ignore_case,
            } => {
                write!(f, "/{source}/")?;
                if *ignore_case {
                    write!(f, "i")?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// ROLES
// =============================================================================

/// ARIA roles understood by `get_by_role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    /// `<button>`, `input[type=button|submit|reset]`
    Button,
    /// `<a href>`
    Link,
    /// `<h1>`..`<h6>`
    Heading,
    /// Text-like inputs and `<textarea>`
    Textbox,
    /// `input[type=search]`
    Searchbox,
    /// `input[type=checkbox]`
    Checkbox,
    /// `input[type=radio]`
    Radio,
    /// `<select>`
    Combobox,
    /// `<option>`
    Option,
    /// Explicit `role="tab"`
    Tab,
    /// Explicit `role="tabpanel"`
    Tabpanel,
    /// `<dialog>` or `role="dialog"`
    Dialog,
    /// `<table>`
    Table,
    /// `<tr>`
    Row,
    /// `<td>`
    Cell,
    /// `<th>`
    Columnheader,
    /// `<ul>`, `<ol>`
    List,
    /// `<li>`
    Listitem,
    /// `<nav>`
    Navigation,
    /// `<img alt>`
    Img,
    /// `<main>`
    Main,
    /// Explicit `role="alert"`
    Alert,
}

impl AriaRole {
    /// Role name as written in `role="..."`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::Textbox => "textbox",
            Self::Searchbox => "searchbox",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Combobox => "combobox",
            Self::Option => "option",
            Self::Tab => "tab",
            Self::Tabpanel => "tabpanel",
            Self::Dialog => "dialog",
            Self::Table => "table",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::Columnheader => "columnheader",
            Self::List => "list",
            Self::Listitem => "listitem",
            Self::Navigation => "navigation",
            Self::Img => "img",
            Self::Main => "main",
            Self::Alert => "alert",
        }
    }

    /// Parse an explicit `role` attribute value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let role = match value.trim().to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "link" => Self::Link,
            "heading" => Self::Heading,
            "textbox" => Self::Textbox,
            "searchbox" => Self::Searchbox,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "combobox" => Self::Combobox,
            "option" => Self::Option,
            "tab" => Self::Tab,
            "tabpanel" => Self::Tabpanel,
            "dialog" | "alertdialog" => Self::Dialog,
            "table" | "grid" => Self::Table,
            "row" => Self::Row,
            "cell" | "gridcell" => Self::Cell,
            "columnheader" => Self::Columnheader,
            "list" => Self::List,
            "listitem" => Self::Listitem,
            "navigation" => Self::Navigation,
            "img" | "image" => Self::Img,
            "main" => Self::Main,
            "alert" => Self::Alert,
            _ => return None,
        };
        Some(role)
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STRATEGY / FILTER / PICK
// =============================================================================

/// How a step finds candidate elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Strategy {
    /// By ARIA role and optional accessible name. Hidden elements never match.
    Role {
        /// Role to match
        role: AriaRole,
        /// Accessible name matcher
        name: Option<TextMatch>,
    },
    /// Innermost elements whose text content matches
    Text {
        /// Text matcher
        text: TextMatch,
    },
    /// Inputs by placeholder
    Placeholder {
        /// Placeholder matcher
        text: TextMatch,
    },
    /// Form controls by label (`<label for>`, wrapping label, `aria-label`)
    Label {
        /// Label matcher
        text: TextMatch,
    },
    /// `[data-testid="..."]`
    TestId {
        /// Test id value
        id: String,
    },
    /// Raw CSS selector
    Css {
        /// Selector source
        selector: String,
    },
    /// Union of alternative descriptors, evaluated in the same scope
    Any {
        /// Alternatives
        alternatives: Vec<LocatorDescriptor>,
    },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role { role, name: None } => write!(f, "get_by_role({role})"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "get_by_role({role}, name={name})"),
            Self::Text { text } => write!(f, "get_by_text({text})"),
            Self::Placeholder { text } => write!(f, "get_by_placeholder({text})"),
            Self::Label { text } => write!(f, "get_by_label({text})"),
            Self::TestId { id } => write!(f, "get_by_test_id({id:?})"),
            Self::Css { selector } => write!(f, "locator({selector:?})"),
            Self::Any { alternatives } => {
                let parts: Vec<String> = alternatives.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" | "))
            }
        }
    }
}

/// Narrows the candidates of a step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Text content matches
    HasText {
        /// Text matcher
        text: TextMatch,
    },
    /// Text content does not match
    HasNotText {
        /// Text matcher
        text: TextMatch,
    },
    /// Has a descendant matching the inner descriptor
    Has {
        /// Descriptor resolved relative to the candidate
        inner: LocatorDescriptor,
    },
    /// Has no descendant matching the inner descriptor
    HasNot {
        /// Descriptor resolved relative to the candidate
        inner: LocatorDescriptor,
    },
    /// Visibility equals the flag
    Visible {
        /// Required visibility
        visible: bool,
    },
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasText { text } => write!(f, "filter(has_text={text})"),
            Self::HasNotText { text } => write!(f, "filter(has_not_text={text})"),
            Self::Has { inner } => write!(f, "filter(has={inner})"),
            Self::HasNot { inner } => write!(f, "filter(has_not={inner})"),
            Self::Visible { visible } => write!(f, "filter(visible={visible})"),
        }
    }
}

/// Deterministic disambiguation of a match set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pick {
    /// First in document order
    First,
    /// Last in document order
    Last,
    /// Zero-based index in document order
    Nth {
        /// Index
        index: usize,
    },
}

impl Pick {
    /// Index selected from a match set of `len` elements
    #[must_use]
    pub const fn index_in(&self, len: usize) -> Option<usize> {
        match self {
            Self::First if len > 0 => Some(0),
            Self::Last if len > 0 => Some(len - 1),
            Self::Nth { index } if *index < len => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first()"),
            Self::Last => f.write_str("last()"),
            Self::Nth { index } => write!(f, "nth({index})"),
        }
    }
}

// =============================================================================
// STEP / DESCRIPTOR
// =============================================================================

/// One link in a descriptor chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    /// Candidate finder
    pub strategy: Strategy,
    /// Filters applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Optional pick applied last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick: Option<Pick>,
}

impl Step {
    /// Create a step with no filters or pick
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            filters: Vec::new(),
            pick: None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.strategy)?;
        for filter in &self.filters {
            write!(f, ".{filter}")?;
        }
        if let Some(pick) = &self.pick {
            write!(f, ".{pick}")?;
        }
        Ok(())
    }
}

/// Immutable, declarative element query
///
/// # Example
///
/// ```
/// use pagekit::{AriaRole, LocatorDescriptor, TextMatch};
///
/// let rows = LocatorDescriptor::css("#manager-learning-path-div tr")
///     .has_text("Mobile Manager Active LP");
/// let archive = rows.child(LocatorDescriptor::css("a.btn-archive"));
/// assert!(archive.validate().is_ok());
/// assert_eq!(
///     archive.to_string(),
///     "locator(\"#manager-learning-path-div tr\").filter(has_text=\"Mobile Manager Active LP\") >> locator(\"a.btn-archive\")"
/// );
///
/// let link = LocatorDescriptor::role(AriaRole::Link).named(TextMatch::exact("Leaderboard"));
/// assert!(link.to_string().starts_with("get_by_role(link"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorDescriptor {
    /// Steps, outermost first
    pub steps: Vec<Step>,
}

impl LocatorDescriptor {
    /// Descriptor with a single step
    #[must_use]
    pub fn from_strategy(strategy: Strategy) -> Self {
        Self {
            steps: vec![Step::new(strategy)],
        }
    }

    /// `get_by_role(role)` without a name
    #[must_use]
    pub fn role(role: AriaRole) -> Self {
        Self::from_strategy(Strategy::Role { role, name: None })
    }

    /// `get_by_text(text)`
    #[must_use]
    pub fn text(text: impl Into<TextMatch>) -> Self {
        Self::from_strategy(Strategy::Text { text: text.into() })
    }

    /// `get_by_placeholder(text)`
    #[must_use]
    pub fn placeholder(text: impl Into<TextMatch>) -> Self {
        Self::from_strategy(Strategy::Placeholder { text: text.into() })
    }

    /// `get_by_label(text)`
    #[must_use]
    pub fn label(text: impl Into<TextMatch>) -> Self {
        Self::from_strategy(Strategy::Label { text: text.into() })
    }

    /// `get_by_test_id(id)`
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::TestId { id: id.into() })
    }

    /// Raw CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_strategy(Strategy::Css {
            selector: selector.into(),
        })
    }

    /// Set the accessible name of a role step.
    ///
    /// On any other strategy the name narrows the step by text content
    /// instead, the same as [`Self::has_text`].
    #[must_use]
    pub fn named(mut self, name: impl Into<TextMatch>) -> Self {
        let name = name.into();
        if let Some(step) = self.steps.last_mut() {
            if let Strategy::Role { name: slot, .. } = &mut step.strategy {
                *slot = Some(name);
                return self;
            }
        }
        self.filter(Filter::HasText { text: name })
    }

    /// Append a filter to the last step
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.filters.push(filter);
        }
        self
    }

    /// Keep candidates whose text content matches
    #[must_use]
    pub fn has_text(self, text: impl Into<TextMatch>) -> Self {
        self.filter(Filter::HasText { text: text.into() })
    }

    /// Keep candidates whose text content does not match
    #[must_use]
    pub fn has_not_text(self, text: impl Into<TextMatch>) -> Self {
        self.filter(Filter::HasNotText { text: text.into() })
    }

    /// Keep candidates containing a match for `inner`
    #[must_use]
    pub fn has(self, inner: Self) -> Self {
        self.filter(Filter::Has { inner })
    }

    /// Keep candidates not containing a match for `inner`
    #[must_use]
    pub fn has_not(self, inner: Self) -> Self {
        self.filter(Filter::HasNot { inner })
    }

    /// Keep only visible (or only hidden) candidates
    #[must_use]
    pub fn visible(self, visible: bool) -> Self {
        self.filter(Filter::Visible { visible })
    }

    /// Set the pick of the last step, replacing any earlier pick
    #[must_use]
    pub fn pick(mut self, pick: Pick) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.pick = Some(pick);
        }
        self
    }

    /// First match in document order
    #[must_use]
    pub fn first(self) -> Self {
        self.pick(Pick::First)
    }

    /// Last match in document order
    #[must_use]
    pub fn last(self) -> Self {
        self.pick(Pick::Last)
    }

    /// Zero-based match in document order
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        self.pick(Pick::Nth { index })
    }

    /// Scope `inner` to the elements this descriptor resolves to
    #[must_use]
    pub fn child(mut self, inner: Self) -> Self {
        self.steps.extend(inner.steps);
        self
    }

    /// Union with another descriptor resolved from the same scope
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut alternatives = self.into_alternatives();
        alternatives.extend(other.into_alternatives());
        Self::from_strategy(Strategy::Any { alternatives })
    }

    fn into_alternatives(mut self) -> Vec<Self> {
        if self.steps.len() == 1 && self.steps[0].filters.is_empty() && self.steps[0].pick.is_none()
        {
            if let Strategy::Any { alternatives } = &mut self.steps[0].strategy {
                return std::mem::take(alternatives);
            }
        }
        vec![self]
    }

    /// Whether the final step pins the result to at most one element
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.steps.last().is_some_and(|s| s.pick.is_some())
    }

    /// Statically validate the descriptor: non-empty, parsable CSS, compilable
    /// patterns, non-empty text matchers.
    ///
    /// # Errors
    ///
    /// Returns [`PageKitError::InvalidLocator`] naming the first problem.
    pub fn validate(&self) -> PageKitResult<()> {
        self.check().map_err(|message| PageKitError::InvalidLocator {
            description: self.to_string(),
            message,
        })
    }

    fn check(&self) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err("descriptor has no steps".to_string());
        }
        for step in &self.steps {
            match &step.strategy {
                Strategy::Role { name, .. } => {
                    if let Some(name) = name {
                        name.validate()?;
                    }
                }
                Strategy::Text { text } | Strategy::Placeholder { text } | Strategy::Label { text } => {
                    text.validate()?;
                }
                Strategy::TestId { id } => {
                    if id.trim().is_empty() {
                        return Err("test id is empty".to_string());
                    }
                }
                Strategy::Css { selector } => {
                    scraper::Selector::parse(selector)
                        .map_err(|e| format!("invalid CSS selector {selector:?}: {e}"))?;
                }
                Strategy::Any { alternatives } => {
                    if alternatives.is_empty() {
                        return Err("union has no alternatives".to_string());
                    }
                    for alt in alternatives {
                        alt.check()?;
                    }
                }
            }
            for filter in &step.filters {
                match filter {
                    Filter::HasText { text } | Filter::HasNotText { text } => text.validate()?,
                    Filter::Has { inner } | Filter::HasNot { inner } => inner.check()?,
                    Filter::Visible { .. } => {}
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for LocatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(" >> "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_contains_is_case_insensitive_and_normalized() {
            let m = TextMatch::from(" Webinars");
            assert!(m.matches("\n   Webinars  "));
            assert!(m.matches("Upcoming webinars"));
            assert!(!m.matches("Newsletter"));
        }

        #[test]
        fn test_exact_is_strict() {
            let m = TextMatch::exact("Available Licenses");
            assert!(m.matches("  Available   Licenses "));
            assert!(!m.matches("Available Licenses Report"));
            assert!(!m.matches("available licenses"));
        }

        #[test]
        fn test_regex_with_ignore_case() {
            let m = TextMatch::regex_ci(r"skills?\s*assessments");
            assert!(m.matches("Skill Assessments"));
            assert!(m.matches("SKILLS ASSESSMENTS"));
            assert!(!TextMatch::regex(r"^Request$").matches("Request a demo"));
        }

        #[test]
        fn test_invalid_regex_never_matches() {
            let m = TextMatch::regex("(unclosed");
            assert!(!m.matches("(unclosed"));
            assert!(m.validate().is_err());
        }

        #[test]
        fn test_display() {
            assert_eq!(TextMatch::contains("Log in").to_string(), "\"Log in\"");
            assert_eq!(TextMatch::exact("Bug").to_string(), "\"Bug\"[exact]");
            assert_eq!(TextMatch::regex_ci("close").to_string(), "/close/i");
        }
    }

    mod role_tests {
        use super::*;

        #[test]
        fn test_parse_round_trips() {
            for role in [
                AriaRole::Button,
                AriaRole::Link,
                AriaRole::Columnheader,
                AriaRole::Dialog,
                AriaRole::Tab,
            ] {
                assert_eq!(AriaRole::parse(role.as_str()), Some(role));
            }
            assert_eq!(AriaRole::parse("alertdialog"), Some(AriaRole::Dialog));
            assert_eq!(AriaRole::parse("presentation"), None);
        }
    }

    mod descriptor_tests {
        use super::*;

        #[test]
        fn test_named_sets_role_name() {
            let d = LocatorDescriptor::role(AriaRole::Button).named("Enter");
            assert_eq!(
                d.steps[0].strategy,
                Strategy::Role {
                    role: AriaRole::Button,
                    name: Some(TextMatch::contains("Enter")),
                }
            );
            assert!(d.steps[0].filters.is_empty());
        }

        #[test]
        fn test_named_on_css_becomes_text_filter() {
            let d = LocatorDescriptor::css("div").named("Request");
            assert_eq!(
                d.steps[0].filters,
                vec![Filter::HasText {
                    text: TextMatch::contains("Request")
                }]
            );
        }

        #[test]
        fn test_pick_replaces_previous_pick() {
            let d = LocatorDescriptor::css(".highlighted-student").first().nth(2);
            assert_eq!(d.steps[0].pick, Some(Pick::Nth { index: 2 }));
            assert!(d.is_pinned());
        }

        #[test]
        fn test_or_flattens_unions() {
            let d = LocatorDescriptor::css("a")
                .or(LocatorDescriptor::css("b"))
                .or(LocatorDescriptor::css("c"));
            match &d.steps[0].strategy {
                Strategy::Any { alternatives } => assert_eq!(alternatives.len(), 3),
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(
                d.to_string(),
                "(locator(\"a\") | locator(\"b\") | locator(\"c\"))"
            );
        }

        #[test]
        fn test_or_keeps_picked_union_intact() {
            let picked = LocatorDescriptor::css("a")
                .or(LocatorDescriptor::css("b"))
                .first();
            let d = picked.clone().or(LocatorDescriptor::css("c"));
            match &d.steps[0].strategy {
                Strategy::Any { alternatives } => {
                    assert_eq!(alternatives.len(), 2);
                    assert_eq!(alternatives[0], picked);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_child_chains_steps() {
            let d = LocatorDescriptor::css("#footer")
                .child(LocatorDescriptor::role(AriaRole::Link).named("Support"));
            assert_eq!(d.steps.len(), 2);
            assert!(d.to_string().contains(" >> "));
        }

        #[test]
        fn test_validate_rejects_bad_css() {
            let err = LocatorDescriptor::css("div[").validate().unwrap_err();
            assert!(matches!(err, PageKitError::InvalidLocator { .. }));
        }

        #[test]
        fn test_validate_recurses_into_filters() {
            let d = LocatorDescriptor::css("button")
                .has(LocatorDescriptor::text(TextMatch::regex("[")));
            assert!(d.validate().is_err());
            assert!(LocatorDescriptor::test_id(" ").validate().is_err());
            assert!(LocatorDescriptor { steps: vec![] }.validate().is_err());
        }

        #[test]
        fn test_serializes_for_resolver() {
            let d = LocatorDescriptor::role(AriaRole::Link)
                .named(TextMatch::regex_ci("next"))
                .first();
            let json = serde_json::to_value(&d).unwrap();
            assert_eq!(json["steps"][0]["strategy"]["by"], "role");
            assert_eq!(json["steps"][0]["strategy"]["role"], "link");
            assert_eq!(json["steps"][0]["strategy"]["name"]["kind"], "regex");
            assert_eq!(json["steps"][0]["pick"]["kind"], "first");
            let back: LocatorDescriptor = serde_json::from_value(json).unwrap();
            assert_eq!(back, d);
        }

        #[test]
        fn test_pick_index_in() {
            assert_eq!(Pick::First.index_in(0), None);
            assert_eq!(Pick::Last.index_in(3), Some(2));
            assert_eq!(Pick::Nth { index: 3 }.index_in(3), None);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_contains_matches_its_own_text(s in "[a-zA-Z][a-zA-Z ]{0,30}") {
                prop_assert!(TextMatch::contains(s.clone()).matches(&s));
                prop_assert!(TextMatch::contains(s.to_uppercase()).matches(&s));
            }

            #[test]
            fn prop_exact_ignores_outer_whitespace(s in "[a-zA-Z]{1,20}", pad in "[ \t\n]{0,4}") {
                let padded = format!("{pad}{s}{pad}");
                prop_assert!(TextMatch::exact(s.clone()).matches(&padded));
            }

            #[test]
            fn prop_display_is_stable(sel in "[a-z]{1,8}", idx in 0usize..5) {
                let a = LocatorDescriptor::css(sel.clone()).nth(idx);
                let b = LocatorDescriptor::css(sel).nth(idx);
                prop_assert_eq!(a.to_string(), b.to_string());
                prop_assert_eq!(a, b);
            }
        }
    }
}
