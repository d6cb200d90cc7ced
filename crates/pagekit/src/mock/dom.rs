//! Document snapshots for the in-memory engine.
//!
//! A [`Snapshot`] flattens a parsed document into a pre-order list of
//! elements. Each entry records its structural key, visibility and
//! normalized text, so a subtree is the contiguous range
//! `index + 1 .. entry.end`. Document order is index order, which makes
//! resolution deterministic.
//!
//! Fragments (`data-fragment="name"`) are the unit of dynamic state: a
//! fragment is visible, hidden or detached. Detached subtrees are skipped
//! entirely; hidden ones stay in the list but are not visible.
//!
//! `scraper::Html` is not `Send`; snapshots only ever live inside
//! synchronous helpers.

use crate::driver::ElementInfo;
use crate::selector::{normalize_whitespace, AriaRole, Filter, LocatorDescriptor, Step, Strategy};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{BTreeMap, HashMap};

/// Attribute naming a fragment
pub const FRAGMENT_ATTR: &str = "data-fragment";

/// Attribute giving a fragment's state before any action ran
pub const FRAGMENT_INITIAL_ATTR: &str = "data-fragment-initial";

const NEVER_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "noscript",
];

const TEXT_EXCLUDED: &[&str] = &["script", "style", "template", "noscript"];

// =============================================================================
// DOM STATE
// =============================================================================

/// Dynamic state of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentState {
    /// Rendered
    Visible,
    /// In the DOM but not rendered
    Hidden,
    /// Not in the DOM
    Detached,
}

impl FragmentState {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "visible" | "shown" => Self::Visible,
            "detached" => Self::Detached,
            _ => Self::Hidden,
        }
    }
}

/// Mutable state layered over a rendered document. Reset on navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomState {
    /// Fragment overrides by name
    pub fragments: HashMap<String, FragmentState>,
    /// Form control values by element key
    pub values: HashMap<String, String>,
    /// Checkbox/radio states by element key
    pub checked: HashMap<String, bool>,
}

impl DomState {
    /// Override a fragment's state
    pub fn set_fragment(&mut self, name: impl Into<String>, state: FragmentState) {
        let _ = self.fragments.insert(name.into(), state);
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One element of a snapshot
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// Underlying element
    pub element: ElementRef<'a>,
    /// Structural key, e.g. `html:0/body:1/div:2`
    pub key: String,
    /// Lower-case tag name
    pub tag: String,
    /// Parent entry
    pub parent: Option<usize>,
    /// Exclusive end of this entry's subtree
    pub end: usize,
    /// Rendered
    pub visible: bool,
    /// Normalized text content
    pub text: String,
}

impl Entry<'_> {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    fn input_type(&self) -> String {
        self.attr("type").unwrap_or("text").trim().to_ascii_lowercase()
    }

    fn is_toggle(&self) -> bool {
        self.tag == "input" && matches!(self.input_type().as_str(), "checkbox" | "radio")
    }
}

/// Flattened, resolvable view of a document plus its [`DomState`]
#[derive(Debug)]
pub struct Snapshot<'a> {
    entries: Vec<Entry<'a>>,
    state: &'a DomState,
}

impl<'a> Snapshot<'a> {
    /// Flatten `html` under `state`
    #[must_use]
    pub fn build(html: &'a Html, state: &'a DomState) -> Self {
        let mut snapshot = Self {
            entries: Vec::new(),
            state,
        };
        let _ = snapshot.visit(html.root_element(), None, "", 0, true);
        snapshot
    }

    fn visit(
        &mut self,
        element: ElementRef<'a>,
        parent: Option<usize>,
        parent_key: &str,
        sibling_index: usize,
        parent_visible: bool,
    ) -> String {
        let tag = element.value().name().to_ascii_lowercase();
        let fragment = element.value().attr(FRAGMENT_ATTR).map(|name| {
            self.state.fragments.get(name).copied().unwrap_or_else(|| {
                element
                    .value()
                    .attr(FRAGMENT_INITIAL_ATTR)
                    .map_or(FragmentState::Hidden, FragmentState::parse)
            })
        });
        if fragment == Some(FragmentState::Detached) {
            return String::new();
        }

        let key = if parent_key.is_empty() {
            format!("{tag}:{sibling_index}")
        } else {
            format!("{parent_key}/{tag}:{sibling_index}")
        };
        let visible =
            parent_visible && fragment != Some(FragmentState::Hidden) && renders(element, &tag);

        let index = self.entries.len();
        self.entries.push(Entry {
            element,
            key: key.clone(),
            tag: tag.clone(),
            parent,
            end: index + 1,
            visible,
            text: String::new(),
        });

        let mut raw = String::new();
        let mut child_index = 0;
        for child in element.children() {
            match child.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        let child_text = self.visit(child_el, Some(index), &key, child_index, visible);
                        child_index += 1;
                        if !TEXT_EXCLUDED.contains(&child_el.value().name()) {
                            raw.push(' ');
                            raw.push_str(&child_text);
                            raw.push(' ');
                        }
                    }
                }
                _ => {}
            }
        }

        let end = self.entries.len();
        if let Some(entry) = self.entries.get_mut(index) {
            entry.end = end;
            entry.text = normalize_whitespace(&raw);
        }
        raw
    }

    /// Number of (attached) elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by index
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&Entry<'a>> {
        self.entries.get(index)
    }

    /// Entry by structural key
    #[must_use]
    pub fn index_of_key(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// `index` itself, then its ancestors up to the root
    #[must_use]
    pub fn ancestors_inclusive(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            chain.push(i);
            current = self.entries.get(i).and_then(|e| e.parent);
        }
        chain
    }

    /// Whether the element at `index` matches a CSS selector
    #[must_use]
    pub fn matches_css(&self, index: usize, selector: &Selector) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| selector.matches(&e.element))
    }

    /// First element matching a CSS selector, in document order
    #[must_use]
    pub fn first_css(&self, css: &str) -> Option<usize> {
        let selector = Selector::parse(css).ok()?;
        (0..self.entries.len()).find(|i| self.matches_css(*i, &selector))
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Resolve a descriptor from the document root
    #[must_use]
    pub fn resolve(&self, descriptor: &LocatorDescriptor) -> Vec<usize> {
        self.resolve_steps(&descriptor.steps, None)
    }

    fn resolve_steps(&self, steps: &[Step], scope: Option<&[usize]>) -> Vec<usize> {
        let mut current: Option<Vec<usize>> = scope.map(<[usize]>::to_vec);
        for step in steps {
            let found = self.resolve_step(step, current.as_deref());
            current = Some(found);
        }
        current.unwrap_or_default()
    }

    fn resolve_step(&self, step: &Step, scope: Option<&[usize]>) -> Vec<usize> {
        let mut found: Vec<usize> = match &step.strategy {
            Strategy::Any { alternatives } => {
                let mut union: Vec<usize> = alternatives
                    .iter()
                    .flat_map(|alt| self.resolve_steps(&alt.steps, scope))
                    .collect();
                union.sort_unstable();
                union.dedup();
                union
            }
            Strategy::Css { selector } => match Selector::parse(selector) {
                Ok(selector) => self
                    .in_scope(scope)
                    .into_iter()
                    .filter(|i| self.matches_css(*i, &selector))
                    .collect(),
                Err(_) => Vec::new(),
            },
            strategy => self
                .in_scope(scope)
                .into_iter()
                .filter(|i| self.matches_strategy(*i, strategy))
                .collect(),
        };
        found.retain(|i| step.filters.iter().all(|f| self.passes(*i, f)));
        match step.pick {
            Some(pick) => pick
                .index_in(found.len())
                .and_then(|i| found.get(i).copied())
                .into_iter()
                .collect(),
            None => found,
        }
    }

    /// Descendants of the scope set, in document order, without duplicates
    fn in_scope(&self, scope: Option<&[usize]>) -> Vec<usize> {
        let Some(scope) = scope else {
            return (0..self.entries.len()).collect();
        };
        let mut mask = vec![false; self.entries.len()];
        for &s in scope {
            if let Some(entry) = self.entries.get(s) {
                for slot in mask.iter_mut().take(entry.end).skip(s + 1) {
                    *slot = true;
                }
            }
        }
        mask.iter()
            .enumerate()
            .filter_map(|(i, m)| m.then_some(i))
            .collect()
    }

    fn matches_strategy(&self, index: usize, strategy: &Strategy) -> bool {
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        match strategy {
            Strategy::Role { role, name } => {
                entry.visible
                    && self.role_of(index) == Some(*role)
                    && name
                        .as_ref()
                        .map_or(true, |n| n.matches(&self.accessible_name(index)))
            }
            Strategy::Text { text } => {
                text.matches(&entry.text)
                    && !self
                        .children(index)
                        .any(|c| self.entries.get(c).is_some_and(|e| text.matches(&e.text)))
            }
            Strategy::Placeholder { text } => {
                entry.attr("placeholder").is_some_and(|p| text.matches(p))
            }
            Strategy::Label { text } => self.labels(index).iter().any(|l| text.matches(l)),
            Strategy::TestId { id } => entry.attr("data-testid") == Some(id.as_str()),
            Strategy::Css { .. } | Strategy::Any { .. } => false,
        }
    }

    fn passes(&self, index: usize, filter: &Filter) -> bool {
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        match filter {
            Filter::HasText { text } => text.matches(&entry.text),
            Filter::HasNotText { text } => !text.matches(&entry.text),
            Filter::Has { inner } => !self.resolve_steps(&inner.steps, Some(&[index])).is_empty(),
            Filter::HasNot { inner } => self.resolve_steps(&inner.steps, Some(&[index])).is_empty(),
            Filter::Visible { visible } => entry.visible == *visible,
        }
    }

    fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let end = self.entries.get(index).map_or(index, |e| e.end);
        (index + 1..end).filter(move |c| self.entries.get(*c).and_then(|e| e.parent) == Some(index))
    }

    // -------------------------------------------------------------------------
    // Accessibility
    // -------------------------------------------------------------------------

    /// Explicit `role` attribute, else the implicit role of the tag
    #[must_use]
    pub fn role_of(&self, index: usize) -> Option<AriaRole> {
        let entry = self.entries.get(index)?;
        if let Some(explicit) = entry.attr("role") {
            return explicit.split_whitespace().next().and_then(AriaRole::parse);
        }
        let role = match entry.tag.as_str() {
            "a" | "area" if entry.attr("href").is_some() => AriaRole::Link,
            "button" => AriaRole::Button,
            "input" => match entry.input_type().as_str() {
                "button" | "submit" | "reset" | "image" => AriaRole::Button,
                "checkbox" => AriaRole::Checkbox,
                "radio" => AriaRole::Radio,
                "search" => AriaRole::Searchbox,
                "hidden" => return None,
                _ => AriaRole::Textbox,
            },
            "textarea" => AriaRole::Textbox,
            "select" => AriaRole::Combobox,
            "option" => AriaRole::Option,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => AriaRole::Heading,
            "dialog" => AriaRole::Dialog,
            "table" => AriaRole::Table,
            "tr" => AriaRole::Row,
            "td" => AriaRole::Cell,
            "th" => AriaRole::Columnheader,
            "ul" | "ol" => AriaRole::List,
            "li" => AriaRole::Listitem,
            "nav" => AriaRole::Navigation,
            "img" if entry.attr("alt").is_some_and(|a| !a.trim().is_empty()) => AriaRole::Img,
            "main" => AriaRole::Main,
            _ => return None,
        };
        Some(role)
    }

    /// Accessible name, simplified: `aria-label`, `aria-labelledby`, associated
    /// labels, then tag-specific fallbacks and text content
    #[must_use]
    pub fn accessible_name(&self, index: usize) -> String {
        let Some(entry) = self.entries.get(index) else {
            return String::new();
        };
        if let Some(label) = entry.attr("aria-label").filter(|l| !l.trim().is_empty()) {
            return normalize_whitespace(label);
        }
        if let Some(ids) = entry.attr("aria-labelledby") {
            let parts: Vec<&str> = ids
                .split_whitespace()
                .filter_map(|id| self.entries.iter().find(|e| e.attr("id") == Some(id)))
                .map(|e| e.text.as_str())
                .collect();
            if !parts.is_empty() {
                return normalize_whitespace(&parts.join(" "));
            }
        }
        match entry.tag.as_str() {
            "input" if matches!(entry.input_type().as_str(), "button" | "submit" | "reset") => {
                entry.attr("value").map_or_else(
                    || {
                        if entry.input_type() == "submit" {
                            "Submit".to_string()
                        } else {
                            String::new()
                        }
                    },
                    normalize_whitespace,
                )
            }
            "input" | "select" | "textarea" => self
                .associated_labels(index)
                .into_iter()
                .next()
                .or_else(|| entry.attr("placeholder").map(normalize_whitespace))
                .or_else(|| entry.attr("title").map(normalize_whitespace))
                .unwrap_or_default(),
            "img" => entry.attr("alt").map(normalize_whitespace).unwrap_or_default(),
            _ => {
                if entry.text.is_empty() {
                    entry.attr("title").map(normalize_whitespace).unwrap_or_default()
                } else {
                    entry.text.clone()
                }
            }
        }
    }

    fn associated_labels(&self, index: usize) -> Vec<String> {
        let Some(entry) = self.entries.get(index) else {
            return Vec::new();
        };
        let mut labels = Vec::new();
        if let Some(id) = entry.attr("id") {
            labels.extend(
                self.entries
                    .iter()
                    .filter(|e| e.tag == "label" && e.attr("for") == Some(id))
                    .map(|e| e.text.clone()),
            );
        }
        labels.extend(
            self.ancestors_inclusive(index)
                .into_iter()
                .skip(1)
                .filter_map(|a| self.entries.get(a))
                .filter(|e| e.tag == "label")
                .map(|e| e.text.clone()),
        );
        labels
    }

    fn labels(&self, index: usize) -> Vec<String> {
        let Some(entry) = self.entries.get(index) else {
            return Vec::new();
        };
        let mut labels: Vec<String> = entry
            .attr("aria-label")
            .map(normalize_whitespace)
            .into_iter()
            .collect();
        if matches!(
            entry.tag.as_str(),
            "input" | "select" | "textarea" | "button" | "meter" | "output" | "progress"
        ) && !(entry.tag == "input" && entry.input_type() == "hidden")
        {
            labels.extend(self.associated_labels(index));
        }
        labels
    }

    // -------------------------------------------------------------------------
    // Element state
    // -------------------------------------------------------------------------

    /// Whether the element accepts `fill`
    #[must_use]
    pub fn is_editable(&self, index: usize) -> bool {
        let Some(e) = self.entries.get(index) else {
            return false;
        };
        let editable_tag = match e.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                e.input_type().as_str(),
                "checkbox" | "radio" | "button" | "submit" | "reset" | "image" | "hidden" | "file"
            ),
            _ => e.attr("contenteditable").is_some_and(|v| v != "false"),
        };
        editable_tag && e.attr("disabled").is_none() && e.attr("readonly").is_none()
    }

    /// Whether the element is a checkbox or radio
    #[must_use]
    pub fn is_toggle(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(Entry::is_toggle)
    }

    /// Current value of a form control
    #[must_use]
    pub fn value_of(&self, index: usize) -> Option<String> {
        let entry = self.entries.get(index)?;
        if let Some(value) = self.state.values.get(&entry.key) {
            return Some(value.clone());
        }
        match entry.tag.as_str() {
            "input" if !entry.is_toggle() => {
                Some(entry.attr("value").unwrap_or_default().to_string())
            }
            "textarea" => Some(entry.element.text().collect::<String>()),
            "select" => {
                let options: Vec<&Entry<'_>> = self
                    .entries
                    .get(index + 1..entry.end)
                    .unwrap_or_default()
                    .iter()
                    .filter(|e| e.tag == "option")
                    .collect();
                let chosen = options
                    .iter()
                    .find(|o| o.attr("selected").is_some())
                    .or_else(|| options.first());
                Some(chosen.map(|o| option_value(o)).unwrap_or_default())
            }
            _ => None,
        }
    }

    /// Checked state of a checkbox or radio
    #[must_use]
    pub fn checked_of(&self, index: usize) -> Option<bool> {
        let entry = self.entries.get(index)?;
        if !entry.is_toggle() {
            return None;
        }
        Some(
            self.state
                .checked
                .get(&entry.key)
                .copied()
                .unwrap_or_else(|| entry.attr("checked").is_some()),
        )
    }

    /// Value of the `<option>` under a `<select>` whose value or label matches
    #[must_use]
    pub fn option_matching(&self, select: usize, wanted: &str) -> Option<String> {
        let entry = self.entries.get(select)?;
        self.entries
            .get(select + 1..entry.end)?
            .iter()
            .filter(|e| e.tag == "option")
            .find(|o| option_value(o) == wanted || o.text == normalize_whitespace(wanted))
            .map(option_value)
    }

    /// Snapshot of one element for the driver interface
    #[must_use]
    pub fn info(&self, index: usize) -> Option<ElementInfo> {
        let entry = self.entries.get(index)?;
        Some(ElementInfo {
            key: entry.key.clone(),
            tag: entry.tag.clone(),
            text: entry.text.clone(),
            visible: entry.visible,
            value: self.value_of(index),
            checked: self.checked_of(index),
            attributes: entry
                .element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        })
    }
}

fn option_value(option: &Entry<'_>) -> String {
    option
        .attr("value")
        .map_or_else(|| option.text.clone(), ToString::to_string)
}

fn renders(element: ElementRef<'_>, tag: &str) -> bool {
    if NEVER_RENDERED.contains(&tag) {
        return false;
    }
    let el = element.value();
    if el.attr("hidden").is_some() {
        return false;
    }
    if tag == "input" && el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return false;
    }
    if let Some(style) = el.attr("style") {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::selector::TextMatch;

    const PAGE: &str = r#"
        <html><body>
          <nav id="main-nav">
            <a href="/my_classroom">My Classroom</a>
            <a href="/courses">Courses</a>
            <a href="/courses/lp">Learning Paths</a>
          </nav>
          <main>
            <h1>Welcome back, Santi</h1>
            <label for="email">Email address</label>
            <input id="email" type="email" placeholder="Enter your email">
            <div data-fragment="password-step">
              <input id="pass" type="password" aria-label="Password">
              <button>Log in</button>
            </div>
            <div data-fragment="gone" data-fragment-initial="detached"><p>ghost</p></div>
            <input type="checkbox" id="agree" checked>
            <select id="role"><option value="a">Admin</option><option value="s" selected>Student</option></select>
            <ul><li class="card">Alpha <span>one</span></li><li class="card">Beta</li></ul>
            <p style="display: none">secret</p>
            <button data-testid="go">Go</button>
          </main>
        </body></html>
    "#;

    fn with_snapshot<R>(state: &DomState, f: impl FnOnce(&Snapshot<'_>) -> R) -> R {
        let html = Html::parse_document(PAGE);
        let snapshot = Snapshot::build(&html, state);
        f(&snapshot)
    }

    fn texts(s: &Snapshot<'_>, found: &[usize]) -> Vec<String> {
        found
            .iter()
            .map(|i| s.entry(*i).unwrap().text.clone())
            .collect()
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn test_role_with_name() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let links = s.resolve(&LocatorDescriptor::role(AriaRole::Link));
                assert_eq!(links.len(), 3);
                let one = s.resolve(&LocatorDescriptor::role(AriaRole::Link).named("courses"));
                assert_eq!(texts(s, &one), vec!["Courses"]);
                let exact = s.resolve(
                    &LocatorDescriptor::role(AriaRole::Link).named(TextMatch::exact("Learning Paths")),
                );
                assert_eq!(exact.len(), 1);
            });
        }

        #[test]
        fn test_role_excludes_hidden_fragments() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let buttons = s.resolve(&LocatorDescriptor::role(AriaRole::Button).named("Log in"));
                assert!(buttons.is_empty());
                let raw = s.resolve(&LocatorDescriptor::css("button").has_text("Log in"));
                assert_eq!(raw.len(), 1);
                assert!(!s.entry(raw[0]).unwrap().visible);
            });
            let mut state = DomState::default();
            state.set_fragment("password-step", FragmentState::Visible);
            with_snapshot(&state, |s| {
                let buttons = s.resolve(&LocatorDescriptor::role(AriaRole::Button).named("Log in"));
                assert_eq!(buttons.len(), 1);
            });
        }

        #[test]
        fn test_detached_fragments_are_absent() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                assert!(s.resolve(&LocatorDescriptor::text("ghost")).is_empty());
            });
            let mut state = DomState::default();
            state.set_fragment("gone", FragmentState::Visible);
            with_snapshot(&state, |s| {
                assert_eq!(s.resolve(&LocatorDescriptor::text("ghost")).len(), 1);
            });
        }

        #[test]
        fn test_text_matches_innermost() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let found = s.resolve(&LocatorDescriptor::text("Welcome back,"));
                assert_eq!(found.len(), 1);
                assert_eq!(s.entry(found[0]).unwrap().tag, "h1");
            });
        }

        #[test]
        fn test_label_placeholder_and_test_id() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let by_label = s.resolve(&LocatorDescriptor::label("Email address"));
                let by_placeholder = s.resolve(&LocatorDescriptor::placeholder("Enter your email"));
                assert_eq!(by_label, by_placeholder);
                assert_eq!(s.resolve(&LocatorDescriptor::label("Password")).len(), 1);
                assert_eq!(s.resolve(&LocatorDescriptor::test_id("go")).len(), 1);
            });
        }

        #[test]
        fn test_filters_picks_and_scoping() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let cards = LocatorDescriptor::css("li.card");
                assert_eq!(s.resolve(&cards).len(), 2);
                assert_eq!(texts(s, &s.resolve(&cards.clone().last())), vec!["Beta"]);
                assert_eq!(
                    s.resolve(&cards.clone().has(LocatorDescriptor::css("span"))).len(),
                    1
                );
                assert_eq!(s.resolve(&cards.clone().has_not_text("alpha")).len(), 1);
                assert!(s.resolve(&cards.clone().nth(5)).is_empty());
                let scoped = LocatorDescriptor::css("#main-nav")
                    .child(LocatorDescriptor::role(AriaRole::Link))
                    .nth(1);
                assert_eq!(texts(s, &s.resolve(&scoped)), vec!["Courses"]);
            });
        }

        #[test]
        fn test_union_is_in_document_order_without_duplicates() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let d = LocatorDescriptor::css("button[data-testid]")
                    .or(LocatorDescriptor::css("nav a"))
                    .or(LocatorDescriptor::test_id("go"));
                let found = s.resolve(&d);
                assert_eq!(found.len(), 4);
                assert!(found.windows(2).all(|w| w[0] < w[1]));
            });
        }

        #[test]
        fn test_resolution_is_deterministic() {
            let state = DomState::default();
            let d = LocatorDescriptor::role(AriaRole::Link).named("Courses").first();
            let a = with_snapshot(&state, |s| s.info(s.resolve(&d)[0]).unwrap());
            let b = with_snapshot(&state, |s| s.info(s.resolve(&d)[0]).unwrap());
            assert_eq!(a, b);
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_visibility_rules() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let secret = s.resolve(&LocatorDescriptor::text("secret"));
                assert_eq!(secret.len(), 1);
                assert!(!s.entry(secret[0]).unwrap().visible);
            });
        }

        #[test]
        fn test_form_values() {
            let mut state = DomState::default();
            with_snapshot(&state, |s| {
                let select = s.first_css("#role").unwrap();
                assert_eq!(s.value_of(select).as_deref(), Some("s"));
                assert_eq!(s.option_matching(select, "Admin").as_deref(), Some("a"));
                let agree = s.first_css("#agree").unwrap();
                assert_eq!(s.checked_of(agree), Some(true));
                let email = s.first_css("#email").unwrap();
                assert!(s.is_editable(email));
                assert!(!s.is_editable(agree));
            });
            let key = with_snapshot(&state, |s| s.entry(s.first_css("#email").unwrap()).unwrap().key.clone());
            let _ = state.values.insert(key, "admin@example.com".into());
            with_snapshot(&state, |s| {
                let email = s.first_css("#email").unwrap();
                assert_eq!(s.value_of(email).as_deref(), Some("admin@example.com"));
            });
        }

        #[test]
        fn test_keys_are_structural() {
            let state = DomState::default();
            with_snapshot(&state, |s| {
                let h1 = s.first_css("h1").unwrap();
                let key = &s.entry(h1).unwrap().key;
                assert!(key.starts_with("html:0/"));
                assert_eq!(s.index_of_key(key), Some(h1));
            });
        }
    }
}
