//! Fixture graph with dependency injection and guaranteed teardown.
//!
//! A [`FixtureGraph`] maps fixture names to a factory and its declared
//! dependencies. It is validated once when built: unknown dependencies and
//! cycles are configuration errors reported before any test runs. Each test
//! instantiates the graph into a [`FixtureScope`], which constructs fixtures
//! lazily (once per scope, dependencies first) and tears them down in
//! reverse construction order after the test body returns, fails or panics.
//!
//! ```
//! use pagekit::fixture::FixtureGraph;
//!
//! let graph = FixtureGraph::builder()
//!     .external("baseUrl")
//!     .fixture("greeting", &["baseUrl"], |deps| async move {
//!         let base = deps.get::<String>("baseUrl")?;
//!         Ok::<_, pagekit::PageKitError>(format!("hello from {base}"))
//!     })
//!     .build()
//!     .unwrap();
//! assert_eq!(graph.resolution_order("greeting").unwrap(), vec!["baseUrl", "greeting"]);
//! ```

use crate::result::{PageKitError, PageKitResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

type AnyValue = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(FixtureDeps) -> BoxFuture<'static, PageKitResult<AnyValue>> + Send + Sync>;
type Teardown = Arc<dyn Fn(AnyValue) -> BoxFuture<'static, PageKitResult<()>> + Send + Sync>;

/// How a fixture gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKind {
    /// Supplied by the runner through [`FixtureScope::provide`]
    External,
    /// Built by a factory
    Factory,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::External => "external",
            Self::Factory => "factory",
        })
    }
}

struct FixtureDef {
    dependencies: Vec<String>,
    factory: Option<Factory>,
    teardown: Option<Teardown>,
}

impl FixtureDef {
    fn kind(&self) -> FixtureKind {
        if self.factory.is_some() {
            FixtureKind::Factory
        } else {
            FixtureKind::External
        }
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Declares fixtures; [`Self::build`] validates the graph
#[derive(Default)]
#[must_use]
pub struct FixtureGraphBuilder {
    fixtures: BTreeMap<String, FixtureDef>,
    duplicates: Vec<String>,
}

impl fmt::Debug for FixtureGraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureGraphBuilder")
            .field("fixtures", &self.fixtures.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FixtureGraphBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(mut self, name: &str, def: FixtureDef) -> Self {
        if self.fixtures.insert(name.to_string(), def).is_some() {
            self.duplicates.push(name.to_string());
        }
        self
    }

    /// Declare a fixture supplied from outside the graph
    pub fn external(self, name: &str) -> Self {
        self.insert(
            name,
            FixtureDef {
                dependencies: Vec::new(),
                factory: None,
                teardown: None,
            },
        )
    }

    /// Declare a fixture built by `factory` from `dependencies`
    pub fn fixture<T, F, Fut>(self, name: &str, dependencies: &[&str], factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(FixtureDeps) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PageKitResult<T>> + Send + 'static,
    {
        self.insert(
            name,
            FixtureDef {
                dependencies: dependencies.iter().map(ToString::to_string).collect(),
                factory: Some(erase_factory(factory)),
                teardown: None,
            },
        )
    }

    /// Declare a fixture with a teardown step run at the end of each test
    pub fn fixture_with_teardown<T, F, Fut, D, DFut>(
        self,
        name: &str,
        dependencies: &[&str],
        factory: F,
        teardown: D,
    ) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(FixtureDeps) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PageKitResult<T>> + Send + 'static,
        D: Fn(Arc<T>) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = PageKitResult<()>> + Send + 'static,
    {
        let fixture = name.to_string();
        let teardown: Teardown = Arc::new(move |value: AnyValue| match value.downcast::<T>() {
            Ok(typed) => teardown(typed).boxed(),
            Err(_) => {
                let message = format!("fixture '{fixture}' holds an unexpected type at teardown");
                async move { Err(PageKitError::FixtureError { message }) }.boxed()
            }
        });
        self.insert(
            name,
            FixtureDef {
                dependencies: dependencies.iter().map(ToString::to_string).collect(),
                factory: Some(erase_factory(factory)),
                teardown: Some(teardown),
            },
        )
    }

    /// Validate and freeze the graph
    ///
    /// # Errors
    ///
    /// [`PageKitError::FixtureError`] for duplicate names,
    /// [`PageKitError::UnknownFixture`] for undeclared dependencies and
    /// [`PageKitError::FixtureCycle`] naming the first cycle found.
    pub fn build(self) -> PageKitResult<FixtureGraph> {
        if let Some(name) = self.duplicates.first() {
            return Err(PageKitError::FixtureError {
                message: format!("fixture '{name}' is declared more than once"),
            });
        }
        for (name, def) in &self.fixtures {
            if let Some(missing) = def
                .dependencies
                .iter()
                .find(|d| !self.fixtures.contains_key(d.as_str()))
            {
                return Err(PageKitError::UnknownFixture {
                    name: missing.clone(),
                    required_by: name.clone(),
                });
            }
        }
        let graph = FixtureGraph {
            fixtures: self.fixtures,
        };
        if let Some(cycle) = graph.find_cycle() {
            return Err(PageKitError::FixtureCycle { cycle });
        }
        debug!(fixtures = graph.fixtures.len(), "fixture graph built");
        Ok(graph)
    }
}

fn erase_factory<T, F, Fut>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(FixtureDeps) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PageKitResult<T>> + Send + 'static,
{
    Arc::new(move |deps: FixtureDeps| {
        let built = factory(deps);
        async move { Ok::<_, PageKitError>(Arc::new(built.await?) as AnyValue) }.boxed()
    })
}

// =============================================================================
// GRAPH
// =============================================================================

/// Validated, acyclic fixture graph
pub struct FixtureGraph {
    fixtures: BTreeMap<String, FixtureDef>,
}

impl fmt::Debug for FixtureGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureGraph")
            .field("fixtures", &self.fixtures.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl FixtureGraph {
    /// Start declaring a graph
    pub fn builder() -> FixtureGraphBuilder {
        FixtureGraphBuilder::new()
    }

    /// Fixture names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.fixtures.keys().map(String::as_str).collect()
    }

    /// Whether `name` is declared
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fixtures.contains_key(name)
    }

    /// Declared dependencies of `name`
    #[must_use]
    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.fixtures.get(name).map(|d| d.dependencies.as_slice())
    }

    /// How `name` gets its value
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<FixtureKind> {
        self.fixtures.get(name).map(FixtureDef::kind)
    }

    /// Number of fixtures
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Whether the graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Topological order in which `name` and its transitive dependencies are
    /// constructed. Dependencies come in declaration order.
    ///
    /// # Errors
    ///
    /// [`PageKitError::UnknownFixture`] when `name` is not declared.
    pub fn resolution_order(&self, name: &str) -> PageKitResult<Vec<String>> {
        self.resolution_order_all(&[name])
    }

    /// Combined construction order for several fixtures
    ///
    /// # Errors
    ///
    /// [`PageKitError::UnknownFixture`] when any name is not declared.
    pub fn resolution_order_all(&self, names: &[&str]) -> PageKitResult<Vec<String>> {
        let mut order = Vec::new();
        let mut marks = HashMap::new();
        for name in names {
            if !self.contains(name) {
                return Err(PageKitError::UnknownFixture {
                    name: (*name).to_string(),
                    required_by: "test".to_string(),
                });
            }
            self.visit(name, &mut marks, &mut order);
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) {
        if marks.contains_key(name) {
            return;
        }
        let _ = marks.insert(name, Mark::Visiting);
        if let Some(def) = self.fixtures.get(name) {
            for dependency in &def.dependencies {
                self.visit(dependency, marks, order);
            }
        }
        let _ = marks.insert(name, Mark::Done);
        order.push(name.to_string());
    }

    /// First dependency cycle, as a path that starts and ends with the same name
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut stack: Vec<&str> = Vec::new();
        for name in self.fixtures.keys() {
            if let Some(cycle) = self.cycle_from(name, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    fn cycle_from<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(ToString::to_string).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }
        let _ = marks.insert(name, Mark::Visiting);
        stack.push(name);
        if let Some(def) = self.fixtures.get(name) {
            for dependency in &def.dependencies {
                if let Some(cycle) = self.cycle_from(dependency, marks, stack) {
                    return Some(cycle);
                }
            }
        }
        let _ = stack.pop();
        let _ = marks.insert(name, Mark::Done);
        None
    }

    /// Check that every name a test requires is declared
    ///
    /// # Errors
    ///
    /// [`PageKitError::UnknownFixture`] naming the first missing fixture.
    pub fn validate_required(&self, test: &str, required: &[&str]) -> PageKitResult<()> {
        match required.iter().find(|n| !self.contains(n)) {
            Some(missing) => Err(PageKitError::UnknownFixture {
                name: (*missing).to_string(),
                required_by: test.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Fresh per-test scope
    #[must_use]
    pub fn scope(self: &Arc<Self>) -> FixtureScope {
        FixtureScope {
            inner: Arc::new(ScopeInner {
                graph: Arc::clone(self),
                values: Mutex::new(HashMap::new()),
                constructed: Mutex::new(Vec::new()),
                resolving: tokio::sync::Mutex::new(()),
            }),
        }
    }
}

// =============================================================================
// DEPENDENCIES
// =============================================================================

/// Values of a fixture's declared dependencies, handed to its factory
#[derive(Clone)]
pub struct FixtureDeps {
    fixture: String,
    values: HashMap<String, AnyValue>,
}

impl fmt::Debug for FixtureDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureDeps")
            .field("fixture", &self.fixture)
            .field("available", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FixtureDeps {
    /// Name of the fixture being built
    #[must_use]
    pub fn fixture(&self) -> &str {
        &self.fixture
    }

    /// Typed dependency value
    ///
    /// # Errors
    ///
    /// [`PageKitError::FixtureError`] if `name` was not declared as a
    /// dependency or holds another type.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> PageKitResult<Arc<T>> {
        let value = self.values.get(name).ok_or_else(|| PageKitError::FixtureError {
            message: format!("fixture '{}' did not declare dependency '{name}'", self.fixture),
        })?;
        downcast(name, Arc::clone(value))
    }
}

fn downcast<T: Send + Sync + 'static>(name: &str, value: AnyValue) -> PageKitResult<Arc<T>> {
    value.downcast::<T>().map_err(|_| PageKitError::FixtureError {
        message: format!(
            "fixture '{name}' is not a {}",
            std::any::type_name::<T>()
        ),
    })
}

// =============================================================================
// SCOPE
// =============================================================================

struct ScopeInner {
    graph: Arc<FixtureGraph>,
    values: Mutex<HashMap<String, AnyValue>>,
    constructed: Mutex<Vec<String>>,
    resolving: tokio::sync::Mutex<()>,
}

/// One test's fixture instances
#[derive(Clone)]
pub struct FixtureScope {
    inner: Arc<ScopeInner>,
}

impl fmt::Debug for FixtureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureScope")
            .field("constructed", &self.constructed())
            .finish()
    }
}

impl FixtureScope {
    fn poisoned() -> PageKitError {
        PageKitError::FixtureError {
            message: "fixture scope lock poisoned".to_string(),
        }
    }

    /// Graph this scope instantiates
    #[must_use]
    pub fn graph(&self) -> &Arc<FixtureGraph> {
        &self.inner.graph
    }

    /// Supply the value of an external fixture
    ///
    /// # Errors
    ///
    /// [`PageKitError::UnknownFixture`] if `name` is not declared, or
    /// [`PageKitError::FixtureError`] if it is not external.
    pub fn provide<T: Send + Sync + 'static>(&self, name: &str, value: T) -> PageKitResult<()> {
        self.provide_shared(name, Arc::new(value))
    }

    /// Supply an already shared external value
    ///
    /// # Errors
    ///
    /// See [`Self::provide`].
    pub fn provide_shared<T: Send + Sync + 'static>(
        &self,
        name: &str,
        value: Arc<T>,
    ) -> PageKitResult<()> {
        match self.inner.graph.kind(name) {
            None => {
                return Err(PageKitError::UnknownFixture {
                    name: name.to_string(),
                    required_by: "runner".to_string(),
                })
            }
            Some(FixtureKind::Factory) => {
                return Err(PageKitError::FixtureError {
                    message: format!("fixture '{name}' is built by a factory and cannot be provided"),
                })
            }
            Some(FixtureKind::External) => {}
        }
        let mut values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
        let _ = values.insert(name.to_string(), value as AnyValue);
        Ok(())
    }

    /// Names constructed so far, in construction order
    #[must_use]
    pub fn constructed(&self) -> Vec<String> {
        self.inner
            .constructed
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn cached(&self, name: &str) -> PageKitResult<Option<AnyValue>> {
        let values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
        Ok(values.get(name).cloned())
    }

    /// Typed value of `name`, constructing it and its dependencies on first use
    ///
    /// # Errors
    ///
    /// Errors from factories, unknown names, missing external values or a
    /// type mismatch.
    pub async fn get<T: Send + Sync + 'static>(&self, name: &str) -> PageKitResult<Arc<T>> {
        if let Some(value) = self.cached(name)? {
            return downcast(name, value);
        }
        let _guard = self.inner.resolving.lock().await;
        for fixture in self.inner.graph.resolution_order(name)? {
            if self.cached(&fixture)?.is_some() {
                continue;
            }
            self.construct(&fixture).await?;
        }
        let value = self.cached(name)?.ok_or_else(|| PageKitError::FixtureError {
            message: format!("fixture '{name}' was not constructed"),
        })?;
        downcast(name, value)
    }

    async fn construct(&self, name: &str) -> PageKitResult<()> {
        let graph = &self.inner.graph;
        let def = graph.fixtures.get(name).ok_or_else(|| PageKitError::UnknownFixture {
            name: name.to_string(),
            required_by: "test".to_string(),
        })?;
        let Some(factory) = &def.factory else {
            return Err(PageKitError::FixtureError {
                message: format!("external fixture '{name}' was not provided"),
            });
        };
        let deps = {
            let values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
            FixtureDeps {
                fixture: name.to_string(),
                values: def
                    .dependencies
                    .iter()
                    .filter_map(|d| values.get(d).map(|v| (d.clone(), Arc::clone(v))))
                    .collect(),
            }
        };
        debug!(fixture = name, "constructing");
        let value = factory(deps).await.map_err(|e| {
            warn!(fixture = name, error = %e, "fixture construction failed");
            e
        })?;
        {
            let mut values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
            let _ = values.insert(name.to_string(), value);
        }
        self.inner
            .constructed
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(name.to_string());
        Ok(())
    }

    /// Tear down constructed fixtures in reverse order and drop every value.
    ///
    /// Every teardown runs even if an earlier one fails or panics; the first
    /// failure is returned.
    ///
    /// # Errors
    ///
    /// [`PageKitError::FixtureError`] describing the first failed teardown.
    pub async fn teardown(&self) -> PageKitResult<()> {
        let _guard = self.inner.resolving.lock().await;
        let constructed: Vec<String> = {
            let mut constructed = self.inner.constructed.lock().map_err(|_| Self::poisoned())?;
            std::mem::take(&mut *constructed)
        };
        let mut first_error: Option<PageKitError> = None;
        for name in constructed.iter().rev() {
            let value = {
                let mut values = self.inner.values.lock().map_err(|_| Self::poisoned())?;
                values.remove(name)
            };
            let (Some(value), Some(teardown)) = (
                value,
                self.inner.graph.fixtures.get(name).and_then(|d| d.teardown.clone()),
            ) else {
                continue;
            };
            debug!(fixture = %name, "teardown");
            let outcome = AssertUnwindSafe(teardown(value)).catch_unwind().await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("fixture '{name}' teardown failed: {e}")),
                Err(panic) => Some(format!(
                    "fixture '{name}' teardown panicked: {}",
                    panic_message(panic.as_ref())
                )),
            };
            if let Some(message) = failure {
                warn!(fixture = %name, %message, "teardown failed");
                if first_error.is_none() {
                    first_error = Some(PageKitError::FixtureError { message });
                }
            }
        }
        if let Ok(mut values) = self.inner.values.lock() {
            values.clear();
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Run `body` with this scope, then tear the scope down.
    ///
    /// Teardown runs whether the body succeeds, fails or panics. A panic is
    /// reported as [`PageKitError::AssertionFailed`]. A body error takes
    /// precedence over a teardown error.
    ///
    /// # Errors
    ///
    /// The body's error, its panic, or the first teardown failure.
    pub async fn run<T, F, Fut>(self, body: F) -> PageKitResult<T>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = PageKitResult<T>>,
    {
        let outcome = AssertUnwindSafe(body(self.clone())).catch_unwind().await;
        let teardown = self.teardown().await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => Err(PageKitError::AssertionFailed {
                message: format!("test panicked: {}", panic_message(panic.as_ref())),
            }),
        };
        match (result, teardown) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => {
                info!("scope closed");
                Ok(value)
            }
        }
    }
}

/// Message carried by a panic payload
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    mod build_tests {
        use super::*;

        #[test]
        fn test_cycle_detected_at_build_time() {
            let err = FixtureGraph::builder()
                .fixture("a", &["b"], |_| async { Ok(1_u8) })
                .fixture("b", &["c"], |_| async { Ok(2_u8) })
                .fixture("c", &["a"], |_| async { Ok(3_u8) })
                .build()
                .unwrap_err();
            match err {
                PageKitError::FixtureCycle { cycle } => {
                    assert_eq!(cycle, vec!["a", "b", "c", "a"]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_self_dependency_is_a_cycle() {
            let err = FixtureGraph::builder()
                .fixture("loop", &["loop"], |_| async { Ok(()) })
                .build()
                .unwrap_err();
            assert_eq!(err.to_string(), "Fixture dependency cycle: loop -> loop");
        }

        #[test]
        fn test_unknown_dependency() {
            let err = FixtureGraph::builder()
                .fixture("adminDashboard", &["adminSession"], |_| async { Ok(()) })
                .build()
                .unwrap_err();
            assert!(matches!(
                err,
                PageKitError::UnknownFixture { ref name, ref required_by }
                    if name == "adminSession" && required_by == "adminDashboard"
            ));
        }

        #[test]
        fn test_duplicate_declaration() {
            let err = FixtureGraph::builder()
                .external("config")
                .external("config")
                .build()
                .unwrap_err();
            assert!(matches!(err, PageKitError::FixtureError { .. }));
        }

        #[test]
        fn test_resolution_order_is_topological() {
            let graph = FixtureGraph::builder()
                .external("browser")
                .fixture("session", &["browser"], |_| async { Ok(()) })
                .fixture("nav", &["session"], |_| async { Ok(()) })
                .fixture("footer", &["session"], |_| async { Ok(()) })
                .fixture("page", &["nav", "footer", "session"], |_| async { Ok(()) })
                .build()
                .unwrap();
            assert_eq!(
                graph.resolution_order("page").unwrap(),
                vec!["browser", "session", "nav", "footer", "page"]
            );
            assert_eq!(graph.kind("browser"), Some(FixtureKind::External));
            assert!(graph.resolution_order("missing").is_err());
            assert!(graph.validate_required("t", &["nav", "missing"]).is_err());
        }
    }

    mod scope_tests {
        use super::*;

        fn graph(events: &Arc<Mutex<Vec<String>>>, built: &Arc<AtomicUsize>) -> Arc<FixtureGraph> {
            let (e1, e2, e3) = (Arc::clone(events), Arc::clone(events), Arc::clone(events));
            let counter = Arc::clone(built);
            Arc::new(
                FixtureGraph::builder()
                    .external("prefix")
                    .fixture_with_teardown(
                        "session",
                        &["prefix"],
                        move |deps| {
                            let counter = Arc::clone(&counter);
                            async move {
                                let _ = counter.fetch_add(1, Ordering::SeqCst);
                                let prefix = deps.get::<String>("prefix")?;
                                Ok::<_, PageKitError>(format!("{prefix}-session"))
                            }
                        },
                        move |value: Arc<String>| {
                            let events = Arc::clone(&e1);
                            async move {
                                events.lock().unwrap().push(format!("close {value}"));
                                Ok(())
                            }
                        },
                    )
                    .fixture_with_teardown(
                        "popup",
                        &["session"],
                        |deps| async move {
                            let session = deps.get::<String>("session")?;
                            Ok::<_, PageKitError>(format!("popup of {session}"))
                        },
                        move |_: Arc<String>| {
                            let events = Arc::clone(&e2);
                            async move {
                                events.lock().unwrap().push("close popup".to_string());
                                Err(PageKitError::PageError {
                                    message: "already closed".to_string(),
                                })
                            }
                        },
                    )
                    .fixture_with_teardown(
                        "panicky",
                        &[],
                        |_| async { Ok(0_u32) },
                        move |_: Arc<u32>| {
                            let events = Arc::clone(&e3);
                            async move {
                                events.lock().unwrap().push("panicky".to_string());
                                let missing: Option<()> = None;
                                missing.expect("boom");
                                Ok::<(), PageKitError>(())
                            }
                        },
                    )
                    .build()
                    .unwrap(),
            )
        }

        #[tokio::test]
        async fn test_lazy_one_shot_construction() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let scope = graph(&events, &built).scope();
            scope.provide("prefix", "admin".to_string()).unwrap();
            assert!(scope.constructed().is_empty());
            let popup = scope.get::<String>("popup").await.unwrap();
            assert_eq!(*popup, "popup of admin-session");
            let _ = scope.get::<String>("session").await.unwrap();
            assert_eq!(built.load(Ordering::SeqCst), 1);
            assert_eq!(scope.constructed(), vec!["session", "popup"]);
        }

        #[tokio::test]
        async fn test_teardown_reverse_order_and_first_error() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let scope = graph(&events, &built).scope();
            scope.provide("prefix", "student".to_string()).unwrap();
            let _ = scope.get::<String>("popup").await.unwrap();
            let _ = scope.get::<u32>("panicky").await.unwrap();
            let err = scope.teardown().await.unwrap_err();
            assert!(err.to_string().contains("panicked: boom"));
            assert_eq!(
                *events.lock().unwrap(),
                vec!["panicky", "close popup", "close student-session"]
            );
            assert!(scope.constructed().is_empty());
        }

        #[tokio::test]
        async fn test_run_tears_down_after_panicking_body() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let scope = graph(&events, &built).scope();
            scope.provide("prefix", "admin".to_string()).unwrap();
            let result: PageKitResult<()> = scope
                .run(|scope| async move {
                    let _ = scope.get::<String>("session").await?;
                    let missing: Option<()> = None;
                    missing.expect("assertion in body");
                    Ok::<(), PageKitError>(())
                })
                .await;
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), "Assertion failed: test panicked: assertion in body");
            assert_eq!(*events.lock().unwrap(), vec!["close admin-session"]);
        }

        #[tokio::test]
        async fn test_body_error_wins_over_teardown_error() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let scope = graph(&events, &built).scope();
            scope.provide("prefix", "admin".to_string()).unwrap();
            let err = scope
                .run(|scope| async move {
                    let _ = scope.get::<String>("popup").await?;
                    Err::<(), _>(PageKitError::AssertionFailed {
                        message: "body".to_string(),
                    })
                })
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Assertion failed: body");
            assert_eq!(events.lock().unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_missing_external_and_type_mismatch() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let scope = graph(&events, &built).scope();
            let err = scope.get::<String>("session").await.unwrap_err();
            assert!(err.to_string().contains("external fixture 'prefix' was not provided"));
            scope.provide("prefix", "x".to_string()).unwrap();
            let err = scope.get::<u64>("session").await.unwrap_err();
            assert!(matches!(err, PageKitError::FixtureError { .. }));
            assert!(scope.provide("session", 1_u8).is_err());
            assert!(scope.provide("nope", 1_u8).is_err());
        }

        #[tokio::test]
        async fn test_scopes_are_independent() {
            let events = log();
            let built = Arc::new(AtomicUsize::new(0));
            let graph = graph(&events, &built);
            for prefix in ["one", "two"] {
                let scope = graph.scope();
                scope.provide("prefix", prefix.to_string()).unwrap();
                let _ = scope.get::<String>("session").await.unwrap();
                scope.teardown().await.unwrap();
            }
            assert_eq!(built.load(Ordering::SeqCst), 2);
        }
    }
}
