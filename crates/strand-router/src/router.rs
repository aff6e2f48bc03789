//! Router - route table, match resolution, and history synchronization.

// Allow expect on lock access - poisoning from a panicked writer is
// unrecoverable here, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use strand_core::{Observer, SharedListener, Source, Subscription};

use crate::history::HistoryDriver;
use crate::pattern::{PatternError, RoutePattern};
use crate::query::{parse_query, split_location};

/// A registered route: a compiled pattern plus its opaque handler payload.
///
/// The router treats the handler as inert data; frameworks attach whatever
/// they dispatch on (a component id, a render closure, ...).
pub struct RouteEntry<H> {
    pattern: RoutePattern,
    handler: H,
}

impl<H> RouteEntry<H> {
    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The raw pattern string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.path()
    }

    /// The handler payload.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for RouteEntry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern.path())
            .field("handler", &self.handler)
            .finish()
    }
}

/// The router's atomic snapshot: matched route, bound parameters, and
/// parsed query, all derived from one navigation.
///
/// The three parts are recomputed together and the whole snapshot replaced
/// wholesale, so a consumer can never observe the route of one navigation
/// with the params of another. No match is a valid terminal state
/// ([`route`](RouterState::route) is `None`, both maps empty), not an
/// error.
pub struct RouterState<H> {
    route: Option<Arc<RouteEntry<H>>>,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    location: String,
}

impl<H> RouterState<H> {
    /// The state before `start()` has resolved anything.
    fn unresolved() -> Self {
        Self {
            route: None,
            params: HashMap::new(),
            query: HashMap::new(),
            location: String::new(),
        }
    }

    /// The matched route entry, if any.
    #[must_use]
    pub fn route(&self) -> Option<&RouteEntry<H>> {
        self.route.as_deref()
    }

    /// The matched route's handler payload, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&H> {
        self.route.as_deref().map(RouteEntry::handler)
    }

    /// The matched route's raw pattern string, if any.
    #[must_use]
    pub fn matched_path(&self) -> Option<&str> {
        self.route.as_deref().map(RouteEntry::path)
    }

    /// Bound path parameters; empty when unmatched or parameter-free.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// One bound parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parsed query pairs; empty when unmatched or query-free.
    #[must_use]
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// One query value by key.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The raw location this snapshot was resolved from.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether any route matched.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.route.is_some()
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for RouterState<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterState")
            .field("location", &self.location)
            .field("route", &self.matched_path())
            .field("params", &self.params)
            .field("query", &self.query)
            .finish()
    }
}

struct RouterInner<H> {
    driver: Box<dyn HistoryDriver>,
    routes: RwLock<Vec<Arc<RouteEntry<H>>>>,
    state: RwLock<Arc<RouterState<H>>>,
    observer: Observer,
    hooked: AtomicBool,
}

/// URL router over an injected [`HistoryDriver`].
///
/// Routes are matched per the segment algorithm in [`RoutePattern`]:
/// equal segment counts, exact literals, non-empty parameter binding.
/// Among patterns matching the same path, the one with the fewest
/// parameter segments wins, and equally specific patterns resolve to the
/// most recently registered one - a deliberate, documented policy.
///
/// `Router` is a cheap handle over shared interior state; clones observe
/// and mutate the same route table and snapshot.
///
/// # Example
///
/// ```
/// use strand_router::{MemoryHistory, Router};
///
/// let history = MemoryHistory::new("/");
/// let router = Router::new(history.clone());
/// router.add_route("/", "home").unwrap();
/// router.add_route("/users/:id", "user").unwrap();
/// router.start();
///
/// router.push("/users/123?tab=posts");
/// let state = router.snapshot();
/// assert_eq!(state.handler(), Some(&"user"));
/// assert_eq!(state.param("id"), Some("123"));
/// assert_eq!(state.query_value("tab"), Some("posts"));
/// ```
pub struct Router<H> {
    inner: Arc<RouterInner<H>>,
}

impl<H> Clone for Router<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H> Router<H>
where
    H: Send + Sync + 'static,
{
    /// Create a router over `driver`. No resolution happens until
    /// [`start`](Router::start).
    pub fn new(driver: impl HistoryDriver + 'static) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                driver: Box::new(driver),
                routes: RwLock::new(Vec::new()),
                state: RwLock::new(Arc::new(RouterState::unresolved())),
                observer: Observer::new(),
                hooked: AtomicBool::new(false),
            }),
        }
    }

    /// Register a route. Fails fast on a malformed pattern; duplicate
    /// patterns are allowed and the most recent registration wins ties.
    pub fn add_route(&self, pattern: &str, handler: H) -> Result<(), PatternError> {
        let pattern = RoutePattern::parse(pattern)?;
        tracing::debug!(pattern = pattern.path(), "route registered");
        self.inner
            .routes
            .write()
            .expect("Router lock poisoned")
            .push(Arc::new(RouteEntry { pattern, handler }));
        Ok(())
    }

    /// Resolve the driver's current location without pushing a history
    /// entry, and hook externally triggered navigation.
    ///
    /// Idempotent: every call re-resolves (and notifies), but the
    /// navigation hook is registered exactly once.
    pub fn start(&self) {
        if !self.inner.hooked.swap(true, Ordering::SeqCst) {
            let weak = Arc::downgrade(&self.inner);
            // The hook holds only a weak reference; once every router
            // handle is gone it degrades to a no-op.
            let _hook = self.inner.driver.on_navigate(Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    resolve_and_notify(&inner);
                }
            }));
        }
        resolve_and_notify(&self.inner);
    }

    /// Push a new history entry, resolve it, and notify.
    ///
    /// Never errors: a location no pattern matches resolves to the
    /// "not found" snapshot.
    pub fn push(&self, url: &str) {
        self.inner.driver.push(url);
        resolve_and_notify(&self.inner);
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouterState<H>> {
        self.inner.state.read().expect("Router lock poisoned").clone()
    }

    /// Register a change listener. The returned [`Subscription`] removes
    /// exactly this registration and is idempotent.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.observer.subscribe(listener)
    }
}

impl<H> Source for Router<H>
where
    H: Send + Sync + 'static,
{
    type Snapshot = Arc<RouterState<H>>;

    fn snapshot(&self) -> Arc<RouterState<H>> {
        Router::snapshot(self)
    }

    fn subscribe_listener(&self, listener: SharedListener) -> Subscription {
        self.inner.observer.subscribe_shared(listener)
    }
}

impl<H: std::fmt::Debug> std::fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read().expect("Router lock poisoned").clone();
        f.debug_struct("Router")
            .field("state", &*state)
            .finish()
    }
}

/// Re-resolve the driver's current location, swap the snapshot, notify.
///
/// This is the single resolution path shared by `start`, `push`, and the
/// external-navigation hook, so all three converge on identical state for
/// the same location.
fn resolve_and_notify<H>(inner: &RouterInner<H>) {
    let location = inner.driver.location();
    let next = Arc::new(resolve_location(inner, &location));
    {
        let mut state = inner.state.write().expect("Router lock poisoned");
        *state = next;
    }
    inner.observer.notify();
}

fn resolve_location<H>(inner: &RouterInner<H>, location: &str) -> RouterState<H> {
    let (path, raw_query) = split_location(location);
    let segments = split_path_segments(path);

    let best = {
        let routes = inner.routes.read().expect("Router lock poisoned");
        let mut best: Option<(Arc<RouteEntry<H>>, HashMap<String, String>)> = None;
        for entry in routes.iter() {
            if let Some(params) = entry.pattern.capture(&segments) {
                let replace = match &best {
                    // `<=`: equally specific later registrations replace
                    // earlier ones - most recently registered wins ties.
                    Some((current, _)) => {
                        entry.pattern.param_count() <= current.pattern.param_count()
                    }
                    None => true,
                };
                if replace {
                    best = Some((entry.clone(), params));
                }
            }
        }
        best
    };

    match best {
        Some((entry, params)) => {
            tracing::debug!(location, route = entry.path(), "route matched");
            RouterState {
                route: Some(entry),
                params,
                query: parse_query(raw_query),
                location: location.to_string(),
            }
        }
        None => {
            tracing::debug!(location, "no route matched");
            RouterState {
                route: None,
                params: HashMap::new(),
                query: HashMap::new(),
                location: location.to_string(),
            }
        }
    }
}

/// Split a path into raw segments: one leading slash is dropped, all other
/// empty segments (double or trailing slashes) are kept so they can fail to
/// match.
fn split_path_segments(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}
