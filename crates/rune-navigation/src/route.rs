//! Routes, route keys and immutable navigation state snapshots.
//!
//! A route is an opaque caller-owned value. The engine only needs a stable
//! key for it; routes that do not carry one are keyed by a [`KeyGenerator`]
//! owned by a single navigator instance. The key travels with the route inside
//! a [`RouteEntry`] so caller data is never mutated.

use std::fmt;
use std::sync::Arc;

use crate::error::{NavError, Result};

/// Stable, unique identity of a route within a navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(Arc<str>);

impl RouteKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RouteKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

/// Caller-supplied navigable content.
///
/// Both methods are optional; a route without an explicit key gets a
/// generated one when it is wrapped into a [`RouteEntry`].
pub trait Route {
    /// Explicit key for this route, if the caller has one.
    fn key(&self) -> Option<RouteKey> {
        None
    }

    /// Caller-level id used by [`crate::state_ops::pop_by_id`].
    fn id(&self) -> Option<&str> {
        None
    }
}

/// Per-engine key generator for routes that lack an explicit key.
///
/// Keys are decimal counters starting at 1, so generated keys sort in
/// creation order under the scene ordering (shorter keys first).
#[derive(Debug)]
pub struct KeyGenerator {
    next: u64,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Produce a fresh key.
    pub fn next_key(&mut self) -> RouteKey {
        let key = RouteKey::from(self.next.to_string());
        self.next += 1;
        key
    }

    /// Wrap a route, keeping its explicit key or generating one.
    pub fn entry<R: Route>(&mut self, route: R) -> RouteEntry<R> {
        self.entry_arc(Arc::new(route))
    }

    /// Wrap an already shared route.
    pub fn entry_arc<R: Route>(&mut self, route: Arc<R>) -> RouteEntry<R> {
        let key = match route.key() {
            Some(key) => key,
            None => self.next_key(),
        };
        RouteEntry { key, route }
    }
}

/// A route paired with the key it keeps for its whole lifetime.
#[derive(Debug)]
pub struct RouteEntry<R> {
    pub key: RouteKey,
    pub route: Arc<R>,
}

impl<R> Clone for RouteEntry<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            route: Arc::clone(&self.route),
        }
    }
}

impl<R> RouteEntry<R> {
    pub fn with_key(key: impl Into<RouteKey>, route: R) -> Self {
        Self {
            key: key.into(),
            route: Arc::new(route),
        }
    }

    /// Same key and the very same route value.
    pub fn same_as(&self, other: &Self) -> bool {
        self.key == other.key && Arc::ptr_eq(&self.route, &other.route)
    }
}

/// Immutable snapshot of the navigation stack.
///
/// `index` is the active position, `-1` only when no route is active.
/// A new snapshot replaces the previous one entirely.
#[derive(Debug)]
pub struct NavigationState<R> {
    routes: Vec<RouteEntry<R>>,
    index: isize,
}

impl<R> Clone for NavigationState<R> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            index: self.index,
        }
    }
}

impl<R> Default for NavigationState<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> PartialEq for NavigationState<R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(other.routes.iter())
                .all(|(a, b)| a.same_as(b))
    }
}

impl<R> NavigationState<R> {
    /// Build a validated snapshot.
    ///
    /// Fails when `index` is outside `[-1, routes.len() - 1]` or when two
    /// routes share a key.
    pub fn new(routes: Vec<RouteEntry<R>>, index: isize) -> Result<Self> {
        if index < -1 || index >= routes.len() as isize {
            return Err(NavError::InvalidIndex {
                index,
                len: routes.len(),
            });
        }
        for (i, entry) in routes.iter().enumerate() {
            if routes[..i].iter().any(|earlier| earlier.key == entry.key) {
                return Err(NavError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(Self { routes, index })
    }

    /// Snapshot whose last route is active.
    pub fn from_routes(routes: Vec<RouteEntry<R>>) -> Result<Self> {
        let index = routes.len() as isize - 1;
        Self::new(routes, index)
    }

    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            index: -1,
        }
    }

    pub fn routes(&self) -> &[RouteEntry<R>] {
        &self.routes
    }

    pub fn index(&self) -> isize {
        self.index
    }

    /// The active position, `None` when nothing is active.
    pub fn active_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    pub fn active_route(&self) -> Option<&RouteEntry<R>> {
        self.active_index().and_then(|i| self.routes.get(i))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn position_of(&self, key: &RouteKey) -> Option<usize> {
        self.routes.iter().position(|entry| &entry.key == key)
    }

    pub fn contains_key(&self, key: &RouteKey) -> bool {
        self.position_of(key).is_some()
    }
}
