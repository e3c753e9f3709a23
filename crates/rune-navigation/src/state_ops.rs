//! Pure stack operations over [`NavigationState`] snapshots.
//!
//! Every operation returns a new snapshot. Requests that make no sense for the
//! current stack (popping past the bottom, replacing at a missing index,
//! popping to a route that is not there) are rejected: a warning is logged and
//! the previous state is returned unchanged.

use crate::route::{NavigationState, Route, RouteEntry, RouteKey};

fn rebuild<R>(
    state: &NavigationState<R>,
    routes: Vec<RouteEntry<R>>,
    index: isize,
    op: &'static str,
) -> NavigationState<R> {
    match NavigationState::new(routes, index) {
        Ok(next) => next,
        Err(err) => {
            tracing::warn!(op, %err, "navigation state operation rejected");
            state.clone()
        }
    }
}

fn unchanged<R>(state: &NavigationState<R>, op: &'static str, reason: &str) -> NavigationState<R> {
    tracing::warn!(op, reason, index = state.index(), "navigation state operation ignored");
    state.clone()
}

fn prefix<R>(state: &NavigationState<R>, len: usize) -> Vec<RouteEntry<R>> {
    state.routes()[..len].to_vec()
}

/// Push `route` above the active route, dropping anything after it.
pub fn push<R>(state: &NavigationState<R>, route: RouteEntry<R>) -> NavigationState<R> {
    let index = state.index() + 1;
    let mut routes = prefix(state, index as usize);
    routes.push(route);
    rebuild(state, routes, index, "push")
}

/// Replace the active route.
pub fn replace<R>(state: &NavigationState<R>, route: RouteEntry<R>) -> NavigationState<R> {
    match state.active_index() {
        Some(index) => replace_at_index(state, route, index as isize),
        None => unchanged(state, "replace", "no active route"),
    }
}

/// Pop the active route.
///
/// With `pop_first` the last remaining route may be popped too, leaving an
/// empty stack.
pub fn pop<R>(state: &NavigationState<R>, pop_first: bool) -> NavigationState<R> {
    let index = state.index() - 1;
    let floor = if pop_first { -1 } else { 0 };
    if index < floor {
        return unchanged(state, "pop", "nothing to pop");
    }
    rebuild(state, prefix(state, (index + 1) as usize), index, "pop")
}

/// Pop `n` routes at once.
pub fn pop_back<R>(state: &NavigationState<R>, n: isize) -> NavigationState<R> {
    if n <= 0 {
        return unchanged(state, "pop_back", "count must be positive");
    }
    let index = state.index() - n;
    if index < 0 {
        return unchanged(state, "pop_back", "count exceeds stack depth");
    }
    rebuild(state, prefix(state, (index + 1) as usize), index, "pop_back")
}

/// Pop everything above the first route.
pub fn pop_to_top<R>(state: &NavigationState<R>) -> NavigationState<R> {
    if state.len() < 2 {
        return state.clone();
    }
    rebuild(state, prefix(state, 1), 0, "pop_to_top")
}

/// Pop until the route with `key` is active.
pub fn pop_to_route<R>(state: &NavigationState<R>, key: &RouteKey) -> NavigationState<R> {
    match state.position_of(key) {
        Some(index) => rebuild(state, prefix(state, index + 1), index as isize, "pop_to_route"),
        None => unchanged(state, "pop_to_route", "route not in stack"),
    }
}

/// Pop until the topmost route whose [`Route::id`] is `id` is active.
///
/// With `include` that route is popped as well.
pub fn pop_by_id<R: Route>(
    state: &NavigationState<R>,
    id: &str,
    include: bool,
) -> NavigationState<R> {
    let found = state
        .routes()
        .iter()
        .rposition(|entry| entry.route.id() == Some(id));
    let index = match (found, include) {
        (Some(i), false) => i as isize,
        (Some(i), true) => i as isize - 1,
        (None, _) => -1,
    };
    if index < 0 {
        return unchanged(state, "pop_by_id", "id not in stack or nothing below it");
    }
    rebuild(state, prefix(state, index as usize + 1), index, "pop_by_id")
}

/// Replace the route at position `i`, keeping the active index.
pub fn replace_at_index<R>(
    state: &NavigationState<R>,
    route: RouteEntry<R>,
    i: isize,
) -> NavigationState<R> {
    if i < 0 || i >= state.len() as isize {
        return unchanged(state, "replace_at_index", "index out of range");
    }
    let mut routes = state.routes().to_vec();
    routes[i as usize] = route;
    rebuild(state, routes, state.index(), "replace_at_index")
}

/// Replace the route below the active one.
pub fn replace_previous<R>(state: &NavigationState<R>, route: RouteEntry<R>) -> NavigationState<R> {
    replace_at_index(state, route, state.index() - 1)
}

/// Replace the route below the active one and pop to it.
pub fn replace_previous_and_pop<R>(
    state: &NavigationState<R>,
    route: RouteEntry<R>,
) -> NavigationState<R> {
    if state.index() < 1 {
        return unchanged(state, "replace_previous_and_pop", "no previous route");
    }
    let index = state.index() - 1;
    let mut routes = prefix(state, index as usize + 1);
    routes[index as usize] = route;
    rebuild(state, routes, index, "replace_previous_and_pop")
}

/// Start over with `routes`; the last one is active unless `index` says otherwise.
pub fn reset<R>(
    state: &NavigationState<R>,
    routes: Vec<RouteEntry<R>>,
    index: Option<isize>,
) -> NavigationState<R> {
    let index = index.unwrap_or(routes.len() as isize - 1);
    rebuild(state, routes, index, "reset")
}
