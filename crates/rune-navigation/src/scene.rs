//! Scene stack reconciliation.
//!
//! Scenes are the engine's view of the route stack: one per route, plus at
//! most one stale scene (the formerly active route that left the stack and is
//! still animating out). [`reconcile`] diffs a new [`NavigationState`] against
//! the current scene list and reports whether anything changed, so renderers
//! can skip work without comparing scenes themselves.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SceneConfig;
use crate::route::{NavigationState, RouteKey};

/// Engine-derived wrapper binding a route to its stack position.
#[derive(Debug)]
pub struct Scene<R> {
    pub key: RouteKey,
    pub index: usize,
    pub route: Arc<R>,
    pub is_active: bool,
    pub is_stale: bool,
    /// Assigned the first time the scene is seen, then carried along.
    pub config: Option<Arc<SceneConfig>>,
}

impl<R> Clone for Scene<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            index: self.index,
            route: Arc::clone(&self.route),
            is_active: self.is_active,
            is_stale: self.is_stale,
            config: self.config.clone(),
        }
    }
}

impl<R> Scene<R> {
    /// Equal in every derived field and pointing at the same route value.
    /// The config is not compared.
    pub fn same_as(&self, other: &Self) -> bool {
        self.key == other.key
            && self.index == other.index
            && self.is_stale == other.is_stale
            && self.is_active == other.is_active
            && Arc::ptr_eq(&self.route, &other.route)
    }
}

/// Shorter keys first, then lexical, so generated counters sort numerically.
fn compare_keys(a: &RouteKey, b: &RouteKey) -> Ordering {
    a.as_str()
        .len()
        .cmp(&b.as_str().len())
        .then_with(|| a.as_str().cmp(b.as_str()))
}

fn compare_scenes<R>(a: &Arc<Scene<R>>, b: &Arc<Scene<R>>) -> Ordering {
    a.index
        .cmp(&b.index)
        .then_with(|| a.is_stale.cmp(&b.is_stale))
        .then_with(|| compare_keys(&a.key, &b.key))
}

fn same_option<R>(a: &Option<Arc<Scene<R>>>, b: &Option<Arc<Scene<R>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Result of diffing a navigation state against the current scenes.
#[derive(Debug)]
pub struct Reconciliation<R> {
    pub scenes: Vec<Arc<Scene<R>>>,
    /// `false` when `scenes` holds exactly the input scenes.
    pub changed: bool,
    pub active_scene: Option<Arc<Scene<R>>>,
    /// Scene that was active before; may be the same as `active_scene`.
    pub prev_active_scene: Option<Arc<Scene<R>>>,
}

impl<R> Reconciliation<R> {
    /// Attach a config to every scene that does not have one yet.
    ///
    /// `configure` runs once per newly seen scene. Active and previously
    /// active handles are remapped onto the configured scenes.
    pub fn configure(&mut self, mut configure: impl FnMut(&Scene<R>) -> Arc<SceneConfig>) {
        let mut touched = false;
        for scene in self.scenes.iter_mut() {
            if scene.config.is_some() {
                continue;
            }
            let mut configured = Scene::clone(scene);
            configured.config = Some(configure(&configured));
            *scene = Arc::new(configured);
            touched = true;
        }
        if !touched {
            return;
        }

        let lookup = |handle: &Option<Arc<Scene<R>>>| {
            handle.as_ref().and_then(|old| {
                self.scenes
                    .iter()
                    .find(|scene| scene.key == old.key)
                    .map(Arc::clone)
            })
        };
        let active = lookup(&self.active_scene);
        let prev_active = lookup(&self.prev_active_scene);
        self.active_scene = active;
        self.prev_active_scene = prev_active;
    }
}

/// Diff `state` against `scenes`.
///
/// Unchanged scenes keep their `Arc`. Scenes whose route left the stack turn
/// stale; only the one that was active is retained. The result is sorted by
/// index with stale scenes after live ones at the same index.
pub fn reconcile<R>(scenes: &[Arc<Scene<R>>], state: &NavigationState<R>) -> Reconciliation<R> {
    let mut previous: HashMap<&RouteKey, &Arc<Scene<R>>> =
        scenes.iter().map(|scene| (&scene.key, scene)).collect();

    let mut next: Vec<Arc<Scene<R>>> = Vec::with_capacity(state.len() + 1);
    let mut active_scene = None;
    let mut prev_active_scene = None;

    for (index, entry) in state.routes().iter().enumerate().rev() {
        let candidate = Scene {
            key: entry.key.clone(),
            index,
            route: Arc::clone(&entry.route),
            is_active: index as isize == state.index(),
            is_stale: false,
            config: None,
        };

        let scene = match previous.remove(&entry.key) {
            Some(prev) => {
                let scene = if prev.same_as(&candidate) {
                    Arc::clone(prev)
                } else {
                    Arc::new(Scene {
                        config: prev.config.clone(),
                        ..candidate
                    })
                };
                if prev.is_active {
                    prev_active_scene = Some(Arc::clone(&scene));
                }
                scene
            }
            None => Arc::new(candidate),
        };

        if scene.is_active {
            active_scene = Some(Arc::clone(&scene));
        }
        next.push(scene);
    }

    // Whatever is left has no route anymore.
    for scene in previous.into_values() {
        if !scene.is_active {
            continue;
        }
        let stale = Arc::new(Scene {
            is_active: false,
            is_stale: true,
            ..Scene::clone(scene)
        });
        prev_active_scene = Some(Arc::clone(&stale));
        next.push(stale);
    }

    next.sort_by(compare_scenes);

    let unchanged = next.len() == scenes.len()
        && next.iter().zip(scenes).all(|(a, b)| a.same_as(b));
    if unchanged {
        return Reconciliation {
            scenes: scenes.to_vec(),
            changed: false,
            active_scene,
            prev_active_scene,
        };
    }

    Reconciliation {
        scenes: next,
        changed: true,
        active_scene,
        prev_active_scene,
    }
}

/// Drop stale scenes. Returns `None` when there were none.
pub fn filter_stale<R>(scenes: &[Arc<Scene<R>>]) -> Option<Vec<Arc<Scene<R>>>> {
    if !scenes.iter().any(|scene| scene.is_stale) {
        return None;
    }
    Some(
        scenes
            .iter()
            .filter(|scene| !scene.is_stale)
            .map(Arc::clone)
            .collect(),
    )
}

/// Snapshot of one transition, alive from its start until it settles.
#[derive(Debug)]
pub struct TransitionProps<R> {
    pub navigation_state: NavigationState<R>,
    pub active_scene: Option<Arc<Scene<R>>>,
    pub prev_active_scene: Option<Arc<Scene<R>>>,
}

impl<R> Clone for TransitionProps<R> {
    fn clone(&self) -> Self {
        Self {
            navigation_state: self.navigation_state.clone(),
            active_scene: self.active_scene.clone(),
            prev_active_scene: self.prev_active_scene.clone(),
        }
    }
}

impl<R> TransitionProps<R> {
    /// Whether the active scene differs from the previously active one.
    pub fn active_changed(&self) -> bool {
        !same_option(&self.active_scene, &self.prev_active_scene)
    }
}

/// The up to three scenes that are animated: slot 0 (before), 1 (active),
/// 2 (after). `current` is the slot that is visible before the transition.
#[derive(Debug)]
pub struct SlotWindow<R> {
    pub slots: [Option<Arc<Scene<R>>>; 3],
    pub current: usize,
}

impl<R> Clone for SlotWindow<R> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            current: self.current,
        }
    }
}

impl<R> SlotWindow<R> {
    /// Same scene handles in the same slots, same current slot.
    pub fn same_as(&self, other: &Self) -> bool {
        self.current == other.current
            && self
                .slots
                .iter()
                .zip(other.slots.iter())
                .all(|(a, b)| same_option(a, b))
    }

    /// Slot holding the scene with `key`.
    pub fn slot_of(&self, key: &RouteKey) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|scene| &scene.key == key))
    }

    /// Config of the top-most filled slot; it drives every slot's style.
    pub fn driving_config(&self) -> Option<Arc<SceneConfig>> {
        self.slots
            .iter()
            .rev()
            .flatten()
            .find_map(|scene| scene.config.clone())
    }
}

/// Compute the three-slot window for `scenes`.
///
/// Scanning from the top of the stack: the active scene takes slot 1; the
/// previously active scene takes slot 2 if it sits above the active one, or
/// slot 0 if below. Otherwise the nearest live scene below the active one
/// fills slot 0, so a swipe-back gesture has something to reveal. When a
/// transition starts from an empty stack there is no slot 0 and the
/// animation starts from slot 0.
pub fn calc_window<R>(
    scenes: &[Arc<Scene<R>>],
    transition: Option<&TransitionProps<R>>,
) -> SlotWindow<R> {
    let prev_active = transition.and_then(|props| props.prev_active_scene.as_ref());
    let is_prev = |scene: &Arc<Scene<R>>| prev_active.is_some_and(|prev| Arc::ptr_eq(prev, scene));

    let mut before: Option<Arc<Scene<R>>> = None;
    let mut active: Option<Arc<Scene<R>>> = None;
    let mut after: Option<Arc<Scene<R>>> = None;
    let mut current = 1;

    for scene in scenes.iter().rev() {
        if active.is_none() {
            if scene.is_active {
                active = Some(Arc::clone(scene));
            } else if is_prev(scene) {
                after = Some(Arc::clone(scene));
                current = 2;
            }
        } else if after.is_none() {
            if is_prev(scene) {
                before = Some(Arc::clone(scene));
                current = 0;
            } else if before.is_none() && !scene.is_stale {
                before = Some(Arc::clone(scene));
            }
        }
    }

    if transition.is_some() && prev_active.is_none() && active.is_some() {
        before = None;
        current = 0;
    }

    SlotWindow {
        slots: [before, active, after],
        current,
    }
}
