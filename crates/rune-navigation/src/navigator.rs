//! The navigator: transition state machine and render surface.
//!
//! The host drives a [`Navigator`] from its frame loop:
//!
//! 1. submit navigation states with [`Navigator::update_navigation_state`]
//!    (or the `push`/`pop`/... shortcuts),
//! 2. call [`Navigator::render`] once per frame and draw the returned
//!    [`Frame`],
//! 3. call [`Navigator::advance`] with the elapsed time,
//! 4. poll [`Navigator::drain_events`] for lifecycle notifications.
//!
//! A state submitted while a transition is in flight is not lost: it is
//! remembered as pending and started the moment the running animation
//! completes, folding "settle" and "start next" into one step.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rune_config::{NavigationConfig, RuneConfig};

use crate::config::{GestureAxis, SceneConfig};
use crate::error::Result;
use crate::events::{EventQueue, NavigationEvent, VisibilityKind};
use crate::gesture::{
    GestureContext, GestureResponder, GestureSample, GestureSettings, GestureState,
};
use crate::presets::SceneConfigRegistry;
use crate::route::{KeyGenerator, NavigationState, Route, RouteEntry, RouteKey};
use crate::scene::{Scene, SlotWindow, TransitionProps, calc_window, filter_stale, reconcile};
use crate::state_ops;
use crate::style::{ResolvedStyle, Size};
use crate::transmitter::{AnimationOwner, INITIAL_VALUE, Transmitter};
use crate::tween::{FrameTween, Tween};

/// Viewport used until the host reports a layout.
pub const DEFAULT_LAYOUT: Size = Size::new(360.0, 640.0);

/// Upper bound for [`Navigator::run_until_idle`].
const MAX_SETTLE_FRAMES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    /// Scenes are reconciled; the animation starts on the next render.
    AwaitingAnimationStart,
    Animating,
    /// The animation finished; the end notification fires on the next render.
    Settled,
    /// A pending state was merged into the end of the previous transition;
    /// the next render ends that one and starts this one.
    PendingAwaitingAnimationStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionInput {
    Begin,
    BeginPending,
    AnimationStart,
    AnimationEnd,
    End,
}

/// Transition function of the navigator. `None` marks misuse.
pub fn step(state: TransitionState, input: TransitionInput) -> Option<TransitionState> {
    use TransitionInput::*;
    use TransitionState::*;

    let next = match (state, input) {
        (Idle, Begin) => AwaitingAnimationStart,
        (Animating, BeginPending) => PendingAwaitingAnimationStart,
        (AwaitingAnimationStart | PendingAwaitingAnimationStart, AnimationStart) => Animating,
        (Animating, AnimationEnd) => Settled,
        (Settled, End) => Idle,
        _ => return None,
    };
    Some(next)
}

/// How a submitted navigation state is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// `false` runs the transition with a zero-duration animation.
    pub animated: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { animated: true }
    }
}

impl UpdateOptions {
    pub fn instant() -> Self {
        Self { animated: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorOptions {
    pub enable_gestures: bool,
    /// Allow swipe-back with a single scene on the stack.
    pub enable_gesture_on_first_scene: bool,
    /// Mark scenes outside the animated window as invisible.
    pub hide_non_active_scenes: bool,
    pub intercept_touch_timeout_ms: f64,
    /// Registry name of the config handed to new scenes by default.
    pub default_scene_config: String,
    pub initial_layout: Size,
    pub gestures: GestureSettings,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self::from(&RuneConfig::default())
    }
}

impl From<&RuneConfig> for NavigatorOptions {
    fn from(config: &RuneConfig) -> Self {
        Self {
            gestures: GestureSettings::from(&config.gestures),
            ..Self::from(&config.navigation)
        }
    }
}

impl From<&NavigationConfig> for NavigatorOptions {
    fn from(config: &NavigationConfig) -> Self {
        Self {
            enable_gestures: config.enable_gestures,
            enable_gesture_on_first_scene: config.enable_gesture_on_first_scene,
            hide_non_active_scenes: config.hide_non_active_scenes,
            intercept_touch_timeout_ms: config.intercept_touch_timeout_ms,
            default_scene_config: config.default_scene_config.clone(),
            initial_layout: Size::new(
                config.initial_width.unwrap_or(DEFAULT_LAYOUT.width),
                config.initial_height.unwrap_or(DEFAULT_LAYOUT.height),
            ),
            gestures: GestureSettings::default(),
        }
    }
}

/// One scene as it should be drawn this frame.
#[derive(Debug)]
pub struct FrameScene<R> {
    pub scene: Arc<Scene<R>>,
    pub visible: bool,
    /// `None` for scenes outside the animated window.
    pub style: Option<ResolvedStyle>,
    /// The scene differs from the one drawn under this key last frame.
    pub changed: bool,
}

/// Everything the render surface needs for one frame, bottom scene first.
#[derive(Debug)]
pub struct Frame<R> {
    pub scenes: Vec<FrameScene<R>>,
    pub position: f64,
    pub state: TransitionState,
}

impl<R> Frame<R> {
    pub fn scene(&self, key: &RouteKey) -> Option<&FrameScene<R>> {
        self.scenes.iter().find(|entry| &entry.scene.key == key)
    }

    pub fn visible_keys(&self) -> Vec<&RouteKey> {
        self.scenes
            .iter()
            .filter(|entry| entry.visible)
            .map(|entry| &entry.scene.key)
            .collect()
    }
}

type Configurator<R> = Box<dyn FnMut(&Scene<R>, &SceneConfigRegistry) -> Arc<SceneConfig>>;
type BackHandler = Box<dyn FnMut() -> bool>;

pub struct Navigator<R, T = FrameTween> {
    options: NavigatorOptions,
    keygen: KeyGenerator,
    navigation_state: NavigationState<R>,
    initialized: bool,

    scenes: Vec<Arc<Scene<R>>>,
    active_scene: Option<Arc<Scene<R>>>,
    transition: Option<TransitionProps<R>>,
    settled: Option<TransitionProps<R>>,
    state: TransitionState,
    has_pending_transition: bool,
    no_animation: bool,

    transmitter: Transmitter<T>,
    responder: GestureResponder,
    window: Option<SlotWindow<R>>,
    prepared_layout: Option<Size>,
    style_slots: HashMap<RouteKey, usize>,
    drawn: HashMap<RouteKey, Arc<Scene<R>>>,
    layout: Size,

    clock_ms: f64,
    intercept_start_ms: f64,

    registry: SceneConfigRegistry,
    configurator: Option<Configurator<R>>,
    back_handlers: HashMap<RouteKey, BackHandler>,
    events: EventQueue<R>,
}

impl<R, T> fmt::Debug for Navigator<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &self.state)
            .field("index", &self.navigation_state.index())
            .field("routes", &self.navigation_state.len())
            .field("scenes", &self.scenes.len())
            .field("has_pending_transition", &self.has_pending_transition)
            .field("gesture", &self.responder.state())
            .finish_non_exhaustive()
    }
}

impl<R: Route> Navigator<R, FrameTween> {
    /// Navigator with an empty stack.
    pub fn new(options: NavigatorOptions) -> Result<Self> {
        Self::with_routes(options, std::iter::empty())
    }

    /// Navigator whose initial stack is `routes`, the last one active.
    pub fn with_routes(
        options: NavigatorOptions,
        routes: impl IntoIterator<Item = R>,
    ) -> Result<Self> {
        Self::with_tween(options, FrameTween::new(INITIAL_VALUE), routes)
    }
}

impl<R: Route, T: Tween> Navigator<R, T> {
    /// Navigator driving its transmitter through a custom tween.
    pub fn with_tween(
        options: NavigatorOptions,
        tween: T,
        routes: impl IntoIterator<Item = R>,
    ) -> Result<Self> {
        let mut registry = SceneConfigRegistry::with_presets();
        registry.set_default(&options.default_scene_config)?;

        let mut keygen = KeyGenerator::new();
        let entries = routes.into_iter().map(|route| keygen.entry(route)).collect();
        let navigation_state = NavigationState::from_routes(entries)?;

        Ok(Self {
            responder: GestureResponder::new(options.gestures),
            layout: options.initial_layout,
            options,
            keygen,
            navigation_state,
            initialized: false,
            scenes: Vec::new(),
            active_scene: None,
            transition: None,
            settled: None,
            state: TransitionState::Idle,
            has_pending_transition: false,
            no_animation: false,
            transmitter: Transmitter::with_tween(tween),
            window: None,
            prepared_layout: None,
            style_slots: HashMap::new(),
            drawn: HashMap::new(),
            clock_ms: 0.0,
            intercept_start_ms: 0.0,
            registry,
            configurator: None,
            back_handlers: HashMap::new(),
            events: EventQueue::new(),
        })
    }

    /// Choose each new scene's config. Runs once per scene, the first time
    /// it is seen; without a configurator scenes get the registry default.
    pub fn with_scene_configurator(
        mut self,
        configurator: impl FnMut(&Scene<R>, &SceneConfigRegistry) -> Arc<SceneConfig> + 'static,
    ) -> Self {
        self.configurator = Some(Box::new(configurator));
        self
    }

    pub fn registry(&self) -> &SceneConfigRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SceneConfigRegistry {
        &mut self.registry
    }

    /// Key `route` with this navigator's generator.
    pub fn entry(&mut self, route: R) -> RouteEntry<R> {
        self.keygen.entry(route)
    }

    // ---- state submission ----

    /// Submit a new navigation state.
    ///
    /// While a transition is in flight the state is remembered and applied
    /// once the running animation completes.
    pub fn update_navigation_state(&mut self, state: NavigationState<R>, options: UpdateOptions) {
        if self.navigation_state == state {
            return;
        }
        self.no_animation = !options.animated;
        self.navigation_state = state;
        if !self.initialized {
            return;
        }

        if self.state != TransitionState::Idle {
            tracing::debug!(state = ?self.state, "navigation state queued as pending transition");
            self.has_pending_transition = true;
            return;
        }
        self.start_transition(false);
    }

    /// Apply a state operation to the latest submitted state.
    pub fn navigate(
        &mut self,
        options: UpdateOptions,
        op: impl FnOnce(&NavigationState<R>, &mut KeyGenerator) -> NavigationState<R>,
    ) {
        let next = op(&self.navigation_state, &mut self.keygen);
        self.update_navigation_state(next, options);
    }

    pub fn push(&mut self, route: R) {
        self.navigate(UpdateOptions::default(), |state, keygen| {
            state_ops::push(state, keygen.entry(route))
        });
    }

    pub fn pop(&mut self) {
        self.navigate(UpdateOptions::default(), |state, _| state_ops::pop(state, false));
    }

    pub fn replace(&mut self, route: R) {
        self.navigate(UpdateOptions::default(), |state, keygen| {
            state_ops::replace(state, keygen.entry(route))
        });
    }

    pub fn pop_to_top(&mut self) {
        self.navigate(UpdateOptions::default(), |state, _| state_ops::pop_to_top(state));
    }

    pub fn reset(&mut self, routes: impl IntoIterator<Item = R>) {
        self.navigate(UpdateOptions::default(), |state, keygen| {
            let entries = routes.into_iter().map(|route| keygen.entry(route)).collect();
            state_ops::reset(state, entries, None)
        });
    }

    // ---- frame loop ----

    /// Lay out the current frame and fire the notifications due at this
    /// render: transition start, transition end, or both for a merged
    /// pending transition.
    pub fn render(&mut self) -> Frame<R> {
        let mounting = !self.initialized;
        if mounting {
            self.initialize();
        }

        self.prepare();

        if mounting {
            if let Some(active) = &self.active_scene {
                self.events.push_visibility(&active.key, VisibilityKind::WillShow);
                self.events.push_visibility(&active.key, VisibilityKind::DidShow);
            }
        }

        match self.state {
            TransitionState::AwaitingAnimationStart => self.on_transition_start(),
            TransitionState::Settled => {
                if self.on_transition_end(false) {
                    self.prepare();
                    self.on_transition_start();
                }
            }
            TransitionState::PendingAwaitingAnimationStart => {
                self.on_transition_end(true);
                self.on_transition_start();
            }
            TransitionState::Idle | TransitionState::Animating => {}
        }

        self.build_frame()
    }

    /// Advance the engine clock and the running animation.
    pub fn advance(&mut self, delta_ms: f64) {
        self.clock_ms += delta_ms.max(0.0);
        match self.transmitter.advance(delta_ms) {
            Some(AnimationOwner::Transition) => self.on_animation_end(),
            Some(owner) => {
                if self.responder.on_animation_end(owner) {
                    self.on_responder_back();
                }
            }
            None => {}
        }
    }

    /// Render and advance by `frame_ms` until nothing is left to do.
    /// Returns the number of rendered frames.
    pub fn run_until_idle(&mut self, frame_ms: f64) -> usize {
        for frame in 0..MAX_SETTLE_FRAMES {
            self.render();
            if self.state == TransitionState::Idle && !self.transmitter.is_animating() {
                return frame + 1;
            }
            self.advance(frame_ms);
        }
        tracing::warn!(frames = MAX_SETTLE_FRAMES, state = ?self.state, "navigator did not settle");
        MAX_SETTLE_FRAMES
    }

    pub fn drain_events(&mut self) -> Vec<NavigationEvent<R>> {
        self.events.drain().collect()
    }

    // ---- host surface ----

    /// New viewport size. Slot styles are recomputed on the next render
    /// unless a transition is running, in which case they are recomputed
    /// once it settles.
    pub fn set_layout(&mut self, layout: Size) {
        if self.layout != layout {
            tracing::debug!(?layout, "layout changed");
            self.layout = layout;
        }
    }

    pub fn set_gesture_enabled(&mut self, enabled: bool) {
        self.responder.set_enabled(enabled);
    }

    pub fn is_gesture_enabled(&self) -> bool {
        self.responder.is_enabled()
    }

    /// A transition runs or a gesture is being handled.
    pub fn is_in_transition(&self) -> bool {
        self.state != TransitionState::Idle || self.responder.is_responding()
    }

    /// Whether a new touch should be swallowed: shortly after a transition
    /// starts, and for as long as another one is pending.
    pub fn should_intercept_touch(&self) -> bool {
        self.state != TransitionState::Idle
            && (self.clock_ms - self.intercept_start_ms < self.options.intercept_touch_timeout_ms
                || self.has_pending_transition)
    }

    /// Register the back handler of the scene with `key`. It is dropped once
    /// the scene leaves the stack.
    pub fn set_back_handler(&mut self, key: RouteKey, handler: impl FnMut() -> bool + 'static) {
        self.back_handlers.insert(key, Box::new(handler));
    }

    pub fn remove_back_handler(&mut self, key: &RouteKey) {
        self.back_handlers.remove(key);
    }

    pub fn has_back_handler(&self, key: &RouteKey) -> bool {
        self.back_handlers.contains_key(key)
    }

    /// Deliver a system back event. Returns `true` when it was handled,
    /// which includes swallowing it during a transition.
    pub fn dispatch_back_event(&mut self) -> bool {
        if self.is_in_transition() {
            return true;
        }
        let Some(active) = &self.active_scene else {
            return false;
        };
        match self.back_handlers.get_mut(&active.key) {
            Some(handler) => handler(),
            None => false,
        }
    }

    // ---- gesture protocol ----

    pub fn gesture_start_should_capture(&mut self) -> bool {
        let intercept = self.should_intercept_touch();
        if !self.options.enable_gestures {
            return intercept;
        }
        let axis = self.transmitter.config().map(|config| config.gesture());
        self.responder.start_should_capture(axis, intercept)
    }

    pub fn gesture_move_should_claim(&mut self, sample: &GestureSample) -> bool {
        if !self.options.enable_gestures {
            return false;
        }
        let ctx = GestureContext {
            scene_count: self.scenes.len(),
            enable_on_first_scene: self.options.enable_gesture_on_first_scene,
            navigator_idle: self.state == TransitionState::Idle,
        };
        self.responder.move_should_claim(sample, ctx)
    }

    pub fn gesture_grant(&mut self) {
        self.responder.grant(&self.transmitter);
    }

    pub fn gesture_move(&mut self, sample: &GestureSample) {
        self.responder.drag(sample, &mut self.transmitter, self.layout);
    }

    pub fn gesture_release(&mut self, sample: &GestureSample) {
        self.responder.release(sample, &mut self.transmitter, self.layout);
    }

    pub fn gesture_terminate(&mut self) {
        self.responder.terminate(&mut self.transmitter);
    }

    pub fn gesture_termination_request(&self) -> bool {
        self.responder.termination_request()
    }

    // ---- accessors ----

    /// Latest submitted state; may be ahead of the rendered scenes.
    pub fn navigation_state(&self) -> &NavigationState<R> {
        &self.navigation_state
    }

    pub fn scenes(&self) -> &[Arc<Scene<R>>] {
        &self.scenes
    }

    pub fn active_scene(&self) -> Option<&Arc<Scene<R>>> {
        self.active_scene.as_ref()
    }

    pub fn transition_state(&self) -> TransitionState {
        self.state
    }

    pub fn transition_props(&self) -> Option<&TransitionProps<R>> {
        self.transition.as_ref()
    }

    pub fn has_pending_transition(&self) -> bool {
        self.has_pending_transition
    }

    pub fn gesture_state(&self) -> GestureState {
        self.responder.state()
    }

    /// Gesture axis of the config currently driving the window.
    pub fn gesture_axis(&self) -> GestureAxis {
        self.transmitter
            .config()
            .map_or(GestureAxis::None, |config| config.gesture())
    }

    pub fn transmitter(&self) -> &Transmitter<T> {
        &self.transmitter
    }

    pub fn layout(&self) -> Size {
        self.layout
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    // ---- internals ----

    fn set_state(&mut self, input: TransitionInput) {
        match step(self.state, input) {
            Some(next) => {
                tracing::debug!(from = ?self.state, to = ?next, ?input, "transition state");
                self.state = next;
            }
            None => {
                debug_assert!(false, "invalid transition input {input:?} in {:?}", self.state);
                tracing::error!(state = ?self.state, ?input, "invalid transition input ignored");
            }
        }
    }

    fn configure(&mut self, reconciliation: &mut crate::scene::Reconciliation<R>) {
        let registry = &self.registry;
        let configurator = &mut self.configurator;
        reconciliation.configure(|scene| match configurator {
            Some(configure) => configure(scene, registry),
            None => registry.default_config(),
        });
    }

    fn initialize(&mut self) {
        self.initialized = true;
        let mut initial = reconcile(&[], &self.navigation_state);
        self.configure(&mut initial);
        self.scenes = initial.scenes;
        self.active_scene = initial.active_scene;
        tracing::debug!(scenes = self.scenes.len(), "navigator mounted");
    }

    /// Reconcile the latest state into scenes. Returns `false` when the
    /// scenes did not change and no transition was started.
    fn start_transition(&mut self, pending: bool) -> bool {
        let mut next = reconcile(&self.scenes, &self.navigation_state);
        if !next.changed {
            tracing::debug!(pending, "navigation state produced no scene change");
            return false;
        }

        self.responder.force_reset(&mut self.transmitter);
        self.intercept_start_ms = self.clock_ms;

        self.configure(&mut next);
        let props = TransitionProps {
            navigation_state: self.navigation_state.clone(),
            active_scene: next.active_scene.clone(),
            prev_active_scene: next.prev_active_scene.clone(),
        };
        self.scenes = next.scenes;
        self.active_scene = next.active_scene;
        self.prune_back_handlers();
        self.transition = Some(props);
        self.set_state(if pending {
            TransitionInput::BeginPending
        } else {
            TransitionInput::Begin
        });
        true
    }

    fn on_transition_start(&mut self) {
        let Some(props) = self.transition.clone() else {
            debug_assert!(false, "transition start without props");
            tracing::error!("transition start without props");
            return;
        };

        let active_changed = props.active_changed();
        let prev = props.prev_active_scene.as_ref().map(|scene| scene.key.clone());
        let active = props.active_scene.as_ref().map(|scene| scene.key.clone());
        self.events.push(NavigationEvent::TransitionStart { props });
        if active_changed {
            if let Some(prev) = &prev {
                self.events.push_visibility(prev, VisibilityKind::WillHide);
            }
            if let Some(active) = &active {
                self.events.push_visibility(active, VisibilityKind::WillShow);
            }
        }

        self.set_state(TransitionInput::AnimationStart);
        if let Err(err) = self.transmitter.start_transition_animation(self.no_animation) {
            debug_assert!(false, "transition started while animating: {err}");
            tracing::error!(%err, "transition animation rejected; settling immediately");
            self.on_animation_end();
        }
    }

    fn on_animation_end(&mut self) {
        if let Some(live) = filter_stale(&self.scenes) {
            self.scenes = live;
        }
        self.prune_back_handlers();
        self.settled = self.transition.take();

        if self.has_pending_transition {
            self.has_pending_transition = false;
            if self.start_transition(true) {
                return;
            }
        }
        self.set_state(TransitionInput::AnimationEnd);
    }

    /// Notify the end of the settled transition. With `merged` unset, a state
    /// submitted since the animation finished is started here; returns
    /// whether that happened.
    fn on_transition_end(&mut self, merged: bool) -> bool {
        let Some(props) = self.settled.take() else {
            debug_assert!(false, "transition end without props");
            tracing::error!("transition end without props");
            return false;
        };
        let mut started = false;
        if !merged {
            self.set_state(TransitionInput::End);
            if self.has_pending_transition {
                self.has_pending_transition = false;
                started = self.start_transition(false);
            }
        }

        if props.active_changed() {
            if let Some(prev) = &props.prev_active_scene {
                self.events.push_visibility(&prev.key, VisibilityKind::DidHide);
            }
            if let Some(active) = &props.active_scene {
                self.events.push_visibility(&active.key, VisibilityKind::DidShow);
            }
        }
        self.events.push(NavigationEvent::TransitionEnd {
            props,
            has_pending_transition: merged || started,
        });
        started
    }

    /// Handlers only live as long as their scene.
    fn prune_back_handlers(&mut self) {
        let scenes = &self.scenes;
        self.back_handlers
            .retain(|key, _| scenes.iter().any(|scene| &scene.key == key));
    }

    /// The back gesture finished on screen; make the stack follow.
    fn on_responder_back(&mut self) {
        let next = state_ops::pop(&self.navigation_state, true);
        self.update_navigation_state(next, UpdateOptions::instant());
    }

    fn prepare(&mut self) {
        let window = calc_window(&self.scenes, self.transition.as_ref());
        let same_window = self.window.as_ref().is_some_and(|old| old.same_as(&window));
        if same_window && (self.prepared_layout == Some(self.layout) || self.transition.is_some()) {
            return;
        }

        self.prepared_layout = Some(self.layout);
        self.transmitter
            .prepare(window.current, window.driving_config(), self.layout);
        self.style_slots.clear();
        for (slot, scene) in window.slots.iter().enumerate() {
            if let Some(scene) = scene {
                let index = self.transmitter.style_index(slot, window.current);
                self.style_slots.insert(scene.key.clone(), index);
            }
        }
        self.window = Some(window);
    }

    fn build_frame(&mut self) -> Frame<R> {
        let mut drawn = HashMap::with_capacity(self.scenes.len());
        let scenes = self
            .scenes
            .iter()
            .map(|scene| {
                let slot = self.style_slots.get(&scene.key).copied();
                let changed = !self
                    .drawn
                    .get(&scene.key)
                    .is_some_and(|last| Arc::ptr_eq(last, scene));
                drawn.insert(scene.key.clone(), Arc::clone(scene));
                FrameScene {
                    scene: Arc::clone(scene),
                    visible: slot.is_some() || !self.options.hide_non_active_scenes,
                    style: slot.and_then(|index| self.transmitter.resolve(index)),
                    changed,
                }
            })
            .collect();
        self.drawn = drawn;

        Frame {
            scenes,
            position: self.transmitter.position(),
            state: self.state,
        }
    }
}
