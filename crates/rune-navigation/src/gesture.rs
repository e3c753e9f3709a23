//! Swipe-back gesture responder.
//!
//! A drag along the driving scene config's gesture axis rewinds the
//! transmitter live. On release the responder either animates back to where
//! the drag started (reset) or on to the previous slot (back); a finished
//! back animation asks the navigator to pop the top route.
//!
//! The responder consumes already resolved gesture samples and follows the
//! usual capture/claim protocol: `start_should_capture`, `move_should_claim`,
//! `grant`, `drag`, `release`, `terminate`, `termination_request`.

use rune_config::GestureConfig;

use crate::config::{GestureAxis, TimingSpec};
use crate::style::Size;
use crate::transmitter::{AnimationOwner, Transmitter};
use crate::tween::Tween;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging,
    Resetting,
    Backing,
    /// The touch started too far from the leading edge; ignored until the next touch.
    Unable,
}

impl GestureState {
    /// Resetting or backing a drag, or dragging.
    pub fn is_responding(self) -> bool {
        !matches!(self, GestureState::Idle | GestureState::Unable)
    }
}

/// Inputs of the responder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureInput {
    /// A new touch begins.
    TouchStart,
    /// The touch began outside the edge band.
    EdgeRejected,
    Grant,
    Release { back: bool },
    Terminate,
    AnimationEnd,
    ForceReset,
}

/// Transition function of the responder.
///
/// Returns `None` when `input` has no effect in `state`.
pub fn step(state: GestureState, input: GestureInput) -> Option<GestureState> {
    use GestureInput::*;
    use GestureState::*;

    let next = match (state, input) {
        // A completion animation keeps running across new touches.
        (Resetting | Backing, TouchStart) => return None,
        (_, TouchStart) => Idle,

        (Idle, EdgeRejected) => Unable,
        (Idle, Grant) => Dragging,

        (Dragging, Release { back: true }) => Backing,
        (Dragging, Release { back: false }) => Resetting,
        (Dragging, Terminate) => Resetting,

        (Resetting | Backing, AnimationEnd) => Idle,
        (Dragging | Resetting | Backing, ForceReset) => Idle,

        _ => return None,
    };
    Some(next)
}

/// One resolved gesture sample, in layout pixels and pixels per millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSample {
    pub dx: f64,
    pub dy: f64,
    pub vx: f64,
    pub vy: f64,
    pub page_x: f64,
    pub page_y: f64,
}

impl GestureSample {
    /// Distance, cross distance, velocity and page position along `axis`.
    fn along(&self, axis: GestureAxis) -> (f64, f64, f64, f64) {
        match axis {
            GestureAxis::Vertical => (self.dy, self.dx, self.vy, self.page_y),
            _ => (self.dx, self.dy, self.vx, self.page_x),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Duration of a full-length completion at the default velocity.
    pub max_duration_ms: f64,
    /// Fraction of the axis past which a slow release goes back.
    pub position_threshold: f64,
    /// Pixels the drag must travel before it is claimed.
    pub respond_threshold: f64,
    pub velocity_threshold: f64,
    pub response_distance_horizontal: f64,
    pub response_distance_vertical: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from(&GestureConfig::default())
    }
}

impl From<&GestureConfig> for GestureSettings {
    fn from(config: &GestureConfig) -> Self {
        Self {
            max_duration_ms: config.max_duration_ms,
            position_threshold: config.position_threshold,
            respond_threshold: config.respond_threshold,
            velocity_threshold: config.velocity_threshold,
            response_distance_horizontal: config.response_distance_horizontal,
            response_distance_vertical: config.response_distance_vertical,
        }
    }
}

/// Navigator facts the responder checks before claiming a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub scene_count: usize,
    pub enable_on_first_scene: bool,
    /// No transition in flight.
    pub navigator_idle: bool,
}

#[derive(Debug)]
pub struct GestureResponder {
    state: GestureState,
    axis: GestureAxis,
    enabled: bool,
    intercept: bool,
    start_value: f64,
    current_value: f64,
    settings: GestureSettings,
}

impl Default for GestureResponder {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl GestureResponder {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            state: GestureState::Idle,
            axis: GestureAxis::None,
            enabled: true,
            intercept: false,
            start_value: 0.0,
            current_value: 0.0,
            settings,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn axis(&self) -> GestureAxis {
        self.axis
    }

    pub fn is_responding(&self) -> bool {
        self.state.is_responding()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    fn apply(&mut self, input: GestureInput) -> bool {
        match step(self.state, input) {
            Some(next) => {
                if next != self.state {
                    tracing::debug!(from = ?self.state, to = ?next, ?input, "gesture state");
                }
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// A touch begins. `axis` is the gesture axis of the driving config, if
    /// one is prepared; `intercept` is the navigator's touch interception
    /// verdict, which is returned unchanged.
    pub fn start_should_capture(&mut self, axis: Option<GestureAxis>, intercept: bool) -> bool {
        if self.enabled {
            if let Some(axis) = axis {
                self.axis = axis;
            }
        }
        self.apply(GestureInput::TouchStart);
        self.intercept = intercept;
        intercept
    }

    /// Whether the drag described by `sample` should become a swipe-back.
    pub fn move_should_claim(&mut self, sample: &GestureSample, ctx: GestureContext) -> bool {
        if !self.enabled || self.state != GestureState::Idle {
            return false;
        }
        if self.axis == GestureAxis::None {
            return false;
        }

        let (distance, cross, _, page) = sample.along(self.axis);
        let edge_distance = page - distance;
        let allowed = match self.axis {
            GestureAxis::Vertical => self.settings.response_distance_vertical,
            _ => self.settings.response_distance_horizontal,
        };
        if edge_distance > allowed {
            self.apply(GestureInput::EdgeRejected);
            return false;
        }

        if ctx.scene_count == 0 || (ctx.scene_count < 2 && !ctx.enable_on_first_scene) {
            return false;
        }
        if !ctx.navigator_idle {
            return false;
        }

        self.intercept = false;
        let threshold = self.settings.respond_threshold;
        distance.abs() > threshold && cross.abs() < threshold
    }

    /// The drag was handed to us.
    pub fn grant<T: Tween>(&mut self, transmitter: &Transmitter<T>) {
        if self.intercept {
            return;
        }
        if self.apply(GestureInput::Grant) {
            self.start_value = transmitter.value();
            self.current_value = self.start_value;
        }
    }

    /// Follow the finger: one axis length of travel rewinds one slot.
    pub fn drag<T: Tween>(
        &mut self,
        sample: &GestureSample,
        transmitter: &mut Transmitter<T>,
        viewport: Size,
    ) {
        if self.state != GestureState::Dragging {
            return;
        }
        let length = self.axis_length(viewport);
        if length <= 0.0 {
            return;
        }
        let (distance, ..) = sample.along(self.axis);
        let value = (self.start_value - distance / length)
            .clamp(self.start_value - 1.0, self.start_value);
        self.current_value = value;
        transmitter.set_animation_value(value);
    }

    /// The finger lifted: go back or reset.
    pub fn release<T: Tween>(
        &mut self,
        sample: &GestureSample,
        transmitter: &mut Transmitter<T>,
        viewport: Size,
    ) {
        if self.state != GestureState::Dragging {
            return;
        }

        let length = self.axis_length(viewport);
        if length <= 0.0 {
            self.reset(transmitter, 0.0);
            return;
        }

        let (moved, _, velocity, _) = sample.along(self.axis);
        let default_velocity = length / self.settings.max_duration_ms.max(1.0);
        let speed = velocity.abs().clamp(default_velocity, default_velocity * 3.0);
        let reset_duration = (moved / speed).max(0.0);
        let back_duration = ((length - moved) / speed).max(0.0);

        let threshold = self.settings.velocity_threshold;
        let back = if velocity < -threshold {
            false
        } else if velocity > threshold {
            true
        } else {
            self.current_value <= self.start_value - self.settings.position_threshold
        };
        tracing::debug!(
            back,
            velocity,
            moved,
            current = self.current_value,
            start = self.start_value,
            "gesture released"
        );

        if back {
            self.go_back(transmitter, back_duration);
        } else {
            self.reset(transmitter, reset_duration);
        }
    }

    /// Another responder took over mid-drag.
    pub fn terminate<T: Tween>(&mut self, transmitter: &mut Transmitter<T>) {
        if self.state != GestureState::Dragging {
            return;
        }
        self.reset(transmitter, 0.0);
    }

    /// Whether another responder may take over.
    pub fn termination_request(&self) -> bool {
        self.state != GestureState::Dragging
    }

    /// Abandon any drag or completion animation and restore the pre-drag
    /// value. No completion is reported.
    pub fn force_reset<T: Tween>(&mut self, transmitter: &mut Transmitter<T>) {
        if !self.is_responding() {
            return;
        }
        self.apply(GestureInput::ForceReset);
        transmitter.stop_animation(Some(self.start_value));
    }

    /// A completion animation finished. Returns `true` when the top route
    /// should now be popped.
    pub fn on_animation_end(&mut self, owner: AnimationOwner) -> bool {
        let backing = self.state == GestureState::Backing;
        if !self.apply(GestureInput::AnimationEnd) {
            return false;
        }
        owner == AnimationOwner::GestureBack && backing
    }

    fn axis_length(&self, viewport: Size) -> f64 {
        match self.axis {
            GestureAxis::Vertical => viewport.height,
            _ => viewport.width,
        }
    }

    fn reset<T: Tween>(&mut self, transmitter: &mut Transmitter<T>, duration_ms: f64) {
        if self.apply(GestureInput::Release { back: false }) {
            self.animate(transmitter, self.start_value, duration_ms, AnimationOwner::GestureReset);
        }
    }

    fn go_back<T: Tween>(&mut self, transmitter: &mut Transmitter<T>, duration_ms: f64) {
        if self.apply(GestureInput::Release { back: true }) {
            self.animate(
                transmitter,
                self.start_value - 1.0,
                duration_ms,
                AnimationOwner::GestureBack,
            );
        }
    }

    fn animate<T: Tween>(
        &mut self,
        transmitter: &mut Transmitter<T>,
        to: f64,
        duration_ms: f64,
        owner: AnimationOwner,
    ) {
        if let Err(err) = transmitter.start_animation(to, TimingSpec::linear(duration_ms), owner) {
            debug_assert!(false, "gesture animation while another runs: {err}");
            tracing::error!(%err, "gesture animation rejected");
            self.state = GestureState::Idle;
        }
    }
}
