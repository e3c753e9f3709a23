//! The animation transmitter.
//!
//! One real-valued counter drives every visible scene. Its observed position
//! `((v % 3) + 3) % 3` selects, for each of the three window slots, which of
//! the driving config's three slot styles applies and how far along it is.
//! At rest the counter is an integer; a transition moves it by one step and
//! the next window is laid out relative to the new value, so slot styles are
//! written once in terms of fixed slot offsets.

use std::sync::Arc;

use crate::config::{SceneConfig, StyleCache, TimingSpec};
use crate::error::{NavError, Result};
use crate::style::{ResolvedStyle, Size, SlotStyle};
use crate::tween::{FrameTween, Tween};

/// Settled value of a fresh transmitter; the active scene rests in slot 1.
pub const INITIAL_VALUE: f64 = 1.0;

/// Map any counter value into `[0, 3)`.
pub fn observe(value: f64) -> f64 {
    ((value % 3.0) + 3.0) % 3.0
}

/// Pick representatives of two observed positions so the animation between
/// them takes the short way round instead of sweeping through the far side.
fn shortest_path(from: f64, to: f64) -> (f64, f64) {
    let delta = to - from;
    if delta < -1.5 {
        (from, to + 3.0)
    } else if delta > 1.5 {
        (from + 3.0, to)
    } else {
        (from, to)
    }
}

/// Which party started the running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationOwner {
    Transition,
    GestureReset,
    GestureBack,
}

#[derive(Debug)]
pub struct Transmitter<T = FrameTween> {
    /// Settled value; only updated when a transition completes.
    value: f64,
    next_value: Option<f64>,
    tween: T,
    running: Option<AnimationOwner>,
    config: Option<Arc<SceneConfig>>,
    styles: Option<Arc<[SlotStyle; 3]>>,
    cache: StyleCache,
}

impl Default for Transmitter<FrameTween> {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmitter<FrameTween> {
    pub fn new() -> Self {
        Self::with_tween(FrameTween::new(INITIAL_VALUE))
    }
}

impl<T: Tween> Transmitter<T> {
    /// Use a custom tween; its current value becomes the settled value.
    pub fn with_tween(tween: T) -> Self {
        Self {
            value: tween.value(),
            next_value: None,
            tween,
            running: None,
            config: None,
            styles: None,
            cache: StyleCache::new(),
        }
    }

    /// Lay out a new window.
    ///
    /// `current` is the slot that is visible right now; the next transition
    /// brings slot 1 to the front. `config` drives the styles of all slots.
    pub fn prepare(&mut self, current: usize, config: Option<Arc<SceneConfig>>, viewport: Size) {
        debug_assert!(current < 3, "slot out of range: {current}");
        self.styles = config
            .as_deref()
            .map(|config| self.cache.get(config, viewport));
        self.config = config;
        let next = self.value - (current as f64 - 1.0);
        self.next_value = Some(next);
        tracing::debug!(
            value = self.value,
            next,
            current,
            config = self.config.as_deref().map(SceneConfig::name),
            "transmitter prepared"
        );
    }

    /// Style index applied to `slot` of a window whose visible slot is `current`.
    pub fn style_index(&self, slot: usize, current: usize) -> usize {
        let rest = observe(self.value).round() as usize;
        (rest + slot + 3 - current) % 3
    }

    pub fn slot_style(&self, style_index: usize) -> Option<&SlotStyle> {
        self.styles.as_deref().map(|styles| &styles[style_index % 3])
    }

    /// Concrete style for `style_index` at the current position.
    pub fn resolve(&self, style_index: usize) -> Option<ResolvedStyle> {
        self.slot_style(style_index)
            .map(|style| style.resolve(self.position()))
    }

    /// Observed live position, always in `[0, 3)`.
    pub fn position(&self) -> f64 {
        observe(self.tween.value())
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn next_value(&self) -> Option<f64> {
        self.next_value
    }

    pub fn config(&self) -> Option<&Arc<SceneConfig>> {
        self.config.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    pub fn running(&self) -> Option<AnimationOwner> {
        self.running
    }

    /// Animate towards the value computed by the last [`Self::prepare`].
    ///
    /// Nothing to move, or `no_animation`, still runs a zero-duration
    /// animation so completion arrives through [`Self::advance`] as usual.
    pub fn start_transition_animation(&mut self, no_animation: bool) -> Result<()> {
        if self.running.is_some() {
            return Err(NavError::AnimationInFlight("transition"));
        }
        self.running = Some(AnimationOwner::Transition);

        let next = match self.next_value {
            Some(next) if next != self.value => next,
            _ => {
                let here = self.tween.value();
                self.tween.animate_to(here, TimingSpec::linear(0.0));
                return Ok(());
            }
        };

        let mut timing = self
            .config
            .as_deref()
            .map(SceneConfig::timing)
            .unwrap_or_default();
        if no_animation {
            timing = timing.instant();
        }

        let (from, to) = shortest_path(observe(self.value), observe(next));
        tracing::debug!(from, to, duration_ms = timing.duration_ms, "transition animation");
        if timing.duration_ms > 0.0 {
            self.tween.set_value(from);
        }
        self.tween.animate_to(to, timing);
        Ok(())
    }

    /// Animate from the live position to `to` on behalf of the gesture responder.
    pub fn start_animation(
        &mut self,
        to: f64,
        timing: TimingSpec,
        owner: AnimationOwner,
    ) -> Result<()> {
        if self.running.is_some() {
            return Err(NavError::AnimationInFlight("gesture"));
        }
        self.running = Some(owner);

        let (from, to) = shortest_path(self.position(), observe(to));
        tracing::debug!(?owner, from, to, duration_ms = timing.duration_ms, "gesture animation");
        self.tween.set_value(from);
        self.tween.animate_to(to, timing);
        Ok(())
    }

    /// Follow a drag without animating.
    pub fn set_animation_value(&mut self, value: f64) {
        self.tween.set_value(observe(value));
    }

    /// Stop whatever runs, optionally jumping to `value`. No completion is
    /// reported for the stopped animation.
    pub fn stop_animation(&mut self, value: Option<f64>) {
        if let Some(owner) = self.running.take() {
            tracing::debug!(?owner, "transmitter animation stopped");
        }
        match value {
            Some(value) => self.tween.set_value(observe(value)),
            None => self.tween.stop(),
        }
    }

    /// Move time forward; returns the owner of an animation that completed.
    pub fn advance(&mut self, delta_ms: f64) -> Option<AnimationOwner> {
        if !self.tween.advance(delta_ms) {
            return None;
        }
        let owner = self.running.take();
        if owner == Some(AnimationOwner::Transition) {
            if let Some(next) = self.next_value.take() {
                self.value = next;
            }
        }
        owner
    }
}
