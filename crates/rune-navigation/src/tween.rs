//! Scalar tween driving the transmitter value.
//!
//! The engine is single threaded and frame driven: the host calls
//! [`Tween::advance`] once per frame with the elapsed time and learns from the
//! return value whether the running animation finished during that frame.

use crate::config::TimingSpec;
use crate::easing::EasingFunction;

/// A single animated `f64`.
///
/// Implementations run at most one animation at a time. Starting a new one
/// or setting the value directly drops the previous animation without
/// reporting completion.
pub trait Tween {
    /// Current value.
    fn value(&self) -> f64;

    /// Jump to `value`, stopping any running animation.
    fn set_value(&mut self, value: f64);

    /// Animate from the current value to `to`.
    fn animate_to(&mut self, to: f64, timing: TimingSpec);

    /// Stop in place.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Move time forward. Returns `true` exactly once, on the frame the
    /// running animation reaches its target.
    fn advance(&mut self, delta_ms: f64) -> bool;
}

#[derive(Debug, Clone)]
struct Segment {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: EasingFunction,
}

/// Frame-stepped tween with easing.
///
/// Zero-duration animations jump to the target immediately and report
/// completion on the next [`Tween::advance`].
#[derive(Debug, Clone, Default)]
pub struct FrameTween {
    value: f64,
    segment: Option<Segment>,
}

impl FrameTween {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            segment: None,
        }
    }

    /// Target of the running animation, if any.
    pub fn target(&self) -> Option<f64> {
        self.segment.as_ref().map(|s| s.to)
    }
}

impl Tween for FrameTween {
    fn value(&self) -> f64 {
        self.value
    }

    fn set_value(&mut self, value: f64) {
        self.segment = None;
        self.value = value;
    }

    fn animate_to(&mut self, to: f64, timing: TimingSpec) {
        let duration_ms = timing.duration_ms.max(0.0);
        if duration_ms == 0.0 {
            self.value = to;
        }
        self.segment = Some(Segment {
            from: self.value,
            to,
            duration_ms,
            elapsed_ms: 0.0,
            easing: timing.easing,
        });
    }

    fn stop(&mut self) {
        self.segment = None;
    }

    fn is_running(&self) -> bool {
        self.segment.is_some()
    }

    fn advance(&mut self, delta_ms: f64) -> bool {
        let Some(segment) = self.segment.as_mut() else {
            return false;
        };

        segment.elapsed_ms += delta_ms.max(0.0);
        if segment.elapsed_ms >= segment.duration_ms {
            self.value = segment.to;
            self.segment = None;
            return true;
        }

        let progress = segment.elapsed_ms / segment.duration_ms;
        let eased = segment.easing.evaluate(progress);
        self.value = segment.from + (segment.to - segment.from) * eased;
        false
    }
}
