//! Easing curves for transmitter animations.
//!
//! - Linear
//! - Ease, EaseIn, EaseOut, EaseInOut (standard CSS curves)
//! - CubicBezier (custom bezier curves)
//! - OutPoly (polynomial deceleration, `1 - (1 - t)^n`)
//!
//! # Usage
//!
//! ```
//! use rune_navigation::easing::EasingFunction;
//!
//! let ease = EasingFunction::cubic_bezier(0.2833, 0.99, 0.31833, 0.99);
//! let progress = ease.evaluate(0.5);
//! assert!(progress > 0.5);
//! ```

use serde::{Deserialize, Serialize};

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing.
    Linear,

    /// CSS `ease`, `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in`, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out`, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out`, `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve through control points (x1, y1) and (x2, y2).
    /// x values must be in [0, 1].
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    /// Decelerating polynomial: `1 - (1 - t)^exponent`.
    OutPoly { exponent: i32 },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::EaseInOut
    }
}

impl EasingFunction {
    /// Evaluate the curve at progress `t` (clamped to `[0, 1]`).
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Self::Linear => t,
            Self::Ease => bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => bezier(x1, y1, x2, y2, t),
            Self::OutPoly { exponent } => 1.0 - (1.0 - t).powi(exponent),
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }
}

/// Solve the curve for `x == progress` with Newton-Raphson, then read y.
fn bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let mut t = progress;
    for _ in 0..8 {
        let err = axis(x1, x2, t) - progress;
        if err.abs() < 1e-7 {
            break;
        }
        let dx = slope(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }
        t = (t - err / dx).clamp(0.0, 1.0);
    }

    axis(y1, y2, t)
}

/// One coordinate of the curve: `3(1-t)²t·p1 + 3(1-t)t²·p2 + t³`.
#[inline]
fn axis(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn slope(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}
