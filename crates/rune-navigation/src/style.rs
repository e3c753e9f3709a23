//! Slot style descriptors.
//!
//! A scene config describes, for each of the three transmitter slots, how a
//! scene looks as a function of the observed transmitter position in `[0, 3]`.
//! Each animated property is a piecewise-linear table; the render surface
//! resolves the tables to plain numbers once per frame.

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Viewport size in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Piecewise-linear mapping from transmitter position to a property value.
///
/// Input breakpoints must be non-decreasing. A repeated breakpoint encodes a
/// jump: the left segment owns the breakpoint itself, the right segment takes
/// over immediately after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl Interpolation {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Result<Self> {
        if input.len() < 2 {
            return Err(NavError::InvalidInterpolation("need at least two breakpoints"));
        }
        if input.len() != output.len() {
            return Err(NavError::InvalidInterpolation("input and output lengths differ"));
        }
        if input.windows(2).any(|w| w[1] < w[0]) {
            return Err(NavError::InvalidInterpolation("input must be non-decreasing"));
        }
        Ok(Self { input, output })
    }

    /// Build from static tables known to be well formed.
    pub(crate) fn table(input: &[f64], output: &[f64]) -> Self {
        debug_assert!(input.len() >= 2 && input.len() == output.len());
        Self {
            input: input.to_vec(),
            output: output.to_vec(),
        }
    }

    /// Evaluate at `x`, clamping outside the table.
    pub fn evaluate(&self, x: f64) -> f64 {
        let last = self.input.len() - 1;
        if x <= self.input[0] {
            return self.output[0];
        }
        if x >= self.input[last] {
            return self.output[last];
        }

        // First segment whose right edge reaches x.
        let mut i = 1;
        while i < last && self.input[i] < x {
            i += 1;
        }
        let (in_min, in_max) = (self.input[i - 1], self.input[i]);
        let (out_min, out_max) = (self.output[i - 1], self.output[i]);
        if in_max == in_min {
            return out_max;
        }
        out_min + (out_max - out_min) * (x - in_min) / (in_max - in_min)
    }
}

/// Style of one slot, as functions of the transmitter position.
///
/// Properties left as `None` keep their resting value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotStyle {
    pub translate_x: Option<Interpolation>,
    pub translate_y: Option<Interpolation>,
    pub opacity: Option<Interpolation>,
}

impl SlotStyle {
    pub fn resolve(&self, position: f64) -> ResolvedStyle {
        let eval = |table: &Option<Interpolation>, rest: f64| {
            table.as_ref().map_or(rest, |t| t.evaluate(position))
        };
        ResolvedStyle {
            translate_x: eval(&self.translate_x, 0.0),
            translate_y: eval(&self.translate_y, 0.0),
            opacity: eval(&self.opacity, 1.0),
        }
    }
}

/// Concrete style values for one scene in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStyle {
    pub translate_x: f64,
    pub translate_y: f64,
    pub opacity: f64,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            opacity: 1.0,
        }
    }
}
