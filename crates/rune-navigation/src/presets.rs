//! Built-in scene configs and the registry that names them.
//!
//! Every preset is a data table over the transmitter position. Slot `k` looks
//! fully active when the position equals `k`, pushed-behind at `k + 1` and
//! waiting off-screen at `k - 1` (all modulo 3). Scenes that must not be seen
//! in a phase are parked far outside the viewport.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{GestureAxis, SceneConfig, TimingSpec};
use crate::easing::EasingFunction;
use crate::error::{NavError, Result};
use crate::style::{Interpolation, SlotStyle, Size};

pub const SLIDE_FROM_RIGHT: &str = "slide_from_right";
pub const SLIDE_FROM_BOTTOM: &str = "slide_from_bottom";
pub const FADE_FROM_BOTTOM: &str = "fade_from_bottom";
pub const FADE: &str = "fade";
pub const FADE_POPUP: &str = "fade_popup";
pub const NO_ANIMATION: &str = "no_animation";

/// Off-canvas offset for scenes hidden mid-transition.
const PARKED: f64 = 100_000.0;

fn base_easing() -> EasingFunction {
    EasingFunction::cubic_bezier(0.2833, 0.99, 0.31833, 0.99)
}

fn decelerate() -> EasingFunction {
    EasingFunction::OutPoly { exponent: 5 }
}

fn lerp(input: &[f64], output: &[f64]) -> Option<Interpolation> {
    Some(Interpolation::table(input, output))
}

/// Translation tables shared by the slide presets.
///
/// `extent` is the viewport length along the axis, `behind` the offset of a
/// pushed-behind scene.
fn slide_translations(extent: f64, behind: f64) -> [Option<Interpolation>; 3] {
    [
        lerp(
            &[0.0, 0.999, 1.0, 1.5, 1.5, 2.0, 3.0],
            &[0.0, behind, -PARKED, -PARKED, PARKED, extent, 0.0],
        ),
        lerp(
            &[0.0, 1.0, 1.999, 2.0, 2.5, 2.5, 3.0],
            &[extent, 0.0, behind, -PARKED, -PARKED, PARKED, extent],
        ),
        lerp(
            &[0.0, 0.5, 0.5, 1.0, 2.0, 2.999, 3.0],
            &[-PARKED, -PARKED, PARKED, extent, 0.0, behind, -PARKED],
        ),
    ]
}

fn slide_opacities(left: f64) -> [Option<Interpolation>; 3] {
    [
        lerp(&[0.0, 0.999, 1.0, 2.0, 2.0, 3.0], &[1.0, left, 0.0, 0.0, 1.0, 1.0]),
        lerp(&[0.0, 0.0, 1.0, 1.999, 2.0, 3.0], &[0.0, 1.0, 1.0, left, 0.0, 0.0]),
        lerp(&[0.0, 1.0, 1.0, 2.0, 2.999, 3.0], &[0.0, 0.0, 1.0, 1.0, left, 0.0]),
    ]
}

fn slide_from_right_styles(viewport: Size) -> [SlotStyle; 3] {
    let [tx0, tx1, tx2] = slide_translations(viewport.width, -viewport.width * 0.3);
    let [o0, o1, o2] = slide_opacities(0.4);
    [
        SlotStyle { translate_x: tx0, opacity: o0, ..Default::default() },
        SlotStyle { translate_x: tx1, opacity: o1, ..Default::default() },
        SlotStyle { translate_x: tx2, opacity: o2, ..Default::default() },
    ]
}

fn slide_from_bottom_styles(viewport: Size) -> [SlotStyle; 3] {
    let [ty0, ty1, ty2] = slide_translations(viewport.height, 0.0);
    let [o0, o1, o2] = slide_opacities(0.85);
    [
        SlotStyle { translate_y: ty0, opacity: o0, ..Default::default() },
        SlotStyle { translate_y: ty1, opacity: o1, ..Default::default() },
        SlotStyle { translate_y: ty2, opacity: o2, ..Default::default() },
    ]
}

fn fade_from_bottom_styles(_viewport: Size) -> [SlotStyle; 3] {
    const RISE: f64 = 25.0;
    const LEFT: f64 = 0.85;
    [
        SlotStyle {
            translate_y: lerp(
                &[0.0, 0.999, 1.0, 1.5, 1.5, 2.0, 3.0],
                &[0.0, 0.0, -PARKED, -PARKED, PARKED, RISE, 0.0],
            ),
            opacity: lerp(&[0.0, 0.999, 1.0, 2.0, 3.0], &[1.0, LEFT, 0.0, 0.0, 1.0]),
            ..Default::default()
        },
        SlotStyle {
            translate_y: lerp(
                &[0.0, 1.0, 1.999, 2.0, 2.5, 2.5, 3.0],
                &[RISE, 0.0, 0.0, -PARKED, -PARKED, PARKED, RISE],
            ),
            opacity: lerp(&[0.0, 1.0, 1.999, 2.0, 3.0], &[0.0, 1.0, LEFT, 0.0, 0.0]),
            ..Default::default()
        },
        SlotStyle {
            translate_y: lerp(
                &[0.0, 0.5, 0.5, 1.0, 2.0, 2.999, 3.0],
                &[-PARKED, -PARKED, PARKED, RISE, 0.0, 0.0, -PARKED],
            ),
            opacity: lerp(&[0.0, 1.0, 2.0, 2.999, 3.0], &[0.0, 0.0, 1.0, LEFT, 0.0]),
            ..Default::default()
        },
    ]
}

fn fade_styles(_viewport: Size) -> [SlotStyle; 3] {
    const LEFT: f64 = 0.85;
    [
        SlotStyle {
            translate_x: lerp(&[0.0, 0.999, 1.0, 2.0, 3.0], &[0.0, 0.0, -PARKED, 0.0, 0.0]),
            opacity: lerp(&[0.0, 0.999, 1.0, 2.0, 3.0], &[1.0, LEFT, 0.0, 0.0, 1.0]),
            ..Default::default()
        },
        SlotStyle {
            translate_x: lerp(&[0.0, 1.0, 1.999, 2.0, 3.0], &[0.0, 0.0, 0.0, -PARKED, 0.0]),
            opacity: lerp(&[0.0, 1.0, 1.999, 2.0, 3.0], &[0.0, 1.0, LEFT, 0.0, 0.0]),
            ..Default::default()
        },
        SlotStyle {
            translate_x: lerp(&[0.0, 1.0, 2.0, 2.999, 3.0], &[-PARKED, 0.0, 0.0, 0.0, -PARKED]),
            opacity: lerp(&[0.0, 1.0, 2.0, 2.999, 3.0], &[0.0, 0.0, 1.0, LEFT, 0.0]),
            ..Default::default()
        },
    ]
}

/// Opacity-only cross fade; the covered scene stays fully visible.
fn fade_popup_styles(_viewport: Size) -> [SlotStyle; 3] {
    let input = [0.0, 1.0, 2.0, 3.0];
    [
        SlotStyle { opacity: lerp(&input, &[1.0, 1.0, 0.0, 1.0]), ..Default::default() },
        SlotStyle { opacity: lerp(&input, &[0.0, 1.0, 1.0, 0.0]), ..Default::default() },
        SlotStyle { opacity: lerp(&input, &[1.0, 0.0, 1.0, 1.0]), ..Default::default() },
    ]
}

fn static_styles(_viewport: Size) -> [SlotStyle; 3] {
    Default::default()
}

/// Horizontal card push, swipe back from the left edge.
pub fn slide_from_right() -> SceneConfig {
    SceneConfig::new(
        SLIDE_FROM_RIGHT,
        GestureAxis::Horizontal,
        TimingSpec::new(450.0, base_easing()),
        slide_from_right_styles,
    )
}

/// Modal-style slide up, swipe down to dismiss.
pub fn slide_from_bottom() -> SceneConfig {
    SceneConfig::new(
        SLIDE_FROM_BOTTOM,
        GestureAxis::Vertical,
        TimingSpec::new(470.0, base_easing()),
        slide_from_bottom_styles,
    )
}

/// Short rise with fade, Android activity style.
pub fn fade_from_bottom() -> SceneConfig {
    SceneConfig::new(
        FADE_FROM_BOTTOM,
        GestureAxis::None,
        TimingSpec::new(370.0, decelerate()),
        fade_from_bottom_styles,
    )
}

pub fn fade() -> SceneConfig {
    SceneConfig::new(
        FADE,
        GestureAxis::None,
        TimingSpec::new(400.0, EasingFunction::EaseInOut),
        fade_styles,
    )
}

pub fn fade_popup() -> SceneConfig {
    SceneConfig::new(
        FADE_POPUP,
        GestureAxis::None,
        TimingSpec::new(300.0, EasingFunction::EaseInOut),
        fade_popup_styles,
    )
}

pub fn no_animation() -> SceneConfig {
    SceneConfig::new(
        NO_ANIMATION,
        GestureAxis::None,
        TimingSpec::new(0.0, EasingFunction::Linear),
        static_styles,
    )
}

/// Named scene configs, preloaded with the built-in presets.
#[derive(Debug)]
pub struct SceneConfigRegistry {
    configs: HashMap<String, Arc<SceneConfig>>,
    default_name: String,
}

impl Default for SceneConfigRegistry {
    fn default() -> Self {
        Self::with_presets()
    }
}

impl SceneConfigRegistry {
    /// Registry holding every built-in preset, defaulting to slide-from-right.
    pub fn with_presets() -> Self {
        let mut registry = Self {
            configs: HashMap::new(),
            default_name: SLIDE_FROM_RIGHT.to_string(),
        };
        for config in [
            slide_from_right(),
            slide_from_bottom(),
            fade_from_bottom(),
            fade(),
            fade_popup(),
            no_animation(),
        ] {
            registry.register(config);
        }
        registry
    }

    /// Add or replace a config under its own name.
    pub fn register(&mut self, config: SceneConfig) -> Arc<SceneConfig> {
        let config = Arc::new(config);
        self.configs
            .insert(config.name().to_string(), Arc::clone(&config));
        config
    }

    pub fn get(&self, name: &str) -> Option<Arc<SceneConfig>> {
        self.configs.get(name).cloned()
    }

    /// Choose the config handed to scenes that do not pick their own.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.configs.contains_key(name) {
            return Err(NavError::UnknownSceneConfig(name.to_string()));
        }
        self.default_name = name.to_string();
        Ok(())
    }

    pub fn default_config(&self) -> Arc<SceneConfig> {
        match self.configs.get(&self.default_name) {
            Some(config) => Arc::clone(config),
            // set_default guarantees presence; fall back if the entry was replaced away
            None => Arc::new(slide_from_right()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(400.0, 800.0);

    #[test]
    fn test_slot_is_active_at_own_position() {
        for config in [slide_from_right(), slide_from_bottom(), fade_from_bottom(), fade()] {
            let styles = config.create_styles(VIEWPORT);
            for (k, style) in styles.iter().enumerate() {
                let resolved = style.resolve(k as f64);
                assert_eq!(resolved.translate_x, 0.0, "{} slot {}", config.name(), k);
                assert_eq!(resolved.translate_y, 0.0, "{} slot {}", config.name(), k);
                assert_eq!(resolved.opacity, 1.0, "{} slot {}", config.name(), k);
            }
        }
    }

    #[test]
    fn test_slide_from_right_phases() {
        let styles = slide_from_right().create_styles(VIEWPORT);
        // Slot 1 waits off-screen right at position 0 and sits behind at ~2.
        assert_eq!(styles[1].resolve(0.0).translate_x, 400.0);
        assert_eq!(styles[1].resolve(0.5).translate_x, 200.0);
        assert!((styles[1].resolve(1.999).translate_x + 120.0).abs() < 0.1);
        // Slot 0 is parked while slot 1 and 2 are the pair on screen.
        assert!(styles[0].resolve(1.2).translate_x.abs() >= PARKED);
    }

    #[test]
    fn test_styles_are_periodic() {
        let styles = slide_from_bottom().create_styles(VIEWPORT);
        for style in styles.iter() {
            assert_eq!(style.resolve(0.0), style.resolve(3.0));
        }
    }

    #[test]
    fn test_registry_defaults_and_custom() {
        let mut registry = SceneConfigRegistry::with_presets();
        assert_eq!(registry.default_config().name(), SLIDE_FROM_RIGHT);
        assert_eq!(registry.get(FADE).unwrap().gesture(), GestureAxis::None);
        assert_eq!(registry.get(SLIDE_FROM_BOTTOM).unwrap().gesture(), GestureAxis::Vertical);

        assert!(registry.set_default("missing").is_err());
        registry.set_default(FADE_POPUP).unwrap();
        assert_eq!(registry.default_config().name(), FADE_POPUP);

        registry.register(SceneConfig::new(
            "custom",
            GestureAxis::Horizontal,
            TimingSpec::linear(10.0),
            static_styles,
        ));
        assert!(registry.get("custom").is_some());
    }
}
