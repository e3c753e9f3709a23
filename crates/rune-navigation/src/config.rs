//! Scene configuration: gesture axis, transition timing and slot styles.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::style::{SlotStyle, Size};

/// Axis along which a swipe-back gesture may be dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAxis {
    Horizontal,
    Vertical,
    None,
}

impl Default for GestureAxis {
    fn default() -> Self {
        Self::None
    }
}

/// Duration and easing of a transmitter animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSpec {
    pub duration_ms: f64,
    pub easing: EasingFunction,
}

impl TimingSpec {
    pub fn new(duration_ms: f64, easing: EasingFunction) -> Self {
        Self { duration_ms, easing }
    }

    /// Linear timing, used for gesture completions.
    pub fn linear(duration_ms: f64) -> Self {
        Self::new(duration_ms, EasingFunction::Linear)
    }

    /// Same easing, no duration.
    pub fn instant(self) -> Self {
        Self {
            duration_ms: 0.0,
            ..self
        }
    }
}

impl Default for TimingSpec {
    fn default() -> Self {
        Self::new(300.0, EasingFunction::EaseInOut)
    }
}

/// Produces the three slot styles (before, active, after) for a viewport.
///
/// Must be pure for a given viewport size; results are cached.
pub trait StyleFactory {
    fn create_styles(&self, viewport: Size) -> [SlotStyle; 3];
}

impl<F> StyleFactory for F
where
    F: Fn(Size) -> [SlotStyle; 3],
{
    fn create_styles(&self, viewport: Size) -> [SlotStyle; 3] {
        self(viewport)
    }
}

/// Process-unique identity of a [`SceneConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneConfigId(u64);

impl SceneConfigId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable behavior descriptor attached to a scene the first time it is seen.
pub struct SceneConfig {
    id: SceneConfigId,
    name: String,
    gesture: GestureAxis,
    timing: TimingSpec,
    styles: Box<dyn StyleFactory>,
}

impl fmt::Debug for SceneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("gesture", &self.gesture)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl SceneConfig {
    pub fn new(
        name: impl Into<String>,
        gesture: GestureAxis,
        timing: TimingSpec,
        styles: impl StyleFactory + 'static,
    ) -> Self {
        Self {
            id: SceneConfigId::next(),
            name: name.into(),
            gesture,
            timing,
            styles: Box::new(styles),
        }
    }

    /// Identity used by the style cache. Two configs never share one, even
    /// under the same name.
    pub fn id(&self) -> SceneConfigId {
        self.id
    }

    /// Registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gesture(&self) -> GestureAxis {
        self.gesture
    }

    pub fn timing(&self) -> TimingSpec {
        self.timing
    }

    pub fn create_styles(&self, viewport: Size) -> [SlotStyle; 3] {
        self.styles.create_styles(viewport)
    }
}

struct CachedStyles {
    viewport: Size,
    styles: Arc<[SlotStyle; 3]>,
}

/// Memoized slot styles keyed by (config identity, viewport size).
///
/// Only the latest viewport is kept per config; a size change recomputes.
#[derive(Default)]
pub struct StyleCache {
    entries: HashMap<SceneConfigId, CachedStyles>,
}

impl fmt::Debug for StyleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleCache")
            .field("configs", &self.entries.len())
            .finish()
    }
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, config: &SceneConfig, viewport: Size) -> Arc<[SlotStyle; 3]> {
        if let Some(cached) = self.entries.get(&config.id()) {
            if cached.viewport == viewport {
                return Arc::clone(&cached.styles);
            }
        }

        tracing::debug!(config = config.name(), ?viewport, "computing slot styles");
        let styles = Arc::new(config.create_styles(viewport));
        self.entries.insert(
            config.id(),
            CachedStyles {
                viewport,
                styles: Arc::clone(&styles),
            },
        );
        styles
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Interpolation;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_cache_recomputes_only_on_resize() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let config = SceneConfig::new(
            "counting",
            GestureAxis::Horizontal,
            TimingSpec::default(),
            move |_size: Size| {
                counter.set(counter.get() + 1);
                <[SlotStyle; 3]>::default()
            },
        );

        let mut cache = StyleCache::new();
        let first = cache.get(&config, Size::new(100.0, 200.0));
        let again = cache.get(&config, Size::new(100.0, 200.0));
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(calls.get(), 1);

        let resized = cache.get(&config, Size::new(200.0, 100.0));
        assert!(!Arc::ptr_eq(&first, &resized));
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_separates_configs_sharing_a_name() {
        let visible = SceneConfig::new(
            "custom",
            GestureAxis::None,
            TimingSpec::default(),
            |_size: Size| <[SlotStyle; 3]>::default(),
        );
        let hidden = SceneConfig::new(
            "custom",
            GestureAxis::None,
            TimingSpec::default(),
            |_size: Size| {
                let mut styles = <[SlotStyle; 3]>::default();
                styles[0].opacity = Some(Interpolation::table(&[0.0, 3.0], &[0.0, 0.0]));
                styles
            },
        );
        assert_ne!(visible.id(), hidden.id());

        let viewport = Size::new(100.0, 200.0);
        let mut cache = StyleCache::new();
        let a = cache.get(&visible, viewport);
        let b = cache.get(&hidden, viewport);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a[0].resolve(1.0).opacity, 1.0);
        assert_eq!(b[0].resolve(1.0).opacity, 0.0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_instant_timing_keeps_easing() {
        let spec = TimingSpec::new(450.0, EasingFunction::Ease).instant();
        assert_eq!(spec.duration_ms, 0.0);
        assert_eq!(spec.easing, EasingFunction::Ease);
    }
}
