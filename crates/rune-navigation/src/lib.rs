//! rune-navigation: stack navigation engine.
//!
//! - scene reconciliation: navigation states become an ordered, keyed scene list
//! - transitions: a state machine that keeps navigation events and animations in step
//! - transmitter: one animated value in `[0, 3)` driving a three-slot window of styles
//! - gestures: swipe-back responder that can drag, reset or complete a pop
//!
//! The engine is single-threaded and time-driven: the host calls
//! [`Navigator::render`] and [`Navigator::advance`] from its frame loop and
//! polls [`Navigator::drain_events`].

pub mod config;
pub mod easing;
pub mod error;
pub mod events;
pub mod gesture;
pub mod navigator;
pub mod presets;
pub mod route;
pub mod scene;
pub mod state_ops;
pub mod style;
pub mod transmitter;
pub mod tween;

pub use config::{GestureAxis, SceneConfig, TimingSpec};
pub use easing::EasingFunction;
pub use error::{NavError, Result};
pub use events::{NavigationEvent, VisibilityKind};
pub use gesture::{GestureResponder, GestureSample, GestureSettings, GestureState};
pub use navigator::{Frame, FrameScene, Navigator, NavigatorOptions, TransitionState, UpdateOptions};
pub use presets::SceneConfigRegistry;
pub use route::{KeyGenerator, NavigationState, Route, RouteEntry, RouteKey};
pub use scene::{Scene, TransitionProps};
pub use style::{ResolvedStyle, Size, SlotStyle};
pub use transmitter::{AnimationOwner, Transmitter};
pub use tween::{FrameTween, Tween};
