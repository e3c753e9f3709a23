//! Error types for the navigation engine.

use thiserror::Error;

use crate::route::RouteKey;

/// Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors that can occur while building navigation state or driving animations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// The active index does not point into the route list.
    #[error("navigation index {index} out of range for {len} routes")]
    InvalidIndex { index: isize, len: usize },

    /// Two routes in one navigation state share a key.
    #[error("duplicate route key {0}")]
    DuplicateKey(RouteKey),

    /// An animation was started while another one still drives the transmitter.
    #[error("transmitter animation already running ({0})")]
    AnimationInFlight(&'static str),

    /// A scene config name was not found in the registry.
    #[error("unknown scene config: {0}")]
    UnknownSceneConfig(String),

    /// An interpolation table is malformed.
    #[error("invalid interpolation table: {0}")]
    InvalidInterpolation(&'static str),
}
