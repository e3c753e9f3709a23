//! Lifecycle notifications emitted by the navigator.
//!
//! Events are queued while the navigator renders and advances, and polled by
//! the host afterwards:
//!
//! ```ignore
//! navigator.render();
//! navigator.advance(16.0);
//! for event in navigator.drain_events() {
//!     match event {
//!         NavigationEvent::TransitionEnd { props, .. } => { /* ... */ }
//!         NavigationEvent::Visibility { key, kind: VisibilityKind::DidShow } => { /* ... */ }
//!         _ => {}
//!     }
//! }
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::route::RouteKey;
use crate::scene::TransitionProps;

/// Per-scene visibility change, keyed by scene key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityKind {
    WillShow,
    DidShow,
    WillHide,
    DidHide,
}

#[derive(Debug)]
pub enum NavigationEvent<R> {
    /// A transition's animation is about to start.
    TransitionStart { props: TransitionProps<R> },
    /// A transition settled. `has_pending_transition` is set when another
    /// transition starts right away.
    TransitionEnd {
        props: TransitionProps<R>,
        has_pending_transition: bool,
    },
    Visibility { key: RouteKey, kind: VisibilityKind },
}

impl<R> Clone for NavigationEvent<R> {
    fn clone(&self) -> Self {
        match self {
            Self::TransitionStart { props } => Self::TransitionStart {
                props: props.clone(),
            },
            Self::TransitionEnd {
                props,
                has_pending_transition,
            } => Self::TransitionEnd {
                props: props.clone(),
                has_pending_transition: *has_pending_transition,
            },
            Self::Visibility { key, kind } => Self::Visibility {
                key: key.clone(),
                kind: *kind,
            },
        }
    }
}

impl<R> NavigationEvent<R> {
    pub fn is_transition_start(&self) -> bool {
        matches!(self, Self::TransitionStart { .. })
    }

    pub fn is_transition_end(&self) -> bool {
        matches!(self, Self::TransitionEnd { .. })
    }

    /// Scene key and kind for visibility events.
    pub fn visibility(&self) -> Option<(&RouteKey, VisibilityKind)> {
        match self {
            Self::Visibility { key, kind } => Some((key, *kind)),
            _ => None,
        }
    }

    /// Transition snapshot for start and end events.
    pub fn props(&self) -> Option<&TransitionProps<R>> {
        match self {
            Self::TransitionStart { props } | Self::TransitionEnd { props, .. } => Some(props),
            Self::Visibility { .. } => None,
        }
    }
}

/// FIFO of notifications not yet polled by the host.
#[derive(Debug)]
pub struct EventQueue<R> {
    events: VecDeque<NavigationEvent<R>>,
}

impl<R> Default for EventQueue<R> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }
}

impl<R> EventQueue<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NavigationEvent<R>) {
        self.events.push_back(event);
    }

    pub fn push_visibility(&mut self, key: &RouteKey, kind: VisibilityKind) {
        tracing::debug!(key = %key, ?kind, "scene visibility");
        self.events.push_back(NavigationEvent::Visibility {
            key: key.clone(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<NavigationEvent<R>> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = NavigationEvent<R>> + '_ {
        self.events.drain(..)
    }

    /// Visibility events queued for the scene with `key`.
    pub fn visibility_for(&self, key: &RouteKey) -> Vec<VisibilityKind> {
        self.events
            .iter()
            .filter_map(NavigationEvent::visibility)
            .filter(|(k, _)| *k == key)
            .map(|(_, kind)| kind)
            .collect()
    }
}
