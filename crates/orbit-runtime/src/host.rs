#![forbid(unsafe_code)]

//! Host capability traits.
//!
//! The runtime owns no DOM, no history stack, no storage and no clock. The
//! embedding environment implements these traits (a browser binding, or
//! `orbit-web`'s headless host in tests) and the runtime calls through them.
//!
//! Observation is inverted: the runtime asks the host to start watching
//! (`observe_mutations`, `observe_resize`, `request_animation_frame`) and
//! the host later reports what it saw through the `Tour::on_*` entry points.
//! Every watch returns an id that the runtime releases when the wait
//! settles, the step changes, or the tour unmounts.

use std::fmt;

use orbit_core::event::ElementHandle;
use orbit_core::geometry::{Rect, Size};
use orbit_widgets::FocusHost;
use web_time::Duration;

use crate::tour::{StepView, TourEvent};
use crate::layout::OverlayLayout;

/// Identifies a mutation or resize observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// Identifies a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// How `scroll_into_view` animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    /// Jump immediately (reduced motion).
    Instant,
    Smooth,
}

/// DOM query and observation.
pub trait Document: FocusHost {
    /// First element matching `selector`, or `None` (including for
    /// selectors the host cannot parse).
    fn query_selector(&self, selector: &str) -> Option<ElementHandle>;

    /// Viewport-relative bounding rectangle, `None` once detached.
    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect>;

    /// Inner size of the viewport.
    fn viewport(&self) -> Size;

    /// Scroll `element` to the center of the viewport.
    fn scroll_into_view(&mut self, element: ElementHandle, behavior: ScrollBehavior);

    /// `prefers-reduced-motion: reduce`.
    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    /// Whether `element` accepts text input (input, textarea, select,
    /// contenteditable).
    fn is_editable(&self, element: ElementHandle) -> bool;

    /// The host's preferred language tag, if known.
    fn language(&self) -> Option<String> {
        None
    }

    /// Start watching the document subtree for child-list changes.
    fn observe_mutations(&mut self) -> WatchId;

    fn disconnect_mutations(&mut self, id: WatchId);

    /// Start watching `element` for size changes.
    fn observe_resize(&mut self, element: ElementHandle) -> WatchId;

    fn unobserve_resize(&mut self, id: WatchId);

    fn request_animation_frame(&mut self) -> FrameId;

    fn cancel_animation_frame(&mut self, id: FrameId);
}

/// Failure reported by a [`Storage`] backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled (private mode, sandboxed frame).
    Unavailable,
    /// The write exceeded the backend's quota.
    QuotaExceeded,
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::QuotaExceeded => write!(f, "storage quota exceeded"),
            Self::Backend(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Key-value persistence (`localStorage`).
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The browser history stack.
pub trait History {
    /// Current path, or `None` without a navigation context.
    fn path(&self) -> Option<String>;

    fn push_state(&mut self, path: &str);

    fn replace_state(&mut self, path: &str);

    /// Wrap `pushState`/`replaceState` and listen for `popstate` so every
    /// navigation is reported back through the route bridge. Called at most
    /// once per process.
    fn intercept(&mut self);
}

/// Receives rendered steps and overlay geometry.
pub trait Presenter {
    /// Mount or update the tour UI for `view`.
    fn render(&mut self, view: &StepView);

    /// Apply freshly computed overlay geometry.
    fn layout(&mut self, layout: &OverlayLayout);

    /// Unmount the tour UI.
    fn clear(&mut self);

    /// Root element of the mounted tooltip or modal surface.
    fn container(&self) -> Option<ElementHandle>;

    /// Lifecycle notification.
    fn notify(&mut self, _event: &TourEvent) {}
}

/// Monotonic time source.
pub trait Clock {
    fn now_mono(&self) -> Duration;
}
