#![forbid(unsafe_code)]

//! Orbit Runtime
//!
//! The host-driven tour engine.
//!
//! # Key Components
//!
//! - [`Tour`] - The orchestrator: control API plus host entry points
//! - [`RouteBridge`] - Shared view of the history stack with `locationchange` listeners
//! - [`resolver`] - Candidate selectors and the target wait race
//! - [`StepStore`] - Ordered steps, runtime state and persistence
//! - [`Race`] - First-to-settle combinator over host-driven wait strategies
//! - [`FrameCoalescer`] - At most one outstanding animation frame
//!
//! # Role in Orbit
//! `orbit-runtime` is the orchestrator. It reads steps and options from
//! `orbit-core`, labels from `orbit-i18n`, overlay geometry from
//! `orbit-widgets`, and talks to the embedding environment only through the
//! traits in [`host`].
//!
//! # How it fits in the system
//! A binding (a browser glue layer, or `orbit-web` under test) implements
//! [`Document`], [`Storage`], [`History`], [`Presenter`] and [`Clock`],
//! builds a [`Tour`], calls [`Tour::mount`], and then forwards DOM events,
//! history changes and clock ticks to the `Tour::on_*` entry points. Nothing
//! in this crate spawns a thread or sleeps.
//!
//! # Feature Flags
//! - `tracing`: also enable focus trap tracing in `orbit-widgets`.

pub mod cancellation;
pub mod frame;
pub mod host;
pub mod layout;
pub mod race;
pub mod resolver;
pub mod router;
pub mod store;
pub mod tour;

#[cfg(test)]
mod test_support;

pub use cancellation::{CancellationSource, CancellationToken};
pub use frame::FrameCoalescer;
pub use host::{Clock, Document, FrameId, History, Presenter, ScrollBehavior, Storage, StorageError, WatchId};
pub use layout::{OverlayLayout, ViewMode, compute_layout};
pub use race::{Deadline, Race, RaceStatus, WaitCx, WaitStrategy, Wake};
pub use resolver::{Resolution, candidate_selectors, css_escape};
pub use router::{ListenerId, NavigationKind, ROOT_PATH, RouteBridge, RouteMatch, is_history_intercepted};
pub use store::{PersistError, RuntimeState, StepStore, load_state, save_state};
pub use tour::{Host, ROUTE_AWAIT_CEILING, ResolvedLabels, StepView, Tour, TourEvent, TourIntent};
