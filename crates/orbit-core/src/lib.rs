#![forbid(unsafe_code)]

//! Core: geometry, host handles, input events, and the tour data model.
//!
//! # Role in Orbit
//! `orbit-core` holds the types every other crate speaks: viewport
//! geometry, the opaque element handles the host hands out, pointer and key
//! events, [`Step`](step::Step) and [`Options`](options::Options), and the
//! config merger that turns both into an
//! [`EffectiveConfig`](config::EffectiveConfig).
//!
//! # How it fits in the system
//! `orbit-widgets` computes geometry from these types, `orbit-runtime`
//! drives the tour state machine over them, and `orbit-web` provides a
//! headless host that produces them. This crate performs no I/O.

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod options;
pub mod step;

pub use config::{EffectiveConfig, merge};
pub use error::ConfigError;
pub use event::{Disposition, ElementHandle, KeyEvent, Modifiers, NodeHandle, PointerEvent, PointerKind};
pub use geometry::{Point, Rect, Size};
pub use options::{DeepMerge, Options, Placement, SpotlightShape};
pub use step::{MissingBehavior, OnMissing, Renderable, RoutePattern, Step};
