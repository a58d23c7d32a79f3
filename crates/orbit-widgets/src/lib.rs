#![forbid(unsafe_code)]

//! Overlay geometry for the Orbit tour UI.
//!
//! # Role in Orbit
//! `orbit-widgets` turns element rectangles into the numbers the host needs
//! to draw the overlay: the spotlight mask with its holes, where the tooltip
//! or modal surface sits, and which element should hold keyboard focus.
//!
//! # How it fits in the system
//! The runtime measures the target and the mounted UI container through the
//! host document, calls into this crate, and hands the result to the
//! presenter as an `OverlayLayout`. Nothing here reads the DOM directly
//! except through [`FocusHost`].
//!
//! # Feature Flags
//! - `tracing`: emit `trace`-level focus trap events under `orbit.focus`.

pub mod focus_trap;
pub mod placement;
pub mod spotlight;

pub use focus_trap::{FocusHost, FocusTrap};
pub use placement::{Side, TooltipPosition, VIEWPORT_MARGIN, modal_position, position};
pub use spotlight::{ExtraHole, Hole, SpotlightMask, compute_mask};
