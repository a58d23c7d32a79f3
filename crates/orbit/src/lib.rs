#![forbid(unsafe_code)]

//! Orbit public facade crate.
//!
//! Re-exports the types an embedding needs from the internal crates and
//! offers a prelude plus JSON entry points for building a tour from
//! configuration files.
//!
//! # Feature Flags
//! - `headless` (default): the deterministic [`web`] backend.
//! - `tracing`: forward trace-level events from the runtime and backend.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use orbit_core::{
    ConfigError, Disposition, EffectiveConfig, ElementHandle, KeyEvent, MissingBehavior,
    Modifiers, NodeHandle, OnMissing, Options, Placement, Point, PointerEvent, PointerKind, Rect,
    Renderable, RoutePattern, Size, SpotlightShape, Step,
};

// --- I18n re-exports -------------------------------------------------------

pub use orbit_i18n::{StringCatalog, Translate, Translator, detect_locale};

// --- Widget re-exports -----------------------------------------------------

pub use orbit_widgets::{Side, SpotlightMask, TooltipPosition};

// --- Runtime re-exports ----------------------------------------------------

pub use orbit_runtime::{
    Clock, Document, History, Host, OverlayLayout, PersistError, Presenter, RouteBridge,
    RuntimeState, Storage, StorageError, StepView, Tour, TourEvent, TourIntent, ViewMode,
};

// --- Errors ---------------------------------------------------------------

/// Errors raised while building a tour from serialized input.
#[derive(Debug)]
pub enum Error {
    /// Options or steps JSON was malformed.
    Config(ConfigError),
    /// Persisted runtime state could not be encoded or decoded.
    Persist(PersistError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PersistError> for Error {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

/// Standard result type for Orbit facade APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- JSON entry points -----------------------------------------------------

/// Build a tour from a JSON step array and a JSON options object.
///
/// An empty `options_json` means default options.
pub fn tour_from_json(steps_json: &str, options_json: &str, host: Host) -> Result<Tour> {
    let steps = Step::list_from_json_str(steps_json)?;
    let options = if options_json.trim().is_empty() {
        Options::default()
    } else {
        Options::from_json_str(options_json)?
    };
    Ok(Tour::new(steps, options, host))
}

/// Decode persisted runtime state, as stored under the tour's storage key.
pub fn decode_state(raw: &str) -> Result<RuntimeState> {
    Ok(RuntimeState::from_json(raw)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Disposition, Error, KeyEvent, Options, PointerEvent, Result, Step, Tour, TourEvent,
        TourIntent, tour_from_json,
    };

    pub use crate::{core, i18n, runtime, widgets};

    #[cfg(feature = "headless")]
    pub use crate::web;
}

pub use orbit_core as core;
pub use orbit_i18n as i18n;
pub use orbit_runtime as runtime;
#[cfg(feature = "headless")]
pub use orbit_web as web;
pub use orbit_widgets as widgets;
