#![forbid(unsafe_code)]

//! `orbit-web` provides a headless, host-driven backend for Orbit.
//!
//! Design goals:
//! - **Host-driven I/O**: the test (or a JS shim) mutates the document and
//!   history and reports each change to the tour.
//! - **Deterministic time**: the host advances a monotonic clock explicitly.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! Every piece is a cheap shared handle. [`HeadlessHost::host`] hands the
//! engine boxed clones while the caller keeps its own handles for driving
//! and inspection.
//!
//! # Feature Flags
//! - `tracing`: `trace`-level events for appends and pushes under `orbit.web`.

pub mod document;
pub mod history;
pub mod presenter;
pub mod storage;

use std::cell::Cell;
use std::rc::Rc;

use orbit_core::options::Options;
use orbit_core::step::Step;
use orbit_runtime::host::Clock;
use orbit_runtime::router::RouteBridge;
use orbit_runtime::tour::{Host, Tour};
use web_time::Duration;

pub use document::{Element, HeadlessDocument};
pub use history::HeadlessHistory;
pub use presenter::{PresenterLog, RecordingPresenter};
pub use storage::MemoryStorage;

/// Upper bound on ticks delivered by one [`HeadlessHost::advance`].
const MAX_TICKS_PER_ADVANCE: usize = 10_000;

/// Deterministic monotonic clock controlled by the host. Clones share time.
#[derive(Debug, Default, Clone)]
pub struct SharedClock {
    now: Rc<Cell<Duration>>,
}

impl SharedClock {
    /// Create a clock starting at `0`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Set current monotonic time.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }
}

impl Clock for SharedClock {
    fn now_mono(&self) -> Duration {
        self.now.get()
    }
}

/// A complete headless environment.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub document: HeadlessDocument,
    pub storage: MemoryStorage,
    pub history: HeadlessHistory,
    pub presenter: RecordingPresenter,
    pub clock: SharedClock,
    pub router: RouteBridge,
}

impl HeadlessHost {
    /// A `width` x `height` viewport at `path`.
    pub fn new(width: f64, height: f64, path: &str) -> Self {
        let history = HeadlessHistory::at(path);
        Self {
            document: HeadlessDocument::new(width, height),
            storage: MemoryStorage::new(),
            router: RouteBridge::new(history.clone()),
            history,
            presenter: RecordingPresenter::new(),
            clock: SharedClock::new(),
        }
    }

    /// Use `presenter` instead of the default (container-less) one.
    #[must_use]
    pub fn with_presenter(mut self, presenter: RecordingPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    /// Capabilities for [`Tour::new`], sharing state with `self`.
    pub fn host(&self) -> Host {
        Host {
            document: Box::new(self.document.clone()),
            storage: Box::new(self.storage.clone()),
            router: self.router.clone(),
            presenter: Box::new(self.presenter.clone()),
            clock: Box::new(self.clock.clone()),
        }
    }

    /// Build a tour wired to this host.
    pub fn tour(&self, steps: Vec<Step>, options: Options) -> Tour {
        Tour::new(steps, options, self.host())
    }

    /// Advance the clock by `dt`, ticking the tour at every wake it asks for
    /// on the way and once more at the end.
    pub fn advance(&self, tour: &mut Tour, dt: Duration) {
        let end = self.clock.now().saturating_add(dt);
        for _ in 0..MAX_TICKS_PER_ADVANCE {
            match tour.next_wake() {
                Some(at) if at <= end => {
                    if at > self.clock.now() {
                        self.clock.set(at);
                    }
                    tour.on_tick();
                }
                _ => break,
            }
        }
        self.clock.set(end);
        tour.on_tick();
    }

    /// Fire every pending animation frame.
    pub fn flush_frames(&self, tour: &mut Tour) {
        while let Some(frame) = self.document.take_frame() {
            tour.on_animation_frame(frame);
        }
    }

    /// Simulate a navigation the engine did not perform.
    pub fn navigate(&self, tour: &mut Tour, path: &str) {
        self.history.set_path(path);
        self.router.notify_pop();
        tour.on_location_change();
    }
}
