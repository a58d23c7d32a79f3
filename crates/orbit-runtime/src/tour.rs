#![forbid(unsafe_code)]

//! The tour orchestrator.
//!
//! [`Tour`] ties the step store, route bridge, target resolver and overlay
//! layout together behind a small control API (`start`, `next`, `prev`,
//! `go_to`, `stop`) and a set of host entry points (`on_*`).
//!
//! # Role in Orbit
//!
//! The engine never blocks and never owns a timer. Every step entry runs as
//! far as it can synchronously; whatever has to wait (a route change, a
//! late target) parks in a [`Phase`] and is driven forward by the host's
//! `on_tick`, `on_dom_mutation` and `on_location_change` calls. The host
//! learns when to call `on_tick` from [`Tour::next_wake`].
//!
//! # Step entry
//!
//! 1. **Route**: if the step names a route the current path does not match,
//!    navigate to it (exact routes only) and wait for the match, giving up
//!    after [`ROUTE_AWAIT_CEILING`].
//! 2. **Target**: resolve the candidate selectors with the step's wait
//!    config.
//! 3. **Missing target**: apply `onMissing` (`skip`, `halt`, or
//!    `fallbackSelector` then halt).
//! 4. **Show**: render the [`StepView`], observe the target's size, trap
//!    focus, lay out the overlay and schedule a re-measure frame.
//!
//! # Invariants
//!
//! 1. At most one wait (route or target) is in flight. Entering a step
//!    cancels the previous entry's [`CancellationSource`] and tears down its
//!    race before anything new is armed.
//! 2. A cancelled entry never shows a step.
//! 3. `Completed` and `Cancelled` are each emitted once per activation:
//!    `finish` is a no-op when the store is already inactive.
//!
//! # Failure Modes
//!
//! Nothing here returns an error. Missing targets fall back to `onMissing`,
//! route waits time out into target resolution, storage failures are
//! logged by the store and ignored.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use orbit_core::config::{EffectiveConfig, merge};
use orbit_core::event::{Disposition, ElementHandle, KeyEvent, PointerEvent, PointerKind};
use orbit_core::geometry::Size;
use orbit_core::options::Options;
use orbit_core::step::{MissingBehavior, Renderable, Step};
use orbit_i18n::{Translate, Translator};
use orbit_widgets::FocusTrap;
use web_time::Duration;

use crate::cancellation::{CancellationSource, CancellationToken};
use crate::frame::FrameCoalescer;
use crate::host::{Clock, Document, FrameId, Presenter, Storage, WatchId};
use crate::layout::{ViewMode, compute_layout};
use crate::race::{Deadline, Race, RaceStatus, WaitCx, Wake};
use crate::resolver::{PendingTarget, Resolution, candidate_selectors, resolve, resolve_by_selector};
use crate::router::{ListenerId, RouteBridge, RouteMatch};
use crate::store::{RuntimeState, StepStore};

/// Longest the engine waits for a step's route to become current.
pub const ROUTE_AWAIT_CEILING: Duration = Duration::from_secs(4);

/// Lifecycle notifications delivered through [`Presenter::notify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    StepShown { id: String, index: usize },
    /// A targeted step's target never appeared.
    TargetMissing { id: String, behavior: MissingBehavior },
    /// `next()` ran past the last step.
    Completed,
    /// `stop()` or `close()` ended an active tour.
    Cancelled,
}

/// Actions raised by the rendered tour UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourIntent {
    Next,
    Prev,
    Close,
}

/// Control labels after step, option and locale fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabels {
    pub next: String,
    pub prev: String,
    pub close: String,
}

impl ResolvedLabels {
    /// Step labels win over tooltip labels, which win over the translator.
    pub fn resolve(step: &Step, config: &EffectiveConfig, t: &dyn Translate) -> Self {
        let step_labels = step.labels.as_ref();
        let option_labels = &config.tooltip.labels;
        let pick = |from_step: Option<&String>, from_options: &Option<String>, key: &str, default: &str| {
            from_step
                .or(from_options.as_ref())
                .cloned()
                .unwrap_or_else(|| t.t(key, Some(default)))
        };
        Self {
            next: pick(step_labels.and_then(|l| l.next.as_ref()), &option_labels.next, "next", "Next"),
            prev: pick(step_labels.and_then(|l| l.prev.as_ref()), &option_labels.prev, "prev", "Back"),
            close: pick(step_labels.and_then(|l| l.close.as_ref()), &option_labels.close, "close", "Close"),
        }
    }
}

/// Everything the presenter needs to render one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub step_id: String,
    pub index: usize,
    pub count: usize,
    pub mode: ViewMode,
    pub target: Option<ElementHandle>,
    pub title: Option<Renderable>,
    pub content: Renderable,
    pub footer: Option<Renderable>,
    pub labels: ResolvedLabels,
    pub show_prev: bool,
    pub show_close: bool,
    pub is_last: bool,
    pub class_names: BTreeMap<String, String>,
    pub config: EffectiveConfig,
    /// Polite live-region text, `"<title> (i/n)"`.
    pub announcement: String,
}

impl StepView {
    fn build(
        step: &Step,
        index: usize,
        count: usize,
        mode: ViewMode,
        target: Option<ElementHandle>,
        config: EffectiveConfig,
        t: &dyn Translate,
    ) -> Self {
        let modal = mode == ViewMode::Modal;
        let title = step
            .title
            .clone()
            .or_else(|| modal.then(|| config.modal.title.clone()).flatten());
        let footer = step
            .footer
            .clone()
            .or_else(|| modal.then(|| config.modal.footer.clone()).flatten());
        let heading = title
            .as_ref()
            .and_then(Renderable::as_text)
            .map(str::to_owned)
            .unwrap_or_else(|| t.t("title", Some("Tour")));
        Self {
            step_id: step.id.clone(),
            index,
            count,
            mode,
            target,
            title,
            content: step.content.clone(),
            footer,
            labels: ResolvedLabels::resolve(step, &config, t),
            show_prev: config.controls.show_prev && !(config.controls.hide_prev_on_first && index == 0),
            show_close: config.controls.show_close,
            is_last: index + 1 == count,
            class_names: config.class_names.clone(),
            announcement: format!("{heading} ({}/{count})", index + 1),
            config,
        }
    }
}

/// Host capabilities handed to [`Tour::new`].
pub struct Host {
    pub document: Box<dyn Document>,
    pub storage: Box<dyn Storage>,
    pub router: RouteBridge,
    pub presenter: Box<dyn Presenter>,
    pub clock: Box<dyn Clock>,
}

/// A step on screen.
#[derive(Debug)]
struct Shown {
    target: Option<ElementHandle>,
    config: EffectiveConfig,
    mode: ViewMode,
    resize_watch: Option<WatchId>,
}

/// Where the current step entry is.
#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    /// Waiting for the step's route to become current.
    Routing { index: usize, race: Race<bool> },
    /// Waiting for the target (or, with `fallback`, the fallback selector).
    Resolving {
        index: usize,
        pending: PendingTarget,
        fallback: bool,
    },
    Shown(Shown),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Routing { .. } => "routing",
            Self::Resolving { .. } => "resolving",
            Self::Shown(_) => "shown",
        }
    }
}

/// The tour engine.
pub struct Tour {
    store: StepStore,
    options: Options,
    storage_key: String,
    resume_on_load: bool,
    document: Box<dyn Document>,
    storage: Box<dyn Storage>,
    router: RouteBridge,
    presenter: Box<dyn Presenter>,
    clock: Box<dyn Clock>,
    translator: Box<dyn Translate>,
    phase: Phase,
    generation: u64,
    entry: Option<CancellationSource>,
    focus: FocusTrap,
    frames: FrameCoalescer,
    listener: Option<ListenerId>,
    location_dirty: Rc<Cell<bool>>,
    /// A step view is rendered and not yet cleared.
    presented: bool,
    mounted: bool,
}

impl Tour {
    /// Create an inactive tour. Call [`mount`](Self::mount) to resume.
    pub fn new(steps: Vec<Step>, options: Options, host: Host) -> Self {
        let global = EffectiveConfig::from_options(&options);
        let translator = Translator::from_options(&global.i18n, host.document.language().as_deref());
        Self {
            store: StepStore::new(steps),
            storage_key: global.storage.composite_key(),
            resume_on_load: global.resume_on_load,
            options,
            document: host.document,
            storage: host.storage,
            router: host.router,
            presenter: host.presenter,
            clock: host.clock,
            translator: Box::new(translator),
            phase: Phase::Idle,
            generation: 0,
            entry: None,
            focus: FocusTrap::new(),
            frames: FrameCoalescer::new(),
            listener: None,
            location_dirty: Rc::new(Cell::new(false)),
            presented: false,
            mounted: false,
        }
    }

    /// Replace the default catalog translator.
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &RuntimeState {
        self.store.state()
    }

    pub fn steps(&self) -> &[Step] {
        self.store.steps()
    }

    pub fn is_active(&self) -> bool {
        self.store.is_active()
    }

    /// `None` iff the tour is inactive.
    pub fn current_index(&self) -> Option<usize> {
        self.store.current_index()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.store.current_step()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn router(&self) -> &RouteBridge {
        &self.router
    }

    /// The composite storage key progress is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Whether the current step is on screen (as opposed to waiting).
    pub fn is_shown(&self) -> bool {
        matches!(self.phase, Phase::Shown(_))
    }

    /// The current step's resolved target, once shown.
    pub fn current_target(&self) -> Option<ElementHandle> {
        match &self.phase {
            Phase::Shown(shown) => shown.target,
            _ => None,
        }
    }

    /// Earliest time the host should call [`on_tick`](Self::on_tick).
    pub fn next_wake(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Routing { race, .. } => race.next_deadline(),
            Phase::Resolving { pending, .. } => pending.next_deadline(),
            Phase::Idle | Phase::Shown(_) => None,
        }
    }

    // -----------------------------------------------------------------------
    // Control API
    // -----------------------------------------------------------------------

    /// Start at `id`, or at the first step. Unknown ids are ignored.
    pub fn start(&mut self, id: Option<&str>) {
        let index = match id {
            Some(id) => match self.store.index_of(id) {
                Some(index) => index,
                None => {
                    tracing::warn!(target: "orbit.runtime", id, "start: unknown step id");
                    return;
                }
            },
            None => 0,
        };
        self.go(index);
    }

    /// Advance, or complete the tour from the last step.
    pub fn next(&mut self) {
        let Some(index) = self.store.current_index() else {
            return;
        };
        if index + 1 < self.store.len() {
            self.go(index + 1);
        } else {
            self.finish(TourEvent::Completed);
        }
    }

    /// Go back one step. Does nothing on the first step.
    pub fn prev(&mut self) {
        match self.store.current_index() {
            Some(index) if index > 0 => self.go(index - 1),
            _ => {}
        }
    }

    /// Jump to `id`. Unknown ids are ignored.
    pub fn go_to(&mut self, id: &str) {
        match self.store.index_of(id) {
            Some(index) => self.go(index),
            None => tracing::warn!(target: "orbit.runtime", id, "go_to: unknown step id"),
        }
    }

    /// End an active tour as cancelled.
    pub fn stop(&mut self) {
        self.finish(TourEvent::Cancelled);
    }

    /// Alias of [`stop`](Self::stop) for the close control.
    pub fn close(&mut self) {
        self.stop();
    }

    /// Act on a control of the rendered UI. Ignored unless a step is shown.
    pub fn dispatch(&mut self, intent: TourIntent) {
        if !self.is_shown() {
            tracing::debug!(target: "orbit.runtime", ?intent, "no step shown; intent dropped");
            return;
        }
        match intent {
            TourIntent::Next => self.next(),
            TourIntent::Prev => self.prev(),
            TourIntent::Close => self.close(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Attach to the host: install history interception, subscribe to
    /// location changes and resume persisted progress.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.router.ensure_history_interception();
        let dirty = Rc::clone(&self.location_dirty);
        self.listener = Some(self.router.listen(move |_| dirty.set(true)));

        if self.resume_on_load && self.store.resume(self.storage.as_ref(), &self.storage_key) {
            tracing::debug!(
                target: "orbit.runtime",
                step = self.store.state().current_step_id.as_deref().unwrap_or_default(),
                "resuming tour"
            );
            self.persist();
            self.enter();
        }
    }

    /// Detach from the host, releasing every observer, frame request,
    /// pending wait and the focus trap. Progress is left as is.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.teardown_entry();
        self.dismiss();
        if let Some(id) = self.listener.take() {
            self.router.unlisten(id);
        }
        self.location_dirty.set(false);
        tracing::debug!(target: "orbit.runtime", "unmounted");
    }

    // -----------------------------------------------------------------------
    // Host entry points
    // -----------------------------------------------------------------------

    /// The host clock advanced (usually at [`next_wake`](Self::next_wake)).
    pub fn on_tick(&mut self) {
        if self.location_dirty.replace(false) {
            self.drive(Wake::Location);
        }
        self.drive(Wake::Tick);
    }

    /// The observed document subtree changed.
    pub fn on_dom_mutation(&mut self) {
        self.drive(Wake::Mutation);
    }

    /// The location changed (push, replace or pop).
    pub fn on_location_change(&mut self) {
        self.location_dirty.set(false);
        self.drive(Wake::Location);
        self.request_frame();
    }

    pub fn on_scroll(&mut self) {
        self.request_frame();
    }

    pub fn on_resize(&mut self) {
        self.request_frame();
    }

    /// The observed target changed size.
    pub fn on_target_resize(&mut self) {
        self.request_frame();
    }

    /// The host fired animation frame `id`.
    pub fn on_animation_frame(&mut self, id: FrameId) {
        if !self.frames.fire(id) {
            return;
        }
        if !self.focus.is_active() && self.is_shown() {
            if let Some(container) = self.presenter.container() {
                self.focus.activate(self.document.as_mut(), container);
            }
        }
        self.relayout();
    }

    /// Focus moved (`focusin`). Focus that escaped the shown UI is pulled
    /// back into the container.
    pub fn on_focus_in(&mut self) {
        if self.is_shown() && self.focus.pull_back(self.document.as_mut()) {
            tracing::trace!(target: "orbit.runtime", "focus pulled back into tour UI");
        }
    }

    /// Capture-phase click guard.
    ///
    /// Events inside the tour UI pass. Events inside the target pass, except
    /// a click on a click-to-advance step, which is consumed and advances.
    /// Everything else is suppressed while the tour is active.
    pub fn on_pointer(&mut self, event: &PointerEvent) -> Disposition {
        if !self.store.is_active() {
            return Disposition::Pass;
        }
        let inside_ui = self.is_shown()
            && self
                .presenter
                .container()
                .is_some_and(|container| self.document.contains(container, event.target));
        if inside_ui {
            return Disposition::Pass;
        }

        let inside_target = self
            .current_target()
            .is_some_and(|target| self.document.contains(target, event.target));
        if !inside_target {
            return Disposition::Suppress;
        }
        let advances = self.store.current_step().is_some_and(Step::advances_on_click);
        if event.kind == PointerKind::Click && advances {
            tracing::debug!(target: "orbit.runtime", "target clicked; advancing");
            self.next();
            return Disposition::Suppress;
        }
        Disposition::Pass
    }

    /// Keyboard handling: focus trap first, then keybinds.
    pub fn on_key(&mut self, key: &KeyEvent) -> Disposition {
        if !self.store.is_active() {
            return Disposition::Pass;
        }
        if key.is_tab() {
            return self.focus.handle_tab(self.document.as_mut(), key.shift());
        }
        let editing = self
            .document
            .active_element()
            .is_some_and(|el| self.document.is_editable(el));
        if editing {
            return Disposition::Pass;
        }
        let Some(config) = self.current_config() else {
            return Disposition::Pass;
        };
        let nav = &config.navigation;
        if nav.next_keys.iter().any(|k| *k == key.key) {
            self.next();
            Disposition::Suppress
        } else if nav.prev_keys.iter().any(|k| *k == key.key) {
            self.prev();
            Disposition::Suppress
        } else if key.is_escape() && nav.esc_to_close {
            self.close();
            Disposition::Suppress
        } else {
            Disposition::Pass
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn current_config(&self) -> Option<EffectiveConfig> {
        match &self.phase {
            Phase::Shown(shown) => Some(shown.config.clone()),
            _ => self.store.current_step().map(|step| merge(&self.options, step)),
        }
    }

    fn persist(&mut self) {
        self.store.persist(self.storage.as_mut(), &self.storage_key);
    }

    fn go(&mut self, index: usize) {
        let Some(id) = self.store.activate_at(index) else {
            return;
        };
        tracing::debug!(target: "orbit.runtime", step = %id, index, "step activated");
        self.persist();
        self.enter();
    }

    fn finish(&mut self, event: TourEvent) {
        if !self.store.deactivate() {
            return;
        }
        self.persist();
        self.teardown_entry();
        self.dismiss();
        tracing::debug!(target: "orbit.runtime", event = ?event, "tour finished");
        self.presenter.notify(&event);
    }

    /// Cancel the in-flight entry and release everything it holds.
    fn teardown_entry(&mut self) {
        if let Some(source) = self.entry.take() {
            source.cancel();
        }
        let now = self.clock.now_mono();
        let mut cx = WaitCx {
            document: self.document.as_mut(),
            router: &self.router,
            now,
        };
        match mem::take(&mut self.phase) {
            Phase::Idle => {}
            Phase::Routing { mut race, .. } => race.cancel(&mut cx),
            Phase::Resolving { mut pending, .. } => pending.cancel(&mut cx),
            Phase::Shown(shown) => {
                if let Some(watch) = shown.resize_watch {
                    cx.document.unobserve_resize(watch);
                }
            }
        }
        self.frames.cancel(self.document.as_mut());
    }

    /// Enter the current step. A previous step's UI never outlives an entry
    /// that has to wait.
    fn enter(&mut self) {
        self.enter_step();
        if !self.is_shown() {
            self.dismiss();
        }
    }

    fn enter_step(&mut self) {
        self.teardown_entry();
        let Some(index) = self.store.current_index() else {
            return;
        };
        self.generation += 1;
        let source = CancellationSource::new(self.generation);
        let token = source.token();
        self.entry = Some(source);

        let route = self.store.get(index).and_then(|step| step.route.clone());
        if let Some(route) = route {
            if !self.router.matches(&route) {
                match route.concrete_path() {
                    Some(path) => {
                        self.router.push(path);
                    }
                    None => {
                        tracing::debug!(target: "orbit.runtime", index, "pattern route does not match; waiting");
                    }
                }
            }
            if !self.router.matches(&route) {
                let now = self.clock.now_mono();
                let mut race = Race::new(token.clone())
                    .with(RouteMatch::new(route))
                    .with(Deadline::new(now + ROUTE_AWAIT_CEILING, false));
                let status = {
                    let mut cx = WaitCx {
                        document: self.document.as_mut(),
                        router: &self.router,
                        now,
                    };
                    race.start(&mut cx)
                };
                match status {
                    RaceStatus::Pending => {
                        self.phase = Phase::Routing { index, race };
                        return;
                    }
                    RaceStatus::Settled { value, .. } => self.route_settled(index, value),
                    RaceStatus::Cancelled => return,
                }
            }
        }
        self.begin_resolve(index, token);
    }

    fn route_settled(&self, index: usize, matched: bool) {
        if !matched {
            tracing::warn!(
                target: "orbit.runtime",
                index,
                path = %self.router.get_path(),
                ceiling_ms = ROUTE_AWAIT_CEILING.as_millis() as u64,
                "route did not become current; resolving anyway"
            );
        }
    }

    fn begin_resolve(&mut self, index: usize, token: CancellationToken) {
        let Some(step) = self.store.get(index).cloned() else {
            return;
        };
        let config = merge(&self.options, &step);
        let now = self.clock.now_mono();
        let resolution = {
            let mut cx = WaitCx {
                document: self.document.as_mut(),
                router: &self.router,
                now,
            };
            resolve(&mut cx, &step, &config.wait, token)
        };
        match resolution {
            Resolution::Ready(target) => self.resolved(index, target, false),
            Resolution::Pending(pending) => {
                self.phase = Phase::Resolving {
                    index,
                    pending,
                    fallback: false,
                };
            }
        }
    }

    fn resolved(&mut self, index: usize, target: Option<ElementHandle>, after_fallback: bool) {
        let Some(step) = self.store.get(index).cloned() else {
            return;
        };
        let targeted = !candidate_selectors(&step).is_empty();
        if target.is_none() && targeted && !after_fallback {
            let behavior = step.missing_behavior();
            tracing::debug!(target: "orbit.runtime", step = %step.id, ?behavior, "target missing");
            self.presenter.notify(&TourEvent::TargetMissing {
                id: step.id.clone(),
                behavior,
            });
            match behavior {
                MissingBehavior::Skip => {
                    self.next();
                    return;
                }
                MissingBehavior::FallbackSelector => {
                    let selector = step
                        .on_missing
                        .as_ref()
                        .and_then(|m| m.fallback_selector.clone())
                        .filter(|s| !s.is_empty());
                    if let (Some(selector), Some(token)) = (selector, self.entry_token()) {
                        self.begin_fallback(index, &step, &selector, token);
                        return;
                    }
                }
                MissingBehavior::Halt => {}
            }
        }
        self.show(index, target);
    }

    fn begin_fallback(&mut self, index: usize, step: &Step, selector: &str, token: CancellationToken) {
        let config = merge(&self.options, step);
        let now = self.clock.now_mono();
        let resolution = {
            let mut cx = WaitCx {
                document: self.document.as_mut(),
                router: &self.router,
                now,
            };
            resolve_by_selector(&mut cx, selector, &config.wait, token)
        };
        match resolution {
            Resolution::Ready(target) => self.resolved(index, target, true),
            Resolution::Pending(pending) => {
                self.phase = Phase::Resolving {
                    index,
                    pending,
                    fallback: true,
                };
            }
        }
    }

    /// Take the step UI down and give focus back.
    fn dismiss(&mut self) {
        self.focus.release(self.document.as_mut());
        if mem::take(&mut self.presented) {
            self.presenter.clear();
        }
    }

    fn entry_token(&self) -> Option<CancellationToken> {
        self.entry
            .as_ref()
            .filter(|source| !source.is_cancelled())
            .map(CancellationSource::token)
    }

    fn show(&mut self, index: usize, target: Option<ElementHandle>) {
        let Some(step) = self.store.get(index).cloned() else {
            return;
        };
        let config = merge(&self.options, &step);
        let mode = ViewMode::select(config.modal.enabled, target.is_some());
        let view = StepView::build(
            &step,
            index,
            self.store.len(),
            mode,
            target,
            config.clone(),
            self.translator.as_ref(),
        );
        self.presenter.render(&view);
        self.presented = true;

        let resize_watch = target.map(|el| self.document.observe_resize(el));
        if let Some(container) = self.presenter.container() {
            self.focus.activate(self.document.as_mut(), container);
        }
        self.phase = Phase::Shown(Shown {
            target,
            config,
            mode,
            resize_watch,
        });
        self.relayout();
        self.frames.request(self.document.as_mut());

        tracing::debug!(target: "orbit.runtime", step = %step.id, index, ?mode, "step shown");
        self.presenter.notify(&TourEvent::StepShown { id: step.id, index });
    }

    fn request_frame(&mut self) {
        if self.is_shown() {
            self.frames.request(self.document.as_mut());
        }
    }

    /// Measure and push fresh overlay geometry.
    fn relayout(&mut self) {
        let Phase::Shown(shown) = &self.phase else {
            return;
        };
        let target_rect = shown.target.and_then(|el| self.document.bounding_rect(el));
        let container = self
            .presenter
            .container()
            .and_then(|el| self.document.bounding_rect(el))
            .map(|rect| rect.size())
            .unwrap_or(Size::new(shown.config.tooltip.width, 0.0));
        let layout = compute_layout(
            shown.mode,
            target_rect,
            container,
            self.document.viewport(),
            &shown.config,
        );
        self.presenter.layout(&layout);
    }

    /// Forward a wake to the pending wait, if any.
    fn drive(&mut self, wake: Wake) {
        let now = self.clock.now_mono();
        match mem::take(&mut self.phase) {
            Phase::Routing { index, mut race } => {
                let status = {
                    let mut cx = WaitCx {
                        document: self.document.as_mut(),
                        router: &self.router,
                        now,
                    };
                    race.poll(&mut cx, wake)
                };
                match status {
                    RaceStatus::Pending => self.phase = Phase::Routing { index, race },
                    RaceStatus::Settled { value, .. } => {
                        self.route_settled(index, value);
                        let token = race.token().clone();
                        self.begin_resolve(index, token);
                    }
                    RaceStatus::Cancelled => {}
                }
            }
            Phase::Resolving {
                index,
                mut pending,
                fallback,
            } => {
                let status = {
                    let mut cx = WaitCx {
                        document: self.document.as_mut(),
                        router: &self.router,
                        now,
                    };
                    pending.poll(&mut cx, wake)
                };
                match status {
                    RaceStatus::Pending => {
                        self.phase = Phase::Resolving {
                            index,
                            pending,
                            fallback,
                        };
                    }
                    RaceStatus::Settled { value, .. } => self.resolved(index, value, fallback),
                    RaceStatus::Cancelled => {}
                }
            }
            other => self.phase = other,
        }
    }
}

impl fmt::Debug for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tour")
            .field("state", self.store.state())
            .field("phase", &self.phase.name())
            .field("generation", &self.generation)
            .field("mounted", &self.mounted)
            .field("storage_key", &self.storage_key)
            .finish()
    }
}
