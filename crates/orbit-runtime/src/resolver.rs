#![forbid(unsafe_code)]

//! Target resolution.
//!
//! A step names its target through up to three fields, expanded into an
//! ordered list of candidate selectors:
//!
//! 1. the explicit `selector`;
//! 2. the data key `k`: `[data-tour="k"]`, `[data-datatour="k"]`,
//!    `[data-tutorial="k"]`, `#k`, `.k` (the last two CSS-escaped);
//! 3. the `className` as `.className`.
//!
//! The first candidate that matches wins. If nothing matches right away, a
//! [`Race`] of a mutation watch, an interval poll and a deadline is armed
//! and driven by host wakes. A step with no candidates is untargeted and
//! resolves to nothing immediately.
//!
//! On success the element is scrolled to the viewport center when it is not
//! fully visible (only if `wait.scroll`), instantly under reduced motion.

use std::rc::Rc;

use orbit_core::config::WaitConfig;
use orbit_core::event::ElementHandle;
use orbit_core::step::Step;
use web_time::Duration;

use crate::cancellation::CancellationToken;
use crate::host::{Document, ScrollBehavior, WatchId};
use crate::race::{Deadline, Race, RaceStatus, WaitCx, WaitStrategy, Wake};

/// Expand a step's target fields into candidate selectors, in priority order.
pub fn candidate_selectors(step: &Step) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(selector) = step.selector.as_deref().filter(|s| !s.is_empty()) {
        out.push(selector.to_owned());
    }
    if let Some(key) = step.data_tour_key.as_deref().filter(|s| !s.is_empty()) {
        let escaped = css_escape(key);
        out.push(format!("[data-tour=\"{key}\"]"));
        out.push(format!("[data-datatour=\"{key}\"]"));
        out.push(format!("[data-tutorial=\"{key}\"]"));
        out.push(format!("#{escaped}"));
        out.push(format!(".{escaped}"));
    }
    if let Some(class) = step.class_name.as_deref().filter(|s| !s.is_empty()) {
        out.push(format!(".{class}"));
    }
    out
}

/// Escape `ident` for use as a CSS identifier (`CSS.escape`).
pub fn css_escape(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());
    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code) || code == 0x7F || leading_digit {
            out.push_str(&format!("\\{code:x} "));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// First element matching any candidate, in order.
pub fn find_first(document: &dyn Document, candidates: &[String]) -> Option<ElementHandle> {
    candidates
        .iter()
        .find_map(|selector| document.query_selector(selector))
}

/// Scroll `element` to the viewport center unless it is already fully visible.
///
/// Returns whether a scroll was requested.
pub fn ensure_in_view(document: &mut dyn Document, element: ElementHandle) -> bool {
    let viewport = document.viewport();
    let visible = document
        .bounding_rect(element)
        .is_some_and(|rect| rect.is_fully_within(viewport));
    if visible {
        return false;
    }
    let behavior = if document.prefers_reduced_motion() {
        ScrollBehavior::Instant
    } else {
        ScrollBehavior::Smooth
    };
    document.scroll_into_view(element, behavior);
    true
}

/// Result of starting a resolution.
#[derive(Debug)]
pub enum Resolution {
    /// Settled synchronously: found on the fast path, or untargeted.
    Ready(Option<ElementHandle>),
    /// Waiting on host wakes.
    Pending(PendingTarget),
}

/// An in-flight resolution.
#[derive(Debug)]
pub struct PendingTarget {
    race: Race<Option<ElementHandle>>,
    scroll: bool,
    started_at: Duration,
}

impl PendingTarget {
    /// Drive the race. A settled element is scrolled into view before it
    /// is returned.
    pub fn poll(&mut self, cx: &mut WaitCx<'_>, wake: Wake) -> RaceStatus<Option<ElementHandle>> {
        let status = self.race.poll(cx, wake);
        if let RaceStatus::Settled { value, winner } = &status {
            tracing::debug!(
                target: "orbit.resolver",
                winner,
                found = value.is_some(),
                waited_ms = cx.now.saturating_sub(self.started_at).as_millis() as u64,
                "target wait settled"
            );
            if let (Some(element), true) = (value, self.scroll) {
                ensure_in_view(cx.document, *element);
            }
        }
        status
    }

    pub fn cancel(&mut self, cx: &mut WaitCx<'_>) {
        self.race.cancel(cx);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.race.next_deadline()
    }

    pub fn generation(&self) -> u64 {
        self.race.token().generation()
    }
}

/// Resolve the target of `step`.
pub fn resolve(
    cx: &mut WaitCx<'_>,
    step: &Step,
    wait: &WaitConfig,
    token: CancellationToken,
) -> Resolution {
    let candidates: Rc<[String]> = candidate_selectors(step).into();
    if candidates.is_empty() {
        return Resolution::Ready(None);
    }
    tracing::debug!(
        target: "orbit.resolver",
        step = %step.id,
        candidates = candidates.len(),
        "resolving target"
    );
    start(cx, candidates, wait, token, true)
}

/// Resolve a single selector by polling only (no mutation watch).
pub fn resolve_by_selector(
    cx: &mut WaitCx<'_>,
    selector: &str,
    wait: &WaitConfig,
    token: CancellationToken,
) -> Resolution {
    if selector.is_empty() {
        return Resolution::Ready(None);
    }
    let candidates: Rc<[String]> = vec![selector.to_owned()].into();
    start(cx, candidates, wait, token, false)
}

fn start(
    cx: &mut WaitCx<'_>,
    candidates: Rc<[String]>,
    wait: &WaitConfig,
    token: CancellationToken,
    watch_mutations: bool,
) -> Resolution {
    if let Some(element) = find_first(cx.document, &candidates) {
        if wait.scroll {
            ensure_in_view(cx.document, element);
        }
        return Resolution::Ready(Some(element));
    }

    let mut race = Race::new(token);
    if watch_mutations {
        race = race.with(MutationWatch::new(candidates.clone()));
    }
    race = race
        .with(IntervalPoll::new(candidates, wait.interval))
        .with(Deadline::new(cx.now + wait.timeout, None));

    let mut pending = PendingTarget {
        race,
        scroll: wait.scroll,
        started_at: cx.now,
    };
    match pending.race.start(cx) {
        RaceStatus::Pending => Resolution::Pending(pending),
        RaceStatus::Settled { value, .. } => {
            if let (Some(element), true) = (value, wait.scroll) {
                ensure_in_view(cx.document, element);
            }
            Resolution::Ready(value)
        }
        RaceStatus::Cancelled => Resolution::Ready(None),
    }
}

/// Re-checks candidates whenever the observed subtree changes.
#[derive(Debug)]
struct MutationWatch {
    candidates: Rc<[String]>,
    watch: Option<WatchId>,
}

impl MutationWatch {
    fn new(candidates: Rc<[String]>) -> Self {
        Self {
            candidates,
            watch: None,
        }
    }
}

impl WaitStrategy<Option<ElementHandle>> for MutationWatch {
    fn name(&self) -> &'static str {
        "mutation"
    }

    fn arm(&mut self, cx: &mut WaitCx<'_>) {
        self.watch = Some(cx.document.observe_mutations());
    }

    fn poll(&mut self, cx: &mut WaitCx<'_>, wake: Wake) -> Option<Option<ElementHandle>> {
        if wake != Wake::Mutation {
            return None;
        }
        find_first(cx.document, &self.candidates).map(Some)
    }

    fn teardown(&mut self, cx: &mut WaitCx<'_>) {
        if let Some(id) = self.watch.take() {
            cx.document.disconnect_mutations(id);
        }
    }
}

/// Re-checks candidates every `interval`.
#[derive(Debug)]
struct IntervalPoll {
    candidates: Rc<[String]>,
    interval: Duration,
    next_at: Duration,
}

impl IntervalPoll {
    fn new(candidates: Rc<[String]>, interval: Duration) -> Self {
        Self {
            candidates,
            interval: interval.max(Duration::from_millis(1)),
            next_at: Duration::ZERO,
        }
    }
}

impl WaitStrategy<Option<ElementHandle>> for IntervalPoll {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn arm(&mut self, cx: &mut WaitCx<'_>) {
        self.next_at = cx.now + self.interval;
    }

    fn poll(&mut self, cx: &mut WaitCx<'_>, _wake: Wake) -> Option<Option<ElementHandle>> {
        if cx.now < self.next_at {
            return None;
        }
        self.next_at = cx.now + self.interval;
        find_first(cx.document, &self.candidates).map(Some)
    }

    fn next_deadline(&self) -> Option<Duration> {
        Some(self.next_at)
    }
}
