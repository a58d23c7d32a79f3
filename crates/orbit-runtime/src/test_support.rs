//! Minimal host doubles for unit tests.
//!
//! Integration tests use `orbit-web`'s headless host instead; these stubs
//! only exist so in-crate tests do not depend on a crate that depends on us.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use orbit_core::event::ElementHandle;
use orbit_core::geometry::{Rect, Size};
use orbit_widgets::FocusHost;

use crate::host::{Document, FrameId, History, ScrollBehavior, WatchId};

#[derive(Debug, Default)]
pub(crate) struct StubDocument {
    pub selectors: HashMap<String, ElementHandle>,
    pub rects: HashMap<ElementHandle, Rect>,
    pub viewport: Size,
    pub reduced_motion: bool,
    pub scrolls: Vec<(ElementHandle, ScrollBehavior)>,
    pub mutation_watches: BTreeSet<WatchId>,
    pub resize_watches: BTreeSet<WatchId>,
    pub frames: BTreeSet<FrameId>,
    pub active: Option<ElementHandle>,
    next_id: u64,
}

impl StubDocument {
    pub fn with_viewport(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, selector: &str, element: ElementHandle, rect: Rect) {
        self.selectors.insert(selector.to_owned(), element);
        self.rects.insert(element, rect);
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FocusHost for StubDocument {
    fn active_element(&self) -> Option<ElementHandle> {
        self.active
    }

    fn focus(&mut self, element: ElementHandle) {
        self.active = Some(element);
    }

    fn focusable_within(&self, _container: ElementHandle) -> Vec<ElementHandle> {
        Vec::new()
    }

    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool {
        ancestor == node
    }
}

impl Document for StubDocument {
    fn query_selector(&self, selector: &str) -> Option<ElementHandle> {
        self.selectors.get(selector).copied()
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect> {
        self.rects.get(&element).copied()
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_into_view(&mut self, element: ElementHandle, behavior: ScrollBehavior) {
        self.scrolls.push((element, behavior));
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn is_editable(&self, _element: ElementHandle) -> bool {
        false
    }

    fn observe_mutations(&mut self) -> WatchId {
        let id = WatchId(self.next());
        self.mutation_watches.insert(id);
        id
    }

    fn disconnect_mutations(&mut self, id: WatchId) {
        self.mutation_watches.remove(&id);
    }

    fn observe_resize(&mut self, _element: ElementHandle) -> WatchId {
        let id = WatchId(self.next());
        self.resize_watches.insert(id);
        id
    }

    fn unobserve_resize(&mut self, id: WatchId) {
        self.resize_watches.remove(&id);
    }

    fn request_animation_frame(&mut self) -> FrameId {
        let id = FrameId(self.next());
        self.frames.insert(id);
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        self.frames.remove(&id);
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    path: Option<String>,
    pushes: Vec<String>,
}

/// Shared-state history; clones observe the same stack.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubHistory {
    state: Rc<RefCell<HistoryState>>,
}

impl StubHistory {
    pub fn at(path: &str) -> Self {
        let history = Self::default();
        history.set_path(path);
        history
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_path(&self, path: &str) {
        self.state.borrow_mut().path = Some(path.to_owned());
    }

    pub fn pushes(&self) -> Vec<String> {
        self.state.borrow().pushes.clone()
    }
}

impl History for StubHistory {
    fn path(&self) -> Option<String> {
        self.state.borrow().path.clone()
    }

    fn push_state(&mut self, path: &str) {
        let mut state = self.state.borrow_mut();
        state.path = Some(path.to_owned());
        state.pushes.push(path.to_owned());
    }

    fn replace_state(&mut self, path: &str) {
        self.state.borrow_mut().path = Some(path.to_owned());
    }

    fn intercept(&mut self) {}
}
