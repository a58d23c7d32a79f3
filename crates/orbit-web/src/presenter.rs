#![forbid(unsafe_code)]

//! Presenter that records what the engine asked it to show.

use std::cell::RefCell;
use std::rc::Rc;

use orbit_core::event::ElementHandle;
use orbit_runtime::host::Presenter;
use orbit_runtime::layout::OverlayLayout;
use orbit_runtime::tour::{StepView, TourEvent};

/// Captured presenter output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PresenterLog {
    pub views: Vec<StepView>,
    pub layouts: Vec<OverlayLayout>,
    pub events: Vec<TourEvent>,
    pub clears: usize,
}

#[derive(Debug, Default)]
struct PresenterInner {
    log: PresenterLog,
    container: Option<ElementHandle>,
    mounted: bool,
}

/// Shared recording presenter.
///
/// Reports its container element only while mounted, that is between a
/// `render` and the next `clear`.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    inner: Rc<RefCell<PresenterInner>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `container` as the mounted UI root.
    #[must_use]
    pub fn with_container(self, container: ElementHandle) -> Self {
        self.inner.borrow_mut().container = Some(container);
        self
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    pub fn log(&self) -> PresenterLog {
        self.inner.borrow().log.clone()
    }

    /// Take the captured output, leaving an empty log.
    pub fn take_log(&self) -> PresenterLog {
        std::mem::take(&mut self.inner.borrow_mut().log)
    }

    pub fn last_view(&self) -> Option<StepView> {
        self.inner.borrow().log.views.last().cloned()
    }

    pub fn last_layout(&self) -> Option<OverlayLayout> {
        self.inner.borrow().log.layouts.last().cloned()
    }

    pub fn events(&self) -> Vec<TourEvent> {
        self.inner.borrow().log.events.clone()
    }

    /// Ids of rendered steps, oldest first.
    pub fn shown_ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .log
            .views
            .iter()
            .map(|v| v.step_id.clone())
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, view: &StepView) {
        let mut inner = self.inner.borrow_mut();
        inner.mounted = true;
        inner.log.views.push(view.clone());
    }

    fn layout(&mut self, layout: &OverlayLayout) {
        self.inner.borrow_mut().log.layouts.push(layout.clone());
    }

    fn clear(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.mounted = false;
        inner.log.clears += 1;
    }

    fn container(&self) -> Option<ElementHandle> {
        let inner = self.inner.borrow();
        inner.container.filter(|_| inner.mounted)
    }

    fn notify(&mut self, event: &TourEvent) {
        self.inner.borrow_mut().log.events.push(event.clone());
    }
}
