#![forbid(unsafe_code)]

//! In-memory history stack.

use std::cell::RefCell;
use std::rc::Rc;

use orbit_runtime::host::History;

#[derive(Debug, Default)]
struct HistoryInner {
    path: Option<String>,
    pushes: Vec<String>,
    replaces: Vec<String>,
    intercepts: usize,
}

/// Shared history; clones observe the same stack.
///
/// [`set_path`](Self::set_path) simulates navigation the engine did not
/// perform (a link click, back/forward); the test must then report it to the
/// route bridge or the tour, as a browser's intercepted history would.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHistory {
    inner: Rc<RefCell<HistoryInner>>,
}

impl HeadlessHistory {
    pub fn at(path: impl Into<String>) -> Self {
        let history = Self::default();
        history.inner.borrow_mut().path = Some(path.into());
        history
    }

    /// A history with no navigation context (`path()` is `None`).
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_path(&self, path: impl Into<String>) {
        self.inner.borrow_mut().path = Some(path.into());
    }

    pub fn current(&self) -> Option<String> {
        self.inner.borrow().path.clone()
    }

    /// Paths pushed through [`History::push_state`], oldest first.
    pub fn pushes(&self) -> Vec<String> {
        self.inner.borrow().pushes.clone()
    }

    pub fn replaces(&self) -> Vec<String> {
        self.inner.borrow().replaces.clone()
    }

    /// How many times interception was installed on this stack.
    pub fn intercept_count(&self) -> usize {
        self.inner.borrow().intercepts
    }
}

impl History for HeadlessHistory {
    fn path(&self) -> Option<String> {
        self.inner.borrow().path.clone()
    }

    fn push_state(&mut self, path: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.path = Some(path.to_owned());
        inner.pushes.push(path.to_owned());

        #[cfg(feature = "tracing")]
        tracing::trace!(target: "orbit.web", path, "pushState");
    }

    fn replace_state(&mut self, path: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.path = Some(path.to_owned());
        inner.replaces.push(path.to_owned());
    }

    fn intercept(&mut self) {
        self.inner.borrow_mut().intercepts += 1;
    }
}
