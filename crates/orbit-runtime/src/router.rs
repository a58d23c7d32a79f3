#![forbid(unsafe_code)]

//! Route bridge over the host history stack.
//!
//! [`RouteBridge`] is a cheap-to-clone handle shared by the tour and anyone
//! else who wants location updates. Pushes, replaces and back/forward
//! navigation all funnel into one `locationchange` channel; every listener
//! sees the path as it is *after* the navigation.
//!
//! # Interception
//!
//! Wrapping the history entry points is a process-wide side effect, so
//! [`RouteBridge::ensure_history_interception`] installs it at most once per
//! process no matter how many bridges or tours exist. After that, the host
//! reports navigation it observes with [`notify_push`](RouteBridge::notify_push),
//! [`notify_replace`](RouteBridge::notify_replace) and
//! [`notify_pop`](RouteBridge::notify_pop).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use orbit_core::step::RoutePattern;

use crate::host::History;
use crate::race::{Wake, WaitCx, WaitStrategy};

/// Path reported when the host has no navigation context.
pub const ROOT_PATH: &str = "/";

static HISTORY_INTERCEPTED: AtomicBool = AtomicBool::new(false);

/// Whether any bridge in this process has installed history interception.
pub fn is_history_intercepted() -> bool {
    HISTORY_INTERCEPTED.load(Ordering::Acquire)
}

/// Handle returned by [`RouteBridge::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// What kind of navigation produced a `locationchange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    Push,
    Replace,
    Pop,
}

impl NavigationKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
            Self::Pop => "pop",
        }
    }
}

type Listener = Box<dyn FnMut(&str)>;

struct BridgeInner {
    history: Box<dyn History>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    emitting: bool,
    removed_while_emitting: Vec<ListenerId>,
}

/// Shared route bridge.
#[derive(Clone)]
pub struct RouteBridge {
    inner: Rc<RefCell<BridgeInner>>,
}

impl RouteBridge {
    pub fn new(history: impl History + 'static) -> Self {
        Self::from_boxed(Box::new(history))
    }

    pub fn from_boxed(history: Box<dyn History>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BridgeInner {
                history,
                listeners: Vec::new(),
                next_listener: 0,
                emitting: false,
                removed_while_emitting: Vec::new(),
            })),
        }
    }

    /// Current path, `/` without a navigation context.
    pub fn get_path(&self) -> String {
        self.inner
            .borrow()
            .history
            .path()
            .unwrap_or_else(|| ROOT_PATH.to_owned())
    }

    /// Whether `route` matches the current path.
    pub fn matches(&self, route: &RoutePattern) -> bool {
        route.matches(&self.get_path())
    }

    /// Navigate to `path`.
    ///
    /// Does nothing for an empty path or the current path. Returns whether
    /// a navigation happened.
    pub fn push(&self, path: &str) -> bool {
        if path.is_empty() || path == self.get_path() {
            return false;
        }
        self.inner.borrow_mut().history.push_state(path);
        tracing::debug!(target: "orbit.router", path, "push");
        self.emit(NavigationKind::Push);
        true
    }

    /// Replace the current entry with `path`.
    pub fn replace(&self, path: &str) {
        if path.is_empty() {
            return;
        }
        self.inner.borrow_mut().history.replace_state(path);
        self.emit(NavigationKind::Replace);
    }

    /// Subscribe to `locationchange`.
    pub fn listen(&self, callback: impl FnMut(&str) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Box::new(callback)));
        id
    }

    pub fn unlisten(&self, id: ListenerId) {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        if inner.listeners.len() == before && inner.emitting {
            inner.removed_while_emitting.push(id);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Install history interception once per process.
    ///
    /// Returns `true` only for the call that performed the installation.
    pub fn ensure_history_interception(&self) -> bool {
        if HISTORY_INTERCEPTED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.inner.borrow_mut().history.intercept();
        tracing::debug!(target: "orbit.router", "history interception installed");
        true
    }

    /// The host observed a `pushState`.
    pub fn notify_push(&self) {
        self.emit(NavigationKind::Push);
    }

    /// The host observed a `replaceState`.
    pub fn notify_replace(&self) {
        self.emit(NavigationKind::Replace);
    }

    /// The host observed a `popstate` (back/forward).
    pub fn notify_pop(&self) {
        self.emit(NavigationKind::Pop);
    }

    fn emit(&self, kind: NavigationKind) {
        let path = self.get_path();
        tracing::trace!(target: "orbit.router", kind = kind.as_str(), path = %path, "locationchange");

        // Listeners may call back into the bridge, so run them unborrowed.
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.emitting = true;
            std::mem::take(&mut inner.listeners)
        };
        for (_, callback) in &mut listeners {
            callback(&path);
        }

        let mut inner = self.inner.borrow_mut();
        inner.emitting = false;
        let removed = std::mem::take(&mut inner.removed_while_emitting);
        listeners.retain(|(id, _)| !removed.contains(id));
        listeners.append(&mut inner.listeners);
        inner.listeners = listeners;
    }
}

impl fmt::Debug for RouteBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBridge")
            .field("path", &self.get_path())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Settles with `true` once `route` matches the current path.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: RoutePattern,
}

impl RouteMatch {
    pub fn new(route: RoutePattern) -> Self {
        Self { route }
    }
}

impl WaitStrategy<bool> for RouteMatch {
    fn name(&self) -> &'static str {
        "route-match"
    }

    fn poll(&mut self, cx: &mut WaitCx<'_>, wake: Wake) -> Option<bool> {
        match wake {
            Wake::Arm | Wake::Location | Wake::Tick => cx.router.matches(&self.route).then_some(true),
            Wake::Mutation => None,
        }
    }
}
