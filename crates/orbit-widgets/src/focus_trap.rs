#![forbid(unsafe_code)]

//! Focus trapping for the tour UI container.
//!
//! While a step is shown, keyboard focus stays inside the mounted tooltip or
//! modal surface.
//!
//! # Invariants
//!
//! 1. **Auto-focus**: activating the trap moves focus to the container.
//! 2. **Wrap**: Tab on the last focusable wraps to the first, Shift+Tab on
//!    the first wraps to the last.
//! 3. **Pull back**: focus found outside the container is moved back in.
//! 4. **Restore**: releasing the trap returns focus to whatever held it
//!    before activation.
//!
//! # Failure Modes
//!
//! - A container with no focusable descendants keeps focus on itself.
//! - If the element to restore has been removed, the host decides what
//!   `focus` does with a stale handle; the trap does not retry.

use orbit_core::{Disposition, ElementHandle};

/// The slice of the host document the trap needs.
pub trait FocusHost {
    /// The currently focused element, if any.
    fn active_element(&self) -> Option<ElementHandle>;

    /// Move focus to `element`.
    fn focus(&mut self, element: ElementHandle);

    /// Tabbable descendants of `container`, in tab order.
    fn focusable_within(&self, container: ElementHandle) -> Vec<ElementHandle>;

    /// Inclusive containment: `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool;
}

/// Focus trap bound to one container at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTrap {
    container: Option<ElementHandle>,
    restore: Option<ElementHandle>,
}

impl FocusTrap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.container.is_some()
    }

    #[inline]
    pub fn container(&self) -> Option<ElementHandle> {
        self.container
    }

    /// The element that will receive focus on release.
    #[inline]
    pub fn restore_target(&self) -> Option<ElementHandle> {
        self.restore
    }

    /// Trap focus inside `container`.
    ///
    /// Re-activating with a new container (the UI remounted between steps)
    /// keeps the original restore target.
    pub fn activate<H: FocusHost + ?Sized>(&mut self, host: &mut H, container: ElementHandle) {
        if self.container == Some(container) {
            return;
        }
        if self.container.is_none() {
            self.restore = host
                .active_element()
                .filter(|el| !host.contains(container, *el));
        }
        self.container = Some(container);
        host.focus(container);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "orbit.focus",
            container = container.0,
            restore = ?self.restore.map(|el| el.0),
            "focus trap activated"
        );
    }

    /// Handle a Tab (or Shift+Tab) key press.
    ///
    /// Returns [`Disposition::Suppress`] when the trap moved focus itself
    /// and the host must cancel its default tab navigation.
    pub fn handle_tab<H: FocusHost + ?Sized>(&mut self, host: &mut H, shift: bool) -> Disposition {
        let Some(container) = self.container else {
            return Disposition::Pass;
        };
        let focusables = host.focusable_within(container);
        let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
            host.focus(container);
            return Disposition::Suppress;
        };

        let active = host.active_element();
        let inside = active.is_some_and(|el| host.contains(container, el));
        let target = match active {
            _ if !inside => Some(if shift { last } else { first }),
            Some(el) if shift && (el == first || el == container) => Some(last),
            Some(el) if !shift && el == last => Some(first),
            _ => None,
        };

        match target {
            Some(el) => {
                host.focus(el);
                Disposition::Suppress
            }
            None => Disposition::Pass,
        }
    }

    /// Pull focus back into the container if it escaped.
    ///
    /// Returns `true` when focus was moved.
    pub fn pull_back<H: FocusHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let Some(container) = self.container else {
            return false;
        };
        if host
            .active_element()
            .is_some_and(|el| host.contains(container, el))
        {
            return false;
        }
        let first = host
            .focusable_within(container)
            .first()
            .copied()
            .unwrap_or(container);
        host.focus(first);
        true
    }

    /// Release the trap and restore the previous focus.
    pub fn release<H: FocusHost + ?Sized>(&mut self, host: &mut H) {
        if self.container.take().is_none() {
            return;
        }
        if let Some(previous) = self.restore.take() {
            host.focus(previous);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(target: "orbit.focus", "focus trap released");
    }
}
