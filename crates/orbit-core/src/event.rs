#![forbid(unsafe_code)]

//! Canonical host handles and input events.
//!
//! The engine never touches real DOM nodes. The host hands out opaque
//! [`ElementHandle`]s and reports pointer/keyboard input through the types
//! below; the engine answers with a [`Disposition`] telling the host whether
//! to let the native event continue.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Opaque reference to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Opaque reference to a host-rendered content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Pointer event flavor intercepted by the click guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    PointerDown,
    MouseDown,
    Click,
}

/// A pointer event in the capture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// The innermost element under the pointer.
    pub target: ElementHandle,
}

impl PointerEvent {
    #[must_use]
    pub const fn click(target: ElementHandle) -> Self {
        Self {
            kind: PointerKind::Click,
            target,
        }
    }

    #[must_use]
    pub const fn new(kind: PointerKind, target: ElementHandle) -> Self {
        Self { kind, target }
    }
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

/// A keydown event.
///
/// `key` carries the DOM `KeyboardEvent.key` value (`"ArrowRight"`,
/// `"Escape"`, `"Tab"`, `"n"`), which is also the vocabulary of configured
/// keybinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[inline]
    pub fn is_tab(&self) -> bool {
        self.key == "Tab"
    }

    #[inline]
    pub fn is_escape(&self) -> bool {
        self.key == "Escape" || self.key == "Esc"
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// What the host should do with the native event after the engine saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Let the event continue normally.
    #[default]
    Pass,
    /// Call `preventDefault()` and `stopPropagation()`.
    Suppress,
}

impl Disposition {
    #[inline]
    pub const fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppress)
    }
}
