#![forbid(unsafe_code)]

//! Animation-frame coalescing.
//!
//! Scroll, resize and target-resize storms all want the overlay re-measured.
//! [`FrameCoalescer`] keeps at most one animation frame outstanding; extra
//! requests before it fires are absorbed.

use crate::host::{Document, FrameId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCoalescer {
    pending: Option<FrameId>,
    absorbed: u64,
}

impl FrameCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a frame unless one is already outstanding.
    ///
    /// Returns `true` if a new frame was requested from the host.
    pub fn request(&mut self, document: &mut dyn Document) -> bool {
        if self.pending.is_some() {
            self.absorbed += 1;
            return false;
        }
        self.pending = Some(document.request_animation_frame());
        true
    }

    /// The host fired frame `id`. Returns whether it was ours.
    pub fn fire(&mut self, id: FrameId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Cancel the outstanding frame, if any.
    pub fn cancel(&mut self, document: &mut dyn Document) {
        if let Some(id) = self.pending.take() {
            document.cancel_animation_frame(id);
        }
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    /// Requests absorbed into an already pending frame.
    pub fn absorbed(&self) -> u64 {
        self.absorbed
    }
}
