// SPDX-License-Identifier: MIT
//! Cooperative cancellation for in-flight waits.
//!
//! Every step entry gets a fresh [`CancellationSource`] stamped with the
//! engine's step generation. Route awaits and target resolutions hold a
//! [`CancellationToken`]; when the step changes, the old source is
//! cancelled and any wait still holding its token tears down without
//! yielding a value.
//!
//! # Example
//!
//! ```
//! use orbit_runtime::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new(7);
//! let token = source.token();
//! assert_eq!(token.generation(), 7);
//!
//! source.cancel();
//! assert!(token.is_cancelled());
//! ```

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable cancellation signal tied to one step generation.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationInner>,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does **not** cancel the token; call
/// [`cancel`](Self::cancel) explicitly.
pub struct CancellationSource {
    inner: Arc<CancellationInner>,
}

struct CancellationInner {
    cancelled: AtomicBool,
    generation: u64,
}

impl CancellationSource {
    /// Create a source for step generation `generation`.
    pub fn new(generation: u64) -> Self {
        Self {
            inner: Arc::new(CancellationInner {
                cancelled: AtomicBool::new(false),
                generation,
            }),
        }
    }

    /// Obtain a cloneable token that observes this source's state.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Signal cancellation to every token derived from this source.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation
    }
}

impl std::fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSource")
            .field("generation", &self.inner.generation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    /// Returns `true` if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Step generation this token belongs to.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Whether this token is still live for `generation`.
    #[inline]
    pub fn is_current(&self, generation: u64) -> bool {
        !self.is_cancelled() && self.inner.generation == generation
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("generation", &self.inner.generation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_uncancelled() {
        let source = CancellationSource::new(1);
        let token = source.token();
        assert!(!token.is_cancelled());
        assert!(!source.is_cancelled());
    }

    #[test]
    fn cancel_propagates_to_all_clones() {
        let source = CancellationSource::new(1);
        let t1 = source.token();
        let t2 = t1.clone();
        let t3 = source.token();
        source.cancel();
        assert!(t1.is_cancelled());
        assert!(t2.is_cancelled());
        assert!(t3.is_cancelled());
    }

    #[test]
    fn drop_source_does_not_cancel() {
        let source = CancellationSource::new(1);
        let token = source.token();
        drop(source);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let source = CancellationSource::new(1);
        let token = source.token();
        source.cancel();
        source.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn generation_check() {
        let source = CancellationSource::new(3);
        let token = source.token();
        assert!(token.is_current(3));
        assert!(!token.is_current(4));
        source.cancel();
        assert!(!token.is_current(3));
    }
}
