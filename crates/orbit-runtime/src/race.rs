#![forbid(unsafe_code)]

//! Race combinator for host-driven waits.
//!
//! A [`Race`] runs several [`WaitStrategy`]s against the same goal (a target
//! element appearing, a route becoming current). The host drives it: every
//! `Tour::on_*` entry point forwards a [`Wake`] reason, and the first
//! strategy to produce a value wins.
//!
//! # Invariants
//!
//! 1. **Single settle**: a race yields at most one value.
//! 2. **Full teardown**: when any strategy wins, or the race is cancelled,
//!    every strategy's `teardown` runs exactly once.
//! 3. **Silent cancel**: a cancelled race never yields a value, even if a
//!    strategy would have matched on the same wake.

use std::fmt;

use web_time::Duration;

use crate::cancellation::CancellationToken;
use crate::host::Document;
use crate::router::RouteBridge;

/// Why a race is being polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wake {
    /// First poll, right after arming.
    Arm,
    /// The host clock advanced.
    Tick,
    /// The observed document subtree changed.
    Mutation,
    /// The location changed.
    Location,
}

/// Host access shared by all strategies during one poll.
pub struct WaitCx<'a> {
    pub document: &'a mut dyn Document,
    pub router: &'a RouteBridge,
    pub now: Duration,
}

/// One way of waiting for a `T`.
pub trait WaitStrategy<T> {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Acquire host resources (observers, timers).
    fn arm(&mut self, _cx: &mut WaitCx<'_>) {}

    /// Check for a result.
    fn poll(&mut self, cx: &mut WaitCx<'_>, wake: Wake) -> Option<T>;

    /// Earliest time this strategy wants a `Tick`.
    fn next_deadline(&self) -> Option<Duration> {
        None
    }

    /// Release host resources. Must be idempotent.
    fn teardown(&mut self, _cx: &mut WaitCx<'_>) {}
}

/// Outcome of polling a [`Race`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceStatus<T> {
    Pending,
    Settled { value: T, winner: &'static str },
    /// The token was cancelled or the race already finished.
    Cancelled,
}

/// First-to-settle combinator over boxed strategies.
pub struct Race<T> {
    strategies: Vec<Box<dyn WaitStrategy<T>>>,
    token: CancellationToken,
    armed: bool,
    finished: bool,
}

impl<T> Race<T> {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            strategies: Vec::new(),
            token,
            armed: false,
            finished: false,
        }
    }

    /// Add a strategy. Earlier strategies win ties on the same wake.
    #[must_use]
    pub fn with(mut self, strategy: impl WaitStrategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Arm every strategy and poll once with [`Wake::Arm`].
    pub fn start(&mut self, cx: &mut WaitCx<'_>) -> RaceStatus<T> {
        if !self.armed && !self.finished {
            self.armed = true;
            for strategy in &mut self.strategies {
                strategy.arm(cx);
            }
        }
        self.poll(cx, Wake::Arm)
    }

    pub fn poll(&mut self, cx: &mut WaitCx<'_>, wake: Wake) -> RaceStatus<T> {
        if self.finished {
            return RaceStatus::Cancelled;
        }
        if self.token.is_cancelled() {
            self.teardown(cx);
            return RaceStatus::Cancelled;
        }
        let mut settled = None;
        for strategy in &mut self.strategies {
            if let Some(value) = strategy.poll(cx, wake) {
                settled = Some((value, strategy.name()));
                break;
            }
        }
        match settled {
            Some((value, winner)) => {
                self.teardown(cx);
                RaceStatus::Settled { value, winner }
            }
            None => RaceStatus::Pending,
        }
    }

    /// Tear down without yielding.
    pub fn cancel(&mut self, cx: &mut WaitCx<'_>) {
        self.teardown(cx);
    }

    /// Earliest deadline among live strategies.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.finished {
            return None;
        }
        self.strategies
            .iter()
            .filter_map(|s| s.next_deadline())
            .min()
    }

    fn teardown(&mut self, cx: &mut WaitCx<'_>) {
        if self.finished {
            return;
        }
        self.finished = true;
        for strategy in &mut self.strategies {
            strategy.teardown(cx);
        }
    }
}

impl<T> fmt::Debug for Race<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Race")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("generation", &self.token.generation())
            .field("finished", &self.finished)
            .finish()
    }
}

/// Settles with a fixed value once the clock reaches `at`.
#[derive(Debug, Clone)]
pub struct Deadline<T> {
    at: Duration,
    value: T,
}

impl<T> Deadline<T> {
    pub fn new(at: Duration, value: T) -> Self {
        Self { at, value }
    }

    pub fn at(&self) -> Duration {
        self.at
    }
}

impl<T: Clone> WaitStrategy<T> for Deadline<T> {
    fn name(&self) -> &'static str {
        "deadline"
    }

    fn poll(&mut self, cx: &mut WaitCx<'_>, _wake: Wake) -> Option<T> {
        (cx.now >= self.at).then(|| self.value.clone())
    }

    fn next_deadline(&self) -> Option<Duration> {
        Some(self.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationSource;
    use crate::test_support::{StubDocument, StubHistory};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Settles on the n-th poll; counts teardowns.
    struct Countdown {
        left: u32,
        teardowns: Rc<Cell<u32>>,
    }

    impl WaitStrategy<&'static str> for Countdown {
        fn name(&self) -> &'static str {
            "countdown"
        }

        fn poll(&mut self, _cx: &mut WaitCx<'_>, _wake: Wake) -> Option<&'static str> {
            if self.left == 0 {
                return Some("done");
            }
            self.left -= 1;
            None
        }

        fn teardown(&mut self, _cx: &mut WaitCx<'_>) {
            self.teardowns.set(self.teardowns.get() + 1);
        }
    }

    fn fixture() -> (StubDocument, RouteBridge) {
        (StubDocument::default(), RouteBridge::new(StubHistory::at("/")))
    }

    #[test]
    fn first_to_settle_wins_and_everything_tears_down() {
        let (mut doc, router) = fixture();
        let teardowns = Rc::new(Cell::new(0));
        let source = CancellationSource::new(1);
        let mut race = Race::new(source.token())
            .with(Countdown {
                left: 2,
                teardowns: teardowns.clone(),
            })
            .with(Deadline::new(Duration::from_millis(100), "timeout"));

        let mut cx = WaitCx {
            document: &mut doc,
            router: &router,
            now: Duration::ZERO,
        };
        assert_eq!(race.start(&mut cx), RaceStatus::Pending);
        assert_eq!(race.next_deadline(), Some(Duration::from_millis(100)));
        assert_eq!(race.poll(&mut cx, Wake::Tick), RaceStatus::Pending);
        assert_eq!(
            race.poll(&mut cx, Wake::Tick),
            RaceStatus::Settled {
                value: "done",
                winner: "countdown"
            }
        );
        assert_eq!(teardowns.get(), 1);
        assert_eq!(race.poll(&mut cx, Wake::Tick), RaceStatus::Cancelled);
        assert_eq!(race.next_deadline(), None);
        assert_eq!(teardowns.get(), 1);
    }

    #[test]
    fn deadline_settles_with_its_value() {
        let (mut doc, router) = fixture();
        let source = CancellationSource::new(1);
        let mut race = Race::new(source.token())
            .with(Countdown {
                left: u32::MAX,
                teardowns: Rc::default(),
            })
            .with(Deadline::new(Duration::from_millis(50), "timeout"));
        let mut cx = WaitCx {
            document: &mut doc,
            router: &router,
            now: Duration::from_millis(49),
        };
        assert_eq!(race.start(&mut cx), RaceStatus::Pending);
        cx.now = Duration::from_millis(50);
        assert_eq!(
            race.poll(&mut cx, Wake::Tick),
            RaceStatus::Settled {
                value: "timeout",
                winner: "deadline"
            }
        );
    }

    #[test]
    fn cancelled_race_never_yields() {
        let (mut doc, router) = fixture();
        let teardowns = Rc::new(Cell::new(0));
        let source = CancellationSource::new(1);
        let mut race = Race::new(source.token()).with(Countdown {
            left: 0,
            teardowns: teardowns.clone(),
        });
        source.cancel();
        let mut cx = WaitCx {
            document: &mut doc,
            router: &router,
            now: Duration::ZERO,
        };
        assert_eq!(race.start(&mut cx), RaceStatus::Cancelled);
        assert_eq!(teardowns.get(), 1);
        race.cancel(&mut cx);
        assert_eq!(teardowns.get(), 1);
    }
}
