#![forbid(unsafe_code)]

//! Per-component bake scheduling.
//!
//! A [`BakeScheduler`] tracks whether a component's rendered slots match its
//! inputs. Input changes mark it dirty; a bake run recomputes the slots.
//!
//! # Invariants
//!
//! 1. Only the `Clean -> Dirty` transition asks the caller to schedule a run,
//!    so any number of input changes between two runs cost one bake.
//! 2. A change reported while `Baking` never recurses. It sets a follow-up
//!    flag and the running bake performs one more pass.
//! 3. A run performs at most `1 + max_rebakes` passes. If inputs keep
//!    changing the component stays `Dirty` and the run reports
//!    [`BakeOutcome::Deferred`].
//!
//! # Failure Modes
//!
//! - A panicking pass leaves the scheduler `Dirty`, so the next request bakes
//!   again instead of wedging in `Baking`.
//!
//! Deferred runs are queued per thread with [`defer`] and executed by
//! [`tick`]. Work that repeats every tick, like animation frames, registers
//! with [`every_tick`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::config;

/// Bake state of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BakeState {
    /// Rendered slots match the inputs.
    #[default]
    Clean,
    /// An input changed since the last bake.
    Dirty,
    /// A bake pass is running.
    Baking,
}

/// Result of [`BakeScheduler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeOutcome {
    /// The component was not dirty.
    Skipped,
    /// The component settled after `passes` passes.
    Clean { passes: usize },
    /// Inputs were still changing after `passes` passes.
    Deferred { passes: usize },
}

#[derive(Debug, Default)]
pub struct BakeScheduler {
    state: Cell<BakeState>,
    follow_up: Cell<bool>,
    total_passes: Cell<u64>,
}

impl BakeScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> BakeState {
        self.state.get()
    }

    /// Passes run over the scheduler's lifetime.
    #[must_use]
    pub fn total_passes(&self) -> u64 {
        self.total_passes.get()
    }

    /// Record an input change.
    ///
    /// Returns `true` if the component just became dirty and a run should be
    /// scheduled.
    pub fn mark_dirty(&self) -> bool {
        match self.state.get() {
            BakeState::Clean => {
                self.state.set(BakeState::Dirty);
                true
            }
            BakeState::Dirty => false,
            BakeState::Baking => {
                self.follow_up.set(true);
                false
            }
        }
    }

    /// Run bake passes until the inputs stop changing or the pass limit is
    /// reached.
    pub fn run(&self, mut pass: impl FnMut()) -> BakeOutcome {
        if self.state.get() != BakeState::Dirty {
            return BakeOutcome::Skipped;
        }
        let limit = config::config().max_rebakes.saturating_add(1);
        let mut passes = 0;
        loop {
            self.state.set(BakeState::Baking);
            self.follow_up.set(false);
            {
                let _guard = PassGuard(self);
                pass();
            }
            passes += 1;
            self.total_passes.set(self.total_passes.get() + 1);
            if !self.follow_up.get() {
                self.state.set(BakeState::Clean);
                return BakeOutcome::Clean { passes };
            }
            if passes >= limit {
                self.state.set(BakeState::Dirty);
                return BakeOutcome::Deferred { passes };
            }
        }
    }
}

struct PassGuard<'a>(&'a BakeScheduler);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.state.set(BakeState::Dirty);
            self.0.follow_up.set(false);
        }
    }
}

// ---------------------------------------------------------------------------
// Deferred queue
// ---------------------------------------------------------------------------

type Deferred = Box<dyn FnOnce()>;
type Ticker = Box<dyn FnMut() -> bool>;

thread_local! {
    static DEFERRED: RefCell<VecDeque<Deferred>> = RefCell::new(VecDeque::new());
    static TICKERS: RefCell<Vec<Ticker>> = RefCell::new(Vec::new());
}

/// Queue `job` for the next [`tick`].
pub(crate) fn defer(job: impl FnOnce() + 'static) {
    DEFERRED.with(|queue| queue.borrow_mut().push_back(Box::new(job)));
}

/// Number of jobs waiting for the next [`tick`].
#[must_use]
pub fn deferred_count() -> usize {
    DEFERRED.with(|queue| queue.borrow().len())
}

/// Run `ticker` on every [`tick`] until it returns `false`.
pub(crate) fn every_tick(ticker: impl FnMut() -> bool + 'static) {
    TICKERS.with(|tickers| tickers.borrow_mut().push(Box::new(ticker)));
}

/// Run the bakes deferred since the last tick, then advance running
/// animations. Returns how many deferred bakes ran.
///
/// The host calls this once per server tick. Jobs deferred while ticking
/// wait for the following tick; animations started while ticking get their
/// first frame on the following tick.
pub fn tick() -> usize {
    let jobs = DEFERRED.with(|queue| std::mem::take(&mut *queue.borrow_mut()));
    let count = jobs.len();
    for job in jobs {
        job();
    }

    let tickers = TICKERS.with(|tickers| std::mem::take(&mut *tickers.borrow_mut()));
    let mut kept = Vec::with_capacity(tickers.len());
    for mut ticker in tickers {
        if ticker() {
            kept.push(ticker);
        }
    }
    TICKERS.with(|tickers| {
        let mut tickers = tickers.borrow_mut();
        let added = std::mem::replace(&mut *tickers, kept);
        tickers.extend(added);
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BakeConfig, configure};

    #[test]
    fn only_first_dirty_schedules() {
        let s = BakeScheduler::new();
        assert!(s.mark_dirty());
        assert!(!s.mark_dirty());
        assert_eq!(s.state(), BakeState::Dirty);
    }

    #[test]
    fn clean_run_is_skipped() {
        let s = BakeScheduler::new();
        let mut calls = 0;
        assert_eq!(s.run(|| calls += 1), BakeOutcome::Skipped);
        assert_eq!(calls, 0);
    }

    #[test]
    fn dirtying_while_baking_coalesces_into_one_follow_up() {
        let s = BakeScheduler::new();
        s.mark_dirty();
        let mut calls = 0;
        let outcome = s.run(|| {
            calls += 1;
            if calls == 1 {
                assert!(!s.mark_dirty());
                assert!(!s.mark_dirty());
            }
        });
        assert_eq!(outcome, BakeOutcome::Clean { passes: 2 });
        assert_eq!(s.state(), BakeState::Clean);
        assert_eq!(s.total_passes(), 2);
    }

    #[test]
    fn endless_dirtying_is_deferred() {
        configure(BakeConfig::default().with_max_rebakes(3));
        let s = BakeScheduler::new();
        s.mark_dirty();
        let outcome = s.run(|| {
            s.mark_dirty();
        });
        configure(BakeConfig::default());
        assert_eq!(outcome, BakeOutcome::Deferred { passes: 4 });
        assert_eq!(s.state(), BakeState::Dirty);
        assert!(!s.mark_dirty());
    }

    #[test]
    fn panicking_pass_leaves_dirty() {
        let s = BakeScheduler::new();
        s.mark_dirty();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            s.run(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(s.state(), BakeState::Dirty);
    }

    #[test]
    fn tickers_run_until_they_stop() {
        let runs = std::rc::Rc::new(Cell::new(0));
        let r = std::rc::Rc::clone(&runs);
        every_tick(move || {
            r.set(r.get() + 1);
            r.get() < 3
        });
        for _ in 0..5 {
            assert_eq!(tick(), 0);
        }
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn tick_runs_deferred_jobs_once() {
        let hits = std::rc::Rc::new(Cell::new(0));
        let h = std::rc::Rc::clone(&hits);
        defer(move || h.set(h.get() + 1));
        assert_eq!(deferred_count(), 1);
        assert_eq!(tick(), 1);
        assert_eq!(tick(), 0);
        assert_eq!(hits.get(), 1);
    }
}
