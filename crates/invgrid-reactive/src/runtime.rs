#![forbid(unsafe_code)]

//! Thread-local propagation runtime.
//!
//! Every write to a root cell goes through [`write`]. Outside a flush the
//! write is applied immediately: the root stores its value, bumps its version
//! and invalidates every transitive dependent. A flush then settles the
//! touched cells and notifies them in ascending height order (roots first),
//! so observers never see a derived value computed from a half-updated graph.
//!
//! Writes issued while a flush is running are queued and applied one per
//! cycle after the current cycle settles. Effects registered with
//! [`schedule_effect`] run after the notification phase of a cycle.
//!
//! # Invariants
//!
//! 1. At most one flush runs per thread; nested flush requests return early.
//! 2. Each cycle settles every invalidated cell before any observer runs.
//! 3. A cell is notified at most once per version change.
//! 4. A flush processes at most `ReactiveConfig::max_flush_cycles` cycles.
//!
//! Derived cells watched by owner-scoped observers are anchored here. An
//! anchor holds the cell strongly until its owner is dropped or the
//! registration is removed; dead anchors are released when a flush starts
//! and when a new anchor is added.
//!
//! # Failure Modes
//!
//! - **Write storm**: a callback that keeps writing new values is cut off at
//!   the cycle bound. Remaining queued writes are dropped and an error event
//!   is logged.
//! - **Callback panic**: the flush guard resets the runtime so the next write
//!   starts from a clean state. Queued writes and effects are discarded.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::field::Empty;

use crate::config::ReactiveConfig;
use crate::registry::ObserverKey;

pub(crate) type NodeId = u64;

/// Type-erased view of a cell used by the scheduler.
pub(crate) trait AnyNode {
    fn id(&self) -> NodeId;
    fn height(&self) -> usize;
    /// Mark a derived cell stale. Returns `true` if it was clean before.
    fn invalidate(&self) -> bool;
    /// Recompute a stale derived cell.
    fn settle(&self);
    /// Deliver the current value if this version has not been delivered yet.
    fn notify(&self);
    fn set_height(&self, height: usize);
    fn dependents(&self) -> Vec<Rc<dyn AnyNode>>;
    fn add_dependent(&self, dependent: Weak<dyn AnyNode>);
    fn remove_dependent(&self, id: NodeId);
}

type Task = Box<dyn FnOnce()>;

/// Keeps a derived cell alive for one owner-scoped observer.
struct Anchor {
    key: ObserverKey,
    alive: Box<dyn Fn() -> bool>,
    _cell: Rc<dyn Any>,
}

struct Runtime {
    config: Cell<ReactiveConfig>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    touched: RefCell<Vec<Rc<dyn AnyNode>>>,
    writes: RefCell<VecDeque<Task>>,
    effects: RefCell<VecDeque<Task>>,
    anchors: RefCell<Vec<Anchor>>,
    next_id: Cell<u64>,
}

impl Runtime {
    fn new() -> Self {
        Self {
            config: Cell::new(ReactiveConfig::default()),
            batch_depth: Cell::new(0),
            flushing: Cell::new(false),
            touched: RefCell::new(Vec::new()),
            writes: RefCell::new(VecDeque::new()),
            effects: RefCell::new(VecDeque::new()),
            anchors: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    fn has_pending(&self) -> bool {
        !self.touched.borrow().is_empty()
            || !self.effects.borrow().is_empty()
            || !self.writes.borrow().is_empty()
    }
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

pub(crate) fn set_config(config: ReactiveConfig) {
    RUNTIME.with(|rt| rt.config.set(config));
}

pub(crate) fn config() -> ReactiveConfig {
    RUNTIME.with(|rt| rt.config.get())
}

pub(crate) fn next_id() -> u64 {
    RUNTIME.with(|rt| {
        let id = rt.next_id.get();
        rt.next_id.set(id + 1);
        id
    })
}

/// Whether a flush is currently running on this thread.
#[must_use]
pub fn is_flushing() -> bool {
    RUNTIME.with(|rt| rt.flushing.get())
}

/// Whether a [`BatchScope`] is open on this thread.
#[must_use]
pub fn in_batch() -> bool {
    RUNTIME.with(|rt| rt.batch_depth.get() > 0)
}

/// Apply a root write now, or queue it when a flush is running.
pub(crate) fn write(apply: impl FnOnce() + 'static) {
    if is_flushing() {
        RUNTIME.with(|rt| rt.writes.borrow_mut().push_back(Box::new(apply)));
        return;
    }
    apply();
    if !in_batch() {
        flush();
    }
}

/// Record that `root` changed and invalidate everything downstream of it.
pub(crate) fn record_write(root: Rc<dyn AnyNode>) {
    let mut invalidated = Vec::new();
    let mut stack = root.dependents();
    while let Some(node) = stack.pop() {
        if node.invalidate() {
            stack.extend(node.dependents());
            invalidated.push(node);
        }
    }
    RUNTIME.with(|rt| {
        let mut touched = rt.touched.borrow_mut();
        touched.push(root);
        touched.extend(invalidated);
    });
}

/// Raise the height of everything downstream of `node` so every dependent
/// stays above its sources.
pub(crate) fn lift_dependents(node: &dyn AnyNode) {
    let mut stack = vec![(node.height(), node.dependents())];
    while let Some((height, dependents)) = stack.pop() {
        for dependent in dependents {
            if dependent.height() <= height {
                dependent.set_height(height + 1);
                stack.push((height + 1, dependent.dependents()));
            }
        }
    }
}

/// Keep `cell` alive while the observer `key` is registered and `alive`
/// reports its owner as live.
pub(crate) fn anchor(key: ObserverKey, alive: Box<dyn Fn() -> bool>, cell: Rc<dyn Any>) {
    release_anchors(|anchor| !(anchor.alive)());
    RUNTIME.with(|rt| {
        rt.anchors.borrow_mut().push(Anchor {
            key,
            alive,
            _cell: cell,
        });
    });
}

/// Drop the anchors of the given observer registrations.
pub(crate) fn unanchor(keys: &[ObserverKey]) {
    if !keys.is_empty() {
        release_anchors(|anchor| keys.contains(&anchor.key));
    }
}

/// Number of live anchors on this thread.
#[cfg(test)]
pub(crate) fn anchor_count() -> usize {
    release_anchors(|anchor| !(anchor.alive)());
    RUNTIME.with(|rt| rt.anchors.borrow().len())
}

fn release_anchors(dead: impl Fn(&Anchor) -> bool) {
    // Released cells are dropped outside the borrow: dropping a cell may drop
    // observers that touch the runtime.
    let released: Vec<Anchor> = RUNTIME.with(|rt| {
        let mut anchors = rt.anchors.borrow_mut();
        let (released, kept): (Vec<Anchor>, Vec<Anchor>) = std::mem::take(&mut *anchors).into_iter().partition(&dead);
        *anchors = kept;
        released
    });
    drop(released);
}

/// Run `effect` once the current propagation has settled.
///
/// Outside a flush or batch the effect runs immediately. Inside, it runs
/// after the notification phase of the current cycle, in scheduling order.
pub fn schedule_effect(effect: impl FnOnce() + 'static) {
    if is_flushing() || in_batch() {
        RUNTIME.with(|rt| rt.effects.borrow_mut().push_back(Box::new(effect)));
    } else {
        effect();
    }
}

/// Run `f` inside a [`BatchScope`]; propagation happens once when it returns.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let _scope = BatchScope::new();
    f()
}

/// Defers propagation until the outermost scope is dropped.
///
/// Writes inside the scope update cell values immediately, so `get()` sees
/// them, but observers are notified once, after the last scope closes.
pub struct BatchScope {
    _not_send: PhantomData<Rc<()>>,
}

impl BatchScope {
    #[must_use]
    pub fn new() -> Self {
        RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let outermost = RUNTIME.with(|rt| {
            let depth = rt.batch_depth.get().saturating_sub(1);
            rt.batch_depth.set(depth);
            depth == 0 && !rt.flushing.get() && rt.has_pending()
        });
        if outermost && !std::thread::panicking() {
            flush();
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope").finish()
    }
}

struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.flushing.set(false);
            if std::thread::panicking() {
                rt.touched.borrow_mut().clear();
                rt.writes.borrow_mut().clear();
                rt.effects.borrow_mut().clear();
            }
        });
    }
}

fn flush() {
    let entered = RUNTIME.with(|rt| !rt.flushing.replace(true));
    if !entered {
        return;
    }
    let _guard = FlushGuard;
    release_anchors(|anchor| !(anchor.alive)());

    let span = tracing::debug_span!("reactive.flush", cycles = Empty);
    let _entered = span.enter();
    let max_cycles = config().max_flush_cycles;
    let mut cycles: u64 = 0;

    loop {
        cycles += 1;
        propagate();
        run_effects();

        let next = RUNTIME.with(|rt| rt.writes.borrow_mut().pop_front());
        let Some(write) = next else {
            break;
        };
        if cycles >= max_cycles as u64 {
            let dropped = RUNTIME.with(|rt| {
                let mut writes = rt.writes.borrow_mut();
                let dropped = writes.len() + 1;
                writes.clear();
                dropped
            });
            tracing::error!(message = "reactive.flush.overflow", cycles, dropped);
            break;
        }
        write();
    }

    span.record("cycles", cycles);
}

fn propagate() {
    let mut touched = RUNTIME.with(|rt| std::mem::take(&mut *rt.touched.borrow_mut()));
    if touched.is_empty() {
        return;
    }

    for node in &touched {
        node.settle();
    }

    // Heights may have moved while settling (flatten re-targets its inner cell).
    touched.sort_by_key(|node| node.height());
    let mut seen = HashSet::with_capacity(touched.len());
    for node in touched {
        if seen.insert(node.id()) {
            node.notify();
        }
    }
}

fn run_effects() {
    loop {
        let next = RUNTIME.with(|rt| rt.effects.borrow_mut().pop_front());
        match next {
            Some(effect) => effect(),
            None => break,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
