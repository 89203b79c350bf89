#![forbid(unsafe_code)]

//! Lifecycle helpers built on subscriptions.
//!
//! - [`BindingScope`] collects the [`Subscription`]s of one logical owner
//!   (usually a component). Dropping or clearing the scope releases all of
//!   them, which is the deterministic counterpart of weak observation.
//! - [`TwoWayBinding`] keeps two read-write cells in sync.
//!
//! # Invariants
//!
//! 1. After a scope is dropped or cleared, none of its callbacks fire again.
//! 2. `binding_count` always equals the number of held subscriptions.
//! 3. A two-way binding never loops. Writes from callbacks are queued, so
//!    the echo of a change reaches its origin as a separate write, and that
//!    write carries the value the origin already holds, which is a no-op.
//! 4. Dropping a `TwoWayBinding` disconnects both directions.

use crate::error::{ReactiveError, Result};
use crate::observable::{Observable, Subscription};

// ---------------------------------------------------------------------------
// BindingScope
// ---------------------------------------------------------------------------

/// Holds subscriptions for a logical scope and releases them together.
///
/// Subscriptions are released in registration order on drop.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `subscription` alive until the scope is dropped or cleared.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Subscribe to `source` for the lifetime of this scope.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let subscription = source.subscribe(callback);
        self.subscriptions.push(subscription);
        self
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every subscription now. The scope stays usable.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TwoWayBinding
// ---------------------------------------------------------------------------

/// Keeps two read-write cells equal.
///
/// On creation `b` takes `a`'s value. Afterwards a change to either side is
/// written to the other. Drop the binding to disconnect.
pub struct TwoWayBinding<T: Clone + PartialEq + 'static> {
    _a_to_b: Subscription,
    _b_to_a: Subscription,
    a: Observable<T>,
    b: Observable<T>,
}

impl<T: Clone + PartialEq + 'static> TwoWayBinding<T> {
    /// Bind `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnsupportedWrite`] if either cell is read-only.
    pub fn new(a: &Observable<T>, b: &Observable<T>) -> Result<Self> {
        if !a.is_mutable() || !b.is_mutable() {
            return Err(ReactiveError::unsupported_write(
                "two-way binding needs two read-write cells",
            ));
        }
        b.set(a.get())?;

        let a_to_b = Self::forward(a, b);
        let b_to_a = Self::forward(b, a);

        Ok(Self {
            _a_to_b: a_to_b,
            _b_to_a: b_to_a,
            a: a.clone(),
            b: b.clone(),
        })
    }

    fn forward(from: &Observable<T>, to: &Observable<T>) -> Subscription {
        let target = to.clone();
        from.subscribe(move |value| {
            if let Err(error) = target.set(value.clone()) {
                tracing::warn!(message = "binding.sync_failed", %error);
            }
        })
    }

    /// The two bound cells.
    #[must_use]
    pub fn cells(&self) -> (&Observable<T>, &Observable<T>) {
        (&self.a, &self.b)
    }
}

impl<T: Clone + PartialEq + 'static> std::fmt::Debug for TwoWayBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoWayBinding").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn two_way_initial_sync() {
        let a = Observable::new(42);
        let b = Observable::new(0);
        let _binding = TwoWayBinding::new(&a, &b).expect("both writable");
        assert_eq!(b.get(), 42);
    }

    #[test]
    fn two_way_a_to_b() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        let _binding = TwoWayBinding::new(&a, &b).expect("both writable");
        a.set(10).expect("writable");
        assert_eq!(b.get(), 10);
    }

    #[test]
    fn two_way_b_to_a() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        let _binding = TwoWayBinding::new(&a, &b).expect("both writable");
        b.set(20).expect("writable");
        assert_eq!(a.get(), 20);
    }

    #[test]
    fn two_way_no_cycle() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let _binding = TwoWayBinding::new(&a, &b).expect("both writable");

        let a_changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&a_changes);
        let _sub = a.subscribe(move |_| counter.set(counter.get() + 1));

        a.set(5).expect("writable");
        assert_eq!(a_changes.get(), 1);
        assert_eq!(a.version(), 1);
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn two_way_settles_when_an_observer_rewrites() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let _binding = TwoWayBinding::new(&a, &b).expect("both writable");

        // Values above 10 are capped on `b`; the cap travels back to `a`.
        let cap = b.clone();
        let _sub = b.subscribe(move |v| {
            if *v > 10 {
                cap.set(10).expect("writable");
            }
        });

        a.set(50).expect("writable");
        assert_eq!((a.get(), b.get()), (10, 10));
        assert!(!crate::is_flushing());
    }

    #[test]
    fn two_way_drop_disconnects() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        let binding = TwoWayBinding::new(&a, &b).expect("both writable");
        drop(binding);

        a.set(99).expect("writable");
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn two_way_rejects_read_only() {
        let a = Observable::new(1);
        let b = a.map(|v| v + 1);
        assert!(TwoWayBinding::new(&a, &b).is_err());
    }

    #[test]
    fn scope_holds_subscriptions() {
        let obs = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut scope = BindingScope::new();
        let log = Rc::clone(&seen);
        scope.subscribe(&obs, move |v| log.borrow_mut().push(*v));
        assert_eq!(scope.binding_count(), 1);

        obs.set(1).expect("writable");
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn scope_drop_releases_subscriptions() {
        let obs = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let c1 = Rc::clone(&calls);
            let c2 = Rc::clone(&calls);
            scope
                .subscribe(&obs, move |_| c1.set(c1.get() + 1))
                .subscribe(&obs, move |_| c2.set(c2.get() + 1));
            obs.set(1).expect("writable");
            assert_eq!(calls.get(), 2);
        }
        obs.set(2).expect("writable");
        assert_eq!(calls.get(), 2);
        assert_eq!(obs.observer_count(), 0);
    }

    #[test]
    fn scope_reusable_after_clear() {
        let obs = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        let mut scope = BindingScope::new();
        let c1 = Rc::clone(&calls);
        scope.subscribe(&obs, move |_| c1.set(c1.get() + 1));
        scope.clear();
        assert!(scope.is_empty());

        obs.set(1).expect("writable");
        assert_eq!(calls.get(), 0);

        let c2 = Rc::clone(&calls);
        scope.hold(obs.subscribe(move |_| c2.set(c2.get() + 1)));
        obs.set(2).expect("writable");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn scope_debug_format() {
        let scope = BindingScope::new();
        assert_eq!(format!("{scope:?}"), "BindingScope { binding_count: 0 }");
    }
}
