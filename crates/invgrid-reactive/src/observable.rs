#![forbid(unsafe_code)]

//! Observable value cells.
//!
//! [`Observable<T>`] is a cheap, clonable handle to a shared cell. A cell is
//! either a *root* (created with [`Observable::new`] or
//! [`Observable::constant`]) or *derived* from other cells through the
//! combinators in [`crate::derive`], [`crate::combine`] and
//! [`crate::flatten`].
//!
//! # Invariants
//!
//! 1. Version increments exactly once per write that changes the value.
//! 2. Setting a value equal to the current value is a no-op (no version
//!    bump, no notifications).
//! 3. Observers are notified in registration order, after every derived
//!    cell affected by the same write has settled.
//! 4. Writes to constants and read-only derived cells fail with
//!    [`ReactiveError::UnsupportedWrite`]; the value is left unchanged.
//! 5. Two handles compare equal iff they refer to the same cell.
//!
//! # Failure Modes
//!
//! - **Write from inside [`with`](Observable::with)**: the closure borrows the
//!   cell value; writing to the same cell from inside it panics with a
//!   `RefCell` borrow error. Writes from observers are safe (they are queued).

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{ReactiveError, Result};
use crate::node::{Access, Node};
use crate::registry::{Callback, ObserverKey, owner_addr};
use crate::runtime;

const CONSTANT_WRITE: &str = "cell was created as a constant";
const DERIVED_WRITE: &str = "derived cell has no write-back transform";

/// A shared, version-tracked reactive cell.
///
/// Cloning an `Observable` creates a new handle to the **same** cell.
pub struct Observable<T> {
    pub(crate) node: Rc<Node<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field("version", &self.version())
            .field("mutable", &self.is_mutable())
            .finish()
    }
}

impl<T> PartialEq for Observable<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<T> Eq for Observable<T> {}

impl<T> Hash for Observable<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.node), state);
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a read-write cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            node: Node::root(value, Access::Writable),
        }
    }

    /// Create a read-only cell that always holds `value`.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            node: Node::root(value, Access::Constant),
        }
    }

    pub(crate) fn from_node(node: Rc<Node<T>>) -> Self {
        Self { node }
    }

    /// Current value. Derived cells recompute first if a source changed.
    #[must_use]
    pub fn get(&self) -> T {
        self.node.get()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.node.with(f)
    }

    /// Store `value` and propagate.
    ///
    /// Equal values are ignored. Called from inside an observer, compute
    /// function or effect, the write is queued and applied after the current
    /// propagation settles.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnsupportedWrite`] if the cell is a constant or a
    /// derived cell without a write-back transform.
    pub fn set(&self, value: T) -> Result<()> {
        match &self.node.access {
            Access::Writable => {
                let node = Rc::clone(&self.node);
                runtime::write(move || node.store(value));
                Ok(())
            }
            Access::WriteBack(write_back) => write_back(value),
            Access::Constant => Err(ReactiveError::unsupported_write(CONSTANT_WRITE)),
            Access::ReadOnly => Err(ReactiveError::unsupported_write(DERIVED_WRITE)),
        }
    }

    /// Modify the value in place through a clone, then [`set`](Self::set) it.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<()> {
        let mut value = self.get();
        f(&mut value);
        self.set(value)
    }

    /// Whether [`set`](Self::set) can succeed on this cell.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        matches!(self.node.access, Access::Writable | Access::WriteBack(_))
    }

    /// Number of value changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.node.version()
    }

    /// Whether `self` and `other` refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Subscribe `callback` to value changes.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped. The subscription also keeps this cell alive, so subscribing
    /// to a temporary derived cell works as expected.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        self.node.observers.subscribe(&callback);
        Subscription {
            _callback: Box::new(callback),
            _cell: Rc::clone(&self.node) as Rc<dyn Any>,
        }
    }

    /// Register `observer` on behalf of `owner` without keeping `owner` alive.
    ///
    /// The observer receives the owner and the new value. Once the last
    /// strong reference to `owner` is dropped the registration becomes inert
    /// and is purged on the next notification.
    ///
    /// A derived cell observed this way stays alive as long as the owner
    /// does, so observing a temporary `map` result keeps working.
    pub fn observe_weak<O: ?Sized + 'static>(
        &self,
        owner: &Rc<O>,
        observer: impl Fn(&O, &T) + 'static,
    ) -> ObserverKey {
        let key = self.node.observers.observe_weak(owner, observer);
        if self.node.is_derived() {
            let weak_owner = Rc::downgrade(owner);
            runtime::anchor(
                key,
                Box::new(move || weak_owner.strong_count() > 0),
                Rc::clone(&self.node) as Rc<dyn Any>,
            );
        }
        key
    }

    /// Remove one registration made by `owner`. Returns whether it existed.
    pub fn unobserve_weak<O: ?Sized>(&self, owner: &Rc<O>, key: ObserverKey) -> bool {
        let removed = self.node.observers.remove_key(owner_addr(owner), key);
        if removed {
            runtime::unanchor(&[key]);
        }
        removed
    }

    /// Remove every registration made by `owner`. Returns how many existed.
    pub fn unobserve_owner<O: ?Sized>(&self, owner: &Rc<O>) -> usize {
        let keys = self.node.observers.remove_owner(owner_addr(owner));
        runtime::unanchor(&keys);
        keys.len()
    }

    /// Number of live observers of both kinds.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.node.observers.len()
    }
}

/// RAII guard for a callback registered with [`Observable::subscribe`].
///
/// Dropping the guard unregisters the callback before the next notification.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
    _cell: Rc<dyn Any>,
}

impl Subscription {
    /// Unsubscribe now. Same as dropping the guard.
    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn get_set_roundtrip() {
        let cell = Observable::new(1);
        cell.set(2).expect("writable");
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn equal_set_is_noop() {
        let cell = Observable::new(7);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = cell.subscribe(move |_| counter.set(counter.get() + 1));

        cell.set(7).expect("writable");
        assert_eq!(calls.get(), 0);
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn subscribers_notified_in_order() {
        let cell = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let log = Rc::clone(&log);
                cell.subscribe(move |v| log.borrow_mut().push((i, *v)))
            })
            .collect();

        cell.set(5).expect("writable");
        assert_eq!(*log.borrow(), vec![(0, 5), (1, 5), (2, 5)]);
        drop(subs);
    }

    #[test]
    fn dropped_subscription_is_silent() {
        let cell = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let sub = cell.subscribe(move |_| counter.set(counter.get() + 1));

        cell.set(1).expect("writable");
        sub.unsubscribe();
        cell.set(2).expect("writable");
        assert_eq!(calls.get(), 1);
        assert_eq!(cell.observer_count(), 0);
    }

    #[test]
    fn constant_rejects_writes() {
        let cell = Observable::constant("fixed".to_string());
        let err = cell.set("other".into()).expect_err("constant");
        assert!(err.is_unsupported_write());
        assert_eq!(cell.get(), "fixed");
        assert!(!cell.is_mutable());
    }

    #[test]
    fn update_modifies_in_place() {
        let cell = Observable::new(vec![1, 2]);
        cell.update(|v| v.push(3)).expect("writable");
        assert_eq!(cell.get(), vec![1, 2, 3]);
    }

    #[test]
    fn identity_equality() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn subscription_keeps_cell_alive() {
        let root = Observable::new(1);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = root.map(|v| v * 3).subscribe(move |v| sink.set(*v));

        root.set(2).expect("writable");
        assert_eq!(seen.get(), 6);
    }

    #[test]
    fn observe_weak_receives_owner() {
        struct Counter {
            total: Cell<i32>,
        }
        let cell = Observable::new(0);
        let owner = Rc::new(Counter {
            total: Cell::new(0),
        });
        cell.observe_weak(&owner, |c: &Counter, v: &i32| c.total.set(c.total.get() + v));

        cell.set(3).expect("writable");
        cell.set(4).expect("writable");
        assert_eq!(owner.total.get(), 7);
    }

    #[test]
    fn weak_observer_anchors_derived_cell_until_removed() {
        let root = Observable::new(1);
        let owner = Rc::new(Cell::new(0));
        let before = runtime::anchor_count();
        let derived = root.map(|v| v + 1);
        let key = derived.observe_weak(&owner, |o: &Cell<i32>, v: &i32| o.set(*v));
        assert_eq!(runtime::anchor_count(), before + 1);

        assert!(derived.unobserve_weak(&owner, key));
        assert_eq!(runtime::anchor_count(), before);

        derived.observe_weak(&owner, |o: &Cell<i32>, v: &i32| o.set(*v));
        assert_eq!(derived.unobserve_owner(&owner), 1);
        assert_eq!(runtime::anchor_count(), before);
    }

    #[test]
    fn root_cells_are_not_anchored() {
        let root = Observable::new(1);
        let owner = Rc::new(Cell::new(0));
        let before = runtime::anchor_count();
        root.observe_weak(&owner, |o: &Cell<i32>, v: &i32| o.set(*v));
        assert_eq!(runtime::anchor_count(), before);
    }

    #[test]
    fn unobserve_weak_by_key() {
        let cell = Observable::new(0);
        let owner = Rc::new(Cell::new(0));
        let key = cell.observe_weak(&owner, |o: &Cell<i32>, v: &i32| o.set(*v));

        assert!(cell.unobserve_weak(&owner, key));
        assert!(!cell.unobserve_weak(&owner, key));
        cell.set(9).expect("writable");
        assert_eq!(owner.get(), 0);
    }
}
