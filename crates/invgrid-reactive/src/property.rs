#![forbid(unsafe_code)]

//! Uniform read/write access to a cell for component setters.
//!
//! A [`Property<T>`] wraps exactly one [`Observable<T>`]. Components accept
//! properties for every reactive input (background, frozen flag, page index,
//! content and so on), so a literal value and a shared cell can be passed
//! through the same path.
//!
//! # Invariants
//!
//! 1. `set` on a property wrapping a read-only cell fails with
//!    [`ReactiveError::UnsupportedWrite`] and never drops the write silently.
//! 2. Two properties wrapping the same cell compare equal and hash equally.
//! 3. [`observable`](Property::observable) returns the wrapped cell itself,
//!    not a copy.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{ReactiveError, Result};
use crate::observable::{Observable, Subscription};
use crate::registry::ObserverKey;

const NON_MUTABLE_SOURCE: &str = "property is backed by a non-mutable source";

/// A read/write view of a cell.
pub struct Property<T> {
    cell: Observable<T>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.hash(state);
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .field("mutable", &self.is_mutable())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> From<Observable<T>> for Property<T> {
    fn from(cell: Observable<T>) -> Self {
        Self { cell }
    }
}

impl<T: Clone + PartialEq + 'static> From<&Observable<T>> for Property<T> {
    fn from(cell: &Observable<T>) -> Self {
        Self { cell: cell.clone() }
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Wrap `value` in a fresh read-write cell.
    #[must_use]
    pub fn of(value: T) -> Self {
        Self {
            cell: Observable::new(value),
        }
    }

    /// Wrap `value` in a fresh constant cell.
    #[must_use]
    pub fn constant(value: T) -> Self {
        Self {
            cell: Observable::constant(value),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.cell.with(f)
    }

    /// Write through to the wrapped cell.
    ///
    /// # Errors
    ///
    /// [`ReactiveError::UnsupportedWrite`] if the wrapped cell is read-only.
    pub fn set(&self, value: T) -> Result<()> {
        if !self.cell.is_mutable() {
            return Err(ReactiveError::unsupported_write(NON_MUTABLE_SOURCE));
        }
        self.cell.set(value)
    }

    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.cell.is_mutable()
    }

    /// The wrapped cell.
    #[must_use]
    pub fn observable(&self) -> &Observable<T> {
        &self.cell
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }

    /// See [`Observable::observe_weak`].
    pub fn observe_weak<O: ?Sized + 'static>(
        &self,
        owner: &Rc<O>,
        observer: impl Fn(&O, &T) + 'static,
    ) -> ObserverKey {
        self.cell.observe_weak(owner, observer)
    }

    pub fn unobserve_weak<O: ?Sized>(&self, owner: &Rc<O>, key: ObserverKey) -> bool {
        self.cell.unobserve_weak(owner, key)
    }

    pub fn unobserve_owner<O: ?Sized>(&self, owner: &Rc<O>) -> usize {
        self.cell.unobserve_owner(owner)
    }
}
