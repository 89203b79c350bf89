#![forbid(unsafe_code)]

//! Single-source derived cells.
//!
//! [`Observable::map`] builds a read-only cell whose value is a pure function
//! of its source. [`Observable::map_bidirectional`] additionally accepts the
//! inverse transform; writes to the result are translated and forwarded to
//! the source, and the derived value follows from the source's propagation.
//!
//! # Invariants
//!
//! 1. After settling, `derived.get() == transform(&source.get())`.
//! 2. The derived cell notifies only when its recomputed value differs from
//!    the previous one.
//! 3. A derived cell holds its source strongly; the source holds the derived
//!    cell weakly. Dropping every handle to a derived cell stops its
//!    recomputation.

use std::rc::Rc;

use crate::error::Result;
use crate::node::{Access, Node};
use crate::observable::Observable;
use crate::runtime::AnyNode;

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Derive a read-only cell holding `transform(&self.get())`.
    ///
    /// Writing to the result fails with
    /// [`ReactiveError::UnsupportedWrite`](crate::ReactiveError::UnsupportedWrite).
    pub fn map<R>(&self, transform: impl Fn(&T) -> R + 'static) -> Observable<R>
    where
        R: Clone + PartialEq + 'static,
    {
        let initial = self.with(|value| transform(value));
        let source = self.clone();
        let compute = Box::new(move || source.with(|value| transform(value)));
        let upstream: &dyn AnyNode = &*self.node;
        Observable::from_node(Node::derive_from(
            initial,
            &[upstream],
            compute,
            Access::ReadOnly,
        ))
    }

    /// Derive a read-write cell holding `transform(&self.get())`.
    ///
    /// `set(v)` on the result writes `untransform(&v)` into `self`. If `self`
    /// is itself read-only the result is read-only too.
    pub fn map_bidirectional<R>(
        &self,
        transform: impl Fn(&T) -> R + 'static,
        untransform: impl Fn(&R) -> T + 'static,
    ) -> Observable<R>
    where
        R: Clone + PartialEq + 'static,
    {
        let initial = self.with(|value| transform(value));
        let source = self.clone();
        let compute = Box::new(move || source.with(|value| transform(value)));
        let access = if self.is_mutable() {
            let target = self.clone();
            Access::WriteBack(Box::new(move |value: R| -> Result<()> {
                target.set(untransform(&value))
            }))
        } else {
            Access::ReadOnly
        };
        let upstream: &dyn AnyNode = &*self.node;
        Observable::from_node(Node::derive_from(initial, &[upstream], compute, access))
    }
}

/// Number of live dependents registered on a cell's node; test helper.
#[cfg(test)]
pub(crate) fn dependent_count<T: Clone + PartialEq + 'static>(cell: &Observable<T>) -> usize {
    AnyNode::dependents(&*cell.node).len()
}
