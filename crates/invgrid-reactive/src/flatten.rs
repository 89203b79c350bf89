#![forbid(unsafe_code)]

//! Flattening a cell of cells.
//!
//! [`flatten`] follows whichever inner cell the outer cell currently points
//! to. When the outer cell switches to another inner cell, the flattened
//! cell detaches from the old one, attaches to the new one and takes its
//! value. Changes of the current inner cell are forwarded as the flattened
//! cell's own changes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::node::{Access, Node};
use crate::observable::Observable;
use crate::runtime::{self, AnyNode};

/// Follow the inner cell currently held by `outer`. The result is read-only.
pub fn flatten<T>(outer: &Observable<Observable<T>>) -> Observable<T>
where
    T: Clone + PartialEq + 'static,
{
    let node = Rc::new_cyclic(|this: &Weak<Node<T>>| {
        let current = outer.get();
        let dependent: Weak<dyn AnyNode> = this.clone();
        outer.node.add_dependent(dependent.clone());
        current.node.add_dependent(dependent);

        let initial = current.get();
        let height = 1 + outer.node.height().max(current.node.height());

        let outer = outer.clone();
        let tracked = RefCell::new(current);
        let this = this.clone();
        let compute = move || {
            let inner = outer.get();
            let switched = !tracked.borrow().ptr_eq(&inner);
            if switched {
                let previous = tracked.replace(inner.clone());
                if let Some(me) = this.upgrade() {
                    previous.node.remove_dependent(me.id());
                    let dependent: Weak<dyn AnyNode> = this.clone();
                    inner.node.add_dependent(dependent);
                    me.set_height(1 + outer.node.height().max(inner.node.height()));
                    runtime::lift_dependents(&*me);
                }
                tracing::trace!(message = "reactive.flatten.switch", from = previous.node.id(), to = inner.node.id());
            }
            inner.get()
        };
        Node::derived(initial, height, Box::new(compute), Access::ReadOnly)
    });
    Observable::from_node(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn forwards_inner_changes() {
        let inner = Observable::new(1);
        let outer = Observable::new(inner.clone());
        let flat = flatten(&outer);
        assert_eq!(flat.get(), 1);

        inner.set(2).expect("writable");
        assert_eq!(flat.get(), 2);
    }

    #[test]
    fn switching_inner_detaches_old() {
        let first = Observable::new(1);
        let second = Observable::new(10);
        let outer = Observable::new(first.clone());
        let flat = flatten(&outer);

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = flat.subscribe(move |_| counter.set(counter.get() + 1));

        outer.set(second.clone()).expect("writable");
        assert_eq!(flat.get(), 10);
        assert_eq!(calls.get(), 1);

        first.set(5).expect("writable");
        assert_eq!(flat.get(), 10);
        assert_eq!(calls.get(), 1);

        second.set(11).expect("writable");
        assert_eq!(flat.get(), 11);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn switch_to_equal_value_is_silent() {
        let first = Observable::new(3);
        let second = Observable::new(3);
        let outer = Observable::new(first);
        let flat = flatten(&outer);

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = flat.subscribe(move |_| counter.set(counter.get() + 1));

        outer.set(second).expect("writable");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn switch_to_deeper_inner_keeps_notification_order() {
        let shallow = Observable::new(1);
        let base = Observable::new(2);
        let deep = base.map(|v| v + 1).map(|v| v * 2).map(|v| v - 1);
        let outer = Observable::new(shallow);
        let flat = flatten(&outer);
        let other = Observable::new(100);
        let sum = crate::combine2(&flat, &other, |a, b| a + b);

        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&order);
        let _flat_sub = flat.subscribe(move |_| log.borrow_mut().push("flat"));
        let log = Rc::clone(&order);
        let _sum_sub = sum.subscribe(move |_| log.borrow_mut().push("sum"));

        outer.set(deep).expect("writable");
        assert_eq!(flat.get(), 5);
        assert_eq!(sum.get(), 105);
        assert_eq!(*order.borrow(), vec!["flat", "sum"]);
        assert!(sum.node.height() > flat.node.height());
    }

    #[test]
    fn flatten_of_derived_inner() {
        let base = Observable::new(2);
        let outer = Observable::new(base.map(|v| v * 100));
        let flat = flatten(&outer);
        base.set(3).expect("writable");
        assert_eq!(flat.get(), 300);
        assert!(flat.set(1).is_err());
    }
}
