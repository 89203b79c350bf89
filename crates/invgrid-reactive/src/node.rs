#![forbid(unsafe_code)]

//! Shared storage behind every cell handle.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::registry::ObserverList;
use crate::runtime::{self, AnyNode, NodeId};

pub(crate) type Compute<T> = Box<dyn Fn() -> T>;
pub(crate) type WriteBack<T> = Box<dyn Fn(T) -> Result<()>>;

/// How writes to a cell are handled.
pub(crate) enum Access<T> {
    /// Root cell created with `Observable::new`.
    Writable,
    /// Root cell created with `Observable::constant`.
    Constant,
    /// Derived cell without a write path.
    ReadOnly,
    /// Derived cell whose writes are translated back into its source.
    WriteBack(WriteBack<T>),
}

pub(crate) struct Node<T> {
    id: NodeId,
    value: RefCell<T>,
    version: Cell<u64>,
    delivered: Cell<u64>,
    /// Value last handed to observers.
    delivered_value: RefCell<T>,
    height: Cell<usize>,
    dirty: Cell<bool>,
    compute: Option<Compute<T>>,
    pub(crate) access: Access<T>,
    dependents: RefCell<Vec<Weak<dyn AnyNode>>>,
    pub(crate) observers: ObserverList<T>,
}

impl<T: Clone + PartialEq + 'static> Node<T> {
    pub(crate) fn root(value: T, access: Access<T>) -> Rc<Self> {
        Rc::new(Self::build(value, 0, None, access))
    }

    /// A derived node; the caller registers it with its sources.
    pub(crate) fn derived(value: T, height: usize, compute: Compute<T>, access: Access<T>) -> Self {
        Self::build(value, height, Some(compute), access)
    }

    /// Build a derived node and register it as a dependent of `sources`.
    pub(crate) fn derive_from(
        value: T,
        sources: &[&dyn AnyNode],
        compute: Compute<T>,
        access: Access<T>,
    ) -> Rc<Self> {
        let height = 1 + sources.iter().map(|s| s.height()).max().unwrap_or(0);
        let node = Rc::new(Self::derived(value, height, compute, access));
        let weak: Weak<Self> = Rc::downgrade(&node);
        let dependent: Weak<dyn AnyNode> = weak;
        for source in sources {
            source.add_dependent(dependent.clone());
        }
        node
    }

    fn build(value: T, height: usize, compute: Option<Compute<T>>, access: Access<T>) -> Self {
        Self {
            id: runtime::next_id(),
            delivered_value: RefCell::new(value.clone()),
            value: RefCell::new(value),
            version: Cell::new(0),
            delivered: Cell::new(0),
            height: Cell::new(height),
            dirty: Cell::new(false),
            compute,
            access,
            dependents: RefCell::new(Vec::new()),
            observers: ObserverList::new(),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn version(&self) -> u64 {
        self.refresh();
        self.version.get()
    }

    pub(crate) fn is_derived(&self) -> bool {
        self.compute.is_some()
    }

    pub(crate) fn get(&self) -> T {
        self.refresh();
        self.value.borrow().clone()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.refresh();
        f(&self.value.borrow())
    }

    fn refresh(&self) {
        if !self.dirty.get() {
            return;
        }
        let Some(compute) = &self.compute else {
            self.dirty.set(false);
            return;
        };
        self.dirty.set(false);
        let next = compute();
        if *self.value.borrow() != next {
            *self.value.borrow_mut() = next;
            self.version.set(self.version.get() + 1);
        }
    }

    /// Store a new root value and start propagation. Equal values are ignored.
    pub(crate) fn store(self: &Rc<Self>, value: T) {
        if *self.value.borrow() == value {
            return;
        }
        *self.value.borrow_mut() = value;
        self.version.set(self.version.get() + 1);
        let root: Rc<dyn AnyNode> = Rc::clone(self) as Rc<dyn AnyNode>;
        runtime::record_write(root);
    }
}

impl<T: Clone + PartialEq + 'static> AnyNode for Node<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn height(&self) -> usize {
        self.height.get()
    }

    fn invalidate(&self) -> bool {
        if self.compute.is_none() || self.dirty.get() {
            return false;
        }
        self.dirty.set(true);
        true
    }

    fn settle(&self) {
        self.refresh();
    }

    fn notify(&self) {
        let version = self.version.get();
        if self.delivered.replace(version) == version {
            return;
        }
        // A batch may write a value and then restore it.
        if *self.delivered_value.borrow() == *self.value.borrow() {
            return;
        }
        let value = self.value.borrow().clone();
        self.delivered_value.replace(value.clone());
        let callbacks = self.observers.snapshot();
        tracing::trace!(
            message = "reactive.notify",
            cell = self.id,
            version,
            observers = callbacks.len()
        );
        for callback in callbacks {
            callback(&value);
        }
    }

    fn set_height(&self, height: usize) {
        self.height.set(height);
    }

    fn dependents(&self) -> Vec<Rc<dyn AnyNode>> {
        let mut dependents = self.dependents.borrow_mut();
        let mut live = Vec::with_capacity(dependents.len());
        dependents.retain(|weak| match weak.upgrade() {
            Some(node) => {
                live.push(node);
                true
            }
            None => false,
        });
        live
    }

    fn add_dependent(&self, dependent: Weak<dyn AnyNode>) {
        self.dependents.borrow_mut().push(dependent);
    }

    fn remove_dependent(&self, id: NodeId) {
        self.dependents
            .borrow_mut()
            .retain(|weak| weak.upgrade().is_some_and(|node| node.id() != id));
    }
}
