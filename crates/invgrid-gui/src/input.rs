#![forbid(unsafe_code)]

//! Reactive component inputs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_reactive::{ObserverKey, Property};

use crate::gui::Component;

/// A component input bound to a [`Property`].
///
/// While attached, a change of the bound value dirties the owning component.
/// The registration is weak, so the input never keeps its component alive.
pub(crate) struct ReactiveInput<T> {
    property: RefCell<Property<T>>,
    key: Cell<Option<ObserverKey>>,
}

impl<T: Clone + PartialEq + 'static> ReactiveInput<T> {
    pub(crate) fn new(property: Property<T>) -> Self {
        Self {
            property: RefCell::new(property),
            key: Cell::new(None),
        }
    }

    pub(crate) fn get(&self) -> T {
        let property = self.property();
        property.get()
    }

    pub(crate) fn property(&self) -> Property<T> {
        self.property.borrow().clone()
    }

    /// Dirty `owner` whenever the bound value changes.
    pub(crate) fn attach(&self, owner: &Rc<dyn Component>) {
        let key = self
            .property
            .borrow()
            .observe_weak(owner, |gui, _| gui.core().request_bake());
        self.key.set(Some(key));
    }

    /// Bind `property` in place of the current one.
    ///
    /// Returns `false` if it is already bound.
    pub(crate) fn rebind(&self, owner: &Rc<dyn Component>, property: Property<T>) -> bool {
        if *self.property.borrow() == property {
            return false;
        }
        let previous = self.property.replace(property);
        if let Some(key) = self.key.take() {
            previous.unobserve_weak(owner, key);
        }
        self.attach(owner);
        true
    }
}
