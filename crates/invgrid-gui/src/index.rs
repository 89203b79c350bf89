#![forbid(unsafe_code)]

//! Page, line and tab indices.
//!
//! An index component binds a requested index through a [`Property`]. Each
//! bake resolves it to an effective index against the current content. When
//! the two differ the bake clamps, writes the effective value back to the
//! property once and keeps going; an out-of-range index is never an error.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_reactive::Property;
use tracing::{debug, warn};

use crate::input::ReactiveInput;

/// Requested and effective index of one bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexChange {
    pub(crate) requested: usize,
    /// `None` if no index is valid (a tab gui without tabs).
    pub(crate) effective: Option<usize>,
}

type ChangeHandler = Rc<dyn Fn(usize, usize)>;

pub(crate) struct IndexState {
    pub(crate) input: ReactiveInput<usize>,
    current: Cell<Option<usize>>,
    handlers: RefCell<Vec<ChangeHandler>>,
}

impl IndexState {
    pub(crate) fn new(property: Property<usize>) -> Self {
        Self {
            input: ReactiveInput::new(property),
            current: Cell::new(None),
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn requested(&self) -> usize {
        self.input.get()
    }

    /// Effective index of the last bake.
    pub(crate) fn current(&self) -> Option<usize> {
        self.current.get()
    }

    pub(crate) fn add_handler(&self, handler: impl Fn(usize, usize) + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Write `index` through the bound property.
    pub(crate) fn request(&self, index: usize) -> invgrid_reactive::Result<()> {
        self.input.property().set(index)
    }

    /// Record the outcome of a bake.
    ///
    /// Corrects the bound property if the bake clamped, then runs change
    /// handlers if the effective index moved between two valid indices.
    pub(crate) fn settle(&self, kind: &'static str, change: IndexChange) {
        if let Some(effective) = change.effective {
            if effective != change.requested {
                debug!(
                    message = "index.clamp",
                    kind,
                    requested = change.requested,
                    effective
                );
                let property = self.input.property();
                if property.is_mutable() {
                    if let Err(err) = property.set(effective) {
                        warn!(message = "index.correct_failed", kind, error = %err);
                    }
                }
            }
        }

        let previous = self.current.replace(change.effective);
        if previous == change.effective {
            return;
        }
        debug!(message = "index.switch", kind, from = ?previous, to = ?change.effective);
        if let (Some(from), Some(to)) = (previous, change.effective) {
            let handlers = self.handlers.borrow().clone();
            for handler in handlers {
                handler(from, to);
            }
        }
    }
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("requested", &self.requested())
            .field("current", &self.current.get())
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}
