#![forbid(unsafe_code)]

//! Observer storage for cells, including owner-scoped weak observers.
//!
//! Every cell keeps one ordered list mixing two kinds of entries:
//!
//! - **Subscribed**: registered through [`Observable::subscribe`]. The cell
//!   holds only a `Weak` to the callback; the returned
//!   [`Subscription`](crate::Subscription) owns it.
//! - **Owned**: registered through [`Observable::observe_weak`]. The entry
//!   holds the callback strongly but the owner only weakly, so a subscribed
//!   owner stays collectible.
//!
//! Dead entries are purged on every notification and every registration.
//!
//! # Invariants
//!
//! 1. Notification order is registration order across both kinds.
//! 2. An entry whose owner has been dropped is never invoked again.
//! 3. The list never keeps an owner alive.
//! 4. A derived cell with a live owner-scoped observer stays alive until the
//!    owner is dropped or the registration is removed, even without handles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::observable::Observable;
use crate::runtime;

/// Handle identifying one owner-scoped observer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverKey(u64);

impl ObserverKey {
    pub(crate) fn next() -> Self {
        Self(runtime::next_id())
    }

    /// Raw numeric value, unique per thread.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

pub(crate) type Callback<T> = Rc<dyn Fn(&T)>;

enum Entry<T> {
    Subscribed(Weak<dyn Fn(&T)>),
    Owned {
        key: ObserverKey,
        owner: usize,
        alive: Box<dyn Fn() -> bool>,
        callback: Callback<T>,
    },
}

impl<T> Entry<T> {
    fn is_live(&self) -> bool {
        match self {
            Self::Subscribed(callback) => callback.strong_count() > 0,
            Self::Owned { alive, .. } => alive(),
        }
    }
}

/// Address of an owner, used as its identity.
pub(crate) fn owner_addr<O: ?Sized>(owner: &Rc<O>) -> usize {
    Rc::as_ptr(owner).cast::<()>() as usize
}

pub(crate) struct ObserverList<T> {
    entries: RefCell<Vec<Entry<T>>>,
}

impl<T: 'static> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    fn purge(&self) {
        self.entries.borrow_mut().retain(Entry::is_live);
    }

    pub(crate) fn subscribe(&self, callback: &Callback<T>) {
        self.purge();
        self.entries
            .borrow_mut()
            .push(Entry::Subscribed(Rc::downgrade(callback)));
    }

    pub(crate) fn observe_weak<O: ?Sized + 'static>(
        &self,
        owner: &Rc<O>,
        observer: impl Fn(&O, &T) + 'static,
    ) -> ObserverKey {
        self.purge();
        let key = ObserverKey::next();
        let target = Rc::downgrade(owner);
        let weak_owner = target.clone();
        let callback: Callback<T> = Rc::new(move |value: &T| {
            if let Some(owner) = target.upgrade() {
                observer(&owner, value);
            }
        });
        self.entries.borrow_mut().push(Entry::Owned {
            key,
            owner: owner_addr(owner),
            alive: Box::new(move || weak_owner.strong_count() > 0),
            callback,
        });
        key
    }

    pub(crate) fn remove_key(&self, owner: usize, key: ObserverKey) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| {
            !matches!(entry, Entry::Owned { key: k, owner: o, .. } if *k == key && *o == owner)
        });
        entries.len() != before
    }

    /// Remove every entry of `owner`, returning their keys.
    pub(crate) fn remove_owner(&self, owner: usize) -> Vec<ObserverKey> {
        let mut removed = Vec::new();
        self.entries.borrow_mut().retain(|entry| match entry {
            Entry::Owned { key, owner: o, .. } if *o == owner => {
                removed.push(*key);
                false
            }
            _ => true,
        });
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.purge();
        self.entries.borrow().len()
    }

    /// Live callbacks in registration order. The list is not borrowed while
    /// the caller invokes them, so callbacks may register or unregister.
    pub(crate) fn snapshot(&self) -> Vec<Callback<T>> {
        self.purge();
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Subscribed(callback) => callback.upgrade(),
                Entry::Owned { callback, .. } => Some(Rc::clone(callback)),
            })
            .collect()
    }
}

/// Remove every observer `owner` registered on `cell`.
///
/// Equivalent to [`Observable::unobserve_owner`]; returns the number of
/// removed registrations.
pub fn unregister<T, O>(cell: &Observable<T>, owner: &Rc<O>) -> usize
where
    T: Clone + PartialEq + 'static,
    O: ?Sized + 'static,
{
    cell.unobserve_owner(owner)
}
