#![forbid(unsafe_code)]

//! Opaque item handles and click input.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::host::ViewerId;

/// Kind of click reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Middle,
    Drop,
    /// Hotbar number key, `0..=8`.
    NumberKey(u8),
}

/// A click on a slot, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub viewer: ViewerId,
    pub kind: ClickKind,
}

impl Click {
    #[must_use]
    pub const fn new(viewer: ViewerId, kind: ClickKind) -> Self {
        Self { viewer, kind }
    }
}

type ClickHandler = Box<dyn Fn(&Click)>;

struct ItemInner {
    name: String,
    on_click: Option<ClickHandler>,
}

/// Handle to a host item.
///
/// The rendering of the item is owned by the host; this crate only carries
/// a name for diagnostics and an optional click handler. Clones share the
/// same item and equality is identity.
#[derive(Clone)]
pub struct Item {
    inner: Rc<ItemInner>,
}

impl Item {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ItemInner {
                name: name.into(),
                on_click: None,
            }),
        }
    }

    /// An item that runs `handler` when clicked.
    #[must_use]
    pub fn clickable(name: impl Into<String>, handler: impl Fn(&Click) + 'static) -> Self {
        Self {
            inner: Rc::new(ItemInner {
                name: name.into(),
                on_click: Some(Box::new(handler)),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn is_clickable(&self) -> bool {
        self.inner.on_click.is_some()
    }

    /// Run the click handler. Returns whether the item had one.
    pub fn click(&self, click: &Click) -> bool {
        match &self.inner.on_click {
            Some(handler) => {
                handler(click);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.inner), state);
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Item").field(&self.inner.name).finish()
    }
}
