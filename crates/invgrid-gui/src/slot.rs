#![forbid(unsafe_code)]

//! Slot elements and their rendered form.
//!
//! A slot holds a fixed item, an item driven by a cell, or a link into a
//! slot of another gui. A gui watches the reactive elements it currently
//! shows and rebakes when one of them changes.

use invgrid_reactive::Property;

use crate::gui::Gui;
use crate::item::Item;

/// Link chains longer than this render as empty.
pub(crate) const MAX_LINK_DEPTH: usize = 64;

/// What a slot of a gui holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotElement {
    /// An item placed directly in the slot.
    Item(Item),
    /// The item currently held by a cell; `None` leaves the slot empty.
    Reactive(Property<Option<Item>>),
    /// A view of `slot` of another gui.
    Link { gui: Gui, slot: usize },
}

impl SlotElement {
    #[must_use]
    pub fn link(gui: &Gui, slot: usize) -> Self {
        Self::Link {
            gui: gui.clone(),
            slot,
        }
    }

    /// A slot showing whatever `item` holds.
    #[must_use]
    pub fn reactive(item: impl Into<Property<Option<Item>>>) -> Self {
        Self::Reactive(item.into())
    }

    /// The element at the end of a link chain.
    ///
    /// Returns `None` if the chain ends in an empty slot, leaves the bounds
    /// of a linked gui, or is longer than the link depth limit.
    #[must_use]
    pub fn holding_element(&self) -> Option<SlotElement> {
        let mut current = self.clone();
        for _ in 0..MAX_LINK_DEPTH {
            match current {
                Self::Item(_) | Self::Reactive(_) => return Some(current),
                Self::Link { gui, slot } => current = gui.slot(slot)?,
            }
        }
        None
    }

    /// The item at the end of a link chain, if any.
    #[must_use]
    pub fn holding_item(&self) -> Option<Item> {
        match self.holding_element()? {
            Self::Item(item) => Some(item),
            Self::Reactive(item) => item.get(),
            Self::Link { .. } => None,
        }
    }

    pub(crate) fn render(&self, depth: usize) -> RenderedSlot {
        match self {
            Self::Item(item) => RenderedSlot::Item(item.clone()),
            Self::Reactive(item) => item.get().map_or(RenderedSlot::Empty, RenderedSlot::Item),
            Self::Link { gui, slot } if depth < MAX_LINK_DEPTH => gui.render_at(*slot, depth + 1),
            Self::Link { .. } => RenderedSlot::Empty,
        }
    }
}

impl From<Item> for SlotElement {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<Property<Option<Item>>> for SlotElement {
    fn from(item: Property<Option<Item>>) -> Self {
        Self::Reactive(item)
    }
}

/// What a viewer sees in a slot after backgrounds and links are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderedSlot {
    Item(Item),
    #[default]
    Empty,
}

impl RenderedSlot {
    #[must_use]
    pub fn item(&self) -> Option<&Item> {
        match self {
            Self::Item(item) => Some(item),
            Self::Empty => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
