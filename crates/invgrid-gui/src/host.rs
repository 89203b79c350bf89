#![forbid(unsafe_code)]

//! The seam to the host that displays guis to viewers.
//!
//! After every bake a gui pushes the slots whose rendering changed to each
//! open viewer through [`SlotSink::push_slots`]. When the gui closes its
//! viewers it asks the host to close their windows through
//! [`SlotSink::close_viewer`]. [`RecordingSink`] is an in-memory sink for
//! tests and tooling.

use std::cell::RefCell;

use crate::slot::RenderedSlot;

/// Identifies one viewer (player, window) of a gui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(u64);

impl ViewerId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Receives slot updates for open viewers.
///
/// `slots` is sorted by slot index and never empty.
pub trait SlotSink {
    fn push_slots(&self, viewer: ViewerId, slots: &[(usize, RenderedSlot)]);

    /// The gui stopped showing itself to `viewer` and wants its window
    /// closed.
    fn close_viewer(&self, _viewer: ViewerId) {}
}

/// One recorded call to [`SlotSink::push_slots`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    pub viewer: ViewerId,
    pub slots: Vec<(usize, RenderedSlot)>,
}

/// A sink that records every push.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pushes: RefCell<Vec<Push>>,
    closed: RefCell<Vec<ViewerId>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All pushes so far.
    #[must_use]
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.borrow().clone()
    }

    #[must_use]
    pub fn push_count(&self) -> usize {
        self.pushes.borrow().len()
    }

    #[must_use]
    pub fn last(&self) -> Option<Push> {
        self.pushes.borrow().last().cloned()
    }

    /// Remove and return the recorded pushes.
    pub fn take(&self) -> Vec<Push> {
        std::mem::take(&mut *self.pushes.borrow_mut())
    }

    /// Viewers the gui asked to close, in order.
    #[must_use]
    pub fn closed(&self) -> Vec<ViewerId> {
        self.closed.borrow().clone()
    }

    /// Fold every push for `viewer` into a full view of `size` slots.
    #[must_use]
    pub fn view(&self, viewer: ViewerId, size: usize) -> Vec<RenderedSlot> {
        let mut view = vec![RenderedSlot::Empty; size];
        for push in self.pushes.borrow().iter().filter(|p| p.viewer == viewer) {
            for (slot, rendered) in &push.slots {
                if let Some(target) = view.get_mut(*slot) {
                    *target = rendered.clone();
                }
            }
        }
        view
    }
}

impl SlotSink for RecordingSink {
    fn push_slots(&self, viewer: ViewerId, slots: &[(usize, RenderedSlot)]) {
        self.pushes.borrow_mut().push(Push {
            viewer,
            slots: slots.to_vec(),
        });
    }

    fn close_viewer(&self, viewer: ViewerId) {
        self.closed.borrow_mut().push(viewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    #[test]
    fn view_folds_pushes() {
        let sink = RecordingSink::new();
        let viewer = ViewerId::new(7);
        let stone = Item::new("stone");
        sink.push_slots(viewer, &[(0, RenderedSlot::Item(stone.clone())), (2, RenderedSlot::Empty)]);
        sink.push_slots(viewer, &[(1, RenderedSlot::Item(stone.clone()))]);
        sink.push_slots(ViewerId::new(8), &[(2, RenderedSlot::Item(stone.clone()))]);

        let view = sink.view(viewer, 3);
        assert_eq!(
            view,
            vec![
                RenderedSlot::Item(stone.clone()),
                RenderedSlot::Item(stone),
                RenderedSlot::Empty
            ]
        );
        assert_eq!(sink.push_count(), 3);
        assert_eq!(sink.take().len(), 3);
        assert_eq!(sink.push_count(), 0);
    }
}
