#![forbid(unsafe_code)]

//! Content kinds for paged and scroll guis.

use std::rc::Rc;

use invgrid_reactive::{Observable, Property, flatten};
use tracing::warn;

use crate::gui::{Component, Gui};
use crate::item::Item;
use crate::slot::SlotElement;

/// Something a paged or scroll gui can lay out in its content slots.
pub trait Content: Clone + PartialEq + 'static {
    /// Number of pages `content` fills with `page_size` content slots.
    fn page_count(content: &[Self], page_size: usize) -> usize;

    /// Elements of page `page`, at most `page_size` of them.
    fn page_elements(content: &[Self], page: usize, page_size: usize) -> Vec<SlotElement>;

    /// All elements as one flat list, split into lines by the scroll gui.
    fn line_elements(content: &[Self]) -> Vec<SlotElement>;
}

/// One slot per item.
impl Content for Item {
    fn page_count(content: &[Self], page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        content.len().div_ceil(page_size)
    }

    fn page_elements(content: &[Self], page: usize, page_size: usize) -> Vec<SlotElement> {
        let start = page.saturating_mul(page_size);
        content
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .map(SlotElement::Item)
            .collect()
    }

    fn line_elements(content: &[Self]) -> Vec<SlotElement> {
        content.iter().cloned().map(SlotElement::Item).collect()
    }
}

/// Nested guis: each page shows one child gui, each scroll line one row of
/// slots of the children in order.
impl Content for Gui {
    fn page_count(content: &[Self], _page_size: usize) -> usize {
        content.len()
    }

    fn page_elements(content: &[Self], page: usize, page_size: usize) -> Vec<SlotElement> {
        let Some(gui) = content.get(page) else {
            return Vec::new();
        };
        (0..page_size.min(gui.size()))
            .map(|slot| SlotElement::link(gui, slot))
            .collect()
    }

    fn line_elements(content: &[Self]) -> Vec<SlotElement> {
        content
            .iter()
            .flat_map(|gui| (0..gui.size()).map(move |slot| SlotElement::link(gui, slot)))
            .collect()
    }
}

/// The content input of a paged or scroll gui.
///
/// The bound cell can be swapped at any time. `cell()` always follows the
/// currently bound one, so cells derived from it stay valid across rebinds.
pub(crate) struct ContentList<C: Content> {
    source: Observable<Observable<Vec<C>>>,
    content: Observable<Vec<C>>,
}

impl<C: Content> ContentList<C> {
    pub(crate) fn new() -> Self {
        let source = Observable::new(Observable::new(Vec::new()));
        let content = flatten(&source);
        Self { source, content }
    }

    pub(crate) fn cell(&self) -> &Observable<Vec<C>> {
        &self.content
    }

    pub(crate) fn get(&self) -> Vec<C> {
        self.content.get()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&[C]) -> R) -> R {
        self.content.with(|content| f(content))
    }

    /// The currently bound cell.
    pub(crate) fn property(&self) -> Property<Vec<C>> {
        Property::from(self.source.get())
    }

    pub(crate) fn bind(&self, kind: &'static str, content: Property<Vec<C>>) {
        if let Err(err) = self.source.set(content.observable().clone()) {
            warn!(message = "content.bind_failed", kind, error = %err);
        }
    }

    pub(crate) fn attach(&self, owner: &Rc<dyn Component>) {
        self.content
            .observe_weak(owner, |gui, _| gui.core().request_bake());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::NormalGui;

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new(format!("item{i}"))).collect()
    }

    #[test]
    fn item_pages() {
        let content = items(25);
        assert_eq!(Item::page_count(&content, 9), 3);
        assert_eq!(Item::page_count(&[], 9), 0);
        assert_eq!(Item::page_count(&content, 0), 0);
        let last = Item::page_elements(&content, 2, 9);
        assert_eq!(last.len(), 7);
        assert_eq!(last[0], SlotElement::Item(content[18].clone()));
        assert!(Item::page_elements(&content, usize::MAX, 9).is_empty());
    }

    #[test]
    fn content_list_follows_rebinds() {
        let list = ContentList::<Item>::new();
        let first = Observable::new(items(2));
        let second = Observable::new(items(3));
        list.bind("test", Property::from(&first));
        assert_eq!(list.get().len(), 2);
        list.bind("test", Property::from(&second));
        assert_eq!(list.get().len(), 3);
        first.set(items(5)).expect("mutable");
        assert_eq!(list.with(<[Item]>::len), 3);
        assert_eq!(list.property(), Property::from(&second));
    }

    #[test]
    fn gui_pages_link_child_slots() {
        let child = NormalGui::empty(2, 1).expect("gui");
        let other = NormalGui::empty(3, 1).expect("gui");
        let content: Vec<Gui> = vec![child.gui().clone(), other.gui().clone()];
        assert_eq!(Gui::page_count(&content, 9), 2);
        let page = Gui::page_elements(&content, 1, 2);
        assert_eq!(page, vec![SlotElement::link(&other, 0), SlotElement::link(&other, 1)]);
        assert_eq!(Gui::line_elements(&content).len(), 5);
    }
}
