//! Paged gui behaviour through its public surface.

use std::cell::RefCell;
use std::rc::Rc;

use invgrid_gui::{Item, Marker, PagedItemsGui, SlotElement, Structure};
use invgrid_reactive::Observable;

fn items(n: usize) -> Vec<Item> {
    (0..n).map(|i| Item::new(format!("item{i}"))).collect()
}

fn full_grid() -> Structure {
    Structure::new(&["x x x", "x x x", "x x x"])
        .expect("valid")
        .ingredient('x', Marker::ContentListHorizontal)
}

fn middle_row() -> Structure {
    Structure::new(&[". . .", "x x x", ". . ."])
        .expect("valid")
        .ingredient('x', Marker::ContentListHorizontal)
}

#[test]
fn out_of_range_page_is_corrected_once() {
    let page = Observable::new(0usize);
    let notified = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&notified);
    let _sub = page.subscribe(move |p| log.borrow_mut().push(*p));

    let gui = PagedItemsGui::with_content(&full_grid(), items(25)).expect("gui");
    gui.bind_page(&page);
    assert_eq!(gui.page_count(), 3);
    assert_eq!(gui.page_count_cell().get(), 3);

    page.set(5).expect("mutable");

    assert_eq!(gui.page(), 2);
    assert_eq!(page.get(), 2);
    assert_eq!(*notified.borrow(), vec![5, 2]);
}

#[test]
fn page_property_is_coerced() {
    for count in [0usize, 10, 99, 1000] {
        let max_page = count.div_ceil(3).saturating_sub(1);
        let page = Observable::new(0usize);
        let gui = PagedItemsGui::with_content(&middle_row(), items(count)).expect("gui");
        gui.bind_page(&page);

        assert_eq!(page.get(), 0);
        gui.set_page(usize::MAX).expect("mutable");
        assert_eq!(page.get(), max_page, "count={count}");

        page.set(0).expect("mutable");
        assert_eq!(gui.page(), 0);
        page.set(usize::MAX).expect("mutable");
        assert_eq!(gui.page(), max_page, "count={count}");
        assert_eq!(page.get(), max_page, "count={count}");
    }
}

#[test]
fn content_property_drives_slots() {
    let content = Observable::new(Vec::<Item>::new());
    let s = Structure::new(&["x"])
        .expect("valid")
        .ingredient('x', Marker::ContentListHorizontal);
    let gui = PagedItemsGui::new(&s).expect("gui");
    gui.bind_content(&content);
    assert_eq!(gui.item(0), None);

    let list = items(3);
    content.set(list.clone()).expect("mutable");
    assert_eq!(gui.item(0), Some(list[0].clone()));
    for (i, item) in list.iter().enumerate() {
        gui.set_page(i).expect("mutable");
        assert_eq!(gui.item(0).as_ref(), Some(item));
    }

    content.set(Vec::new()).expect("mutable");
    assert_eq!(gui.item(0), None);

    gui.set_content(Vec::new());
    content.set(list).expect("mutable");
    assert_eq!(gui.item(0), None);
}

#[test]
fn page_change_handlers_follow_bound_property() {
    let page = Observable::new(0usize);
    let gui = PagedItemsGui::with_content(&full_grid(), items(200)).expect("gui");
    gui.bind_page(&page);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    gui.add_page_change_handler(move |from, to| log.borrow_mut().push((from, to)));

    page.set(10).expect("mutable");
    page.set(0).expect("mutable");
    page.set(0).expect("mutable");
    assert_eq!(*seen.borrow(), vec![(0, 10), (10, 0)]);
}

#[test]
fn apply_structure_moves_content() {
    let glass = Item::new("glass");
    let s1 = Structure::new(&["x x x", "x x x", "# # #"])
        .expect("valid")
        .ingredient('#', glass.clone())
        .ingredient('x', Marker::ContentListHorizontal);
    let s2 = Structure::new(&[". . .", "x x x", "# # #"])
        .expect("valid")
        .ingredient('#', glass.clone())
        .ingredient('x', Marker::ContentListHorizontal);
    let content = items(100);
    let gui = PagedItemsGui::with_content(&s1, content.clone()).expect("gui");

    for slot in 0..6 {
        assert_eq!(gui.slot(slot), Some(SlotElement::Item(content[slot].clone())));
    }
    for slot in 6..9 {
        assert_eq!(gui.item(slot), Some(glass.clone()));
    }

    gui.apply_structure(&s2).expect("same size");
    assert_eq!(gui.page_size(), 3);
    for slot in 0..3 {
        assert_eq!(gui.slot(slot), None);
    }
    for slot in 3..6 {
        assert_eq!(gui.item(slot), Some(content[slot - 3].clone()));
    }
    for slot in 6..9 {
        assert_eq!(gui.item(slot), Some(glass.clone()));
    }
}

#[test]
fn structure_without_content_slots_is_rejected_later_too() {
    let gui = PagedItemsGui::with_content(&full_grid(), items(3)).expect("gui");
    let plain = Structure::new(&["...", "...", "..."]).expect("valid");
    assert!(gui.apply_structure(&plain).is_err());
    assert_eq!(gui.content_slots().len(), 9);
}
