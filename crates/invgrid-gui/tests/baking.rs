//! Bake scheduling, viewer pushes and deferred bakes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_gui::{
    BakeConfig, BakeOutcome, BakeState, Gui, Item, Marker, NormalGui, PagedItemsGui,
    RecordingSink, RenderedSlot, SlotElement, SlotSink, Structure, ViewerId, configure,
    deferred_count, tick,
};
use invgrid_reactive::{Observable, batch};
use proptest::prelude::*;

fn items(n: usize) -> Vec<Item> {
    (0..n).map(|i| Item::new(format!("item{i}"))).collect()
}

fn grid() -> Structure {
    Structure::new(&["# x x", "# x x"])
        .expect("valid")
        .ingredient('#', Item::new("border"))
        .ingredient('x', Marker::ContentListHorizontal)
}

proptest! {
    #[test]
    fn rebaking_without_input_change_is_stable(count in 0usize..40, page in 0usize..15) {
        let gui = PagedItemsGui::with_content(&grid(), items(count)).expect("gui");
        gui.set_page(page).expect("mutable");
        let sink = Rc::new(RecordingSink::new());
        gui.open(ViewerId::new(1), sink.clone());

        let first = gui.slots();
        prop_assert_eq!(gui.bake(), BakeOutcome::Clean { passes: 1 });
        prop_assert_eq!(gui.slots(), first);
        prop_assert_eq!(gui.bake(), BakeOutcome::Clean { passes: 1 });
        prop_assert_eq!(sink.push_count(), 1);
    }
}

#[test]
fn several_input_changes_in_one_batch_bake_once() {
    let gui = PagedItemsGui::with_content(&grid(), items(20)).expect("gui");
    let background = Observable::new(None);
    gui.bind_background(&background);
    let page = Observable::new(0usize);
    gui.bind_page(&page);
    let before = gui.bake_count();

    batch(|| {
        page.set(2).expect("mutable");
        background.set(Some(Item::new("pane"))).expect("mutable");
        gui.set_content(items(30));
    });

    assert_eq!(gui.bake_count(), before + 1);
    assert_eq!(gui.page(), 2);
    assert_eq!(gui.bake_state(), BakeState::Clean);
}

#[test]
fn viewers_get_full_then_diffs() {
    let content = items(8);
    let gui = PagedItemsGui::with_content(&grid(), content.clone()).expect("gui");
    let sink = Rc::new(RecordingSink::new());
    let viewer = ViewerId::new(4);
    gui.open(viewer, sink.clone());

    let first = sink.take();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].slots.len(), 6);

    gui.set_page(1).expect("mutable");
    let pushes = sink.take();
    assert_eq!(pushes.len(), 1);
    let slots: Vec<usize> = pushes[0].slots.iter().map(|(slot, _)| *slot).collect();
    assert_eq!(slots, vec![1, 2, 4, 5]);
    assert_eq!(
        sink.view(viewer, 6).len(),
        6
    );
    assert_eq!(gui.rendered(1), RenderedSlot::Item(content[4].clone()));
}

#[test]
fn nested_child_change_reaches_parent_viewer() {
    let child = NormalGui::empty(2, 2).expect("gui");
    let s = Structure::new(&["x x", "x x"])
        .expect("valid")
        .ingredient('x', Marker::ContentListHorizontal);
    let parent = invgrid_gui::PagedNestedGui::with_content(&s, vec![child.gui().clone()])
        .expect("gui");
    let sink = Rc::new(RecordingSink::new());
    let viewer = ViewerId::new(3);
    parent.open(viewer, sink.clone());
    sink.take();

    let gem = Item::new("gem");
    child.set_slot(3, gem.clone()).expect("in bounds");
    let pushes = sink.take();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].slots, vec![(3, RenderedSlot::Item(gem))]);
    assert_eq!(parent.slot(3), Some(SlotElement::link(&child, 3)));
}

/// Re-dirties its gui from every push until its budget runs out.
struct RestlessSink {
    gui: RefCell<Option<Gui>>,
    budget: Cell<usize>,
    pushes: Cell<usize>,
}

impl SlotSink for RestlessSink {
    fn push_slots(&self, _viewer: ViewerId, _slots: &[(usize, RenderedSlot)]) {
        self.pushes.set(self.pushes.get() + 1);
        if self.budget.get() == 0 {
            return;
        }
        self.budget.set(self.budget.get() - 1);
        if let Some(gui) = self.gui.borrow().as_ref() {
            gui.set_slot(0, Item::new("flicker")).expect("in bounds");
        }
    }
}

#[test]
fn self_dirtying_bake_is_deferred_to_tick() {
    configure(BakeConfig::default().with_max_rebakes(2));
    let gui = NormalGui::empty(1, 1).expect("gui");
    let sink = Rc::new(RestlessSink {
        gui: RefCell::new(Some(gui.gui().clone())),
        budget: Cell::new(0),
        pushes: Cell::new(0),
    });
    gui.open(ViewerId::new(1), sink.clone());
    sink.budget.set(5);

    gui.set_slot(0, Item::new("start")).expect("in bounds");
    assert_eq!(sink.pushes.get(), 4);
    assert_eq!(gui.bake_state(), BakeState::Dirty);
    assert_eq!(deferred_count(), 1);

    assert_eq!(tick(), 1);
    assert_eq!(sink.pushes.get(), 7);
    assert_eq!(gui.bake_state(), BakeState::Clean);
    assert_eq!(deferred_count(), 0);

    sink.gui.borrow_mut().take();
    configure(BakeConfig::default());
}

#[test]
fn dropped_gui_skips_deferred_bake() {
    configure(BakeConfig::default().with_max_rebakes(0));
    let gui = NormalGui::empty(1, 1).expect("gui");
    let sink = Rc::new(RestlessSink {
        gui: RefCell::new(Some(gui.gui().clone())),
        budget: Cell::new(0),
        pushes: Cell::new(0),
    });
    gui.open(ViewerId::new(1), sink.clone());
    sink.budget.set(1);
    gui.set_slot(0, Item::new("start")).expect("in bounds");
    assert_eq!(deferred_count(), 1);

    sink.gui.borrow_mut().take();
    drop(gui);
    let pushes = sink.pushes.get();
    assert_eq!(tick(), 1);
    assert_eq!(sink.pushes.get(), pushes);
    configure(BakeConfig::default());
}
