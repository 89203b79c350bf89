#![forbid(unsafe_code)]

//! Gui components and the shared bake/render core.
//!
//! Every gui kind is a [`Component`] wrapping a [`GuiCore`]. The core owns
//! the slot state and the bake protocol; the component contributes its
//! content (pages, lines, tabs) during each bake pass.
//!
//! # Bake protocol
//!
//! 1. A reactive input changes and its weak observer calls
//!    [`GuiCore::request_bake`].
//! 2. The first request after a clean bake schedules one bake effect with
//!    the propagation runtime. Further requests before it runs are
//!    absorbed by the [`BakeScheduler`].
//! 3. A bake pass copies the base slots (structure elements plus manual
//!    edits), lets the component fill its content slots, masks slots hidden
//!    by a running animation, and replaces the baked slots in one
//!    assignment. The gui then watches exactly the reactive elements and
//!    linked guis of the new slots.
//! 4. Index components settle their index, which may write a corrected
//!    value back to the bound property.
//! 5. The new rendering is diffed against what each open viewer last
//!    received and only changed slots are pushed. Guis that link into this
//!    one re-push as well.
//!
//! # Invariants
//!
//! 1. The baked slots are only replaced whole, never patched in place.
//! 2. A bake with unchanged inputs reproduces the previous baked slots and
//!    pushes nothing.
//! 3. Sinks and handlers are called with no internal borrow held, so they
//!    may call back into the gui.
//! 4. A gui is registered as parent of a child exactly while one of its
//!    baked slots links into the child.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use invgrid_reactive::{ObserverKey, Property, schedule_effect};
use tracing::{debug, debug_span, warn};

use crate::animation::{Animation, AnimationState};
use crate::bake::{self, BakeOutcome, BakeScheduler, BakeState};
use crate::error::{GuiError, Result};
use crate::host::{SlotSink, ViewerId};
use crate::index::{IndexChange, IndexState};
use crate::input::ReactiveInput;
use crate::item::{Click, Item};
use crate::slot::{MAX_LINK_DEPTH, RenderedSlot, SlotElement};
use crate::structure::{IngredientMatrix, Structure};

/// A gui kind.
pub(crate) trait Component: 'static {
    fn core(&self) -> &GuiCore;

    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// Reject a structure before it replaces the current one.
    fn check_structure(&self, _matrix: &IngredientMatrix) -> Result<()> {
        Ok(())
    }

    /// Called after a structure has been applied.
    fn structure_applied(&self) {}

    /// Fill content slots. `slots` starts as a copy of the base slots.
    fn bake_content(&self, _slots: &mut [Option<SlotElement>]) -> Option<IndexChange> {
        None
    }

    fn index(&self) -> Option<&IndexState> {
        None
    }
}

struct Viewer {
    id: ViewerId,
    sink: Rc<dyn SlotSink>,
    shown: Vec<RenderedSlot>,
}

type PendingPush = (Rc<dyn SlotSink>, ViewerId, Vec<(usize, RenderedSlot)>);

pub(crate) struct GuiCore {
    this: Weak<dyn Component>,
    width: usize,
    height: usize,
    matrix: RefCell<IngredientMatrix>,
    base: RefCell<Vec<Option<SlotElement>>>,
    baked: RefCell<Vec<Option<SlotElement>>>,
    background: ReactiveInput<Option<Item>>,
    frozen: RefCell<Property<bool>>,
    scheduler: BakeScheduler,
    viewers: RefCell<Vec<Viewer>>,
    parents: RefCell<Vec<Weak<dyn Component>>>,
    children: RefCell<Vec<Weak<dyn Component>>>,
    watched: RefCell<Vec<(Property<Option<Item>>, ObserverKey)>>,
    animation: RefCell<Option<AnimationState>>,
    animation_generation: Cell<u64>,
}

impl GuiCore {
    fn new(this: Weak<dyn Component>, matrix: IngredientMatrix) -> Self {
        let base = matrix.elements().to_vec();
        Self {
            this,
            width: matrix.width(),
            height: matrix.height(),
            baked: RefCell::new(base.clone()),
            base: RefCell::new(base),
            matrix: RefCell::new(matrix),
            background: ReactiveInput::new(Property::of(None)),
            frozen: RefCell::new(Property::of(false)),
            scheduler: BakeScheduler::new(),
            viewers: RefCell::new(Vec::new()),
            parents: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            watched: RefCell::new(Vec::new()),
            animation: RefCell::new(None),
            animation_generation: Cell::new(0),
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.width * self.height
    }

    pub(crate) fn matrix(&self) -> std::cell::Ref<'_, IngredientMatrix> {
        self.matrix.borrow()
    }

    pub(crate) fn owner(&self) -> Option<Rc<dyn Component>> {
        self.this.upgrade()
    }

    /// Mark the gui dirty, scheduling a bake if it was clean.
    pub(crate) fn request_bake(&self) {
        if !self.scheduler.mark_dirty() {
            return;
        }
        let this = self.this.clone();
        schedule_effect(move || {
            if let Some(gui) = this.upgrade() {
                Self::run_bake(&gui);
            }
        });
    }

    fn run_bake(gui: &Rc<dyn Component>) -> BakeOutcome {
        let core = gui.core();
        let outcome = core.scheduler.run(|| core.bake_pass(gui));
        if let BakeOutcome::Deferred { passes } = outcome {
            warn!(message = "bake.overflow", kind = gui.kind(), passes);
            let weak = Rc::downgrade(gui);
            bake::defer(move || {
                if let Some(gui) = weak.upgrade() {
                    Self::run_bake(&gui);
                }
            });
        }
        outcome
    }

    fn bake_pass(&self, gui: &Rc<dyn Component>) {
        let _span = debug_span!("gui.bake", kind = gui.kind(), slots = self.size()).entered();

        let mut slots = self.base.borrow().clone();
        let change = gui.bake_content(&mut slots);
        if let Some(animation) = self.animation.borrow().as_ref() {
            animation.mask(&mut slots);
        }
        self.link_children(&slots);
        self.watch_reactive(gui, &slots);
        *self.baked.borrow_mut() = slots;

        if let (Some(change), Some(index)) = (change, gui.index()) {
            index.settle(gui.kind(), change);
        }

        self.push_viewers();
        self.push_parents();
    }

    /// Register as parent of the guis `slots` link into, and only those.
    fn link_children(&self, slots: &[Option<SlotElement>]) {
        let mut linked: Vec<Rc<dyn Component>> = Vec::new();
        for element in slots.iter().flatten() {
            if let SlotElement::Link { gui: child, .. } = element {
                if !linked.iter().any(|c| addr(c) == addr(&child.0)) {
                    linked.push(Rc::clone(&child.0));
                }
            }
        }
        let previous = self.children.replace(linked.iter().map(Rc::downgrade).collect());
        for child in previous.iter().filter_map(Weak::upgrade) {
            if !linked.iter().any(|c| addr(c) == addr(&child)) {
                child.core().remove_parent(&self.this);
            }
        }
        for child in &linked {
            child.core().add_parent(&self.this);
        }
    }

    fn add_parent(&self, parent: &Weak<dyn Component>) {
        let mut parents = self.parents.borrow_mut();
        parents.retain(|p| p.strong_count() > 0);
        if !parents.iter().any(|p| Weak::ptr_eq(p, parent)) {
            parents.push(parent.clone());
        }
    }

    fn remove_parent(&self, parent: &Weak<dyn Component>) {
        self.parents
            .borrow_mut()
            .retain(|p| p.strong_count() > 0 && !Weak::ptr_eq(p, parent));
    }

    /// Observe the reactive elements of `slots` and drop observers of the
    /// ones no longer shown.
    fn watch_reactive(&self, gui: &Rc<dyn Component>, slots: &[Option<SlotElement>]) {
        let mut shown: Vec<&Property<Option<Item>>> = Vec::new();
        for element in slots.iter().flatten() {
            if let SlotElement::Reactive(item) = element {
                if !shown.contains(&item) {
                    shown.push(item);
                }
            }
        }
        let mut watched = self.watched.borrow_mut();
        watched.retain(|(item, key)| {
            let keep = shown.contains(&item);
            if !keep {
                item.unobserve_weak(gui, *key);
            }
            keep
        });
        for item in shown {
            if !watched.iter().any(|(w, _)| w == item) {
                let key = item.observe_weak(gui, |gui, _| gui.core().request_bake());
                watched.push((item.clone(), key));
            }
        }
    }

    fn live_parents(&self) -> Vec<Rc<dyn Component>> {
        self.parents.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    /// Re-push every gui that links into this one, transitively.
    fn push_parents(&self) {
        let mut visited = HashSet::new();
        if let Some(this) = self.owner() {
            visited.insert(addr(&this));
        }
        let mut stack = self.live_parents();
        while let Some(parent) = stack.pop() {
            if !visited.insert(addr(&parent)) {
                continue;
            }
            let core = parent.core();
            core.push_viewers();
            stack.extend(core.live_parents());
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn element(&self, slot: usize) -> Option<SlotElement> {
        self.baked.borrow().get(slot).cloned().flatten()
    }

    pub(crate) fn render_at(&self, slot: usize, depth: usize) -> RenderedSlot {
        if slot >= self.size() {
            return RenderedSlot::Empty;
        }
        let rendered = match self.element(slot) {
            Some(element) => element.render(depth),
            None => RenderedSlot::Empty,
        };
        match (rendered, self.background.get()) {
            (RenderedSlot::Empty, Some(background)) => RenderedSlot::Item(background),
            (rendered, _) => rendered,
        }
    }

    fn render_all(&self) -> Vec<RenderedSlot> {
        (0..self.size()).map(|slot| self.render_at(slot, 0)).collect()
    }

    fn push_viewers(&self) {
        if self.viewers.borrow().is_empty() {
            return;
        }
        let rendered = self.render_all();
        let mut pending: Vec<PendingPush> = Vec::new();
        for viewer in self.viewers.borrow_mut().iter_mut() {
            let changed: Vec<(usize, RenderedSlot)> = rendered
                .iter()
                .enumerate()
                .filter(|(slot, r)| viewer.shown.get(*slot) != Some(*r))
                .map(|(slot, r)| (slot, r.clone()))
                .collect();
            if changed.is_empty() {
                continue;
            }
            viewer.shown.clone_from(&rendered);
            pending.push((Rc::clone(&viewer.sink), viewer.id, changed));
        }
        for (sink, viewer, slots) in pending {
            sink.push_slots(viewer, &slots);
        }
    }

    fn is_frozen(&self) -> bool {
        let frozen = self.frozen.borrow().clone();
        frozen.get()
    }

    /// Advance the animation started in `generation` by one tick. Returns
    /// whether it keeps running.
    fn advance_animation(gui: &Rc<dyn Component>, generation: u64) -> bool {
        let core = gui.core();
        if core.animation_generation.get() != generation {
            return false;
        }
        let step = {
            let mut animation = core.animation.borrow_mut();
            let Some(state) = animation.as_mut() else {
                return false;
            };
            state
                .advance()
                .map(|revealed| (revealed, state.show_handlers(), state.is_finished()))
        };
        let Some((revealed, show_handlers, finished)) = step else {
            return true;
        };
        let finished_state = if finished {
            core.animation_generation.set(generation + 1);
            core.animation.borrow_mut().take()
        } else {
            None
        };
        core.request_bake();
        for handler in show_handlers {
            handler(&revealed);
        }
        let Some(state) = finished_state else {
            return true;
        };
        debug!(message = "gui.animation.finish", kind = gui.kind(), frames = state.frame());
        for handler in state.finish_handlers() {
            handler();
        }
        false
    }
}

fn addr(gui: &Rc<dyn Component>) -> usize {
    Rc::as_ptr(gui).cast::<()>() as usize
}

// ---------------------------------------------------------------------------
// Gui handle
// ---------------------------------------------------------------------------

/// Shared handle to a gui of any kind.
///
/// Clones refer to the same gui; equality and hashing are by identity.
#[derive(Clone)]
pub struct Gui(pub(crate) Rc<dyn Component>);

impl Gui {
    /// Build a component around a fresh core for `matrix`.
    pub(crate) fn assemble<C: Component>(
        matrix: IngredientMatrix,
        make: impl FnOnce(GuiCore) -> C,
    ) -> (Rc<C>, Self) {
        let inner = Rc::new_cyclic(|weak: &Weak<C>| {
            let this: Weak<dyn Component> = weak.clone();
            make(GuiCore::new(this, matrix))
        });
        let component: Rc<dyn Component> = inner.clone();
        component.core().background.attach(&component);
        (inner, Self(component))
    }

    /// Finish construction: let the component read its structure and bake.
    pub(crate) fn start(&self) {
        self.0.structure_applied();
        self.0.core().request_bake();
    }

    fn core(&self) -> &GuiCore {
        self.0.core()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.core().width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.core().height
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.core().size()
    }

    /// Slot index of column `x`, row `y`.
    #[must_use]
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width() && y < self.height()).then(|| y * self.width() + x)
    }

    // -- slots ---------------------------------------------------------------

    /// Baked element at `slot`.
    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<SlotElement> {
        self.core().element(slot)
    }

    /// All baked elements, one per slot.
    #[must_use]
    pub fn slots(&self) -> Vec<Option<SlotElement>> {
        self.core().baked.borrow().clone()
    }

    /// Item shown at `slot`, following links. Ignores the background.
    #[must_use]
    pub fn item(&self, slot: usize) -> Option<Item> {
        self.slot(slot)?.holding_item()
    }

    #[must_use]
    pub fn item_at(&self, x: usize, y: usize) -> Option<Item> {
        self.item(self.index_of(x, y)?)
    }

    /// What a viewer sees at `slot`.
    #[must_use]
    pub fn rendered(&self, slot: usize) -> RenderedSlot {
        self.core().render_at(slot, 0)
    }

    #[must_use]
    pub fn rendered_slots(&self) -> Vec<RenderedSlot> {
        self.core().render_all()
    }

    pub(crate) fn render_at(&self, slot: usize, depth: usize) -> RenderedSlot {
        self.core().render_at(slot, depth)
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        let size = self.size();
        if slot < size {
            Ok(())
        } else {
            Err(GuiError::SlotOutOfBounds { slot, size })
        }
    }

    /// Place `element` at `slot`.
    ///
    /// Content slots of paged, scroll and tab guis are overwritten by the
    /// next bake.
    pub fn set_slot(&self, slot: usize, element: impl Into<SlotElement>) -> Result<()> {
        self.check_slot(slot)?;
        self.core().base.borrow_mut()[slot] = Some(element.into());
        self.core().request_bake();
        Ok(())
    }

    pub fn remove_slot(&self, slot: usize) -> Result<()> {
        self.check_slot(slot)?;
        self.core().base.borrow_mut()[slot] = None;
        self.core().request_bake();
        Ok(())
    }

    /// Put `items` into empty non-content slots in order.
    ///
    /// Returns the items that did not fit.
    pub fn add_items(&self, items: impl IntoIterator<Item = Item>) -> Vec<Item> {
        let mut items = items.into_iter();
        let mut placed = false;
        {
            let matrix = self.core().matrix.borrow();
            let mut base = self.core().base.borrow_mut();
            for (slot, target) in base.iter_mut().enumerate() {
                if target.is_some() || matrix.marker(slot).is_some() {
                    continue;
                }
                let Some(item) = items.next() else { break };
                *target = Some(SlotElement::Item(item));
                placed = true;
            }
        }
        if placed {
            self.core().request_bake();
        }
        items.collect()
    }

    /// Place each `(slot, element)` pair, skipping content slots and, unless
    /// `replace_existing`, slots that already hold an element.
    fn fill_slots(
        &self,
        elements: impl IntoIterator<Item = (usize, SlotElement)>,
        replace_existing: bool,
    ) {
        {
            let matrix = self.core().matrix.borrow();
            let mut base = self.core().base.borrow_mut();
            for (slot, element) in elements {
                if matrix.marker(slot).is_some() {
                    continue;
                }
                if let Some(target) = base.get_mut(slot) {
                    if replace_existing || target.is_none() {
                        *target = Some(element);
                    }
                }
            }
        }
        self.core().request_bake();
    }

    /// Slots of the `width` x `height` rectangle at `(x, y)`, row by row.
    fn rectangle(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Vec<usize>> {
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(x, width, self.width()) || !fits(y, height, self.height()) {
            return Err(GuiError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let gui_width = self.width();
        Ok((y..y + height)
            .flat_map(|row| (x..x + width).map(move |column| row * gui_width + column))
            .collect())
    }

    /// Put `element` into every non-content slot, or only the empty ones.
    pub fn fill(&self, element: impl Into<SlotElement>, replace_existing: bool) {
        let element = element.into();
        self.fill_slots(
            (0..self.size()).map(|slot| (slot, element.clone())),
            replace_existing,
        );
    }

    /// Put `element` into the slots of `row`.
    ///
    /// # Errors
    ///
    /// [`GuiError::RegionOutOfBounds`] if the gui has no such row.
    pub fn fill_row(
        &self,
        row: usize,
        element: impl Into<SlotElement>,
        replace_existing: bool,
    ) -> Result<()> {
        self.fill_rectangle(0, row, self.width(), 1, element, replace_existing)
    }

    /// Put `element` into the slots of `column`.
    ///
    /// # Errors
    ///
    /// [`GuiError::RegionOutOfBounds`] if the gui has no such column.
    pub fn fill_column(
        &self,
        column: usize,
        element: impl Into<SlotElement>,
        replace_existing: bool,
    ) -> Result<()> {
        self.fill_rectangle(column, 0, 1, self.height(), element, replace_existing)
    }

    /// Put `element` into the outer ring of slots.
    pub fn fill_borders(&self, element: impl Into<SlotElement>, replace_existing: bool) {
        let element = element.into();
        let (width, height) = (self.width(), self.height());
        let borders = (0..self.size()).filter(|slot| {
            let (x, y) = (slot % width, slot / width);
            x == 0 || y == 0 || x + 1 == width || y + 1 == height
        });
        self.fill_slots(
            borders.map(|slot| (slot, element.clone())),
            replace_existing,
        );
    }

    /// Put `element` into the `width` x `height` rectangle at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`GuiError::RegionOutOfBounds`] if the rectangle leaves the gui.
    pub fn fill_rectangle(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        element: impl Into<SlotElement>,
        replace_existing: bool,
    ) -> Result<()> {
        let element = element.into();
        let slots = self.rectangle(x, y, width, height)?;
        self.fill_slots(
            slots.into_iter().map(|slot| (slot, element.clone())),
            replace_existing,
        );
        Ok(())
    }

    /// Show `gui` in the rectangle at `(x, y)`: each slot links to the slot
    /// of `gui` at the same offset.
    ///
    /// # Errors
    ///
    /// [`GuiError::RegionOutOfBounds`] if `gui` does not fit at `(x, y)`.
    pub fn fill_rectangle_with_gui(
        &self,
        x: usize,
        y: usize,
        gui: &Gui,
        replace_existing: bool,
    ) -> Result<()> {
        let slots = self.rectangle(x, y, gui.width(), gui.height())?;
        self.fill_slots(
            slots
                .into_iter()
                .enumerate()
                .map(|(offset, slot)| (slot, SlotElement::link(gui, offset))),
            replace_existing,
        );
        Ok(())
    }

    // -- background / frozen -------------------------------------------------

    #[must_use]
    pub fn background(&self) -> Option<Item> {
        self.core().background.get()
    }

    /// Show `background` in empty slots.
    pub fn set_background(&self, background: Option<Item>) {
        self.bind_background(Property::of(background));
    }

    pub fn bind_background(&self, background: impl Into<Property<Option<Item>>>) {
        if self.core().background.rebind(&self.0, background.into()) {
            self.core().request_bake();
        }
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.core().is_frozen()
    }

    /// Ignore clicks while `frozen`.
    pub fn set_frozen(&self, frozen: bool) {
        self.bind_frozen(Property::of(frozen));
    }

    pub fn bind_frozen(&self, frozen: impl Into<Property<bool>>) {
        *self.core().frozen.borrow_mut() = frozen.into();
    }

    // -- structure -----------------------------------------------------------

    /// Replace the structure and rebake.
    ///
    /// Manual slot edits are discarded.
    ///
    /// # Errors
    ///
    /// [`GuiError::DimensionMismatch`] if `structure` has other dimensions
    /// than the gui. Paged and scroll guis also reject structures their
    /// content cannot be laid out in.
    pub fn apply_structure(&self, structure: &Structure) -> Result<()> {
        let core = self.core();
        if (structure.width(), structure.height()) != (core.width, core.height) {
            return Err(GuiError::DimensionMismatch {
                width: core.width,
                height: core.height,
                found_width: structure.width(),
                found_height: structure.height(),
            });
        }
        let matrix = structure.resolve();
        self.0.check_structure(&matrix)?;
        *core.base.borrow_mut() = matrix.elements().to_vec();
        *core.matrix.borrow_mut() = matrix;
        debug!(message = "gui.structure", kind = self.0.kind());
        self.start();
        Ok(())
    }

    /// Content list slots of the current structure.
    #[must_use]
    pub fn content_slots(&self) -> Vec<usize> {
        self.core().matrix.borrow().content_slots()
    }

    // -- viewers -------------------------------------------------------------

    /// Show the gui to `viewer`, pushing every slot to `sink`.
    ///
    /// Opening an already open viewer replaces its sink and pushes again.
    pub fn open(&self, viewer: ViewerId, sink: Rc<dyn SlotSink>) {
        {
            let mut viewers = self.core().viewers.borrow_mut();
            viewers.retain(|v| v.id != viewer);
            viewers.push(Viewer {
                id: viewer,
                sink,
                shown: Vec::new(),
            });
        }
        debug!(message = "gui.open", kind = self.0.kind(), viewer = viewer.get());
        self.core().push_viewers();
    }

    /// Stop pushing to `viewer`. Returns whether it was open.
    pub fn close(&self, viewer: ViewerId) -> bool {
        let mut viewers = self.core().viewers.borrow_mut();
        let before = viewers.len();
        viewers.retain(|v| v.id != viewer);
        before != viewers.len()
    }

    /// Close the gui for every viewer, asking each sink to close its
    /// viewer's window. Returns the closed viewers.
    pub fn close_all_viewers(&self) -> Vec<ViewerId> {
        let viewers = std::mem::take(&mut *self.core().viewers.borrow_mut());
        debug!(message = "gui.close_all", kind = self.0.kind(), viewers = viewers.len());
        viewers
            .into_iter()
            .map(|viewer| {
                viewer.sink.close_viewer(viewer.id);
                viewer.id
            })
            .collect()
    }

    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.core().viewers.borrow().len()
    }

    /// Route a click on `slot` to the item shown there.
    ///
    /// Follows links into other guis. Returns whether an item handled the
    /// click; a frozen gui anywhere on the way swallows it.
    ///
    /// # Errors
    ///
    /// [`GuiError::SlotOutOfBounds`] if `slot` is not a slot of this gui.
    pub fn handle_click(&self, slot: usize, click: &Click) -> Result<bool> {
        self.check_slot(slot)?;
        let mut gui = self.clone();
        let mut slot = slot;
        for _ in 0..MAX_LINK_DEPTH {
            if gui.is_frozen() {
                debug!(message = "click.frozen", kind = gui.0.kind(), slot);
                return Ok(false);
            }
            match gui.slot(slot) {
                None => return Ok(false),
                Some(SlotElement::Item(item)) => return Ok(item.click(click)),
                Some(SlotElement::Reactive(item)) => {
                    return Ok(item.get().is_some_and(|item| item.click(click)));
                }
                Some(SlotElement::Link {
                    gui: next,
                    slot: next_slot,
                }) => {
                    gui = next;
                    slot = next_slot;
                }
            }
        }
        Ok(false)
    }

    // -- animation -----------------------------------------------------------

    /// Hide the slots selected by `animation` and reveal them frame by frame
    /// on each [`tick`](crate::tick). A running animation is cancelled first.
    ///
    /// Slots stay editable while hidden; edits show once a slot is revealed.
    pub fn play_animation(&self, animation: Animation) {
        self.cancel_animation();
        let core = self.core();
        let state = AnimationState::new(animation, core.width, core.height);
        if state.is_finished() {
            return;
        }
        debug!(
            message = "gui.animation.start",
            kind = self.0.kind(),
            slots = state.hidden_count()
        );
        *core.animation.borrow_mut() = Some(state);
        let generation = core.animation_generation.get();
        core.request_bake();

        let weak = Rc::downgrade(&self.0);
        bake::every_tick(move || match weak.upgrade() {
            Some(gui) => GuiCore::advance_animation(&gui, generation),
            None => false,
        });
    }

    /// Stop the running animation and show every slot. Finish handlers run.
    /// Returns whether an animation was running.
    pub fn cancel_animation(&self) -> bool {
        let core = self.core();
        let Some(state) = core.animation.borrow_mut().take() else {
            return false;
        };
        core.animation_generation.set(core.animation_generation.get() + 1);
        debug!(
            message = "gui.animation.cancel",
            kind = self.0.kind(),
            frame = state.frame()
        );
        core.request_bake();
        for handler in state.finish_handlers() {
            handler();
        }
        true
    }

    #[must_use]
    pub fn is_animation_running(&self) -> bool {
        self.core().animation.borrow().is_some()
    }

    // -- baking --------------------------------------------------------------

    /// Bake now, regardless of pending input changes.
    ///
    /// Inside a running bake of this gui the request becomes a follow-up
    /// pass and [`BakeOutcome::Skipped`] is returned.
    pub fn bake(&self) -> BakeOutcome {
        self.core().scheduler.mark_dirty();
        GuiCore::run_bake(&self.0)
    }

    #[must_use]
    pub fn bake_state(&self) -> BakeState {
        self.core().scheduler.state()
    }

    /// Bake passes run since creation.
    #[must_use]
    pub fn bake_count(&self) -> u64 {
        self.core().scheduler.total_passes()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for Gui {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Gui {}

impl std::hash::Hash for Gui {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

impl std::fmt::Debug for Gui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gui")
            .field("kind", &self.0.kind())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NormalGui
// ---------------------------------------------------------------------------

struct NormalInner {
    core: GuiCore,
}

impl Component for NormalInner {
    fn core(&self) -> &GuiCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "normal"
    }
}

/// A gui whose slots are set by hand or by its structure.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NormalGui {
    gui: Gui,
}

impl NormalGui {
    #[must_use]
    pub fn new(structure: &Structure) -> Self {
        let (_, gui) = Gui::assemble(structure.resolve(), |core| NormalInner { core });
        gui.start();
        Self { gui }
    }

    /// A gui of `width` x `height` empty slots.
    ///
    /// # Errors
    ///
    /// [`GuiError::Structure`] if either dimension is zero.
    pub fn empty(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GuiError::structure(format!(
                "gui dimensions must be positive, got {width}x{height}"
            )));
        }
        let (_, gui) = Gui::assemble(IngredientMatrix::empty(width, height), |core| NormalInner {
            core,
        });
        gui.start();
        Ok(Self { gui })
    }

    #[must_use]
    pub fn gui(&self) -> &Gui {
        &self.gui
    }
}

impl std::ops::Deref for NormalGui {
    type Target = Gui;

    fn deref(&self) -> &Gui {
        &self.gui
    }
}

impl From<NormalGui> for Gui {
    fn from(gui: NormalGui) -> Self {
        gui.gui
    }
}

impl std::fmt::Debug for NormalGui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.gui.fmt(f)
    }
}
