#![forbid(unsafe_code)]

//! Paged guis.
//!
//! A [`PagedGui`] splits its content into pages of as many elements as its
//! structure has content slots and shows one page at a time.
//!
//! The page is bound through a [`Property`]. An out-of-range page is clamped
//! to the last page during the bake and the clamped value is written back
//! to the property once. With infinite pages enabled no clamping happens.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_reactive::{BindingScope, Observable, Property, combine2};
use tracing::warn;

use crate::content::{Content, ContentList};
use crate::error::{GuiError, Result};
use crate::gui::{Component, Gui, GuiCore};
use crate::index::{IndexChange, IndexState};
use crate::item::Item;
use crate::slot::SlotElement;
use crate::structure::{IngredientMatrix, Structure};

const KIND: &str = "paged";

struct PagedInner<C: Content> {
    core: GuiCore,
    content: ContentList<C>,
    page_size: Observable<usize>,
    page_count: Observable<usize>,
    index: IndexState,
    infinite: Cell<bool>,
    content_slots: RefCell<Vec<usize>>,
    bindings: RefCell<BindingScope>,
}

impl<C: Content> Component for PagedInner<C> {
    fn core(&self) -> &GuiCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    fn check_structure(&self, matrix: &IngredientMatrix) -> Result<()> {
        if matrix.content_slots().is_empty() {
            return Err(GuiError::NoContentSlots);
        }
        Ok(())
    }

    fn structure_applied(&self) {
        let slots = self.core.matrix().content_slots();
        if let Err(err) = self.page_size.set(slots.len()) {
            warn!(message = "paged.page_size_failed", error = %err);
        }
        *self.content_slots.borrow_mut() = slots;
    }

    fn bake_content(&self, slots: &mut [Option<SlotElement>]) -> Option<IndexChange> {
        let content_slots = self.content_slots.borrow();
        let page_size = content_slots.len();
        let requested = self.index.requested();
        let effective = if self.infinite.get() {
            requested
        } else {
            requested.min(self.page_count.get().saturating_sub(1))
        };
        let elements = self
            .content
            .with(|content| C::page_elements(content, effective, page_size));
        for (i, &slot) in content_slots.iter().enumerate() {
            slots[slot] = elements.get(i).cloned();
        }
        Some(IndexChange {
            requested,
            effective: Some(effective),
        })
    }

    fn index(&self) -> Option<&IndexState> {
        Some(&self.index)
    }
}

/// A gui showing its content one page at a time.
pub struct PagedGui<C: Content> {
    inner: Rc<PagedInner<C>>,
    gui: Gui,
}

/// A paged gui of items.
pub type PagedItemsGui = PagedGui<Item>;

/// A paged gui showing one nested gui per page.
pub type PagedNestedGui = PagedGui<Gui>;

impl<C: Content> PagedGui<C> {
    /// Create a paged gui without content, showing page 0.
    ///
    /// # Errors
    ///
    /// [`GuiError::NoContentSlots`] if `structure` has no content list
    /// markers.
    pub fn new(structure: &Structure) -> Result<Self> {
        let matrix = structure.resolve();
        if matrix.content_slots().is_empty() {
            return Err(GuiError::NoContentSlots);
        }
        let (inner, gui) = Gui::assemble(matrix, |core| {
            let content = ContentList::new();
            let page_size = Observable::new(0);
            let page_count = combine2(content.cell(), &page_size, |content, size| {
                C::page_count(content, *size)
            });
            PagedInner {
                core,
                content,
                page_size,
                page_count,
                index: IndexState::new(Property::of(0)),
                infinite: Cell::new(false),
                content_slots: RefCell::new(Vec::new()),
                bindings: RefCell::new(BindingScope::new()),
            }
        });
        inner.content.attach(&gui.0);
        inner.index.input.attach(&gui.0);
        gui.start();
        Ok(Self { inner, gui })
    }

    /// Create a paged gui showing `content`.
    ///
    /// # Errors
    ///
    /// See [`PagedGui::new`].
    pub fn with_content(structure: &Structure, content: Vec<C>) -> Result<Self> {
        let gui = Self::new(structure)?;
        gui.set_content(content);
        Ok(gui)
    }

    #[must_use]
    pub fn gui(&self) -> &Gui {
        &self.gui
    }

    // -- content -------------------------------------------------------------

    #[must_use]
    pub fn content(&self) -> Vec<C> {
        self.inner.content.get()
    }

    /// The currently bound content cell.
    #[must_use]
    pub fn content_property(&self) -> Property<Vec<C>> {
        self.inner.content.property()
    }

    /// Show `content`, detaching any bound content cell.
    pub fn set_content(&self, content: Vec<C>) {
        self.bind_content(Property::of(content));
    }

    /// Follow `content`.
    pub fn bind_content(&self, content: impl Into<Property<Vec<C>>>) {
        self.inner.content.bind(KIND, content.into());
    }

    // -- pages ---------------------------------------------------------------

    /// The page shown, after clamping.
    #[must_use]
    pub fn page(&self) -> usize {
        self.inner
            .index
            .current()
            .unwrap_or_else(|| self.inner.index.requested())
    }

    /// Request `page` by writing it to the bound page property.
    ///
    /// # Errors
    ///
    /// [`GuiError::Reactive`] if the page property is read-only.
    pub fn set_page(&self, page: usize) -> Result<()> {
        self.inner.index.request(page).map_err(GuiError::from)
    }

    /// Follow `page`. A mutable cell receives the clamped page.
    pub fn bind_page(&self, page: impl Into<Property<usize>>) {
        if self.inner.index.input.rebind(&self.gui.0, page.into()) {
            self.gui.0.core().request_bake();
        }
    }

    #[must_use]
    pub fn page_property(&self) -> Property<usize> {
        self.inner.index.input.property()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.inner.page_count.get()
    }

    /// Read-only cell of the page count.
    #[must_use]
    pub fn page_count_cell(&self) -> Observable<usize> {
        self.inner.page_count.clone()
    }

    /// Number of content slots per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.inner.page_size.get()
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.infinite_pages() || self.page() + 1 < self.page_count()
    }

    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.page() > 0
    }

    /// Go to the next page if there is one. Returns whether it moved.
    ///
    /// # Errors
    ///
    /// See [`PagedGui::set_page`].
    pub fn next_page(&self) -> Result<bool> {
        if !self.has_next_page() {
            return Ok(false);
        }
        self.set_page(self.page() + 1)?;
        Ok(true)
    }

    /// Go to the previous page if there is one. Returns whether it moved.
    ///
    /// # Errors
    ///
    /// See [`PagedGui::set_page`].
    pub fn previous_page(&self) -> Result<bool> {
        if !self.has_previous_page() {
            return Ok(false);
        }
        self.set_page(self.page() - 1)?;
        Ok(true)
    }

    #[must_use]
    pub fn infinite_pages(&self) -> bool {
        self.inner.infinite.get()
    }

    /// Allow pages past the last one.
    pub fn set_infinite_pages(&self, infinite: bool) {
        if self.inner.infinite.replace(infinite) != infinite {
            self.gui.0.core().request_bake();
        }
    }

    /// Run `handler(from, to)` whenever the shown page changes.
    pub fn add_page_change_handler(&self, handler: impl Fn(usize, usize) + 'static) {
        self.inner.index.add_handler(handler);
    }

    /// Run `handler(from, to)` whenever the page count changes.
    pub fn add_page_count_change_handler(&self, handler: impl Fn(usize, usize) + 'static) {
        let previous = Cell::new(self.page_count());
        self.inner
            .bindings
            .borrow_mut()
            .subscribe(&self.inner.page_count, move |&count| {
                let from = previous.replace(count);
                handler(from, count);
            });
    }
}

impl<C: Content> Clone for PagedGui<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            gui: self.gui.clone(),
        }
    }
}

impl<C: Content> std::ops::Deref for PagedGui<C> {
    type Target = Gui;

    fn deref(&self) -> &Gui {
        &self.gui
    }
}

impl<C: Content> From<PagedGui<C>> for Gui {
    fn from(gui: PagedGui<C>) -> Self {
        gui.gui
    }
}

impl<C: Content> std::fmt::Debug for PagedGui<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedGui")
            .field("gui", &self.gui)
            .field("page", &self.page())
            .field("page_count", &self.page_count())
            .finish()
    }
}
