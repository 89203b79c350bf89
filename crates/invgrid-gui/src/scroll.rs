#![forbid(unsafe_code)]

//! Scroll guis.
//!
//! A [`ScrollGui`] lays its content out in lines and shows a window of
//! consecutive lines starting at the current line.
//!
//! Lines follow the content list markers. With horizontal markers a line is
//! a row of the bounding box around the content slots; with vertical markers
//! it is a column. Box cells that are not content slots keep their place in
//! the line, so the element that would land there is simply not shown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_reactive::Property;

use crate::content::{Content, ContentList};
use crate::error::{GuiError, Result};
use crate::gui::{Component, Gui, GuiCore};
use crate::index::{IndexChange, IndexState};
use crate::item::Item;
use crate::slot::SlotElement;
use crate::structure::{IngredientMatrix, Marker, Structure};

const KIND: &str = "scroll";

/// How content elements map onto content slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LineLayout {
    /// Elements per line.
    line_length: usize,
    /// Lines visible at once.
    line_amount: usize,
    /// `(position in the visible window, slot)` per content slot.
    cells: Vec<(usize, usize)>,
}

impl LineLayout {
    fn from_matrix(matrix: &IngredientMatrix) -> Result<Self> {
        let horizontal = matrix.marker_slots(Marker::ContentListHorizontal);
        let vertical = matrix.marker_slots(Marker::ContentListVertical);
        let (slots, is_vertical) = match (horizontal.is_empty(), vertical.is_empty()) {
            (true, true) => return Err(GuiError::NoContentSlots),
            (false, false) => return Err(GuiError::InvalidLineLayout),
            (false, true) => (horizontal, false),
            (true, false) => (vertical, true),
        };

        let width = matrix.width();
        let xs = slots.iter().map(|slot| slot % width);
        let ys = slots.iter().map(|slot| slot / width);
        let (min_x, max_x) = (xs.clone().min().unwrap_or(0), xs.max().unwrap_or(0));
        let (min_y, max_y) = (ys.clone().min().unwrap_or(0), ys.max().unwrap_or(0));
        let box_width = max_x - min_x + 1;
        let box_height = max_y - min_y + 1;

        let cells = slots
            .iter()
            .map(|&slot| {
                let x = slot % width - min_x;
                let y = slot / width - min_y;
                let position = if is_vertical {
                    x * box_height + y
                } else {
                    y * box_width + x
                };
                (position, slot)
            })
            .collect();

        let (line_length, line_amount) = if is_vertical {
            (box_height, box_width)
        } else {
            (box_width, box_height)
        };
        Ok(Self {
            line_length,
            line_amount,
            cells,
        })
    }

    fn line_count(&self, elements: usize) -> usize {
        elements.div_ceil(self.line_length.max(1))
    }

    fn max_line(&self, elements: usize) -> usize {
        self.line_count(elements).saturating_sub(self.line_amount)
    }
}

struct ScrollInner<C: Content> {
    core: GuiCore,
    content: ContentList<C>,
    layout: RefCell<LineLayout>,
    index: IndexState,
    infinite: Cell<bool>,
}

impl<C: Content> ScrollInner<C> {
    fn element_count(&self) -> usize {
        self.content.with(|content| C::line_elements(content).len())
    }
}

impl<C: Content> Component for ScrollInner<C> {
    fn core(&self) -> &GuiCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    fn check_structure(&self, matrix: &IngredientMatrix) -> Result<()> {
        LineLayout::from_matrix(matrix).map(|_| ())
    }

    fn structure_applied(&self) {
        // The matrix was validated by `check_structure` or the constructor.
        if let Ok(layout) = LineLayout::from_matrix(&self.core.matrix()) {
            *self.layout.borrow_mut() = layout;
        }
    }

    fn bake_content(&self, slots: &mut [Option<SlotElement>]) -> Option<IndexChange> {
        let layout = self.layout.borrow();
        let elements = self.content.with(|content| C::line_elements(content));
        let requested = self.index.requested();
        let effective = if self.infinite.get() {
            requested
        } else {
            requested.min(layout.max_line(elements.len()))
        };
        let offset = effective.saturating_mul(layout.line_length);
        for &(position, slot) in &layout.cells {
            slots[slot] = offset
                .checked_add(position)
                .and_then(|index| elements.get(index))
                .cloned();
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

/// A gui scrolling through its content line by line.
pub struct ScrollGui<C: Content> {
    inner: Rc<ScrollInner<C>>,
    gui: Gui,
}

/// A scroll gui of items.
pub type ScrollItemsGui = ScrollGui<Item>;

/// A scroll gui whose lines are the rows of nested guis.
pub type ScrollNestedGui = ScrollGui<Gui>;

impl<C: Content> ScrollGui<C> {
    /// Create a scroll gui without content, showing line 0.
    ///
    /// # Errors
    ///
    /// [`GuiError::NoContentSlots`] if `structure` has no content list
    /// markers, [`GuiError::InvalidLineLayout`] if it mixes horizontal and
    /// vertical ones.
    pub fn new(structure: &Structure) -> Result<Self> {
        let matrix = structure.resolve();
        let layout = LineLayout::from_matrix(&matrix)?;
        let (inner, gui) = Gui::assemble(matrix, |core| ScrollInner {
            core,
            content: ContentList::new(),
            layout: RefCell::new(layout),
            index: IndexState::new(Property::of(0)),
            infinite: Cell::new(false),
        });
        inner.content.attach(&gui.0);
        inner.index.input.attach(&gui.0);
        gui.start();
        Ok(Self { inner, gui })
    }

    /// Create a scroll gui showing `content`.
    ///
    /// # Errors
    ///
    /// See [`ScrollGui::new`].
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

    // -- lines ---------------------------------------------------------------

    /// First visible line, after clamping.
    #[must_use]
    pub fn line(&self) -> usize {
        self.inner
            .index
            .current()
            .unwrap_or_else(|| self.inner.index.requested())
    }

    /// Request `line` by writing it to the bound line property.
    ///
    /// # Errors
    ///
    /// [`GuiError::Reactive`] if the line property is read-only.
    pub fn set_line(&self, line: usize) -> Result<()> {
        self.inner.index.request(line).map_err(GuiError::from)
    }

    /// Follow `line`. A mutable cell receives the clamped line.
    pub fn bind_line(&self, line: impl Into<Property<usize>>) {
        if self.inner.index.input.rebind(&self.gui.0, line.into()) {
            self.gui.0.core().request_bake();
        }
    }

    #[must_use]
    pub fn line_property(&self) -> Property<usize> {
        self.inner.index.input.property()
    }

    /// Elements per line.
    #[must_use]
    pub fn line_length(&self) -> usize {
        self.inner.layout.borrow().line_length
    }

    /// Lines visible at once.
    #[must_use]
    pub fn line_amount(&self) -> usize {
        self.inner.layout.borrow().line_amount
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        let elements = self.inner.element_count();
        self.inner.layout.borrow().line_count(elements)
    }

    /// Highest first line that still fills the window.
    #[must_use]
    pub fn max_line(&self) -> usize {
        let elements = self.inner.element_count();
        self.inner.layout.borrow().max_line(elements)
    }

    /// Whether scrolling by `lines` would move to a valid line.
    #[must_use]
    pub fn can_scroll(&self, lines: isize) -> bool {
        if lines == 0 {
            return false;
        }
        match self.line().checked_add_signed(lines) {
            None => false,
            Some(_) if self.infinite_lines() => true,
            Some(target) => target <= self.max_line(),
        }
    }

    /// Move the window by `lines`, stopping at the first and last line.
    ///
    /// # Errors
    ///
    /// See [`ScrollGui::set_line`].
    pub fn scroll(&self, lines: isize) -> Result<()> {
        if lines == 0 {
            return Ok(());
        }
        let target = self.line().saturating_add_signed(lines);
        let target = if self.infinite_lines() {
            target
        } else {
            target.min(self.max_line())
        };
        self.set_line(target)
    }

    #[must_use]
    pub fn infinite_lines(&self) -> bool {
        self.inner.infinite.get()
    }

    /// Allow scrolling past the last line.
    pub fn set_infinite_lines(&self, infinite: bool) {
        if self.inner.infinite.replace(infinite) != infinite {
            self.gui.0.core().request_bake();
        }
    }

    /// Run `handler(from, to)` whenever the first visible line changes.
    pub fn add_scroll_handler(&self, handler: impl Fn(usize, usize) + 'static) {
        self.inner.index.add_handler(handler);
    }
}

impl<C: Content> Clone for ScrollGui<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            gui: self.gui.clone(),
        }
    }
}

impl<C: Content> std::ops::Deref for ScrollGui<C> {
    type Target = Gui;

    fn deref(&self) -> &Gui {
        &self.gui
    }
}

impl<C: Content> From<ScrollGui<C>> for Gui {
    fn from(gui: ScrollGui<C>) -> Self {
        gui.gui
    }
}

impl<C: Content> std::fmt::Debug for ScrollGui<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollGui")
            .field("gui", &self.gui)
            .field("line", &self.line())
            .field("max_line", &self.max_line())
            .finish()
    }
}
