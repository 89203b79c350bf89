#![forbid(unsafe_code)]

//! Tab guis.
//!
//! A [`TabGui`] shows one of several child guis in its content slots.
//! Content slot `i` links to slot `i` of the current tab. Tabs may be
//! `None`, marking them unavailable; selecting one falls back to the first
//! available tab.

use std::rc::Rc;

use invgrid_reactive::{Property, batch};
use tracing::debug;

use crate::error::{GuiError, Result};
use crate::gui::{Component, Gui, GuiCore};
use crate::index::{IndexChange, IndexState};
use crate::input::ReactiveInput;
use crate::slot::SlotElement;
use crate::structure::{IngredientMatrix, Structure};

const KIND: &str = "tab";

/// Tab shown when `requested` is selected from `tabs`.
fn effective_tab(tabs: &[Option<Gui>], requested: usize) -> Option<usize> {
    let last = tabs.len().checked_sub(1)?;
    let clamped = requested.min(last);
    if tabs[clamped].is_some() {
        Some(clamped)
    } else {
        tabs.iter().position(Option::is_some)
    }
}

struct TabInner {
    core: GuiCore,
    tabs: ReactiveInput<Vec<Option<Gui>>>,
    index: IndexState,
}

impl Component for TabInner {
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

    fn bake_content(&self, slots: &mut [Option<SlotElement>]) -> Option<IndexChange> {
        let content_slots = self.core.matrix().content_slots();
        let requested = self.index.requested();
        let (effective, shown) = self.tabs.property().with(|tabs| {
            let effective = effective_tab(tabs, requested);
            let shown = effective.and_then(|tab| tabs[tab].clone());
            (effective, shown)
        });
        for (i, &slot) in content_slots.iter().enumerate() {
            slots[slot] = shown
                .as_ref()
                .filter(|gui| i < gui.size())
                .map(|gui| SlotElement::link(gui, i));
        }
        Some(IndexChange {
            requested,
            effective,
        })
    }

    fn index(&self) -> Option<&IndexState> {
        Some(&self.index)
    }
}

/// A gui switching between child guis.
#[derive(Clone)]
pub struct TabGui {
    inner: Rc<TabInner>,
    gui: Gui,
}

impl TabGui {
    /// Create a tab gui without tabs.
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
        let (inner, gui) = Gui::assemble(matrix, |core| TabInner {
            core,
            tabs: ReactiveInput::new(Property::of(Vec::new())),
            index: IndexState::new(Property::of(0)),
        });
        inner.tabs.attach(&gui.0);
        inner.index.input.attach(&gui.0);
        gui.start();
        Ok(Self { inner, gui })
    }

    /// Create a tab gui showing the first available of `tabs`.
    ///
    /// # Errors
    ///
    /// See [`TabGui::new`].
    pub fn with_tabs(structure: &Structure, tabs: Vec<Option<Gui>>) -> Result<Self> {
        let gui = Self::new(structure)?;
        gui.set_tabs(tabs);
        Ok(gui)
    }

    #[must_use]
    pub fn gui(&self) -> &Gui {
        &self.gui
    }

    // -- tabs ----------------------------------------------------------------

    #[must_use]
    pub fn tabs(&self) -> Vec<Option<Gui>> {
        self.inner.tabs.get()
    }

    #[must_use]
    pub fn tabs_property(&self) -> Property<Vec<Option<Gui>>> {
        self.inner.tabs.property()
    }

    /// Show `tabs`, detaching any bound tabs cell, and select the first
    /// available one.
    pub fn set_tabs(&self, tabs: Vec<Option<Gui>>) {
        self.bind_tabs(Property::of(tabs));
    }

    /// Follow `tabs` and select the first available one.
    pub fn bind_tabs(&self, tabs: impl Into<Property<Vec<Option<Gui>>>>) {
        let tabs = tabs.into();
        batch(|| {
            let first = tabs.with(|tabs| tabs.iter().position(Option::is_some));
            if self.inner.tabs.rebind(&self.gui.0, tabs) {
                self.gui.0.core().request_bake();
            }
            if let Some(first) = first {
                if let Err(err) = self.inner.index.request(first) {
                    debug!(message = "tab.select_failed", error = %err);
                }
            }
        });
    }

    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.inner.tabs.property().with(Vec::len)
    }

    #[must_use]
    pub fn is_tab_available(&self, tab: usize) -> bool {
        self.inner
            .tabs
            .property()
            .with(|tabs| matches!(tabs.get(tab), Some(Some(_))))
    }

    // -- current tab ---------------------------------------------------------

    /// The tab shown, or `None` if no tab is available.
    #[must_use]
    pub fn current_tab(&self) -> Option<usize> {
        self.inner.index.current()
    }

    /// Request `tab` by writing it to the bound tab property.
    ///
    /// # Errors
    ///
    /// [`GuiError::Reactive`] if the tab property is read-only.
    pub fn set_tab(&self, tab: usize) -> Result<()> {
        self.inner.index.request(tab).map_err(GuiError::from)
    }

    /// Follow `tab`. A mutable cell receives the effective tab.
    pub fn bind_tab(&self, tab: impl Into<Property<usize>>) {
        if self.inner.index.input.rebind(&self.gui.0, tab.into()) {
            self.gui.0.core().request_bake();
        }
    }

    #[must_use]
    pub fn tab_property(&self) -> Property<usize> {
        self.inner.index.input.property()
    }

    /// Run `handler(from, to)` whenever the shown tab changes.
    pub fn add_tab_change_handler(&self, handler: impl Fn(usize, usize) + 'static) {
        self.inner.index.add_handler(handler);
    }
}

impl std::ops::Deref for TabGui {
    type Target = Gui;

    fn deref(&self) -> &Gui {
        &self.gui
    }
}

impl From<TabGui> for Gui {
    fn from(gui: TabGui) -> Self {
        gui.gui
    }
}

impl PartialEq for TabGui {
    fn eq(&self, other: &Self) -> bool {
        self.gui == other.gui
    }
}

impl Eq for TabGui {}

impl std::fmt::Debug for TabGui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabGui")
            .field("gui", &self.gui)
            .field("tab", &self.current_tab())
            .field("tab_count", &self.tab_count())
            .finish()
    }
}
