#![forbid(unsafe_code)]

//! Inventory gui components for invgrid.
//!
//! A gui is a grid of slots described by a [`Structure`]. Slots hold
//! [`Item`]s or links into other guis. On top of the plain [`NormalGui`]
//! this crate provides content-driven components:
//!
//! - [`PagedGui`]: content split into pages.
//! - [`ScrollGui`]: content laid out in lines and scrolled.
//! - [`TabGui`]: child guis switched by tab.
//!
//! Every input (content, page, line, tab, background) can be a literal or a
//! bound [`Property`](invgrid_reactive::Property). A changed input dirties
//! the gui and it rebakes once the current propagation has settled, pushing
//! changed slots to open viewers through a [`SlotSink`].
//!
//! Bakes that keep re-dirtying themselves are deferred; the host drives them
//! by calling [`tick`] once per server tick. The same tick drives slot
//! reveal [`Animation`]s.
//!
//! # Example
//!
//! ```
//! use invgrid_gui::{Item, Marker, PagedItemsGui, Structure};
//! use invgrid_reactive::Observable;
//!
//! let structure = Structure::new(&["x x x", "x x x", "x x x"])
//!     .unwrap()
//!     .ingredient('x', Marker::ContentListHorizontal);
//! let content: Vec<Item> = (0..25).map(|i| Item::new(format!("item{i}"))).collect();
//! let gui = PagedItemsGui::with_content(&structure, content).unwrap();
//!
//! let page = Observable::new(0);
//! gui.bind_page(&page);
//! page.set(5).unwrap();
//! assert_eq!(gui.page(), 2);
//! assert_eq!(page.get(), 2);
//! ```

pub mod animation;
pub mod bake;
pub mod config;
pub mod content;
pub mod error;
pub mod gui;
pub mod host;
mod index;
mod input;
pub mod item;
pub mod paged;
pub mod scroll;
pub mod slot;
pub mod structure;
pub mod tab;

pub use animation::{Animation, SlotSelector};
pub use bake::{BakeOutcome, BakeScheduler, BakeState, deferred_count, tick};
pub use config::{BakeConfig, config, configure};
pub use content::Content;
pub use error::{GuiError, Result};
pub use gui::{Gui, NormalGui};
pub use host::{Push, RecordingSink, SlotSink, ViewerId};
pub use item::{Click, ClickKind, Item};
pub use paged::{PagedGui, PagedItemsGui, PagedNestedGui};
pub use scroll::{ScrollGui, ScrollItemsGui, ScrollNestedGui};
pub use slot::{RenderedSlot, SlotElement};
pub use structure::{Ingredient, IngredientMatrix, Marker, Structure};
pub use tab::TabGui;
