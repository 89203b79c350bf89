#![forbid(unsafe_code)]

//! invgrid public facade crate.
//!
//! Re-exports the reactive cells and the gui components behind one
//! dependency. Most users only need the [`prelude`].

pub use invgrid_gui as gui;
pub use invgrid_reactive as reactive;

pub mod prelude {
    pub use invgrid_gui::{
        Animation, Click, ClickKind, Content, Gui, GuiError, Item, Marker, NormalGui, PagedGui,
        PagedItemsGui, PagedNestedGui, RenderedSlot, ScrollGui, ScrollItemsGui,
        ScrollNestedGui, SlotElement, SlotSelector, SlotSink, Structure, TabGui, ViewerId,
    };
    pub use invgrid_reactive::{
        BindingScope, Observable, Property, ReactiveError, Subscription, TwoWayBinding, batch,
        combine2, combine3, combine4, combine_all, flatten,
    };
}
