#![forbid(unsafe_code)]

//! Error type for gui construction and slot access.

use invgrid_reactive::ReactiveError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuiError {
    #[error("invalid structure: {reason}")]
    Structure { reason: String },

    #[error("structure is {found_width}x{found_height} but the gui is {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("structure has no content list slots")]
    NoContentSlots,

    #[error("scroll content slots mix horizontal and vertical markers")]
    InvalidLineLayout,

    #[error("slot {slot} is out of bounds for a gui of {size} slots")]
    SlotOutOfBounds { slot: usize, size: usize },

    #[error("region of {width}x{height} at ({x}, {y}) does not fit the gui")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Reactive(#[from] ReactiveError),
}

impl GuiError {
    #[must_use]
    pub fn structure(reason: impl Into<String>) -> Self {
        Self::Structure {
            reason: reason.into(),
        }
    }
}
