#![forbid(unsafe_code)]

//! Declarative gui layouts.
//!
//! A [`Structure`] is a grid of ingredient keys, one string per row. Spaces
//! are ignored, so `"x x x"` and `"xxx"` describe the same row. Each key maps
//! to an [`Ingredient`]: a fixed slot element or a [`Marker`] that reserves
//! the slot for content. Keys without an ingredient produce empty slots.
//!
//! [`Structure::resolve`] turns the grid into an [`IngredientMatrix`], the
//! per-slot form components bake from.

use std::collections::BTreeMap;

use crate::error::{GuiError, Result};
use crate::item::Item;
use crate::slot::SlotElement;

/// Marks a slot as part of the content list.
///
/// Horizontal markers are filled row by row, vertical markers column by
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    ContentListHorizontal,
    ContentListVertical,
}

impl Marker {
    /// Slot indices of a `width` x `height` grid in this marker's fill order.
    fn order(self, width: usize, height: usize) -> Vec<usize> {
        match self {
            Self::ContentListHorizontal => (0..width * height).collect(),
            Self::ContentListVertical => (0..width)
                .flat_map(|x| (0..height).map(move |y| y * width + x))
                .collect(),
        }
    }
}

/// What a structure key stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingredient {
    Element(SlotElement),
    Marker(Marker),
}

impl From<SlotElement> for Ingredient {
    fn from(element: SlotElement) -> Self {
        Self::Element(element)
    }
}

impl From<Item> for Ingredient {
    fn from(item: Item) -> Self {
        Self::Element(SlotElement::Item(item))
    }
}

impl From<Marker> for Ingredient {
    fn from(marker: Marker) -> Self {
        Self::Marker(marker)
    }
}

/// A grid of ingredient keys plus the ingredients they map to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    width: usize,
    height: usize,
    keys: Vec<char>,
    ingredients: BTreeMap<char, Ingredient>,
}

impl Structure {
    /// Parse `rows` into a structure.
    ///
    /// # Errors
    ///
    /// [`GuiError::Structure`] if there are no rows, a row is empty, or rows
    /// differ in length.
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let parsed: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.as_ref().chars().filter(|c| !c.is_whitespace()).collect())
            .collect();
        let Some(first) = parsed.first() else {
            return Err(GuiError::structure("structure has no rows"));
        };
        let width = first.len();
        if width == 0 {
            return Err(GuiError::structure("structure rows are empty"));
        }
        if let Some((row, keys)) = parsed.iter().enumerate().find(|(_, keys)| keys.len() != width) {
            return Err(GuiError::structure(format!(
                "row {row} has {} slots, expected {width}",
                keys.len()
            )));
        }
        Ok(Self {
            width,
            height: parsed.len(),
            keys: parsed.into_iter().flatten().collect(),
            ingredients: BTreeMap::new(),
        })
    }

    /// Map `key` to `ingredient`, replacing an earlier mapping.
    #[must_use]
    pub fn ingredient(mut self, key: char, ingredient: impl Into<Ingredient>) -> Self {
        self.set_ingredient(key, ingredient);
        self
    }

    pub fn set_ingredient(&mut self, key: char, ingredient: impl Into<Ingredient>) {
        self.ingredients.insert(key, ingredient.into());
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// Key at `slot`, if in bounds.
    #[must_use]
    pub fn key(&self, slot: usize) -> Option<char> {
        self.keys.get(slot).copied()
    }

    /// Resolve every key into its slot element or marker.
    #[must_use]
    pub fn resolve(&self) -> IngredientMatrix {
        let mut elements = Vec::with_capacity(self.keys.len());
        let mut markers = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match self.ingredients.get(key) {
                Some(Ingredient::Element(element)) => {
                    elements.push(Some(element.clone()));
                    markers.push(None);
                }
                Some(Ingredient::Marker(marker)) => {
                    elements.push(None);
                    markers.push(Some(*marker));
                }
                None => {
                    elements.push(None);
                    markers.push(None);
                }
            }
        }
        IngredientMatrix {
            width: self.width,
            height: self.height,
            elements,
            markers,
        }
    }
}

/// Per-slot resolution of a [`Structure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientMatrix {
    width: usize,
    height: usize,
    elements: Vec<Option<SlotElement>>,
    markers: Vec<Option<Marker>>,
}

impl IngredientMatrix {
    /// A matrix of empty slots.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            elements: vec![None; width * height],
            markers: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Fixed elements, one per slot.
    #[must_use]
    pub fn elements(&self) -> &[Option<SlotElement>] {
        &self.elements
    }

    #[must_use]
    pub fn marker(&self, slot: usize) -> Option<Marker> {
        self.markers.get(slot).copied().flatten()
    }

    /// Slots carrying `marker`, in the marker's fill order.
    #[must_use]
    pub fn marker_slots(&self, marker: Marker) -> Vec<usize> {
        marker
            .order(self.width, self.height)
            .into_iter()
            .filter(|&slot| self.marker(slot) == Some(marker))
            .collect()
    }

    /// All content list slots: horizontal ones first, then vertical ones.
    #[must_use]
    pub fn content_slots(&self) -> Vec<usize> {
        let mut slots = self.marker_slots(Marker::ContentListHorizontal);
        slots.extend(self.marker_slots(Marker::ContentListVertical));
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_are_ignored() {
        let s = Structure::new(&["x x x", "# . #"]).expect("valid");
        assert_eq!((s.width(), s.height(), s.size()), (3, 2, 6));
        assert_eq!(s.key(3), Some('#'));
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Structure::new(&["xxx", "xx"]).expect_err("ragged");
        assert_eq!(
            err,
            GuiError::structure("row 1 has 2 slots, expected 3")
        );
    }

    #[test]
    fn empty_structure_rejected() {
        assert!(Structure::new::<&str>(&[]).is_err());
        assert!(Structure::new(&["   "]).is_err());
    }

    #[test]
    fn resolve_places_elements_and_markers() {
        let border = Item::new("border");
        let s = Structure::new(&["# x", "x ."])
            .expect("valid")
            .ingredient('#', border.clone())
            .ingredient('x', Marker::ContentListHorizontal);
        let m = s.resolve();
        assert_eq!(m.elements()[0], Some(SlotElement::Item(border)));
        assert_eq!(m.elements()[1], None);
        assert_eq!(m.marker(1), Some(Marker::ContentListHorizontal));
        assert_eq!(m.marker(3), None);
        assert_eq!(m.content_slots(), vec![1, 2]);
    }

    #[test]
    fn vertical_markers_fill_by_column() {
        let s = Structure::new(&["y y", "y y"])
            .expect("valid")
            .ingredient('y', Marker::ContentListVertical);
        assert_eq!(s.resolve().content_slots(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn horizontal_slots_precede_vertical() {
        let s = Structure::new(&["v x", "x v"])
            .expect("valid")
            .ingredient('x', Marker::ContentListHorizontal)
            .ingredient('v', Marker::ContentListVertical);
        assert_eq!(s.resolve().content_slots(), vec![1, 2, 0, 3]);
    }

    #[test]
    fn later_ingredient_wins() {
        let a = Item::new("a");
        let b = Item::new("b");
        let s = Structure::new(&["k"])
            .expect("valid")
            .ingredient('k', a)
            .ingredient('k', b.clone());
        assert_eq!(s.resolve().elements()[0], Some(SlotElement::Item(b)));
    }
}
