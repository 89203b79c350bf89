#![forbid(unsafe_code)]

//! Slot reveal animations.
//!
//! An [`Animation`] hides the slots of a gui and reveals them frame by
//! frame, one frame every `tick_delay` calls of [`crate::tick`]. A hidden
//! slot shows its intermediary element, or nothing. The gui keeps baking
//! underneath: the animation only masks what viewers see.
//!
//! # Invariants
//!
//! 1. Every frame reveals at least one hidden slot, so an animation over `n`
//!    slots finishes after at most `n` frames.
//! 2. Finish handlers run exactly once, when the last slot is revealed or the
//!    animation is cancelled.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::slot::SlotElement;

/// Order in which slots are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotSelector {
    /// One column per frame, left to right.
    Column,
    /// One row per frame, top to bottom.
    Row,
    /// One slot per frame, right along the first row, left along the next.
    HorizontalSnake,
    /// One slot per frame, down the first column, up the next.
    VerticalSnake,
    /// One slot per frame in slot order.
    Sequential,
    /// Two slots per frame, from the first and the last slot inwards.
    SplitSequential,
}

type SlotFilter = Rc<dyn Fn(usize, usize) -> bool>;
type Intermediary = Rc<dyn Fn(usize, usize) -> Option<SlotElement>>;
type ShowHandler = Rc<dyn Fn(&[usize])>;
type FinishHandler = Rc<dyn Fn()>;

/// Description of a reveal animation, played with
/// [`Gui::play_animation`](crate::Gui::play_animation).
#[derive(Clone)]
pub struct Animation {
    selector: SlotSelector,
    tick_delay: u32,
    filters: Vec<SlotFilter>,
    intermediary: Option<Intermediary>,
    show_handlers: Vec<ShowHandler>,
    finish_handlers: Vec<FinishHandler>,
}

impl Animation {
    /// Reveal every slot in `selector` order, one frame per tick.
    #[must_use]
    pub fn new(selector: SlotSelector) -> Self {
        Self {
            selector,
            tick_delay: 1,
            filters: Vec::new(),
            intermediary: None,
            show_handlers: Vec::new(),
            finish_handlers: Vec::new(),
        }
    }

    /// Ticks between two frames. Zero is treated as one.
    #[must_use]
    pub fn with_tick_delay(mut self, ticks: u32) -> Self {
        self.tick_delay = ticks.max(1);
        self
    }

    /// Only animate slots at `(x, y)` for which `filter` returns `true`.
    /// Filters combine with a logical and.
    #[must_use]
    pub fn with_slot_filter(mut self, filter: impl Fn(usize, usize) -> bool + 'static) -> Self {
        self.filters.push(Rc::new(filter));
        self
    }

    /// Element shown in a hidden slot at `(x, y)` until it is revealed.
    #[must_use]
    pub fn with_intermediary(
        mut self,
        intermediary: impl Fn(usize, usize) -> Option<SlotElement> + 'static,
    ) -> Self {
        self.intermediary = Some(Rc::new(intermediary));
        self
    }

    /// Run `handler` with the slots revealed by each frame.
    #[must_use]
    pub fn on_show(mut self, handler: impl Fn(&[usize]) + 'static) -> Self {
        self.show_handlers.push(Rc::new(handler));
        self
    }

    /// Run `handler` when the animation finishes or is cancelled.
    #[must_use]
    pub fn on_finish(mut self, handler: impl Fn() + 'static) -> Self {
        self.finish_handlers.push(Rc::new(handler));
        self
    }

    #[must_use]
    pub fn selector(&self) -> SlotSelector {
        self.selector
    }

    #[must_use]
    pub fn tick_delay(&self) -> u32 {
        self.tick_delay
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("selector", &self.selector)
            .field("tick_delay", &self.tick_delay)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Cursor {
    x: usize,
    y: usize,
    reverse: bool,
    front: usize,
    back: usize,
}

/// A running animation on one gui.
pub(crate) struct AnimationState {
    animation: Animation,
    width: usize,
    height: usize,
    /// Hidden slots and the element each shows meanwhile.
    hidden: BTreeMap<usize, Option<SlotElement>>,
    cursor: Cursor,
    frame: u64,
    wait: u32,
}

impl AnimationState {
    pub(crate) fn new(animation: Animation, width: usize, height: usize) -> Self {
        let mut hidden = BTreeMap::new();
        for y in 0..height {
            for x in 0..width {
                if animation.filters.iter().all(|filter| filter(x, y)) {
                    let shown = animation.intermediary.as_ref().and_then(|f| f(x, y));
                    hidden.insert(y * width + x, shown);
                }
            }
        }
        Self {
            animation,
            width,
            height,
            hidden,
            cursor: Cursor::default(),
            frame: 0,
            wait: 0,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.hidden.is_empty()
    }

    pub(crate) fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }

    /// Replace hidden slots with their intermediary elements.
    pub(crate) fn mask(&self, slots: &mut [Option<SlotElement>]) {
        for (&slot, shown) in &self.hidden {
            if let Some(target) = slots.get_mut(slot) {
                target.clone_from(shown);
            }
        }
    }

    /// Count one tick. Returns the slots revealed if a frame was due.
    pub(crate) fn advance(&mut self) -> Option<Vec<usize>> {
        if self.wait > 0 {
            self.wait -= 1;
            return None;
        }
        self.wait = self.animation.tick_delay - 1;
        let mut revealed = self.select();
        if revealed.is_empty() {
            revealed = self.hidden.keys().copied().collect();
        }
        for slot in &revealed {
            self.hidden.remove(slot);
        }
        self.frame += 1;
        Some(revealed)
    }

    pub(crate) fn show_handlers(&self) -> Vec<ShowHandler> {
        self.animation.show_handlers.clone()
    }

    pub(crate) fn finish_handlers(&self) -> Vec<FinishHandler> {
        self.animation.finish_handlers.clone()
    }

    fn is_hidden(&self, x: usize, y: usize) -> bool {
        self.hidden.contains_key(&(y * self.width + x))
    }

    fn select(&mut self) -> Vec<usize> {
        let (width, height) = (self.width, self.height);
        let size = width * height;
        let mut slots = Vec::new();
        match self.animation.selector {
            SlotSelector::Column => {
                while slots.is_empty() && self.cursor.x < width {
                    let x = self.cursor.x;
                    slots.extend((0..height).filter(|&y| self.is_hidden(x, y)).map(|y| y * width + x));
                    self.cursor.x += 1;
                }
            }
            SlotSelector::Row => {
                while slots.is_empty() && self.cursor.y < height {
                    let y = self.cursor.y;
                    slots.extend((0..width).filter(|&x| self.is_hidden(x, y)).map(|x| y * width + x));
                    self.cursor.y += 1;
                }
            }
            SlotSelector::HorizontalSnake => {
                let Cursor { mut x, mut y, mut reverse, .. } = self.cursor;
                while y < height {
                    if self.is_hidden(x, y) {
                        slots.push(y * width + x);
                        break;
                    }
                    if reverse {
                        if x == 0 {
                            y += 1;
                            reverse = false;
                        } else {
                            x -= 1;
                        }
                    } else if x + 1 >= width {
                        y += 1;
                        reverse = true;
                    } else {
                        x += 1;
                    }
                }
                (self.cursor.x, self.cursor.y, self.cursor.reverse) = (x, y, reverse);
            }
            SlotSelector::VerticalSnake => {
                let Cursor { mut x, mut y, mut reverse, .. } = self.cursor;
                while x < width {
                    if self.is_hidden(x, y) {
                        slots.push(y * width + x);
                        break;
                    }
                    if reverse {
                        if y == 0 {
                            x += 1;
                            reverse = false;
                        } else {
                            y -= 1;
                        }
                    } else if y + 1 >= height {
                        x += 1;
                        reverse = true;
                    } else {
                        y += 1;
                    }
                }
                (self.cursor.x, self.cursor.y, self.cursor.reverse) = (x, y, reverse);
            }
            SlotSelector::Sequential => {
                while self.cursor.front < size {
                    let slot = self.cursor.front;
                    if self.hidden.contains_key(&slot) {
                        slots.push(slot);
                        break;
                    }
                    self.cursor.front += 1;
                }
            }
            SlotSelector::SplitSequential => {
                while self.cursor.front < size {
                    let slot = self.cursor.front;
                    if self.hidden.contains_key(&slot) {
                        slots.push(slot);
                        break;
                    }
                    self.cursor.front += 1;
                }
                while self.cursor.back < size {
                    let slot = size - 1 - self.cursor.back;
                    if self.hidden.contains_key(&slot) {
                        if !slots.contains(&slot) {
                            slots.push(slot);
                        }
                        break;
                    }
                    self.cursor.back += 1;
                }
            }
        }
        slots
    }
}
