#![forbid(unsafe_code)]

//! Per-thread configuration of the bake scheduler.

use std::cell::Cell;

/// Default number of follow-up bakes allowed within one bake run.
pub const DEFAULT_MAX_REBAKES: usize = 8;

/// Tuning knobs for the bake scheduler.
///
/// A bake run performs one pass plus up to `max_rebakes` follow-up passes
/// for inputs that changed while it was baking. Anything beyond that is
/// deferred to the next [`tick`](crate::tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BakeConfig {
    pub max_rebakes: usize,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            max_rebakes: DEFAULT_MAX_REBAKES,
        }
    }
}

impl BakeConfig {
    #[must_use]
    pub fn with_max_rebakes(mut self, max_rebakes: usize) -> Self {
        self.max_rebakes = max_rebakes;
        self
    }
}

thread_local! {
    static CONFIG: Cell<BakeConfig> = Cell::new(BakeConfig::default());
}

/// Install `config` for the current thread.
pub fn configure(config: BakeConfig) {
    CONFIG.with(|c| c.set(config));
}

/// Configuration active on the current thread.
#[must_use]
pub fn config() -> BakeConfig {
    CONFIG.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(config(), BakeConfig::default());
        assert_eq!(BakeConfig::default().max_rebakes, DEFAULT_MAX_REBAKES);
    }

    #[test]
    fn configure_roundtrip() {
        configure(BakeConfig::default().with_max_rebakes(2));
        assert_eq!(config().max_rebakes, 2);
        configure(BakeConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let config = BakeConfig::default().with_max_rebakes(3);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: BakeConfig = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, config);
    }
}
