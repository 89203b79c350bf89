#![forbid(unsafe_code)]

//! Per-thread configuration of the propagation runtime.

use crate::runtime;

/// Default upper bound on propagation cycles processed by one flush.
pub const DEFAULT_MAX_FLUSH_CYCLES: usize = 10_000;

/// Tuning knobs for the propagation runtime.
///
/// A flush runs one cycle for the write that started it plus one cycle per
/// write queued from a callback, compute function or effect. Once
/// `max_flush_cycles` is reached the remaining queued writes are dropped and
/// an error event is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReactiveConfig {
    pub max_flush_cycles: usize,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            max_flush_cycles: DEFAULT_MAX_FLUSH_CYCLES,
        }
    }
}

impl ReactiveConfig {
    /// Set the flush cycle bound. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_flush_cycles(mut self, cycles: usize) -> Self {
        self.max_flush_cycles = cycles.max(1);
        self
    }
}

/// Install `config` for the current thread.
pub fn configure(config: ReactiveConfig) {
    runtime::set_config(config);
}

/// Configuration active on the current thread.
#[must_use]
pub fn config() -> ReactiveConfig {
    runtime::config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bound() {
        assert_eq!(
            ReactiveConfig::default().max_flush_cycles,
            DEFAULT_MAX_FLUSH_CYCLES
        );
    }

    #[test]
    fn builder_clamps_zero() {
        let config = ReactiveConfig::default().with_max_flush_cycles(0);
        assert_eq!(config.max_flush_cycles, 1);
    }

    #[test]
    fn configure_is_thread_local() {
        configure(ReactiveConfig::default().with_max_flush_cycles(3));
        assert_eq!(config().max_flush_cycles, 3);
        let other = std::thread::spawn(|| config().max_flush_cycles)
            .join()
            .expect("thread join");
        assert_eq!(other, DEFAULT_MAX_FLUSH_CYCLES);
        configure(ReactiveConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_fills_missing_fields() {
        let config: ReactiveConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, ReactiveConfig::default());
    }
}
