#![forbid(unsafe_code)]

//! Error type for cell writes.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// A write reached a cell or property that is backed by a read-only source.
    #[error("unsupported write: {detail}")]
    UnsupportedWrite { detail: String },
}

impl ReactiveError {
    #[must_use]
    pub fn unsupported_write(detail: impl Into<String>) -> Self {
        Self::UnsupportedWrite {
            detail: detail.into(),
        }
    }

    /// Whether this error reports a write to a read-only source.
    #[must_use]
    pub fn is_unsupported_write(&self) -> bool {
        matches!(self, Self::UnsupportedWrite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = ReactiveError::unsupported_write("cell is constant");
        assert_eq!(err.to_string(), "unsupported write: cell is constant");
        assert!(err.is_unsupported_write());
    }
}
