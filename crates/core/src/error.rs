//! Error taxonomy shared by every analytics component.
//!
//! All errors are detected synchronously and returned to the caller. None of
//! them are transient, so nothing in the engine retries.

use thiserror::Error;

/// Errors produced by the analytics engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// A percentile was requested over zero elements.
    #[error("cannot compute a percentile over an empty input")]
    EmptyInput,

    /// Fewer observations were supplied than the computation requires.
    #[error("insufficient history: {required} required, {actual} supplied")]
    InsufficientHistory {
        /// Minimum number of observations needed.
        required: usize,
        /// Number of observations actually supplied.
        actual: usize,
    },

    /// A scalar input or configuration value is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The run observed its cancellation flag and stopped early.
    #[error("computation cancelled")]
    Cancelled,
}

impl AnalyticsError {
    /// Shorthand for an [`AnalyticsError::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Returns true when the caller can treat the error as "not enough data yet".
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InsufficientHistory { .. })
    }
}

/// Result alias used throughout the analytics crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_history_message_includes_counts() {
        let err = AnalyticsError::InsufficientHistory {
            required: 10,
            actual: 3,
        };

        assert_eq!(
            err.to_string(),
            "insufficient history: 10 required, 3 supplied"
        );
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn invalid_parameter_is_not_insufficient_data() {
        let err = AnalyticsError::invalid("payoff ratio must be >= 0");

        assert_eq!(err.to_string(), "invalid parameter: payoff ratio must be >= 0");
        assert!(!err.is_insufficient_data());
        assert!(!AnalyticsError::Cancelled.is_insufficient_data());
    }
}
