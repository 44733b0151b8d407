//! Ratio values that may legitimately be infinite.
//!
//! Profit factor and average reward/risk divide by a loss magnitude that is
//! zero for strategies that never lost. Those cases are kept as a distinct
//! [`Ratio::Infinite`] value instead of a large finite stand-in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-negative ratio with an explicit infinite case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// A finite ratio.
    Finite(f64),
    /// Positive numerator over a zero denominator.
    Infinite,
}

impl Ratio {
    /// Value substituted for [`Ratio::Infinite`] when a ratio must fit a
    /// numeric storage column.
    pub const STORAGE_INFINITY: f64 = 999.0;

    /// Divides `numerator` by `denominator`.
    ///
    /// A zero denominator yields `Infinite` when the numerator is positive
    /// and `Finite(0.0)` otherwise.
    #[must_use]
    pub fn from_parts(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            Self::Finite(numerator / denominator)
        } else if numerator > 0.0 {
            Self::Infinite
        } else {
            Self::Finite(0.0)
        }
    }

    /// Returns true for the infinite case.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Returns the finite value, if any.
    #[must_use]
    pub fn finite(&self) -> Option<f64> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Infinite => None,
        }
    }

    /// Converts to `f64`, mapping `Infinite` to `f64::INFINITY`.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Finite(value) => *value,
            Self::Infinite => f64::INFINITY,
        }
    }

    /// Lossy conversion for storage columns that cannot hold infinity.
    ///
    /// Only call this at a serialization boundary.
    #[must_use]
    pub fn to_storage_value(&self) -> f64 {
        match self {
            Self::Finite(value) => *value,
            Self::Infinite => Self::STORAGE_INFINITY,
        }
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self::Finite(0.0)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(value) => fmt::Display::fmt(value, f),
            Self::Infinite => f.write_str("∞"),
        }
    }
}
