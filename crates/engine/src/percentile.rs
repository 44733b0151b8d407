//! Order-statistic estimation with linear interpolation between ranks.
//!
//! Every percentile in the engine (Monte Carlo bands, terminal statistics,
//! bootstrap confidence intervals) goes through this module so the
//! interpolation rule is identical everywhere.
//!
//! For `n` sorted values the fractional rank of percentile `p` is
//! ```text
//! r = p / 100 * (n - 1)
//! ```
//! and the result is interpolated between `values[floor(r)]` and
//! `values[ceil(r)]` by the fractional part of `r`.

use serde::{Deserialize, Serialize};
use trade_analytics_core::{AnalyticsError, Result};

/// Computes the `p`-th percentile (0..=100) of `values`.
///
/// The input does not need to be sorted; a sorted copy is made.
///
/// # Errors
/// * `EmptyInput` when `values` is empty
/// * `InvalidParameter` when `p` is outside `[0, 100]`
///
/// # Examples
/// ```
/// use trade_analytics_engine::percentile::percentile;
///
/// let p50 = percentile(&[4.0, 1.0, 3.0, 2.0], 50.0).unwrap();
/// assert!((p50 - 2.5).abs() < 1e-12);
/// ```
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    check_level(p)?;
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let sorted = sorted_copy(values);
    percentile_sorted(&sorted, p)
}

/// Computes several percentiles of `values`, sorting only once.
///
/// # Errors
/// Same as [`percentile`].
pub fn percentiles(values: &[f64], levels: &[f64]) -> Result<Vec<f64>> {
    for &p in levels {
        check_level(p)?;
    }
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    let sorted = sorted_copy(values);
    levels.iter().map(|&p| percentile_sorted(&sorted, p)).collect()
}

/// Computes the `p`-th percentile of an already ascending-sorted slice.
///
/// # Errors
/// Same as [`percentile`].
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Result<f64> {
    check_level(p)?;
    let n = sorted.len();
    match n {
        0 => Err(AnalyticsError::EmptyInput),
        1 => Ok(sorted[0]),
        _ => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = (rank.ceil() as usize).min(n - 1);
            if lo == hi {
                return Ok(sorted[lo]);
            }
            let frac = rank - lo as f64;
            Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
        }
    }
}

/// Returns an ascending-sorted copy of `values`.
#[must_use]
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn check_level(p: f64) -> Result<()> {
    if p.is_finite() && (0.0..=100.0).contains(&p) {
        Ok(())
    } else {
        Err(AnalyticsError::invalid(format!(
            "percentile level must be within [0, 100], got {p}"
        )))
    }
}

/// The three percentile levels reported for bands and confidence intervals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileLevels {
    /// Lower level, 5 by default.
    pub lower: f64,
    /// Central level, 50 by default.
    pub median: f64,
    /// Upper level, 95 by default.
    pub upper: f64,
}

impl Default for PercentileLevels {
    fn default() -> Self {
        Self {
            lower: 5.0,
            median: 50.0,
            upper: 95.0,
        }
    }
}

impl PercentileLevels {
    #[must_use]
    pub fn new(lower: f64, median: f64, upper: f64) -> Self {
        Self {
            lower,
            median,
            upper,
        }
    }

    /// Checks that all levels are in `[0, 100]` and ordered.
    ///
    /// # Errors
    /// Returns `InvalidParameter` otherwise.
    pub fn validate(&self) -> Result<()> {
        check_level(self.lower)?;
        check_level(self.median)?;
        check_level(self.upper)?;
        if self.lower <= self.median && self.median <= self.upper {
            Ok(())
        } else {
            Err(AnalyticsError::invalid(format!(
                "percentile levels must satisfy lower <= median <= upper, got {}/{}/{}",
                self.lower, self.median, self.upper
            )))
        }
    }

    /// Evaluates (lower, median, upper) over an ascending-sorted slice.
    ///
    /// # Errors
    /// `EmptyInput` for an empty slice.
    pub fn evaluate_sorted(&self, sorted: &[f64]) -> Result<(f64, f64, f64)> {
        Ok((
            percentile_sorted(sorted, self.lower)?,
            percentile_sorted(sorted, self.median)?,
            percentile_sorted(sorted, self.upper)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn extremes_match_min_and_max() {
        let values = [3.0, -1.0, 7.5, 2.0, 4.0];

        assert!((percentile(&values, 0.0).unwrap() - -1.0).abs() < EPS);
        assert!((percentile(&values, 100.0).unwrap() - 7.5).abs() < EPS);
    }

    #[test]
    fn median_odd_length_is_middle_element() {
        let values = [5.0, 1.0, 3.0];
        assert!((percentile(&values, 50.0).unwrap() - 3.0).abs() < EPS);
    }

    #[test]
    fn median_even_length_averages_middle_pair() {
        let values = [1.0, 2.0, 3.0, 10.0];
        assert!((percentile(&values, 50.0).unwrap() - 2.5).abs() < EPS);
    }

    #[test]
    fn interpolates_between_ranks() {
        // r = 0.05 * 4 = 0.2 -> 10 + 0.2 * (20 - 10)
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile(&values, 5.0).unwrap() - 12.0).abs() < EPS);
        // r = 0.95 * 4 = 3.8 -> 40 + 0.8 * 10
        assert!((percentile(&values, 95.0).unwrap() - 48.0).abs() < EPS);
    }

    #[test]
    fn single_value_is_returned_for_any_level() {
        for p in [0.0, 5.0, 50.0, 95.0, 100.0] {
            assert!((percentile(&[42.0], p).unwrap() - 42.0).abs() < EPS);
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(percentile(&[], 50.0), Err(AnalyticsError::EmptyInput));
        assert_eq!(percentile_sorted(&[], 5.0), Err(AnalyticsError::EmptyInput));
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        assert!(matches!(
            percentile(&[1.0], 101.0),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(matches!(
            percentile(&[1.0], f64::NAN),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn permutation_does_not_change_result() {
        let a = [9.0, 2.0, 5.0, 1.0, 7.0, 3.0];
        let b = [1.0, 3.0, 9.0, 7.0, 2.0, 5.0];

        for p in [0.0, 5.0, 25.0, 50.0, 75.0, 95.0, 100.0] {
            assert!((percentile(&a, p).unwrap() - percentile(&b, p).unwrap()).abs() < EPS);
        }
    }

    #[test]
    fn percentiles_sorts_once_and_matches_single_calls() {
        let values = [4.0, 8.0, 1.0, 6.0];
        let many = percentiles(&values, &[5.0, 50.0, 95.0]).unwrap();

        assert!((many[0] - percentile(&values, 5.0).unwrap()).abs() < EPS);
        assert!((many[1] - percentile(&values, 50.0).unwrap()).abs() < EPS);
        assert!((many[2] - percentile(&values, 95.0).unwrap()).abs() < EPS);
    }

    #[test]
    fn levels_validate_ordering() {
        assert!(PercentileLevels::default().validate().is_ok());
        assert!(PercentileLevels::new(10.0, 50.0, 90.0).validate().is_ok());
        assert!(PercentileLevels::new(60.0, 50.0, 90.0).validate().is_err());
        assert!(PercentileLevels::new(5.0, 50.0, 120.0).validate().is_err());
    }
}
