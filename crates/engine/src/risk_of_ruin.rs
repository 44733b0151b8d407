//! Closed-form risk-of-ruin estimate.
//!
//! With win probability `w` and payoff ratio `b`, the edge per unit risked is
//! ```text
//! edge = w * b - (1 - w)
//! ```
//! and for a positive edge the probability of losing `ruin / risk` units of
//! capital before recovering is approximated by
//! ```text
//! ((1 - edge) / (1 + edge)) ^ (ruin / risk)
//! ```

use serde::{Deserialize, Serialize};
use trade_analytics_core::{AnalyticsError, Result};

use crate::metrics::MetricsResult;

/// Output of the risk-of-ruin estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskOfRuinResult {
    /// Probability of ruin in percent (0..=100).
    pub ruin_probability_percent: f64,
    /// Expected value per unit risked.
    pub edge: f64,
}

/// Estimates the probability of ruin.
///
/// # Arguments
/// * `win_rate_fraction` - Probability of a winning trade, in `[0, 1]`
/// * `payoff_ratio` - Average win over average loss, `>= 0` (may be `+inf`)
/// * `risk_per_trade_percent` - Percent of capital risked per trade, `> 0`
/// * `ruin_threshold_percent` - Percent of capital whose loss counts as ruin, `> 0`
///
/// # Errors
/// `InvalidParameter` when any input is outside its domain.
///
/// # Examples
/// ```
/// use trade_analytics_engine::risk_of_ruin::estimate;
///
/// let result = estimate(0.5, 2.0, 1.0, 10.0).unwrap();
/// assert!((result.edge - 0.5).abs() < 1e-12);
/// // (0.5 / 1.5) ^ 10
/// assert!((result.ruin_probability_percent - (1.0f64 / 3.0).powi(10) * 100.0).abs() < 1e-12);
/// ```
pub fn estimate(
    win_rate_fraction: f64,
    payoff_ratio: f64,
    risk_per_trade_percent: f64,
    ruin_threshold_percent: f64,
) -> Result<RiskOfRuinResult> {
    if !(0.0..=1.0).contains(&win_rate_fraction) {
        return Err(AnalyticsError::invalid(format!(
            "win rate must be within [0, 1], got {win_rate_fraction}"
        )));
    }
    if payoff_ratio.is_nan() || payoff_ratio < 0.0 {
        return Err(AnalyticsError::invalid(format!(
            "payoff ratio must be >= 0, got {payoff_ratio}"
        )));
    }
    if !(risk_per_trade_percent.is_finite() && risk_per_trade_percent > 0.0) {
        return Err(AnalyticsError::invalid(format!(
            "risk per trade must be > 0, got {risk_per_trade_percent}"
        )));
    }
    if !(ruin_threshold_percent.is_finite() && ruin_threshold_percent > 0.0) {
        return Err(AnalyticsError::invalid(format!(
            "ruin threshold must be > 0, got {ruin_threshold_percent}"
        )));
    }

    let edge = if win_rate_fraction == 0.0 {
        -1.0
    } else if payoff_ratio.is_infinite() {
        f64::INFINITY
    } else {
        win_rate_fraction * payoff_ratio - (1.0 - win_rate_fraction)
    };

    let ruin_probability_percent = if win_rate_fraction == 1.0 {
        0.0
    } else if win_rate_fraction == 0.0 || edge <= 0.0 {
        100.0
    } else if edge.is_infinite() {
        0.0
    } else {
        let capital_units = ruin_threshold_percent / risk_per_trade_percent;
        // An edge >= 1 makes the base non-positive; ruin is then impossible.
        let base = ((1.0 - edge) / (1.0 + edge)).max(0.0);
        base.powf(capital_units) * 100.0
    };

    Ok(RiskOfRuinResult {
        ruin_probability_percent,
        edge,
    })
}

/// Estimates risk of ruin using the win rate and average reward/risk of a
/// trade series.
///
/// # Errors
/// Same as [`estimate`].
pub fn estimate_from_metrics(
    metrics: &MetricsResult,
    risk_per_trade_percent: f64,
    ruin_threshold_percent: f64,
) -> Result<RiskOfRuinResult> {
    estimate(
        metrics.win_rate_fraction(),
        metrics.avg_rr.as_f64(),
        risk_per_trade_percent,
        ruin_threshold_percent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metrics;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use trade_analytics_core::TradeOutcome;

    const EPS: f64 = 1e-9;

    // ============================================================
    // Boundary values
    // ============================================================

    #[test]
    fn certain_win_is_never_ruined() {
        let result = estimate(1.0, 0.5, 2.0, 20.0).unwrap();
        assert!(result.ruin_probability_percent.abs() < EPS);
    }

    #[test]
    fn certain_loss_is_always_ruined() {
        let result = estimate(0.0, 3.0, 2.0, 20.0).unwrap();
        assert!((result.ruin_probability_percent - 100.0).abs() < EPS);
        assert!((result.edge - -1.0).abs() < EPS);
    }

    #[test]
    fn non_positive_edge_is_always_ruined() {
        // 0.4 * 1.5 - 0.6 = 0
        let zero_edge = estimate(0.4, 1.5, 1.0, 50.0).unwrap();
        assert!(zero_edge.edge.abs() < EPS);
        assert!((zero_edge.ruin_probability_percent - 100.0).abs() < EPS);

        let negative = estimate(0.3, 1.0, 1.0, 50.0).unwrap();
        assert!(negative.edge < 0.0);
        assert!((negative.ruin_probability_percent - 100.0).abs() < EPS);
    }

    // ============================================================
    // Formula
    // ============================================================

    #[test]
    fn positive_edge_uses_closed_form() {
        // edge = 0.6 * 1 - 0.4 = 0.2; units = 10 / 2 = 5
        let result = estimate(0.6, 1.0, 2.0, 10.0).unwrap();

        let expected = (0.8f64 / 1.2).powf(5.0) * 100.0;
        assert!((result.edge - 0.2).abs() < EPS);
        assert!((result.ruin_probability_percent - expected).abs() < EPS);
    }

    #[test]
    fn smaller_risk_per_trade_lowers_ruin() {
        let aggressive = estimate(0.55, 1.2, 5.0, 30.0).unwrap();
        let cautious = estimate(0.55, 1.2, 1.0, 30.0).unwrap();

        assert!(cautious.ruin_probability_percent < aggressive.ruin_probability_percent);
    }

    #[test]
    fn very_large_edge_clamps_to_zero() {
        let result = estimate(0.9, 5.0, 1.0, 10.0).unwrap();
        assert!(result.edge > 1.0);
        assert!(result.ruin_probability_percent.abs() < EPS);
    }

    #[test]
    fn infinite_payoff_is_never_ruined() {
        let result = estimate(0.5, f64::INFINITY, 1.0, 10.0).unwrap();
        assert!(result.edge.is_infinite());
        assert!(result.ruin_probability_percent.abs() < EPS);
    }

    #[test]
    fn infinite_payoff_without_wins_has_finite_edge() {
        let result = estimate(0.0, f64::INFINITY, 1.0, 10.0).unwrap();

        assert!((result.edge - -1.0).abs() < EPS);
        assert!((result.ruin_probability_percent - 100.0).abs() < EPS);
        assert!(serde_json::to_string(&result).unwrap().contains("\"edge\":-1.0"));
    }

    // ============================================================
    // Validation
    // ============================================================

    #[test]
    fn out_of_domain_inputs_are_rejected() {
        let cases = [
            (1.1, 1.0, 1.0, 10.0),
            (-0.1, 1.0, 1.0, 10.0),
            (f64::NAN, 1.0, 1.0, 10.0),
            (0.5, -1.0, 1.0, 10.0),
            (0.5, 1.0, 0.0, 10.0),
            (0.5, 1.0, -2.0, 10.0),
            (0.5, 1.0, 1.0, 0.0),
        ];

        for (w, b, risk, ruin) in cases {
            assert!(matches!(
                estimate(w, b, risk, ruin),
                Err(AnalyticsError::InvalidParameter(_))
            ));
        }
    }

    // ============================================================
    // From metrics
    // ============================================================

    #[test]
    fn estimate_from_metrics_uses_win_rate_and_avg_rr() {
        let base = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let trades: Vec<TradeOutcome> = (0..20)
            .map(|i| {
                let pnl = if i % 2 == 0 { dec!(100) } else { dec!(-50) };
                let entry = base + Duration::hours(i);
                TradeOutcome::new(pnl, entry, entry + Duration::minutes(5))
            })
            .collect();
        let metrics = compute_metrics(&trades);

        let from_metrics = estimate_from_metrics(&metrics, 1.0, 10.0).unwrap();
        let direct = estimate(0.5, 2.0, 1.0, 10.0).unwrap();

        assert_eq!(from_metrics, direct);
    }
}
