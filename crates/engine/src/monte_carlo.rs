//! Monte Carlo projection of future equity paths.
//!
//! Each simulated path starts at the configured capital and adds P/L values
//! drawn uniformly, with replacement, from the historical trades. The paths
//! are reduced into a percentile band per step and into statistics of the
//! terminal equity distribution.
//!
//! # Example
//!
//! ```ignore
//! use trade_analytics_engine::monte_carlo::{project, MonteCarloConfig};
//!
//! let config = MonteCarloConfig::new(5_000, 100, 10_000.0).with_seed(42);
//! let result = project(&trades, &config)?;
//! println!("Probability of profit: {:.1}%", result.probability_of_profit);
//! ```

use serde::{Deserialize, Serialize};
use trade_analytics_core::{AnalyticsError, Result, TradeOutcome};

use crate::metrics::mean;
use crate::percentile::{sorted_copy, PercentileLevels};
use crate::trials::{draw, CancelFlag, TrialRunner, DEFAULT_PARALLEL_THRESHOLD};

/// Minimum number of historical trades to resample from.
pub const MIN_HISTORY: usize = 10;

/// Configuration for a Monte Carlo projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of independent paths.
    pub num_trials: usize,
    /// Trades per path.
    pub path_length: usize,
    /// Equity every path starts from.
    pub starting_capital: f64,
    /// Percentile levels for bands and best/worst case.
    pub levels: PercentileLevels,
    /// Drawdown from starting capital, in percent, that counts as ruin.
    pub ruin_threshold_percent: Option<f64>,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
    /// Trial count at or above which paths are simulated in parallel.
    pub parallel_threshold: usize,
    #[serde(skip)]
    pub cancel: Option<CancelFlag>,
}

impl MonteCarloConfig {
    /// Creates a configuration with the three required values.
    #[must_use]
    pub fn new(num_trials: usize, path_length: usize, starting_capital: f64) -> Self {
        Self {
            num_trials,
            path_length,
            starting_capital,
            levels: PercentileLevels::default(),
            ruin_threshold_percent: None,
            seed: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cancel: None,
        }
    }

    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: PercentileLevels) -> Self {
        self.levels = levels;
        self
    }

    /// Tracks the share of paths that fall `percent` below starting capital.
    #[must_use]
    pub fn with_ruin_threshold(mut self, percent: f64) -> Self {
        self.ruin_threshold_percent = Some(percent);
        self
    }

    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// # Errors
    /// `InvalidParameter` for a zero trial count or path length, a
    /// non-finite starting capital, bad percentile levels, or a ruin
    /// threshold outside `(0, 100]`.
    pub fn validate(&self) -> Result<()> {
        if self.num_trials == 0 {
            return Err(AnalyticsError::invalid("num_trials must be at least 1"));
        }
        if self.path_length == 0 {
            return Err(AnalyticsError::invalid("path_length must be at least 1"));
        }
        if !self.starting_capital.is_finite() {
            return Err(AnalyticsError::invalid("starting_capital must be finite"));
        }
        if let Some(threshold) = self.ruin_threshold_percent {
            if !(threshold > 0.0 && threshold <= 100.0) {
                return Err(AnalyticsError::invalid(format!(
                    "ruin_threshold_percent must be within (0, 100], got {threshold}"
                )));
            }
        }
        self.levels.validate()
    }
}

/// Percentile band of simulated equity at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityBand {
    /// 1-based trade number within the path.
    pub step_index: usize,
    /// Equity at the lower level (p5 by default).
    pub lower: f64,
    /// Equity at the median level.
    pub median: f64,
    /// Equity at the upper level (p95 by default).
    pub upper: f64,
}

/// Results from a Monte Carlo projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// One band per step, in step order.
    pub bands: Vec<EquityBand>,
    /// Median terminal equity.
    pub median_final_equity: f64,
    /// Mean terminal equity.
    pub mean_final_equity: f64,
    /// Percent of paths ending above starting capital.
    pub probability_of_profit: f64,
    /// Terminal equity at the upper level.
    pub best_case: f64,
    /// Terminal equity at the lower level.
    pub worst_case: f64,
    /// Percent of paths that touched the ruin level, when one was configured.
    pub probability_of_ruin: Option<f64>,
    pub levels: PercentileLevels,
    pub num_trials: usize,
    pub path_length: usize,
    pub starting_capital: f64,
    /// Base seed used, for reproducing the run.
    pub seed: u64,
}

impl MonteCarloResult {
    /// Expected change in equity over the horizon.
    #[must_use]
    pub fn mean_return(&self) -> f64 {
        self.mean_final_equity - self.starting_capital
    }
}

struct SimulatedPath {
    equity: Vec<f64>,
    ruined: bool,
}

/// Projects future equity paths by resampling historical trade P/L.
///
/// # Errors
/// * `InsufficientHistory` when fewer than [`MIN_HISTORY`] trades are supplied
/// * `InvalidParameter` for an invalid configuration
/// * `Cancelled` when the configured flag is raised mid-run
pub fn project(history: &[TradeOutcome], config: &MonteCarloConfig) -> Result<MonteCarloResult> {
    config.validate()?;
    if history.len() < MIN_HISTORY {
        return Err(AnalyticsError::InsufficientHistory {
            required: MIN_HISTORY,
            actual: history.len(),
        });
    }

    // Draws pick by index; a sorted pool makes them independent of input order.
    let pnls: Vec<f64> = history.iter().map(TradeOutcome::pnl_f64).collect();
    let pool = sorted_copy(&pnls);
    let start = config.starting_capital;
    let ruin_level = config
        .ruin_threshold_percent
        .map(|pct| start * (1.0 - pct / 100.0));

    let runner = TrialRunner::new(config.num_trials, config.seed, config.parallel_threshold)
        .with_cancel(config.cancel.clone());

    tracing::debug!(
        trials = config.num_trials,
        path_length = config.path_length,
        history = pool.len(),
        parallel = runner.is_parallel(),
        seed = runner.seed(),
        "starting monte carlo projection"
    );

    let paths = runner.run(|rng| {
        let mut equity = start;
        let mut ruined = false;
        let mut path = Vec::with_capacity(config.path_length);
        for _ in 0..config.path_length {
            equity += draw(&pool, rng);
            if ruin_level.is_some_and(|level| equity <= level) {
                ruined = true;
            }
            path.push(equity);
        }
        SimulatedPath {
            equity: path,
            ruined,
        }
    })?;

    let mut bands = Vec::with_capacity(config.path_length);
    let mut column = Vec::with_capacity(paths.len());
    for step in 0..config.path_length {
        column.clear();
        column.extend(paths.iter().map(|p| p.equity[step]));
        column.sort_by(f64::total_cmp);
        let (lower, median, upper) = config.levels.evaluate_sorted(&column)?;
        bands.push(EquityBand {
            step_index: step + 1,
            lower,
            median,
            upper,
        });
    }

    let finals: Vec<f64> = paths
        .iter()
        .map(|p| p.equity.last().copied().unwrap_or(start))
        .collect();
    let sorted_finals = sorted_copy(&finals);
    let (worst_case, median_final_equity, best_case) =
        config.levels.evaluate_sorted(&sorted_finals)?;

    let n = paths.len() as f64;
    let profitable = finals.iter().filter(|&&f| f > start).count();
    let probability_of_ruin = ruin_level
        .map(|_| paths.iter().filter(|p| p.ruined).count() as f64 / n * 100.0);

    let result = MonteCarloResult {
        bands,
        median_final_equity,
        mean_final_equity: mean(&finals),
        probability_of_profit: profitable as f64 / n * 100.0,
        best_case,
        worst_case,
        probability_of_ruin,
        levels: config.levels,
        num_trials: config.num_trials,
        path_length: config.path_length,
        starting_capital: start,
        seed: runner.seed(),
    };

    tracing::debug!(
        median_final = result.median_final_equity,
        probability_of_profit = result.probability_of_profit,
        "monte carlo projection complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn trades_from(pnls: &[Decimal]) -> Vec<TradeOutcome> {
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 14, 0, 0).unwrap();
        pnls.iter()
            .enumerate()
            .map(|(i, &pnl)| {
                let entry = base + Duration::hours(i as i64);
                TradeOutcome::new(pnl, entry, entry + Duration::minutes(20))
            })
            .collect()
    }

    fn alternating(n: usize) -> Vec<TradeOutcome> {
        let pnls: Vec<Decimal> = (0..n)
            .map(|i| if i % 2 == 0 { dec!(100) } else { dec!(-50) })
            .collect();
        trades_from(&pnls)
    }

    // ============================================================
    // Preconditions
    // ============================================================

    #[test]
    fn rejects_short_history() {
        let config = MonteCarloConfig::new(100, 10, 1000.0);
        let err = project(&alternating(9), &config).unwrap_err();

        assert_eq!(
            err,
            AnalyticsError::InsufficientHistory {
                required: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let history = alternating(20);

        for config in [
            MonteCarloConfig::new(0, 10, 1000.0),
            MonteCarloConfig::new(10, 0, 1000.0),
            MonteCarloConfig::new(10, 10, f64::NAN),
            MonteCarloConfig::new(10, 10, 1000.0).with_ruin_threshold(0.0),
            MonteCarloConfig::new(10, 10, 1000.0).with_levels(PercentileLevels::new(90.0, 50.0, 10.0)),
        ] {
            assert!(matches!(
                project(&history, &config),
                Err(AnalyticsError::InvalidParameter(_))
            ));
        }
    }

    // ============================================================
    // Reproducibility
    // ============================================================

    #[test]
    fn same_seed_produces_identical_results() {
        let history = alternating(20);
        let config = MonteCarloConfig::new(500, 50, 10_000.0).with_seed(42);

        let a = project(&history, &config).unwrap();
        let b = project(&history, &config).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn results_are_identical_for_reordered_history() {
        let history = trades_from(&[
            dec!(12.5), dec!(-7.25), dec!(30), dec!(-15.5), dec!(4.75), dec!(-2.1),
            dec!(18.3), dec!(-9.9), dec!(6.05), dec!(-11.4), dec!(25.6), dec!(-3.3),
        ]);
        let mut reversed = history.clone();
        reversed.reverse();

        let config = MonteCarloConfig::new(300, 40, 1_000.0)
            .with_seed(5)
            .with_ruin_threshold(5.0);

        assert_eq!(
            project(&history, &config).unwrap(),
            project(&reversed, &config).unwrap()
        );
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let history = alternating(30);
        let sequential = MonteCarloConfig::new(400, 25, 5_000.0)
            .with_seed(7)
            .with_parallel_threshold(usize::MAX);
        let parallel = sequential.clone().with_parallel_threshold(1);

        assert_eq!(
            project(&history, &sequential).unwrap(),
            project(&history, &parallel).unwrap()
        );
    }

    // ============================================================
    // Result shape and values
    // ============================================================

    #[test]
    fn bands_cover_every_step_in_order() {
        let config = MonteCarloConfig::new(300, 40, 1_000.0).with_seed(3);
        let result = project(&alternating(20), &config).unwrap();

        assert_eq!(result.bands.len(), 40);
        for (i, band) in result.bands.iter().enumerate() {
            assert_eq!(band.step_index, i + 1);
            assert!(band.lower <= band.median && band.median <= band.upper);
        }
        assert!(result.worst_case <= result.median_final_equity);
        assert!(result.median_final_equity <= result.best_case);
        assert!((result.bands[39].median - result.median_final_equity).abs() < 1e-9);
    }

    #[test]
    fn constant_history_is_deterministic() {
        let history = trades_from(&[dec!(10); 12]);
        let config = MonteCarloConfig::new(50, 5, 100.0).with_seed(1);

        let result = project(&history, &config).unwrap();

        assert!((result.median_final_equity - 150.0).abs() < 1e-9);
        assert!((result.mean_final_equity - 150.0).abs() < 1e-9);
        assert!((result.best_case - 150.0).abs() < 1e-9);
        assert!((result.worst_case - 150.0).abs() < 1e-9);
        assert!((result.probability_of_profit - 100.0).abs() < 1e-9);
        assert!((result.bands[0].lower - 110.0).abs() < 1e-9);
        assert!(result.probability_of_ruin.is_none());
    }

    #[test]
    fn positive_edge_history_is_mostly_profitable() {
        let config = MonteCarloConfig::new(2_000, 100, 10_000.0).with_seed(11);
        let result = project(&alternating(20), &config).unwrap();

        // Expected +25 per trade over 100 trades
        assert!((result.mean_final_equity - 12_500.0).abs() < 150.0);
        assert!(result.probability_of_profit > 95.0);
        assert!(result.mean_return() > 0.0);
    }

    #[test]
    fn losing_history_reports_ruin() {
        let history = trades_from(&[dec!(-100); 10]);
        let config = MonteCarloConfig::new(100, 10, 1_000.0)
            .with_seed(5)
            .with_ruin_threshold(50.0);

        let result = project(&history, &config).unwrap();

        assert_eq!(result.probability_of_ruin, Some(100.0));
        assert!(result.probability_of_profit.abs() < f64::EPSILON);
        assert!((result.median_final_equity - 0.0).abs() < 1e-9);
    }

    #[test]
    fn cancelled_run_returns_error() {
        let flag = CancelFlag::new();
        flag.cancel();
        let config = MonteCarloConfig::new(1_000, 10, 1_000.0).with_cancel(flag);

        assert_eq!(
            project(&alternating(20), &config),
            Err(AnalyticsError::Cancelled)
        );
    }
}
