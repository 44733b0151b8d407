//! Bootstrap confidence intervals for strategy statistics.
//!
//! Each resample draws `sample_size` P/L values with replacement from the
//! historical trades and records its win rate, profit factor and net P/L.
//! The resample distribution gives percentile confidence intervals and a
//! histogram of net P/L that can be set against the original statistics.
//!
//! Resamples that never lose have an infinite profit factor. Those are left
//! out of the profit-factor interval, so that interval can rest on fewer
//! observations than the win-rate and net P/L intervals;
//! [`BootstrapResult::infinite_profit_factor_count`] reports how many.
//!
//! # Example
//!
//! ```ignore
//! use trade_analytics_engine::bootstrap::{resample, BootstrapConfig};
//!
//! let config = BootstrapConfig::new(10_000).with_seed(42);
//! let result = resample(&trades, &config)?;
//! println!("Win rate: {:.2}% [{:.2}%, {:.2}%]",
//!     result.original_win_rate,
//!     result.win_rate_ci.lower,
//!     result.win_rate_ci.upper);
//! ```

use serde::{Deserialize, Serialize};
use trade_analytics_core::{AnalyticsError, Ratio, Result, TradeOutcome};

use crate::metrics::{mean, profit_factor_of, sample_std_dev, win_rate_of};
use crate::percentile::{percentiles, sorted_copy, PercentileLevels};
use crate::trials::{sample_with_replacement, CancelFlag, TrialRunner, DEFAULT_PARALLEL_THRESHOLD};

/// Minimum number of historical trades to resample from.
pub const MIN_HISTORY: usize = 10;

/// Default number of net P/L histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Configuration for bootstrap resampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples.
    pub num_trials: usize,
    /// Draws per resample; `None` uses the history length.
    pub sample_size: Option<usize>,
    /// Interval bounds are taken at `levels.lower` and `levels.upper`.
    pub levels: PercentileLevels,
    /// Number of equal-width net P/L histogram bins.
    pub histogram_bins: usize,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
    /// Trial count at or above which resamples run in parallel.
    pub parallel_threshold: usize,
    #[serde(skip)]
    pub cancel: Option<CancelFlag>,
}

impl BootstrapConfig {
    /// Creates a configuration with the required resample count.
    #[must_use]
    pub fn new(num_trials: usize) -> Self {
        Self {
            num_trials,
            sample_size: None,
            levels: PercentileLevels::default(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            seed: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cancel: None,
        }
    }

    /// Overrides the number of draws per resample.
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Sets a seed for reproducible bootstrap samples.
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

    #[must_use]
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
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
    /// `InvalidParameter` for a zero resample count, sample size or bin
    /// count, or bad percentile levels.
    pub fn validate(&self) -> Result<()> {
        if self.num_trials == 0 {
            return Err(AnalyticsError::invalid("num_trials must be at least 1"));
        }
        if self.sample_size == Some(0) {
            return Err(AnalyticsError::invalid("sample_size must be at least 1"));
        }
        if self.histogram_bins == 0 {
            return Err(AnalyticsError::invalid("histogram_bins must be at least 1"));
        }
        self.levels.validate()
    }
}

/// A two-sided percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Returns the width of the interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// One histogram bin covering `[bin_start, bin_end)`; the last bin also
/// includes `bin_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: usize,
}

/// Result of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Win rate of the unresampled history, in percent.
    pub original_win_rate: f64,
    /// Profit factor of the unresampled history.
    pub original_profit_factor: Ratio,
    /// Interval of resampled win rates.
    pub win_rate_ci: ConfidenceInterval,
    /// Interval of finite resampled profit factors; `None` when every
    /// resample had an infinite profit factor.
    pub profit_factor_ci: Option<ConfidenceInterval>,
    /// Interval of resampled net P/L.
    pub net_pnl_ci: ConfidenceInterval,
    /// Mean resampled win rate.
    pub mean_win_rate: f64,
    /// Mean resampled net P/L.
    pub mean_net_pnl: f64,
    /// Standard deviation of resampled net P/L.
    pub net_pnl_standard_error: f64,
    /// Resamples excluded from the profit-factor interval.
    pub infinite_profit_factor_count: usize,
    /// Net P/L distribution.
    pub histogram: Vec<HistogramBin>,
    pub num_trials: usize,
    pub sample_size: usize,
    pub levels: PercentileLevels,
    /// Base seed used, for reproducing the run.
    pub seed: u64,
}

struct ResampleStats {
    win_rate: f64,
    profit_factor: Ratio,
    net_pnl: f64,
}

/// Resamples historical P/L and summarises the resample distribution.
///
/// # Errors
/// * `InsufficientHistory` when fewer than [`MIN_HISTORY`] trades are supplied
/// * `InvalidParameter` for an invalid configuration
/// * `Cancelled` when the configured flag is raised mid-run
pub fn resample(history: &[TradeOutcome], config: &BootstrapConfig) -> Result<BootstrapResult> {
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
    let sample_size = config.sample_size.unwrap_or(pool.len());

    let runner = TrialRunner::new(config.num_trials, config.seed, config.parallel_threshold)
        .with_cancel(config.cancel.clone());

    tracing::debug!(
        trials = config.num_trials,
        sample_size,
        history = pool.len(),
        parallel = runner.is_parallel(),
        seed = runner.seed(),
        "starting bootstrap resampling"
    );

    let stats = runner.run(|rng| {
        let sample = sample_with_replacement(&pool, sample_size, rng);
        ResampleStats {
            win_rate: win_rate_of(&sample),
            profit_factor: profit_factor_of(&sample),
            net_pnl: sample.iter().sum(),
        }
    })?;

    let win_rates: Vec<f64> = stats.iter().map(|s| s.win_rate).collect();
    let net_pnls: Vec<f64> = stats.iter().map(|s| s.net_pnl).collect();
    let finite_pfs: Vec<f64> = stats.iter().filter_map(|s| s.profit_factor.finite()).collect();
    let infinite_profit_factor_count = stats.len() - finite_pfs.len();

    let profit_factor_ci = if finite_pfs.is_empty() {
        tracing::warn!("every resample had an infinite profit factor; no interval computed");
        None
    } else {
        Some(interval(&finite_pfs, &config.levels)?)
    };

    Ok(BootstrapResult {
        original_win_rate: win_rate_of(&pool),
        original_profit_factor: profit_factor_of(&pool),
        win_rate_ci: interval(&win_rates, &config.levels)?,
        profit_factor_ci,
        net_pnl_ci: interval(&net_pnls, &config.levels)?,
        mean_win_rate: mean(&win_rates),
        mean_net_pnl: mean(&net_pnls),
        net_pnl_standard_error: sample_std_dev(&net_pnls),
        infinite_profit_factor_count,
        histogram: histogram(&net_pnls, config.histogram_bins)?,
        num_trials: config.num_trials,
        sample_size,
        levels: config.levels,
        seed: runner.seed(),
    })
}

fn interval(values: &[f64], levels: &PercentileLevels) -> Result<ConfidenceInterval> {
    let bounds = percentiles(values, &[levels.lower, levels.upper])?;
    Ok(ConfidenceInterval {
        lower: bounds[0],
        upper: bounds[1],
    })
}

/// Builds an equal-width histogram over `[min, max]` of `values`.
///
/// When every value is equal a single bin `[v, v]` holds all of them.
///
/// # Errors
/// * `EmptyInput` for an empty slice
/// * `InvalidParameter` for zero bins
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(AnalyticsError::invalid("histogram needs at least one bin"));
    }
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return Ok(vec![HistogramBin {
            bin_start: min,
            bin_end: max,
            count: values.len(),
        }]);
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = ((value - min) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            bin_start: min + i as f64 * width,
            bin_end: if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count,
        })
        .collect())
}
