//! Drawdown episode detection and time-underwater statistics.
//!
//! An episode opens when equity first falls below the running high-water
//! mark, follows the trough while equity stays below it, and closes on the
//! first point whose equity is back at or above the mark. The analysis is a
//! single forward pass over the curve.
//!
//! Episode depths here are measured against the curve's own starting value,
//! which for an account-seeded curve is the account balance. The zero-seeded
//! figure reported by [`crate::metrics::MetricsResult::max_drawdown_currency`]
//! is a separate measure and can differ.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trade_analytics_core::{equity_curve, AnalyticsError, EquityPoint, Result, TradeOutcome};

/// Minimum number of curve points needed to find a drawdown.
pub const MIN_CURVE_POINTS: usize = 2;

/// One peak → trough → recovery interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// Curve index of the high-water mark the episode is measured from.
    pub start_index: usize,
    /// Timestamp of the high-water mark.
    pub start_time: DateTime<Utc>,
    /// Equity at the high-water mark.
    pub peak_equity: Decimal,
    /// Lowest equity seen so far in the episode.
    pub trough_equity: Decimal,
    /// Curve index of the trough.
    pub trough_index: usize,
    /// Curve index where equity regained the peak; `None` while open.
    pub end_index: Option<usize>,
    /// Timestamp of recovery; `None` while open.
    pub end_time: Option<DateTime<Utc>>,
    /// Milliseconds from peak to recovery; `None` while open.
    pub duration_ms: Option<i64>,
    /// `peak_equity - trough_equity`.
    pub depth_currency: Decimal,
    /// Depth as a percent of the peak (0 when the peak is not positive).
    pub depth_percent: f64,
    /// `end_index - start_index`; `None` while open.
    pub trades_to_recover: Option<usize>,
}

impl DrawdownEpisode {
    fn open(peak: &EquityPoint, first_below: &EquityPoint) -> Self {
        let mut episode = Self {
            start_index: peak.index,
            start_time: peak.timestamp,
            peak_equity: peak.equity,
            trough_equity: first_below.equity,
            trough_index: first_below.index,
            end_index: None,
            end_time: None,
            duration_ms: None,
            depth_currency: Decimal::ZERO,
            depth_percent: 0.0,
            trades_to_recover: None,
        };
        episode.refresh_depth();
        episode
    }

    fn refresh_depth(&mut self) {
        self.depth_currency = self.peak_equity - self.trough_equity;
        self.depth_percent = if self.peak_equity > Decimal::ZERO {
            to_f64(self.depth_currency) / to_f64(self.peak_equity) * 100.0
        } else {
            0.0
        };
    }

    fn close(&mut self, recovery: &EquityPoint) {
        self.end_index = Some(recovery.index);
        self.end_time = Some(recovery.timestamp);
        self.duration_ms = Some((recovery.timestamp - self.start_time).num_milliseconds());
        self.trades_to_recover = Some(recovery.index.saturating_sub(self.start_index));
        self.refresh_depth();
    }

    /// Returns true while equity has not yet regained the peak.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.end_index.is_none()
    }
}

/// Aggregates over closed episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeUnderwaterStats {
    /// Number of episodes that recovered.
    pub closed_episodes: usize,
    /// Longest peak-to-recovery span.
    pub longest_duration_ms: i64,
    /// Deepest recovered drawdown in currency.
    pub deepest_drawdown_currency: Decimal,
    /// Deepest recovered drawdown as a percent of its peak.
    pub deepest_drawdown_percent: f64,
    /// Mean peak-to-recovery span.
    pub avg_drawdown_duration_ms: f64,
    /// Mean number of curve steps from peak to recovery.
    pub avg_trades_to_recover: f64,
    /// Recovered time underwater over the whole timeline, in percent.
    pub percent_time_underwater: f64,
    /// The episode still open at the end of the curve, if any.
    pub current_drawdown: Option<DrawdownEpisode>,
}

/// Episodes plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    /// All episodes in curve order; only the last can be open.
    pub episodes: Vec<DrawdownEpisode>,
    pub stats: TimeUnderwaterStats,
}

impl DrawdownAnalysis {
    /// Iterates over recovered episodes.
    pub fn closed_episodes(&self) -> impl Iterator<Item = &DrawdownEpisode> {
        self.episodes.iter().filter(|e| !e.is_open())
    }
}

/// Segments `curve` into drawdown episodes and summarises them.
///
/// # Errors
/// `InsufficientHistory` when the curve has fewer than two points.
pub fn analyze(curve: &[EquityPoint]) -> Result<DrawdownAnalysis> {
    if curve.len() < MIN_CURVE_POINTS {
        return Err(AnalyticsError::InsufficientHistory {
            required: MIN_CURVE_POINTS,
            actual: curve.len(),
        });
    }

    let mut peak = &curve[0];
    let mut open: Option<DrawdownEpisode> = None;
    let mut episodes = Vec::new();

    for point in &curve[1..] {
        match open.take() {
            None => {
                if point.equity < peak.equity {
                    open = Some(DrawdownEpisode::open(peak, point));
                } else {
                    peak = point;
                }
            }
            Some(mut episode) => {
                if point.equity < episode.trough_equity {
                    episode.trough_equity = point.equity;
                    episode.trough_index = point.index;
                    episode.refresh_depth();
                }
                if point.equity >= episode.peak_equity {
                    episode.close(point);
                    episodes.push(episode);
                    peak = point;
                } else {
                    open = Some(episode);
                }
            }
        }
    }

    let timeline_ms = (curve[curve.len() - 1].timestamp - curve[0].timestamp).num_milliseconds();
    let stats = summarize(&episodes, open.clone(), timeline_ms);

    if let Some(episode) = open {
        tracing::debug!(
            start_index = episode.start_index,
            depth = %episode.depth_currency,
            "curve ends inside an open drawdown"
        );
        episodes.push(episode);
    }

    Ok(DrawdownAnalysis { episodes, stats })
}

/// Builds the equity curve from `starting_capital` and `trades`, then
/// analyses it.
///
/// # Errors
/// `InsufficientHistory` when `trades` is empty.
pub fn analyze_trades(starting_capital: Decimal, trades: &[TradeOutcome]) -> Result<DrawdownAnalysis> {
    analyze(&equity_curve(starting_capital, trades))
}

fn summarize(
    closed: &[DrawdownEpisode],
    current: Option<DrawdownEpisode>,
    timeline_ms: i64,
) -> TimeUnderwaterStats {
    let durations: Vec<i64> = closed.iter().filter_map(|e| e.duration_ms).collect();
    let total_underwater: i64 = durations.iter().sum();
    let count = closed.len();

    let avg = |total: f64| if count > 0 { total / count as f64 } else { 0.0 };

    TimeUnderwaterStats {
        closed_episodes: count,
        longest_duration_ms: durations.iter().copied().max().unwrap_or(0),
        deepest_drawdown_currency: closed
            .iter()
            .map(|e| e.depth_currency)
            .max()
            .unwrap_or(Decimal::ZERO),
        deepest_drawdown_percent: closed.iter().map(|e| e.depth_percent).fold(0.0, f64::max),
        avg_drawdown_duration_ms: avg(total_underwater as f64),
        avg_trades_to_recover: avg(closed
            .iter()
            .filter_map(|e| e.trades_to_recover)
            .sum::<usize>() as f64),
        percent_time_underwater: if timeline_ms > 0 {
            total_underwater as f64 / timeline_ms as f64 * 100.0
        } else {
            0.0
        },
        current_drawdown: current,
    }
}

fn to_f64(value: Decimal) -> f64 {
    f64::try_from(value).unwrap_or(0.0)
}
