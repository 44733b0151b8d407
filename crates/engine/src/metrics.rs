//! Summary performance statistics over a series of trade outcomes.
//!
//! Wins are trades with strictly positive P/L and losses strictly negative;
//! break-even trades count toward the trade total (and therefore dilute the
//! win rate) but toward neither side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trade_analytics_core::{Ratio, TradeOutcome};

/// Performance statistics for a trade series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    // Counts
    /// Number of trades analysed.
    pub total_trades: usize,
    /// Trades with P/L > 0.
    pub wins: usize,
    /// Trades with P/L < 0.
    pub losses: usize,
    /// Trades with P/L == 0.
    pub breakevens: usize,

    // Win/loss statistics
    /// Percent of trades that won (0..=100).
    pub win_rate: f64,
    /// Sum of winning P/L.
    pub gross_profit: Decimal,
    /// Absolute sum of losing P/L.
    pub gross_loss: Decimal,
    /// Sum of all P/L.
    pub net_pnl: Decimal,
    /// Gross profit over gross loss.
    pub profit_factor: Ratio,
    /// Mean P/L of winning trades.
    pub avg_win: f64,
    /// Mean absolute P/L of losing trades.
    pub avg_loss: f64,
    /// Expected P/L per trade from win rate and average win/loss.
    pub expectancy: f64,
    /// Average win over average loss.
    pub avg_rr: Ratio,
    /// Mean recorded R-multiple; `None` when no trade records one.
    pub avg_r_multiple: Option<f64>,
    /// Largest single winning P/L (0 without wins).
    pub largest_win: Decimal,
    /// Most negative single P/L (0 without losses).
    pub largest_loss: Decimal,

    // Dispersion
    /// Mean P/L per trade.
    pub mean_pnl: f64,
    /// Sample standard deviation of P/L (Bessel-corrected).
    pub std_deviation: f64,
    /// Mean P/L divided by its standard deviation.
    ///
    /// This is a per-trade dispersion-adjusted mean, not an annualized
    /// Sharpe ratio: there is no risk-free rate and no time scaling.
    pub sharpe_like: f64,

    // Path statistics
    /// Largest peak-to-trough fall of cumulative P/L, with the running
    /// peak seeded at zero rather than at an account balance.
    pub max_drawdown_currency: Decimal,
    /// Longest run of consecutive wins.
    pub max_consecutive_wins: usize,
    /// Longest run of consecutive losses.
    pub max_consecutive_losses: usize,
    /// Mean time between entry and exit in milliseconds.
    pub avg_hold_duration_ms: i64,
}

impl MetricsResult {
    /// Metrics for an empty trade list: every figure is zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakevens: 0,
            win_rate: 0.0,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            net_pnl: Decimal::ZERO,
            profit_factor: Ratio::Finite(0.0),
            avg_win: 0.0,
            avg_loss: 0.0,
            expectancy: 0.0,
            avg_rr: Ratio::Finite(0.0),
            avg_r_multiple: None,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            mean_pnl: 0.0,
            std_deviation: 0.0,
            sharpe_like: 0.0,
            max_drawdown_currency: Decimal::ZERO,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            avg_hold_duration_ms: 0,
        }
    }

    /// Win rate as a fraction in `[0, 1]`.
    #[must_use]
    pub fn win_rate_fraction(&self) -> f64 {
        self.win_rate / 100.0
    }
}

/// Computes performance statistics for `trades`.
///
/// Path-dependent figures (drawdown, streaks) walk the trades in exit-time
/// order, so the result does not depend on the order of the input slice.
/// An empty slice yields [`MetricsResult::empty`].
#[must_use]
pub fn compute_metrics(trades: &[TradeOutcome]) -> MetricsResult {
    if trades.is_empty() {
        return MetricsResult::empty();
    }

    let mut ordered: Vec<&TradeOutcome> = trades.iter().collect();
    ordered.sort_by(|a, b| {
        a.exit_time
            .cmp(&b.exit_time)
            .then_with(|| a.pnl.cmp(&b.pnl))
    });

    let n = trades.len();
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let losses = trades.iter().filter(|t| t.is_loss()).count();

    let gross_profit: Decimal = trades.iter().filter(|t| t.is_win()).map(|t| t.pnl).sum();
    let gross_loss: Decimal = trades
        .iter()
        .filter(|t| t.is_loss())
        .map(|t| t.pnl.abs())
        .sum();
    let net_pnl: Decimal = trades.iter().map(|t| t.pnl).sum();

    let gross_profit_f = to_f64(gross_profit);
    let gross_loss_f = to_f64(gross_loss);

    let win_rate = wins as f64 / n as f64 * 100.0;
    let avg_win = if wins > 0 {
        gross_profit_f / wins as f64
    } else {
        0.0
    };
    let avg_loss = if losses > 0 {
        gross_loss_f / losses as f64
    } else {
        0.0
    };
    let win_fraction = win_rate / 100.0;
    let expectancy = win_fraction * avg_win - (1.0 - win_fraction) * avg_loss;

    let r_multiples: Vec<f64> = ordered
        .iter()
        .filter_map(|t| t.r_multiple)
        .map(to_f64)
        .collect();
    let avg_r_multiple = if r_multiples.is_empty() {
        None
    } else {
        Some(mean(&r_multiples))
    };

    let pnls: Vec<f64> = ordered.iter().map(|t| t.pnl_f64()).collect();
    let mean_pnl = mean(&pnls);
    let std_deviation = sample_std_dev(&pnls);
    let sharpe_like = if std_deviation > 0.0 {
        mean_pnl / std_deviation
    } else {
        0.0
    };

    let largest_win = trades
        .iter()
        .map(|t| t.pnl)
        .filter(|p| *p > Decimal::ZERO)
        .max()
        .unwrap_or(Decimal::ZERO);
    let largest_loss = trades
        .iter()
        .map(|t| t.pnl)
        .filter(|p| *p < Decimal::ZERO)
        .min()
        .unwrap_or(Decimal::ZERO);

    let (max_consecutive_wins, max_consecutive_losses) = streaks(&ordered);

    let total_hold_ms: i64 = trades.iter().map(|t| t.duration().num_milliseconds()).sum();

    MetricsResult {
        total_trades: n,
        wins,
        losses,
        breakevens: n - wins - losses,
        win_rate,
        gross_profit,
        gross_loss,
        net_pnl,
        profit_factor: Ratio::from_parts(gross_profit_f, gross_loss_f),
        avg_win,
        avg_loss,
        expectancy,
        avg_rr: Ratio::from_parts(avg_win, avg_loss),
        avg_r_multiple,
        largest_win,
        largest_loss,
        mean_pnl,
        std_deviation,
        sharpe_like,
        max_drawdown_currency: max_drawdown_from_zero(ordered.iter().map(|t| t.pnl)),
        max_consecutive_wins,
        max_consecutive_losses,
        avg_hold_duration_ms: total_hold_ms / n as i64,
    }
}

/// Percent of strictly positive values (0 for an empty slice).
#[must_use]
pub fn win_rate_of(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let wins = pnls.iter().filter(|&&p| p > 0.0).count();
    wins as f64 / pnls.len() as f64 * 100.0
}

/// Gross profit over absolute gross loss, with the infinite case kept.
#[must_use]
pub fn profit_factor_of(pnls: &[f64]) -> Ratio {
    let (profit, loss) = pnls.iter().fold((0.0, 0.0), |(profit, loss), &p| {
        if p > 0.0 {
            (profit + p, loss)
        } else {
            (profit, loss - p.min(0.0))
        }
    });
    Ratio::from_parts(profit, loss)
}

/// Arithmetic mean (0 for an empty slice).
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with divisor `n - 1`; 0 when `n < 2`.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Largest peak-to-trough fall of a cumulative P/L sequence starting at 0.
fn max_drawdown_from_zero(pnls: impl Iterator<Item = Decimal>) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut equity = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;

    for pnl in pnls {
        equity += pnl;
        if equity > peak {
            peak = equity;
        }
        let drawdown = peak - equity;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
    }

    max_dd
}

fn streaks(ordered: &[&TradeOutcome]) -> (usize, usize) {
    let mut max_wins = 0;
    let mut max_losses = 0;
    let mut wins = 0;
    let mut losses = 0;

    for trade in ordered {
        if trade.is_win() {
            wins += 1;
            losses = 0;
        } else if trade.is_loss() {
            losses += 1;
            wins = 0;
        } else {
            wins = 0;
            losses = 0;
        }
        max_wins = max_wins.max(wins);
        max_losses = max_losses.max(losses);
    }

    (max_wins, max_losses)
}

fn to_f64(value: Decimal) -> f64 {
    f64::try_from(value).unwrap_or(0.0)
}
