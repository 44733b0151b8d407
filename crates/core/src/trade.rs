//! Trade outcome and equity curve types.
//!
//! A [`TradeOutcome`] is one closed trade as produced by the journaling side
//! of the system. The analytics engine only reads these values.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One closed trade used as raw statistical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    /// Signed profit or loss in account currency.
    pub pnl: Decimal,
    /// Time the position was opened.
    pub entry_time: DateTime<Utc>,
    /// Time the position was closed.
    pub exit_time: DateTime<Utc>,
    /// Percent of capital risked on the trade, when recorded.
    #[serde(default)]
    pub risk_percentage: Option<Decimal>,
    /// Realized reward-to-risk multiple, when recorded.
    #[serde(default)]
    pub r_multiple: Option<Decimal>,
}

impl TradeOutcome {
    /// Creates a trade without risk metadata.
    #[must_use]
    pub fn new(pnl: Decimal, entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> Self {
        Self {
            pnl,
            entry_time,
            exit_time,
            risk_percentage: None,
            r_multiple: None,
        }
    }

    /// Attaches the percent of capital risked.
    #[must_use]
    pub fn with_risk_percentage(mut self, risk_percentage: Decimal) -> Self {
        self.risk_percentage = Some(risk_percentage);
        self
    }

    /// Attaches the realized R-multiple.
    #[must_use]
    pub fn with_r_multiple(mut self, r_multiple: Decimal) -> Self {
        self.r_multiple = Some(r_multiple);
        self
    }

    /// P/L as `f64` for the statistical routines.
    #[must_use]
    pub fn pnl_f64(&self) -> f64 {
        f64::try_from(self.pnl).unwrap_or(0.0)
    }

    /// Time the position was held. Negative spans are clamped to zero.
    #[must_use]
    pub fn duration(&self) -> Duration {
        (self.exit_time - self.entry_time).max(Duration::zero())
    }

    /// A trade wins when its P/L is strictly positive.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    /// A trade loses when its P/L is strictly negative.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.pnl < Decimal::ZERO
    }
}

/// One point on an equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Position on the curve; 0 is the synthetic starting point.
    pub index: usize,
    /// Time the equity value was reached.
    pub timestamp: DateTime<Utc>,
    /// Account equity after the trade at this index.
    pub equity: Decimal,
}

impl EquityPoint {
    #[must_use]
    pub fn new(index: usize, timestamp: DateTime<Utc>, equity: Decimal) -> Self {
        Self {
            index,
            timestamp,
            equity,
        }
    }
}

/// Builds an equity curve from a starting capital and a list of trades.
///
/// Point 0 holds `starting_capital` at the earliest entry time. Each trade
/// then adds one point at its exit time, in exit-time order. Pass
/// `Decimal::ZERO` for a cumulative P/L curve or the account's initial
/// balance for an account-seeded curve.
///
/// Returns an empty curve when `trades` is empty.
#[must_use]
pub fn equity_curve(starting_capital: Decimal, trades: &[TradeOutcome]) -> Vec<EquityPoint> {
    if trades.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&TradeOutcome> = trades.iter().collect();
    ordered.sort_by_key(|t| t.exit_time);

    let start_time = trades
        .iter()
        .map(|t| t.entry_time.min(t.exit_time))
        .min()
        .unwrap_or(ordered[0].exit_time);

    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(EquityPoint::new(0, start_time, starting_capital));

    let mut equity = starting_capital;
    for (i, trade) in ordered.into_iter().enumerate() {
        equity += trade.pnl;
        curve.push(EquityPoint::new(i + 1, trade.exit_time, equity));
    }

    curve
}
