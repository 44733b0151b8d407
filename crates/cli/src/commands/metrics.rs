//! Performance metrics command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

use trade_analytics_engine::{compute_metrics, MetricsResult};

use super::{to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the metrics command.
#[derive(Args, Debug, Clone)]
pub struct MetricsArgs {
    /// Closed trades CSV file
    #[arg(short, long)]
    pub trades: PathBuf,
}

/// Flat metrics record for CSV export.
///
/// Ratios use their storage value, so an infinite profit factor is written
/// as the numeric sentinel.
#[derive(Debug, Serialize)]
pub struct MetricsRow {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub net_pnl: Decimal,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
    pub avg_rr: f64,
    pub avg_r_multiple: Option<f64>,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub mean_pnl: f64,
    pub std_deviation: f64,
    pub sharpe_like: f64,
    pub max_drawdown_currency: Decimal,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_hold_duration_ms: i64,
}

impl From<&MetricsResult> for MetricsRow {
    fn from(m: &MetricsResult) -> Self {
        Self {
            total_trades: m.total_trades,
            wins: m.wins,
            losses: m.losses,
            breakevens: m.breakevens,
            win_rate: m.win_rate,
            gross_profit: m.gross_profit,
            gross_loss: m.gross_loss,
            net_pnl: m.net_pnl,
            profit_factor: m.profit_factor.to_storage_value(),
            avg_win: m.avg_win,
            avg_loss: m.avg_loss,
            expectancy: m.expectancy,
            avg_rr: m.avg_rr.to_storage_value(),
            avg_r_multiple: m.avg_r_multiple,
            largest_win: m.largest_win,
            largest_loss: m.largest_loss,
            mean_pnl: m.mean_pnl,
            std_deviation: m.std_deviation,
            sharpe_like: m.sharpe_like,
            max_drawdown_currency: m.max_drawdown_currency,
            max_consecutive_wins: m.max_consecutive_wins,
            max_consecutive_losses: m.max_consecutive_losses,
            avg_hold_duration_ms: m.avg_hold_duration_ms,
        }
    }
}

pub fn run_metrics(args: MetricsArgs, output: &Output) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let metrics = compute_metrics(&trades);

    tracing::info!(
        "Metrics complete: {} trades, {:.1}% win rate",
        metrics.total_trades,
        metrics.win_rate
    );

    output.emit(&render(&metrics, output.format)?)
}

fn render(metrics: &MetricsResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => ReportFormatter::metrics(metrics),
        OutputFormat::Json => serde_json::to_string_pretty(metrics)?,
        OutputFormat::Csv => to_csv([MetricsRow::from(metrics)])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use trade_analytics_core::TradeOutcome;

    fn winners_only() -> Vec<TradeOutcome> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        [dec!(40), dec!(60)]
            .iter()
            .enumerate()
            .map(|(i, &pnl)| {
                let entry = base + Duration::hours(i as i64);
                TradeOutcome::new(pnl, entry, entry + Duration::minutes(20))
            })
            .collect()
    }

    #[test]
    fn csv_row_uses_storage_sentinel_for_infinite_ratios() {
        let metrics = compute_metrics(&winners_only());
        let csv = render(&metrics, OutputFormat::Csv).unwrap();

        let mut lines = csv.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let values: Vec<&str> = lines.next().unwrap().split(',').collect();
        let column = header.iter().position(|h| *h == "profit_factor").unwrap();

        assert_eq!(values[column], "999.0");
    }

    #[test]
    fn json_keeps_infinite_marker() {
        let metrics = compute_metrics(&winners_only());
        let json = render(&metrics, OutputFormat::Json).unwrap();

        assert!(json.contains("\"profit_factor\": \"infinite\""));
        assert!(!json.contains("999"));
    }
}
