//! Risk-of-ruin command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use trade_analytics_core::AnalyticsConfig;
use trade_analytics_engine::{compute_metrics, estimate, estimate_from_metrics, RiskOfRuinResult};

use super::{to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the risk-of-ruin command.
///
/// Either pass `--win-rate` and `--payoff` directly or derive both from a
/// trades file.
#[derive(Args, Debug, Clone, Default)]
pub struct RiskOfRuinArgs {
    /// Probability of a winning trade, 0 to 1
    #[arg(long, required_unless_present = "trades", conflicts_with = "trades")]
    pub win_rate: Option<f64>,

    /// Average win divided by average loss
    #[arg(long, required_unless_present = "trades", conflicts_with = "trades")]
    pub payoff: Option<f64>,

    /// Closed trades CSV file to derive win rate and payoff from
    #[arg(short, long)]
    pub trades: Option<PathBuf>,

    /// Percent of capital risked per trade (default from config)
    #[arg(long)]
    pub risk: Option<f64>,

    /// Percent of capital whose loss counts as ruin (default from config)
    #[arg(long)]
    pub ruin_threshold: Option<f64>,
}

pub fn run_risk_of_ruin(
    args: RiskOfRuinArgs,
    config: &AnalyticsConfig,
    output: &Output,
) -> Result<()> {
    let result = evaluate(&args, config)?;

    tracing::info!(
        "Risk of ruin: {:.4}% (edge {:.4})",
        result.ruin_probability_percent,
        result.edge
    );

    let rendered = match output.format {
        OutputFormat::Text => ReportFormatter::risk_of_ruin(&result),
        OutputFormat::Json => serde_json::to_string_pretty(&result)?,
        OutputFormat::Csv => to_csv([result])?,
    };
    output.emit(&rendered)
}

fn evaluate(args: &RiskOfRuinArgs, config: &AnalyticsConfig) -> Result<RiskOfRuinResult> {
    let risk = args.risk.unwrap_or(config.risk.risk_per_trade_percent);
    let ruin = args
        .ruin_threshold
        .unwrap_or(config.risk.ruin_threshold_percent);

    let result = match (&args.trades, args.win_rate, args.payoff) {
        (Some(path), _, _) => {
            let metrics = compute_metrics(&load_trades(path)?);
            estimate_from_metrics(&metrics, risk, ruin)
        }
        (None, Some(win_rate), Some(payoff)) => estimate(win_rate, payoff, risk, ruin),
        _ => anyhow::bail!("Either --trades or both --win-rate and --payoff are required"),
    };

    result.context("Risk-of-ruin estimate failed")
}
