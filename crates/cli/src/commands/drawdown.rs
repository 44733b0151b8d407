//! Drawdown analysis command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;

use trade_analytics_engine::{analyze_trades, DrawdownAnalysis};

use super::{to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the drawdown command.
#[derive(Args, Debug, Clone)]
pub struct DrawdownArgs {
    /// Closed trades CSV file
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Account balance before the first trade (0 measures cumulative P/L)
    #[arg(long, default_value = "0")]
    pub initial_balance: Decimal,
}

pub fn run_drawdown(args: DrawdownArgs, output: &Output) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let analysis = analyze_trades(args.initial_balance, &trades)
        .context("Drawdown analysis failed")?;

    tracing::info!(
        "Drawdown analysis complete: {} episodes, deepest {:.2}%",
        analysis.episodes.len(),
        analysis.stats.deepest_drawdown_percent
    );

    output.emit(&render(&analysis, output.format)?)
}

fn render(analysis: &DrawdownAnalysis, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => ReportFormatter::drawdown(analysis),
        OutputFormat::Json => serde_json::to_string_pretty(analysis)?,
        OutputFormat::Csv => to_csv(&analysis.episodes)?,
    })
}
