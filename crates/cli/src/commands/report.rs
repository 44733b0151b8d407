//! Full analytics report: every analysis over one trades file.
//!
//! Sections that need more history than the file holds are reported as
//! unavailable instead of failing the whole report.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use trade_analytics_core::{AnalyticsConfig, AnalyticsError};
use trade_analytics_engine::{
    analyze_trades, compute_metrics, estimate_from_metrics, project, resample, BootstrapResult,
    CancelFlag, DrawdownAnalysis, MetricsResult, MonteCarloResult, RiskOfRuinResult,
};

use super::bootstrap::{resample_config, BootstrapArgs};
use super::metrics::MetricsRow;
use super::monte_carlo::{projection_config, MonteCarloArgs};
use super::{offload, to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Closed trades CSV file
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Account balance before the first trade (0 measures cumulative P/L)
    #[arg(long, default_value = "0")]
    pub initial_balance: Decimal,

    /// RNG seed for reproducible simulations
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Every analysis for one trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metrics: MetricsResult,
    pub drawdown: Option<DrawdownAnalysis>,
    pub monte_carlo: Option<MonteCarloResult>,
    pub bootstrap: Option<BootstrapResult>,
    pub risk_of_ruin: Option<RiskOfRuinResult>,
}

pub async fn run_report(args: ReportArgs, config: &AnalyticsConfig, output: &Output) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let metrics = compute_metrics(&trades);

    let drawdown = available("drawdown", analyze_trades(args.initial_balance, &trades))?;
    let risk_of_ruin = available(
        "risk of ruin",
        estimate_from_metrics(
            &metrics,
            config.risk.risk_per_trade_percent,
            config.risk.ruin_threshold_percent,
        ),
    )?;

    let cancel = CancelFlag::new();
    let mc = projection_config(
        config,
        &MonteCarloArgs {
            seed: args.seed,
            ..Default::default()
        },
    )
    .with_cancel(cancel.clone());
    let bc = resample_config(
        config,
        &BootstrapArgs {
            seed: args.seed,
            ..Default::default()
        },
    )
    .with_cancel(cancel.clone());

    let (projection, resampled) = offload(
        move || Ok((project(&trades, &mc), resample(&trades, &bc))),
        cancel,
    )
    .await?;

    let report = AnalyticsReport {
        metrics,
        drawdown,
        monte_carlo: available("monte carlo", projection)?,
        bootstrap: available("bootstrap", resampled)?,
        risk_of_ruin,
    };

    tracing::info!("Report complete for {} trades", report.metrics.total_trades);

    output.emit(&render(&report, output.format)?)
}

/// Turns a data-shortage error into an absent section.
fn available<T>(section: &str, outcome: std::result::Result<T, AnalyticsError>) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_insufficient_data() => {
            tracing::warn!("Skipping {} section: {}", section, e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn render(report: &AnalyticsReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => ReportFormatter::report(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Csv => to_csv([MetricsRow::from(&report.metrics)])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_becomes_missing_section() {
        let short: std::result::Result<(), _> = Err(AnalyticsError::InsufficientHistory {
            required: 10,
            actual: 3,
        });
        assert!(available("monte carlo", short).unwrap().is_none());

        let empty: std::result::Result<(), _> = Err(AnalyticsError::EmptyInput);
        assert!(available("drawdown", empty).unwrap().is_none());
    }

    #[test]
    fn other_errors_fail_the_report() {
        let cancelled: std::result::Result<(), _> = Err(AnalyticsError::Cancelled);
        assert!(available("bootstrap", cancelled).is_err());

        let invalid: std::result::Result<(), _> =
            Err(AnalyticsError::invalid("bad threshold"));
        assert!(available("risk of ruin", invalid).is_err());
    }

    #[test]
    fn present_values_pass_through() {
        assert_eq!(available("metrics", Ok(5)).unwrap(), Some(5));
    }
}
