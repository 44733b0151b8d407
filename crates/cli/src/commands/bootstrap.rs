//! Bootstrap confidence interval command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use trade_analytics_core::AnalyticsConfig;
use trade_analytics_engine::{resample, BootstrapConfig, BootstrapResult, CancelFlag};

use super::{configured_levels, offload, to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the bootstrap command.
#[derive(Args, Debug, Clone, Default)]
pub struct BootstrapArgs {
    /// Closed trades CSV file
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Number of resamples (default from config)
    #[arg(long)]
    pub trials: Option<usize>,

    /// Trades drawn per resample (default: history length)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Histogram bins for the net P/L distribution (default from config)
    #[arg(long)]
    pub bins: Option<usize>,
}

/// Builds the resampling config from loaded settings and flag overrides.
pub fn resample_config(config: &AnalyticsConfig, args: &BootstrapArgs) -> BootstrapConfig {
    let sim = &config.simulation;
    let mut bc = BootstrapConfig::new(args.trials.unwrap_or(sim.num_trials))
        .with_levels(configured_levels(config))
        .with_histogram_bins(args.bins.unwrap_or(config.histogram.bins))
        .with_parallel_threshold(sim.parallel_threshold);

    if let Some(size) = args.sample_size.or(sim.sample_size) {
        bc = bc.with_sample_size(size);
    }
    if let Some(seed) = args.seed.or(sim.seed) {
        bc = bc.with_seed(seed);
    }
    bc
}

pub async fn run_bootstrap(
    args: BootstrapArgs,
    config: &AnalyticsConfig,
    output: &Output,
) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let cancel = CancelFlag::new();
    let bc = resample_config(config, &args).with_cancel(cancel.clone());

    tracing::info!("Bootstrapping {} resamples of {} trades", bc.num_trials, trades.len());

    let result = offload(move || resample(&trades, &bc), cancel).await?;

    tracing::info!(
        "Bootstrap complete: win rate CI [{:.1}%, {:.1}%] (seed {})",
        result.win_rate_ci.lower,
        result.win_rate_ci.upper,
        result.seed
    );

    output.emit(&render(&result, output.format)?)
}

fn render(result: &BootstrapResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => ReportFormatter::bootstrap(result),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Csv => to_csv(&result.histogram)?,
    })
}
