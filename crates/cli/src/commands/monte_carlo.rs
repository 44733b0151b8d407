//! Monte Carlo equity projection command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use trade_analytics_core::AnalyticsConfig;
use trade_analytics_engine::{project, CancelFlag, MonteCarloConfig, MonteCarloResult};

use super::{configured_levels, offload, to_csv, Output, OutputFormat};
use crate::report_formatter::ReportFormatter;
use crate::trades_loader::load_trades;

/// Arguments for the monte-carlo command.
#[derive(Args, Debug, Clone, Default)]
pub struct MonteCarloArgs {
    /// Closed trades CSV file
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Number of simulated paths (default from config)
    #[arg(long)]
    pub trials: Option<usize>,

    /// Trades per simulated path (default from config)
    #[arg(long)]
    pub path_length: Option<usize>,

    /// Starting capital for every path (default from config)
    #[arg(long)]
    pub capital: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Drawdown from starting capital, in percent, that counts as ruin
    #[arg(long)]
    pub ruin_threshold: Option<f64>,
}

/// Builds the projection config from loaded settings and flag overrides.
pub fn projection_config(config: &AnalyticsConfig, args: &MonteCarloArgs) -> MonteCarloConfig {
    let sim = &config.simulation;
    let mut mc = MonteCarloConfig::new(
        args.trials.unwrap_or(sim.num_trials),
        args.path_length.unwrap_or(sim.path_length),
        args.capital.unwrap_or(sim.starting_capital),
    )
    .with_levels(configured_levels(config))
    .with_ruin_threshold(
        args.ruin_threshold
            .unwrap_or(config.risk.ruin_threshold_percent),
    )
    .with_parallel_threshold(sim.parallel_threshold);

    if let Some(seed) = args.seed.or(sim.seed) {
        mc = mc.with_seed(seed);
    }
    mc
}

pub async fn run_monte_carlo(
    args: MonteCarloArgs,
    config: &AnalyticsConfig,
    output: &Output,
) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let cancel = CancelFlag::new();
    let mc = projection_config(config, &args).with_cancel(cancel.clone());

    tracing::info!(
        "Projecting {} paths of {} trades from ${:.2}",
        mc.num_trials,
        mc.path_length,
        mc.starting_capital
    );

    let result = offload(move || project(&trades, &mc), cancel).await?;

    tracing::info!(
        "Projection complete: median final equity ${:.2}, {:.1}% profitable (seed {})",
        result.median_final_equity,
        result.probability_of_profit,
        result.seed
    );

    output.emit(&render(&result, output.format)?)
}

fn render(result: &MonteCarloResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => ReportFormatter::monte_carlo(result),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Csv => to_csv(&result.bands)?,
    })
}
