//! CLI commands for the analytics engine.

pub mod bootstrap;
pub mod drawdown;
pub mod metrics;
pub mod monte_carlo;
pub mod report;
pub mod risk_of_ruin;

pub use bootstrap::{run_bootstrap, BootstrapArgs};
pub use drawdown::{run_drawdown, DrawdownArgs};
pub use metrics::{run_metrics, MetricsArgs};
pub use monte_carlo::{run_monte_carlo, MonteCarloArgs};
pub use report::{run_report, ReportArgs};
pub use risk_of_ruin::{run_risk_of_ruin, RiskOfRuinArgs};

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use trade_analytics_core::AnalyticsConfig;
use trade_analytics_engine::{CancelFlag, PercentileLevels};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json, csv",
                s
            )),
        }
    }
}

/// Where and how a command writes its result.
#[derive(Debug, Clone)]
pub struct Output {
    pub format: OutputFormat,
    pub path: Option<PathBuf>,
}

impl Output {
    pub fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    /// Prints the rendered result and copies it to the output file, if any.
    pub fn emit(&self, rendered: &str) -> Result<()> {
        println!("{}", rendered);

        if let Some(path) = &self.path {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write results to {}", path.display()))?;
            tracing::info!("Results written to {}", path.display());
        }

        Ok(())
    }
}

/// Serializes rows as CSV with a header line.
pub fn to_csv<T, I>(rows: I) -> Result<String>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Percentile levels configured for bands and confidence intervals.
pub fn configured_levels(config: &AnalyticsConfig) -> PercentileLevels {
    PercentileLevels::new(
        config.percentiles.lower,
        config.percentiles.median,
        config.percentiles.upper,
    )
}

/// Runs a CPU-bound analytics job on the blocking pool.
///
/// Ctrl-C raises `cancel`; the job observes it between trials and the
/// resulting `Cancelled` error is returned once the worker has stopped.
pub async fn offload<T, F>(job: F, cancel: CancelFlag) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> trade_analytics_core::Result<T> + Send + 'static,
{
    let mut handle = tokio::task::spawn_blocking(job);

    tokio::select! {
        joined = &mut handle => Ok(joined.context("Analytics worker panicked")??),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupt received, cancelling simulation");
            cancel.cancel();
            Ok(handle.await.context("Analytics worker panicked")??)
        }
    }
}
