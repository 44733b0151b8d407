use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod report_formatter;
mod trades_loader;

use commands::{
    BootstrapArgs, DrawdownArgs, MetricsArgs, MonteCarloArgs, Output, OutputFormat, ReportArgs,
    RiskOfRuinArgs,
};
use trade_analytics_core::ConfigLoader;

#[derive(Parser)]
#[command(name = "trade-analytics")]
#[command(about = "Performance and risk analytics for closed trades", long_about = None)]
struct Cli {
    /// Config file path (default: config/Analytics.toml with env overrides)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: text, json, csv (default: text)
    #[arg(long, global = true, default_value = "text")]
    format: String,

    /// Also write the rendered result to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute performance metrics for a trade history
    Metrics(MetricsArgs),
    /// Segment the equity curve into drawdown episodes
    Drawdown(DrawdownArgs),
    /// Project future equity by resampling historical trades
    MonteCarlo(MonteCarloArgs),
    /// Bootstrap confidence intervals for win rate, profit factor and net P/L
    Bootstrap(BootstrapArgs),
    /// Estimate the probability of ruin from edge and position size
    RiskOfRuin(RiskOfRuinArgs),
    /// Run every analysis and print a combined report
    Report(ReportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    let output = Output::new(OutputFormat::parse(&cli.format)?, cli.output);

    match cli.command {
        Commands::Metrics(args) => commands::run_metrics(args, &output)?,
        Commands::Drawdown(args) => commands::run_drawdown(args, &output)?,
        Commands::MonteCarlo(args) => commands::run_monte_carlo(args, &config, &output).await?,
        Commands::Bootstrap(args) => commands::run_bootstrap(args, &config, &output).await?,
        Commands::RiskOfRuin(args) => commands::run_risk_of_ruin(args, &config, &output)?,
        Commands::Report(args) => commands::run_report(args, &config, &output).await?,
    }

    Ok(())
}
