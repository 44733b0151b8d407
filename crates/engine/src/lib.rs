//! Performance and risk analytics over historical trade outcomes.
//!
//! Every entry point is a pure, synchronous function of its inputs. The
//! simulations are CPU-bound; hosts that need a responsive thread should run
//! them on a blocking worker.

pub mod bootstrap;
pub mod drawdown;
pub mod metrics;
pub mod monte_carlo;
pub mod percentile;
pub mod risk_of_ruin;
pub mod trials;

pub use bootstrap::{resample, BootstrapConfig, BootstrapResult, ConfidenceInterval, HistogramBin};
pub use drawdown::{analyze, analyze_trades, DrawdownAnalysis, DrawdownEpisode, TimeUnderwaterStats};
pub use metrics::{compute_metrics, MetricsResult};
pub use monte_carlo::{project, EquityBand, MonteCarloConfig, MonteCarloResult};
pub use percentile::{percentile, PercentileLevels};
pub use risk_of_ruin::{estimate, estimate_from_metrics, RiskOfRuinResult};
pub use trials::{CancelFlag, TrialRunner};

pub use trade_analytics_core::{AnalyticsError, EquityPoint, Ratio, Result, TradeOutcome};
