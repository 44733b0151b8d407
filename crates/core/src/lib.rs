pub mod config;
pub mod config_loader;
pub mod error;
pub mod ratio;
pub mod trade;

pub use config::{
    AnalyticsConfig, HistogramSettings, PercentileSettings, RiskSettings, SimulationSettings,
};
pub use config_loader::ConfigLoader;
pub use error::{AnalyticsError, Result};
pub use ratio::Ratio;
pub use trade::{equity_curve, EquityPoint, TradeOutcome};
