use serde::{Deserialize, Serialize};

/// Host-side defaults for analytics runs.
///
/// The engine itself takes every required value as an explicit argument;
/// these settings are what a host application feeds it when the user does
/// not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub simulation: SimulationSettings,
    pub percentiles: PercentileSettings,
    pub histogram: HistogramSettings,
    pub risk: RiskSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub num_trials: usize,
    pub path_length: usize,
    pub starting_capital: f64,
    /// Draws per bootstrap resample; `None` resamples the history length.
    pub sample_size: Option<usize>,
    pub seed: Option<u64>,
    /// Trial count at or above which trials run on the rayon pool.
    pub parallel_threshold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileSettings {
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSettings {
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub risk_per_trade_percent: f64,
    pub ruin_threshold_percent: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            percentiles: PercentileSettings::default(),
            histogram: HistogramSettings::default(),
            risk: RiskSettings::default(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_trials: 1_000,
            path_length: 100,
            starting_capital: 10_000.0,
            sample_size: None,
            seed: None,
            parallel_threshold: 2_000,
        }
    }
}

impl Default for PercentileSettings {
    fn default() -> Self {
        Self {
            lower: 5.0,
            median: 50.0,
            upper: 95.0,
        }
    }
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self { bins: 20 }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            risk_per_trade_percent: 1.0,
            ruin_threshold_percent: 50.0,
        }
    }
}
