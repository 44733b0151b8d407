use std::path::Path;

use crate::config::AnalyticsConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads analytics configuration by layering built-in defaults, TOML,
    /// environment variables, and JSON.
    ///
    /// Missing files are skipped. Nested keys come from the environment with
    /// a double underscore, e.g. `ANALYTICS_SIMULATION__NUM_TRIALS=5000`.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source exists but cannot be parsed.
    pub fn load() -> Result<AnalyticsConfig> {
        let config: AnalyticsConfig = Self::base()
            .merge(Toml::file("config/Analytics.toml"))
            .merge(Env::prefixed("ANALYTICS_").split("__"))
            .join(Json::file("config/Analytics.json"))
            .extract()?;

        tracing::debug!(?config, "loaded analytics configuration");
        Ok(config)
    }

    /// Loads configuration from an explicit TOML file, still honouring
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AnalyticsConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let config: AnalyticsConfig = Self::base()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ANALYTICS_").split("__"))
            .extract()?;

        tracing::debug!(path = %path.display(), ?config, "loaded analytics configuration");
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AnalyticsConfig::default()))
    }
}
