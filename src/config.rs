use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

use crate::episodes::definition::builtin_definitions;
use crate::episodes::{EpisodeCatalog, EpisodeDefinition};
use crate::error::{DetectionError, Result};
use crate::thresholds::registry::builtin_specs;
use crate::thresholds::{ThresholdRegistry, ThresholdSpec};
use crate::utils::constants::{DEFAULT_PERCENTILES, ENV_PREFIX};

/// Engine configuration: classifier tiers, episode definitions and the
/// percentile set.
///
/// Every section falls back to the built-in defaults when absent, so an
/// empty file (or no file) yields the stock engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EngineConfig {
    #[serde(default = "builtin_specs")]
    pub thresholds: Vec<ThresholdSpec>,

    #[serde(default = "builtin_definitions")]
    pub episodes: Vec<EpisodeDefinition>,

    #[serde(default = "default_percentiles")]
    #[validate(length(min = 1))]
    pub percentiles: Vec<f64>,
}

fn default_percentiles() -> Vec<f64> {
    DEFAULT_PERCENTILES.to_vec()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: builtin_specs(),
            episodes: builtin_definitions(),
            percentiles: default_percentiles(),
        }
    }
}

impl EngineConfig {
    /// Load from an optional file (TOML, JSON or YAML by extension) layered
    /// under `WEATHER_EXTREMES__*` environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DetectionError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("percentiles")
                    .try_parsing(true),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.check()?;

        debug!(
            thresholds = config.thresholds.len(),
            episodes = config.episodes.len(),
            percentiles = config.percentiles.len(),
            "engine configuration loaded"
        );
        Ok(config)
    }

    /// Validate every section; fails before any data is processed
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if let Some(bad) = self
            .percentiles
            .iter()
            .find(|p| !(0.0..=100.0).contains(*p))
        {
            return Err(DetectionError::InvalidPercentile(*bad));
        }

        self.registry()?;
        self.catalog()?;
        Ok(())
    }

    pub fn registry(&self) -> Result<ThresholdRegistry> {
        ThresholdRegistry::from_specs(self.thresholds.iter().cloned())
    }

    pub fn catalog(&self) -> Result<EpisodeCatalog> {
        EpisodeCatalog::from_definitions(self.episodes.iter().cloned())
    }
}
