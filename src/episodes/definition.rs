use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{DetectionError, Result};
use crate::models::Variable;
use crate::thresholds::{Direction, Severity, ThresholdRegistry};
use crate::utils::constants::{
    COLD_SNAP_MIN_DAYS, COLD_SNAP_TN, DELUGE_RR, DRY_DAY_RR, DRY_SPELL_MIN_DAYS, HEATWAVE_MIN_DAYS,
    HEATWAVE_TX, SINGLE_DAY_MIN_DAYS, STORM_GUST_FXY, STORM_WIND_FFM, TROPICAL_NIGHT_TN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn test(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Gt => value > threshold,
            Comparison::Ge => value >= threshold,
            Comparison::Lt => value < threshold,
            Comparison::Le => value <= threshold,
        }
    }

    /// Upward comparisons report the run maximum, downward ones the minimum
    pub fn direction(&self) -> Direction {
        match self {
            Comparison::Gt | Comparison::Ge => Direction::Ascending,
            Comparison::Lt | Comparison::Le => Direction::Descending,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
        }
    }
}

/// How a calendar gap between two consecutive rows affects a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// A missing day ends the run
    #[default]
    BreakOnGap,
    /// Consecutive rows continue the run whatever their dates
    RowAdjacency,
}

/// A phenomenon: a daily predicate plus a minimum run length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EpisodeDefinition {
    #[validate(length(min = 1))]
    pub name: String,
    pub variable: Variable,
    pub comparison: Comparison,
    pub threshold: f64,
    #[validate(range(min = 1))]
    pub min_duration_days: usize,
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

impl EpisodeDefinition {
    pub fn new(
        name: impl Into<String>,
        variable: Variable,
        comparison: Comparison,
        threshold: f64,
        min_duration_days: usize,
    ) -> Self {
        Self {
            name: name.into(),
            variable,
            comparison,
            threshold,
            min_duration_days,
            gap_policy: GapPolicy::default(),
        }
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Days at or beyond a classifier tier, e.g. "TN at very-cold or worse"
    pub fn from_tier(
        name: impl Into<String>,
        registry: &ThresholdRegistry,
        variable: Variable,
        severity: Severity,
        min_duration_days: usize,
    ) -> Result<Self> {
        let spec = registry.require(variable)?;
        let boundary = spec
            .boundary(severity)
            .ok_or_else(|| DetectionError::InvalidThresholds {
                variable: variable.to_string(),
                message: format!("no '{}' tier configured", severity),
            })?;
        let comparison = match spec.direction {
            Direction::Ascending => Comparison::Ge,
            Direction::Descending => Comparison::Le,
        };

        let definition = Self::new(name, variable, comparison, boundary, min_duration_days);
        definition.check()?;
        Ok(definition)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        if !self.threshold.is_finite() {
            return Err(DetectionError::Config(format!(
                "episode '{}' has a non-finite threshold",
                self.name
            )));
        }
        Ok(())
    }

    /// Missing and non-finite values never qualify
    pub fn qualifies(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| v.is_finite() && self.comparison.test(v, self.threshold))
    }

    pub fn direction(&self) -> Direction {
        self.comparison.direction()
    }
}

impl fmt::Display for EpisodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {} for {}+ days",
            self.name,
            self.variable,
            self.comparison.symbol(),
            self.threshold,
            self.min_duration_days
        )
    }
}

/// Named episode definitions, in registration order
#[derive(Debug, Clone, Default)]
pub struct EpisodeCatalog {
    definitions: Vec<EpisodeDefinition>,
}

impl EpisodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self> {
        Self::from_definitions(builtin_definitions())
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = EpisodeDefinition>) -> Result<Self> {
        definitions
            .into_iter()
            .try_fold(Self::new(), |catalog, definition| catalog.with_definition(definition))
    }

    pub fn with_definition(mut self, definition: EpisodeDefinition) -> Result<Self> {
        definition.check()?;
        if self.definitions.iter().any(|d| d.name == definition.name) {
            return Err(DetectionError::Config(format!(
                "episode '{}' defined twice",
                definition.name
            )));
        }
        self.definitions.push(definition);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<&EpisodeDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DetectionError::UnknownEpisode(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpisodeDefinition> {
        self.definitions.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Phenomena tracked out of the box
pub fn builtin_definitions() -> Vec<EpisodeDefinition> {
    use Comparison::{Ge, Gt, Lt};
    use Variable::{GustSpeed, MaxTemperature, MinTemperature, Precipitation, WindSpeed};

    vec![
        EpisodeDefinition::new("heatwave", MaxTemperature, Gt, HEATWAVE_TX, HEATWAVE_MIN_DAYS),
        EpisodeDefinition::new("cold_snap", MinTemperature, Lt, COLD_SNAP_TN, COLD_SNAP_MIN_DAYS),
        EpisodeDefinition::new(
            "tropical_night",
            MinTemperature,
            Gt,
            TROPICAL_NIGHT_TN,
            SINGLE_DAY_MIN_DAYS,
        ),
        EpisodeDefinition::new("deluge", Precipitation, Ge, DELUGE_RR, SINGLE_DAY_MIN_DAYS),
        EpisodeDefinition::new("storm_wind", WindSpeed, Gt, STORM_WIND_FFM, SINGLE_DAY_MIN_DAYS),
        EpisodeDefinition::new("storm_gust", GustSpeed, Gt, STORM_GUST_FXY, SINGLE_DAY_MIN_DAYS),
        EpisodeDefinition::new("dry_spell", Precipitation, Lt, DRY_DAY_RR, DRY_SPELL_MIN_DAYS),
    ]
}
