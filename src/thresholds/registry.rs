use std::collections::HashMap;

use crate::error::{DetectionError, Result};
use crate::models::{ClassifiedReading, StationSeries, Variable, WeatherRecord};
use crate::thresholds::spec::to_bounds;
use crate::thresholds::{Direction, Severity, ThresholdSpec};
use crate::utils::constants::{FFM_TIERS, FXY_TIERS, RR_TIERS, TN_TIERS, TX_TIERS};

/// Threshold specs keyed by variable; the classifier entry point.
///
/// Classification is pure: a missing value or a variable with no spec is
/// `Unclassifiable`, anything else resolves through the variable's tiers.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRegistry {
    specs: HashMap<Variable, ThresholdSpec>,
}

impl ThresholdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in thresholds for TX, TN, RR, FFM and FXY
    pub fn builtin() -> Result<Self> {
        Self::from_specs(builtin_specs())
    }

    pub fn from_specs(specs: impl IntoIterator<Item = ThresholdSpec>) -> Result<Self> {
        specs
            .into_iter()
            .try_fold(Self::new(), |registry, spec| registry.with_spec(spec))
    }

    pub fn with_spec(mut self, spec: ThresholdSpec) -> Result<Self> {
        spec.check()?;
        if self.specs.contains_key(&spec.variable) {
            return Err(DetectionError::InvalidThresholds {
                variable: spec.variable.to_string(),
                message: "registered twice".to_string(),
            });
        }
        self.specs.insert(spec.variable, spec);
        Ok(self)
    }

    pub fn get(&self, variable: Variable) -> Option<&ThresholdSpec> {
        self.specs.get(&variable)
    }

    /// Like [`get`](Self::get) but a missing spec is a configuration error
    pub fn require(&self, variable: Variable) -> Result<&ThresholdSpec> {
        self.get(variable)
            .ok_or_else(|| DetectionError::UnknownVariable(variable.to_string()))
    }

    pub fn variables(&self) -> Vec<Variable> {
        let mut variables: Vec<Variable> = self.specs.keys().copied().collect();
        variables.sort();
        variables
    }

    pub fn classify(&self, variable: Variable, value: Option<f64>) -> Severity {
        match (self.specs.get(&variable), value) {
            (Some(spec), Some(v)) => spec.classify(v),
            _ => Severity::Unclassifiable,
        }
    }

    /// Display name of a level for a variable, e.g. `extreme-cold`
    pub fn tier_name(&self, variable: Variable, severity: Severity) -> &str {
        self.get(variable)
            .and_then(|spec| spec.tier_name(severity))
            .unwrap_or_else(|| severity.as_str())
    }

    pub fn classify_label(&self, variable: Variable, value: Option<f64>) -> &str {
        self.tier_name(variable, self.classify(variable, value))
    }

    pub fn classify_record(&self, record: &WeatherRecord, variable: Variable) -> ClassifiedReading {
        let value = record.value(variable);
        ClassifiedReading {
            station_id: record.station_id,
            date: record.date,
            variable,
            value,
            severity: self.classify(variable, value),
        }
    }

    /// Lazily classify every row of a station for one variable
    pub fn classify_series<'a>(
        &'a self,
        series: &'a StationSeries,
        variable: Variable,
    ) -> impl Iterator<Item = ClassifiedReading> + 'a {
        series
            .records
            .iter()
            .map(move |record| self.classify_record(record, variable))
    }
}

/// Unchecked built-in specs; registries check them on insertion
pub fn builtin_specs() -> Vec<ThresholdSpec> {
    let spec = |variable, direction, tiers: &[(&str, f64)]| ThresholdSpec {
        variable,
        direction,
        tiers: to_bounds(tiers),
    };

    vec![
        spec(Variable::MaxTemperature, Direction::Ascending, &TX_TIERS),
        spec(Variable::MinTemperature, Direction::Descending, &TN_TIERS),
        spec(Variable::Precipitation, Direction::Ascending, &RR_TIERS),
        spec(Variable::WindSpeed, Direction::Ascending, &FFM_TIERS),
        spec(Variable::GustSpeed, Direction::Ascending, &FXY_TIERS),
    ]
}
