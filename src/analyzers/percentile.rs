use serde::Serialize;

use crate::error::{DetectionError, Result};
use crate::models::{StationSeries, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileEntry {
    pub percentile: f64,
    pub value: f64,
}

/// Quantiles of a variable over a filtered dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileProfile {
    /// Number of valid values the profile was computed from
    pub sample_size: usize,
    pub entries: Vec<PercentileEntry>,
}

impl PercentileProfile {
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.percentile == percentile)
            .map(|e| e.value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Percentiles over the finite values, interpolating linearly between
/// the two closest ranks.
///
/// Percentiles must lie within `0..=100`. Fewer than one valid value yields
/// an empty profile.
pub fn percentile_profile<I>(values: I, percentiles: &[f64]) -> Result<PercentileProfile>
where
    I: IntoIterator<Item = f64>,
{
    if let Some(bad) = percentiles
        .iter()
        .find(|p| !(0.0..=100.0).contains(*p))
    {
        return Err(DetectionError::InvalidPercentile(*bad));
    }

    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Ok(PercentileProfile::default());
    }
    sorted.sort_by(f64::total_cmp);

    let entries = percentiles
        .iter()
        .map(|&percentile| PercentileEntry {
            percentile,
            value: interpolate(&sorted, percentile / 100.0),
        })
        .collect();

    Ok(PercentileProfile {
        sample_size: sorted.len(),
        entries,
    })
}

/// Profile of one variable across a set of stations
pub fn variable_profile(
    stations: &[StationSeries],
    variable: Variable,
    percentiles: &[f64],
) -> Result<PercentileProfile> {
    percentile_profile(
        stations.iter().flat_map(|s| s.values(variable)),
        percentiles,
    )
}

fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
