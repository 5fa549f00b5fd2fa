use serde::Serialize;
use std::cmp::Ordering;

use crate::models::{ClassifiedReading, StationSeries, Variable};
use crate::thresholds::{Direction, Severity, ThresholdRegistry};

/// Readings at or beyond `floor`, most extreme first.
///
/// Variables without thresholds yield no events.
pub fn extreme_events(
    registry: &ThresholdRegistry,
    stations: &[StationSeries],
    variable: Variable,
    floor: Severity,
) -> Vec<ClassifiedReading> {
    let Some(spec) = registry.get(variable) else {
        return Vec::new();
    };

    let mut events: Vec<ClassifiedReading> = stations
        .iter()
        .flat_map(|series| registry.classify_series(series, variable))
        .filter(|reading| reading.severity.is_tier() && reading.is_at_least(floor))
        .collect();

    events.sort_by(|a, b| {
        compare_extremity(spec.direction, a.value, b.value)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.station_id.cmp(&b.station_id))
    });
    events
}

/// Per-station aggregate of threshold crossings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationExtremes {
    pub station_id: u32,
    pub station_name: Option<String>,
    pub variable: Variable,
    pub event_count: usize,
    /// Most extreme value among the events
    pub peak_value: f64,
    pub mean_value: f64,
}

/// Count, peak and mean of readings at or beyond `floor` for each station
/// that has any
pub fn station_extremes(
    registry: &ThresholdRegistry,
    stations: &[StationSeries],
    variable: Variable,
    floor: Severity,
) -> Vec<StationExtremes> {
    let Some(spec) = registry.get(variable) else {
        return Vec::new();
    };

    stations
        .iter()
        .filter_map(|series| {
            let mut count = 0usize;
            let mut sum = 0.0;
            let mut peak: Option<f64> = None;

            for reading in registry.classify_series(series, variable) {
                let Some(value) = reading.value else { continue };
                if !reading.severity.is_tier() || !reading.is_at_least(floor) {
                    continue;
                }
                count += 1;
                sum += value;
                peak = match peak {
                    Some(p) if !spec.direction.is_more_extreme(value, p) => Some(p),
                    _ => Some(value),
                };
            }

            peak.map(|peak_value| StationExtremes {
                station_id: series.station_id,
                station_name: series.station_name.clone(),
                variable,
                event_count: count,
                peak_value,
                mean_value: sum / count as f64,
            })
        })
        .collect()
}

/// Ordering that puts the more extreme value first; missing values last
pub(crate) fn compare_extremity(direction: Direction, a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            Direction::Ascending => b.total_cmp(&a),
            Direction::Descending => a.total_cmp(&b),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
