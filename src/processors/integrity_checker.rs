use crate::models::{StationSeries, Variable};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Precondition report for a station table.
///
/// The detection engine assumes ascending, duplicate-free dates per
/// station. This report makes violations visible; it never repairs them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub stations: usize,
    pub violations: Vec<IntegrityViolation>,
    /// Days skipped between consecutive rows, per station
    pub calendar_gaps: BTreeMap<u32, usize>,
    /// Missing readings per variable
    pub missing_values: BTreeMap<Variable, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityViolation {
    pub station_id: u32,
    pub date: chrono::NaiveDate,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    OutOfOrder,
    DuplicateDate,
    OutOfRange,
    MinAboveMax,
}

impl IntegrityReport {
    pub fn count(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }

    /// True when every station satisfies the engine's ordering precondition
    pub fn is_ordered(&self) -> bool {
        self.count(ViolationType::OutOfOrder) == 0 && self.count(ViolationType::DuplicateDate) == 0
    }
}

pub struct IntegrityChecker {
    max_reported: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self { max_reported: 10 }
    }

    /// Cap on violations listed by `generate_summary`
    pub fn with_max_reported(max_reported: usize) -> Self {
        Self { max_reported }
    }

    pub fn check_integrity(&self, stations: &[StationSeries]) -> IntegrityReport {
        let mut report = IntegrityReport {
            stations: stations.len(),
            missing_values: Variable::ALL.iter().map(|v| (*v, 0)).collect(),
            ..IntegrityReport::default()
        };

        for series in stations {
            report.total_records += series.len();
            self.check_records(series, &mut report);
            self.check_time_series(series, &mut report);
        }

        if !report.is_ordered() {
            warn!(
                out_of_order = report.count(ViolationType::OutOfOrder),
                duplicates = report.count(ViolationType::DuplicateDate),
                "station table violates the chronological ordering precondition"
            );
        }

        report
    }

    fn check_records(&self, series: &StationSeries, report: &mut IntegrityReport) {
        for record in &series.records {
            for variable in Variable::ALL {
                if record.value(variable).is_none() {
                    *report.missing_values.entry(variable).or_default() += 1;
                }
            }

            if let Err(e) = record.validate_relationships() {
                let violation_type = match (record.value(Variable::MinTemperature), record.value(Variable::MaxTemperature)) {
                    (Some(min), Some(max)) if min > max => ViolationType::MinAboveMax,
                    _ => ViolationType::OutOfRange,
                };
                report.violations.push(IntegrityViolation {
                    station_id: record.station_id,
                    date: record.date,
                    violation_type,
                    details: e.to_string(),
                });
            }
        }
    }

    fn check_time_series(&self, series: &StationSeries, report: &mut IntegrityReport) {
        for window in series.records.windows(2) {
            let prev = &window[0];
            let curr = &window[1];
            let step = (curr.date - prev.date).num_days();

            let violation_type = match step {
                1 => continue,
                0 => ViolationType::DuplicateDate,
                s if s < 0 => ViolationType::OutOfOrder,
                s => {
                    *report.calendar_gaps.entry(series.station_id).or_default() += (s - 1) as usize;
                    continue;
                }
            };

            report.violations.push(IntegrityViolation {
                station_id: series.station_id,
                date: curr.date,
                violation_type,
                details: format!("{} follows {}", curr.date, prev.date),
            });
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Stations: {}\n", report.stations));
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Out-of-order rows: {}\n",
            report.count(ViolationType::OutOfOrder)
        ));
        summary.push_str(&format!(
            "Duplicate dates: {}\n",
            report.count(ViolationType::DuplicateDate)
        ));
        summary.push_str(&format!(
            "Implausible values: {}\n",
            report.count(ViolationType::OutOfRange) + report.count(ViolationType::MinAboveMax)
        ));
        summary.push_str(&format!(
            "Skipped calendar days: {}\n",
            report.calendar_gaps.values().sum::<usize>()
        ));

        if !report.missing_values.is_empty() {
            summary.push_str("\nMissing readings:\n");
            for (variable, count) in &report.missing_values {
                summary.push_str(&format!("  {}: {}\n", variable, count));
            }
        }

        if !report.violations.is_empty() {
            summary.push_str(&format!("\nTop {} Violations:\n", self.max_reported));
            for (i, violation) in report.violations.iter().take(self.max_reported).enumerate() {
                summary.push_str(&format!(
                    "  {}. Station {} on {}: {}\n",
                    i + 1,
                    violation.station_id,
                    violation.date,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherRecord;
    use chrono::NaiveDate;

    fn record(day: u32, tx: f64) -> WeatherRecord {
        WeatherRecord::builder()
            .station_id(5)
            .date(NaiveDate::from_ymd_opt(2023, 3, day).unwrap())
            .max_temp(tx)
            .build()
            .unwrap()
    }

    #[test]
    fn test_clean_series() {
        let series = StationSeries::new(5, vec![record(1, 10.0), record(2, 11.0), record(3, 12.0)]);
        let report = IntegrityChecker::new().check_integrity(&[series]);

        assert!(report.is_ordered());
        assert!(report.violations.is_empty());
        assert_eq!(report.total_records, 3);
        assert_eq!(report.missing_values[&Variable::MaxTemperature], 0);
        assert_eq!(report.missing_values[&Variable::MinTemperature], 3);
    }

    #[test]
    fn test_ordering_violations_and_gaps() {
        let series = StationSeries::new(
            5,
            vec![
                record(1, 10.0),
                record(4, 11.0),
                record(3, 12.0),
                record(3, 12.5),
            ],
        );
        let report = IntegrityChecker::new().check_integrity(&[series]);

        assert!(!report.is_ordered());
        assert_eq!(report.count(ViolationType::OutOfOrder), 1);
        assert_eq!(report.count(ViolationType::DuplicateDate), 1);
        assert_eq!(report.calendar_gaps[&5], 2);
    }

    #[test]
    fn test_implausible_values() {
        let mut bad = record(2, 75.0);
        bad.min_temp = Some(80.0);
        let series = StationSeries::new(5, vec![record(1, 10.0), bad]);

        let report = IntegrityChecker::new().check_integrity(&[series]);
        assert_eq!(report.violations.len(), 1);
        assert!(report.is_ordered());

        let summary = IntegrityChecker::new().generate_summary(&report);
        assert!(summary.contains("Implausible values: 1"));
    }

    #[test]
    fn test_summary_lists_at_most_max_reported() {
        let series = StationSeries::new(
            5,
            vec![record(4, 10.0), record(3, 11.0), record(2, 12.0), record(1, 13.0)],
        );
        let report = IntegrityChecker::new().check_integrity(&[series]);
        assert_eq!(report.count(ViolationType::OutOfOrder), 3);

        let summary = IntegrityChecker::with_max_reported(2).generate_summary(&report);
        assert!(summary.contains("Top 2 Violations"));
        assert!(summary.contains("  2. Station 5"));
        assert!(!summary.contains("  3. Station 5"));
    }
}
