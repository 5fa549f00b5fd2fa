use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{DetectionError, Result};
use crate::models::{ClassifiedReading, Variable};
use crate::thresholds::Severity;
use crate::utils::constants::MAX_ZERO_FILL_YEARS;

/// Readings per threshold tier in one year; `normal` and `unclassifiable`
/// are never counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub extreme: usize,
    pub very_severe: usize,
    pub severe: usize,
    pub moderate: usize,
}

impl TierCounts {
    pub fn record(&mut self, severity: Severity) {
        if let Some(slot) = self.slot_mut(severity) {
            *slot += 1;
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Extreme => self.extreme,
            Severity::VerySevere => self.very_severe,
            Severity::Severe => self.severe,
            Severity::Moderate => self.moderate,
            Severity::Normal | Severity::Unclassifiable => 0,
        }
    }

    /// Readings at `floor` or worse, e.g. "very severe or extreme"
    pub fn at_least(&self, floor: Severity) -> usize {
        Severity::RANKED
            .iter()
            .filter(|s| s.is_at_least(floor))
            .map(|s| self.get(*s))
            .sum()
    }

    pub fn total(&self) -> usize {
        self.extreme + self.very_severe + self.severe + self.moderate
    }

    pub fn merge(&mut self, other: &TierCounts) {
        self.extreme += other.extreme;
        self.very_severe += other.very_severe;
        self.severe += other.severe;
        self.moderate += other.moderate;
    }

    fn slot_mut(&mut self, severity: Severity) -> Option<&mut usize> {
        match severity {
            Severity::Extreme => Some(&mut self.extreme),
            Severity::VerySevere => Some(&mut self.very_severe),
            Severity::Severe => Some(&mut self.severe),
            Severity::Moderate => Some(&mut self.moderate),
            Severity::Normal | Severity::Unclassifiable => None,
        }
    }
}

/// Caller choices for the yearly table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyOptions {
    /// Emit zero rows for years with no readings at all
    pub zero_fill: bool,
    /// Restrict to an inclusive year range; with `zero_fill` the whole
    /// range is materialised, so it may span at most `MAX_ZERO_FILL_YEARS`
    pub year_range: Option<(i32, i32)>,
}

impl FrequencyOptions {
    pub fn zero_filled() -> Self {
        Self {
            zero_fill: true,
            year_range: None,
        }
    }

    pub fn with_year_range(mut self, first: i32, last: i32) -> Self {
        self.year_range = Some((first.min(last), first.max(last)));
        self
    }

    pub fn check(&self) -> Result<()> {
        if let (true, Some((first, last))) = (self.zero_fill, self.year_range) {
            let span = i64::from(last) - i64::from(first) + 1;
            if span > MAX_ZERO_FILL_YEARS {
                return Err(DetectionError::InvalidFormat(format!(
                    "zero-filled year range {}..={} spans {} years (limit {})",
                    first, last, span, MAX_ZERO_FILL_YEARS
                )));
            }
        }
        Ok(())
    }
}

/// One `(variable, year, tier, count)` output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    pub variable: Variable,
    pub year: i32,
    pub tier: Severity,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub variable: Variable,
    pub years: BTreeMap<i32, TierCounts>,
}

impl FrequencyTable {
    pub fn counts(&self, year: i32) -> Option<&TierCounts> {
        self.years.get(&year)
    }

    pub fn years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Sum over all years
    pub fn totals(&self) -> TierCounts {
        self.years.values().fold(TierCounts::default(), |mut acc, c| {
            acc.merge(c);
            acc
        })
    }

    /// Flattened rows, one per year and tier level, most extreme first
    pub fn rows(&self) -> Vec<FrequencyRow> {
        self.years
            .iter()
            .flat_map(|(year, counts)| {
                Severity::RANKED.iter().map(move |tier| FrequencyRow {
                    variable: self.variable,
                    year: *year,
                    tier: *tier,
                    count: counts.get(*tier),
                })
            })
            .collect()
    }
}

/// Mergeable per-year tally, so stations can be counted independently
#[derive(Debug, Clone, Default)]
pub struct FrequencyAccumulator {
    years: BTreeMap<i32, TierCounts>,
}

impl FrequencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reading: &ClassifiedReading) {
        self.years
            .entry(reading.year())
            .or_default()
            .record(reading.severity);
    }

    pub fn merge(mut self, other: FrequencyAccumulator) -> Self {
        for (year, counts) in other.years {
            self.years.entry(year).or_default().merge(&counts);
        }
        self
    }

    pub fn finish(self, variable: Variable, options: FrequencyOptions) -> Result<FrequencyTable> {
        options.check()?;
        let mut years = self.years;

        if let Some((first, last)) = options.year_range {
            years.retain(|year, _| (first..=last).contains(year));
        }

        if options.zero_fill {
            let span = options.year_range.or_else(|| {
                let first = *years.keys().next()?;
                let last = *years.keys().next_back()?;
                Some((first, last))
            });
            if let Some((first, last)) = span {
                for year in first..=last {
                    years.entry(year).or_default();
                }
            }
        }

        Ok(FrequencyTable { variable, years })
    }
}

/// Yearly tier counts for `variable`.
///
/// Every year holding at least one reading of the variable gets a row, even
/// when nothing crossed a threshold. Years without readings only appear
/// when `options.zero_fill` is set.
pub fn yearly_frequency<'a, I>(
    readings: I,
    variable: Variable,
    options: FrequencyOptions,
) -> Result<FrequencyTable>
where
    I: IntoIterator<Item = &'a ClassifiedReading>,
{
    let mut accumulator = FrequencyAccumulator::new();
    for reading in readings.into_iter().filter(|r| r.variable == variable) {
        accumulator.add(reading);
    }
    accumulator.finish(variable, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn reading(year: i32, severity: Severity) -> ClassifiedReading {
        ClassifiedReading {
            station_id: 1,
            date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            variable: Variable::MaxTemperature,
            value: Some(30.0),
            severity,
        }
    }

    fn sample() -> Vec<ClassifiedReading> {
        vec![
            reading(2020, Severity::Extreme),
            reading(2020, Severity::VerySevere),
            reading(2020, Severity::Normal),
            reading(2020, Severity::Unclassifiable),
            reading(2022, Severity::Normal),
            reading(2022, Severity::Severe),
        ]
    }

    #[test]
    fn test_gap_year_absent_by_default() {
        let table = yearly_frequency(&sample(), Variable::MaxTemperature, FrequencyOptions::default()).unwrap();

        assert_eq!(table.years(), vec![2020, 2022]);
        let counts_2020 = table.counts(2020).unwrap();
        assert_eq!(counts_2020.extreme, 1);
        assert_eq!(counts_2020.very_severe, 1);
        assert_eq!(counts_2020.total(), 2);
        assert_eq!(table.counts(2022).unwrap().severe, 1);
    }

    #[test]
    fn test_zero_fill_gap_year() {
        let table = yearly_frequency(&sample(), Variable::MaxTemperature, FrequencyOptions::zero_filled()).unwrap();

        assert_eq!(table.years(), vec![2020, 2021, 2022]);
        assert_eq!(table.counts(2021).unwrap(), &TierCounts::default());
    }

    #[test]
    fn test_year_range_filters_and_fills() {
        let options = FrequencyOptions::zero_filled().with_year_range(2022, 2019);
        let table = yearly_frequency(&sample(), Variable::MaxTemperature, options).unwrap();
        assert_eq!(table.years(), vec![2019, 2020, 2021, 2022]);

        let options = FrequencyOptions::default().with_year_range(2021, 2030);
        let table = yearly_frequency(&sample(), Variable::MaxTemperature, options).unwrap();
        assert_eq!(table.years(), vec![2022]);
    }

    #[test]
    fn test_zero_fill_rejects_unbounded_range() {
        let options = FrequencyOptions::zero_filled().with_year_range(-2_000_000_000, 2_000_000_000);
        let result = yearly_frequency(&sample(), Variable::MaxTemperature, options);
        assert!(matches!(result, Err(DetectionError::InvalidFormat(msg)) if msg.contains("limit")));

        // Without zero fill the range is only a filter
        let options = FrequencyOptions::default().with_year_range(i32::MIN, i32::MAX);
        let table = yearly_frequency(&sample(), Variable::MaxTemperature, options).unwrap();
        assert_eq!(table.years(), vec![2020, 2022]);
    }

    #[test]
    fn test_other_variables_ignored() {
        let table = yearly_frequency(&sample(), Variable::Precipitation, FrequencyOptions::zero_filled()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_at_least_is_cumulative() {
        let mut counts = TierCounts::default();
        for s in [
            Severity::Extreme,
            Severity::VerySevere,
            Severity::VerySevere,
            Severity::Severe,
            Severity::Moderate,
            Severity::Normal,
        ] {
            counts.record(s);
        }

        assert_eq!(counts.at_least(Severity::Extreme), 1);
        assert_eq!(counts.at_least(Severity::VerySevere), 3);
        assert_eq!(counts.at_least(Severity::Moderate), 5);
        assert_eq!(counts.at_least(Severity::Normal), 5);
    }

    #[test]
    fn test_rows_and_merge() {
        let readings = sample();
        let (left, right) = readings.split_at(3);

        let mut a = FrequencyAccumulator::new();
        left.iter().for_each(|r| a.add(r));
        let mut b = FrequencyAccumulator::new();
        right.iter().for_each(|r| b.add(r));

        let merged = a.merge(b).finish(Variable::MaxTemperature, FrequencyOptions::default()).unwrap();
        let direct = yearly_frequency(&readings, Variable::MaxTemperature, FrequencyOptions::default()).unwrap();
        assert_eq!(merged, direct);

        let rows = direct.rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(
            rows[0],
            FrequencyRow {
                variable: Variable::MaxTemperature,
                year: 2020,
                tier: Severity::Extreme,
                count: 1
            }
        );
        assert_eq!(direct.totals().total(), 3);
    }
}
