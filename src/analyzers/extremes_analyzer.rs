use crate::analyzers::episode_stats::{yearly_episode_stats, EpisodeYearStats};
use crate::analyzers::events::{station_extremes, StationExtremes};
use crate::analyzers::frequency::{FrequencyOptions, FrequencyTable};
use crate::analyzers::percentile::{variable_profile, PercentileProfile};
use crate::error::Result;
use crate::models::{Episode, StationSeries, Variable};
use crate::processors::ParallelDetector;
use crate::thresholds::Severity;
use crate::utils::progress::ProgressReporter;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Everything the engine derives from one station table
#[derive(Debug, Clone, Serialize)]
pub struct ExtremesReport {
    pub total_records: usize,
    pub unique_stations: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub frequencies: Vec<FrequencyTable>,
    pub percentiles: BTreeMap<Variable, PercentileProfile>,
    pub episodes: Vec<Episode>,
    /// Per definition name, per start year
    pub episode_years: BTreeMap<String, BTreeMap<i32, EpisodeYearStats>>,
    pub station_extremes: Vec<StationExtremes>,
}

pub struct ExtremesAnalyzer<'a> {
    detector: &'a ParallelDetector,
    percentiles: Vec<f64>,
    floor: Severity,
    options: FrequencyOptions,
}

impl<'a> ExtremesAnalyzer<'a> {
    pub fn new(detector: &'a ParallelDetector, percentiles: Vec<f64>) -> Self {
        Self {
            detector,
            percentiles,
            floor: Severity::VerySevere,
            options: FrequencyOptions::default(),
        }
    }

    /// Lowest tier counted in the per-station summary
    pub fn with_floor(mut self, floor: Severity) -> Self {
        self.floor = floor;
        self
    }

    pub fn with_frequency_options(mut self, options: FrequencyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyze(
        &self,
        stations: &[StationSeries],
        progress: Option<&ProgressReporter>,
    ) -> Result<ExtremesReport> {
        let registry = self.detector.registry();
        let classified_variables = registry.variables();

        let frequencies = classified_variables
            .iter()
            .map(|v| self.detector.yearly_frequency(stations, *v, self.options))
            .collect::<Result<Vec<_>>>()?;

        let mut percentiles = BTreeMap::new();
        for variable in Variable::ALL {
            let profile = variable_profile(stations, variable, &self.percentiles)?;
            if !profile.is_empty() {
                percentiles.insert(variable, profile);
            }
        }

        let episodes = self.detector.detect_episodes(stations, progress)?;
        let episode_years = self
            .detector
            .catalog()
            .names()
            .into_iter()
            .map(|name| {
                let stats = yearly_episode_stats(episodes.iter().filter(|e| e.kind == name));
                (name.to_string(), stats)
            })
            .collect();

        let station_extremes = classified_variables
            .iter()
            .flat_map(|v| station_extremes(registry, stations, *v, self.floor))
            .collect();

        let report = ExtremesReport {
            total_records: stations.iter().map(StationSeries::len).sum(),
            unique_stations: stations.len(),
            date_range: date_range(stations),
            frequencies,
            percentiles,
            episodes,
            episode_years,
            station_extremes,
        };

        info!(
            stations = report.unique_stations,
            records = report.total_records,
            episodes = report.episodes.len(),
            "extremes analysis complete"
        );
        Ok(report)
    }
}

/// Earliest and latest date anywhere in the table, whatever the row order
fn date_range(stations: &[StationSeries]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = stations.iter().flat_map(|s| s.records.iter().map(|r| r.date));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

impl ExtremesReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("Stations: {} stations\n", self.unique_stations));
        match self.date_range {
            Some((first, last)) => summary.push_str(&format!("Date Range: {} to {}\n", first, last)),
            None => summary.push_str("Date Range: no records\n"),
        }
        summary.push_str(&format!("Records: {} total\n", self.total_records));

        if !self.frequencies.is_empty() {
            summary.push_str("\nThreshold crossings (all years):\n");
            for table in &self.frequencies {
                let totals = table.totals();
                summary.push_str(&format!(
                    "  {}: {} extreme, {} very severe or worse, {} any tier\n",
                    table.variable,
                    totals.extreme,
                    totals.at_least(Severity::VerySevere),
                    totals.total()
                ));
            }
        }

        if !self.percentiles.is_empty() {
            summary.push_str("\nMedians:\n");
            for (variable, profile) in &self.percentiles {
                let value = profile
                    .get(50.0)
                    .map(|v| format!("{:.1} {}", v, variable.unit()))
                    .unwrap_or_else(|| "n/a".to_string());
                summary.push_str(&format!("  {}: {} (n={})\n", variable, value, profile.sample_size));
            }
        }

        summary.push_str("\nEpisodes:\n");
        for (name, years) in &self.episode_years {
            let count: usize = years.values().map(|s| s.count).sum();
            let longest = years.values().map(|s| s.longest_days).max().unwrap_or(0);
            summary.push_str(&format!(
                "  {}: {} episodes, longest {} days\n",
                name, count, longest
            ));
        }

        summary
    }
}
