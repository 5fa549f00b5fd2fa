use crate::analyzers::frequency::{FrequencyAccumulator, FrequencyOptions, FrequencyTable};
use crate::config::EngineConfig;
use crate::episodes::{EpisodeCatalog, EpisodeSegmenter};
use crate::error::{DetectionError, Result};
use crate::models::{ClassifiedReading, Episode, StationSeries, Variable};
use crate::thresholds::ThresholdRegistry;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Fans detection work out over stations.
///
/// Each station is an independent work unit; the only shared state is the
/// read-only configuration and a progress counter.
pub struct ParallelDetector {
    registry: ThresholdRegistry,
    catalog: EpisodeCatalog,
    max_workers: usize,
}

impl ParallelDetector {
    pub fn new(registry: ThresholdRegistry, catalog: EpisodeCatalog) -> Self {
        Self {
            registry,
            catalog,
            max_workers: num_cpus::get(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(config.registry()?, config.catalog()?))
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn registry(&self) -> &ThresholdRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &EpisodeCatalog {
        &self.catalog
    }

    fn pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| DetectionError::Config(e.to_string()))
    }

    /// Classify every reading of `variable`, stations kept in input order
    pub fn classify(
        &self,
        stations: &[StationSeries],
        variable: Variable,
    ) -> Result<Vec<ClassifiedReading>> {
        let pool = self.pool()?;
        let per_station: Vec<Vec<ClassifiedReading>> = pool.install(|| {
            stations
                .par_iter()
                .map(|series| self.registry.classify_series(series, variable).collect())
                .collect()
        });

        Ok(per_station.into_iter().flatten().collect())
    }

    /// Run every catalog definition over every station.
    ///
    /// Output is grouped by station (input order), then by definition
    /// (catalog order), then chronologically.
    pub fn detect_episodes(
        &self,
        stations: &[StationSeries],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Episode>> {
        let segmenters = self
            .catalog
            .iter()
            .map(EpisodeSegmenter::new)
            .collect::<Result<Vec<_>>>()?;
        self.run_segmenters(stations, &segmenters, progress)
    }

    /// Run one named definition over every station
    pub fn detect_named(
        &self,
        stations: &[StationSeries],
        name: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Episode>> {
        let segmenter = EpisodeSegmenter::new(self.catalog.get(name)?)?;
        self.run_segmenters(stations, &[segmenter], progress)
    }

    fn run_segmenters(
        &self,
        stations: &[StationSeries],
        segmenters: &[EpisodeSegmenter<'_>],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Episode>> {
        let total_stations = stations.len();
        let processed_count = AtomicUsize::new(0);

        if let Some(p) = progress {
            p.set_message(&format!("Segmenting {} stations...", total_stations));
        }

        let pool = self.pool()?;
        let per_station: Vec<Vec<Episode>> = pool.install(|| {
            stations
                .par_iter()
                .map(|series| {
                    let episodes: Vec<Episode> = segmenters
                        .iter()
                        .flat_map(|segmenter| segmenter.extract_series(series))
                        .collect();

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    episodes
                })
                .collect()
        });

        let episodes: Vec<Episode> = per_station.into_iter().flatten().collect();

        info!(
            stations = total_stations,
            definitions = segmenters.len(),
            episodes = episodes.len(),
            "episode detection complete"
        );
        if let Some(p) = progress {
            p.finish_with_message(&format!("Found {} episodes", episodes.len()));
        }

        Ok(episodes)
    }

    /// Yearly tier counts, tallied per station and merged
    pub fn yearly_frequency(
        &self,
        stations: &[StationSeries],
        variable: Variable,
        options: FrequencyOptions,
    ) -> Result<FrequencyTable> {
        options.check()?;
        let pool = self.pool()?;
        let accumulator = pool.install(|| {
            stations
                .par_iter()
                .map(|series| {
                    let mut accumulator = FrequencyAccumulator::new();
                    for reading in self.registry.classify_series(series, variable) {
                        accumulator.add(&reading);
                    }
                    accumulator
                })
                .reduce(FrequencyAccumulator::new, FrequencyAccumulator::merge)
        });

        let table = accumulator.finish(variable, options)?;
        debug!(
            variable = %variable,
            years = table.years.len(),
            "yearly frequency computed"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherRecord;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn stations() -> Vec<StationSeries> {
        let start = NaiveDate::from_ymd_opt(2020, 12, 28).unwrap();
        let tx = [
            [31.0, 31.0, 31.0, 20.0, 33.0, 34.0, 35.0, 20.0],
            [20.0, 20.0, 39.0, 39.0, 39.0, 20.0, 20.0, 20.0],
        ];

        tx.iter()
            .enumerate()
            .map(|(s, values)| {
                let station_id = s as u32 + 1;
                let records = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        WeatherRecord::builder()
                            .station_id(station_id)
                            .date(start + chrono::Duration::days(i as i64))
                            .max_temp(*v)
                            .build()
                            .unwrap()
                    })
                    .collect();
                StationSeries::new(station_id, records)
            })
            .collect()
    }

    fn detector() -> ParallelDetector {
        ParallelDetector::from_config(&EngineConfig::default())
            .unwrap()
            .with_max_workers(2)
    }

    #[test]
    fn test_detect_named_across_stations() {
        let episodes = detector().detect_named(&stations(), "heatwave", None).unwrap();

        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].station_id, 1);
        assert_eq!(episodes[1].station_id, 1);
        assert_eq!(episodes[1].extremum_value, 35.0);
        assert_eq!(episodes[2].station_id, 2);
        assert_eq!(episodes[2].duration_days, 3);
    }

    #[test]
    fn test_detect_named_unknown_definition() {
        let result = detector().detect_named(&stations(), "blizzard", None);
        assert!(matches!(result, Err(DetectionError::UnknownEpisode(_))));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let stations = stations();
        let detector = detector();

        let parallel = detector.detect_episodes(&stations, None).unwrap();
        let sequential: Vec<Episode> = stations
            .iter()
            .flat_map(|s| {
                detector
                    .catalog()
                    .iter()
                    .flat_map(|d| crate::episodes::extract_episodes(s, d).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect();

        assert_eq!(parallel, sequential);
        // Idempotent
        assert_eq!(parallel, detector.detect_episodes(&stations, None).unwrap());
    }

    #[test]
    fn test_yearly_frequency_merges_stations() {
        let table = detector()
            .yearly_frequency(&stations(), Variable::MaxTemperature, FrequencyOptions::default())
            .unwrap();

        assert_eq!(table.years(), vec![2020, 2021]);
        // 2020-12-28..31: station 1 warm x3, station 2 extreme x2 (39 >= 38)
        let counts_2020 = table.counts(2020).unwrap();
        assert_eq!(counts_2020.severe, 3);
        assert_eq!(counts_2020.extreme, 2);
        assert_eq!(counts_2020.total(), 5);
        let counts_2021 = table.counts(2021).unwrap();
        assert_eq!(counts_2021.very_severe, 3);
        assert_eq!(counts_2021.extreme, 1);
    }

    #[test]
    fn test_classify_keeps_station_order() {
        let readings = detector()
            .classify(&stations(), Variable::MaxTemperature)
            .unwrap();

        assert_eq!(readings.len(), 16);
        assert!(readings[..8].iter().all(|r| r.station_id == 1));
        assert!(readings[8..].iter().all(|r| r.station_id == 2));
    }

    #[test]
    fn test_empty_input() {
        let detector = detector();
        assert!(detector.detect_episodes(&[], None).unwrap().is_empty());
        assert!(detector
            .yearly_frequency(&[], Variable::MaxTemperature, FrequencyOptions::zero_filled())
            .unwrap()
            .is_empty());
    }
}
