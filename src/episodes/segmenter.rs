use chrono::NaiveDate;
use tracing::debug;

use crate::episodes::{EpisodeCatalog, EpisodeDefinition, GapPolicy};
use crate::error::Result;
use crate::models::{Episode, StationSeries};
use crate::thresholds::Direction;

/// The run currently being accumulated; O(1) state per station
#[derive(Debug, Clone, Copy)]
struct OpenRun {
    start: NaiveDate,
    last: NaiveDate,
    count: usize,
    sum: f64,
    extremum: f64,
}

impl OpenRun {
    fn start(date: NaiveDate, value: f64) -> Self {
        Self {
            start: date,
            last: date,
            count: 1,
            sum: value,
            extremum: value,
        }
    }

    fn push(&mut self, date: NaiveDate, value: f64, direction: Direction) {
        self.last = date;
        self.count += 1;
        self.sum += value;
        if direction.is_more_extreme(value, self.extremum) {
            self.extremum = value;
        }
    }

    fn continues_to(&self, date: NaiveDate, gap_policy: GapPolicy) -> bool {
        match gap_policy {
            GapPolicy::RowAdjacency => true,
            GapPolicy::BreakOnGap => (date - self.last).num_days() == 1,
        }
    }
}

/// Run-length segmentation of one station's series against one definition.
///
/// Rows must already be in ascending date order without duplicates. The
/// segmenter neither sorts nor deduplicates; with `BreakOnGap` any
/// non-consecutive step (backwards, repeated or skipped day) simply ends the
/// current run.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSegmenter<'a> {
    definition: &'a EpisodeDefinition,
}

impl<'a> EpisodeSegmenter<'a> {
    pub fn new(definition: &'a EpisodeDefinition) -> Result<Self> {
        definition.check()?;
        Ok(Self { definition })
    }

    pub fn definition(&self) -> &EpisodeDefinition {
        self.definition
    }

    /// Segment a stream of (date, value) pairs belonging to `station_id`
    pub fn extract<I>(&self, station_id: u32, readings: I) -> Vec<Episode>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        let definition = self.definition;
        let direction = definition.direction();
        let mut episodes = Vec::new();
        let mut open: Option<OpenRun> = None;

        for (date, value) in readings {
            // Non-finite readings break runs like a missing value
            let qualifying = value.filter(|v| definition.qualifies(Some(*v)));

            if let (Some(run), Some(v)) = (open.as_mut(), qualifying) {
                if run.continues_to(date, definition.gap_policy) {
                    run.push(date, v, direction);
                    continue;
                }
            }

            if let Some(run) = open.take() {
                self.close(station_id, run, &mut episodes);
            }
            open = qualifying.map(|v| OpenRun::start(date, v));
        }

        if let Some(run) = open {
            self.close(station_id, run, &mut episodes);
        }

        episodes
    }

    pub fn extract_series(&self, series: &StationSeries) -> Vec<Episode> {
        let episodes = self.extract(series.station_id, series.readings(self.definition.variable));
        debug!(
            station_id = series.station_id,
            kind = %self.definition.name,
            rows = series.len(),
            episodes = episodes.len(),
            "segmented station series"
        );
        episodes
    }

    fn close(&self, station_id: u32, run: OpenRun, episodes: &mut Vec<Episode>) {
        if run.count < self.definition.min_duration_days {
            return;
        }

        episodes.push(Episode {
            station_id,
            variable: self.definition.variable,
            kind: self.definition.name.clone(),
            start_date: run.start,
            end_date: run.last,
            duration_days: run.count,
            extremum_value: run.extremum,
            mean_value: run.sum / run.count as f64,
        });
    }
}

/// Episodes of one station for one definition
pub fn extract_episodes(
    series: &StationSeries,
    definition: &EpisodeDefinition,
) -> Result<Vec<Episode>> {
    Ok(EpisodeSegmenter::new(definition)?.extract_series(series))
}

/// Episodes of one station for a catalog entry; unknown names are an error
pub fn extract_named(
    series: &StationSeries,
    catalog: &EpisodeCatalog,
    name: &str,
) -> Result<Vec<Episode>> {
    extract_episodes(series, catalog.get(name)?)
}
