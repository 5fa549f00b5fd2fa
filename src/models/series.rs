use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{Variable, WeatherRecord};

/// Chronological daily records of a single station.
///
/// Rows are kept in the order they were delivered: the detection engine
/// relies on the ingestion layer for ascending, duplicate-free dates and
/// never re-sorts.
#[derive(Debug, Clone)]
pub struct StationSeries {
    pub station_id: u32,
    pub station_name: Option<String>,
    pub records: Vec<WeatherRecord>,
}

impl StationSeries {
    pub fn new(station_id: u32, records: Vec<WeatherRecord>) -> Self {
        let station_name = records.iter().find_map(|r| r.station_name.clone());
        Self {
            station_id,
            station_name,
            records,
        }
    }

    /// Split a mixed table into one series per station.
    ///
    /// Stations appear in order of first occurrence and each station keeps
    /// its rows in input order.
    pub fn group(records: Vec<WeatherRecord>) -> Vec<StationSeries> {
        let mut index: HashMap<u32, usize> = HashMap::new();
        let mut grouped: Vec<(u32, Vec<WeatherRecord>)> = Vec::new();

        for record in records {
            let slot = *index.entry(record.station_id).or_insert_with(|| {
                grouped.push((record.station_id, Vec::new()));
                grouped.len() - 1
            });
            grouped[slot].1.push(record);
        }

        grouped
            .into_iter()
            .map(|(station_id, records)| StationSeries::new(station_id, records))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// (date, value) pairs for one variable, in row order
    pub fn readings(
        &self,
        variable: Variable,
    ) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.records.iter().map(move |r| (r.date, r.value(variable)))
    }

    /// Non-missing values for one variable
    pub fn values(&self, variable: Variable) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().filter_map(move |r| r.value(variable))
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        let last = self.records.last()?.date;
        Some((first, last))
    }
}
