use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Variable;

/// A maximal run of qualifying days at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub station_id: u32,
    pub variable: Variable,
    /// Name of the definition that produced it (e.g. `heatwave`)
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: usize,
    /// Maximum for upward predicates, minimum for downward ones
    pub extremum_value: f64,
    pub mean_value: f64,
}

impl Episode {
    pub fn overlaps(&self, other: &Episode) -> bool {
        self.station_id == other.station_id
            && self.start_date <= other.end_date
            && other.start_date <= self.end_date
    }

    /// Calendar span covered, which exceeds `duration_days` only when
    /// rows were bridged across a gap
    pub fn calendar_span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
