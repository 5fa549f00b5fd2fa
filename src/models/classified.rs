use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Variable;
use crate::thresholds::Severity;

/// A single reading with its severity tier; derived on demand, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReading {
    pub station_id: u32,
    pub date: NaiveDate,
    pub variable: Variable,
    pub value: Option<f64>,
    pub severity: Severity,
}

impl ClassifiedReading {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn is_at_least(&self, severity: Severity) -> bool {
        self.severity.is_at_least(severity)
    }
}
