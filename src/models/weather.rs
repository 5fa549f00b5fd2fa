use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{DetectionError, Result};
use crate::models::Variable;

/// One station-day row handed over by the ingestion layer.
///
/// Missing readings are `None`; a `NaN` that slips through is treated the
/// same way by [`WeatherRecord::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherRecord {
    pub station_id: u32,
    pub station_name: Option<String>,
    pub date: NaiveDate,

    #[validate(range(min = -90.0, max = 60.0))]
    pub max_temp: Option<f64>,

    #[validate(range(min = -90.0, max = 60.0))]
    pub min_temp: Option<f64>,

    #[validate(range(min = -90.0, max = 60.0))]
    pub mean_temp: Option<f64>,

    // mm
    #[validate(range(min = 0.0, max = 2000.0))]
    pub precipitation: Option<f64>,

    // m/s
    #[validate(range(min = 0.0, max = 120.0))]
    pub wind_speed: Option<f64>,

    #[validate(range(min = 0.0, max = 120.0))]
    pub gust_speed: Option<f64>,
}

impl WeatherRecord {
    pub fn new(station_id: u32, date: NaiveDate) -> Self {
        Self {
            station_id,
            station_name: None,
            date,
            max_temp: None,
            min_temp: None,
            mean_temp: None,
            precipitation: None,
            wind_speed: None,
            gust_speed: None,
        }
    }

    pub fn builder() -> WeatherRecordBuilder {
        WeatherRecordBuilder::new()
    }

    /// Reading for `variable`, `None` when absent or not a finite number
    pub fn value(&self, variable: Variable) -> Option<f64> {
        let raw = match variable {
            Variable::MaxTemperature => self.max_temp,
            Variable::MinTemperature => self.min_temp,
            Variable::MeanTemperature => self.mean_temp,
            Variable::Precipitation => self.precipitation,
            Variable::WindSpeed => self.wind_speed,
            Variable::GustSpeed => self.gust_speed,
        };
        raw.filter(|v| v.is_finite())
    }

    pub fn set_value(&mut self, variable: Variable, value: Option<f64>) {
        let slot = match variable {
            Variable::MaxTemperature => &mut self.max_temp,
            Variable::MinTemperature => &mut self.min_temp,
            Variable::MeanTemperature => &mut self.mean_temp,
            Variable::Precipitation => &mut self.precipitation,
            Variable::WindSpeed => &mut self.wind_speed,
            Variable::GustSpeed => &mut self.gust_speed,
        };
        *slot = value;
    }

    pub fn validate_relationships(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.value(Variable::MinTemperature), self.value(Variable::MaxTemperature)) {
            let tolerance = 1.0;
            if min > max + tolerance {
                return Err(DetectionError::InvalidFormat(format!(
                    "Min temperature {} > Max temperature {} (tolerance={})",
                    min, max, tolerance
                )));
            }
        }

        self.validate()?;
        Ok(())
    }
}

pub struct WeatherRecordBuilder {
    station_id: Option<u32>,
    station_name: Option<String>,
    date: Option<NaiveDate>,
    values: Vec<(Variable, f64)>,
}

impl Default for WeatherRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherRecordBuilder {
    pub fn new() -> Self {
        Self {
            station_id: None,
            station_name: None,
            date: None,
            values: Vec::new(),
        }
    }

    pub fn station_id(mut self, id: u32) -> Self {
        self.station_id = Some(id);
        self
    }

    pub fn station_name(mut self, name: impl Into<String>) -> Self {
        self.station_name = Some(name.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn value(mut self, variable: Variable, value: f64) -> Self {
        self.values.push((variable, value));
        self
    }

    pub fn max_temp(self, temp: f64) -> Self {
        self.value(Variable::MaxTemperature, temp)
    }

    pub fn min_temp(self, temp: f64) -> Self {
        self.value(Variable::MinTemperature, temp)
    }

    pub fn precipitation(self, precip: f64) -> Self {
        self.value(Variable::Precipitation, precip)
    }

    pub fn wind_speed(self, speed: f64) -> Self {
        self.value(Variable::WindSpeed, speed)
    }

    pub fn gust_speed(self, speed: f64) -> Self {
        self.value(Variable::GustSpeed, speed)
    }

    pub fn build(self) -> Result<WeatherRecord> {
        let station_id = self
            .station_id
            .ok_or_else(|| DetectionError::InvalidFormat("missing station_id".to_string()))?;
        let date = self
            .date
            .ok_or_else(|| DetectionError::InvalidFormat("missing date".to_string()))?;

        let mut record = WeatherRecord::new(station_id, date);
        record.station_name = self.station_name;
        for (variable, value) in self.values {
            record.set_value(variable, Some(value));
        }

        Ok(record)
    }
}
