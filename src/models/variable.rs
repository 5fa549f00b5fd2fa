use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DetectionError;

/// Daily observation variables carried by a station table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Maximum temperature (°C)
    #[serde(rename = "TX")]
    MaxTemperature,
    /// Minimum temperature (°C)
    #[serde(rename = "TN")]
    MinTemperature,
    /// Mean temperature (°C)
    #[serde(rename = "TM")]
    MeanTemperature,
    /// Daily precipitation (mm)
    #[serde(rename = "RR")]
    Precipitation,
    /// Mean wind speed (m/s)
    #[serde(rename = "FFM")]
    WindSpeed,
    /// Maximum daily gust (m/s)
    #[serde(rename = "FXY")]
    GustSpeed,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::MaxTemperature,
        Variable::MinTemperature,
        Variable::MeanTemperature,
        Variable::Precipitation,
        Variable::WindSpeed,
        Variable::GustSpeed,
    ];

    /// Column code used in station tables
    pub fn code(&self) -> &'static str {
        match self {
            Variable::MaxTemperature => "TX",
            Variable::MinTemperature => "TN",
            Variable::MeanTemperature => "TM",
            Variable::Precipitation => "RR",
            Variable::WindSpeed => "FFM",
            Variable::GustSpeed => "FXY",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::MaxTemperature | Variable::MinTemperature | Variable::MeanTemperature => {
                "°C"
            }
            Variable::Precipitation => "mm",
            Variable::WindSpeed | Variable::GustSpeed => "m/s",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Variable {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DetectionError::UnknownVariable(s.to_string()))
    }
}
