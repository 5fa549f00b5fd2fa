pub mod analyzers;
pub mod cli;
pub mod config;
pub mod episodes;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod thresholds;
pub mod utils;

pub use analyzers::{ExtremesAnalyzer, ExtremesReport, FrequencyOptions, FrequencyTable, PercentileProfile};
pub use config::EngineConfig;
pub use episodes::{EpisodeCatalog, EpisodeDefinition, EpisodeSegmenter};
pub use error::{DetectionError, Result};
pub use models::{ClassifiedReading, Episode, StationSeries, Variable, WeatherRecord};
pub use processors::ParallelDetector;
pub use readers::TableReader;
pub use thresholds::{Severity, ThresholdRegistry, ThresholdSpec};
