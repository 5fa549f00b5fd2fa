pub mod episode_stats;
pub mod events;
pub mod extremes_analyzer;
pub mod frequency;
pub mod percentile;

pub use episode_stats::{rank_episodes, yearly_episode_stats, EpisodeYearStats};
pub use events::{extreme_events, station_extremes, StationExtremes};
pub use extremes_analyzer::{ExtremesAnalyzer, ExtremesReport};
pub use frequency::{yearly_frequency, FrequencyOptions, FrequencyRow, FrequencyTable, TierCounts};
pub use percentile::{percentile_profile, variable_profile, PercentileEntry, PercentileProfile};
