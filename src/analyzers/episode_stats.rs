use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::events::compare_extremity;
use crate::models::Episode;
use crate::thresholds::Direction;

/// Sort episodes most extreme first (hottest heatwave, coldest cold snap),
/// then longest, then earliest
pub fn rank_episodes(episodes: &mut [Episode], direction: Direction) {
    episodes.sort_by(|a, b| {
        compare_extremity(direction, Some(a.extremum_value), Some(b.extremum_value))
            .then_with(|| b.duration_days.cmp(&a.duration_days))
            .then_with(|| a.start_date.cmp(&b.start_date))
            .then_with(|| a.station_id.cmp(&b.station_id))
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeYearStats {
    pub count: usize,
    pub total_days: usize,
    pub longest_days: usize,
}

/// Episodes grouped by the year they started in
pub fn yearly_episode_stats<'a, I>(episodes: I) -> BTreeMap<i32, EpisodeYearStats>
where
    I: IntoIterator<Item = &'a Episode>,
{
    let mut years: BTreeMap<i32, EpisodeYearStats> = BTreeMap::new();
    for episode in episodes {
        let stats = years.entry(episode.start_date.year()).or_default();
        stats.count += 1;
        stats.total_days += episode.duration_days;
        stats.longest_days = stats.longest_days.max(episode.duration_days);
    }
    years
}
