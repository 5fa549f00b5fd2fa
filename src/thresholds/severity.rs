use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic severity levels shared by every variable.
///
/// Ordering follows extremity: `Unclassifiable < Normal < Moderate < ... < Extreme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Missing value, or a variable without thresholds
    Unclassifiable,
    Normal,
    Moderate,
    Severe,
    VerySevere,
    Extreme,
}

impl Severity {
    /// Tier levels in the order a `ThresholdSpec` lists them
    pub const RANKED: [Severity; 4] = [
        Severity::Extreme,
        Severity::VerySevere,
        Severity::Severe,
        Severity::Moderate,
    ];

    /// Severity of the tier at `rank` (0 = most extreme)
    pub fn from_rank(rank: usize) -> Option<Severity> {
        Self::RANKED.get(rank).copied()
    }

    pub fn rank(&self) -> Option<usize> {
        Self::RANKED.iter().position(|s| s == self)
    }

    /// True for threshold tiers, false for `Normal` and `Unclassifiable`
    pub fn is_tier(&self) -> bool {
        self.rank().is_some()
    }

    pub fn is_at_least(&self, floor: Severity) -> bool {
        *self >= floor
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unclassifiable => "unclassifiable",
            Severity::Normal => "normal",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::VerySevere => "very_severe",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
