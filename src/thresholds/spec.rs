use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::error::{DetectionError, Result};
use crate::models::Variable;
use crate::thresholds::Severity;

/// Which way severity grows with the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Tier applies when value >= boundary
    Ascending,
    /// Tier applies when value <= boundary
    Descending,
}

impl Direction {
    /// Boundary-inclusive tier test
    pub fn satisfies(&self, value: f64, boundary: f64) -> bool {
        match self {
            Direction::Ascending => value >= boundary,
            Direction::Descending => value <= boundary,
        }
    }

    /// True when `a` is strictly more extreme than `b`
    pub fn is_more_extreme(&self, a: f64, b: f64) -> bool {
        match self {
            Direction::Ascending => a > b,
            Direction::Descending => a < b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBound {
    pub name: String,
    pub boundary: f64,
}

impl TierBound {
    pub fn new(name: impl Into<String>, boundary: f64) -> Self {
        Self {
            name: name.into(),
            boundary,
        }
    }
}

/// Ordered severity tiers for one variable, most extreme first.
///
/// The tier at position 0 maps to [`Severity::Extreme`], position 1 to
/// [`Severity::VerySevere`] and so on. Boundaries are inclusive and the
/// first matching tier wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ThresholdSpec {
    pub variable: Variable,
    pub direction: Direction,
    #[validate(length(min = 1, max = 4))]
    pub tiers: Vec<TierBound>,
}

impl ThresholdSpec {
    pub fn new(variable: Variable, direction: Direction, tiers: Vec<TierBound>) -> Result<Self> {
        let spec = Self {
            variable,
            direction,
            tiers,
        };
        spec.check()?;
        Ok(spec)
    }

    pub fn ascending(variable: Variable, tiers: &[(&str, f64)]) -> Result<Self> {
        Self::new(variable, Direction::Ascending, to_bounds(tiers))
    }

    pub fn descending(variable: Variable, tiers: &[(&str, f64)]) -> Result<Self> {
        Self::new(variable, Direction::Descending, to_bounds(tiers))
    }

    /// Verify the tiers are mutually exclusive and well named
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let invalid = |message: String| DetectionError::InvalidThresholds {
            variable: self.variable.to_string(),
            message,
        };

        let mut names = HashSet::new();
        for tier in &self.tiers {
            if tier.name.trim().is_empty() {
                return Err(invalid("tier name is empty".to_string()));
            }
            if tier.name == Severity::Normal.as_str()
                || tier.name == Severity::Unclassifiable.as_str()
            {
                return Err(invalid(format!("tier name '{}' is reserved", tier.name)));
            }
            if !names.insert(tier.name.as_str()) {
                return Err(invalid(format!("duplicate tier name '{}'", tier.name)));
            }
            if !tier.boundary.is_finite() {
                return Err(invalid(format!(
                    "tier '{}' has non-finite boundary",
                    tier.name
                )));
            }
        }

        for pair in self.tiers.windows(2) {
            if !self.direction.is_more_extreme(pair[0].boundary, pair[1].boundary) {
                return Err(invalid(format!(
                    "tier '{}' ({}) must be strictly more extreme than '{}' ({})",
                    pair[0].name, pair[0].boundary, pair[1].name, pair[1].boundary
                )));
            }
        }

        Ok(())
    }

    /// Severity of a present value; non-finite values never qualify
    pub fn classify(&self, value: f64) -> Severity {
        if !value.is_finite() {
            return Severity::Unclassifiable;
        }

        self.tiers
            .iter()
            .position(|tier| self.direction.satisfies(value, tier.boundary))
            .and_then(Severity::from_rank)
            .unwrap_or(Severity::Normal)
    }

    pub fn tier(&self, severity: Severity) -> Option<&TierBound> {
        severity.rank().and_then(|rank| self.tiers.get(rank))
    }

    pub fn tier_name(&self, severity: Severity) -> Option<&str> {
        self.tier(severity).map(|t| t.name.as_str())
    }

    pub fn boundary(&self, severity: Severity) -> Option<f64> {
        self.tier(severity).map(|t| t.boundary)
    }

    /// Levels this spec can produce, most extreme first
    pub fn severities(&self) -> impl Iterator<Item = Severity> + '_ {
        (0..self.tiers.len()).filter_map(Severity::from_rank)
    }
}

pub(crate) fn to_bounds(tiers: &[(&str, f64)]) -> Vec<TierBound> {
    tiers
        .iter()
        .map(|(name, boundary)| TierBound::new(*name, *boundary))
        .collect()
}
