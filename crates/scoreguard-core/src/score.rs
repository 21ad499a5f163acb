//! Score interpretation
//!
//! Pure functions turning a raw score into what the gauge shows, and the
//! score payload returned by the scoring service. The functions are total:
//! scores outside the issued range still get a tier and a clamped
//! percentage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{SCORE_MAX, SCORE_MIN};

/// Five ordered score bands, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

/// Lower bounds, highest first
const BREAKPOINTS: [(i64, ScoreTier); 4] = [
    (800, ScoreTier::Excellent),
    (740, ScoreTier::VeryGood),
    (670, ScoreTier::Good),
    (580, ScoreTier::Fair),
];

impl ScoreTier {
    pub const ALL: [ScoreTier; 5] = [
        ScoreTier::Poor,
        ScoreTier::Fair,
        ScoreTier::Good,
        ScoreTier::VeryGood,
        ScoreTier::Excellent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "excellent",
            ScoreTier::VeryGood => "very good",
            ScoreTier::Good => "good",
            ScoreTier::Fair => "fair",
            ScoreTier::Poor => "poor",
        }
    }

    /// Category name as the scoring service spells it
    pub fn category(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::VeryGood => "Very Good",
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
            ScoreTier::Poor => "Poor",
        }
    }

    /// Gauge colour
    pub fn hex_color(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "#16a34a",
            ScoreTier::VeryGood => "#84cc16",
            ScoreTier::Good => "#eab308",
            ScoreTier::Fair => "#f97316",
            ScoreTier::Poor => "#ef4444",
        }
    }

    /// Inclusive score range of the band within the issued scale
    pub fn range(&self) -> (i64, i64) {
        match self {
            ScoreTier::Excellent => (800, SCORE_MAX),
            ScoreTier::VeryGood => (740, 799),
            ScoreTier::Good => (670, 739),
            ScoreTier::Fair => (580, 669),
            ScoreTier::Poor => (SCORE_MIN, 579),
        }
    }

    pub fn next(&self) -> Option<ScoreTier> {
        match self {
            ScoreTier::Poor => Some(ScoreTier::Fair),
            ScoreTier::Fair => Some(ScoreTier::Good),
            ScoreTier::Good => Some(ScoreTier::VeryGood),
            ScoreTier::VeryGood => Some(ScoreTier::Excellent),
            ScoreTier::Excellent => None,
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier for any score; thresholds are inclusive lower bounds checked
/// from the top so a boundary score lands in the higher band.
pub fn color_tier(score: i64) -> ScoreTier {
    BREAKPOINTS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, tier)| *tier)
        .unwrap_or(ScoreTier::Poor)
}

/// Position on the gauge, in `[0, 100]`
pub fn percentage(score: i64) -> f64 {
    let clamped = score.clamp(SCORE_MIN, SCORE_MAX);
    (clamped - SCORE_MIN) as f64 / (SCORE_MAX - SCORE_MIN) as f64 * 100.0
}

/// Points needed to reach the next band, `None` once excellent
pub fn points_to_next_tier(score: i64) -> Option<i64> {
    let next = color_tier(score).next()?;
    Some(next.range().0.saturating_sub(score))
}

/// Direction the score is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    #[default]
    #[serde(other)]
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Explanations {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub action: String,
    pub impact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Recommendations {
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

/// Score payload produced by the scoring service
///
/// The client never changes it; display values are derived from `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: i64,
    pub category: String,
    #[serde(default)]
    pub trend: Trend,
    #[serde(default)]
    pub explanations: Explanations,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub recommendations: Recommendations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_of_default: Option<f64>,
    #[serde(default)]
    pub reward_eligible: bool,
    #[serde(default)]
    pub sample_data: bool,
}

impl ScoreResult {
    pub fn tier(&self) -> ScoreTier {
        color_tier(self.score)
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.score)
    }

    pub fn points_to_next_tier(&self) -> Option<i64> {
        points_to_next_tier(self.score)
    }
}
