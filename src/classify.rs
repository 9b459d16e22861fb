//! Deterministic risk classification over extracted biomarkers.
//!
//! A validity gate on average pitch decides whether the recording can be
//! assessed at all; only then is the configured risk metric compared against
//! the threshold. The classifier keeps no state between runs.

use serde::{Deserialize, Serialize};

use crate::config::{ClassifierConfig, RiskMetric};
use crate::pipeline::BiomarkerSet;

/// Screening outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Signal too unclear, silent or out of range to assess.
    Inconclusive,
    /// Risk metric at or below the threshold.
    Normal,
    /// Risk metric strictly above the threshold.
    Elevated,
}

impl RiskCategory {
    /// Fixed recommendation text per category.
    pub fn recommendation(self) -> &'static str {
        match self {
            RiskCategory::Inconclusive => {
                "Signal unclear or out of range; re-record in a quiet environment."
            }
            RiskCategory::Normal => "No significant anomalies detected; routine follow-up only.",
            RiskCategory::Elevated => {
                "Deviation above the screening threshold; consider clinical screening."
            }
        }
    }
}

/// Result of one classification, created fresh per analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub category: RiskCategory,
    /// Value of the configured risk metric that drove the decision.
    pub score: f32,
    pub recommendation: String,
}

impl RiskAssessment {
    fn new(category: RiskCategory, score: f32) -> Self {
        Self {
            category,
            score,
            recommendation: category.recommendation().to_string(),
        }
    }
}

/// Apply the threshold rules to a biomarker set.
///
/// Evaluation order: the pitch validity gate first (exclusive bounds), then a
/// strict greater-than comparison against the risk threshold. A score exactly
/// equal to the threshold classifies as Normal.
pub fn classify(biomarkers: &BiomarkerSet, config: &ClassifierConfig) -> RiskAssessment {
    let score = match config.metric {
        RiskMetric::ZcrVariance => biomarkers.roughness_score,
        RiskMetric::PitchStdDev => biomarkers.pitch_stddev,
    };

    let (lo, hi) = config.valid_pitch_range;
    let pitch = biomarkers.average_pitch;
    if !(pitch > lo && pitch < hi) {
        return RiskAssessment::new(RiskCategory::Inconclusive, score);
    }

    let category = if score > config.risk_threshold {
        RiskCategory::Elevated
    } else {
        RiskCategory::Normal
    };
    RiskAssessment::new(category, score)
}
