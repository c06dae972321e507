//! Injury risk scoring
//!
//! Two models share one entry point. With at least
//! [`MIN_HISTORY_ENTRIES`] training records, pose features and training load
//! add up to an integer score that maps onto a tier. With less history only
//! the pose features are consulted, against their own thresholds.
//!
//! Degraded inputs never produce a `Low` tier: any assessment built on
//! neutral features or unreadable history is raised to at least `Medium`.

use crate::error::{AnalysisError, Outcome};
use crate::features::FeatureExtractor;
use crate::models::{
    FeatureVector, RiskAssessment, RiskTier, ScoringPath, Session, Sport, TrainingHistoryDigest,
    TrainingLoad,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// History shorter than this falls back to the pose-only model
pub const MIN_HISTORY_ENTRIES: usize = 3;

/// Knee angle variability above this adds [`KNEE_VARIABILITY_POINTS`]
pub const KNEE_VARIABILITY_THRESHOLD: f64 = 0.7;

/// Shoulder imbalance above this adds [`SHOULDER_IMBALANCE_POINTS`] on the history path
pub const SHOULDER_IMBALANCE_THRESHOLD: f64 = 0.6;

/// Either pose feature above this is High on the pose-only path
pub const POSE_ONLY_HIGH_THRESHOLD: f64 = 0.7;

/// Either pose feature above this is Medium on the pose-only path
pub const POSE_ONLY_MEDIUM_THRESHOLD: f64 = 0.4;

/// Mean raw intensity above this adds a point
pub const HIGH_AVG_INTENSITY: f64 = 7.0;

/// Peak raw intensity above this adds a point
pub const HIGH_MAX_INTENSITY: u8 = 8;

pub const KNEE_VARIABILITY_POINTS: u32 = 2;
pub const SHOULDER_IMBALANCE_POINTS: u32 = 1;
pub const AVG_INTENSITY_POINTS: u32 = 1;
pub const MAX_INTENSITY_POINTS: u32 = 1;
pub const SYMPTOM_POINTS: u32 = 2;

/// Score at or above which the tier is High
pub const HIGH_RISK_SCORE: u32 = 4;

/// Score at or above which the tier is Medium
pub const MEDIUM_RISK_SCORE: u32 = 2;

/// Valid training intensity scale
pub const INTENSITY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Tunable limits for both scoring paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub min_history_entries: usize,
    pub knee_variability: f64,
    pub shoulder_imbalance: f64,
    pub pose_only_high: f64,
    pub pose_only_medium: f64,
    pub high_avg_intensity: f64,
    pub high_max_intensity: u8,
    pub high_score: u32,
    pub medium_score: u32,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            min_history_entries: MIN_HISTORY_ENTRIES,
            knee_variability: KNEE_VARIABILITY_THRESHOLD,
            shoulder_imbalance: SHOULDER_IMBALANCE_THRESHOLD,
            pose_only_high: POSE_ONLY_HIGH_THRESHOLD,
            pose_only_medium: POSE_ONLY_MEDIUM_THRESHOLD,
            high_avg_intensity: HIGH_AVG_INTENSITY,
            high_max_intensity: HIGH_MAX_INTENSITY,
            high_score: HIGH_RISK_SCORE,
            medium_score: MEDIUM_RISK_SCORE,
        }
    }
}

impl TrainingLoad {
    /// Summarize a training history, rejecting intensities off the 1-10 scale
    pub fn from_history(history: &TrainingHistoryDigest) -> Result<Self, AnalysisError> {
        let mut total = 0u32;
        let mut max_intensity = 0u8;
        for entry in history.entries() {
            if !INTENSITY_RANGE.contains(&entry.intensity) {
                return Err(AnalysisError::IntensityOutOfRange(entry.intensity));
            }
            total += u32::from(entry.intensity);
            max_intensity = max_intensity.max(entry.intensity);
        }

        let entries = history.len();
        let avg_intensity = if entries == 0 {
            0.0
        } else {
            f64::from(total) / entries as f64
        };

        Ok(Self {
            entries,
            avg_intensity,
            max_intensity,
            has_symptoms: history.entries().iter().any(|e| e.reports_symptoms()),
        })
    }
}

/// Additive risk score on the history path
pub fn history_score(features: &FeatureVector, load: &TrainingLoad, thresholds: &RiskThresholds) -> u32 {
    let mut score = 0;
    if features.knee_angle_variability > thresholds.knee_variability {
        score += KNEE_VARIABILITY_POINTS;
    }
    if features.shoulder_imbalance > thresholds.shoulder_imbalance {
        score += SHOULDER_IMBALANCE_POINTS;
    }
    if load.avg_intensity > thresholds.high_avg_intensity {
        score += AVG_INTENSITY_POINTS;
    }
    if load.max_intensity > thresholds.high_max_intensity {
        score += MAX_INTENSITY_POINTS;
    }
    if load.has_symptoms {
        score += SYMPTOM_POINTS;
    }
    score
}

pub fn tier_for_score(score: u32, thresholds: &RiskThresholds) -> RiskTier {
    if score >= thresholds.high_score {
        RiskTier::High
    } else if score >= thresholds.medium_score {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Tier from pose features alone
pub fn pose_only_tier(features: &FeatureVector, thresholds: &RiskThresholds) -> RiskTier {
    let worst = features
        .knee_angle_variability
        .max(features.shoulder_imbalance);
    if worst > thresholds.pose_only_high {
        RiskTier::High
    } else if worst > thresholds.pose_only_medium {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Scores injury risk for a session
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    extractor: FeatureExtractor,
    thresholds: RiskThresholds,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RiskThresholds) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Assess a session, blending in training history when there is enough of it
    pub fn assess(
        &self,
        session: &Session,
        sport: Sport,
        history: Option<&TrainingHistoryDigest>,
    ) -> Outcome<RiskAssessment> {
        let (features, feature_reason) = self.extractor.extract(session).into_parts();

        let history = history.filter(|h| h.len() >= self.thresholds.min_history_entries);
        let outcome = match history {
            None => {
                debug!(sport = %sport, "Insufficient training history, using pose-only model");
                Outcome::Computed(RiskAssessment {
                    tier: pose_only_tier(&features, &self.thresholds),
                    score: 0,
                    path: ScoringPath::PoseOnly,
                    features,
                    training_load: None,
                })
            }
            Some(history) => self.assess_with_history(features, history),
        };

        let outcome = match (outcome, feature_reason) {
            (Outcome::Computed(assessment), Some(reason)) => Outcome::degraded(assessment, reason),
            (outcome, _) => outcome,
        };

        match outcome {
            Outcome::Degraded { mut value, reason } => {
                warn!(sport = %sport, reason = %reason, "Risk assessed from degraded inputs");
                value.tier = value.tier.max(RiskTier::Medium);
                Outcome::Degraded { value, reason }
            }
            computed => computed,
        }
    }

    fn assess_with_history(
        &self,
        features: FeatureVector,
        history: &TrainingHistoryDigest,
    ) -> Outcome<RiskAssessment> {
        match TrainingLoad::from_history(history) {
            Ok(load) => {
                let score = history_score(&features, &load, &self.thresholds);
                debug!(
                    score,
                    avg_intensity = load.avg_intensity,
                    max_intensity = load.max_intensity,
                    has_symptoms = load.has_symptoms,
                    "Scored training history"
                );
                Outcome::Computed(RiskAssessment {
                    tier: tier_for_score(score, &self.thresholds),
                    score,
                    path: ScoringPath::TrainingHistory,
                    features,
                    training_load: Some(load),
                })
            }
            Err(e) => Outcome::degraded(
                RiskAssessment {
                    tier: RiskTier::Medium,
                    score: 0,
                    path: ScoringPath::TrainingHistory,
                    features,
                    training_load: None,
                },
                e,
            ),
        }
    }
}
