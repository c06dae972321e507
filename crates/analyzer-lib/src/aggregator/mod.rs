//! Session aggregation
//!
//! Turns a whole recorded session into a narrative assessment and an
//! ordered recommendation list. The pipeline runs a posture pass over all
//! valid frames followed by one sport-specific pass, then joins the
//! resulting sentences with single spaces.

mod posture;
mod sport;
pub mod templates;

pub use posture::PostureSummary;
pub use sport::{FrameAnomaly, FrameFlag};

use crate::error::{AnalysisError, DegradedReason, Outcome};
use crate::models::{Session, Sport};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Largest shoulder/hip line angle gap for a frame to count as aligned
pub const POSTURE_ALIGNMENT_MAX_DEGREES: f64 = 10.0;

/// Posture quality above which alignment is rated excellent
pub const EXCELLENT_POSTURE_THRESHOLD: f64 = 0.7;

/// Posture quality above which alignment is rated adequate
pub const ADEQUATE_POSTURE_THRESHOLD: f64 = 0.4;

/// Posture quality below which core strength work is recommended
pub const CORE_STRENGTH_THRESHOLD: f64 = 0.4;

/// Wrist flexion above this is flagged in badminton frames
pub const WRIST_FLEXION_MAX_DEGREES: f64 = 100.0;

/// Knee angles below this are flagged as deep bends in badminton frames
pub const KNEE_ANGLE_MIN_DEGREES: f64 = 130.0;

/// Shoulder/hip rotation gap above this is flagged in badminton frames
pub const TRUNK_ROTATION_MAX_DEGREES: f64 = 45.0;

/// Hip height std below this is minimal running oscillation
pub const MINIMAL_OSCILLATION: f64 = 0.02;

/// Hip height std below this is moderate running oscillation
pub const MODERATE_OSCILLATION: f64 = 0.04;

/// Tunable limits for the session passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorThresholds {
    pub posture_alignment_max_degrees: f64,
    pub excellent_posture: f64,
    pub adequate_posture: f64,
    pub core_strength_below: f64,
    pub wrist_flexion_max_degrees: f64,
    pub knee_angle_min_degrees: f64,
    pub trunk_rotation_max_degrees: f64,
    pub minimal_oscillation: f64,
    pub moderate_oscillation: f64,
}

impl Default for AggregatorThresholds {
    fn default() -> Self {
        Self {
            posture_alignment_max_degrees: POSTURE_ALIGNMENT_MAX_DEGREES,
            excellent_posture: EXCELLENT_POSTURE_THRESHOLD,
            adequate_posture: ADEQUATE_POSTURE_THRESHOLD,
            core_strength_below: CORE_STRENGTH_THRESHOLD,
            wrist_flexion_max_degrees: WRIST_FLEXION_MAX_DEGREES,
            knee_angle_min_degrees: KNEE_ANGLE_MIN_DEGREES,
            trunk_rotation_max_degrees: TRUNK_ROTATION_MAX_DEGREES,
            minimal_oscillation: MINIMAL_OSCILLATION,
            moderate_oscillation: MODERATE_OSCILLATION,
        }
    }
}

/// Narrative feedback for a session plus the structured detail behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub feedback: String,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posture: Option<PostureSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame_flags: Vec<FrameFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_oscillation: Option<f64>,
}

impl SessionReport {
    /// Fixed feedback/recommendation pair with no detail
    pub fn canned(feedback: &str, recommendation: &str) -> Self {
        Self {
            feedback: feedback.to_string(),
            recommendations: vec![recommendation.to_string()],
            posture: None,
            frame_flags: Vec::new(),
            vertical_oscillation: None,
        }
    }

    pub fn posture_quality(&self) -> Option<f64> {
        self.posture.map(|p| p.quality())
    }
}

/// Aggregates frame-level measurements into session feedback
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    thresholds: AggregatorThresholds,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: AggregatorThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AggregatorThresholds {
        &self.thresholds
    }

    /// Aggregate a session; unusable input yields a canned report
    pub fn aggregate(&self, session: &Session, sport: Sport) -> Outcome<SessionReport> {
        if session.has_no_data() {
            return Outcome::degraded(
                SessionReport::canned(
                    templates::INSUFFICIENT_DATA_FEEDBACK,
                    templates::INSUFFICIENT_DATA_RECOMMENDATION,
                ),
                DegradedReason::NoPoseData,
            );
        }
        if session.valid_frames().next().is_none() {
            return Outcome::degraded(
                SessionReport::canned(
                    templates::NO_VALID_FRAMES_FEEDBACK,
                    templates::NO_VALID_FRAMES_RECOMMENDATION,
                ),
                DegradedReason::NoValidFrames,
            );
        }

        match self.try_aggregate(session, sport) {
            Ok(report) => {
                debug!(
                    sport = %sport,
                    posture_quality = report.posture_quality(),
                    flags = report.frame_flags.len(),
                    "Aggregated session"
                );
                Outcome::Computed(report)
            }
            Err(e) => {
                warn!(sport = %sport, error = %e, "Movement analysis failed");
                Outcome::degraded(
                    SessionReport::canned(
                        templates::ANALYSIS_FAILED_FEEDBACK,
                        templates::ANALYSIS_FAILED_RECOMMENDATION,
                    ),
                    e,
                )
            }
        }
    }

    fn try_aggregate(&self, session: &Session, sport: Sport) -> Result<SessionReport, AnalysisError> {
        let posture = posture::assess(session, &self.thresholds)?;
        let mut parts = vec![templates::posture_feedback(
            posture.description(&self.thresholds),
        )];
        let mut frame_flags = Vec::new();
        let mut vertical_oscillation = None;

        match sport {
            Sport::Badminton => {
                frame_flags = sport::badminton_flags(session, &self.thresholds)?;
                if frame_flags.is_empty() {
                    parts.push(templates::general_feedback(
                        sport,
                        templates::default_quality(sport),
                    ));
                } else {
                    parts.extend(frame_flags.iter().map(FrameFlag::to_string));
                    parts.push(templates::BADMINTON_CLOSING.to_string());
                }
            }
            Sport::Running => {
                parts.push(templates::running_form_feedback(
                    templates::default_quality(sport),
                ));
                vertical_oscillation = sport::vertical_oscillation(session)?;
                if let Some(oscillation) = vertical_oscillation {
                    parts.push(sport::oscillation_feedback(oscillation, &self.thresholds).to_string());
                }
            }
            Sport::Basketball | Sport::Tennis | Sport::Football | Sport::Default => {
                parts.push(templates::general_feedback(
                    sport,
                    templates::default_quality(sport),
                ));
            }
        }

        let recommendations =
            templates::recommendations(posture.quality() < self.thresholds.core_strength_below);

        Ok(SessionReport {
            feedback: parts.join(" "),
            recommendations,
            posture: Some(posture),
            frame_flags,
            vertical_oscillation,
        })
    }
}
