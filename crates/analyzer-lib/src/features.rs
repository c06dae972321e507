//! Feature extraction for injury risk scoring
//!
//! Summarizes a session into a [`FeatureVector`]: how much the right/left
//! knee angle gap varies across frames and how uneven the shoulders sit on
//! average. Only full-body frames contribute.

use crate::error::{AnalysisError, DegradedReason, Outcome};
use crate::models::{FeatureVector, Session};
use crate::pose::{PoseLandmark, Side};
use tracing::{debug, warn};

/// Degree range used to bring knee-angle statistics onto a unit scale
pub const KNEE_ANGLE_RANGE_DEGREES: f64 = 180.0;

/// Extracts pose features from a recorded session
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    angle_range_degrees: f64,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            angle_range_degrees: KNEE_ANGLE_RANGE_DEGREES,
        }
    }

    /// Extract features, substituting the neutral vector when that is impossible
    pub fn extract(&self, session: &Session) -> Outcome<FeatureVector> {
        if session.has_no_data() {
            return Outcome::degraded(FeatureVector::neutral(), DegradedReason::NoPoseData);
        }

        match self.try_extract(session) {
            Ok(Some(features)) => {
                debug!(
                    knee_angle_variability = features.knee_angle_variability,
                    shoulder_imbalance = features.shoulder_imbalance,
                    "Extracted pose features"
                );
                Outcome::Computed(features)
            }
            Ok(None) => Outcome::degraded(FeatureVector::neutral(), DegradedReason::NoValidFrames),
            Err(e) => {
                warn!(error = %e, "Feature extraction failed, using neutral features");
                Outcome::degraded(FeatureVector::neutral(), e)
            }
        }
    }

    fn try_extract(&self, session: &Session) -> Result<Option<FeatureVector>, AnalysisError> {
        let mut knee_gaps = Vec::new();
        let mut shoulder_gaps = Vec::new();

        for (_, skeleton) in session.valid_frames() {
            let right = skeleton.knee_angle(Side::Right)?;
            let left = skeleton.knee_angle(Side::Left)?;
            knee_gaps.push((right - left).abs());

            let left_shoulder = skeleton.y(PoseLandmark::LeftShoulder)?;
            let right_shoulder = skeleton.y(PoseLandmark::RightShoulder)?;
            shoulder_gaps.push((left_shoulder - right_shoulder).abs());
        }

        let (Some(knee_spread), Some(shoulder_imbalance)) =
            (std_dev(&knee_gaps), mean(&shoulder_gaps))
        else {
            return Ok(None);
        };

        Ok(Some(FeatureVector::new(
            knee_spread / self.angle_range_degrees,
            shoulder_imbalance,
        )))
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / values.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Landmark;
    use crate::pose::fixtures::{standing, with};
    use std::collections::BTreeMap;

    fn session_of(frames: Vec<Vec<Landmark>>) -> Session {
        let frames: BTreeMap<u32, Vec<Landmark>> = frames
            .into_iter()
            .enumerate()
            .map(|(i, landmarks)| (i as u32, landmarks))
            .collect();
        Session::new(frames, None)
    }

    #[test]
    fn test_empty_session_is_neutral() {
        let outcome = FeatureExtractor::new().extract(&Session::default());
        assert_eq!(*outcome.value(), FeatureVector::neutral());
        assert_eq!(outcome.reason(), Some(&DegradedReason::NoPoseData));
    }

    #[test]
    fn test_no_valid_frames_is_neutral() {
        let session = session_of(vec![vec![Landmark::at(0.5, 0.5); 20]; 4]);
        let outcome = FeatureExtractor::new().extract(&session);
        assert_eq!(outcome.value().to_vec(), vec![0.5, 0.5]);
        assert_eq!(outcome.reason(), Some(&DegradedReason::NoValidFrames));
    }

    #[test]
    fn test_symmetric_pose_has_no_variability() {
        let session = session_of(vec![standing(); 5]);
        let outcome = FeatureExtractor::new().extract(&session);
        assert!(!outcome.is_degraded());
        let features = outcome.into_value();
        assert!(features.knee_angle_variability.abs() < 1e-6);
        assert!(features.shoulder_imbalance.abs() < 1e-9);
    }

    #[test]
    fn test_shoulder_imbalance_is_mean_height_gap() {
        let tilted = with(standing(), PoseLandmark::LeftShoulder, 0.6, 0.35);
        let session = session_of(vec![tilted, standing()]);
        let features = FeatureExtractor::new().extract(&session).into_value();
        assert!((features.shoulder_imbalance - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_knee_variability_is_normalized_population_std() {
        // Frame 0: straight legs (gap 0). Frame 1: left knee pushed out.
        let bent = with(standing(), PoseLandmark::LeftKnee, 0.75, 0.72);
        let session = session_of(vec![standing(), bent.clone()]);
        let features = FeatureExtractor::new().extract(&session).into_value();

        let skeleton = crate::pose::Skeleton::new(&bent);
        let gap = (skeleton.knee_angle(Side::Right).unwrap()
            - skeleton.knee_angle(Side::Left).unwrap())
        .abs();
        // Population std of [0, gap] is gap / 2.
        assert!((features.knee_angle_variability - gap / 2.0 / 180.0).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&features.knee_angle_variability));
    }

    #[test]
    fn test_partial_frames_are_skipped_not_zero_filled() {
        let tilted = with(standing(), PoseLandmark::LeftShoulder, 0.6, 0.45);
        let session = session_of(vec![tilted, vec![Landmark::at(0.0, 0.0); 10]]);
        let features = FeatureExtractor::new().extract(&session).into_value();
        assert!((features.shoulder_imbalance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_degrades() {
        let mut broken = standing();
        broken[PoseLandmark::RightAnkle.index()].x = f64::INFINITY;
        let outcome = FeatureExtractor::new().extract(&session_of(vec![broken]));
        assert_eq!(*outcome.value(), FeatureVector::neutral());
        assert!(matches!(
            outcome.reason(),
            Some(DegradedReason::ComputationFailed(AnalysisError::NonFiniteLandmark { index: 28, .. }))
        ));
    }

    #[test]
    fn test_statistics_helpers() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(std_dev(&[3.0]), Some(0.0));
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&values).unwrap() - 2.0).abs() < 1e-12);
    }
}
