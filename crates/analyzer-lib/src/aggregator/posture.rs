//! Shoulder/hip alignment pass

use super::AggregatorThresholds;
use crate::error::AnalysisError;
use crate::models::Session;
use crate::pose::Skeleton;
use serde::{Deserialize, Serialize};

/// Share of frames whose shoulder and hip lines run parallel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureSummary {
    pub aligned_frames: usize,
    pub valid_frames: usize,
}

impl PostureSummary {
    /// Aligned fraction in [0, 1]; zero for an empty summary
    pub fn quality(&self) -> f64 {
        if self.valid_frames == 0 {
            return 0.0;
        }
        self.aligned_frames as f64 / self.valid_frames as f64
    }

    pub fn description(&self, thresholds: &AggregatorThresholds) -> &'static str {
        let quality = self.quality();
        if quality > thresholds.excellent_posture {
            "excellent posture alignment"
        } else if quality > thresholds.adequate_posture {
            "adequate posture but could use improvement"
        } else {
            "poor posture alignment that needs correction"
        }
    }
}

/// Whether one frame's shoulder and hip lines are within tolerance
///
/// The line angles are compared as raw values, without wrapping at ±180°.
pub fn is_aligned(
    skeleton: &Skeleton<'_>,
    thresholds: &AggregatorThresholds,
) -> Result<bool, AnalysisError> {
    let shoulders = skeleton.shoulder_line_angle()?;
    let hips = skeleton.hip_line_angle()?;
    Ok((shoulders - hips).abs() < thresholds.posture_alignment_max_degrees)
}

pub fn assess(
    session: &Session,
    thresholds: &AggregatorThresholds,
) -> Result<PostureSummary, AnalysisError> {
    let mut summary = PostureSummary {
        aligned_frames: 0,
        valid_frames: 0,
    };
    for (_, skeleton) in session.valid_frames() {
        if is_aligned(&skeleton, thresholds)? {
            summary.aligned_frames += 1;
        }
        summary.valid_frames += 1;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::{standing, with};
    use crate::pose::PoseLandmark;

    #[test]
    fn test_level_frame_is_aligned() {
        let landmarks = standing();
        let thresholds = AggregatorThresholds::default();
        assert!(is_aligned(&Skeleton::new(&landmarks), &thresholds).unwrap());
    }

    #[test]
    fn test_line_angles_either_side_of_horizontal_are_misaligned() {
        // -179° against +179° is a 358° gap.
        let mut landmarks = with(standing(), PoseLandmark::RightShoulder, 0.4, 0.2465);
        landmarks = with(landmarks, PoseLandmark::RightHip, 0.42, 0.5528);
        let skeleton = Skeleton::new(&landmarks);
        assert!(skeleton.shoulder_line_angle().unwrap() < 0.0);
        assert!(skeleton.hip_line_angle().unwrap() > 0.0);
        assert!(!is_aligned(&skeleton, &AggregatorThresholds::default()).unwrap());
    }

    #[test]
    fn test_tilted_shoulders_are_misaligned() {
        let landmarks = with(standing(), PoseLandmark::LeftShoulder, 0.6, 0.4);
        let thresholds = AggregatorThresholds::default();
        assert!(!is_aligned(&Skeleton::new(&landmarks), &thresholds).unwrap());
    }

    #[test]
    fn test_quality_tiers() {
        let thresholds = AggregatorThresholds::default();
        let summary = |aligned| PostureSummary {
            aligned_frames: aligned,
            valid_frames: 10,
        };
        assert_eq!(summary(8).description(&thresholds), "excellent posture alignment");
        assert_eq!(
            summary(7).description(&thresholds),
            "adequate posture but could use improvement"
        );
        assert_eq!(
            summary(4).description(&thresholds),
            "poor posture alignment that needs correction"
        );
    }
}
