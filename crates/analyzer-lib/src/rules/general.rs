//! Running, football and general posture checks

use super::{RuleThresholds, RuleVerdict};
use crate::error::AnalysisError;
use crate::models::FeedbackItem;
use crate::pose::{PoseLandmark, Side, Skeleton};

pub(super) fn knee_lift(
    skeleton: &Skeleton<'_>,
    _thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    for side in Side::BOTH {
        if skeleton.y(side.knee())? > skeleton.y(side.shoulder())? {
            return Ok(RuleVerdict::Emit(FeedbackItem::warning(
                "Lift your knees higher",
            )));
        }
    }
    Ok(RuleVerdict::Pass)
}

pub(super) fn hip_level(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let gap = (skeleton.y(PoseLandmark::LeftHip)? - skeleton.y(PoseLandmark::RightHip)?).abs();
    if gap > thresholds.hip_level_max {
        return Ok(RuleVerdict::Emit(FeedbackItem::warning("Keep your hips level")));
    }
    Ok(RuleVerdict::Pass)
}

/// Always informational, whichever way it goes
pub(super) fn shoulder_alignment(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let gap = (skeleton.y(PoseLandmark::LeftShoulder)? - skeleton.y(PoseLandmark::RightShoulder)?)
        .abs();
    let message = if gap > thresholds.shoulder_alignment_max {
        "Keep your shoulders level"
    } else {
        "Good shoulder alignment"
    };
    Ok(RuleVerdict::Emit(FeedbackItem::info(message)))
}
