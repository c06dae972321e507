//! Badminton stance checks

use super::{RuleThresholds, RuleVerdict};
use crate::error::AnalysisError;
use crate::geometry::planar_distance;
use crate::models::FeedbackItem;
use crate::pose::{PoseLandmark, Side, Skeleton};
use serde::{Deserialize, Serialize};

/// Tunable limits for the badminton stance rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadmintonThresholds {
    /// Hips closer than this to knee height count as sitting
    pub sitting_hip_knee_max: f64,
    /// Largest shoulder height gap still considered level
    pub shoulder_level_max: f64,
    /// Exclusive lower bound on the left elbow-wrist distance
    pub elbow_wrist_min: f64,
    /// Exclusive upper bound on the left elbow-wrist distance
    pub elbow_wrist_max: f64,
    /// Knee-over-ankle height above which the knees count as bent
    pub knee_bend_min: f64,
}

impl Default for BadmintonThresholds {
    fn default() -> Self {
        Self {
            sitting_hip_knee_max: 0.1,
            shoulder_level_max: 0.05,
            elbow_wrist_min: 0.1,
            elbow_wrist_max: 0.3,
            knee_bend_min: 0.15,
        }
    }
}

fn mean_leg_gap(
    skeleton: &Skeleton<'_>,
    upper: fn(&Side) -> PoseLandmark,
    lower: fn(&Side) -> PoseLandmark,
) -> Result<f64, AnalysisError> {
    let mut total = 0.0;
    for side in Side::BOTH {
        total += skeleton.y(upper(&side))? - skeleton.y(lower(&side))?;
    }
    Ok(total / Side::BOTH.len() as f64)
}

pub(super) fn sitting(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let hip_knee = mean_leg_gap(skeleton, Side::hip, Side::knee)?;
    if hip_knee.abs() < thresholds.badminton.sitting_hip_knee_max {
        return Ok(RuleVerdict::Halt(FeedbackItem::error(
            "You appear to be sitting. Stand up for proper badminton stance.",
        )));
    }
    Ok(RuleVerdict::Pass)
}

pub(super) fn shoulder_level(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let gap = (skeleton.y(PoseLandmark::LeftShoulder)? - skeleton.y(PoseLandmark::RightShoulder)?)
        .abs();
    let item = if gap < thresholds.badminton.shoulder_level_max {
        FeedbackItem::good("Good shoulder position for badminton stance.")
    } else {
        FeedbackItem::warning("Keep shoulders level for better balance.")
    };
    Ok(RuleVerdict::Emit(item))
}

pub(super) fn elbow_wrist_reach(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let reach = planar_distance(
        skeleton.get(PoseLandmark::LeftElbow)?.planar(),
        skeleton.get(PoseLandmark::LeftWrist)?.planar(),
    );
    let limits = &thresholds.badminton;
    let item = if reach > limits.elbow_wrist_min && reach < limits.elbow_wrist_max {
        FeedbackItem::good("Good elbow position for power shots.")
    } else {
        FeedbackItem::warning("Adjust elbow angle for better shot control.")
    };
    Ok(RuleVerdict::Emit(item))
}

pub(super) fn knee_bend(
    skeleton: &Skeleton<'_>,
    thresholds: &RuleThresholds,
) -> Result<RuleVerdict, AnalysisError> {
    let knee_ankle = mean_leg_gap(skeleton, Side::knee, Side::ankle)?;
    let item = if knee_ankle > thresholds.badminton.knee_bend_min {
        FeedbackItem::good("Good knee bend for quick movement.")
    } else {
        FeedbackItem::warning("Bend knees more for better court movement.")
    };
    Ok(RuleVerdict::Emit(item))
}
