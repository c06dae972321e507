//! Sport-specific session passes

use super::AggregatorThresholds;
use crate::error::AnalysisError;
use crate::features::std_dev;
use crate::models::Session;
use crate::pose::{Side, Skeleton};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biomechanical issue spotted in one badminton frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameAnomaly {
    /// Largest forearm deflection of the two arms, in degrees
    WristFlexion { angle: f64 },
    /// Smallest planar knee angle of the two legs, in degrees
    DeepKneeBend { angle: f64 },
    /// Gap between the shoulder and hip line angles, in degrees
    TrunkRotation { difference: f64 },
}

impl FrameAnomaly {
    pub fn advice(&self) -> &'static str {
        match self {
            FrameAnomaly::WristFlexion { .. } => {
                "Excessive wrist flexion detected. Keep wrist firm during shots to prevent injury."
            }
            FrameAnomaly::DeepKneeBend { .. } => {
                "Deep knee bend observed. Maintain moderate knee flexion for quick movements."
            }
            FrameAnomaly::TrunkRotation { .. } => {
                "Excessive upper body rotation. Coordinate shoulder and hip rotation for better shot control."
            }
        }
    }
}

/// An anomaly tagged with the frame it was found in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameFlag {
    pub frame: u32,
    #[serde(flatten)]
    pub anomaly: FrameAnomaly,
}

impl fmt::Display for FrameFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "At frame {}: {}", self.frame, self.anomaly.advice())
    }
}

fn max_of(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(f64::INFINITY, f64::min)
}

/// Anomalies of one frame, in wrist, knee, rotation order
pub fn badminton_frame_anomalies(
    skeleton: &Skeleton<'_>,
    thresholds: &AggregatorThresholds,
) -> Result<Vec<FrameAnomaly>, AnalysisError> {
    let mut wrists = Vec::with_capacity(2);
    let mut knees = Vec::with_capacity(2);
    for side in Side::BOTH {
        wrists.push(skeleton.wrist_flexion(side)?);
        knees.push(skeleton.planar_knee_angle(side)?);
    }
    let rotation = (skeleton.shoulder_line_angle()? - skeleton.hip_line_angle()?).abs();

    let mut anomalies = Vec::new();
    let wrist = max_of(wrists);
    if wrist > thresholds.wrist_flexion_max_degrees {
        anomalies.push(FrameAnomaly::WristFlexion { angle: wrist });
    }
    let knee = min_of(knees);
    if knee < thresholds.knee_angle_min_degrees {
        anomalies.push(FrameAnomaly::DeepKneeBend { angle: knee });
    }
    if rotation > thresholds.trunk_rotation_max_degrees {
        anomalies.push(FrameAnomaly::TrunkRotation {
            difference: rotation,
        });
    }
    Ok(anomalies)
}

/// Flags for every valid frame, in ascending frame order
pub fn badminton_flags(
    session: &Session,
    thresholds: &AggregatorThresholds,
) -> Result<Vec<FrameFlag>, AnalysisError> {
    let mut flags = Vec::new();
    for (frame, skeleton) in session.valid_frames() {
        for anomaly in badminton_frame_anomalies(&skeleton, thresholds)? {
            flags.push(FrameFlag { frame, anomaly });
        }
    }
    Ok(flags)
}

/// Population std of the mean hip height across valid frames
pub fn vertical_oscillation(session: &Session) -> Result<Option<f64>, AnalysisError> {
    let heights = session
        .valid_frames()
        .map(|(_, skeleton)| skeleton.mean_hip_height())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(std_dev(&heights))
}

pub fn oscillation_feedback(oscillation: f64, thresholds: &AggregatorThresholds) -> &'static str {
    if oscillation < thresholds.minimal_oscillation {
        "Your vertical oscillation is minimal, which is excellent for running efficiency."
    } else if oscillation < thresholds.moderate_oscillation {
        "Your vertical oscillation is moderate. Try to minimize up-and-down movement for better efficiency."
    } else {
        "Your vertical oscillation is high. Focus on reducing bouncing for better running economy."
    }
}
