//! 33-point body landmark schema and checked frame access

use crate::error::AnalysisError;
use crate::geometry::{angle_at, line_angle, segment_deflection};
use crate::models::Landmark;

/// Landmarks required for full-body analysis
pub const FULL_BODY_LANDMARKS: usize = 33;

/// Body landmark indices emitted by the upstream pose model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// Body side, from the subject's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Right, Side::Left];

    pub fn shoulder(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftShoulder,
            Side::Right => PoseLandmark::RightShoulder,
        }
    }

    pub fn elbow(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftElbow,
            Side::Right => PoseLandmark::RightElbow,
        }
    }

    pub fn wrist(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftWrist,
            Side::Right => PoseLandmark::RightWrist,
        }
    }

    pub fn hip(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftHip,
            Side::Right => PoseLandmark::RightHip,
        }
    }

    pub fn knee(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftKnee,
            Side::Right => PoseLandmark::RightKnee,
        }
    }

    pub fn ankle(&self) -> PoseLandmark {
        match self {
            Side::Left => PoseLandmark::LeftAnkle,
            Side::Right => PoseLandmark::RightAnkle,
        }
    }
}

/// Read-only view over one frame's landmarks with checked lookups
#[derive(Debug, Clone, Copy)]
pub struct Skeleton<'a> {
    landmarks: &'a [Landmark],
}

impl<'a> Skeleton<'a> {
    pub fn new(landmarks: &'a [Landmark]) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn is_full_body(&self) -> bool {
        self.landmarks.len() >= FULL_BODY_LANDMARKS
    }

    pub fn landmarks(&self) -> &'a [Landmark] {
        self.landmarks
    }

    /// Look up a landmark, rejecting absent or non-finite entries
    pub fn get(&self, part: PoseLandmark) -> Result<&'a Landmark, AnalysisError> {
        let landmark =
            self.landmarks
                .get(part.index())
                .ok_or(AnalysisError::MissingLandmark {
                    index: part.index(),
                    name: part.name(),
                    available: self.landmarks.len(),
                })?;
        if !landmark.is_finite() {
            return Err(AnalysisError::NonFiniteLandmark {
                index: part.index(),
                name: part.name(),
            });
        }
        Ok(landmark)
    }

    pub fn y(&self, part: PoseLandmark) -> Result<f64, AnalysisError> {
        Ok(self.get(part)?.y)
    }

    /// Hip-knee-ankle angle including depth
    pub fn knee_angle(&self, side: Side) -> Result<f64, AnalysisError> {
        Ok(angle_at(
            self.get(side.knee())?.point(),
            self.get(side.hip())?.point(),
            self.get(side.ankle())?.point(),
        ))
    }

    /// Hip-knee-ankle angle in the image plane
    pub fn planar_knee_angle(&self, side: Side) -> Result<f64, AnalysisError> {
        Ok(angle_at(
            self.get(side.knee())?.planar(),
            self.get(side.hip())?.planar(),
            self.get(side.ankle())?.planar(),
        ))
    }

    /// Bend of the forearm away from the upper-arm line
    pub fn wrist_flexion(&self, side: Side) -> Result<f64, AnalysisError> {
        Ok(segment_deflection(
            self.get(side.shoulder())?.planar(),
            self.get(side.elbow())?.planar(),
            self.get(side.wrist())?.planar(),
        ))
    }

    /// Angle of the left-to-right shoulder line
    pub fn shoulder_line_angle(&self) -> Result<f64, AnalysisError> {
        Ok(line_angle(
            self.get(PoseLandmark::LeftShoulder)?.planar(),
            self.get(PoseLandmark::RightShoulder)?.planar(),
        ))
    }

    /// Angle of the left-to-right hip line
    pub fn hip_line_angle(&self) -> Result<f64, AnalysisError> {
        Ok(line_angle(
            self.get(PoseLandmark::LeftHip)?.planar(),
            self.get(PoseLandmark::RightHip)?.planar(),
        ))
    }

    /// Mean of the left and right hip heights
    pub fn mean_hip_height(&self) -> Result<f64, AnalysisError> {
        let left = self.y(PoseLandmark::LeftHip)?;
        let right = self.y(PoseLandmark::RightHip)?;
        Ok((left + right) / 2.0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic skeletons shared by the unit tests

    use super::*;

    /// Upright subject facing the camera with straight limbs
    pub fn standing() -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::at(0.5, 0.5); FULL_BODY_LANDMARKS];
        let mut set = |part: PoseLandmark, x: f64, y: f64| {
            landmarks[part.index()] = Landmark::at(x, y);
        };
        set(PoseLandmark::Nose, 0.5, 0.1);
        set(PoseLandmark::LeftShoulder, 0.6, 0.25);
        set(PoseLandmark::RightShoulder, 0.4, 0.25);
        set(PoseLandmark::LeftElbow, 0.6, 0.4);
        set(PoseLandmark::RightElbow, 0.4, 0.4);
        set(PoseLandmark::LeftWrist, 0.6, 0.55);
        set(PoseLandmark::RightWrist, 0.4, 0.55);
        set(PoseLandmark::LeftHip, 0.58, 0.55);
        set(PoseLandmark::RightHip, 0.42, 0.55);
        set(PoseLandmark::LeftKnee, 0.58, 0.72);
        set(PoseLandmark::RightKnee, 0.42, 0.72);
        set(PoseLandmark::LeftAnkle, 0.58, 0.9);
        set(PoseLandmark::RightAnkle, 0.42, 0.9);
        landmarks
    }

    pub fn with(mut landmarks: Vec<Landmark>, part: PoseLandmark, x: f64, y: f64) -> Vec<Landmark> {
        landmarks[part.index()] = Landmark::at(x, y);
        landmarks
    }
}
