//! Failure and degraded-mode types
//!
//! Internal steps fail with [`AnalysisError`]. Public operations never
//! surface it directly: they return an [`Outcome`] carrying either the
//! computed value or a neutral substitute tagged with a [`DegradedReason`].

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Failures raised inside an analysis step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("landmark {index} ({name}) missing from a frame of {available} landmarks")]
    MissingLandmark {
        index: usize,
        name: &'static str,
        available: usize,
    },

    #[error("landmark {index} ({name}) has a non-finite coordinate")]
    NonFiniteLandmark { index: usize, name: &'static str },

    #[error("training intensity {0} is outside the 1-10 scale")]
    IntensityOutOfRange(u8),
}

/// Why an operation fell back to its neutral output
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DegradedReason {
    #[error("no pose data was supplied")]
    NoPoseData,

    #[error("no frame carried a full-body landmark set")]
    NoValidFrames,

    #[error("frame carried {available} of {required} landmarks")]
    PartialFrame { available: usize, required: usize },

    #[error("analysis failed: {0}")]
    ComputationFailed(#[from] AnalysisError),
}

impl DegradedReason {
    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            DegradedReason::NoPoseData => "no_pose_data",
            DegradedReason::NoValidFrames => "no_valid_frames",
            DegradedReason::PartialFrame { .. } => "partial_frame",
            DegradedReason::ComputationFailed(_) => "computation_failed",
        }
    }
}

impl Serialize for DegradedReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DegradedReason", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("detail", &self.to_string())?;
        state.end()
    }
}

/// Result of a public analysis operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The value was computed from the inputs
    Computed(T),
    /// A documented default was substituted
    Degraded { value: T, reason: DegradedReason },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, reason: impl Into<DegradedReason>) -> Self {
        Outcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Computed(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Computed(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&DegradedReason> {
        match self {
            Outcome::Computed(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed(value) => Outcome::Computed(f(value)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }

    pub fn into_parts(self) -> (T, Option<DegradedReason>) {
        match self {
            Outcome::Computed(value) => (value, None),
            Outcome::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}
