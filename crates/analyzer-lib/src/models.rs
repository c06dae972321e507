//! Core data models for the analysis pipeline

use crate::geometry::Point;
use crate::pose::{Skeleton, FULL_BODY_LANDMARKS};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

/// Maximum number of training history entries considered by the risk scorer
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// One skeletal keypoint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Planar landmark with full visibility
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    /// Position including depth
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y, self.z)
    }

    /// Position projected onto the image plane
    pub fn planar(&self) -> Point {
        Point::planar(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Landmarks detected in a single frame of a video or live stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: u32,
    pub landmarks: Vec<Landmark>,
}

impl Frame {
    pub fn new(index: u32, landmarks: Vec<Landmark>) -> Self {
        Self { index, landmarks }
    }

    pub fn is_full_body(&self) -> bool {
        self.landmarks.len() >= FULL_BODY_LANDMARKS
    }
}

/// Per-frame landmark data for one recorded or live analysis run
///
/// Deserializes from the bundle produced by the upstream pose-detection
/// stage: `{"pose_data": {"0": [...]}, "frame_count": n,
/// "analysis_timestamp": "..."}`. Frames are kept ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "pose_data", alias = "frames", default)]
    pub frames: BTreeMap<u32, Vec<Landmark>>,
    #[serde(default)]
    pub frame_count: u32,
    #[serde(
        rename = "analysis_timestamp",
        alias = "captured_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub captured_at: Option<NaiveDateTime>,
    /// Set by the upstream decoder when it could not produce pose data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    pub fn new(frames: BTreeMap<u32, Vec<Landmark>>, captured_at: Option<NaiveDateTime>) -> Self {
        let frame_count = frames.keys().max().map(|last| last.saturating_add(1)).unwrap_or(0);
        Self {
            frames,
            frame_count,
            captured_at,
            error: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// True when upstream signalled failure or supplied no frames at all
    pub fn has_no_data(&self) -> bool {
        self.error.is_some() || self.frames.is_empty()
    }

    /// Frames in ascending index order, including partial ones
    pub fn frames(&self) -> impl Iterator<Item = (u32, &[Landmark])> {
        self.frames
            .iter()
            .map(|(index, landmarks)| (*index, landmarks.as_slice()))
    }

    /// Frames carrying a full-body landmark set, in ascending index order
    pub fn valid_frames(&self) -> impl Iterator<Item = (u32, Skeleton<'_>)> {
        self.frames()
            .map(|(index, landmarks)| (index, Skeleton::new(landmarks)))
            .filter(|(_, skeleton)| skeleton.is_full_body())
    }

    pub fn valid_frame_count(&self) -> usize {
        self.valid_frames().count()
    }
}

/// Supported sports, matched case-insensitively from free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sport {
    Basketball,
    Tennis,
    Football,
    Badminton,
    Running,
    #[default]
    Default,
}

impl Sport {
    pub const ALL: [Sport; 6] = [
        Sport::Basketball,
        Sport::Tennis,
        Sport::Football,
        Sport::Badminton,
        Sport::Running,
        Sport::Default,
    ];

    /// Map free text to a sport; anything unrecognized is `Default`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "basketball" => Sport::Basketball,
            "tennis" => Sport::Tennis,
            "football" => Sport::Football,
            "badminton" => Sport::Badminton,
            "running" => Sport::Running,
            _ => Sport::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sport::Basketball => "Basketball",
            Sport::Tennis => "Tennis",
            Sport::Football => "Football",
            Sport::Badminton => "Badminton",
            Sport::Running => "Running",
            Sport::Default => "default",
        }
    }
}

impl From<String> for Sport {
    fn from(name: String) -> Self {
        Sport::from_name(&name)
    }
}

impl From<Sport> for String {
    fn from(sport: Sport) -> Self {
        sport.name().to_string()
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric summary of a session used for risk scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Population std of per-frame right/left knee angle differences, over 180°
    pub knee_angle_variability: f64,
    /// Mean per-frame left/right shoulder height difference
    pub shoulder_imbalance: f64,
}

impl FeatureVector {
    pub const NEUTRAL_VALUE: f64 = 0.5;

    pub fn new(knee_angle_variability: f64, shoulder_imbalance: f64) -> Self {
        Self {
            knee_angle_variability,
            shoulder_imbalance,
        }
    }

    /// Vector substituted whenever features cannot be computed
    pub fn neutral() -> Self {
        Self::new(Self::NEUTRAL_VALUE, Self::NEUTRAL_VALUE)
    }

    /// Features in their fixed schema order
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.knee_angle_variability, self.shoulder_imbalance]
    }
}

/// Severity of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Good,
    Warning,
    Error,
    Info,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Good => "good",
            FeedbackStatus::Warning => "warning",
            FeedbackStatus::Error => "error",
            FeedbackStatus::Info => "info",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of feedback for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub status: FeedbackStatus,
    pub message: String,
}

impl FeedbackItem {
    pub fn new(status: FeedbackStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn good(message: impl Into<String>) -> Self {
        Self::new(FeedbackStatus::Good, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FeedbackStatus::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FeedbackStatus::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FeedbackStatus::Info, message)
    }
}

/// Discrete injury-risk classification, ordered Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which model produced a risk assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    /// Pose features blended with recent training load
    TrainingHistory,
    /// Pose features only, used when history is too short
    PoseOnly,
}

/// Aggregates of recent training load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoad {
    pub entries: usize,
    /// Mean intensity on the raw 1-10 scale
    pub avg_intensity: f64,
    /// Peak intensity on the raw 1-10 scale
    pub max_intensity: u8,
    pub has_symptoms: bool,
}

impl TrainingLoad {
    pub fn normalized_avg_intensity(&self) -> f64 {
        self.avg_intensity / 10.0
    }

    pub fn normalized_max_intensity(&self) -> f64 {
        f64::from(self.max_intensity) / 10.0
    }
}

/// Injury risk estimate for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// Accumulated points on the training-history path, 0 otherwise
    pub score: u32,
    pub path: ScoringPath,
    pub features: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_load: Option<TrainingLoad>,
}

/// One training log record supplied by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingEntry {
    /// Perceived intensity, 1-10
    pub intensity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
}

impl TrainingEntry {
    pub fn new(intensity: u8, symptoms: Option<&str>) -> Self {
        Self {
            intensity,
            symptoms: symptoms.map(str::to_string),
        }
    }

    pub fn reports_symptoms(&self) -> bool {
        self.symptoms
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Recent training history, most recent first, capped at
/// [`MAX_HISTORY_ENTRIES`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TrainingEntry>", into = "Vec<TrainingEntry>")]
pub struct TrainingHistoryDigest {
    entries: Vec<TrainingEntry>,
}

impl TrainingHistoryDigest {
    pub fn new(mut entries: Vec<TrainingEntry>) -> Self {
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { entries }
    }

    pub fn entries(&self) -> &[TrainingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<TrainingEntry>> for TrainingHistoryDigest {
    fn from(entries: Vec<TrainingEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<TrainingHistoryDigest> for Vec<TrainingEntry> {
    fn from(digest: TrainingHistoryDigest) -> Self {
        digest.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_parsing_is_case_insensitive() {
        assert_eq!(Sport::from_name("badminton"), Sport::Badminton);
        assert_eq!(Sport::from_name("Badminton"), Sport::Badminton);
        assert_eq!(Sport::from_name(" RUNNING "), Sport::Running);
        assert_eq!(Sport::from_name("general"), Sport::Default);
        assert_eq!(Sport::from_name("curling"), Sport::Default);
    }

    #[test]
    fn test_session_deserializes_upstream_bundle() {
        let json = r#"{
            "pose_data": {
                "2": [{"x": 0.1, "y": 0.2, "z": 0.0, "visibility": 0.9}],
                "0": [{"x": 0.3, "y": 0.4}]
            },
            "frame_count": 3,
            "analysis_timestamp": "2024-03-01T10:15:30.123456"
        }"#;
        let session = Session::from_json(json).unwrap();
        assert_eq!(session.frame_count, 3);
        assert!(session.captured_at.is_some());
        let indices: Vec<u32> = session.frames().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(session.frames[&0][0].visibility, 0.0);
        assert_eq!(session.valid_frame_count(), 0);
    }

    #[test]
    fn test_frame_count_follows_last_index() {
        let frames: BTreeMap<u32, Vec<Landmark>> = [
            (4, vec![Landmark::at(0.1, 0.1)]),
            (1, vec![Landmark::at(0.2, 0.2); FULL_BODY_LANDMARKS]),
        ]
        .into_iter()
        .collect();
        let session = Session::new(frames, None);
        assert_eq!(session.frame_count, 5);
        assert_eq!(session.valid_frame_count(), 1);
        assert!(Frame::new(1, vec![Landmark::at(0.0, 0.0); 33]).is_full_body());
    }

    #[test]
    fn test_session_with_upstream_error_has_no_data() {
        let json = r#"{"pose_data": {}, "frame_count": 0, "error": "Could not open video file"}"#;
        let session = Session::from_json(json).unwrap();
        assert!(session.has_no_data());
    }

    #[test]
    fn test_feedback_status_serializes_lowercase() {
        let item = FeedbackItem::warning("Keep your hips level");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "warning");
    }

    #[test]
    fn test_risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
    }

    #[test]
    fn test_history_digest_caps_entries() {
        let entries = (0..15).map(|i| TrainingEntry::new(i % 10 + 1, None)).collect();
        let digest = TrainingHistoryDigest::new(entries);
        assert_eq!(digest.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(digest.entries()[0].intensity, 1);
    }

    #[test]
    fn test_symptoms_require_non_blank_text() {
        assert!(!TrainingEntry::new(5, None).reports_symptoms());
        assert!(!TrainingEntry::new(5, Some("   ")).reports_symptoms());
        assert!(TrainingEntry::new(5, Some("sore knee")).reports_symptoms());
    }
}
