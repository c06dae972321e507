//! Frame-level rule engine
//!
//! Evaluates one frame against the rule list of a sport. Rules run in a
//! fixed order and are cumulative: every rule that fires contributes a
//! feedback item, except that a rule may halt evaluation after emitting.
//! Items are produced lazily through [`FrameFeedback`].

mod badminton;
mod general;

pub use badminton::BadmintonThresholds;

use crate::error::{AnalysisError, DegradedReason};
use crate::models::{FeedbackItem, Landmark, Sport};
use crate::pose::{Skeleton, FULL_BODY_LANDMARKS};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use tracing::warn;

/// Emitted for a frame without any landmarks
pub const NO_POSE_MESSAGE: &str = "No pose detected";

/// Emitted for a frame that cannot be evaluated
pub const ANALYSIS_ERROR_MESSAGE: &str = "Error analyzing pose";

/// Emitted when no rule produced feedback
pub const FALLBACK_MESSAGE: &str = "Stand in proper position for posture analysis.";

/// Maximum hip height gap for football stance
pub const HIP_LEVEL_MAX: f64 = 0.1;

/// Maximum shoulder height gap for the general posture check
pub const SHOULDER_ALIGNMENT_MAX: f64 = 0.1;

/// Result of evaluating a single rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleVerdict {
    /// Rule did not fire
    Pass,
    /// Rule fired; continue with the next rule
    Emit(FeedbackItem),
    /// Rule fired; stop evaluating the frame
    Halt(FeedbackItem),
}

type Rule = fn(&Skeleton<'_>, &RuleThresholds) -> Result<RuleVerdict, AnalysisError>;

const BADMINTON_RULES: &[Rule] = &[
    badminton::sitting,
    badminton::shoulder_level,
    badminton::elbow_wrist_reach,
    badminton::knee_bend,
];
const RUNNING_RULES: &[Rule] = &[general::knee_lift];
const FOOTBALL_RULES: &[Rule] = &[general::hip_level];
const GENERAL_RULES: &[Rule] = &[general::shoulder_alignment];

fn rules_for(sport: Sport) -> &'static [Rule] {
    match sport {
        Sport::Badminton => BADMINTON_RULES,
        Sport::Running => RUNNING_RULES,
        Sport::Football => FOOTBALL_RULES,
        Sport::Basketball | Sport::Tennis | Sport::Default => GENERAL_RULES,
    }
}

/// Thresholds used by the frame rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleThresholds {
    #[serde(default)]
    pub badminton: BadmintonThresholds,
    #[serde(default = "default_hip_level_max")]
    pub hip_level_max: f64,
    #[serde(default = "default_shoulder_alignment_max")]
    pub shoulder_alignment_max: f64,
}

fn default_hip_level_max() -> f64 {
    HIP_LEVEL_MAX
}

fn default_shoulder_alignment_max() -> f64 {
    SHOULDER_ALIGNMENT_MAX
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            badminton: BadmintonThresholds::default(),
            hip_level_max: HIP_LEVEL_MAX,
            shoulder_alignment_max: SHOULDER_ALIGNMENT_MAX,
        }
    }
}

/// Evaluates sport-specific rules against single frames
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    thresholds: RuleThresholds,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Feedback for one frame; the sequence is never empty
    pub fn evaluate<'a>(&'a self, landmarks: &'a [Landmark], sport: Sport) -> FrameFeedback<'a> {
        FrameFeedback::new(Skeleton::new(landmarks), &self.thresholds, rules_for(sport))
    }
}

/// Lazily evaluated feedback for one frame
pub struct FrameFeedback<'a> {
    skeleton: Skeleton<'a>,
    thresholds: &'a RuleThresholds,
    rules: &'static [Rule],
    next_rule: usize,
    emitted: usize,
    pending: Option<FeedbackItem>,
    finished: bool,
    reason: Option<DegradedReason>,
}

impl<'a> FrameFeedback<'a> {
    fn new(skeleton: Skeleton<'a>, thresholds: &'a RuleThresholds, rules: &'static [Rule]) -> Self {
        let mut feedback = Self {
            skeleton,
            thresholds,
            rules,
            next_rule: 0,
            emitted: 0,
            pending: None,
            finished: false,
            reason: None,
        };

        if skeleton.is_empty() {
            feedback.abort(FeedbackItem::error(NO_POSE_MESSAGE), DegradedReason::NoPoseData);
        } else if !skeleton.is_full_body() {
            feedback.abort(
                FeedbackItem::error(ANALYSIS_ERROR_MESSAGE),
                DegradedReason::PartialFrame {
                    available: skeleton.len(),
                    required: FULL_BODY_LANDMARKS,
                },
            );
        }
        feedback
    }

    fn abort(&mut self, item: FeedbackItem, reason: DegradedReason) {
        self.pending = Some(item);
        self.reason = Some(reason);
        self.rules = &[];
    }

    /// Why the frame could not be evaluated normally, if it could not
    pub fn reason(&self) -> Option<&DegradedReason> {
        self.reason.as_ref()
    }

    fn finish_with(&mut self, item: FeedbackItem) -> Option<FeedbackItem> {
        self.emitted += 1;
        self.finished = true;
        Some(item)
    }
}

impl Iterator for FrameFeedback<'_> {
    type Item = FeedbackItem;

    fn next(&mut self) -> Option<FeedbackItem> {
        if let Some(item) = self.pending.take() {
            return self.finish_with(item);
        }
        if self.finished {
            return None;
        }

        while let Some(rule) = self.rules.get(self.next_rule) {
            self.next_rule += 1;
            match rule(&self.skeleton, self.thresholds) {
                Ok(RuleVerdict::Pass) => continue,
                Ok(RuleVerdict::Emit(item)) => {
                    self.emitted += 1;
                    return Some(item);
                }
                Ok(RuleVerdict::Halt(item)) => return self.finish_with(item),
                Err(e) => {
                    warn!(error = %e, "Frame rule failed");
                    self.reason = Some(e.into());
                    return self.finish_with(FeedbackItem::error(ANALYSIS_ERROR_MESSAGE));
                }
            }
        }

        self.finished = true;
        if self.emitted == 0 {
            self.emitted += 1;
            return Some(FeedbackItem::info(FALLBACK_MESSAGE));
        }
        None
    }
}

impl FusedIterator for FrameFeedback<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedbackStatus;
    use crate::pose::fixtures::{standing, with};
    use crate::pose::PoseLandmark;

    fn run(landmarks: &[Landmark], sport: Sport) -> Vec<FeedbackItem> {
        RuleEngine::new().evaluate(landmarks, sport).collect()
    }

    #[test]
    fn test_empty_frame_reports_no_pose() {
        let engine = RuleEngine::new();
        let mut feedback = engine.evaluate(&[], Sport::Badminton);
        assert_eq!(feedback.next(), Some(FeedbackItem::error(NO_POSE_MESSAGE)));
        assert_eq!(feedback.next(), None);
        assert_eq!(feedback.reason(), Some(&DegradedReason::NoPoseData));
    }

    #[test]
    fn test_partial_frame_reports_error() {
        let landmarks = vec![Landmark::at(0.5, 0.5); 25];
        let engine = RuleEngine::new();
        let feedback = engine.evaluate(&landmarks, Sport::Running);
        assert_eq!(
            feedback.reason(),
            Some(&DegradedReason::PartialFrame {
                available: 25,
                required: 33
            })
        );
        let items: Vec<_> = feedback.collect();
        assert_eq!(items, vec![FeedbackItem::error(ANALYSIS_ERROR_MESSAGE)]);
    }

    #[test]
    fn test_non_finite_landmark_read_by_a_rule_reports_error() {
        let mut landmarks = standing();
        landmarks[PoseLandmark::LeftShoulder.index()].y = f64::NAN;
        let engine = RuleEngine::new();
        let mut feedback = engine.evaluate(&landmarks, Sport::Default);
        assert_eq!(feedback.next(), Some(FeedbackItem::error(ANALYSIS_ERROR_MESSAGE)));
        assert_eq!(feedback.next(), None);
        assert!(matches!(
            feedback.reason(),
            Some(DegradedReason::ComputationFailed(_))
        ));
    }

    #[test]
    fn test_non_finite_landmark_no_rule_reads_is_ignored() {
        let mut landmarks = standing();
        landmarks[PoseLandmark::Nose.index()].z = f64::NAN;
        landmarks.push(Landmark::at(f64::NAN, 0.5));
        let engine = RuleEngine::new();
        let mut feedback = engine.evaluate(&landmarks, Sport::Default);
        assert_eq!(feedback.next(), Some(FeedbackItem::info("Good shoulder alignment")));
        assert_eq!(feedback.next(), None);
        assert_eq!(feedback.reason(), None);
    }

    #[test]
    fn test_running_knee_lift() {
        // Image y grows downwards, so knees of a standing subject sit below the shoulders.
        let items = run(&standing(), Sport::Running);
        assert_eq!(items, vec![FeedbackItem::warning("Lift your knees higher")]);

        let mut lifted = with(standing(), PoseLandmark::LeftKnee, 0.58, 0.2);
        lifted = with(lifted, PoseLandmark::RightKnee, 0.42, 0.2);
        let items = run(&lifted, Sport::Running);
        assert_eq!(items, vec![FeedbackItem::info(FALLBACK_MESSAGE)]);
    }

    #[test]
    fn test_football_hip_level() {
        let tilted = with(standing(), PoseLandmark::LeftHip, 0.58, 0.7);
        assert_eq!(
            run(&tilted, Sport::Football),
            vec![FeedbackItem::warning("Keep your hips level")]
        );
        assert_eq!(
            run(&standing(), Sport::Football),
            vec![FeedbackItem::info(FALLBACK_MESSAGE)]
        );
    }

    #[test]
    fn test_general_path_is_single_informational_item() {
        for sport in [Sport::Default, Sport::Tennis, Sport::Basketball] {
            let items = run(&standing(), sport);
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].status, FeedbackStatus::Info);
        }

        let slumped = with(standing(), PoseLandmark::RightShoulder, 0.4, 0.4);
        let items = run(&slumped, Sport::from_name("general"));
        assert_eq!(items, vec![FeedbackItem::info("Keep your shoulders level")]);
    }

    #[test]
    fn test_sequence_is_never_empty() {
        for sport in Sport::ALL {
            assert!(!run(&standing(), sport).is_empty());
            assert!(!run(&[], sport).is_empty());
        }
    }

    #[test]
    fn test_iterator_is_fused() {
        let landmarks = standing();
        let engine = RuleEngine::new();
        let mut feedback = engine.evaluate(&landmarks, Sport::Football);
        assert!(feedback.next().is_some());
        assert!(feedback.next().is_none());
        assert!(feedback.next().is_none());
    }
}
