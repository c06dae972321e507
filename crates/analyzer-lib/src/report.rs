//! Presentation bundle for a completed analysis

use crate::aggregator::SessionReport;
use crate::error::{DegradedReason, Outcome};
use crate::models::{
    FeatureVector, FeedbackItem, RiskAssessment, RiskTier, ScoringPath, Session, Sport,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

pub const LOW_RISK_PERCENTAGE: u8 = 15;
pub const MEDIUM_RISK_PERCENTAGE: u8 = 50;
pub const HIGH_RISK_PERCENTAGE: u8 = 85;

/// Display percentage for a tier
pub fn risk_percentage(tier: RiskTier) -> u8 {
    match tier {
        RiskTier::Low => LOW_RISK_PERCENTAGE,
        RiskTier::Medium => MEDIUM_RISK_PERCENTAGE,
        RiskTier::High => HIGH_RISK_PERCENTAGE,
    }
}

/// Short verdict shown next to the risk gauge
pub fn risk_message(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => "Your form looks good! Keep up the good work and maintain proper technique.",
        RiskTier::Medium => {
            "Some areas need attention. Focus on improving your form to reduce injury risk."
        }
        RiskTier::High => {
            "Significant risk detected. Please consult with a coach or trainer to improve your technique."
        }
    }
}

/// Training guidance for a tier
pub fn training_advice(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => {
            "Continue with your current training program. Maintain regular stretching and recovery protocols."
        }
        RiskTier::Medium => {
            "Consider modifying your training intensity. Focus on proper form and technique. Include more rest days."
        }
        RiskTier::High => {
            "Reduce training volume immediately. Consult with a sports medicine professional. Focus on recovery and corrective exercises."
        }
    }
}

/// Risk tier with its presentation text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryRiskSummary {
    /// Lowercase tier name
    pub level: String,
    pub tier: RiskTier,
    pub percentage: u8,
    pub message: String,
    pub advice: String,
    pub score: u32,
    pub path: ScoringPath,
}

impl From<&RiskAssessment> for InjuryRiskSummary {
    fn from(assessment: &RiskAssessment) -> Self {
        let tier = assessment.tier;
        Self {
            level: tier.as_str().to_lowercase(),
            tier,
            percentage: risk_percentage(tier),
            message: risk_message(tier).to_string(),
            advice: training_advice(tier).to_string(),
            score: assessment.score,
            path: assessment.path,
        }
    }
}

/// A pipeline stage that fell back to its default output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradedStage {
    pub stage: &'static str,
    pub reason: DegradedReason,
}

/// Everything the presentation layer needs for one analyzed session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub sport: Sport,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<NaiveDateTime>,
    pub frame_count: u32,
    pub valid_frames: usize,
    /// The narrative as a single `good` item
    pub feedback: Vec<FeedbackItem>,
    pub recommendations: Vec<String>,
    pub injury_risk: InjuryRiskSummary,
    pub features: FeatureVector,
    pub session: SessionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<DegradedStage>,
}

impl AnalysisReport {
    pub fn assemble(
        session: &Session,
        sport: Sport,
        aggregation: Outcome<SessionReport>,
        risk: Outcome<RiskAssessment>,
    ) -> Self {
        let mut degraded = Vec::new();

        let (session_report, aggregation_reason) = aggregation.into_parts();
        if let Some(reason) = aggregation_reason {
            degraded.push(DegradedStage {
                stage: "aggregation",
                reason,
            });
        }
        let (assessment, risk_reason) = risk.into_parts();
        if let Some(reason) = risk_reason {
            degraded.push(DegradedStage {
                stage: "risk",
                reason,
            });
        }

        Self {
            sport,
            analyzed_at: Utc::now(),
            captured_at: session.captured_at,
            frame_count: session.frame_count,
            valid_frames: session.valid_frame_count(),
            feedback: vec![FeedbackItem::good(session_report.feedback.clone())],
            recommendations: session_report.recommendations.clone(),
            injury_risk: InjuryRiskSummary::from(&assessment),
            features: assessment.features,
            session: session_report,
            degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    pub fn summary(&self) -> &str {
        &self.session.feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::templates;

    fn assessment(tier: RiskTier) -> RiskAssessment {
        RiskAssessment {
            tier,
            score: 0,
            path: ScoringPath::PoseOnly,
            features: FeatureVector::neutral(),
            training_load: None,
        }
    }

    #[test]
    fn test_percentage_mapping() {
        assert_eq!(risk_percentage(RiskTier::Low), 15);
        assert_eq!(risk_percentage(RiskTier::Medium), 50);
        assert_eq!(risk_percentage(RiskTier::High), 85);
    }

    #[test]
    fn test_summary_from_assessment() {
        let summary = InjuryRiskSummary::from(&assessment(RiskTier::High));
        assert_eq!(summary.level, "high");
        assert_eq!(summary.percentage, 85);
        assert!(summary.message.starts_with("Significant risk detected."));
        assert!(summary.advice.starts_with("Reduce training volume immediately."));
    }

    #[test]
    fn test_assemble_collects_degraded_stages() {
        let session = Session::default();
        let aggregation = Outcome::degraded(
            SessionReport::canned(
                templates::INSUFFICIENT_DATA_FEEDBACK,
                templates::INSUFFICIENT_DATA_RECOMMENDATION,
            ),
            DegradedReason::NoPoseData,
        );
        let risk = Outcome::degraded(assessment(RiskTier::Medium), DegradedReason::NoPoseData);
        let report = AnalysisReport::assemble(&session, Sport::Running, aggregation, risk);

        assert!(report.is_degraded());
        assert_eq!(report.degraded.len(), 2);
        assert_eq!(report.degraded[0].stage, "aggregation");
        assert_eq!(report.feedback, vec![FeedbackItem::good("Insufficient pose data for analysis")]);
        assert_eq!(report.injury_risk.percentage, 50);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["injury_risk"]["level"], "medium");
        assert_eq!(json["degraded"][1]["reason"]["kind"], "no_pose_data");
        assert_eq!(json["sport"], "Running");
    }
}
