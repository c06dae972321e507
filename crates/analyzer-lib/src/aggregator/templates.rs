//! Narrative text used by the session aggregator

use crate::models::Sport;

pub const INSUFFICIENT_DATA_FEEDBACK: &str = "Insufficient pose data for analysis";
pub const INSUFFICIENT_DATA_RECOMMENDATION: &str =
    "Please upload a clearer video with full body visibility";

pub const NO_VALID_FRAMES_FEEDBACK: &str = "No valid pose data detected";
pub const NO_VALID_FRAMES_RECOMMENDATION: &str =
    "Please upload a clearer video with better lighting";

pub const ANALYSIS_FAILED_FEEDBACK: &str = "Error analyzing movement";
pub const ANALYSIS_FAILED_RECOMMENDATION: &str = "Please try again with a clearer video";

pub const BADMINTON_CLOSING: &str = "Focus on maintaining proper form throughout your shots.";

pub const CORE_STRENGTH_RECOMMENDATION: &str =
    "Work on core strength exercises to improve posture and alignment.";

const STANDARD_RECOMMENDATIONS: [&str; 3] = [
    "Focus on maintaining proper form throughout your entire movement.",
    "Consider recording from multiple angles for more detailed analysis.",
    "Regular practice with attention to technique will help improve performance.",
];

/// Quality phrase used in the general template when no sport pass refines it
pub fn default_quality(sport: Sport) -> &'static str {
    match sport {
        Sport::Basketball => "reasonable technique",
        Sport::Tennis => "adequate form",
        Sport::Football => "good technique",
        Sport::Badminton => "good form",
        Sport::Running => "adequate technique",
        Sport::Default => "reasonable form",
    }
}

/// Per-sport overall assessment sentence
pub fn general_feedback(sport: Sport, quality: &str) -> String {
    match sport {
        Sport::Basketball => format!(
            "Your overall basketball movement patterns show {}. Focus on maintaining proper posture and balance.",
            quality
        ),
        Sport::Tennis => format!(
            "Your overall tennis movements show {}. Focus on footwork and preparation.",
            quality
        ),
        Sport::Football => format!(
            "Your overall football movements show {}. Remember to stay balanced and ready to change direction.",
            quality
        ),
        Sport::Badminton => format!(
            "Your overall badminton movements show {}. Work on quick footwork and recovery position.",
            quality
        ),
        Sport::Running => format!(
            "Your overall running mechanics show {}. Remember to land midfoot and maintain good posture.",
            quality
        ),
        Sport::Default => format!(
            "Your movement patterns show {}. Focus on maintaining proper form and alignment.",
            quality
        ),
    }
}

pub fn running_form_feedback(quality: &str) -> String {
    format!(
        "Your running form shows {}. Focus on arm swing and posture.",
        quality
    )
}

pub fn posture_feedback(description: &str) -> String {
    format!("Your overall posture shows {}.", description)
}

pub fn recommendations(needs_core_work: bool) -> Vec<String> {
    let mut recommendations: Vec<String> =
        STANDARD_RECOMMENDATIONS.iter().map(|r| r.to_string()).collect();
    if needs_core_work {
        recommendations.push(CORE_STRENGTH_RECOMMENDATION.to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_templates_embed_quality() {
        for sport in Sport::ALL {
            let text = general_feedback(sport, default_quality(sport));
            assert!(text.contains(default_quality(sport)), "{}", text);
        }
        assert_eq!(
            general_feedback(Sport::Tennis, "adequate form"),
            "Your overall tennis movements show adequate form. Focus on footwork and preparation."
        );
    }

    #[test]
    fn test_recommendations() {
        assert_eq!(recommendations(false).len(), 3);
        let with_core = recommendations(true);
        assert_eq!(with_core.len(), 4);
        assert_eq!(with_core[3], CORE_STRENGTH_RECOMMENDATION);
    }
}
