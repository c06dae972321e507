//! Recorded-session commands

use anyhow::Result;
use colored::Colorize;
use formcheck_lib::aggregator::FrameFlag;
use formcheck_lib::risk::RiskThresholds;
use formcheck_lib::{
    Analyzer, FeatureVector, Outcome, ScoringPath, Session, Sport, TrainingHistoryDigest,
};
use tabled::Tabled;

use crate::output::{
    color_feature, color_tier, format_fraction, print_degraded, print_heading, print_info,
    print_json, print_success, print_table, print_warning, OutcomeView, OutputFormat,
};

/// Row for badminton frame flags
#[derive(Tabled)]
struct FlagRow {
    #[tabled(rename = "Frame")]
    frame: u32,
    #[tabled(rename = "Advice")]
    advice: String,
}

impl From<&FrameFlag> for FlagRow {
    fn from(flag: &FrameFlag) -> Self {
        Self {
            frame: flag.frame,
            advice: flag.anomaly.advice().to_string(),
        }
    }
}

/// Row for pose feature tables
#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn feature_rows(features: &FeatureVector, thresholds: &RiskThresholds) -> Vec<FeatureRow> {
    vec![
        FeatureRow {
            name: "Knee angle variability",
            value: color_feature(
                features.knee_angle_variability,
                thresholds.pose_only_medium,
                thresholds.knee_variability,
            ),
        },
        FeatureRow {
            name: "Shoulder imbalance",
            value: color_feature(
                features.shoulder_imbalance,
                thresholds.pose_only_medium,
                thresholds.shoulder_imbalance,
            ),
        },
    ]
}

/// Analyze a recorded session end to end
pub fn analyze(
    analyzer: &Analyzer,
    session: &Session,
    sport: Sport,
    history: Option<&TrainingHistoryDigest>,
    format: OutputFormat,
) -> Result<()> {
    let report = analyzer.analyze_session(session, sport, history);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Form Analysis", 60);
            println!("Sport:          {}", report.sport.to_string().cyan());
            println!(
                "Frames:         {} ({} full-body)",
                report.frame_count, report.valid_frames
            );
            if let Some(quality) = report.session.posture_quality() {
                println!("Posture:        {} aligned", format_fraction(quality));
            }
            if let Some(oscillation) = report.session.vertical_oscillation {
                println!("Oscillation:    {:.4}", oscillation);
            }
            println!();

            println!("{}", "Feedback".bold());
            println!("{}", "-".repeat(60));
            println!("{}", report.summary());
            println!();

            if !report.session.frame_flags.is_empty() {
                let rows: Vec<FlagRow> = report.session.frame_flags.iter().map(FlagRow::from).collect();
                print_table(&rows);
                println!();
            }

            println!("{}", "Recommendations".bold());
            println!("{}", "-".repeat(60));
            for recommendation in &report.recommendations {
                println!("  • {}", recommendation);
            }
            println!();

            let risk = &report.injury_risk;
            println!(
                "{} {} ({}%)",
                "Injury Risk:".bold(),
                color_tier(risk.tier),
                risk.percentage
            );
            println!("{}", risk.message);
            println!("{}", risk.advice.dimmed());

            for stage in &report.degraded {
                print_degraded(stage.stage, &stage.reason);
            }
            println!();
            println!(
                "Analyzed at: {}",
                report
                    .analyzed_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
                    .dimmed()
            );
        }
    }

    Ok(())
}

/// Score injury risk for a session
pub fn risk(
    analyzer: &Analyzer,
    session: &Session,
    sport: Sport,
    history: Option<&TrainingHistoryDigest>,
    format: OutputFormat,
) -> Result<()> {
    let outcome = analyzer.assess_risk(session, sport, history);
    let assessment = outcome.value();

    match format {
        OutputFormat::Json => print_json(&OutcomeView::from(&outcome))?,
        OutputFormat::Table => {
            print_heading("Injury Risk", 50);
            println!("Tier:           {}", color_tier(assessment.tier));
            match assessment.path {
                ScoringPath::TrainingHistory => {
                    println!("Model:          training history");
                    println!("Score:          {}", assessment.score);
                }
                ScoringPath::PoseOnly => {
                    println!("Model:          pose only");
                    if history.is_some() {
                        print_info("Not enough training history, scored from pose alone");
                    }
                }
            }
            if let Some(load) = &assessment.training_load {
                println!(
                    "Training load:  {} sessions, avg {:.1}, max {}{}",
                    load.entries,
                    load.avg_intensity,
                    load.max_intensity,
                    if load.has_symptoms { ", symptoms reported" } else { "" }
                );
            }
            println!();
            print_table(&feature_rows(&assessment.features, &analyzer.config().risk));
            if let Some(reason) = outcome.reason() {
                print_degraded("risk", reason);
            }
        }
    }

    Ok(())
}

/// Extract pose features from a session
pub fn features(analyzer: &Analyzer, session: &Session, format: OutputFormat) -> Result<()> {
    let outcome: Outcome<FeatureVector> = analyzer.extract_features(session);

    match format {
        OutputFormat::Json => print_json(&OutcomeView::from(&outcome))?,
        OutputFormat::Table => {
            print_heading("Pose Features", 50);
            println!("Full-body frames: {}", session.valid_frame_count());
            println!();
            print_table(&feature_rows(outcome.value(), &analyzer.config().risk));
            match outcome.reason() {
                Some(reason) => {
                    print_warning("Neutral features substituted");
                    print_degraded("features", reason);
                }
                None => print_success("Features extracted"),
            }
        }
    }

    Ok(())
}
