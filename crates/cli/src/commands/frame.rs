//! Single-frame and live-stream commands

use anyhow::Result;
use colored::Colorize;
use formcheck_lib::{Analyzer, FeedbackItem, Frame, Landmark, LiveFrameReport, Sport};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{
    format_displacement, print_degraded, print_heading, print_info, print_json, print_table,
    FeedbackRow, OutputFormat,
};

/// Feedback for one frame
#[derive(Serialize)]
struct FrameOutput {
    sport: Sport,
    feedback: Vec<FeedbackItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    degraded: Option<formcheck_lib::DegradedReason>,
}

/// Evaluate the frame rules on one landmark set
pub fn frame(
    analyzer: &Analyzer,
    landmarks: &[Landmark],
    sport: Sport,
    format: OutputFormat,
) -> Result<()> {
    let mut items = analyzer.frame_feedback(landmarks, sport);
    let feedback: Vec<FeedbackItem> = items.by_ref().collect();
    let degraded = items.reason().cloned();

    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            sport,
            feedback,
            degraded,
        })?,
        OutputFormat::Table => {
            print_heading("Frame Feedback", 60);
            println!("Sport:      {}", sport.to_string().cyan());
            println!("Landmarks:  {}", landmarks.len());
            println!();
            let rows: Vec<FeedbackRow> = feedback.iter().map(FeedbackRow::from).collect();
            print_table(&rows);
            if let Some(reason) = &degraded {
                print_degraded("frame", reason);
            }
        }
    }

    Ok(())
}

/// Row for live stream tables
#[derive(Tabled)]
struct LiveRow {
    #[tabled(rename = "Seq")]
    sequence: u64,
    #[tabled(rename = "Displacement")]
    displacement: String,
    #[tabled(rename = "Feedback")]
    feedback: String,
}

impl From<&LiveFrameReport> for LiveRow {
    fn from(report: &LiveFrameReport) -> Self {
        let feedback = report
            .feedback
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let displacement = if report.is_minimal_movement() {
            format!("{} (still)", format_displacement(report.displacement))
        } else {
            format_displacement(report.displacement)
        };
        Self {
            sequence: report.sequence,
            displacement,
            feedback,
        }
    }
}

/// Replay recorded frames through a live stream
///
/// Every frame updates the stream; only every `every`-th report is shown.
pub fn live(
    analyzer: &Analyzer,
    stream_id: &str,
    frames: Vec<Frame>,
    sport: Sport,
    every: usize,
    format: OutputFormat,
) -> Result<()> {
    let every = every.max(1);
    let mut stream = analyzer.live_stream(sport);
    let metrics = analyzer.metrics();
    let logger = analyzer.logger();
    metrics.set_active_streams(1);

    let mut shown = Vec::new();
    for frame in frames {
        let position = frame.index as usize;
        let report = stream.process(frame.landmarks);
        metrics.inc_live_frames();
        logger.log_live_frame(
            stream_id,
            report.sequence,
            report.feedback.len(),
            report.displacement,
        );
        if let Some(reason) = &report.degraded {
            metrics.inc_degraded("live", reason);
        }
        if position % every == 0 {
            shown.push(report);
        }
    }
    metrics.set_active_streams(0);

    match format {
        OutputFormat::Json => print_json(&shown)?,
        OutputFormat::Table => {
            print_heading("Live Stream", 80);
            println!("Stream:     {}", stream_id.cyan());
            println!("Sport:      {}", sport.to_string().cyan());
            println!("Frames:     {}", stream.frames_processed());
            println!();
            let rows: Vec<LiveRow> = shown.iter().map(LiveRow::from).collect();
            print_table(&rows);
            if every > 1 {
                print_info(&format!("Showing every {} frames", every));
            }
        }
    }

    Ok(())
}
