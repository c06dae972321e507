//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use formcheck_lib::{DegradedReason, FeedbackItem, FeedbackStatus, Outcome, RiskTier};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for feedback item tables
#[derive(Tabled)]
pub struct FeedbackRow {
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Message")]
    pub message: String,
}

impl From<&FeedbackItem> for FeedbackRow {
    fn from(item: &FeedbackItem) -> Self {
        Self {
            status: color_status(item.status),
            message: item.message.clone(),
        }
    }
}

/// JSON shape of an outcome: the value's fields plus the fallback reason, if any
#[derive(Serialize)]
pub struct OutcomeView<'a, T: Serialize> {
    #[serde(flatten)]
    pub value: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<&'a DegradedReason>,
}

impl<'a, T: Serialize> From<&'a Outcome<T>> for OutcomeView<'a, T> {
    fn from(outcome: &'a Outcome<T>) -> Self {
        Self {
            value: outcome.value(),
            degraded: outcome.reason(),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a section heading with an underline
pub fn print_heading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(width));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Warn that a stage fell back to its default output
pub fn print_degraded(stage: &str, reason: &DegradedReason) {
    print_warning(&format!("{} used default output: {}", stage, reason));
}

/// Color a feedback status
pub fn color_status(status: FeedbackStatus) -> String {
    let label = status.as_str();
    match status {
        FeedbackStatus::Good => label.green().to_string(),
        FeedbackStatus::Warning => label.yellow().to_string(),
        FeedbackStatus::Error => label.red().to_string(),
        FeedbackStatus::Info => label.blue().to_string(),
    }
}

/// Color a risk tier
pub fn color_tier(tier: RiskTier) -> String {
    let label = tier.as_str();
    match tier {
        RiskTier::Low => label.green().bold().to_string(),
        RiskTier::Medium => label.yellow().bold().to_string(),
        RiskTier::High => label.red().bold().to_string(),
    }
}

/// Format a fraction in [0, 1] as a percentage
pub fn format_fraction(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Format a movement measurement, or a dash when there is none
pub fn format_displacement(displacement: Option<f64>) -> String {
    match displacement {
        Some(value) => format!("{:.6}", value),
        None => "-".to_string(),
    }
}

/// Color a pose feature by how close it is to the risk cut-offs
pub fn color_feature(value: f64, medium: f64, high: f64) -> String {
    let formatted = format!("{:.3}", value);
    if value > high {
        formatted.red().to_string()
    } else if value > medium {
        formatted.yellow().to_string()
    } else {
        formatted.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_fraction(0.0), "0%");
        assert_eq!(format_fraction(0.8), "80%");
        assert_eq!(format_fraction(1.0), "100%");
    }

    #[test]
    fn test_format_displacement() {
        assert_eq!(format_displacement(None), "-");
        assert_eq!(format_displacement(Some(0.0033)), "0.003300");
    }

    #[test]
    fn test_status_keeps_label() {
        colored::control::set_override(false);
        assert_eq!(color_status(FeedbackStatus::Warning), "warning");
        assert_eq!(color_tier(RiskTier::High), "High");
    }
}
