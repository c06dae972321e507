//! Sports form analysis library
//!
//! This crate provides the core functionality for:
//! - Joint-angle geometry over pose-estimation landmarks
//! - Per-frame rule-based form feedback for each supported sport
//! - Session aggregation into narrative feedback and recommendations
//! - Injury risk scoring from pose features and training history
//! - Live stream coordination and observability

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod features;
pub mod geometry;
pub mod live;
pub mod models;
pub mod observability;
pub mod pose;
pub mod report;
pub mod risk;
pub mod rules;

pub use aggregator::{SessionAggregator, SessionReport};
pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, DegradedReason, Outcome};
pub use features::FeatureExtractor;
pub use live::{LiveFrameReport, LiveStream, StreamRegistry};
pub use models::*;
pub use observability::{AnalyzerMetrics, StructuredLogger};
pub use report::{AnalysisReport, InjuryRiskSummary};
pub use risk::RiskScorer;
pub use rules::{FrameFeedback, RuleEngine};
