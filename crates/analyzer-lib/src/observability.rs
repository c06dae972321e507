//! Observability infrastructure for the analyzer
//!
//! Provides:
//! - Prometheus metrics (analysis latency, sessions and frames analyzed,
//!   degraded outcomes, risk tiers, live streams)
//! - Structured logging with tracing

use crate::error::DegradedReason;
use crate::models::{RiskTier, Sport};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for analysis latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AnalyzerMetricsInner> = OnceLock::new();

struct AnalyzerMetricsInner {
    analysis_latency_seconds: Histogram,
    sessions_analyzed: IntCounterVec,
    frames_analyzed: IntCounter,
    degraded_outcomes: IntCounterVec,
    risk_tiers: IntCounterVec,
    live_frames: IntCounter,
    active_streams: IntGauge,
}

impl AnalyzerMetricsInner {
    fn new() -> Self {
        Self {
            analysis_latency_seconds: register_histogram!(
                "formcheck_analysis_latency_seconds",
                "Time spent analyzing a full session",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_latency_seconds"),

            sessions_analyzed: register_int_counter_vec!(
                "formcheck_sessions_analyzed_total",
                "Sessions analyzed, by sport",
                &["sport"]
            )
            .expect("Failed to register sessions_analyzed"),

            frames_analyzed: register_int_counter!(
                "formcheck_frames_analyzed_total",
                "Full-body frames consumed by session analysis"
            )
            .expect("Failed to register frames_analyzed"),

            degraded_outcomes: register_int_counter_vec!(
                "formcheck_degraded_outcomes_total",
                "Operations that fell back to a neutral output",
                &["stage", "reason"]
            )
            .expect("Failed to register degraded_outcomes"),

            risk_tiers: register_int_counter_vec!(
                "formcheck_risk_tier_total",
                "Risk assessments produced, by tier",
                &["tier"]
            )
            .expect("Failed to register risk_tiers"),

            live_frames: register_int_counter!(
                "formcheck_live_frames_total",
                "Frames processed by live streams"
            )
            .expect("Failed to register live_frames"),

            active_streams: register_int_gauge!(
                "formcheck_active_streams",
                "Live streams currently open"
            )
            .expect("Failed to register active_streams"),
        }
    }
}

/// Analyzer metrics for Prometheus exposition
///
/// A lightweight handle to the process-wide metrics. Clones share the same
/// underlying collectors.
#[derive(Clone)]
pub struct AnalyzerMetrics {
    inner: &'static AnalyzerMetricsInner,
}

impl Default for AnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerMetrics {
    pub fn new() -> Self {
        Self {
            inner: GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new),
        }
    }

    pub fn observe_analysis_latency(&self, duration_secs: f64) {
        self.inner.analysis_latency_seconds.observe(duration_secs);
    }

    pub fn inc_sessions_analyzed(&self, sport: Sport) {
        self.inner
            .sessions_analyzed
            .with_label_values(&[sport.name()])
            .inc();
    }

    pub fn add_frames_analyzed(&self, frames: usize) {
        self.inner.frames_analyzed.inc_by(frames as u64);
    }

    /// Count a fallback taken by one pipeline stage
    pub fn inc_degraded(&self, stage: &str, reason: &DegradedReason) {
        self.inner
            .degraded_outcomes
            .with_label_values(&[stage, reason.kind()])
            .inc();
    }

    pub fn inc_risk_tier(&self, tier: RiskTier) {
        self.inner
            .risk_tiers
            .with_label_values(&[tier.as_str()])
            .inc();
    }

    pub fn inc_live_frames(&self) {
        self.inner.live_frames.inc();
    }

    pub fn set_active_streams(&self, count: usize) {
        self.inner.active_streams.set(count as i64);
    }

    pub fn sessions_analyzed(&self, sport: Sport) -> u64 {
        self.inner
            .sessions_analyzed
            .with_label_values(&[sport.name()])
            .get()
    }

    pub fn degraded_count(&self, stage: &str, reason_kind: &str) -> u64 {
        self.inner
            .degraded_outcomes
            .with_label_values(&[stage, reason_kind])
            .get()
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for analyzer events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Log a completed session analysis
    pub fn log_session_analyzed(
        &self,
        sport: Sport,
        frames: usize,
        valid_frames: usize,
        risk_tier: RiskTier,
        risk_score: u32,
        duration_ms: f64,
    ) {
        info!(
            event = "session_analyzed",
            component = %self.component,
            sport = %sport,
            frames = frames,
            valid_frames = valid_frames,
            risk_tier = %risk_tier,
            risk_score = risk_score,
            duration_ms = duration_ms,
            "Session analysis complete"
        );
    }

    /// Log a stage that substituted its neutral output
    pub fn log_degraded(&self, stage: &str, reason: &DegradedReason) {
        warn!(
            event = "analysis_degraded",
            component = %self.component,
            stage = %stage,
            reason = reason.kind(),
            details = %reason,
            "Analysis fell back to default output"
        );
    }

    pub fn log_live_frame(
        &self,
        stream_id: &str,
        sequence: u64,
        feedback_items: usize,
        displacement: Option<f64>,
    ) {
        debug!(
            event = "live_frame",
            component = %self.component,
            stream_id = %stream_id,
            sequence = sequence,
            feedback_items = feedback_items,
            displacement = ?displacement,
            "Processed live frame"
        );
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "analyzer_started",
            component = %self.component,
            version = %version,
            "Form analyzer ready"
        );
    }
}
