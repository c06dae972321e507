//! Pipeline facade
//!
//! [`Analyzer`] wires the feature extractor, rule engine, session
//! aggregator and risk scorer together under one configuration, recording
//! metrics and structured log events for every session it analyzes.

use crate::aggregator::{SessionAggregator, SessionReport};
use crate::config::AnalyzerConfig;
use crate::error::Outcome;
use crate::features::FeatureExtractor;
use crate::live::{LiveStream, StreamRegistry};
use crate::models::{FeatureVector, Landmark, RiskAssessment, Session, Sport, TrainingHistoryDigest};
use crate::observability::{AnalyzerMetrics, StructuredLogger};
use crate::report::AnalysisReport;
use crate::risk::RiskScorer;
use crate::rules::{FrameFeedback, RuleEngine};
use std::time::Instant;

/// Runs the analysis pipeline
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    extractor: FeatureExtractor,
    engine: RuleEngine,
    aggregator: SessionAggregator,
    scorer: RiskScorer,
    metrics: AnalyzerMetrics,
    logger: StructuredLogger,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            engine: RuleEngine::with_thresholds(config.rules.clone()),
            aggregator: SessionAggregator::with_thresholds(config.aggregator.clone()),
            scorer: RiskScorer::with_thresholds(config.risk.clone()),
            metrics: AnalyzerMetrics::new(),
            logger: StructuredLogger::new("analyzer"),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &AnalyzerMetrics {
        &self.metrics
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Feedback text, recommendations and risk tier for a recorded session
    pub fn analyze_session(
        &self,
        session: &Session,
        sport: Sport,
        history: Option<&TrainingHistoryDigest>,
    ) -> AnalysisReport {
        let start = Instant::now();

        let aggregation = self.aggregate(session, sport);
        let risk = self.assess_risk(session, sport, history);
        let report = AnalysisReport::assemble(session, sport, aggregation, risk);

        let elapsed = start.elapsed();
        self.metrics.observe_analysis_latency(elapsed.as_secs_f64());
        self.metrics.inc_sessions_analyzed(sport);
        self.metrics.add_frames_analyzed(report.valid_frames);
        self.logger.log_session_analyzed(
            sport,
            session.frames.len(),
            report.valid_frames,
            report.injury_risk.tier,
            report.injury_risk.score,
            elapsed.as_secs_f64() * 1000.0,
        );
        report
    }

    pub fn aggregate(&self, session: &Session, sport: Sport) -> Outcome<SessionReport> {
        let outcome = self.aggregator.aggregate(session, sport);
        self.note_degraded("aggregation", &outcome);
        outcome
    }

    pub fn assess_risk(
        &self,
        session: &Session,
        sport: Sport,
        history: Option<&TrainingHistoryDigest>,
    ) -> Outcome<RiskAssessment> {
        let outcome = self.scorer.assess(session, sport, history);
        self.metrics.inc_risk_tier(outcome.value().tier);
        self.note_degraded("risk", &outcome);
        outcome
    }

    pub fn extract_features(&self, session: &Session) -> Outcome<FeatureVector> {
        let outcome = self.extractor.extract(session);
        self.note_degraded("features", &outcome);
        outcome
    }

    /// Lazily evaluated feedback for a single frame
    pub fn frame_feedback<'a>(&'a self, landmarks: &'a [Landmark], sport: Sport) -> FrameFeedback<'a> {
        self.engine.evaluate(landmarks, sport)
    }

    /// A new live stream sharing this analyzer's rule thresholds
    pub fn live_stream(&self, sport: Sport) -> LiveStream {
        LiveStream::with_engine(sport, self.engine.clone())
    }

    pub fn stream_registry(&self) -> StreamRegistry {
        StreamRegistry::with_engine(self.engine.clone())
    }

    fn note_degraded<T>(&self, stage: &str, outcome: &Outcome<T>) {
        if let Some(reason) = outcome.reason() {
            self.metrics.inc_degraded(stage, reason);
            self.logger.log_degraded(stage, reason);
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
