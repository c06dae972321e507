//! Live stream coordination
//!
//! Each camera feed gets its own [`LiveStream`], which remembers the last
//! non-empty frame so consecutive frames can be compared. A
//! [`StreamRegistry`] lets one process serve several feeds without the
//! streams ever sharing state.

use crate::error::DegradedReason;
use crate::models::{FeedbackItem, Landmark, Sport};
use crate::rules::RuleEngine;
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

/// Displacement below this is logged as minimal movement
pub const MINIMAL_MOVEMENT_THRESHOLD: f64 = 0.0001;

/// Sum of squared planar deltas over the landmark indices both frames share
pub fn displacement(previous: &[Landmark], current: &[Landmark]) -> f64 {
    previous
        .iter()
        .zip(current)
        .map(|(before, after)| (after.x - before.x).powi(2) + (after.y - before.y).powi(2))
        .sum()
}

/// Result of pushing one frame through a live stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFrameReport {
    /// Zero-based position of the frame within the stream
    pub sequence: u64,
    pub feedback: Vec<FeedbackItem>,
    /// Movement since the previous non-empty frame; observational only
    pub displacement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<DegradedReason>,
}

impl LiveFrameReport {
    pub fn is_minimal_movement(&self) -> bool {
        self.displacement
            .map(|d| d < MINIMAL_MOVEMENT_THRESHOLD)
            .unwrap_or(false)
    }
}

/// Per-feed state for real-time analysis
#[derive(Debug, Clone)]
pub struct LiveStream {
    sport: Sport,
    engine: RuleEngine,
    previous_landmarks: Option<Vec<Landmark>>,
    frames_processed: u64,
}

impl LiveStream {
    pub fn new(sport: Sport) -> Self {
        Self::with_engine(sport, RuleEngine::new())
    }

    pub fn with_engine(sport: Sport, engine: RuleEngine) -> Self {
        Self {
            sport,
            engine,
            previous_landmarks: None,
            frames_processed: 0,
        }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn previous_landmarks(&self) -> Option<&[Landmark]> {
        self.previous_landmarks.as_deref()
    }

    /// Evaluate one frame and remember it for the next comparison
    ///
    /// Frames without landmarks are answered but leave the cache untouched.
    pub fn process(&mut self, landmarks: Vec<Landmark>) -> LiveFrameReport {
        let mut sequence = self.engine.evaluate(&landmarks, self.sport);
        let feedback: Vec<FeedbackItem> = sequence.by_ref().collect();
        let degraded = sequence.reason().cloned();

        let displacement = if landmarks.is_empty() {
            None
        } else {
            self.previous_landmarks
                .as_deref()
                .map(|previous| displacement(previous, &landmarks))
        };

        if let Some(movement) = displacement {
            debug!(sport = %self.sport, displacement = movement, "Movement detected");
            if movement < MINIMAL_MOVEMENT_THRESHOLD {
                debug!(sport = %self.sport, "Minimal movement detected");
            }
        }

        if !landmarks.is_empty() {
            self.previous_landmarks = Some(landmarks);
        }

        let report = LiveFrameReport {
            sequence: self.frames_processed,
            feedback,
            displacement,
            degraded,
        };
        self.frames_processed += 1;
        report
    }

    /// Forget the cached frame and start counting afresh
    pub fn reset(&mut self) {
        self.previous_landmarks = None;
        self.frames_processed = 0;
    }
}

/// Concurrent map of stream id to live stream
pub struct StreamRegistry {
    streams: DashMap<String, LiveStream>,
    engine: RuleEngine,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::with_engine(RuleEngine::new())
    }

    pub fn with_engine(engine: RuleEngine) -> Self {
        Self {
            streams: DashMap::new(),
            engine,
        }
    }

    /// Start a fresh stream, replacing any stream with the same id
    pub fn open(&self, stream_id: impl Into<String>, sport: Sport) -> bool {
        let stream_id = stream_id.into();
        debug!(stream_id = %stream_id, sport = %sport, "Opening live stream");
        self.streams
            .insert(stream_id, LiveStream::with_engine(sport, self.engine.clone()))
            .is_some()
    }

    /// Process a frame on an open stream
    pub fn process(&self, stream_id: &str, landmarks: Vec<Landmark>) -> Option<LiveFrameReport> {
        self.streams
            .get_mut(stream_id)
            .map(|mut stream| stream.process(landmarks))
    }

    /// Process a frame, opening the stream on first use
    pub fn process_or_open(
        &self,
        stream_id: &str,
        sport: Sport,
        landmarks: Vec<Landmark>,
    ) -> LiveFrameReport {
        self.streams
            .entry(stream_id.to_string())
            .or_insert_with(|| LiveStream::with_engine(sport, self.engine.clone()))
            .process(landmarks)
    }

    pub fn reset(&self, stream_id: &str) -> bool {
        match self.streams.get_mut(stream_id) {
            Some(mut stream) => {
                stream.reset();
                true
            }
            None => false,
        }
    }

    pub fn close(&self, stream_id: &str) -> Option<LiveStream> {
        debug!(stream_id = %stream_id, "Closing live stream");
        self.streams.remove(stream_id).map(|(_, stream)| stream)
    }

    pub fn stream_ids(&self) -> Vec<String> {
        self.streams.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::fixtures::{standing, with};
    use crate::pose::PoseLandmark;
    use crate::rules::NO_POSE_MESSAGE;

    fn shifted(dx: f64) -> Vec<Landmark> {
        standing()
            .into_iter()
            .map(|l| Landmark::new(l.x + dx, l.y, l.z, l.visibility))
            .collect()
    }

    #[test]
    fn test_displacement_over_shared_indices() {
        let previous = vec![Landmark::at(0.0, 0.0), Landmark::at(0.5, 0.5)];
        let current = vec![
            Landmark::at(0.1, 0.2),
            Landmark::at(0.5, 0.5),
            Landmark::at(0.9, 0.9),
        ];
        assert!((displacement(&previous, &current) - 0.05).abs() < 1e-12);
        assert_eq!(displacement(&[], &current), 0.0);
    }

    #[test]
    fn test_first_frame_has_no_displacement() {
        let mut stream = LiveStream::new(Sport::Badminton);
        let first = stream.process(standing());
        assert_eq!(first.sequence, 0);
        assert_eq!(first.displacement, None);
        assert_eq!(first.feedback.len(), 3);

        let second = stream.process(shifted(0.01));
        let expected = 0.0001 * 33.0;
        assert!((second.displacement.unwrap() - expected).abs() < 1e-9);
        assert!(!second.is_minimal_movement());
    }

    #[test]
    fn test_still_subject_is_minimal_movement() {
        let mut stream = LiveStream::new(Sport::Default);
        stream.process(standing());
        let report = stream.process(standing());
        assert_eq!(report.displacement, Some(0.0));
        assert!(report.is_minimal_movement());
    }

    #[test]
    fn test_empty_frame_keeps_cache() {
        let mut stream = LiveStream::new(Sport::Running);
        stream.process(standing());
        let empty = stream.process(Vec::new());
        assert_eq!(empty.feedback, vec![FeedbackItem::error(NO_POSE_MESSAGE)]);
        assert_eq!(empty.degraded, Some(DegradedReason::NoPoseData));
        assert_eq!(empty.displacement, None);
        assert_eq!(stream.previous_landmarks().map(|l| l.len()), Some(33));

        let next = stream.process(standing());
        assert_eq!(next.displacement, Some(0.0));
        assert_eq!(stream.frames_processed(), 3);
    }

    #[test]
    fn test_partial_frame_is_cached_and_compared() {
        let mut stream = LiveStream::new(Sport::Football);
        stream.process(standing());
        let partial: Vec<Landmark> = standing().into_iter().take(12).collect();
        let report = stream.process(partial);
        assert_eq!(report.displacement, Some(0.0));
        assert!(matches!(
            report.degraded,
            Some(DegradedReason::PartialFrame { available: 12, .. })
        ));
    }

    #[test]
    fn test_reset_clears_cache() {
        let mut stream = LiveStream::new(Sport::Tennis);
        stream.process(standing());
        stream.reset();
        assert!(stream.previous_landmarks().is_none());
        let report = stream.process(standing());
        assert_eq!(report.displacement, None);
        assert_eq!(report.sequence, 0);
    }

    #[test]
    fn test_registry_keeps_streams_independent() {
        let registry = StreamRegistry::new();
        assert!(!registry.open("court-1", Sport::Badminton));
        assert!(!registry.open("track", Sport::Running));

        registry.process("court-1", standing()).unwrap();
        let track = registry.process("track", shifted(0.2)).unwrap();
        assert_eq!(track.displacement, None);

        let moved = with(standing(), PoseLandmark::Nose, 0.5, 0.2);
        let court = registry.process("court-1", moved).unwrap();
        assert!((court.displacement.unwrap() - 0.01).abs() < 1e-9);

        assert!(registry.process("unknown", standing()).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_lifecycle() {
        let registry = StreamRegistry::default();
        let first = registry.process_or_open("cam", Sport::Running, standing());
        assert_eq!(first.displacement, None);
        let second = registry.process_or_open("cam", Sport::Running, standing());
        assert_eq!(second.displacement, Some(0.0));

        assert!(registry.reset("cam"));
        assert!(!registry.reset("missing"));
        let closed = registry.close("cam").unwrap();
        assert_eq!(closed.frames_processed(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        let registry = StreamRegistry::new();
        std::thread::scope(|scope| {
            for camera in 0..4 {
                let registry = &registry;
                scope.spawn(move || {
                    let id = format!("cam-{}", camera);
                    for _ in 0..5 {
                        registry.process_or_open(&id, Sport::Default, standing());
                    }
                });
            }
        });
        let mut ids = registry.stream_ids();
        ids.sort();
        assert_eq!(ids, vec!["cam-0", "cam-1", "cam-2", "cam-3"]);
        for id in ids {
            let stream = registry.close(&id).unwrap();
            assert_eq!(stream.frames_processed(), 5);
        }
    }
}
