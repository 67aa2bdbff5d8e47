//! Suspicious-activity detection.
//!
//! A frame is raw-suspicious when attention is low, when the participant
//! looks away while startled, or when the head moves excessively. The flag
//! is only surfaced once more than a third of the recent window agrees.

use crate::core::history::HistoryBuffer;
use crate::observation::types::{Emotion, FaceObservation};

/// Default attention level below which a frame counts as suspicious.
pub const DEFAULT_SUSPICIOUS_ATTENTION: f64 = 0.45;

/// Debounced suspicious-activity detector.
#[derive(Debug, Clone)]
pub struct SuspicionDetector {
    history: HistoryBuffer<bool>,
    attention_threshold: f64,
}

impl SuspicionDetector {
    pub fn new(history_length: usize, attention_threshold: f64) -> Self {
        Self {
            history: HistoryBuffer::new(history_length),
            attention_threshold,
        }
    }

    /// Per-frame rule, before debouncing.
    pub fn is_raw_suspicious(
        &self,
        attention: f64,
        emotion_state: Option<Emotion>,
        face: Option<&FaceObservation>,
    ) -> bool {
        if attention < self.attention_threshold {
            return true;
        }

        let Some(face) = face else {
            return false;
        };

        let startled = emotion_state.map(|e| e.is_startled()).unwrap_or(false);
        (face.looking_away && startled) || face.head_movement.excessive_movement
    }

    /// Record one frame's raw suspicion and return the debounced flag.
    pub fn record(&mut self, raw_suspicious: bool) -> bool {
        self.history.push(raw_suspicious);
        self.is_flagged()
    }

    /// True when strictly more than a third of the window capacity is suspicious.
    pub fn is_flagged(&self) -> bool {
        self.history.count_true() * 3 > self.history.capacity()
    }

    pub fn history(&self) -> &HistoryBuffer<bool> {
        &self.history
    }
}
