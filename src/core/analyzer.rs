//! Per-frame fusion of face and pose observations.
//!
//! The analyzer owns the history buffers of one session. Each call to
//! [`FrameAnalyzer::analyze`] consumes at most one observation from each
//! source and returns a smoothed, debounced [`AnalysisResult`]. Absent or
//! malformed observations never fail a tick; the previous state carries.

use crate::config::AnalyzerConfig;
use crate::core::history::HistoryBuffer;
use crate::core::smoothing::{weighted_average, LabelStabilizer};
use crate::core::suspicion::SuspicionDetector;
use crate::observation::types::{
    label_or_unknown, Emotion, FaceObservation, PoseObservation, Posture, UNKNOWN_LABEL,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Attention reported before any face has been seen.
pub const DEFAULT_ATTENTION: f64 = 0.5;
/// Movement score reported before any observation has been seen.
pub const DEFAULT_MOVEMENT_SCORE: f64 = 0.5;

/// Coarse attention classification used for live feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionLevel {
    Poor,
    Average,
    Good,
    Excellent,
}

impl AttentionLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            AttentionLevel::Excellent
        } else if score >= 0.6 {
            AttentionLevel::Good
        } else if score >= 0.4 {
            AttentionLevel::Average
        } else {
            AttentionLevel::Poor
        }
    }
}

impl fmt::Display for AttentionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AttentionLevel::Poor => "Poor",
            AttentionLevel::Average => "Average",
            AttentionLevel::Good => "Good",
            AttentionLevel::Excellent => "Excellent",
        };
        f.write_str(text)
    }
}

/// Fused assessment for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Recency-weighted attention in [0, 1]
    pub attention: f64,
    /// Stabilized emotion, serialized as `"unknown"` until established
    #[serde(with = "unknown_label")]
    pub emotion_state: Option<Emotion>,
    /// Stabilized posture, serialized as `"unknown"` until established
    #[serde(with = "unknown_label")]
    pub posture: Option<Posture>,
    /// Debounced suspicious-activity flag
    pub suspicious_activity: bool,
    /// Latest head or body stability in [0, 1]
    pub movement_score: f64,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            attention: DEFAULT_ATTENTION,
            emotion_state: None,
            posture: None,
            suspicious_activity: false,
            movement_score: DEFAULT_MOVEMENT_SCORE,
        }
    }
}

impl AnalysisResult {
    pub fn emotion_label(&self) -> String {
        label_or_unknown(self.emotion_state)
    }

    pub fn posture_label(&self) -> String {
        label_or_unknown(self.posture)
    }

    pub fn attention_level(&self) -> AttentionLevel {
        AttentionLevel::from_score(self.attention)
    }

    pub fn is_attentive(&self, good_attention_threshold: f64) -> bool {
        self.attention >= good_attention_threshold
    }

    /// Whether the live status should warn the participant.
    pub fn needs_attention(&self) -> bool {
        self.suspicious_activity
    }
}

/// Serde support for optional labels rendered as `"unknown"` when absent.
mod unknown_label {
    use super::UNKNOWN_LABEL;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(UNKNOWN_LABEL),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        if label == UNKNOWN_LABEL {
            Ok(None)
        } else {
            label.parse().map(Some).map_err(de::Error::custom)
        }
    }
}

/// Fuses per-frame observations into smoothed results.
#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    config: AnalyzerConfig,
    attention_history: HistoryBuffer<f64>,
    emotions: LabelStabilizer<Emotion>,
    postures: LabelStabilizer<Posture>,
    suspicion: SuspicionDetector,
    last: AnalysisResult,
}

impl FrameAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            attention_history: HistoryBuffer::new(config.history_length),
            emotions: LabelStabilizer::new(config.history_length, config.emotion_quorum),
            postures: LabelStabilizer::new(config.history_length, config.posture_quorum),
            suspicion: SuspicionDetector::new(
                config.history_length,
                config.suspicious_attention_threshold,
            ),
            last: AnalysisResult::default(),
            config,
        }
    }

    /// Analyze one tick.
    ///
    /// Out-of-range values are clamped; observations containing non-finite
    /// values are treated as absent for this tick.
    pub fn analyze(
        &mut self,
        face: Option<&FaceObservation>,
        pose: Option<&PoseObservation>,
    ) -> AnalysisResult {
        let face = face.and_then(|f| f.sanitized());
        let pose = pose.and_then(|p| p.sanitized());

        let mut result = self.last;

        if let Some(face) = &face {
            self.attention_history.push(face.attention);
            if let Some(smoothed) = weighted_average(&self.attention_history) {
                result.attention = smoothed;
            }
            result.emotion_state = self.emotions.observe(face.dominant_emotion);
            result.movement_score = face.head_movement.stability;
        }

        if let Some(pose) = &pose {
            result.posture = self.postures.observe(pose.posture_category());
            if face.is_none() {
                result.movement_score = pose.movement.stability_score;
            }
        }

        let raw = self
            .suspicion
            .is_raw_suspicious(result.attention, result.emotion_state, face.as_ref());
        result.suspicious_activity = self.suspicion.record(raw);

        self.log_transitions(&result);
        self.last = result;
        result
    }

    fn log_transitions(&self, result: &AnalysisResult) {
        if result.emotion_state != self.last.emotion_state {
            debug!(
                from = %self.last.emotion_label(),
                to = %result.emotion_label(),
                "Emotion state changed"
            );
        }
        if result.posture != self.last.posture {
            debug!(
                from = %self.last.posture_label(),
                to = %result.posture_label(),
                "Posture changed"
            );
        }
        if result.suspicious_activity != self.last.suspicious_activity {
            debug!(
                flagged = result.suspicious_activity,
                attention = result.attention,
                "Suspicious activity flag changed"
            );
        }
    }

    /// Result of the most recent tick (engine defaults before the first).
    pub fn last_result(&self) -> AnalysisResult {
        self.last
    }

    pub fn attention_history(&self) -> &HistoryBuffer<f64> {
        &self.attention_history
    }

    pub fn emotion_history(&self) -> &HistoryBuffer<Emotion> {
        self.emotions.history()
    }

    pub fn posture_history(&self) -> &HistoryBuffer<Posture> {
        self.postures.history()
    }

    pub fn suspicion_history(&self) -> &HistoryBuffer<bool> {
        self.suspicion.history()
    }

    /// Drop all history and return to engine defaults.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}
