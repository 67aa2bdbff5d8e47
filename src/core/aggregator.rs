//! Streaming per-session totals.

use crate::core::analyzer::{AnalysisResult, AttentionLevel};
use crate::core::report::{SessionReport, DEFAULT_DOMINANT_EMOTION};
use crate::observation::types::Posture;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Running counters of one session.
///
/// Counts are kept over the reported (stabilized) labels, not the raw
/// per-frame ones.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    frame_count: u64,
    attention_sum: f64,
    emotion_counts: BTreeMap<String, u64>,
    posture_counts: BTreeMap<String, u64>,
    suspicious_count: u64,
    frames_without_face: u64,
    frames_without_pose: u64,
    start_time: Option<DateTime<Utc>>,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all totals and mark the session start.
    pub fn start(&mut self, now: DateTime<Utc>) {
        *self = Self {
            start_time: Some(now),
            ..Self::default()
        };
    }

    /// Account for one analyzed tick.
    pub fn record(&mut self, result: &AnalysisResult, face_present: bool, pose_present: bool) {
        self.frame_count += 1;
        self.attention_sum += result.attention;
        *self.emotion_counts.entry(result.emotion_label()).or_default() += 1;
        *self.posture_counts.entry(result.posture_label()).or_default() += 1;

        if result.suspicious_activity {
            self.suspicious_count += 1;
        }
        if !face_present {
            self.frames_without_face += 1;
        }
        if !pose_present {
            self.frames_without_pose += 1;
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render the totals as a report ending at `now`. Does not mutate state.
    pub fn report(&self, session_id: Uuid, now: DateTime<Utc>) -> SessionReport {
        let frames = self.frame_count.max(1) as f64;
        let average_attention = self.attention_sum / frames;

        let emotion_breakdown = self
            .emotion_counts
            .iter()
            .map(|(label, &count)| (label.clone(), count as f64 / frames))
            .collect();

        let mut posture_breakdown: BTreeMap<String, f64> = Posture::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0.0))
            .collect();
        for (label, &count) in &self.posture_counts {
            posture_breakdown.insert(label.clone(), count as f64 / frames);
        }

        let duration_seconds = self
            .start_time
            .map(|start| ((now - start).num_milliseconds() as f64 / 1000.0).max(0.0))
            .unwrap_or(0.0);

        SessionReport {
            session_id,
            average_attention,
            attention_level: AttentionLevel::from_score(average_attention),
            emotion_breakdown,
            dominant_emotion: self.dominant_emotion(),
            posture_breakdown,
            suspicious_activity_count: self.suspicious_count,
            suspicious_fraction: self.suspicious_count as f64 / frames,
            total_frames: self.frame_count,
            frames_without_face: self.frames_without_face,
            frames_without_pose: self.frames_without_pose,
            start_time: self.start_time,
            end_time: now,
            duration_seconds,
        }
    }

    /// Most frequent reported emotion; ties go to the first label in order.
    fn dominant_emotion(&self) -> String {
        let mut best: Option<(&String, u64)> = None;
        for (label, &count) in &self.emotion_counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label.clone())
            .unwrap_or_else(|| DEFAULT_DOMINANT_EMOTION.to_string())
    }
}
