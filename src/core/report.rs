//! Session report rendered at the end of an interview.

use crate::core::analyzer::AttentionLevel;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use uuid::Uuid;

/// Label used for the dominant emotion of a session with no frames.
pub const DEFAULT_DOMINANT_EMOTION: &str = "neutral";

/// Aggregate statistics of one tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: Uuid,
    /// Mean of the per-tick smoothed attention
    pub average_attention: f64,
    pub attention_level: AttentionLevel,
    /// Fraction of frames per reported emotion label
    pub emotion_breakdown: BTreeMap<String, f64>,
    pub dominant_emotion: String,
    /// Fraction of frames per reported posture category
    pub posture_breakdown: BTreeMap<String, f64>,
    /// Frames on which suspicious activity was reported
    pub suspicious_activity_count: u64,
    pub suspicious_fraction: f64,
    pub total_frames: u64,
    pub frames_without_face: u64,
    pub frames_without_pose: u64,
    /// `None` when the report was generated before tracking started
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
}

impl SessionReport {
    /// Human-readable summary with times rendered in `tz`.
    pub fn summary(&self, tz: Tz) -> String {
        let start = self
            .start_time
            .map(|t| t.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z").to_string())
            .unwrap_or_else(|| "not started".to_string());
        let end = self.end_time.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z");

        let mut out = format!(
            "Interview Session Report ({})\n\
             - Started: {start}\n\
             - Ended: {end}\n\
             - Duration: {:.1} seconds\n\
             - Frames analyzed: {} ({} without face, {} without pose)\n\
             - Average attention: {:.0}% ({})\n\
             - Dominant emotion: {}\n\
             - Suspicious activity: {} frames ({:.1}%)\n",
            self.session_id,
            self.duration_seconds,
            self.total_frames,
            self.frames_without_face,
            self.frames_without_pose,
            self.average_attention * 100.0,
            self.attention_level,
            self.dominant_emotion,
            self.suspicious_activity_count,
            self.suspicious_fraction * 100.0,
        );

        out.push_str("\nEmotions:\n");
        write_breakdown(&mut out, &self.emotion_breakdown);
        out.push_str("\nPosture:\n");
        write_breakdown(&mut out, &self.posture_breakdown);
        out
    }
}

fn write_breakdown(out: &mut String, breakdown: &BTreeMap<String, f64>) {
    if breakdown.values().all(|&v| v == 0.0) {
        out.push_str("  (no frames)\n");
        return;
    }
    for (label, fraction) in breakdown {
        let _ = writeln!(out, "  {label:<10} {:>5.1}%", fraction * 100.0);
    }
}
