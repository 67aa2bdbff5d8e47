//! Monitoring transparency log.
//!
//! Counts what the engine has looked at so a participant or reviewer can
//! see the extent of monitoring. No observation content is retained.

use crate::core::analyzer::AnalysisResult;
use crate::core::frame::Frame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monitoring counters for the current process.
#[derive(Debug)]
pub struct MonitoringLog {
    /// Number of face observations received
    face_observations: AtomicU64,
    /// Number of pose observations received
    pose_observations: AtomicU64,
    /// Number of frames analyzed
    frames_analyzed: AtomicU64,
    /// Number of frames with suspicious activity reported
    suspicious_frames: AtomicU64,
    /// Number of session reports generated
    reports_generated: AtomicU64,
    started_at: DateTime<Utc>,
}

impl MonitoringLog {
    pub fn new() -> Self {
        Self {
            face_observations: AtomicU64::new(0),
            pose_observations: AtomicU64::new(0),
            frames_analyzed: AtomicU64::new(0),
            suspicious_frames: AtomicU64::new(0),
            reports_generated: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn record_face_observation(&self) {
        self.face_observations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pose_observation(&self) {
        self.pose_observations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one analyzed frame and its outcome.
    ///
    /// Only observations the analyzer can use are counted.
    pub fn record_frame(&self, frame: &Frame, result: &AnalysisResult) {
        let frame = frame.sanitized();
        if frame.face.is_some() {
            self.record_face_observation();
        }
        if frame.pose.is_some() {
            self.record_pose_observation();
        }
        self.frames_analyzed.fetch_add(1, Ordering::Relaxed);
        if result.suspicious_activity {
            self.suspicious_frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_report_generated(&self) {
        self.reports_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> MonitoringStats {
        MonitoringStats {
            face_observations: self.face_observations.load(Ordering::Relaxed),
            pose_observations: self.pose_observations.load(Ordering::Relaxed),
            frames_analyzed: self.frames_analyzed.load(Ordering::Relaxed),
            suspicious_frames: self.suspicious_frames.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Monitoring Statistics:\n\
             - Face observations used: {}\n\
             - Pose observations used: {}\n\
             - Frames analyzed: {}\n\
             - Frames with suspicious activity: {}\n\
             - Reports generated: {}\n\
             - Running for: {} seconds\n\
             \n\
             Transparency:\n\
             - No video or images stored\n\
             - Only derived per-frame scores are analyzed\n\
             - Reports contain aggregate statistics only",
            stats.face_observations,
            stats.pose_observations,
            stats.frames_analyzed,
            stats.suspicious_frames,
            stats.reports_generated,
            stats.uptime_secs
        )
    }
}

impl Default for MonitoringLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of monitoring counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStats {
    pub face_observations: u64,
    pub pose_observations: u64,
    pub frames_analyzed: u64,
    pub suspicious_frames: u64,
    pub reports_generated: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Monitoring log shared between threads.
pub type SharedMonitoringLog = Arc<MonitoringLog>;

pub fn create_shared_log() -> SharedMonitoringLog {
    Arc::new(MonitoringLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::types::{
        Emotion, EmotionScores, FaceObservation, HeadMovement, PoseObservation, PostureFlags,
    };

    #[test]
    fn test_frame_counting() {
        let log = MonitoringLog::new();
        let frame = Frame {
            tick: 0,
            face: None,
            pose: Some(PoseObservation::with_posture(PostureFlags::default())),
        };
        let flagged = AnalysisResult {
            suspicious_activity: true,
            ..AnalysisResult::default()
        };

        log.record_frame(&frame, &AnalysisResult::default());
        log.record_frame(&frame, &flagged);
        log.record_report_generated();

        let stats = log.stats();
        assert_eq!(stats.face_observations, 0);
        assert_eq!(stats.pose_observations, 2);
        assert_eq!(stats.frames_analyzed, 2);
        assert_eq!(stats.suspicious_frames, 1);
        assert_eq!(stats.reports_generated, 1);
    }

    #[test]
    fn test_malformed_face_is_not_counted() {
        let log = create_shared_log();
        let mut face = FaceObservation::from_scores(
            0.8,
            EmotionScores::certain(Emotion::Neutral),
            HeadMovement {
                stability: 1.0,
                excessive_movement: false,
            },
        );
        face.attention = f64::NAN;
        let frame = Frame {
            tick: 0,
            face: Some(face),
            pose: None,
        };

        log.record_frame(&frame, &AnalysisResult::default());
        let stats = log.stats();
        assert_eq!(stats.face_observations, 0);
        assert_eq!(stats.frames_analyzed, 1);
    }

    #[test]
    fn test_summary_format() {
        let summary = MonitoringLog::new().summary();
        assert!(summary.contains("Frames analyzed"));
        assert!(summary.contains("No video or images stored"));
    }
}
