//! Deterministic synthetic perception sources.
//!
//! These stand in for real face and pose models when running demos or
//! soak tests. Every value is a function of the tick index, so two sources
//! built with the same settings produce identical streams.

use crate::core::history::HistoryBuffer;
use crate::observation::types::{
    Emotion, EmotionScores, FaceObservation, FramePosition, HeadMovement, MovementInfo,
    PoseObservation, PostureFlags,
};

/// Nominal frame width used for head offset geometry.
const FRAME_WIDTH: f64 = 640.0;
/// Nominal frame height used for head offset geometry.
const FRAME_HEIGHT: f64 = 480.0;
/// Frames of positional history used for the stability estimate.
const MOTION_WINDOW: usize = 30;
/// Missing-face ticks tolerated before a "no face" observation is emitted.
const NO_FACE_GRACE_TICKS: u64 = 10;

/// Shared knobs for both synthetic sources.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    /// Frames per second used to turn ticks into seconds
    pub fps: f64,
    /// Insert a distraction phase in every cycle
    pub distracted: bool,
    /// Length of one distraction cycle in ticks
    pub distraction_period: u64,
    /// Ticks at the end of each cycle spent distracted
    pub distraction_length: u64,
    /// A face dropout starts every this many ticks (0 disables dropouts)
    pub dropout_every: u64,
    /// Length of each face dropout in ticks
    pub dropout_length: u64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            fps: 30.0,
            distracted: false,
            distraction_period: 300,
            distraction_length: 100,
            dropout_every: 450,
            dropout_length: 15,
        }
    }
}

impl SyntheticProfile {
    fn seconds(&self, tick: u64) -> f64 {
        tick as f64 / self.fps.max(1.0)
    }

    fn is_distracted(&self, tick: u64) -> bool {
        if !self.distracted || self.distraction_period == 0 {
            return false;
        }
        let phase = tick % self.distraction_period;
        phase >= self.distraction_period.saturating_sub(self.distraction_length)
    }

    /// Ticks since the current dropout started, if one is in progress.
    fn dropout_progress(&self, tick: u64) -> Option<u64> {
        if self.dropout_every == 0 || tick < self.dropout_every {
            return None;
        }
        let phase = tick % self.dropout_every;
        (phase < self.dropout_length).then_some(phase)
    }
}

/// Synthetic face source.
pub struct SyntheticFaceSource {
    profile: SyntheticProfile,
    tick: u64,
    last_center: Option<(f64, f64)>,
    motion: HistoryBuffer<f64>,
}

impl SyntheticFaceSource {
    pub fn new(profile: SyntheticProfile) -> Self {
        Self {
            profile,
            tick: 0,
            last_center: None,
            motion: HistoryBuffer::new(MOTION_WINDOW),
        }
    }

    /// Produce the observation for the next tick, or `None` during a dropout.
    pub fn next_observation(&mut self) -> Option<FaceObservation> {
        let tick = self.tick;
        self.tick += 1;

        if let Some(missing) = self.profile.dropout_progress(tick) {
            self.last_center = None;
            return (missing >= NO_FACE_GRACE_TICKS).then(no_face_observation);
        }

        let t = self.profile.seconds(tick);
        let distracted = self.profile.is_distracted(tick);

        let swing = if distracted { 140.0 } else { 30.0 };
        let jitter = if distracted {
            (t * 4.0).sin() * 40.0
        } else {
            0.0
        };
        let center = (
            FRAME_WIDTH / 2.0 + (t * 0.5).sin() * swing + jitter,
            FRAME_HEIGHT / 3.0 + (t * 0.3).cos() * 15.0,
        );

        if let Some((lx, ly)) = self.last_center {
            let (dx, dy) = (center.0 - lx, center.1 - ly);
            self.motion.push((dx * dx + dy * dy).sqrt());
        }
        self.last_center = Some(center);

        let stability = if self.motion.is_empty() {
            1.0
        } else {
            let avg = self.motion.iter().sum::<f64>() / self.motion.len() as f64;
            (1.0 - avg / 15.0).clamp(0.0, 1.0)
        };

        let offset = ((center.0 - FRAME_WIDTH / 2.0).powi(2)
            + (center.1 - FRAME_HEIGHT / 3.0).powi(2))
        .sqrt();
        let max_offset = ((FRAME_WIDTH / 2.0).powi(2) + (FRAME_HEIGHT / 2.0).powi(2)).sqrt();
        let position_score = 1.0 - (offset / max_offset) * 1.2;
        let attention_cycle = ((t * 0.1).sin() + 1.0) / 2.0;
        let mut attention = position_score * 0.5 + stability * 0.3 + attention_cycle * 0.2;
        if distracted {
            attention *= 0.4;
        }

        let emotion_cycle = ((t * 0.2).sin() + 1.0) / 2.0;
        let wobble = |phase: f64| 0.03 + 0.02 * (t * 0.7 + phase).sin();
        let mut scores = EmotionScores {
            happy: 0.5 - 0.2 * emotion_cycle,
            sad: wobble(0.0),
            angry: wobble(1.0),
            fearful: wobble(2.0),
            disgusted: wobble(3.0),
            surprised: wobble(4.0),
            neutral: 0.4 + 0.3 * emotion_cycle,
        };
        if distracted {
            scores.surprised += 0.8;
        }
        let scores = scores.normalized();

        let looking_away = (center.0 - FRAME_WIDTH / 2.0).abs() > FRAME_WIDTH * 0.2;

        Some(FaceObservation {
            looking_away,
            abnormal_position: center.1 < 0.0 || center.1 > FRAME_HEIGHT * 0.8,
            dominant_emotion: scores.dominant(),
            emotion_scores: scores,
            attention: attention.clamp(0.1, 1.0),
            head_movement: HeadMovement {
                stability,
                excessive_movement: stability < 0.4,
            },
        })
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

/// What a face source reports once the participant has been gone a while.
fn no_face_observation() -> FaceObservation {
    FaceObservation {
        looking_away: true,
        abnormal_position: true,
        emotion_scores: EmotionScores::certain(Emotion::Neutral),
        dominant_emotion: Emotion::Neutral,
        attention: 0.1,
        head_movement: HeadMovement {
            stability: 0.5,
            excessive_movement: false,
        },
    }
}

/// Synthetic pose source.
pub struct SyntheticPoseSource {
    profile: SyntheticProfile,
    tick: u64,
    last_shoulder_mid: Option<f64>,
    motion: HistoryBuffer<f64>,
}

impl SyntheticPoseSource {
    pub fn new(profile: SyntheticProfile) -> Self {
        Self {
            profile,
            tick: 0,
            last_shoulder_mid: None,
            motion: HistoryBuffer::new(MOTION_WINDOW),
        }
    }

    /// Produce the observation for the next tick.
    pub fn next_observation(&mut self) -> PoseObservation {
        let tick = self.tick;
        self.tick += 1;

        let t = self.profile.seconds(tick);
        let distracted = self.profile.is_distracted(tick);

        let shoulder_slope = 0.1 + 0.08 * (t * 0.05).sin();
        let width_ratio = 0.3 + 0.12 * (t * 0.07).sin();

        let sway = if distracted { 60.0 } else { 8.0 };
        let shoulder_mid = FRAME_WIDTH / 2.0 + (t * 0.6).sin() * sway;
        if let Some(last) = self.last_shoulder_mid {
            self.motion.push((shoulder_mid - last).abs());
        }
        self.last_shoulder_mid = Some(shoulder_mid);

        let stability_score = if self.motion.is_empty() {
            1.0
        } else {
            let avg = self.motion.iter().sum::<f64>() / self.motion.len() as f64;
            (1.0 - avg / 12.0).clamp(0.0, 1.0)
        };

        PoseObservation {
            posture: PostureFlags {
                slouching: shoulder_slope > 0.15,
                too_close: width_ratio > 0.4,
                too_far: width_ratio < 0.2,
            },
            movement: MovementInfo {
                excessive_movement: stability_score < 0.65,
                stability_score,
            },
            position: FramePosition {
                centered: (shoulder_mid - FRAME_WIDTH / 2.0).abs() < FRAME_WIDTH / 5.0,
                visible_shoulders: true,
            },
        }
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
