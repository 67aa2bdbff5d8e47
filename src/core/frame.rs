//! Frame assembly from independent source streams.
//!
//! Face and pose sources run at their own rates. The assembler keeps the
//! latest observation of each and, once per tick, pairs them into a
//! [`Frame`]. An observation older than the configured TTL (in ticks) is
//! reported as absent so a frozen source cannot keep the analyzer fed
//! with stale data.

use crate::observation::feed::SourceEvent;
use crate::observation::types::{FaceObservation, PoseObservation};

/// Default number of ticks an observation stays usable.
pub const DEFAULT_OBSERVATION_TTL: u64 = 10;

/// Inputs for one analyzer tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Tick index, starting at 0
    pub tick: u64,
    pub face: Option<FaceObservation>,
    pub pose: Option<PoseObservation>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.face.is_none() && self.pose.is_none()
    }

    /// Copy of the frame with malformed observations dropped.
    pub fn sanitized(&self) -> Frame {
        Frame {
            tick: self.tick,
            face: self.face.as_ref().and_then(FaceObservation::sanitized),
            pose: self.pose.as_ref().and_then(PoseObservation::sanitized),
        }
    }
}

#[derive(Debug, Clone)]
struct Latest<T> {
    observation: T,
    received_tick: u64,
}

/// Pairs the latest face and pose observations into frames.
#[derive(Debug)]
pub struct FrameAssembler {
    /// Ticks an observation stays usable after arrival
    ttl_ticks: u64,
    /// Index of the next frame to be produced
    tick: u64,
    face: Option<Latest<FaceObservation>>,
    pose: Option<Latest<PoseObservation>>,
}

impl FrameAssembler {
    pub fn new(ttl_ticks: u64) -> Self {
        Self {
            ttl_ticks: ttl_ticks.max(1),
            tick: 0,
            face: None,
            pose: None,
        }
    }

    /// Store an incoming observation as the latest of its source.
    pub fn process_event(&mut self, event: SourceEvent) {
        let received_tick = self.tick;
        match event {
            SourceEvent::Face(observation) => {
                self.face = Some(Latest {
                    observation,
                    received_tick,
                })
            }
            SourceEvent::Pose(observation) => {
                self.pose = Some(Latest {
                    observation,
                    received_tick,
                })
            }
        }
    }

    /// Store a batch of events in arrival order.
    pub fn process_events(&mut self, events: impl IntoIterator<Item = SourceEvent>) {
        for event in events {
            self.process_event(event);
        }
    }

    /// Produce the frame for the current tick and advance.
    ///
    /// An observation received during tick `t` is usable for ticks
    /// `t .. t + ttl`. Expired observations are dropped.
    pub fn next_frame(&mut self) -> Frame {
        let tick = self.tick;
        self.expire(tick);

        let frame = Frame {
            tick,
            face: self.face.as_ref().map(|l| l.observation.clone()),
            pose: self.pose.as_ref().map(|l| l.observation.clone()),
        };

        self.tick += 1;
        frame
    }

    fn expire(&mut self, tick: u64) {
        let ttl = self.ttl_ticks;
        if self.face.as_ref().is_some_and(|l| tick - l.received_tick >= ttl) {
            self.face = None;
        }
        if self.pose.as_ref().is_some_and(|l| tick - l.received_tick >= ttl) {
            self.pose = None;
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_OBSERVATION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::types::{Emotion, EmotionScores, HeadMovement, PostureFlags};

    fn face(attention: f64) -> FaceObservation {
        FaceObservation::from_scores(
            attention,
            EmotionScores::certain(Emotion::Neutral),
            HeadMovement {
                stability: 1.0,
                excessive_movement: false,
            },
        )
    }

    #[test]
    fn test_empty_frames_before_any_event() {
        let mut assembler = FrameAssembler::default();
        let frame = assembler.next_frame();
        assert_eq!(frame.tick, 0);
        assert!(frame.is_empty());
        assert_eq!(assembler.next_frame().tick, 1);
    }

    #[test]
    fn test_latest_observation_wins() {
        let mut assembler = FrameAssembler::default();
        assembler.process_events([
            SourceEvent::Face(face(0.2)),
            SourceEvent::Face(face(0.7)),
            SourceEvent::Pose(PoseObservation::with_posture(PostureFlags::default())),
        ]);

        let frame = assembler.next_frame();
        assert_eq!(frame.face.map(|f| f.attention), Some(0.7));
        assert!(frame.pose.is_some());
    }

    #[test]
    fn test_observation_expires_after_ttl() {
        let mut assembler = FrameAssembler::new(3);
        assembler.process_event(SourceEvent::Face(face(0.9)));

        for _ in 0..3 {
            assert!(assembler.next_frame().face.is_some());
        }
        assert!(assembler.next_frame().face.is_none());
    }

    #[test]
    fn test_sources_expire_independently() {
        let mut assembler = FrameAssembler::new(2);
        assembler.process_event(SourceEvent::Pose(PoseObservation::with_posture(
            PostureFlags::default(),
        )));
        assembler.next_frame();

        assembler.process_event(SourceEvent::Face(face(0.5)));
        let frame = assembler.next_frame();
        assert!(frame.face.is_some());
        assert!(frame.pose.is_some());

        let frame = assembler.next_frame();
        assert!(frame.face.is_some());
        assert!(frame.pose.is_none());
    }

    #[test]
    fn test_sanitized_drops_non_finite_observations() {
        let mut corrupt = face(0.5);
        corrupt.head_movement.stability = f64::INFINITY;
        let frame = Frame {
            tick: 4,
            face: Some(corrupt),
            pose: Some(PoseObservation::with_posture(PostureFlags::default())),
        };

        let usable = frame.sanitized();
        assert_eq!(usable.tick, 4);
        assert!(usable.face.is_none());
        assert!(usable.pose.is_some());
        assert!(!frame.sanitized().is_empty());
    }
}
