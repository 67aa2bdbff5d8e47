//! Observation module for the interview tracking engine.
//!
//! This module defines the per-frame observations produced by the face and
//! pose perception sources, the channel used to hand them to the tick loop,
//! and deterministic synthetic sources for demos and tests.

pub mod feed;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use feed::{FeedError, FeedSender, ObservationFeed, SourceEvent, DEFAULT_FEED_CAPACITY};
pub use synthetic::{SyntheticFaceSource, SyntheticPoseSource, SyntheticProfile};
pub use types::{
    Emotion, EmotionScores, FaceObservation, FramePosition, HeadMovement, MovementInfo,
    PoseObservation, Posture, PostureFlags,
};
