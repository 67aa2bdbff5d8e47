//! Channel between perception sources and the tick loop.
//!
//! Face and pose sources typically run on their own threads or callbacks.
//! They push observations into a bounded channel; the tick loop drains it
//! once per frame so that `analyze()` is only ever entered by one writer.

use crate::observation::types::{FaceObservation, PoseObservation};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default channel capacity.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

/// An observation tagged with the source that produced it.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    Face(FaceObservation),
    Pose(PoseObservation),
}

/// Errors raised when pushing into the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Observation feed is full, event dropped")]
    Full,
    #[error("Observation feed is disconnected")]
    Disconnected,
}

/// Producer handle given to a perception source.
#[derive(Debug, Clone)]
pub struct FeedSender {
    sender: Sender<SourceEvent>,
}

impl FeedSender {
    /// Push an event without blocking. A full channel drops the event.
    pub fn send(&self, event: SourceEvent) -> Result<(), FeedError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => FeedError::Full,
            TrySendError::Disconnected(_) => FeedError::Disconnected,
        })
    }

    pub fn send_face(&self, face: FaceObservation) -> Result<(), FeedError> {
        self.send(SourceEvent::Face(face))
    }

    pub fn send_pose(&self, pose: PoseObservation) -> Result<(), FeedError> {
        self.send(SourceEvent::Pose(pose))
    }
}

/// Bounded multi-producer, single-consumer observation feed.
pub struct ObservationFeed {
    sender: Sender<SourceEvent>,
    receiver: Receiver<SourceEvent>,
}

impl ObservationFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Get a producer handle for a perception source.
    pub fn sender(&self) -> FeedSender {
        FeedSender {
            sender: self.sender.clone(),
        }
    }

    /// Get the receiver for source events.
    pub fn receiver(&self) -> &Receiver<SourceEvent> {
        &self.receiver
    }

    /// Take every event queued so far without blocking.
    pub fn drain(&self) -> Vec<SourceEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of events waiting to be drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for ObservationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
