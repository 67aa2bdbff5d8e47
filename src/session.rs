//! Tracking sessions and the session registry.
//!
//! Every interview gets its own [`TrackingSession`] owning its analyzer
//! state and totals, so concurrent interviews never share history. A host
//! serving several interviews keeps them in a [`SessionRegistry`]; each
//! session sits behind its own mutex, which serializes ticks and report
//! generation for that session.

use crate::config::AnalyzerConfig;
use crate::core::aggregator::SessionAggregator;
use crate::core::analyzer::{AnalysisResult, FrameAnalyzer};
use crate::core::frame::Frame;
use crate::core::report::SessionReport;
use crate::observation::types::{FaceObservation, PoseObservation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Tracking,
    Reported,
}

/// One interview's analyzer and totals.
#[derive(Debug)]
pub struct TrackingSession {
    id: Uuid,
    state: SessionState,
    analyzer: FrameAnalyzer,
    aggregator: SessionAggregator,
    /// End time frozen when the session was reported
    reported_at: Option<DateTime<Utc>>,
}

impl TrackingSession {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_id(Uuid::new_v4(), config)
    }

    pub fn with_id(id: Uuid, config: AnalyzerConfig) -> Self {
        Self {
            id,
            state: SessionState::Idle,
            analyzer: FrameAnalyzer::new(config),
            aggregator: SessionAggregator::new(),
            reported_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reset all history and totals and begin tracking now.
    pub fn start_tracking(&mut self) {
        self.start_tracking_at(Utc::now());
    }

    /// Reset all history and totals and begin tracking at `now`.
    pub fn start_tracking_at(&mut self, now: DateTime<Utc>) {
        self.analyzer.reset();
        self.aggregator.start(now);
        self.reported_at = None;
        self.state = SessionState::Tracking;
        info!(session = %self.id, "Tracking started");
    }

    /// Analyze one tick.
    ///
    /// An idle session starts tracking implicitly. A reported session
    /// ignores further ticks and returns its last result until it is
    /// started again.
    pub fn analyze(
        &mut self,
        face: Option<&FaceObservation>,
        pose: Option<&PoseObservation>,
    ) -> AnalysisResult {
        match self.state {
            SessionState::Idle => self.start_tracking(),
            SessionState::Reported => {
                debug!(session = %self.id, "Ignoring tick on a reported session");
                return self.analyzer.last_result();
            }
            SessionState::Tracking => {}
        }

        // Malformed observations count as absent in the totals too
        let face = face.and_then(FaceObservation::sanitized);
        let pose = pose.and_then(PoseObservation::sanitized);

        let result = self.analyzer.analyze(face.as_ref(), pose.as_ref());
        self.aggregator.record(&result, face.is_some(), pose.is_some());
        result
    }

    /// Analyze an assembled frame.
    pub fn analyze_frame(&mut self, frame: &Frame) -> AnalysisResult {
        self.analyze(frame.face.as_ref(), frame.pose.as_ref())
    }

    /// Finish the session and summarize it.
    ///
    /// The first call moves a tracking session to `Reported`. Later calls
    /// return the same report.
    pub fn generate_report(&mut self) -> SessionReport {
        self.generate_report_at(Utc::now())
    }

    pub fn generate_report_at(&mut self, now: DateTime<Utc>) -> SessionReport {
        let end = match self.state {
            SessionState::Idle => now,
            SessionState::Tracking => {
                self.state = SessionState::Reported;
                self.reported_at = Some(now);
                now
            }
            SessionState::Reported => self.reported_at.unwrap_or(now),
        };

        let report = self.aggregator.report(self.id, end);
        info!(
            session = %self.id,
            frames = report.total_frames,
            average_attention = report.average_attention,
            suspicious_frames = report.suspicious_activity_count,
            "Session report generated"
        );
        report
    }

    /// Summarize the session so far without ending it.
    pub fn snapshot_report(&self) -> SessionReport {
        let end = self.reported_at.unwrap_or_else(Utc::now);
        self.aggregator.report(self.id, end)
    }

    pub fn frame_count(&self) -> u64 {
        self.aggregator.frame_count()
    }

    pub fn analyzer(&self) -> &FrameAnalyzer {
        &self.analyzer
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

/// A session shared between the tick loop and report consumers.
pub type SharedSession = Arc<Mutex<TrackingSession>>;

/// Lock a shared session, recovering from a panicked holder.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, TrackingSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    config: AnalyzerConfig,
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
}

impl SessionRegistry {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create and register an idle session.
    pub fn create(&self) -> SharedSession {
        let session = TrackingSession::new(self.config.clone());
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions().insert(id, Arc::clone(&shared));
        debug!(session = %id, "Session registered");
        shared
    }

    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions().get(id).cloned()
    }

    /// Unregister a session. Holders of the handle keep it alive.
    pub fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        let removed = self.sessions().remove(id);
        if removed.is_some() {
            debug!(session = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.sessions().keys().copied().collect()
    }
}
