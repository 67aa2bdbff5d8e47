//! Interview Tracking - behavioral analysis engine for video interviews.
//!
//! This library fuses per-frame face and pose observations into a smoothed,
//! debounced assessment of a participant (attention, emotional state,
//! posture, suspicious activity) and summarizes each interview session in
//! an aggregate report.
//!
//! # Guarantees
//!
//! - **Bounded memory**: every history window holds at most 30 frames
//! - **No flicker**: emotion and posture changes need a quorum of frames
//! - **No false alarms from spikes**: suspicious activity is debounced
//! - **Always available**: absent or malformed observations never fail a tick
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Interview Tracking                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │ Face / Pose │──▶│    Frame    │──▶│   Frame     │       │
//! │  │   sources   │   │  Assembler  │   │  Analyzer   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │ Monitoring  │                     │   Session   │       │
//! │  │    Log      │                     │   Report    │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use interview_tracking::observation::{Emotion, EmotionScores, FaceObservation, HeadMovement};
//! use interview_tracking::TrackingSession;
//!
//! let mut session = TrackingSession::default();
//! session.start_tracking();
//!
//! let face = FaceObservation::from_scores(
//!     0.85,
//!     EmotionScores::certain(Emotion::Happy),
//!     HeadMovement { stability: 0.9, excessive_movement: false },
//! );
//! let result = session.analyze(Some(&face), None);
//! assert_eq!(result.emotion_state, Some(Emotion::Happy));
//!
//! let report = session.generate_report();
//! assert_eq!(report.total_frames, 1);
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod observation;
pub mod session;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use config::{AnalyzerConfig, Config, ConfigError, SourceConfig};
pub use self::core::{
    AnalysisResult, AttentionLevel, Frame, FrameAnalyzer, FrameAssembler, SessionReport,
};
pub use observation::{FaceObservation, ObservationFeed, PoseObservation, SourceEvent};
pub use session::{lock_session, SessionRegistry, SessionState, SharedSession, TrackingSession};
pub use transparency::{MonitoringLog, MonitoringStats, SharedMonitoringLog};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Monitoring disclosure that can be displayed to participants.
pub const MONITORING_DISCLOSURE: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║            INTERVIEW TRACKING - MONITORING DISCLOSURE            ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This session analyzes behavioral signals during the interview.  ║
║                                                                  ║
║  ✓ WHAT IS ANALYZED:                                             ║
║    • Attention estimates (are you looking at the screen)         ║
║    • Facial expression categories (happy, neutral, ...)          ║
║    • Posture (slouching, distance to the camera)                 ║
║    • Head and body movement stability                            ║
║                                                                  ║
║  ✗ WHAT IS NEVER STORED:                                         ║
║    • Video frames or images of you                               ║
║    • Audio or anything you say                                   ║
║    • Per-frame measurements after the session ends               ║
║                                                                  ║
║  Only aggregate statistics are kept in the session report.       ║
║  Momentary glances or expressions are smoothed out; suspicious   ║
║  activity is only flagged when it persists.                      ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
