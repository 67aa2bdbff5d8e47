//! Core functionality for the interview tracking engine.
//!
//! This module contains:
//! - Bounded history buffers and temporal smoothing
//! - Per-frame analysis and suspicious-activity debouncing
//! - Session aggregation and report generation
//! - Frame assembly from independent source streams

pub mod aggregator;
pub mod analyzer;
pub mod frame;
pub mod history;
pub mod report;
pub mod smoothing;
pub mod suspicion;

// Re-export commonly used types
pub use aggregator::SessionAggregator;
pub use analyzer::{AnalysisResult, AttentionLevel, FrameAnalyzer};
pub use frame::{Frame, FrameAssembler, DEFAULT_OBSERVATION_TTL};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_LENGTH};
pub use report::SessionReport;
pub use smoothing::{weighted_average, LabelStabilizer};
pub use suspicion::{SuspicionDetector, DEFAULT_SUSPICIOUS_ATTENTION};
