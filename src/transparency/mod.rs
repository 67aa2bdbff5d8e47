//! Transparency module for the interview tracking engine.
//!
//! This module tracks how much monitoring has taken place, so the
//! participant and reviewers can see what the engine has analyzed.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, MonitoringLog, MonitoringStats, SharedMonitoringLog};
