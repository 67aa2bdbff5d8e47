//! Demonstration of a full interview tracking session.
//!
//! This example shows how to:
//! 1. Feed synthetic face and pose observations through the channel
//! 2. Assemble them into frames
//! 3. Analyze each frame in a tracking session
//! 4. Generate the session report
//!
//! Run with: cargo run --example simulate_session

use interview_tracking::{
    config::{Config, LoggingConfig},
    core::FrameAssembler,
    logging::init_logging,
    observation::{SyntheticFaceSource, SyntheticPoseSource, SyntheticProfile},
    transparency::MonitoringLog,
    lock_session, ObservationFeed, SessionRegistry, MONITORING_DISCLOSURE,
};

const TICKS: u64 = 900;

fn main() {
    init_logging(&LoggingConfig::default());

    println!("Interview Tracking - Simulated Session");
    println!("======================================");
    println!("{MONITORING_DISCLOSURE}");

    let config = Config::default();
    let profile = SyntheticProfile {
        distracted: true,
        ..SyntheticProfile::default()
    };

    let feed = ObservationFeed::default();
    let sender = feed.sender();
    let mut face_source = SyntheticFaceSource::new(profile.clone());
    let mut pose_source = SyntheticPoseSource::new(profile);
    let mut assembler = FrameAssembler::new(config.observation_ttl_ticks);
    let monitoring = MonitoringLog::new();

    let registry = SessionRegistry::new(config.analyzer.clone());
    let session = registry.create();
    lock_session(&session).start_tracking();

    for tick in 0..TICKS {
        if let Some(face) = face_source.next_observation() {
            if let Err(e) = sender.send_face(face) {
                eprintln!("Dropped face observation: {e}");
            }
        }
        if let Err(e) = sender.send_pose(pose_source.next_observation()) {
            eprintln!("Dropped pose observation: {e}");
        }

        assembler.process_events(feed.drain());
        let frame = assembler.next_frame();
        let result = lock_session(&session).analyze_frame(&frame);
        monitoring.record_frame(&frame, &result);

        if tick % 150 == 0 {
            println!(
                "tick {tick:>4}: attention {:.2} | emotion {} | posture {} | suspicious {}",
                result.attention,
                result.emotion_label(),
                result.posture_label(),
                result.suspicious_activity
            );
        }
    }

    let report = lock_session(&session).generate_report();
    monitoring.record_report_generated();

    println!();
    println!("{}", report.summary(chrono_tz::UTC));
    println!("{}", monitoring.summary());
}
