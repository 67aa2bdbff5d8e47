//! Integration tests for tracking sessions

use chrono::{Duration, TimeZone, Utc};
use interview_tracking::observation::{
    Emotion, EmotionScores, FaceObservation, HeadMovement, PoseObservation, Posture, PostureFlags,
    SyntheticFaceSource, SyntheticPoseSource, SyntheticProfile,
};
use interview_tracking::{
    lock_session, FrameAssembler, ObservationFeed, SessionRegistry, SessionState, TrackingSession,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn face(attention: f64, emotion: Emotion) -> FaceObservation {
    FaceObservation::from_scores(
        attention,
        EmotionScores::certain(emotion),
        HeadMovement {
            stability: 0.9,
            excessive_movement: false,
        },
    )
}

fn upright() -> PoseObservation {
    PoseObservation::with_posture(PostureFlags::default())
}

#[test]
fn test_report_right_after_start_is_zeroed() {
    let mut session = TrackingSession::default();
    session.start_tracking();
    let report = session.generate_report();

    assert_eq!(report.total_frames, 0);
    assert_eq!(report.average_attention, 0.0);
    assert_eq!(report.suspicious_activity_count, 0);
    assert_eq!(report.dominant_emotion, "neutral");
    assert!(report.emotion_breakdown.values().all(|&v| v == 0.0));
    assert!(report.posture_breakdown.values().all(|&v| v == 0.0));
}

#[test]
fn test_single_sad_frame_never_changes_emotion() {
    let mut session = TrackingSession::default();
    session.start_tracking();

    let mut inputs = vec![Emotion::Happy; 30];
    inputs.push(Emotion::Sad);
    inputs.extend(std::iter::repeat(Emotion::Happy).take(30));

    for emotion in inputs {
        let result = session.analyze(Some(&face(0.9, emotion)), Some(&upright()));
        assert_eq!(result.emotion_state, Some(Emotion::Happy));
        assert_eq!(result.posture, Some(Posture::Good));
    }

    let report = session.generate_report();
    assert_eq!(report.total_frames, 61);
    assert_eq!(report.emotion_breakdown["happy"], 1.0);
    assert_eq!(report.dominant_emotion, "happy");
}

#[test]
fn test_sustained_low_attention_is_flagged_on_eleventh_tick() {
    let mut session = TrackingSession::default();
    session.start_tracking();

    for tick in 1..=12 {
        let result = session.analyze(Some(&face(0.1, Emotion::Neutral)), None);
        assert_eq!(result.suspicious_activity, tick >= 11, "tick {tick}");
    }

    let report = session.snapshot_report();
    assert_eq!(report.suspicious_activity_count, 2);
    assert_eq!(session.state(), SessionState::Tracking);
}

#[test]
fn test_short_glance_away_is_not_flagged() {
    let mut session = TrackingSession::default();
    session.start_tracking();

    for _ in 0..30 {
        session.analyze(Some(&face(0.9, Emotion::Neutral)), None);
    }
    let mut startled = face(0.9, Emotion::Fearful);
    startled.looking_away = true;
    for _ in 0..5 {
        let result = session.analyze(Some(&startled), None);
        assert!(!result.suspicious_activity);
    }
}

#[test]
fn test_missing_face_carries_attention() {
    let mut session = TrackingSession::default();
    session.start_tracking();

    let first = session.analyze(Some(&face(0.8, Emotion::Happy)), Some(&upright()));
    for _ in 0..5 {
        let result = session.analyze(None, Some(&upright()));
        assert_eq!(result.attention, first.attention);
        assert_eq!(result.emotion_state, Some(Emotion::Happy));
    }

    let report = session.generate_report();
    assert_eq!(report.frames_without_face, 5);
    assert_eq!(report.frames_without_pose, 0);
    assert!((report.average_attention - 0.8).abs() < 1e-12);
}

#[test]
fn test_malformed_wire_observations_are_absent() {
    let good = json!({
        "lookingAway": false,
        "abnormalPosition": false,
        "emotionScores": {
            "happy": 0.9, "sad": 0.0, "angry": 0.0, "fearful": 0.0,
            "disgusted": 0.0, "surprised": 0.0, "neutral": 0.1
        },
        "dominantEmotion": "happy",
        "attention": 0.75,
        "headMovement": { "stability": 0.8, "excessiveMovement": false }
    });
    let missing_head = json!({
        "lookingAway": false,
        "abnormalPosition": false,
        "emotionScores": {
            "happy": 0.9, "sad": 0.0, "angry": 0.0, "fearful": 0.0,
            "disgusted": 0.0, "surprised": 0.0, "neutral": 0.1
        },
        "dominantEmotion": "nervous",
        "attention": 0.2
    });

    let mut session = TrackingSession::default();
    session.start_tracking();

    let parsed = FaceObservation::from_value(&good);
    assert!(parsed.is_some());
    let result = session.analyze(parsed.as_ref(), None);
    assert_eq!(result.attention, 0.75);

    let parsed = FaceObservation::from_value(&missing_head);
    assert!(parsed.is_none());
    let result = session.analyze(parsed.as_ref(), None);
    assert_eq!(result.attention, 0.75);
    assert_eq!(session.frame_count(), 2);
}

#[test]
fn test_feed_to_report_pipeline() {
    let feed = ObservationFeed::default();
    let face_sender = feed.sender();
    let pose_sender = feed.sender();
    let mut assembler = FrameAssembler::new(5);

    let mut session = TrackingSession::default();
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    session.start_tracking_at(t0);

    // face only on the first 10 ticks, pose on every tick
    for tick in 0..40 {
        if tick < 10 {
            face_sender.send_face(face(0.9, Emotion::Happy)).unwrap();
        }
        pose_sender.send_pose(upright()).unwrap();

        assembler.process_events(feed.drain());
        let frame = assembler.next_frame();
        assert_eq!(frame.face.is_some(), tick < 14, "tick {tick}");
        session.analyze_frame(&frame);
    }

    let report = session.generate_report_at(t0 + Duration::seconds(20));
    assert_eq!(report.total_frames, 40);
    assert_eq!(report.frames_without_face, 26);
    assert_eq!(report.posture_breakdown["good"], 1.0);
    assert_eq!(report.duration_seconds, 20.0);
}

#[test]
fn test_synthetic_session_produces_consistent_report() {
    let profile = SyntheticProfile {
        distracted: true,
        ..SyntheticProfile::default()
    };
    let mut faces = SyntheticFaceSource::new(profile.clone());
    let mut poses = SyntheticPoseSource::new(profile);
    let mut session = TrackingSession::default();
    session.start_tracking();

    for _ in 0..1200 {
        let face = faces.next_observation();
        let pose = poses.next_observation();
        let result = session.analyze(face.as_ref(), Some(&pose));
        assert!((0.0..=1.0).contains(&result.attention));
        assert!((0.0..=1.0).contains(&result.movement_score));
        assert!(session.analyzer().attention_history().len() <= 30);
    }

    let report = session.generate_report();
    assert_eq!(report.total_frames, 1200);
    let emotions: f64 = report.emotion_breakdown.values().sum();
    let postures: f64 = report.posture_breakdown.values().sum();
    assert!((emotions - 1.0).abs() < 1e-9);
    assert!((postures - 1.0).abs() < 1e-9);
    assert!(report.suspicious_activity_count > 0);
}

#[test]
fn test_concurrent_sessions_are_isolated() {
    let registry = Arc::new(SessionRegistry::default());

    let handles: Vec<_> = [0.9, 0.2]
        .into_iter()
        .map(|attention| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let session = registry.create();
                let id = lock_session(&session).id();
                for _ in 0..100 {
                    lock_session(&session).analyze(Some(&face(attention, Emotion::Neutral)), None);
                }
                (id, attention)
            })
        })
        .collect();

    for handle in handles {
        let (id, attention) = handle.join().unwrap();
        let session = registry.get(&id).unwrap();
        let report = lock_session(&session).generate_report();
        assert_eq!(report.total_frames, 100);
        assert!((report.average_attention - attention).abs() < 1e-9);
    }
    assert_eq!(registry.len(), 2);
}

fn arb_face() -> impl Strategy<Value = FaceObservation> {
    (-0.5f64..1.5, 0usize..7, any::<bool>(), any::<bool>()).prop_map(
        |(attention, e, looking_away, excessive)| {
            let mut face = face(attention, Emotion::ALL[e]);
            face.looking_away = looking_away;
            face.head_movement.excessive_movement = excessive;
            face
        },
    )
}

fn arb_pose() -> impl Strategy<Value = PoseObservation> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(slouching, too_close, too_far)| {
        PoseObservation::with_posture(PostureFlags {
            slouching,
            too_close,
            too_far,
        })
    })
}

proptest! {
    #[test]
    fn test_report_breakdowns_normalized(
        ticks in proptest::collection::vec(
            (proptest::option::of(arb_face()), proptest::option::of(arb_pose())),
            1..150,
        ),
    ) {
        let mut session = TrackingSession::default();
        session.start_tracking();
        for (face, pose) in &ticks {
            let result = session.analyze(face.as_ref(), pose.as_ref());
            prop_assert!((0.0..=1.0).contains(&result.attention));
        }

        let report = session.generate_report();
        prop_assert_eq!(report.total_frames, ticks.len() as u64);
        let emotions: f64 = report.emotion_breakdown.values().sum();
        let postures: f64 = report.posture_breakdown.values().sum();
        prop_assert!((emotions - 1.0).abs() < 1e-9);
        prop_assert!((postures - 1.0).abs() < 1e-9);
        prop_assert!(report.suspicious_activity_count <= report.total_frames);
    }
}
