//! Interview Tracker CLI
//!
//! Runs the tracking analysis engine over synthetic sources or recorded
//! observation streams.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use interview_tracking::{
    config::{Config, SourceConfig},
    core::{AnalysisResult, Frame, FrameAssembler},
    logging::init_logging,
    observation::{
        FaceObservation, FeedError, FeedSender, ObservationFeed, PoseObservation,
        SyntheticFaceSource, SyntheticPoseSource, SyntheticProfile, DEFAULT_FEED_CAPACITY,
    },
    session::TrackingSession,
    transparency::create_shared_log,
    SessionReport, MONITORING_DISCLOSURE, VERSION,
};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "interview-tracker")]
#[command(version = VERSION)]
#[command(about = "Behavioral tracking analysis for video interviews", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session over synthetic face and pose sources
    Simulate {
        /// Number of ticks to run (runs until Ctrl+C if omitted)
        #[arg(long)]
        ticks: Option<u64>,

        /// Sources to simulate (face, pose, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Insert periodic distraction phases
        #[arg(long)]
        distracted: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze recorded observations (JSON lines of {"face": ..., "pose": ...})
    Analyze {
        /// Input file (reads stdin if omitted)
        path: Option<PathBuf>,

        /// Print each per-frame result as a JSON line
        #[arg(long)]
        frames: bool,
    },

    /// Display the monitoring disclosure
    Disclosure,

    /// Show configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path:?}"))?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&logging);

    match cli.command {
        Commands::Simulate {
            ticks,
            sources,
            distracted,
            json,
        } => cmd_simulate(&config, ticks, &sources, distracted, json),
        Commands::Analyze { path, frames } => cmd_analyze(&config, path.as_deref(), frames),
        Commands::Disclosure => {
            cmd_disclosure();
            Ok(())
        }
        Commands::Config { init } => cmd_config(&config, &config_path, init),
    }
}

fn cmd_simulate(
    config: &Config,
    ticks: Option<u64>,
    sources: &str,
    distracted: bool,
    json: bool,
) -> Result<()> {
    let source_config = SourceConfig::from_csv(sources);
    if !source_config.any_enabled() {
        bail!("At least one source must be enabled (face or pose)");
    }
    let tz = config.timezone()?;

    println!("Interview Tracker v{VERSION}");
    println!();
    println!("Starting simulated session...");
    println!("  Face: {}", enabled(source_config.face));
    println!("  Pose: {}", enabled(source_config.pose));
    println!("  Distraction phases: {}", enabled(distracted));
    println!("  Tick interval: {}ms", config.tick_interval.as_millis());
    match ticks {
        Some(n) => println!("  Ticks: {n}"),
        None => println!("  Ticks: until Ctrl+C"),
    }
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(Arc::clone(&running))?;

    let feed = ObservationFeed::new(DEFAULT_FEED_CAPACITY);
    let profile = SyntheticProfile {
        fps: 1000.0 / config.tick_interval.as_millis().max(1) as f64,
        distracted,
        ..SyntheticProfile::default()
    };
    let producer = spawn_sources(
        feed.sender(),
        profile.clone(),
        source_config,
        config.tick_interval,
        ticks,
        Arc::clone(&running),
    );

    let log = create_shared_log();
    let mut assembler = FrameAssembler::new(config.observation_ttl_ticks);
    let mut session = TrackingSession::new(config.analyzer.clone());
    session.start_tracking();
    println!("Session ID: {}", session.id());
    println!();

    let status_every = profile.fps.round().max(1.0) as u64;
    let mut analyzed = 0u64;

    while running.load(Ordering::SeqCst) && ticks.map_or(true, |n| analyzed < n) {
        thread::sleep(config.tick_interval);

        assembler.process_events(feed.drain());
        let frame = assembler.next_frame();
        let result = session.analyze_frame(&frame);
        log.record_frame(&frame, &result);
        analyzed += 1;

        if analyzed % status_every == 0 {
            print_status(&result, config.analyzer.good_attention_threshold);
        }
    }

    running.store(false, Ordering::SeqCst);
    if producer.join().is_err() {
        warn!("Synthetic source thread panicked");
    }

    let report = session.generate_report();
    log.record_report_generated();

    println!();
    if json {
        print_report_json(&report)?;
    } else {
        println!("{}", report.summary(tz));
    }
    println!();
    println!("{}", log.summary());
    Ok(())
}

/// Run the synthetic sources on their own thread, pushing into the feed.
fn spawn_sources(
    sender: FeedSender,
    profile: SyntheticProfile,
    sources: SourceConfig,
    interval: Duration,
    ticks: Option<u64>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut face_source = SyntheticFaceSource::new(profile.clone());
        let mut pose_source = SyntheticPoseSource::new(profile);
        let mut produced = 0u64;

        while running.load(Ordering::SeqCst) && ticks.map_or(true, |n| produced < n) {
            let mut sent = Ok(());
            if sources.face {
                if let Some(face) = face_source.next_observation() {
                    sent = sent.and(sender.send_face(face));
                }
            }
            if sources.pose {
                sent = sent.and(sender.send_pose(pose_source.next_observation()));
            }

            match sent {
                Ok(()) => {}
                Err(FeedError::Full) => debug!("Observation feed full, dropping tick {produced}"),
                Err(FeedError::Disconnected) => break,
            }

            produced += 1;
            thread::sleep(interval);
        }
    })
}

fn cmd_analyze(config: &Config, path: Option<&Path>, print_frames: bool) -> Result<()> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {path:?}"))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let log = create_shared_log();
    let mut session = TrackingSession::new(config.analyzer.clone());
    session.start_tracking();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let frame = parse_frame_line(&line, line_no as u64);
        if frame.sanitized().is_empty() {
            debug!("Line {}: no usable observations", line_no + 1);
        }
        let result = session.analyze_frame(&frame);
        log.record_frame(&frame, &result);

        if print_frames {
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    let report = session.generate_report();
    log.record_report_generated();
    print_report_json(&report)?;
    debug!("{}", log.summary());
    Ok(())
}

/// Parse one recorded frame. Unparseable lines become an empty frame.
fn parse_frame_line(line: &str, tick: u64) -> Frame {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(value) => Frame {
            tick,
            face: value.get("face").and_then(FaceObservation::from_value),
            pose: value.get("pose").and_then(PoseObservation::from_value),
        },
        Err(e) => {
            warn!("Line {}: not valid JSON, treating as empty frame: {e}", tick + 1);
            Frame {
                tick,
                ..Frame::default()
            }
        }
    }
}

fn cmd_disclosure() {
    println!("{MONITORING_DISCLOSURE}");
}

fn cmd_config(config: &Config, path: &Path, init: bool) -> Result<()> {
    if init {
        Config::default()
            .save_to(path)
            .with_context(|| format!("Failed to write configuration to {path:?}"))?;
        println!("Wrote default configuration to {path:?}");
        return Ok(());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_status(result: &AnalysisResult, good_attention: f64) {
    println!(
        "[{}] attention {:>3.0}% ({}) | emotion {} | posture {} | movement {:.2}{}{}",
        Local::now().format("%H:%M:%S"),
        result.attention * 100.0,
        result.attention_level(),
        result.emotion_label(),
        result.posture_label(),
        result.movement_score,
        if result.is_attentive(good_attention) { "" } else { " | low attention" },
        if result.needs_attention() { " | SUSPICIOUS ACTIVITY" } else { "" },
    );
}

fn print_report_json(report: &SessionReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")
}
