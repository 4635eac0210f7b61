use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use smart_signal::control::{PriorityCycleController, SignalState, SignalTimer, SplitSchedule, SystemClock};
use smart_signal::emergency::FileEmergencyBus;
use smart_signal::integration::{Orchestrator, PipelineWorker, RecordedDetector, RecordedFrames};
use smart_signal::{LaneMapper, PipelineConfig, Splits};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smart-signal", about = "Adaptive signal timing from recorded vehicle detections")]
struct Args {
    /// GeoJSON FeatureCollection of lane polygons
    #[arg(long, value_name = "PATH")]
    lanes: PathBuf,
    /// Recorded detections, one JSON object per frame
    #[arg(long, value_name = "PATH")]
    detections: PathBuf,
    /// JSON array of emergency events, re-read whenever it changes
    #[arg(long, value_name = "PATH")]
    emergency: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Stop after this many cycles
    #[arg(long)]
    max_frames: Option<u64>,
    /// Sleep between cycles
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,
    #[arg(long, default_value_t = 16)]
    channel_capacity: usize,
}

#[derive(Serialize)]
struct CycleLine<'a> {
    frame_id: u64,
    tracks_per_lane: BTreeMap<&'a str, usize>,
    approach_counts: &'a BTreeMap<String, usize>,
    splits: &'a Splits,
    emergencies: usize,
    scheduled_green: Option<String>,
    signal: SignalState,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mapper = LaneMapper::from_path(&args.lanes)
        .with_context(|| format!("Failed to load lanes {}", args.lanes.display()))?;
    let frames = RecordedFrames::open(&args.detections)
        .with_context(|| format!("Failed to open detections {}", args.detections.display()))?;

    info!(
        lanes = mapper.lanes().len(),
        tracker = ?config.tracker.kind,
        policy = ?config.optimizer.policy,
        "starting pipeline"
    );

    let mut orchestrator = Orchestrator::new(frames, RecordedDetector, mapper.clone(), &config);
    if let Some(path) = &args.emergency {
        orchestrator = orchestrator.with_emergency_source(FileEmergencyBus::new(path));
    }
    let pace = (args.pace_ms > 0).then(|| Duration::from_millis(args.pace_ms));
    let worker = PipelineWorker::spawn(orchestrator, args.channel_capacity, pace)
        .context("Failed to start pipeline worker")?;

    let mut schedule = SplitSchedule::new(SystemClock::default());
    let mut timer = SignalTimer::new(PriorityCycleController::new(&config.controller));
    let mut stdout = BufWriter::new(std::io::stdout().lock());
    let mut printed = 0u64;

    for output in worker.snapshots() {
        // New allocations are adopted only at cycle boundaries.
        if schedule.has_completed() {
            schedule.load_splits(&output.splits.greens_s);
        }

        let counts = mapper.approach_counts(&output.assignments);
        let line = CycleLine {
            frame_id: output.frame_id,
            tracks_per_lane: output
                .assignments
                .iter()
                .map(|b| (b.lane_id.as_str(), b.tracks.len()))
                .collect(),
            approach_counts: &counts,
            splits: &output.splits,
            emergencies: output.emergencies.len(),
            scheduled_green: schedule.current_green().map(str::to_string),
            signal: timer.tick(&counts),
        };
        serde_json::to_writer(&mut stdout, &line).context("Failed to write cycle output")?;
        writeln!(stdout).context("Failed to write cycle output")?;

        printed += 1;
        if args.max_frames.is_some_and(|max| printed >= max) {
            worker.stop();
            break;
        }
    }
    stdout.flush().context("Failed to flush output")?;

    let cycles = worker.join().context("Pipeline failed")?;
    info!(cycles, printed, "pipeline finished");
    Ok(())
}
