//! One pipeline cycle per frame: detect, track, map to lanes, optimize.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::emergency::{EmergencySource, NoEmergencies};
use crate::error::{Result, SignalError};
use crate::integration::{Detector, FrameSource};
use crate::lanes::{LaneAssignments, LaneMapper};
use crate::optimizer::SignalOptimizer;
use crate::tracker::{Tracker, build_tracker};
use crate::types::{EmergencyEvent, LaneStat, Splits};

/// Everything one cycle produced, owned so it can be handed to another thread.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutput {
    pub frame_id: u64,
    #[serde(skip)]
    pub timestamp: SystemTime,
    pub assignments: LaneAssignments,
    pub lane_stats: Vec<LaneStat>,
    pub splits: Splits,
    pub emergencies: Vec<EmergencyEvent>,
}

/// Receives each cycle's output. An error ends the run.
pub trait Presenter {
    fn present(&mut self, output: &CycleOutput) -> Result<()>;
}

impl<T: FnMut(&CycleOutput) -> Result<()>> Presenter for T {
    fn present(&mut self, output: &CycleOutput) -> Result<()> {
        self(output)
    }
}

/// Drives the pipeline for one camera.
///
/// The tracker and its state belong to the orchestrator and are only touched
/// from [`step`](Self::step).
pub struct Orchestrator<F, S, D> {
    source: S,
    detector: D,
    tracker: Box<dyn Tracker>,
    lane_mapper: LaneMapper,
    optimizer: SignalOptimizer,
    emergencies: Box<dyn EmergencySource>,
    approach_id: String,
    _frame: PhantomData<fn() -> F>,
}

impl<F, S, D> Orchestrator<F, S, D>
where
    S: FrameSource<F>,
    D: Detector<F>,
{
    pub fn new(source: S, detector: D, lane_mapper: LaneMapper, config: &PipelineConfig) -> Self {
        Self {
            source,
            detector,
            tracker: build_tracker(&config.tracker),
            lane_mapper,
            optimizer: SignalOptimizer::new(&config.optimizer),
            emergencies: Box::new(NoEmergencies),
            approach_id: config.approach_id.clone(),
            _frame: PhantomData,
        }
    }

    pub fn with_emergency_source(mut self, source: impl EmergencySource + 'static) -> Self {
        self.emergencies = Box::new(source);
        self
    }

    pub fn lane_mapper(&self) -> &LaneMapper {
        &self.lane_mapper
    }

    /// Run one cycle. `Ok(None)` means the frame source is exhausted.
    pub fn step(&mut self) -> Result<Option<CycleOutput>> {
        let Some(frame) = self
            .source
            .next_frame()
            .map_err(|e| SignalError::FrameSource(e.to_string()))?
        else {
            return Ok(None);
        };

        let detections = self
            .detector
            .infer(&frame.image, frame.frame_id, &self.approach_id)
            .map_err(|e| SignalError::Detector(e.to_string()))?;
        let tracks = self.tracker.update(&detections, frame.frame_id);

        let assignments = self.lane_mapper.assign_tracks(&tracks);
        let lane_stats = self.lane_mapper.compute_lane_stats(&assignments);

        let emergencies = self.emergencies.poll()?;
        let splits = self.optimizer.plan(&lane_stats);
        let splits = self.optimizer.apply_emergency_priority(splits, &emergencies);

        debug!(
            frame_id = frame.frame_id,
            detections = detections.len(),
            tracks = tracks.len(),
            in_lanes = assignments.total(),
            "cycle complete"
        );

        Ok(Some(CycleOutput {
            frame_id: frame.frame_id,
            timestamp: frame.timestamp,
            assignments,
            lane_stats,
            splits,
            emergencies,
        }))
    }

    /// Cycle until `stop` is set or the source runs dry, sleeping `pace`
    /// between cycles. `stop` is checked once per cycle. Returns the number of
    /// cycles completed.
    pub fn run<P: Presenter>(
        &mut self,
        stop: &AtomicBool,
        presenter: &mut P,
        pace: Option<Duration>,
    ) -> Result<u64> {
        let mut cycles = 0;
        while !stop.load(Ordering::Relaxed) {
            let Some(output) = self.step()? else {
                info!(cycles, "frame source exhausted");
                break;
            };
            presenter.present(&output)?;
            cycles += 1;
            if let Some(pace) = pace {
                std::thread::sleep(pace);
            }
        }
        Ok(cycles)
    }
}
