//! Background thread running an [`Orchestrator`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, TrySendError, bounded};
use tracing::{debug, warn};

use crate::error::{Result, SignalError};
use crate::integration::{CycleOutput, Detector, FrameSource, Orchestrator};

/// Runs the pipeline loop on its own thread and publishes every cycle's
/// output on a bounded channel.
///
/// The orchestrator and its tracker move onto the worker thread; readers only
/// see owned snapshots. When the channel is full the worker blocks, so a slow
/// reader slows the loop down. Dropping the receiver stops the worker.
pub struct PipelineWorker {
    stop: Arc<AtomicBool>,
    snapshots: Receiver<CycleOutput>,
    handle: JoinHandle<Result<u64>>,
}

impl PipelineWorker {
    pub fn spawn<F, S, D>(
        mut orchestrator: Orchestrator<F, S, D>,
        capacity: usize,
        pace: Option<Duration>,
    ) -> Result<Self>
    where
        F: 'static,
        S: FrameSource<F> + Send + 'static,
        D: Detector<F> + Send + 'static,
    {
        let (tx, rx) = bounded::<CycleOutput>(capacity);
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("smart-signal-pipeline".to_string())
            .spawn(move || {
                let mut publish = |output: &CycleOutput| -> Result<()> {
                    match tx.try_send(output.clone()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(output)) => {
                            if tx.send(output).is_err() {
                                worker_stop.store(true, Ordering::Relaxed);
                            }
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            debug!("snapshot receiver dropped, stopping");
                            worker_stop.store(true, Ordering::Relaxed);
                        }
                    }
                    Ok(())
                };
                orchestrator.run(&worker_stop, &mut publish, pace)
            })
            .map_err(SignalError::WorkerSpawn)?;

        Ok(Self {
            stop,
            snapshots: rx,
            handle,
        })
    }

    /// Cycle outputs in production order.
    pub fn snapshots(&self) -> &Receiver<CycleOutput> {
        &self.snapshots
    }

    /// Ask the worker to finish after the cycle in progress.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return the number of cycles it completed.
    pub fn join(self) -> Result<u64> {
        // A worker blocked on a full channel needs the receiver gone to wake.
        drop(self.snapshots);
        self.handle.join().map_err(|_| {
            warn!("pipeline worker panicked");
            SignalError::WorkerPanicked
        })?
    }
}
