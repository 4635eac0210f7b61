//! Phase control: turning splits and counts into which approach or lane is green.

mod clock;
mod priority_cycle;
mod schedule;
mod signal_timer;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use priority_cycle::{PhaseDecision, PriorityCycleController};
pub use schedule::SplitSchedule;
pub use signal_timer::{Light, SignalPhase, SignalState, SignalTimer};

/// Settings for the priority-cycle controller, in whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Approaches in their configured order; ties in priority keep this order.
    pub approaches: Vec<String>,
    pub min_green_s: u32,
    pub max_green_s: u32,
    pub yellow_s: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            approaches: ["N", "E", "S", "W"].map(String::from).to_vec(),
            min_green_s: 5,
            max_green_s: 20,
            yellow_s: 3,
        }
    }
}
