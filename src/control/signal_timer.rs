//! GREEN / YELLOW countdown over the priority cycle.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::control::PriorityCycleController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPhase {
    /// No approach chosen yet
    Idle,
    Green,
    Yellow,
}

/// What one approach's signal head shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    Green,
    Yellow,
    Red,
}

/// Published view of the timer after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalState {
    pub current_approach: Option<String>,
    pub phase: SignalPhase,
    pub green_left: u32,
    pub yellow_left: u32,
}

impl SignalState {
    pub fn light_for(&self, approach: &str) -> Light {
        match (&self.current_approach, self.phase) {
            (Some(current), SignalPhase::Green) if current == approach => Light::Green,
            (Some(current), SignalPhase::Yellow) if current == approach => Light::Yellow,
            _ => Light::Red,
        }
    }
}

/// Plays out [`PriorityCycleController`] decisions one second per tick.
///
/// Starts idle with both counters at zero; the first tick picks a phase.
/// Green counts down to zero, then yellow runs for the controller's yellow
/// duration, then the next phase is picked with the counts of that tick. A
/// phase granted zero green starts directly in yellow.
#[derive(Debug, Clone)]
pub struct SignalTimer {
    controller: PriorityCycleController,
    current_approach: Option<String>,
    phase: SignalPhase,
    green_left: u32,
    yellow_left: u32,
}

impl SignalTimer {
    pub fn new(controller: PriorityCycleController) -> Self {
        Self {
            controller,
            current_approach: None,
            phase: SignalPhase::Idle,
            green_left: 0,
            yellow_left: 0,
        }
    }

    pub fn controller(&self) -> &PriorityCycleController {
        &self.controller
    }

    pub fn state(&self) -> SignalState {
        SignalState {
            current_approach: self.current_approach.clone(),
            phase: self.phase,
            green_left: self.green_left,
            yellow_left: self.yellow_left,
        }
    }

    /// Advance one second.
    pub fn tick(&mut self, counts: &BTreeMap<String, usize>) -> SignalState {
        if self.green_left > 0 {
            self.green_left -= 1;
            if self.green_left == 0 {
                self.yellow_left = self.controller.yellow_s();
                self.phase = SignalPhase::Yellow;
            }
        } else if self.yellow_left > 0 {
            self.yellow_left -= 1;
            if self.yellow_left == 0 {
                self.advance(counts);
            }
        } else {
            self.advance(counts);
        }
        self.state()
    }

    fn advance(&mut self, counts: &BTreeMap<String, usize>) {
        match self.controller.next_phase(counts) {
            Some(decision) if decision.green_s == 0 => {
                self.current_approach = Some(decision.approach);
                self.green_left = 0;
                self.yellow_left = decision.yellow_s;
                self.phase = SignalPhase::Yellow;
            }
            Some(decision) => {
                self.current_approach = Some(decision.approach);
                self.green_left = decision.green_s;
                self.yellow_left = 0;
                self.phase = SignalPhase::Green;
            }
            None => {
                self.current_approach = None;
                self.phase = SignalPhase::Idle;
            }
        }
    }
}
