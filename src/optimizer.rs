//! Green-time allocation from lane statistics.
//!
//! The default policy is a max-pressure split proportional to queue length
//! over a fixed 60 s cycle; [`SignalOptimizer::webster_splits`] is an
//! alternative cycle-length policy. Clamping means the greens of a split do
//! not, in general, add up to `cycle_s`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{EmergencyEvent, LaneStat, Splits};

/// Cycle over which queue shares are scaled.
pub const PROPORTIONAL_CYCLE_S: f64 = 60.0;
/// Saturation flow assumed per lane, vehicles per hour.
const SATURATION_FLOW_VPH: f64 = 1800.0;
const MIN_FLOW_RATIO: f64 = 0.05;
const MAX_FLOW_RATIO: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    #[default]
    MaxPressure,
    Webster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub policy: SplitPolicy,
    pub min_green_s: f64,
    pub max_green_s: f64,
    pub lost_time_s: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            policy: SplitPolicy::MaxPressure,
            min_green_s: 7.0,
            max_green_s: 60.0,
            lost_time_s: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalOptimizer {
    policy: SplitPolicy,
    min_green_s: f64,
    max_green_s: f64,
    lost_time_s: f64,
}

impl Default for SignalOptimizer {
    fn default() -> Self {
        Self::new(&OptimizerConfig::default())
    }
}

impl SignalOptimizer {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            policy: config.policy,
            min_green_s: config.min_green_s,
            max_green_s: config.max_green_s,
            lost_time_s: config.lost_time_s,
        }
    }

    pub fn min_green_s(&self) -> f64 {
        self.min_green_s
    }

    pub fn max_green_s(&self) -> f64 {
        self.max_green_s
    }

    /// `min_green` wins if the bounds are inverted.
    fn clamp_green(&self, green: f64) -> f64 {
        green.min(self.max_green_s).max(self.min_green_s)
    }

    /// Splits under the configured policy.
    pub fn plan(&self, lane_stats: &[LaneStat]) -> Splits {
        match self.policy {
            SplitPolicy::MaxPressure => self.compute_splits(lane_stats),
            SplitPolicy::Webster => self.webster_splits(lane_stats),
        }
    }

    /// Max-pressure split: each lane gets its queue share of a 60 s cycle,
    /// clamped into `[min_green_s, max_green_s]`. With no queued vehicles at all
    /// every lane gets the midpoint of the bounds.
    pub fn compute_splits(&self, lane_stats: &[LaneStat]) -> Splits {
        let total_queue: usize = lane_stats.iter().map(|ls| ls.queue_len).sum();

        let greens_s = if total_queue == 0 {
            let equal = self
                .min_green_s
                .max((self.min_green_s + self.max_green_s) / 2.0);
            lane_stats
                .iter()
                .map(|ls| (ls.lane_id.clone(), equal))
                .collect()
        } else {
            lane_stats
                .iter()
                .map(|ls| {
                    let share = ls.queue_len as f64 / total_queue as f64;
                    (ls.lane_id.clone(), self.clamp_green(share * PROPORTIONAL_CYCLE_S))
                })
                .collect()
        };

        Splits {
            cycle_s: PROPORTIONAL_CYCLE_S,
            greens_s,
        }
    }

    /// Preempt for the first emergency only.
    ///
    /// Lanes whose id starts with the emergency's `approach_id` get
    /// `max_green_s`; every other lane is forced down to `min_green_s`.
    pub fn apply_emergency_priority(&self, mut splits: Splits, emergencies: &[EmergencyEvent]) -> Splits {
        let Some(emergency) = emergencies.first() else {
            return splits;
        };

        let approach = emergency.approach_id.as_str();
        for (lane_id, green) in splits.greens_s.iter_mut() {
            *green = if lane_id.starts_with(approach) {
                self.max_green_s
            } else {
                self.min_green_s
            };
        }

        info!(
            vehicle_id = %emergency.vehicle_id,
            approach = approach,
            ignored = emergencies.len() - 1,
            "emergency preemption applied"
        );
        splits
    }

    /// Webster-style equal split.
    ///
    /// Flow ratio `Y = sum(max(arrival_rate_vph, 1) / 1800)` clamped to
    /// `[0.05, 0.95]`, cycle `(1.5 L + 5) / (1 - Y)`, effective green
    /// `max(cycle - L, min_green * lanes)` divided equally and clamped.
    pub fn webster_splits(&self, lane_stats: &[LaneStat]) -> Splits {
        let flow_ratio: f64 = lane_stats
            .iter()
            .map(|ls| ls.arrival_rate_vph.max(1.0) / SATURATION_FLOW_VPH)
            .sum();
        let flow_ratio = flow_ratio.clamp(MIN_FLOW_RATIO, MAX_FLOW_RATIO);

        let cycle_s = (1.5 * self.lost_time_s + 5.0) / (1.0 - flow_ratio);
        let lanes = lane_stats.len();
        let effective_green = (cycle_s - self.lost_time_s).max(self.min_green_s * lanes as f64);
        let each = self.clamp_green(effective_green / lanes.max(1) as f64);

        let greens_s: BTreeMap<String, f64> = lane_stats
            .iter()
            .map(|ls| (ls.lane_id.clone(), each))
            .collect();

        Splits { cycle_s, greens_s }
    }
}
