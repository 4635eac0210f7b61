//! Busiest-approach-first cycling.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::control::ControllerConfig;

/// One served phase: which approach, for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseDecision {
    pub approach: String,
    pub green_s: u32,
    pub yellow_s: u32,
}

/// Visits every approach once per cycle, busiest first.
///
/// A cycle's order is fixed when it starts. When the last approach has been
/// served the order is dropped, and the next call re-sorts on the counts it
/// is given, so the visiting order can change from one cycle to the next.
#[derive(Debug, Clone)]
pub struct PriorityCycleController {
    approaches: Vec<String>,
    min_green_s: u32,
    max_green_s: u32,
    yellow_s: u32,
    priority_list: Vec<String>,
    current_idx: usize,
}

impl PriorityCycleController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            approaches: config.approaches.clone(),
            min_green_s: config.min_green_s,
            max_green_s: config.max_green_s,
            yellow_s: config.yellow_s,
            priority_list: Vec::new(),
            current_idx: 0,
        }
    }

    pub fn yellow_s(&self) -> u32 {
        self.yellow_s
    }

    /// Visiting order of the running cycle, empty if none is active.
    pub fn priority_list(&self) -> &[String] {
        &self.priority_list
    }

    pub fn is_cycling(&self) -> bool {
        !self.priority_list.is_empty()
    }

    /// Order approaches by count, descending. Equal counts keep configured order.
    pub fn start_cycle(&mut self, counts: &BTreeMap<String, usize>) {
        let count = |a: &String| counts.get(a).copied().unwrap_or(0);
        let mut order = self.approaches.clone();
        order.sort_by(|a, b| count(b).cmp(&count(a)));
        self.priority_list = order;
        self.current_idx = 0;
    }

    /// Serve the next approach of the cycle, starting a cycle first if needed.
    ///
    /// Green is `count * 2` seconds clamped into the configured bounds.
    /// Returns `None` only when no approaches are configured.
    pub fn next_phase(&mut self, counts: &BTreeMap<String, usize>) -> Option<PhaseDecision> {
        if self.priority_list.is_empty() {
            self.start_cycle(counts);
        }
        let approach = self.priority_list.get(self.current_idx)?.clone();

        let count = counts.get(&approach).copied().unwrap_or(0);
        let wanted = u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(2);
        let green_s = wanted.min(self.max_green_s).max(self.min_green_s);

        self.current_idx += 1;
        if self.current_idx >= self.priority_list.len() {
            self.priority_list.clear();
        }

        Some(PhaseDecision {
            approach,
            green_s,
            yellow_s: self.yellow_s,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(a, c)| (a.to_string(), *c)).collect()
    }

    fn controller() -> PriorityCycleController {
        PriorityCycleController::new(&ControllerConfig::default())
    }

    #[test]
    fn test_start_cycle_orders_by_count() {
        let mut c = controller();
        c.start_cycle(&counts(&[("N", 10), ("E", 2), ("S", 0), ("W", 5)]));
        assert_eq!(c.priority_list(), ["N", "W", "E", "S"]);
    }

    #[test]
    fn test_ties_keep_configured_order() {
        let mut c = controller();
        c.start_cycle(&counts(&[("N", 1), ("E", 3), ("S", 3), ("W", 1)]));
        assert_eq!(c.priority_list(), ["E", "S", "N", "W"]);
    }

    #[test]
    fn test_next_phase_walks_the_cycle() {
        let mut c = controller();
        let counts = counts(&[("N", 10), ("E", 2), ("S", 0), ("W", 5)]);

        let served: Vec<String> = (0..3)
            .map(|_| c.next_phase(&counts).unwrap().approach)
            .collect();
        assert_eq!(served, ["N", "W", "E"]);
        assert!(c.is_cycling());

        assert_eq!(c.next_phase(&counts).unwrap().approach, "S");
        assert!(!c.is_cycling());
    }

    #[test]
    fn test_fresh_cycle_uses_latest_counts() {
        let mut c = controller();
        let first = counts(&[("N", 10), ("E", 2), ("S", 0), ("W", 5)]);
        for _ in 0..4 {
            c.next_phase(&first);
        }
        let second = counts(&[("N", 0), ("E", 1), ("S", 9), ("W", 0)]);
        assert_eq!(c.next_phase(&second).unwrap().approach, "S");
        assert_eq!(c.priority_list(), ["S", "E", "N", "W"]);
    }

    #[test]
    fn test_green_is_clamped() {
        let mut c = controller();
        let counts = counts(&[("N", 30), ("E", 4), ("S", 1), ("W", 0)]);
        let greens: Vec<u32> = (0..4).map(|_| c.next_phase(&counts).unwrap().green_s).collect();
        assert_eq!(greens, [20, 8, 5, 5]);
        assert_eq!(c.next_phase(&counts).unwrap().yellow_s, 3);
    }

    #[test]
    fn test_no_approaches() {
        let mut c = PriorityCycleController::new(&ControllerConfig {
            approaches: Vec::new(),
            ..ControllerConfig::default()
        });
        assert!(c.next_phase(&BTreeMap::new()).is_none());
    }
}
