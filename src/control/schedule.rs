//! Round-robin playback of a full split allocation.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::control::Clock;

/// Plays lanes in lexicographic `lane_id` order, each for its green time,
/// starting from the moment the splits were loaded. Once the whole allocation
/// has elapsed the schedule restarts at the first lane.
#[derive(Debug, Clone)]
pub struct SplitSchedule<C: Clock> {
    clock: C,
    greens_s: BTreeMap<String, f64>,
    order: Vec<String>,
    started: Option<Duration>,
}

impl<C: Clock> SplitSchedule<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            greens_s: BTreeMap::new(),
            order: Vec::new(),
            started: None,
        }
    }

    pub fn load_splits(&mut self, greens_s: &BTreeMap<String, f64>) {
        self.order = greens_s.keys().cloned().collect();
        self.greens_s = greens_s.clone();
        self.started = Some(self.clock.now());
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// True before any splits are loaded, for an empty allocation, and once
    /// the whole loaded allocation has played out.
    pub fn has_completed(&self) -> bool {
        let Some(started) = self.started else {
            return true;
        };
        let total: f64 = self.greens_s.values().sum();
        self.order.is_empty() || self.clock.now().saturating_sub(started).as_secs_f64() >= total
    }

    /// Lane currently green, or `None` before any non-empty splits are loaded.
    pub fn current_green(&mut self) -> Option<&str> {
        let started = self.started?;
        if self.order.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let t = now.saturating_sub(started).as_secs_f64();
        let mut elapsed = 0.0;
        let mut slot = None;
        for (idx, lane_id) in self.order.iter().enumerate() {
            let green = self.greens_s.get(lane_id).copied().unwrap_or(0.0);
            if t < elapsed + green {
                slot = Some(idx);
                break;
            }
            elapsed += green;
        }

        let idx = match slot {
            Some(idx) => idx,
            None => {
                self.started = Some(now);
                0
            }
        };
        Some(self.order[idx].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ManualClock;

    fn greens(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(l, g)| (l.to_string(), *g)).collect()
    }

    #[test]
    fn test_nothing_loaded() {
        let mut schedule = SplitSchedule::new(ManualClock::new());
        assert_eq!(schedule.current_green(), None);
        schedule.load_splits(&BTreeMap::new());
        assert_eq!(schedule.current_green(), None);
    }

    #[test]
    fn test_walks_lanes_in_lexicographic_order() {
        let clock = ManualClock::new();
        let mut schedule = SplitSchedule::new(clock.clone());
        schedule.load_splits(&greens(&[("W1", 5.0), ("E1", 10.0), ("N1", 20.0)]));
        assert_eq!(schedule.order(), ["E1", "N1", "W1"]);

        assert_eq!(schedule.current_green(), Some("E1"));
        clock.advance(Duration::from_secs_f64(9.5));
        assert_eq!(schedule.current_green(), Some("E1"));
        clock.advance(Duration::from_secs_f64(0.5));
        assert_eq!(schedule.current_green(), Some("N1"));
        clock.advance(Duration::from_secs(20));
        assert_eq!(schedule.current_green(), Some("W1"));
    }

    #[test]
    fn test_restarts_after_full_cycle() {
        let clock = ManualClock::new();
        let mut schedule = SplitSchedule::new(clock.clone());
        schedule.load_splits(&greens(&[("A", 10.0), ("B", 10.0)]));

        clock.advance(Duration::from_secs(25));
        // Exhausted: restarts at the first lane from now.
        assert_eq!(schedule.current_green(), Some("A"));
        clock.advance(Duration::from_secs(12));
        assert_eq!(schedule.current_green(), Some("B"));
    }

    #[test]
    fn test_completion_tracks_full_allocation() {
        let clock = ManualClock::new();
        let mut schedule = SplitSchedule::new(clock.clone());
        assert!(schedule.has_completed());

        schedule.load_splits(&greens(&[("A", 10.0), ("B", 5.0)]));
        assert!(!schedule.has_completed());
        clock.advance(Duration::from_secs(14));
        assert!(!schedule.has_completed());
        clock.advance(Duration::from_secs(1));
        assert!(schedule.has_completed());

        schedule.load_splits(&BTreeMap::new());
        assert!(schedule.has_completed());
    }

    #[test]
    fn test_reload_restarts_timing() {
        let clock = ManualClock::new();
        let mut schedule = SplitSchedule::new(clock.clone());
        schedule.load_splits(&greens(&[("A", 10.0), ("B", 10.0)]));
        clock.advance(Duration::from_secs(15));
        assert_eq!(schedule.current_green(), Some("B"));

        schedule.load_splits(&greens(&[("A", 10.0), ("B", 10.0)]));
        assert_eq!(schedule.current_green(), Some("A"));
    }
}
