//! Tours: the ordered visit sequence an agent builds, and the lexicographic
//! ordering the colony uses to pick a winner.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One hop between two consecutive places in a tour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Step {
    pub from_index: usize,
    pub to_index: usize,
    pub duration_minutes: i64,
    pub distance_meters: i64,
}

/// An in-progress or finished visit plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub path: Vec<usize>,
    pub steps: Vec<Step>,
    pub arrivals: HashMap<usize, DateTime<Utc>>,
    pub departures: HashMap<usize, DateTime<Utc>>,
    pub total_duration: Duration,
    pub total_distance: i64,
    pub priority_sum: u32,
    pub is_loop: bool,
}

impl Tour {
    pub fn new() -> Self {
        Tour {
            path: Vec::new(),
            steps: Vec::new(),
            arrivals: HashMap::new(),
            departures: HashMap::new(),
            total_duration: Duration::zero(),
            total_distance: 0,
            priority_sum: 0,
            is_loop: false,
        }
    }

    /// Place the very first stop; no travel is incurred.
    pub fn set_start(&mut self, index: usize, arrival: DateTime<Utc>, priority: u8) {
        self.path.push(index);
        self.arrivals.insert(index, arrival);
        self.departures.insert(index, arrival);
        self.priority_sum += priority as u32;
    }

    /// Extend the tour with one more visited place.
    ///
    /// `total_duration` accrues the full wall-clock elapsed since the
    /// previous departure -- travel plus any wait for opening plus the
    /// stay -- not just the raw travel leg recorded on the `Step`.
    #[allow(clippy::too_many_arguments)]
    pub fn append_step(
        &mut self,
        to_index: usize,
        duration_minutes: i64,
        distance_meters: i64,
        arrival: DateTime<Utc>,
        departure: DateTime<Utc>,
        priority: u8,
    ) {
        let from_index = *self.path.last().expect("append_step called on an empty tour");
        let previous_departure = self.departures[&from_index];
        self.steps.push(Step { from_index, to_index, duration_minutes, distance_meters });
        self.path.push(to_index);
        self.arrivals.insert(to_index, arrival);
        self.departures.insert(to_index, departure);
        self.total_duration = self.total_duration + (departure - previous_departure);
        self.total_distance += distance_meters;
        self.priority_sum += priority as u32;
    }

    /// Append the unconditional loop-closing hop back to the start: travel
    /// only, no stay, no priority credit (the start was already counted).
    pub fn close_loop(&mut self, start_index: usize, duration_minutes: i64, distance_meters: i64, arrival: DateTime<Utc>) {
        let from_index = *self.path.last().expect("close_loop called on an empty tour");
        self.steps.push(Step { from_index, to_index: start_index, duration_minutes, distance_meters });
        self.path.push(start_index);
        self.total_duration = self.total_duration + Duration::minutes(duration_minutes);
        self.total_distance += distance_meters;
        self.is_loop = true;
    }

    /// Drop every stop from index `k` onward (used when an agent's
    /// construction is cut short mid-step).
    pub fn truncate(&mut self, k: usize) {
        self.path.truncate(k);
        self.steps.truncate(k.saturating_sub(1));
        let kept: std::collections::HashSet<usize> = self.path.iter().copied().collect();
        self.arrivals.retain(|idx, _| kept.contains(idx));
        self.departures.retain(|idx, _| kept.contains(idx));
    }

    /// Number of places visited (the loop-closing hop does not count twice).
    pub fn tour_length(&self) -> usize {
        self.path.len()
    }
}

impl Default for Tour {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tour (priority {}, length {})", self.priority_sum, self.tour_length())?;
        writeln!(f, "  Path: {:?}", self.path)?;
        writeln!(f, "  Total duration: {} min", self.total_duration.num_minutes())?;
        writeln!(f, "  Total distance: {} m", self.total_distance)
    }
}

/// A tour plus the scoring triple the colony compares on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourResult {
    pub tour: Tour,
}

impl TourResult {
    pub fn empty() -> Self {
        TourResult { tour: Tour::new() }
    }

    fn priority_sum(&self) -> u32 {
        self.tour.priority_sum
    }

    fn tour_length(&self) -> usize {
        self.tour.tour_length()
    }

    fn total_duration(&self) -> Duration {
        self.tour.total_duration
    }

    /// Lexicographic comparison: higher priority wins; ties broken by longer
    /// tour; remaining ties broken by shorter total duration.
    pub fn better_than(&self, other: &TourResult) -> bool {
        if self.priority_sum() != other.priority_sum() {
            return self.priority_sum() > other.priority_sum();
        }
        if self.tour_length() != other.tour_length() {
            return self.tour_length() > other.tour_length();
        }
        self.total_duration() < other.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn better_than_prefers_higher_priority_first() {
        let mut low = TourResult::empty();
        low.tour.priority_sum = 3;
        let mut high = TourResult::empty();
        high.tour.priority_sum = 5;
        assert!(high.better_than(&low));
        assert!(!low.better_than(&high));
    }

    #[test]
    fn better_than_breaks_priority_ties_with_longer_tour() {
        let mut short = TourResult::empty();
        short.tour.priority_sum = 5;
        short.tour.path = vec![0, 1];
        let mut long = TourResult::empty();
        long.tour.priority_sum = 5;
        long.tour.path = vec![0, 1, 2];
        assert!(long.better_than(&short));
    }

    #[test]
    fn better_than_breaks_remaining_ties_with_shorter_duration() {
        let mut slow = TourResult::empty();
        slow.tour.priority_sum = 5;
        slow.tour.path = vec![0, 1];
        slow.tour.total_duration = Duration::minutes(60);
        let mut fast = TourResult::empty();
        fast.tour.priority_sum = 5;
        fast.tour.path = vec![0, 1];
        fast.tour.total_duration = Duration::minutes(30);
        assert!(fast.better_than(&slow));
    }

    #[test]
    fn append_step_accumulates_totals() {
        let mut tour = Tour::new();
        tour.set_start(0, t(0), 5);
        // Travel takes 30 minutes but departure is t(45): the extra 15
        // minutes is time spent waiting for the place to open or staying,
        // and it belongs in total_duration even though the Step's own
        // duration_minutes only records the travel leg.
        tour.append_step(1, 30, 1000, t(30), t(45), 7);
        assert_eq!(tour.priority_sum, 12);
        assert_eq!(tour.total_duration, Duration::minutes(45));
        assert_eq!(tour.total_distance, 1000);
        assert_eq!(tour.path, vec![0, 1]);
    }

    #[test]
    fn truncate_drops_trailing_stops_and_their_timestamps() {
        let mut tour = Tour::new();
        tour.set_start(0, t(0), 5);
        tour.append_step(1, 30, 1000, t(30), t(45), 7);
        tour.append_step(2, 30, 1000, t(75), t(90), 2);
        tour.truncate(2);
        assert_eq!(tour.path, vec![0, 1]);
        assert_eq!(tour.steps.len(), 1);
        assert!(!tour.arrivals.contains_key(&2));
    }
}
