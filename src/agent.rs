//! A single ant: one pass of tour construction, biased by the shared
//! pheromone field and limited by the feasibility oracle.

use crate::feasibility::{AgentState, FeasibilityOracle};
use crate::matrix::{DistanceMeters, DurationMinutes, PheromoneField, TimeKeyedMatrix};
use crate::tour::{Tour, TourResult};
use crate::trip::Trip;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Why tour construction stopped without an error: these are not failures,
/// just the three ways a construction pass can legitimately end.
enum Termination {
    TripEnded,
    MustReturnToStart,
    MustReachEndPlace,
}

/// One worker of the colony. Holds only read-only handles to the shared
/// state plus a private, seeded random source -- agents never share an RNG,
/// both to avoid contention and to keep a seeded colony run reproducible.
pub struct Agent<'a> {
    trip: &'a Trip,
    durations: &'a TimeKeyedMatrix<DurationMinutes>,
    distances: &'a TimeKeyedMatrix<DistanceMeters>,
    pheromones: &'a PheromoneField,
    rng: ChaCha8Rng,
}

impl<'a> Agent<'a> {
    pub fn new(
        trip: &'a Trip,
        durations: &'a TimeKeyedMatrix<DurationMinutes>,
        distances: &'a TimeKeyedMatrix<DistanceMeters>,
        pheromones: &'a PheromoneField,
        seed: u64,
    ) -> Self {
        Agent {
            trip,
            durations,
            distances,
            pheromones,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Build exactly one tour and return it, never panicking -- an
    /// infeasible trip yields an empty result, not an error.
    pub fn find_food(mut self) -> TourResult {
        let n = self.trip.len();
        let mut tour = Tour::new();
        let mut used = vec![false; n];

        let start_index = match self.seed_start() {
            Some(idx) => idx,
            None => return TourResult::empty(),
        };

        let start_arrival = self.trip.trip_start;
        tour.set_start(start_index, start_arrival, self.trip.place(start_index).priority);
        used[start_index] = true;
        let mut at = start_index;
        let mut current_time = start_arrival;
        let mut exhausted_early = false;

        for _ in 1..n {
            match self.pick_next(at, current_time, &used, start_index) {
                Ok((next, arrival, departure)) => {
                    let duration = self.durations.at(at, next, current_time);
                    let distance = self.distances.at(at, next, current_time);
                    tour.append_step(next, duration, distance, arrival, departure, self.trip.place(next).priority);
                    used[next] = true;
                    at = next;
                    current_time = departure;
                }
                Err(Termination::TripEnded) => {
                    exhausted_early = true;
                    break;
                }
                Err(Termination::MustReachEndPlace) => {
                    self.append_end_place(&mut tour, at, current_time);
                    exhausted_early = true;
                    break;
                }
                Err(Termination::MustReturnToStart) => {
                    if at != start_index {
                        self.append_loop_close(&mut tour, at, current_time, start_index);
                    }
                    exhausted_early = true;
                    break;
                }
            }
        }

        // Every other place got placed without exhausting the candidate pool:
        // a loop trip still needs its closing hop back to the start. This is
        // an "effective" loop, not just the pinned `start_place == end_place`
        // case: when no start is pinned, `seed_start` may itself have fallen
        // back to seeding at `end_place` (see `seed_start`), which makes this
        // tour a loop in every way that matters even though `trip.is_loop()`
        // only inspects the pinned fields. A single-place trip never left
        // the start, so there is nothing to close.
        if !exhausted_early && Some(start_index) == self.trip.end_place && at != start_index {
            self.append_loop_close(&mut tour, at, current_time, start_index);
        }

        TourResult { tour }
    }

    /// Choose the initial place. If the trip pins a start, use it. Otherwise
    /// pick uniformly among places reachable as a first step (excluding the
    /// end place), falling back to the end place, and finally giving up.
    fn seed_start(&mut self) -> Option<usize> {
        if let Some(start_index) = self.trip.start_place {
            return Some(start_index);
        }

        let state = AgentState { at_index: 0, current_time: self.trip.trip_start, is_first_step: true };
        let mut reachable: Vec<usize> = (0..self.trip.len())
            .filter(|&idx| Some(idx) != self.trip.end_place)
            .filter(|&idx| FeasibilityOracle::reachable(self.trip, self.durations, &state, idx).is_ok())
            .collect();

        if !reachable.is_empty() {
            reachable.shuffle(&mut self.rng);
            return reachable.first().copied();
        }

        self.trip.end_place
    }

    /// Select the next place to visit from `at`, using the feasibility
    /// oracle to build the candidate pool and a pheromone-weighted random
    /// draw to pick among it.
    fn pick_next(
        &mut self,
        at: usize,
        current_time: chrono::DateTime<chrono::Utc>,
        used: &[bool],
        start_index: usize,
    ) -> Result<(usize, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>), Termination> {
        let state = AgentState { at_index: at, current_time, is_first_step: false };

        let mut candidates: Vec<(usize, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>, f64)> = Vec::new();

        for candidate in 0..self.trip.len() {
            if used[candidate] || Some(candidate) == self.trip.end_place {
                continue;
            }
            if let Ok((arrival, departure)) = FeasibilityOracle::reachable(self.trip, self.durations, &state, candidate) {
                let weight = self.pheromones.at(at, candidate);
                candidates.push((candidate, arrival, departure, weight));
            }
        }

        if candidates.is_empty() {
            return Err(self.terminate(start_index));
        }

        let chosen = self.roulette_pick(&candidates);
        Ok((chosen.0, chosen.1, chosen.2))
    }

    /// Decide which termination applies once no candidate remains reachable.
    ///
    /// An "effective" loop is `start_index == end_place`, not just the
    /// pinned `trip.is_loop()` case: when no start is pinned, `seed_start`
    /// may itself have fallen back to seeding at `end_place`, and a tour
    /// that starts there is already at its end place, so it must not be
    /// routed through `MustReachEndPlace` a second time.
    fn terminate(&self, start_index: usize) -> Termination {
        if self.trip.is_loop() || Some(start_index) == self.trip.end_place {
            Termination::MustReturnToStart
        } else if self.trip.end_place.is_some() {
            Termination::MustReachEndPlace
        } else {
            Termination::TripEnded
        }
    }

    /// Pheromone-weighted draw over the reachable candidate set.
    ///
    /// Shuffles the candidates into a genuinely random order, then makes a
    /// single pass accepting each candidate with probability proportional
    /// to its pheromone weight; if the pass exhausts without an acceptance
    /// (a coin-flip near-miss, not a structural failure) it repeats. This
    /// always terminates as long as the total weight is positive, which the
    /// colony guarantees by keeping pheromone at a positive floor until an
    /// evaporation/intensify cycle runs. If every weight were ever exactly
    /// zero, fall back to a uniform pick rather than spinning forever.
    fn roulette_pick(&mut self, candidates: &[(usize, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>, f64)]) -> (usize, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) {
        let total: f64 = candidates.iter().map(|c| c.3).sum();
        if total <= 0.0 {
            let idx = self.rng.gen_range(0..candidates.len());
            let c = &candidates[idx];
            return (c.0, c.1, c.2);
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        loop {
            order.shuffle(&mut self.rng);
            for &idx in &order {
                let weight = candidates[idx].3;
                if self.rng.gen::<f64>() <= weight / total {
                    let c = &candidates[idx];
                    return (c.0, c.1, c.2);
                }
            }
        }
    }

    fn append_end_place(&self, tour: &mut Tour, at: usize, current_time: chrono::DateTime<chrono::Utc>) {
        let Some(end_index) = self.trip.end_place else { return };
        if at == end_index {
            // Already at the end place (seeded there by `seed_start`);
            // nothing to append.
            return;
        }
        let state = AgentState { at_index: at, current_time, is_first_step: false };
        if let Ok((arrival, departure)) = FeasibilityOracle::reachable(self.trip, self.durations, &state, end_index) {
            let duration = self.durations.at(at, end_index, current_time);
            let distance = self.distances.at(at, end_index, current_time);
            tour.append_step(end_index, duration, distance, arrival, departure, self.trip.place(end_index).priority);
        }
    }

    fn append_loop_close(&self, tour: &mut Tour, at: usize, current_time: chrono::DateTime<chrono::Utc>, start_index: usize) {
        let state = AgentState { at_index: at, current_time, is_first_step: false };
        let (arrival, _) = FeasibilityOracle::return_to_start(self.durations, &state, start_index);
        let duration = self.durations.at(at, start_index, current_time);
        let distance = self.distances.at(at, start_index, current_time);
        tour.close_loop(start_index, duration, distance, arrival);
    }
}
