//! Time-keyed travel matrices and the shared pheromone field.
//!
//! `TimeKeyedMatrix` replicates an `n x n` matrix per sampled departure time
//! and resolves a query to the nearest sample. `PheromoneField` is the one
//! piece of state a running plan mutates concurrently; it follows a single
//! exclusive writer, many concurrent readers discipline, expressed directly
//! with `RwLock` rather than a plain mutex.

use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// A square matrix of `T`, replicated across a handful of sampled times.
///
/// Querying the diagonal (`i == j`) is a programming error: no place travels
/// to itself, and no sample ever carries a meaningful diagonal value.
pub struct TimeKeyedMatrix<T> {
    n: usize,
    samples: Vec<DateTime<Utc>>,
    values: Vec<Vec<Vec<T>>>,
}

impl<T: Clone> TimeKeyedMatrix<T> {
    /// Build a matrix over `n` places for the given sample times, each
    /// initialized with `fill`.
    pub fn new(n: usize, samples: Vec<DateTime<Utc>>, fill: T) -> Self {
        assert!(!samples.is_empty(), "TimeKeyedMatrix requires at least one sample time");
        let values = samples.iter().map(|_| vec![vec![fill.clone(); n]; n]).collect();
        TimeKeyedMatrix { n, samples, values }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn samples(&self) -> &[DateTime<Utc>] {
        &self.samples
    }

    /// Write the value for `(i, j)` at the sample exactly equal to `t`.
    ///
    /// Panics if `i == j` or if `t` is not one of the constructed sample times.
    pub fn set(&mut self, i: usize, j: usize, t: DateTime<Utc>, value: T) {
        debug_assert!(i != j, "TimeKeyedMatrix diagonal is undefined");
        let sample_idx = self
            .samples
            .iter()
            .position(|&s| s == t)
            .expect("set() called with a time that is not a sample point");
        self.values[sample_idx][i][j] = value;
    }

    /// Read the value for `(i, j)` nearest in time to `t`. Ties are broken by
    /// the earliest sample.
    pub fn at(&self, i: usize, j: usize, t: DateTime<Utc>) -> T {
        debug_assert!(i != j, "TimeKeyedMatrix diagonal is undefined");
        let nearest = self.nearest_sample_index(t);
        self.values[nearest][i][j].clone()
    }

    fn nearest_sample_index(&self, t: DateTime<Utc>) -> usize {
        let mut best = 0;
        let mut best_delta = (self.samples[0] - t).num_milliseconds().abs();
        for (idx, &sample) in self.samples.iter().enumerate().skip(1) {
            let delta = (sample - t).num_milliseconds().abs();
            if delta < best_delta {
                best = idx;
                best_delta = delta;
            }
        }
        best
    }
}

/// Minutes of travel time between two places at a given departure time.
pub type DurationMinutes = i64;
/// Meters of travel distance between two places at a given departure time.
pub type DistanceMeters = i64;

/// The shared learning matrix agents read from and the colony mutates.
///
/// Readers take the lock in shared mode and never block each other; mutators
/// take it exclusively. The colony is the only caller that ever mutates this
/// field — agents only ever call `at`.
pub struct PheromoneField {
    n: usize,
    cells: RwLock<Vec<Vec<f64>>>,
}

impl PheromoneField {
    /// Initialize an `n x n` field uniformly to `initial`.
    pub fn new(n: usize, initial: f64) -> Self {
        PheromoneField {
            n,
            cells: RwLock::new(vec![vec![initial; n]; n]),
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Read the current value at `(i, j)`.
    pub fn at(&self, i: usize, j: usize) -> f64 {
        let cells = self.cells.read().expect("pheromone field lock poisoned");
        cells[i][j]
    }

    /// Add `delta` to every edge along `path` (consecutive index pairs).
    pub fn intensify_along(&self, path: &[usize], delta: f64) {
        if path.len() < 2 || delta == 0.0 {
            return;
        }
        let mut cells = self.cells.write().expect("pheromone field lock poisoned");
        for window in path.windows(2) {
            let (from, to) = (window[0], window[1]);
            cells[from][to] += delta;
        }
    }

    /// Subtract `delta` from every cell, flooring at zero.
    pub fn evaporate(&self, delta: f64) {
        let mut cells = self.cells.write().expect("pheromone field lock poisoned");
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = (*cell - delta).max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::thread;

    fn sample_times() -> Vec<DateTime<Utc>> {
        vec![
            Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 7, 27, 13, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 7, 27, 17, 0, 0).unwrap(),
        ]
    }

    #[test]
    fn nearest_sample_breaks_ties_toward_earliest() {
        let mut m: TimeKeyedMatrix<i64> = TimeKeyedMatrix::new(2, sample_times(), 0);
        m.set(0, 1, sample_times()[0], 10);
        m.set(0, 1, sample_times()[1], 20);
        // Exactly between 09:00 and 13:00 is 11:00 -- closer to 09:00.
        let midpoint = Utc.with_ymd_and_hms(2026, 7, 27, 11, 0, 0).unwrap();
        assert_eq!(m.at(0, 1, midpoint), 10);
        // Exactly equidistant between 13:00 and 17:00 is 15:00 -- ties favor the earlier sample.
        let exact_tie = Utc.with_ymd_and_hms(2026, 7, 27, 15, 0, 0).unwrap();
        m.set(0, 1, sample_times()[2], 30);
        assert_eq!(m.at(0, 1, exact_tie), 20);
    }

    #[test]
    #[should_panic]
    fn diagonal_access_panics_in_debug() {
        let m: TimeKeyedMatrix<i64> = TimeKeyedMatrix::new(2, sample_times(), 0);
        let _ = m.at(0, 0, sample_times()[0]);
    }

    #[test]
    fn evaporate_floors_at_zero() {
        let field = PheromoneField::new(3, 1.0);
        field.evaporate(5.0);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(field.at(i, j), 0.0);
            }
        }
    }

    #[test]
    fn intensify_adds_only_along_the_path() {
        let field = PheromoneField::new(3, 1.0);
        field.intensify_along(&[0, 1], 2.0);
        assert_eq!(field.at(0, 1), 3.0);
        assert_eq!(field.at(1, 2), 1.0);
    }

    #[test]
    fn concurrent_reads_do_not_block_each_other() {
        let field = PheromoneField::new(4, 1.0);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        let _ = field.at(0, 1);
                    }
                });
            }
        });
    }
}
