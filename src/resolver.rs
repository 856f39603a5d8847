//! The external collaborator that hands the colony its travel matrices.
//!
//! The real system would call out to a geocoding/distance-matrix provider;
//! this crate ships only a synthetic Haversine-based stand-in so the demo
//! CLI and tests have something concrete to run against.

use crate::matrix::{DistanceMeters, DurationMinutes, TimeKeyedMatrix};
use crate::place::Place;
use crate::trip::TravelMode;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("travel matrix provider failed: {0}")]
    ProviderFailed(String),
}

/// Supplies the time-keyed duration and distance matrices a colony needs to
/// plan a trip. Implementations may call out to a real routing service; this
/// trait only specifies the shape of what comes back.
pub trait InputResolver {
    fn resolve(
        &self,
        places: &[Place],
        sample_times: &[DateTime<Utc>],
        mode: TravelMode,
    ) -> Result<(TimeKeyedMatrix<DurationMinutes>, TimeKeyedMatrix<DistanceMeters>), ResolverError>;
}

/// Sampling stride policy: a 2-hour stride for trips of 12 hours or less,
/// else a 4-hour stride. Always includes `trip_start`; never samples past
/// `trip_end`.
pub fn sample_times(trip_start: DateTime<Utc>, trip_end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let span = trip_end - trip_start;
    let stride = if span <= Duration::hours(12) { Duration::hours(2) } else { Duration::hours(4) };

    let mut samples = Vec::new();
    let mut t = trip_start;
    while t <= trip_end {
        samples.push(t);
        t = t + stride;
    }
    if samples.is_empty() {
        samples.push(trip_start);
    }
    samples
}

/// Average speeds in meters per minute, used by [`HaversineResolver`] as a
/// stand-in for a real routing service's time-of-day-aware estimates.
fn speed_meters_per_minute(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Walking => 80.0,
        TravelMode::Bicycling => 250.0,
        TravelMode::Transit => 400.0,
        TravelMode::Driving => 500.0,
    }
}

fn haversine_meters(a: (f64, f64), b: (f64, f64)) -> f64 {
    const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// A constant-speed, great-circle-distance travel estimator. Not a
/// replacement for a real geocoding/distance-matrix client -- just enough
/// to make the demo CLI and tests runnable without network access.
pub struct HaversineResolver {
    /// (latitude, longitude) per place index, parallel to the place list.
    pub coordinates: Vec<(f64, f64)>,
}

impl InputResolver for HaversineResolver {
    fn resolve(
        &self,
        places: &[Place],
        sample_times: &[DateTime<Utc>],
        mode: TravelMode,
    ) -> Result<(TimeKeyedMatrix<DurationMinutes>, TimeKeyedMatrix<DistanceMeters>), ResolverError> {
        let n = places.len();
        if self.coordinates.len() != n {
            return Err(ResolverError::ProviderFailed(format!(
                "expected {} coordinates, got {}",
                n,
                self.coordinates.len()
            )));
        }

        let speed = speed_meters_per_minute(mode);
        let mut durations = TimeKeyedMatrix::new(n, sample_times.to_vec(), 0i64);
        let mut distances = TimeKeyedMatrix::new(n, sample_times.to_vec(), 0i64);

        for &t in sample_times {
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let meters = haversine_meters(self.coordinates[i], self.coordinates[j]);
                    let minutes = (meters / speed).ceil() as i64;
                    durations.set(i, j, t, minutes);
                    distances.set(i, j, t, meters.round() as i64);
                }
            }
        }

        Ok((durations, distances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn twelve_hour_trip_uses_two_hour_stride() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap();
        let end = start + Duration::hours(12);
        let samples = sample_times(start, end);
        assert_eq!(samples[1] - samples[0], Duration::hours(2));
    }

    #[test]
    fn just_over_twelve_hours_uses_four_hour_stride() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap();
        let end = start + Duration::hours(12) + Duration::minutes(1);
        let samples = sample_times(start, end);
        assert_eq!(samples[1] - samples[0], Duration::hours(4));
    }

    #[test]
    fn samples_always_include_trip_start() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap();
        let end = start + Duration::hours(6);
        let samples = sample_times(start, end);
        assert_eq!(samples[0], start);
    }

    #[test]
    fn haversine_resolver_rejects_mismatched_coordinates() {
        let resolver = HaversineResolver { coordinates: vec![(0.0, 0.0)] };
        let places: Vec<Place> = Vec::new();
        let err = resolver.resolve(&places, &[Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap()], TravelMode::Walking);
        assert!(err.is_err());
    }
}
