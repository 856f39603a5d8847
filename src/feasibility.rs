//! The feasibility oracle: a pure predicate over opening windows, stay
//! durations, and trip/end-place deadlines.
//!
//! Nothing here is random and nothing here mutates anything; all the
//! randomness needed to build a tour lives in [`crate::agent`].

use crate::matrix::{DurationMinutes, TimeKeyedMatrix};
use crate::trip::Trip;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use thiserror::Error;

/// Why a candidate place could not be appended to an in-progress tour.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FeasibilityError {
    #[error("place is closed on arrival")]
    PlaceClosed,
    #[error("place closes before the stay could be completed")]
    PlaceClosesTooEarly,
    #[error("trip would end before the stay could be completed")]
    TripEndsTooEarly,
    #[error("visiting this place would make the end place unreachable in time")]
    CantReachEndPlace,
}

/// Where an in-progress tour currently stands.
pub struct AgentState {
    pub at_index: usize,
    pub current_time: DateTime<Utc>,
    pub is_first_step: bool,
}

/// A stateless feasibility check, grounded on the same sequence of steps a
/// Go service used to compute arrival/departure and end-place reachability.
pub struct FeasibilityOracle;

impl FeasibilityOracle {
    /// Can `candidate` be appended next, and if so, at what arrival/departure?
    pub fn reachable(
        trip: &Trip,
        durations: &TimeKeyedMatrix<DurationMinutes>,
        state: &AgentState,
        candidate: usize,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), FeasibilityError> {
        let place = trip.place(candidate);
        if place.permanently_closed {
            return Err(FeasibilityError::PlaceClosed);
        }

        let arrival = if state.is_first_step {
            state.current_time
        } else {
            let minutes = durations.at(state.at_index, candidate, state.current_time);
            state.current_time + Duration::minutes(minutes)
        };

        let local_arrival = arrival.with_timezone(&place.local_zone);
        let weekday = state.current_time.with_timezone(&place.local_zone).weekday();
        let hours = place.hours_on(weekday).ok_or(FeasibilityError::PlaceClosed)?;

        let open_abs = place
            .local_zone
            .from_local_datetime(&local_arrival.date_naive().and_time(hours.open))
            .single()
            .unwrap_or(local_arrival)
            .with_timezone(&Utc);
        let close_abs = place
            .local_zone
            .from_local_datetime(&local_arrival.date_naive().and_time(hours.close))
            .single()
            .unwrap_or(local_arrival)
            .with_timezone(&Utc);

        let departure = arrival.max(open_abs) + Duration::minutes(place.stay_duration_minutes);

        if close_abs < departure {
            return Err(FeasibilityError::PlaceClosesTooEarly);
        }
        if trip.trip_end < departure {
            return Err(FeasibilityError::TripEndsTooEarly);
        }

        if let Some(end_index) = trip.end_place {
            if end_index != candidate {
                let end_place = trip.place(end_index);
                let travel = durations.at(candidate, end_index, departure);
                let mut finish = departure + Duration::minutes(travel);
                if Some(end_index) != trip.start_place {
                    finish += Duration::minutes(end_place.stay_duration_minutes);
                }
                if trip.trip_end < finish {
                    return Err(FeasibilityError::CantReachEndPlace);
                }
            }
        }

        Ok((arrival, departure))
    }

    /// The unconditional loop-closing step: travel back to `start_place` with
    /// no stay and no window check (the start was already validated as open
    /// when the tour began).
    pub fn return_to_start(
        durations: &TimeKeyedMatrix<DurationMinutes>,
        state: &AgentState,
        start_index: usize,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let minutes = durations.at(state.at_index, start_index, state.current_time);
        let arrival = state.current_time + Duration::minutes(minutes);
        (arrival, arrival)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::{OpeningHours, Place};
    use crate::trip::TravelMode;
    use chrono::{FixedOffset, NaiveTime, TimeZone, Weekday};
    use std::collections::HashMap;

    fn open_place(index: usize, open: (u32, u32), close: (u32, u32), permanently_closed: bool) -> Place {
        let mut hours = HashMap::new();
        hours.insert(
            Weekday::Mon,
            OpeningHours {
                open: NaiveTime::from_hms_opt(open.0, open.1, 0).unwrap(),
                close: NaiveTime::from_hms_opt(close.0, close.1, 0).unwrap(),
            },
        );
        Place::new(index, format!("Place {index}"), "addr", 5, 15, permanently_closed, hours, FixedOffset::east_opt(0).unwrap())
    }

    fn flat_matrix(n: usize, minutes: i64, t: DateTime<Utc>) -> TimeKeyedMatrix<i64> {
        let mut m = TimeKeyedMatrix::new(n, vec![t], 0);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    m.set(i, j, t, minutes);
                }
            }
        }
        m
    }

    fn monday_9am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap()
    }

    #[test]
    fn rejects_permanently_closed_place() {
        let start = monday_9am();
        let a = open_place(0, (9, 0), (17, 0), false);
        let b = open_place(1, (9, 0), (17, 0), true);
        let trip = Trip {
            places: vec![a, b],
            start_place: Some(0),
            end_place: None,
            trip_start: start,
            trip_end: start + Duration::hours(8),
            mode: TravelMode::Walking,
        };
        let durations = flat_matrix(2, 30, start);
        let state = AgentState { at_index: 0, current_time: start, is_first_step: false };
        assert_eq!(FeasibilityOracle::reachable(&trip, &durations, &state, 1), Err(FeasibilityError::PlaceClosed));
    }

    #[test]
    fn rejects_arrival_after_close_minus_stay() {
        let start = monday_9am();
        let a = open_place(0, (9, 0), (17, 0), false);
        let b = open_place(1, (9, 0), (10, 40), false);
        let trip = Trip {
            places: vec![a, b],
            start_place: Some(0),
            end_place: None,
            trip_start: start + Duration::hours(1),
            trip_end: start + Duration::hours(9),
            mode: TravelMode::Walking,
        };
        let durations = flat_matrix(2, 30, start);
        let state = AgentState { at_index: 0, current_time: start + Duration::hours(1), is_first_step: false };
        assert_eq!(FeasibilityOracle::reachable(&trip, &durations, &state, 1), Err(FeasibilityError::PlaceClosesTooEarly));
    }

    #[test]
    fn accepts_simple_feasible_hop() {
        let start = monday_9am();
        let a = open_place(0, (9, 0), (17, 0), false);
        let b = open_place(1, (9, 0), (17, 0), false);
        let trip = Trip {
            places: vec![a, b],
            start_place: Some(0),
            end_place: None,
            trip_start: start,
            trip_end: start + Duration::hours(8),
            mode: TravelMode::Walking,
        };
        let durations = flat_matrix(2, 30, start);
        let state = AgentState { at_index: 0, current_time: start, is_first_step: false };
        let (arrival, departure) = FeasibilityOracle::reachable(&trip, &durations, &state, 1).unwrap();
        assert_eq!(arrival, start + Duration::minutes(30));
        assert_eq!(departure, start + Duration::minutes(45));
    }

    #[test]
    fn opening_window_weekday_is_taken_from_current_time_not_arrival() {
        // B is only ever open on Monday. The hop from A departs late Monday
        // and lands just after midnight on Tuesday: the weekday that governs
        // which opening window applies is the weekday of `current_time`
        // (Monday, before travel), not the weekday of `arrival` (Tuesday).
        let monday_late = Utc.with_ymd_and_hms(2026, 7, 27, 23, 50, 0).unwrap();
        let a = open_place(0, (0, 0), (23, 59), false);
        let b = open_place(1, (0, 0), (23, 59), false);
        let trip = Trip {
            places: vec![a, b],
            start_place: Some(0),
            end_place: None,
            trip_start: monday_late,
            trip_end: monday_late + Duration::days(2),
            mode: TravelMode::Walking,
        };
        let durations = flat_matrix(2, 20, monday_late);
        let state = AgentState { at_index: 0, current_time: monday_late, is_first_step: false };
        let (arrival, _) = FeasibilityOracle::reachable(&trip, &durations, &state, 1).unwrap();
        assert_eq!(arrival, monday_late + Duration::minutes(20));
    }

    #[test]
    fn rejects_when_end_place_becomes_unreachable() {
        let start = monday_9am();
        let a = open_place(0, (9, 0), (18, 0), false);
        let b = open_place(1, (9, 0), (18, 0), false);
        let c = open_place(2, (9, 0), (18, 0), false);
        let trip = Trip {
            places: vec![a, b, c],
            start_place: Some(0),
            end_place: Some(2),
            trip_start: start,
            trip_end: start + Duration::minutes(60),
            mode: TravelMode::Walking,
        };
        let durations = flat_matrix(3, 30, start);
        let state = AgentState { at_index: 0, current_time: start, is_first_step: false };
        assert_eq!(FeasibilityOracle::reachable(&trip, &durations, &state, 1), Err(FeasibilityError::CantReachEndPlace));
    }
}
