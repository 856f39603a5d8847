//! The colony's final output: a tour dressed up with the derived start/end
//! and a human-readable schedule.

use crate::tour::Tour;
use crate::trip::Trip;
use chrono::{DateTime, Utc};

/// The plan handed back to a caller of [`crate::colony::Colony::plan`].
#[derive(Debug, Clone)]
pub struct Itinerary {
    pub tour: Tour,
    pub start_place: Option<usize>,
    pub end_place: Option<usize>,
    pub trip_end: DateTime<Utc>,
    pub total_distance: i64,
    pub schedule: String,
}

impl Itinerary {
    pub fn from_best(trip: &Trip, tour: Tour) -> Self {
        let start_place = tour.path.first().copied().or(trip.start_place);
        let end_place = tour.path.last().copied().or(trip.end_place);
        let trip_end = trip.trip_start + tour.total_duration;
        let total_distance = tour.total_distance;
        let schedule = format_schedule(trip, &tour, start_place, end_place);

        Itinerary { tour, start_place, end_place, trip_end, total_distance, schedule }
    }
}

/// One line per placed step: `"[<arrival> - <departure>] <name>, <address>"`.
/// `<departure>` drops the date when it falls on the same calendar day as
/// `<arrival>`. If the trip has a distinct end place not equal to the start,
/// a final line is appended for it. A loop trip (end equals start) gets no
/// extra trailing line.
fn format_schedule(trip: &Trip, tour: &Tour, start_place: Option<usize>, end_place: Option<usize>) -> String {
    let mut lines = Vec::new();

    for &index in &tour.path {
        // The loop-closing hop repeats the start index; it has no separate
        // arrival/departure entry of its own, so skip a duplicate line.
        if Some(index) == start_place && lines.len() == tour.path.len() - 1 && tour.is_loop {
            continue;
        }
        if let (Some(arrival), Some(departure)) = (tour.arrivals.get(&index), tour.departures.get(&index)) {
            let place = trip.place(index);
            lines.push(format!("[{} - {}] {}, {}", format_arrival(*arrival), format_departure(*arrival, *departure), place.name, place.address));
        }
    }

    if let (Some(end_index), Some(start_index)) = (trip.end_place, trip.start_place) {
        if end_index != start_index && Some(end_index) == end_place {
            if let (Some(arrival), Some(departure)) = (tour.arrivals.get(&end_index), tour.departures.get(&end_index)) {
                let place = trip.place(end_index);
                let line = format!("[{} - {}] {}, {}", format_arrival(*arrival), format_departure(*arrival, *departure), place.name, place.address);
                if lines.last() != Some(&line) {
                    lines.push(line);
                }
            }
        }
    }

    lines.join("\n")
}

fn format_arrival(t: DateTime<Utc>) -> String {
    t.format("%a %b %-d, %H:%M").to_string()
}

fn format_departure(arrival: DateTime<Utc>, departure: DateTime<Utc>) -> String {
    if arrival.date_naive() == departure.date_naive() {
        departure.format("%H:%M").to_string()
    } else {
        departure.format("%a %b %-d, %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::{OpeningHours, Place};
    use crate::trip::TravelMode;
    use chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Weekday};
    use std::collections::HashMap;

    fn wide_open(index: usize, name: &str) -> Place {
        let mut hours = HashMap::new();
        hours.insert(
            Weekday::Mon,
            OpeningHours {
                open: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            },
        );
        Place::new(index, name, format!("{name} address"), 5, 15, false, hours, FixedOffset::east_opt(0).unwrap())
    }

    #[test]
    fn same_day_departure_omits_the_date() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap();
        let trip = Trip {
            places: vec![wide_open(0, "Cafe"), wide_open(1, "Museum")],
            start_place: Some(0),
            end_place: None,
            trip_start: start,
            trip_end: start + Duration::hours(4),
            mode: TravelMode::Walking,
        };
        let mut tour = Tour::new();
        tour.set_start(0, start, 5);
        tour.append_step(1, 30, 1000, start + Duration::minutes(30), start + Duration::minutes(45), 5);
        let itinerary = Itinerary::from_best(&trip, tour);
        assert!(itinerary.schedule.contains("09:00 - 09:00"));
        assert!(itinerary.schedule.contains("09:30 - 09:45"));
    }

    #[test]
    fn loop_trip_has_no_trailing_duplicate_line() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 9, 0, 0).unwrap();
        let trip = Trip {
            places: vec![wide_open(0, "Hotel"), wide_open(1, "Park")],
            start_place: Some(0),
            end_place: Some(0),
            trip_start: start,
            trip_end: start + Duration::hours(4),
            mode: TravelMode::Walking,
        };
        let mut tour = Tour::new();
        tour.set_start(0, start, 5);
        tour.append_step(1, 30, 1000, start + Duration::minutes(30), start + Duration::minutes(45), 5);
        tour.close_loop(0, 30, 1000, start + Duration::minutes(75));
        let itinerary = Itinerary::from_best(&trip, tour);
        let line_count = itinerary.schedule.lines().count();
        assert_eq!(line_count, 2, "loop trip should not append an extra line for the closing hop");
    }
}
