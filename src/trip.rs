//! The trip request: what the caller wants planned.

use crate::place::Place;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mode of travel between places. A trip uses exactly one mode throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TravelMode {
    Walking,
    Bicycling,
    Transit,
    Driving,
}

/// A fully-resolved planning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub places: Vec<Place>,
    pub start_place: Option<usize>,
    pub end_place: Option<usize>,
    pub trip_start: DateTime<Utc>,
    pub trip_end: DateTime<Utc>,
    pub mode: TravelMode,
}

impl Trip {
    /// Number of candidate places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn place(&self, index: usize) -> &Place {
        &self.places[index]
    }

    /// True when the trip is a loop: start and end pinned to the same place.
    pub fn is_loop(&self) -> bool {
        matches!((self.start_place, self.end_place), (Some(s), Some(e)) if s == e)
    }
}
