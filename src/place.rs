//! Places: the candidate stops a trip may visit.
//!
//! A `Place` is fully resolved before it reaches the planner: its priority,
//! stay duration, and opening hours are already known, and its id, address,
//! and timezone lookups (the job of some out-of-scope geocoding client) are
//! already done. Construction clamps a couple of fields defensively, mirroring
//! the validation a request-facing layer would already have performed.

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single day's opening window, in the place's own local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// A candidate stop on the trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    /// Stable position in the flat place table; matrices are indexed by this.
    pub index: usize,
    /// Display name, used only by the schedule formatter.
    pub name: String,
    /// Display address, used only by the schedule formatter.
    pub address: String,
    /// Interest score, clamped to [0, 10] at construction.
    pub priority: u8,
    /// Minimum time spent at the place once arrived, in minutes.
    pub stay_duration_minutes: i64,
    /// Permanently shut down; never reachable regardless of hour.
    pub permanently_closed: bool,
    /// Opening window per weekday. A missing entry means closed that day.
    pub opening_hours: HashMap<Weekday, OpeningHours>,
    /// Fixed UTC offset the place's opening hours are expressed in.
    pub local_zone: FixedOffset,
}

impl Place {
    /// Build a place, clamping priority to [0, 10] and stay duration to >= 0.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        address: impl Into<String>,
        priority: i32,
        stay_duration_minutes: i64,
        permanently_closed: bool,
        opening_hours: HashMap<Weekday, OpeningHours>,
        local_zone: FixedOffset,
    ) -> Self {
        Place {
            index,
            name: name.into(),
            address: address.into(),
            priority: priority.clamp(0, 10) as u8,
            stay_duration_minutes: stay_duration_minutes.max(0),
            permanently_closed,
            opening_hours,
            local_zone,
        }
    }

    /// The opening window for the given weekday, if the place is open that day.
    pub fn hours_on(&self, day: Weekday) -> Option<OpeningHours> {
        if self.permanently_closed {
            return None;
        }
        self.opening_hours.get(&day).copied()
    }
}
