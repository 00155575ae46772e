//! Stored events and raw admission requests.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

/// What an event declares about its time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The span is open for booking.
    Opening,
    /// The span is booked.
    Appointment,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Opening => "opening",
            EventKind::Appointment => "appointment",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opening" => Ok(EventKind::Opening),
            "appointment" => Ok(EventKind::Appointment),
            other => Err(ShapeError::UnknownKind(other.to_string())),
        }
    }
}

/// A half-open wall-clock interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Calendar date the interval belongs to. Intervals are bucketed by start.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// An admitted, stored event.
///
/// Only [`crate::conflict::admit`] produces these from requests, so every
/// `Event` in a store satisfies the half-hour grid and the
/// "only openings recur" rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub kind: EventKind,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub weekly_recurring: bool,
}

impl Event {
    pub fn interval(&self) -> Interval {
        Interval::new(self.starts_at, self.ends_at)
    }

    pub fn date(&self) -> NaiveDate {
        self.starts_at.date()
    }

    pub fn is_opening(&self) -> bool {
        self.kind == EventKind::Opening
    }

    pub fn is_appointment(&self) -> bool {
        self.kind == EventKind::Appointment
    }

    /// A recurring opening, i.e. a template for weekly projection.
    pub fn is_weekly_template(&self) -> bool {
        self.is_opening() && self.weekly_recurring
    }
}

impl From<&Event> for Interval {
    fn from(event: &Event) -> Self {
        event.interval()
    }
}

/// A request to store a new event, as it arrives from outside.
///
/// `kind` stays a plain string until admission so unknown kinds are reported
/// as a [`ShapeError`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub kind: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    #[serde(default)]
    pub weekly_recurring: bool,
}

impl NewEvent {
    pub fn new(kind: impl Into<String>, starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Self {
        Self {
            kind: kind.into(),
            starts_at,
            ends_at,
            weekly_recurring: false,
        }
    }

    pub fn opening(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Self {
        Self::new(EventKind::Opening.as_str(), starts_at, ends_at)
    }

    pub fn appointment(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Self {
        Self::new(EventKind::Appointment.as_str(), starts_at, ends_at)
    }

    pub fn weekly(mut self) -> Self {
        self.weekly_recurring = true;
        self
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.starts_at, self.ends_at)
    }
}

impl From<&Event> for NewEvent {
    fn from(event: &Event) -> Self {
        Self {
            kind: event.kind.as_str().to_string(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            weekly_recurring: event.weekly_recurring,
        }
    }
}
