//! Cut half-open intervals into fixed 30-minute slots.
//!
//! A slot is identified by its wall-clock start time only. Labels render
//! without a leading zero on the hour (`9:30`, `10:00`) and order by time,
//! never by string, so `9:30` sorts before `10:00`.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of every slot.
pub const SLOT_MINUTES: i64 = 30;

/// Start time of one slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotLabel(NaiveTime);

impl SlotLabel {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for SlotLabel {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// Error returned when a string is not an `H:MM` slot label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSlotLabelError(String);

impl fmt::Display for ParseSlotLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid slot label: '{}'", self.0)
    }
}

impl std::error::Error for ParseSlotLabelError {}

impl FromStr for SlotLabel {
    type Err = ParseSlotLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSlotLabelError(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(err)?;
        if minute.len() != 2 {
            return Err(err());
        }
        let hour: u32 = hour.parse().map_err(|_| err())?;
        let minute: u32 = minute.parse().map_err(|_| err())?;
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(SlotLabel)
            .ok_or_else(err)
    }
}

impl Serialize for SlotLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Start times of every slot in `[start, end)`.
///
/// Steps by [`SLOT_MINUTES`] from `start` and keeps each step that begins
/// strictly before `end`. Empty when `end <= start`. An interval that crosses
/// midnight keeps emitting times of the following day.
pub fn slot_times(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveTime> {
    let step = Duration::minutes(SLOT_MINUTES);
    let mut times = Vec::new();
    let mut cursor = start;

    while cursor < end {
        times.push(cursor.time());
        cursor += step;
    }

    times
}

/// Slot labels covering `[start, end)`, in interval order.
pub fn slots(start: NaiveDateTime, end: NaiveDateTime) -> Vec<SlotLabel> {
    slot_times(start, end).into_iter().map(SlotLabel).collect()
}
