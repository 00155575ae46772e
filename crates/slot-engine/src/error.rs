//! Error types for event admission.
//!
//! Availability computation is total and has no error type of its own. Only
//! admitting a new event into the store can fail.

use chrono::NaiveDateTime;
use thiserror::Error;

/// A request that is malformed regardless of what is already stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Unknown event kind: '{0}' (expected 'opening' or 'appointment')")]
    UnknownKind(String),

    #[error("{field} must fall on a half-hour boundary, got {at}")]
    OffBoundary {
        field: &'static str,
        at: NaiveDateTime,
    },

    #[error("ends_at ({ends_at}) must be after starts_at ({starts_at})")]
    EmptyInterval {
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    },

    #[error("Only openings can recur weekly")]
    RecurringAppointment,
}

/// A candidate appointment that overlaps one already booked on the same day.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Appointment overlaps existing appointment #{existing_id} \
     ({existing_starts_at} - {existing_ends_at}) by {overlap_minutes} minutes"
)]
pub struct ConflictError {
    pub existing_id: u64,
    pub existing_starts_at: NaiveDateTime,
    pub existing_ends_at: NaiveDateTime,
    pub overlap_minutes: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

pub type Result<T> = std::result::Result<T, AdmissionError>;
