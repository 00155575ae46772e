//! Admission checks run before an event is stored.
//!
//! Every request is shape-checked. Appointments are additionally compared
//! against the appointments already booked on the same day: two appointments
//! may not overlap. Adjacent appointments (one ends exactly when the other
//! starts) are NOT conflicts. Openings never conflict with anything.

use chrono::{NaiveDateTime, Timelike};

use crate::error::{ConflictError, Result, ShapeError};
use crate::event::{Event, EventKind, Interval, NewEvent};

/// Two half-open intervals overlap iff `a.start < b.end && b.start < a.end`.
pub fn overlaps(a: Interval, b: Interval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Minutes shared by `a` and `b`, zero when they do not overlap.
pub fn overlap_minutes(a: Interval, b: Interval) -> i64 {
    if !overlaps(a, b) {
        return 0;
    }
    (a.end.min(b.end) - a.start.max(b.start)).num_minutes()
}

/// Every stored appointment on the candidate's start date that overlaps it.
///
/// Openings in `existing` and appointments on other dates are skipped.
pub fn find_conflicts<'a>(candidate: Interval, existing: &'a [Event]) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|e| e.is_appointment() && e.date() == candidate.date())
        .filter(|e| overlaps(candidate, e.interval()))
        .collect()
}

fn on_half_hour(at: NaiveDateTime) -> bool {
    matches!(at.minute(), 0 | 30) && at.second() == 0 && at.nanosecond() == 0
}

fn check_boundary(field: &'static str, at: NaiveDateTime) -> std::result::Result<(), ShapeError> {
    if on_half_hour(at) {
        Ok(())
    } else {
        Err(ShapeError::OffBoundary { field, at })
    }
}

/// Validate `candidate` against the stored events it could collide with.
///
/// `existing` should hold at least the appointments on the candidate's start
/// date; anything else in it is ignored. Checks run in this order and the
/// first failure is returned:
///
/// 1. `kind` is `opening` or `appointment`.
/// 2. `ends_at` is after `starts_at`.
/// 3. Only openings recur weekly.
/// 4. An appointment overlaps no stored appointment on the same day.
/// 5. Both ends sit on a half-hour boundary.
///
/// A booking that both collides and sits off the grid is reported as a
/// conflict.
///
/// # Errors
/// [`crate::AdmissionError::Shape`] or [`crate::AdmissionError::Conflict`].
pub fn check(candidate: &NewEvent, existing: &[Event]) -> Result<EventKind> {
    let kind: EventKind = candidate.kind.parse()?;

    if candidate.ends_at <= candidate.starts_at {
        return Err(ShapeError::EmptyInterval {
            starts_at: candidate.starts_at,
            ends_at: candidate.ends_at,
        }
        .into());
    }

    if kind == EventKind::Appointment && candidate.weekly_recurring {
        return Err(ShapeError::RecurringAppointment.into());
    }

    if kind == EventKind::Appointment {
        let interval = candidate.interval();
        if let Some(existing) = find_conflicts(interval, existing).first() {
            return Err(ConflictError {
                existing_id: existing.id,
                existing_starts_at: existing.starts_at,
                existing_ends_at: existing.ends_at,
                overlap_minutes: overlap_minutes(interval, existing.interval()),
            }
            .into());
        }
    }

    check_boundary("starts_at", candidate.starts_at)?;
    check_boundary("ends_at", candidate.ends_at)?;

    Ok(kind)
}

/// Validate `candidate` and, on success, turn it into a stored [`Event`] with
/// the given `id`.
///
/// # Errors
/// Same as [`check`]. Nothing is produced on error.
pub fn admit(candidate: &NewEvent, existing: &[Event], id: u64) -> Result<Event> {
    let outcome = check(candidate, existing);

    match &outcome {
        Ok(kind) => tracing::debug!(id, %kind, starts_at = %candidate.starts_at, "admitted event"),
        Err(error) => tracing::debug!(kind = %candidate.kind, starts_at = %candidate.starts_at, %error, "rejected event"),
    }

    let kind = outcome?;
    Ok(Event {
        id,
        kind,
        starts_at: candidate.starts_at,
        ends_at: candidate.ends_at,
        weekly_recurring: candidate.weekly_recurring,
    })
}
