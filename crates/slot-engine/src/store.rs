//! The seam between availability computation and whatever stores events.
//!
//! [`EventSource`] is what the availability functions read through.
//! [`MemoryStore`] is an in-memory snapshot implementing it; every insert
//! goes through [`crate::conflict::admit`] first, so nothing malformed or
//! double-booked is ever stored.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::conflict;
use crate::error::{AdmissionError, Result};
use crate::event::{Event, NewEvent};

/// Read access to stored events.
pub trait EventSource {
    /// Non-recurring openings starting within `range`.
    fn fetch_openings(&self, range: RangeInclusive<NaiveDate>) -> Vec<Event>;

    /// Recurring openings starting on or before `up_to`.
    ///
    /// The availability functions pass the last day of the window, so a
    /// template declared inside the window still applies from its own date.
    fn fetch_recurring_opening_templates(&self, up_to: NaiveDate) -> Vec<Event>;

    /// Appointments starting within `range`.
    fn fetch_appointments(&self, range: RangeInclusive<NaiveDate>) -> Vec<Event>;

    /// Appointments starting on `date`.
    fn fetch_appointments_on_date(&self, date: NaiveDate) -> Vec<Event> {
        self.fetch_appointments(date..=date)
    }
}

/// Check whether `candidate` could be stored in `source` right now.
///
/// # Errors
/// The [`AdmissionError`] that would block the write.
pub fn validate_appointment_admission<S: EventSource + ?Sized>(
    source: &S,
    candidate: &NewEvent,
) -> Result<()> {
    let same_day = source.fetch_appointments_on_date(candidate.starts_at.date());
    conflict::check(candidate, &same_day).map(|_| ())
}

/// Events held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit and store `candidate`, returning the stored event.
    ///
    /// # Errors
    /// The [`AdmissionError`] from [`conflict::admit`]; the store is unchanged.
    pub fn insert(&mut self, candidate: NewEvent) -> Result<Event> {
        let same_day = self.fetch_appointments_on_date(candidate.starts_at.date());
        let event = conflict::admit(&candidate, &same_day, self.next_id + 1)?;
        self.next_id = event.id;
        self.events.push(event.clone());
        Ok(event)
    }

    /// Insert every request in order, keeping the ones that are admitted.
    ///
    /// Returns the store together with each rejected request and its error.
    pub fn from_requests<I>(requests: I) -> (Self, Vec<(NewEvent, AdmissionError)>)
    where
        I: IntoIterator<Item = NewEvent>,
    {
        let mut store = Self::new();
        let mut rejected = Vec::new();

        for request in requests {
            if let Err(error) = store.insert(request.clone()) {
                rejected.push((request, error));
            }
        }

        (store, rejected)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn select<F>(&self, predicate: F) -> Vec<Event>
    where
        F: Fn(&Event) -> bool,
    {
        self.events.iter().filter(|e| predicate(*e)).cloned().collect()
    }
}

impl EventSource for MemoryStore {
    fn fetch_openings(&self, range: RangeInclusive<NaiveDate>) -> Vec<Event> {
        self.select(|e| e.is_opening() && !e.weekly_recurring && range.contains(&e.date()))
    }

    fn fetch_recurring_opening_templates(&self, up_to: NaiveDate) -> Vec<Event> {
        self.select(|e| e.is_weekly_template() && e.date() <= up_to)
    }

    fn fetch_appointments(&self, range: RangeInclusive<NaiveDate>) -> Vec<Event> {
        self.select(|e| e.is_appointment() && range.contains(&e.date()))
    }
}
