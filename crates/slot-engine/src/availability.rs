//! Per-day and per-week slot availability.
//!
//! A slot is available on a day when at least one opening covers it and no
//! appointment does. Openings and appointments are cut into slots with
//! [`crate::slots::slot_times`], collected into one set per category (so
//! overlapping or duplicated openings collapse to a single slot), and the
//! appointment set is subtracted from the opening set. Declaration order never
//! matters: an opening added after an appointment does not bring its slots
//! back.
//!
//! Intervals are bucketed by the date they start on. Nothing is clipped at
//! the edges of the week window.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::event::{Event, Interval};
use crate::expander::{self, ProjectedOpening};
use crate::slots::{slot_times, slots, SlotLabel};
use crate::store::EventSource;

/// Number of days in a report.
pub const WEEK_DAYS: usize = 7;

/// How many days past the start date a report reaches.
pub const RANGE_OF_SEARCH_DAYS: usize = WEEK_DAYS - 1;

/// Available slots for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlotReport {
    pub date: NaiveDate,
    /// Chronologically sorted, no duplicates.
    pub slots: Vec<SlotLabel>,
}

impl DaySlotReport {
    /// Slots rendered as display strings, e.g. `["9:30", "10:00"]`.
    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The days of the window starting at `from`, in order.
///
/// Stops early at [`NaiveDate::MAX`]; see [`clamp_start`].
pub fn week_of(from: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..WEEK_DAYS as u64).map_while(move |offset| from.checked_add_days(Days::new(offset)))
}

/// Move `from` back so that a whole window fits before [`NaiveDate::MAX`].
///
/// Every other date is returned unchanged.
pub fn clamp_start(from: NaiveDate) -> NaiveDate {
    let latest = NaiveDate::MAX
        .checked_sub_days(Days::new(RANGE_OF_SEARCH_DAYS as u64))
        .unwrap_or(NaiveDate::MAX);
    from.min(latest)
}

/// Last day of the window starting at `from`.
pub fn window_end(from: NaiveDate) -> NaiveDate {
    week_of(from).last().unwrap_or(from)
}

fn in_window(date: NaiveDate, from: NaiveDate) -> bool {
    from <= date && date <= window_end(from)
}

/// Union of the slot start times of every interval that starts on `day`.
fn slot_set(day: NaiveDate, intervals: &[Interval]) -> BTreeSet<NaiveTime> {
    intervals
        .iter()
        .filter(|interval| interval.date() == day)
        .flat_map(|interval| slot_times(interval.start, interval.end))
        .collect()
}

/// Available slots on `day`: opening slots minus appointment slots.
///
/// Only intervals starting on `day` are considered. The result is sorted by
/// time of day and free of duplicates.
pub fn day_slots(day: NaiveDate, openings: &[Interval], appointments: &[Interval]) -> Vec<SlotLabel> {
    let open = slot_set(day, openings);
    let booked = slot_set(day, appointments);

    open.difference(&booked).copied().map(SlotLabel::new).collect()
}

/// Build the 7-day report starting at `from` from an in-memory snapshot.
///
/// - `openings` -- concrete openings; those starting inside the window are used.
/// - `templates` -- recurring openings to project onto the window.
/// - `appointments` -- appointments; those starting inside the window are used.
///
/// Events of the wrong kind in any argument are ignored. `from` goes
/// through [`clamp_start`].
pub fn compute_week(
    from: NaiveDate,
    openings: &[Event],
    templates: &[Event],
    appointments: &[Event],
) -> Vec<DaySlotReport> {
    let from = clamp_start(from);
    let projected = expander::expand_weekly(templates, from);

    let opening_intervals: Vec<Interval> = openings
        .iter()
        .filter(|e| e.is_opening() && in_window(e.date(), from))
        .map(Interval::from)
        .chain(projected.iter().map(Interval::from))
        .collect();

    let appointment_intervals: Vec<Interval> = appointments
        .iter()
        .filter(|e| e.is_appointment() && in_window(e.date(), from))
        .map(Interval::from)
        .collect();

    tracing::debug!(
        %from,
        openings = opening_intervals.len(),
        appointments = appointment_intervals.len(),
        "computing weekly availability"
    );

    week_of(from)
        .map(|date| DaySlotReport {
            date,
            slots: day_slots(date, &opening_intervals, &appointment_intervals),
        })
        .collect()
}

/// Build the 7-day report starting at `from`, reading events from `source`.
///
/// Always returns exactly [`WEEK_DAYS`] entries, one per day from `from`
/// onwards, even when `source` holds no events. A `from` less than a week
/// before [`NaiveDate::MAX`] is moved back by [`clamp_start`].
pub fn weekly_availability<S: EventSource + ?Sized>(source: &S, from: NaiveDate) -> Vec<DaySlotReport> {
    let from = clamp_start(from);
    let last = window_end(from);
    let openings = source.fetch_openings(from..=last);
    // Up to the last day: a template declared mid-window applies from its own date.
    let templates = source.fetch_recurring_opening_templates(last);
    let appointments = source.fetch_appointments(from..=last);

    compute_week(from, &openings, &templates, &appointments)
}

/// One entry per opening in the window starting at `from`, with that opening's
/// own slots.
///
/// Covers concrete openings starting in the window and the projections of
/// recurring openings onto it, ordered by start time. Appointments are not
/// subtracted; use [`weekly_availability`] for bookable slots.
pub fn list_openings<S: EventSource + ?Sized>(source: &S, from: NaiveDate) -> Vec<DaySlotReport> {
    let from = clamp_start(from);
    let last = window_end(from);
    let concrete = source.fetch_openings(from..=last);
    let templates = source.fetch_recurring_opening_templates(last);
    let projected: Vec<ProjectedOpening> = expander::expand_weekly(&templates, from);

    let mut intervals: Vec<Interval> = concrete
        .iter()
        .map(Interval::from)
        .chain(projected.iter().map(Interval::from))
        .collect();
    intervals.sort_by_key(|interval| (interval.start, interval.end));

    intervals
        .into_iter()
        .map(|interval| DaySlotReport {
            date: interval.date(),
            slots: slots(interval.start, interval.end),
        })
        .collect()
}
