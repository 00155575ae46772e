//! Weekly recurrence expansion -- projects recurring openings onto the days of
//! a query window.
//!
//! A recurring opening is stored once, on the date it was first declared. It
//! has no stored link to the dates it covers; instead each availability query
//! projects it onto the matching weekdays of its window. Projections are
//! transient [`ProjectedOpening`] values and never become stored [`Event`]s.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::availability::week_of;
use crate::event::{Event, Interval};

/// One occurrence of a recurring opening on a concrete day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedOpening {
    /// Id of the stored recurring opening this was projected from.
    pub template_id: u64,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
}

impl ProjectedOpening {
    pub fn interval(&self) -> Interval {
        Interval::new(self.starts_at, self.ends_at)
    }
}

impl From<&ProjectedOpening> for Interval {
    fn from(opening: &ProjectedOpening) -> Self {
        opening.interval()
    }
}

/// Shift `template` onto `day`, keeping its time of day and length.
///
/// Both ends move by the same whole-day offset
/// (`day - template.starts_at.date()`), so a template that runs past midnight
/// still does so after projection.
pub fn project(template: &Event, day: NaiveDate) -> ProjectedOpening {
    let offset = day.signed_duration_since(template.date());
    ProjectedOpening {
        template_id: template.id,
        starts_at: template.starts_at + offset,
        ends_at: template.ends_at + offset,
    }
}

/// Project every recurring opening in `templates` onto the 7-day window
/// starting at `from`.
///
/// A template lands on a day when the weekdays match and the day is not
/// before the template's own date; recurrence never reaches back in time.
/// Events that are not recurring openings are ignored. Output is ordered by
/// day, then by the order of `templates`.
pub fn expand_weekly(templates: &[Event], from: NaiveDate) -> Vec<ProjectedOpening> {
    let recurring: Vec<&Event> = templates
        .iter()
        .filter(|e| e.is_weekly_template())
        .collect();

    let mut projected = Vec::new();
    for day in week_of(from) {
        for template in &recurring {
            if template.starts_at.weekday() == day.weekday() && template.date() <= day {
                projected.push(project(template, day));
            }
        }
    }

    tracing::debug!(
        %from,
        templates = recurring.len(),
        projected = projected.len(),
        "expanded weekly openings"
    );

    projected
}
