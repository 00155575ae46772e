//! # slot-engine
//!
//! Weekly slot availability for a bookable calendar.
//!
//! Openings declare when a calendar is open for booking, either once or
//! every week from a given date. Appointments book part of that time. For any
//! start date the engine reports, day by day over the following 7 days, the
//! 30-minute slots that are open and not booked. It also guards writes: an
//! appointment that overlaps one already booked on the same day is refused.
//!
//! ## Modules
//!
//! - [`event`] — stored events and raw admission requests
//! - [`slots`] — interval → 30-minute slot labels
//! - [`expander`] — weekly openings → concrete occurrences in a window
//! - [`availability`] — per-day slot sets and the 7-day report
//! - [`conflict`] — admission checks and appointment overlap detection
//! - [`store`] — the storage seam and an in-memory store
//! - [`error`] — Error types

pub mod availability;
pub mod conflict;
pub mod error;
pub mod event;
pub mod expander;
pub mod slots;
pub mod store;

pub use availability::{compute_week, day_slots, list_openings, weekly_availability, DaySlotReport};
pub use conflict::{admit, find_conflicts};
pub use error::{AdmissionError, ConflictError, ShapeError};
pub use event::{Event, EventKind, Interval, NewEvent};
pub use expander::{expand_weekly, ProjectedOpening};
pub use slots::{slots, SlotLabel};
pub use store::{validate_appointment_admission, EventSource, MemoryStore};
