//! # recurrence-engine
//!
//! Deterministic occurrence computation for recurring calendar rules.
//!
//! A rule repeats daily, weekly (on chosen weekdays), monthly (by day of month
//! or by "Nth weekday"), or yearly, every N units, optionally bounded by an end
//! date and/or an occurrence count. The engine computes next dates, enumerates
//! occurrences lazily, and finds which rules fire inside a date window.
//! Impossible calendar dates are reported as errors, never silently clamped
//! (except a Feb 29 yearly anchor, which falls back to Feb 28).
//!
//! ## Modules
//!
//! - [`calendar`] — Month and weekday arithmetic helpers
//! - [`rule`] — The rule model: frequency, monthly mode, weekday sets
//! - [`advance`] — Per-frequency "next occurrence" algorithm
//! - [`occurrence`] — Lazy occurrence enumeration and nth-occurrence access
//! - [`lookup`] — Window queries across many rules
//! - [`record`] — The flat storage schema and rule identifiers
//! - [`store`] — In-memory rule collection
//! - [`error`] — Error types

pub mod advance;
pub mod calendar;
pub mod error;
pub mod lookup;
pub mod occurrence;
pub mod record;
pub mod rule;
pub mod store;

pub use advance::next_date;
pub use error::ScheduleError;
pub use lookup::{lookup, lookup_with_options, Lookup, LookupHit, LookupOptions, SkippedRule};
pub use occurrence::{nth_occurrence, occurrences, Occurrences};
pub use record::{parse_records, RuleId, RuleRecord, StoredRule};
pub use rule::{Frequency, MonthPosition, MonthlyMode, RecurrenceRule, WeekdaySet};
pub use store::RuleSet;
