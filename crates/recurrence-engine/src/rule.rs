//! The recurrence rule data model.
//!
//! A [`RecurrenceRule`] is an immutable value: the engine reads it, never
//! mutates it. Field semantics:
//!
//! - `start_date` is the first occurrence and, for yearly rules, the
//!   permanent source of month and day.
//! - `end_date` is an inclusive upper bound on occurrence dates.
//! - `end_after_occurrences` caps the occurrence count (`0` = unlimited).
//!   Both limits may be active; the sequence stops at whichever comes first.
//! - `interval` means "every N days/weeks/months/years" and must be ≥ 1.
//! - `monthly_mode` only matters for [`Frequency::Monthly`].
//! - `active_weekdays` only matters for [`Frequency::Weekly`] and must not
//!   be empty there.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::{Result, ScheduleError};
use crate::occurrence::Occurrences;

// ── Frequency ───────────────────────────────────────────────────────────────

/// The repetition class of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Exactly one occurrence, at `start_date`.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Frequency::None),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ScheduleError::UnsupportedFrequency(format!(
                "unrecognized frequency '{}'",
                s.trim()
            ))),
        }
    }
}

// ── Monthly mode ────────────────────────────────────────────────────────────

/// How a monthly rule carries its anchor from one month to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyMode {
    /// Keep the day-of-month number ("on the 15th").
    #[default]
    ByDayOfMonth,
    /// Keep "the Nth <weekday>" or "the last <weekday>" of the month.
    ByWeekdayOrdinal,
}

/// Where a weekday falls within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MonthPosition {
    /// 1-based occurrence of the weekday (`Nth(2)` = second Tuesday).
    Nth(u32),
    /// The final occurrence of the weekday in the month.
    Last,
}

// ── Weekday set ─────────────────────────────────────────────────────────────

/// A set of weekdays, stored as a 7-bit mask (bit 0 = Monday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !Self::bit(day);
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        const WEEK: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl<const N: usize> From<[Weekday; N]> for WeekdaySet {
    fn from(days: [Weekday; N]) -> Self {
        days.into_iter().collect()
    }
}

// ── RecurrenceRule ──────────────────────────────────────────────────────────

/// A recurring calendar rule. See the module docs for field semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub end_after_occurrences: u32,
    pub frequency: Frequency,
    pub interval: u32,
    pub monthly_mode: MonthlyMode,
    pub active_weekdays: WeekdaySet,
}

impl RecurrenceRule {
    fn new(start_date: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start_date,
            end_date: None,
            end_after_occurrences: 0,
            frequency,
            interval: 1,
            monthly_mode: MonthlyMode::ByDayOfMonth,
            active_weekdays: WeekdaySet::EMPTY,
        }
    }

    /// A single occurrence on `start_date`.
    pub fn once(start_date: NaiveDate) -> Self {
        Self::new(start_date, Frequency::None)
    }

    pub fn daily(start_date: NaiveDate) -> Self {
        Self::new(start_date, Frequency::Daily)
    }

    /// A weekly rule firing on `weekdays`.
    pub fn weekly(start_date: NaiveDate, weekdays: impl Into<WeekdaySet>) -> Self {
        Self::new(start_date, Frequency::Weekly).on(weekdays)
    }

    /// A monthly rule keeping the day-of-month. Chain
    /// [`by_weekday_ordinal`](Self::by_weekday_ordinal) for "Nth weekday".
    pub fn monthly(start_date: NaiveDate) -> Self {
        Self::new(start_date, Frequency::Monthly)
    }

    pub fn yearly(start_date: NaiveDate) -> Self {
        Self::new(start_date, Frequency::Yearly)
    }

    #[must_use]
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn count(mut self, occurrences: u32) -> Self {
        self.end_after_occurrences = occurrences;
        self
    }

    #[must_use]
    pub fn on(mut self, weekdays: impl Into<WeekdaySet>) -> Self {
        self.active_weekdays = weekdays.into();
        self
    }

    #[must_use]
    pub fn by_weekday_ordinal(mut self) -> Self {
        self.monthly_mode = MonthlyMode::ByWeekdayOrdinal;
        self
    }

    /// Check the rule's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidRuleConfiguration`] when `interval` is 0
    /// on a repeating rule, when `end_date` precedes `start_date`, or when a
    /// weekly rule has no active weekdays.
    pub fn validate(&self) -> Result<()> {
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ScheduleError::InvalidRuleConfiguration(format!(
                    "end date {end} is before start date {}",
                    self.start_date
                )));
            }
        }
        if self.frequency == Frequency::None {
            return Ok(());
        }
        if self.interval < 1 {
            return Err(ScheduleError::InvalidRuleConfiguration(format!(
                "{} rule has interval 0",
                self.frequency
            )));
        }
        if self.frequency == Frequency::Weekly && self.active_weekdays.is_empty() {
            return Err(ScheduleError::InvalidRuleConfiguration(
                "weekly rule has no active weekdays".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any occurrence could fall inside `[window_start, window_end]`,
    /// judged from the start and end dates alone. A single-occurrence rule
    /// ends on its start date.
    pub fn may_occur_within(&self, window_start: NaiveDate, window_end: NaiveDate) -> bool {
        let last = match self.frequency {
            Frequency::None => Some(self.start_date),
            _ => self.end_date,
        };
        self.start_date <= window_end && last.map_or(true, |end| end >= window_start)
    }

    /// The weekday a monthly-by-weekday rule follows.
    pub fn anchor_weekday(&self) -> Weekday {
        self.start_date.weekday()
    }

    /// The position within the month that a monthly-by-weekday rule follows.
    pub fn anchor_position(&self) -> MonthPosition {
        if calendar::is_last_weekday_of_month(self.start_date) {
            MonthPosition::Last
        } else {
            MonthPosition::Nth(calendar::ordinal_position(self.start_date) + 1)
        }
    }

    /// See [`crate::advance::next_date`].
    pub fn next_date(&self, date: NaiveDate) -> Result<NaiveDate> {
        crate::advance::next_date(self, date)
    }

    /// See [`crate::occurrence::occurrences`].
    pub fn occurrences(&self, horizon: Option<NaiveDate>) -> Result<Occurrences<'_>> {
        crate::occurrence::occurrences(self, horizon)
    }

    /// See [`crate::occurrence::nth_occurrence`].
    pub fn nth_occurrence(&self, n: usize) -> Result<NaiveDate> {
        crate::occurrence::nth_occurrence(self, n)
    }
}

impl AsRef<RecurrenceRule> for RecurrenceRule {
    fn as_ref(&self) -> &RecurrenceRule {
        self
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
