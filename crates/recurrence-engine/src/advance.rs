//! The per-frequency "next occurrence" algorithm.
//!
//! [`next_date`] is only defined when `date` is itself a valid occurrence of
//! the rule. The occurrence enumerator upholds that by always feeding back the
//! date it produced last.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar;
use crate::error::{Result, ScheduleError};
use crate::rule::{Frequency, MonthlyMode, RecurrenceRule};

/// Compute the occurrence of `rule` that follows `date`.
///
/// # Errors
///
/// - [`ScheduleError::UnsupportedFrequency`] for a [`Frequency::None`] rule.
/// - [`ScheduleError::InvalidRuleConfiguration`] if the rule fails
///   [`RecurrenceRule::validate`].
/// - [`ScheduleError::NonexistentCalendarDate`] when a day-of-month or yearly
///   advance lands on a day the target month does not have.
/// - [`ScheduleError::DateOutOfRange`] when the result is not representable.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{next_date, RecurrenceRule};
///
/// let start = NaiveDate::from_ymd_opt(2014, 6, 27).unwrap();
/// let rule = RecurrenceRule::daily(start).every(3);
/// assert_eq!(
///     next_date(&rule, start).unwrap(),
///     NaiveDate::from_ymd_opt(2014, 6, 30).unwrap()
/// );
/// ```
pub fn next_date(rule: &RecurrenceRule, date: NaiveDate) -> Result<NaiveDate> {
    rule.validate()?;
    advance(rule, date)
}

/// [`next_date`] without re-validating the rule.
pub(crate) fn advance(rule: &RecurrenceRule, date: NaiveDate) -> Result<NaiveDate> {
    match rule.frequency {
        Frequency::None => Err(ScheduleError::UnsupportedFrequency(
            "a rule with frequency 'none' does not repeat".to_string(),
        )),
        Frequency::Daily => calendar::add_days(date, u64::from(rule.interval)),
        Frequency::Weekly => next_weekly(rule, date),
        Frequency::Monthly => {
            let mut current = date;
            for _ in 0..rule.interval {
                current = match rule.monthly_mode {
                    MonthlyMode::ByDayOfMonth => calendar::add_month(current, current.day())?,
                    MonthlyMode::ByWeekdayOrdinal => add_month_by_weekday(current)?,
                };
            }
            Ok(current)
        }
        Frequency::Yearly => next_yearly(rule, date),
    }
}

/// Scan up to a week ahead for an active weekday, jumping over
/// `interval - 1` whole weeks whenever the scan reaches a Monday.
fn next_weekly(rule: &RecurrenceRule, date: NaiveDate) -> Result<NaiveDate> {
    let skipped_days = 7 * u64::from(rule.interval.saturating_sub(1));
    let mut current = date;
    for _ in 0..7 {
        current = calendar::add_days(current, 1)?;
        if current.weekday() == Weekday::Mon && skipped_days > 0 {
            current = calendar::add_days(current, skipped_days)?;
        }
        if rule.active_weekdays.contains(current.weekday()) {
            return Ok(current);
        }
    }
    Err(ScheduleError::InvalidRuleConfiguration(
        "weekly rule has no active weekdays".to_string(),
    ))
}

/// Move one month ahead while keeping "the Nth <weekday>" of the month,
/// or "the last <weekday>" when `date` is the last one.
fn add_month_by_weekday(date: NaiveDate) -> Result<NaiveDate> {
    let was_last = calendar::is_last_weekday_of_month(date);

    let mut candidate = calendar::shift_weeks(date, 4)?;
    // Four weeks can fall short of a full month.
    if calendar::ordinal_position(candidate) < calendar::ordinal_position(date) {
        candidate = calendar::shift_weeks(candidate, 1)?;
    }

    // Pin the candidate to exactly one month after `date`.
    let target = calendar::month_index(calendar::first_of_next_month(date)?);
    match calendar::month_index(candidate) - target {
        -1 => candidate = calendar::shift_weeks(candidate, 1)?,
        1 => candidate = calendar::shift_weeks(candidate, -1)?,
        _ => {}
    }

    if was_last && !calendar::is_last_weekday_of_month(candidate) {
        candidate = calendar::shift_weeks(candidate, 1)?;
    }
    Ok(candidate)
}

/// Same month and day as `start_date`, `interval` years after `date`.
/// A Feb 29 anchor falls back to Feb 28 in common years.
fn next_yearly(rule: &RecurrenceRule, date: NaiveDate) -> Result<NaiveDate> {
    let year = i32::try_from(rule.interval)
        .ok()
        .and_then(|interval| date.year().checked_add(interval))
        .filter(|year| NaiveDate::from_ymd_opt(*year, 1, 1).is_some())
        .ok_or_else(|| {
            ScheduleError::DateOutOfRange(format!("{date} +{} years", rule.interval))
        })?;

    let (month, day) = (rule.start_date.month(), rule.start_date.day());
    if let Some(next) = NaiveDate::from_ymd_opt(year, month, day) {
        return Ok(next);
    }
    if (month, day) == (2, 29) {
        if let Some(next) = NaiveDate::from_ymd_opt(year, 2, 28) {
            return Ok(next);
        }
    }
    Err(ScheduleError::NonexistentCalendarDate { year, month, day })
}
