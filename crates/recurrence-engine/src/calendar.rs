//! Month and weekday arithmetic used by the date advancer.
//!
//! Everything here works on [`NaiveDate`] and reports leaving chrono's
//! representable range as [`ScheduleError::DateOutOfRange`] instead of
//! panicking.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::ScheduleError;

/// `date + days`, checked.
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, ScheduleError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(date, &format!("+{days} days")))
}

/// Shift a date by whole weeks in either direction, checked.
pub fn shift_weeks(date: NaiveDate, weeks: i64) -> Result<NaiveDate, ScheduleError> {
    let days = Days::new(weeks.unsigned_abs() * 7);
    let shifted = if weeks >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.ok_or_else(|| out_of_range(date, &format!("{weeks:+} weeks")))
}

/// The `(year, month)` immediately after the month containing `date`.
fn following_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    }
}

/// The date with day-of-month `day` in the month after `date`'s month.
///
/// Returns [`ScheduleError::NonexistentCalendarDate`] when that month has no
/// such day (e.g. day 31 into April). No clamping is applied.
pub fn add_month(date: NaiveDate, day: u32) -> Result<NaiveDate, ScheduleError> {
    let (year, month) = following_month(date);
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(out_of_range(date, "+1 month"));
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ScheduleError::NonexistentCalendarDate { year, month, day })
}

/// The first day of the month after `date`'s month.
pub fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    add_month(date, 1)
}

/// Absolute month number (`year * 12 + month0`), used to compare months
/// across year boundaries.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// 0-based index of this weekday's occurrence within its month
/// (the 2nd Tuesday has position 1).
pub fn ordinal_position(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7
}

/// Whether `date` is the last occurrence of its weekday in its month,
/// i.e. one week later falls in another month.
pub fn is_last_weekday_of_month(date: NaiveDate) -> bool {
    date.checked_add_days(Days::new(7))
        .map_or(true, |later| later.month() != date.month())
}

fn out_of_range(date: NaiveDate, step: &str) -> ScheduleError {
    ScheduleError::DateOutOfRange(format!("{date} {step}"))
}
