//! Lazy occurrence enumeration and random access by index.
//!
//! [`occurrences`] returns a pull-based iterator: the next date is computed
//! only when the consumer asks for it, so an unbounded rule is never
//! materialized. Calling it again reproduces the identical sequence.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use crate::advance;
use crate::error::{Result, ScheduleError};
use crate::rule::{Frequency, RecurrenceRule};

/// Iterator over the occurrences of one rule. Created by [`occurrences`].
///
/// Yields `Err` at most once, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    /// The earlier of the horizon and the rule's end date.
    limit: Option<NaiveDate>,
    emitted: u32,
    cursor: Cursor,
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    Start,
    After(NaiveDate),
    Done,
}

/// Enumerate the occurrences of `rule`, starting at `start_date`.
///
/// The sequence continues while the current date is at most `horizon` (when
/// given), at most `rule.end_date` (when set), and fewer than
/// `rule.end_after_occurrences` dates have been produced (when non-zero).
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidRuleConfiguration`] if the rule is invalid.
/// Errors from advancing are yielded as items.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{occurrences, RecurrenceRule};
///
/// let start = NaiveDate::from_ymd_opt(2014, 1, 15).unwrap();
/// let rule = RecurrenceRule::monthly(start).count(3);
/// let dates: Vec<_> = occurrences(&rule, None)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(dates.len(), 3);
/// ```
pub fn occurrences(rule: &RecurrenceRule, horizon: Option<NaiveDate>) -> Result<Occurrences<'_>> {
    rule.validate()?;
    let limit = match (horizon, rule.end_date) {
        (Some(h), Some(e)) => Some(h.min(e)),
        (h, e) => h.or(e),
    };
    Ok(Occurrences {
        rule,
        limit,
        emitted: 0,
        cursor: Cursor::Start,
    })
}

/// The 0-based `n`th occurrence of `rule`, ignoring any horizon.
///
/// # Errors
///
/// Returns [`ScheduleError::IndexOutOfRange`] when the rule ends (by count or
/// end date) before reaching `n`, or any error met while enumerating.
pub fn nth_occurrence(rule: &RecurrenceRule, n: usize) -> Result<NaiveDate> {
    let mut count = 0;
    for item in occurrences(rule, None)? {
        let date = item?;
        if count == n {
            return Ok(date);
        }
        count += 1;
    }
    Err(ScheduleError::IndexOutOfRange { index: n, count })
}

impl Occurrences<'_> {
    fn within_limit(&self, date: NaiveDate) -> bool {
        self.limit.map_or(true, |limit| date <= limit)
    }

    fn cap_reached(&self) -> bool {
        self.rule.end_after_occurrences != 0 && self.emitted >= self.rule.end_after_occurrences
    }

    /// A month that starts past the limit could not have produced an
    /// occurrence, so failing to land in it ends the sequence quietly.
    fn failure_is_past_limit(&self, err: &ScheduleError) -> bool {
        match (err, self.limit) {
            (ScheduleError::NonexistentCalendarDate { year, month, .. }, Some(limit)) => {
                NaiveDate::from_ymd_opt(*year, *month, 1).map_or(true, |first| first > limit)
            }
            _ => false,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Result<NaiveDate>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor;
        let candidate = match cursor {
            Cursor::Start => self.rule.start_date,
            Cursor::After(_) if self.rule.frequency == Frequency::None || self.cap_reached() => {
                self.cursor = Cursor::Done;
                return None;
            }
            Cursor::After(previous) => match advance::advance(self.rule, previous) {
                Ok(next) => next,
                Err(err) => {
                    self.cursor = Cursor::Done;
                    if self.failure_is_past_limit(&err) {
                        return None;
                    }
                    return Some(Err(err));
                }
            },
            Cursor::Done => return None,
        };

        if !self.within_limit(candidate) {
            self.cursor = Cursor::Done;
            return None;
        }
        self.emitted += 1;
        self.cursor = Cursor::After(candidate);
        Some(Ok(candidate))
    }
}

impl FusedIterator for Occurrences<'_> {}
