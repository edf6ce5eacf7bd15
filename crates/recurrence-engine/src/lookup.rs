//! Window lookups across many rules.
//!
//! [`lookup`] scans a collection of rules and yields every occurrence inside
//! `[window_start, window_end]`, tagged with its absolute 0-based index within
//! its rule. Results are grouped per rule, in collection order; they are not
//! sorted by date.
//!
//! A rule that fails while being enumerated does not stop the scan: by
//! default it is logged, recorded in [`Lookup::skipped`], and the lookup moves
//! on. Set [`LookupOptions::fail_fast`] to end the sequence with an error
//! instead.

use std::iter::{Enumerate, FusedIterator};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::occurrence::{occurrences, Occurrences};
use crate::rule::RecurrenceRule;

/// Options for [`lookup_with_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupOptions {
    /// Stop at the first failing rule and yield its error.
    pub fail_fast: bool,
}

/// One occurrence found by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookupHit<'r, T> {
    /// The occurrence date, inside the window.
    pub date: NaiveDate,
    /// The rule (or rule-carrying record) that produced it.
    pub rule: &'r T,
    /// 0-based index of this occurrence counted from the rule's start date.
    pub index: usize,
}

/// A rule skipped by a lenient lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    /// Position of the rule in the scanned collection.
    pub position: usize,
    pub error: ScheduleError,
}

/// Iterator returned by [`lookup`] and [`lookup_with_options`].
pub struct Lookup<'r, T, I> {
    window_start: NaiveDate,
    window_end: NaiveDate,
    fail_fast: bool,
    rules: Enumerate<I>,
    active: Option<ActiveRule<'r, T>>,
    skipped: Vec<SkippedRule>,
    halted: bool,
}

struct ActiveRule<'r, T> {
    position: usize,
    entry: &'r T,
    occurrences: Enumerate<Occurrences<'r>>,
}

/// Find every occurrence of `rules` between `window_start` and `window_end`
/// (both inclusive; `window_end` defaults to `window_start`).
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidWindow`] if `window_end < window_start`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::{lookup, RecurrenceRule};
///
/// let day = |d| NaiveDate::from_ymd_opt(2014, 6, d).unwrap();
/// let rules = vec![RecurrenceRule::daily(day(27)).every(3)];
/// let hits: Vec<_> = lookup(day(30), None, &rules)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!((hits[0].date, hits[0].index), (day(30), 1));
/// ```
pub fn lookup<'r, T, I>(
    window_start: NaiveDate,
    window_end: Option<NaiveDate>,
    rules: I,
) -> Result<Lookup<'r, T, I::IntoIter>>
where
    T: AsRef<RecurrenceRule> + 'r,
    I: IntoIterator<Item = &'r T>,
{
    lookup_with_options(window_start, window_end, rules, &LookupOptions::default())
}

/// [`lookup`] with explicit [`LookupOptions`].
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidWindow`] if `window_end < window_start`.
pub fn lookup_with_options<'r, T, I>(
    window_start: NaiveDate,
    window_end: Option<NaiveDate>,
    rules: I,
    options: &LookupOptions,
) -> Result<Lookup<'r, T, I::IntoIter>>
where
    T: AsRef<RecurrenceRule> + 'r,
    I: IntoIterator<Item = &'r T>,
{
    let window_end = window_end.unwrap_or(window_start);
    if window_end < window_start {
        return Err(ScheduleError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }
    tracing::debug!(%window_start, %window_end, fail_fast = options.fail_fast, "starting lookup");
    Ok(Lookup {
        window_start,
        window_end,
        fail_fast: options.fail_fast,
        rules: rules.into_iter().enumerate(),
        active: None,
        skipped: Vec::new(),
        halted: false,
    })
}

impl<'r, T, I> Lookup<'r, T, I>
where
    T: AsRef<RecurrenceRule> + 'r,
    I: Iterator<Item = &'r T>,
{
    /// Rules skipped so far because they failed. Always empty in fail-fast
    /// mode.
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    /// Handle a failing rule: either produce the error to yield (fail-fast)
    /// or record it and carry on.
    fn fail(&mut self, position: usize, error: ScheduleError) -> Option<ScheduleError> {
        if self.fail_fast {
            self.halted = true;
            return Some(ScheduleError::RuleFailed {
                position,
                source: Box::new(error),
            });
        }
        tracing::warn!(position, %error, "skipping rule during lookup");
        self.skipped.push(SkippedRule { position, error });
        None
    }
}

impl<'r, T, I> Iterator for Lookup<'r, T, I>
where
    T: AsRef<RecurrenceRule> + 'r,
    I: Iterator<Item = &'r T>,
{
    type Item = Result<LookupHit<'r, T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.halted {
                return None;
            }

            if let Some(active) = self.active.as_mut() {
                match active.occurrences.next() {
                    Some((index, Ok(date))) => {
                        if date >= self.window_start {
                            return Some(Ok(LookupHit {
                                date,
                                rule: active.entry,
                                index,
                            }));
                        }
                    }
                    Some((_, Err(error))) => {
                        let position = active.position;
                        self.active = None;
                        if let Some(error) = self.fail(position, error) {
                            return Some(Err(error));
                        }
                    }
                    None => self.active = None,
                }
                continue;
            }

            let (position, entry) = self.rules.next()?;
            let rule: &'r RecurrenceRule = entry.as_ref();
            if !rule.may_occur_within(self.window_start, self.window_end) {
                continue;
            }
            match occurrences(rule, Some(self.window_end)) {
                Ok(iter) => {
                    self.active = Some(ActiveRule {
                        position,
                        entry,
                        occurrences: iter.enumerate(),
                    });
                }
                Err(error) => {
                    if let Some(error) = self.fail(position, error) {
                        return Some(Err(error));
                    }
                }
            }
        }
    }
}

impl<'r, T, I> FusedIterator for Lookup<'r, T, I>
where
    T: AsRef<RecurrenceRule> + 'r,
    I: FusedIterator<Item = &'r T>,
{
}
