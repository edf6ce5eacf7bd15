//! Error types for recurrence-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Nonexistent calendar date: {year:04}-{month:02}-{day:02}")]
    NonexistentCalendarDate { year: i32, month: u32, day: u32 },

    #[error("Invalid rule configuration: {0}")]
    InvalidRuleConfiguration(String),

    #[error("Index out of range: occurrence {index} requested, rule has {count}")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid window: {start} is after {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Rule at position {position} failed: {source}")]
    RuleFailed {
        position: usize,
        #[source]
        source: Box<ScheduleError>,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
