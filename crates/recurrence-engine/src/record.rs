//! The flat rule schema a storage layer persists.
//!
//! [`RuleRecord`] mirrors the stored columns one to one (seven weekday flags,
//! a boolean for the monthly mode) with the documented defaults, so records
//! written by older or partial producers still decode. Conversion into a
//! [`StoredRule`] validates the rule.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::rule::{Frequency, MonthlyMode, RecurrenceRule, WeekdaySet};

/// Stable identifier of a stored rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A validated rule together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredRule {
    pub id: RuleId,
    pub rule: RecurrenceRule,
}

impl StoredRule {
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidRuleConfiguration`] if `rule` is invalid.
    pub fn new(id: RuleId, rule: RecurrenceRule) -> Result<Self> {
        rule.validate()?;
        Ok(Self { id, rule })
    }
}

impl AsRef<RecurrenceRule> for StoredRule {
    fn as_ref(&self) -> &RecurrenceRule {
        &self.rule
    }
}

/// One stored rule, column by column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: RuleId,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_after_occurrences: u32,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub monthly_is_based_on_weekday: bool,
    #[serde(default)]
    pub monday: bool,
    #[serde(default)]
    pub tuesday: bool,
    #[serde(default)]
    pub wednesday: bool,
    #[serde(default)]
    pub thursday: bool,
    #[serde(default)]
    pub friday: bool,
    #[serde(default)]
    pub saturday: bool,
    #[serde(default)]
    pub sunday: bool,
}

fn default_interval() -> u32 {
    1
}

impl RuleRecord {
    fn weekday_flags(&self) -> [(Weekday, bool); 7] {
        [
            (Weekday::Mon, self.monday),
            (Weekday::Tue, self.tuesday),
            (Weekday::Wed, self.wednesday),
            (Weekday::Thu, self.thursday),
            (Weekday::Fri, self.friday),
            (Weekday::Sat, self.saturday),
            (Weekday::Sun, self.sunday),
        ]
    }

    /// The rule described by this record, without validation.
    pub fn to_rule(&self) -> RecurrenceRule {
        RecurrenceRule {
            start_date: self.start_date,
            end_date: self.end_date,
            end_after_occurrences: self.end_after_occurrences,
            frequency: self.frequency,
            interval: self.interval,
            monthly_mode: if self.monthly_is_based_on_weekday {
                MonthlyMode::ByWeekdayOrdinal
            } else {
                MonthlyMode::ByDayOfMonth
            },
            active_weekdays: self
                .weekday_flags()
                .into_iter()
                .filter_map(|(day, on)| on.then_some(day))
                .collect(),
        }
    }

    pub fn from_rule(id: RuleId, rule: &RecurrenceRule) -> Self {
        let days: WeekdaySet = rule.active_weekdays;
        Self {
            id,
            start_date: rule.start_date,
            end_date: rule.end_date,
            end_after_occurrences: rule.end_after_occurrences,
            frequency: rule.frequency,
            interval: rule.interval,
            monthly_is_based_on_weekday: rule.monthly_mode == MonthlyMode::ByWeekdayOrdinal,
            monday: days.contains(Weekday::Mon),
            tuesday: days.contains(Weekday::Tue),
            wednesday: days.contains(Weekday::Wed),
            thursday: days.contains(Weekday::Thu),
            friday: days.contains(Weekday::Fri),
            saturday: days.contains(Weekday::Sat),
            sunday: days.contains(Weekday::Sun),
        }
    }
}

impl TryFrom<RuleRecord> for StoredRule {
    type Error = ScheduleError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        StoredRule::new(record.id, record.to_rule())
    }
}

impl From<&StoredRule> for RuleRecord {
    fn from(stored: &StoredRule) -> Self {
        RuleRecord::from_rule(stored.id, &stored.rule)
    }
}

/// Decode a JSON array of rule records.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidRecord`] if the JSON is malformed or a
/// field has the wrong type or an unknown frequency name.
pub fn parse_records(json: &str) -> Result<Vec<RuleRecord>> {
    serde_json::from_str(json).map_err(|e| ScheduleError::InvalidRecord(e.to_string()))
}
