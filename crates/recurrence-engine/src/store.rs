//! In-memory rule collection.
//!
//! [`RuleSet`] is the reference storage collaborator: it owns validated rules
//! keyed by [`RuleId`], answers the start/end-date candidate filter, and runs
//! lookups over itself or over a chosen subset of ids.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Result, ScheduleError};
use crate::lookup::{lookup_with_options, Lookup, LookupOptions};
use crate::record::{parse_records, RuleId, RuleRecord, StoredRule};
use crate::rule::RecurrenceRule;

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<RuleId, StoredRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from decoded records.
    ///
    /// # Errors
    ///
    /// Fails on the first record whose rule is invalid.
    pub fn from_records(records: impl IntoIterator<Item = RuleRecord>) -> Result<Self> {
        let mut set = Self::new();
        for record in records {
            let stored = StoredRule::try_from(record)?;
            set.rules.insert(stored.id, stored);
        }
        Ok(set)
    }

    /// Build a set from a JSON array of records.
    ///
    /// # Errors
    ///
    /// See [`parse_records`] and [`RuleSet::from_records`].
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_records(parse_records(json)?)
    }

    /// Records for every rule, ordered by id.
    pub fn to_records(&self) -> Vec<RuleRecord> {
        self.rules.values().map(RuleRecord::from).collect()
    }

    /// Insert or replace a rule, returning the previous one under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidRuleConfiguration`] if `rule` is invalid;
    /// the set is left unchanged.
    pub fn insert(&mut self, id: RuleId, rule: RecurrenceRule) -> Result<Option<StoredRule>> {
        let stored = StoredRule::new(id, rule)?;
        Ok(self.rules.insert(id, stored))
    }

    pub fn remove(&mut self, id: RuleId) -> Option<StoredRule> {
        self.rules.remove(&id)
    }

    pub fn get(&self, id: RuleId) -> Option<&StoredRule> {
        self.rules.get(&id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRule> + '_ {
        self.rules.values()
    }

    /// Rules whose start and end dates allow an occurrence inside the window.
    pub fn candidates(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> impl Iterator<Item = &StoredRule> + '_ {
        self.rules
            .values()
            .filter(move |stored| stored.rule.may_occur_within(window_start, window_end))
    }

    /// The stored rules among `ids`, in the order given. Unknown ids are
    /// ignored.
    pub fn select<'a, I>(&'a self, ids: I) -> impl Iterator<Item = &'a StoredRule> + 'a
    where
        I: IntoIterator<Item = RuleId>,
        I::IntoIter: 'a,
    {
        ids.into_iter().filter_map(move |id| self.rules.get(&id))
    }

    /// Run a lookup over every rule in the set.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidWindow`] if `window_end < window_start`.
    pub fn lookup(
        &self,
        window_start: NaiveDate,
        window_end: Option<NaiveDate>,
        options: &LookupOptions,
    ) -> Result<Lookup<'_, StoredRule, impl Iterator<Item = &StoredRule> + '_>> {
        let end = window_end.unwrap_or(window_start);
        lookup_with_options(window_start, window_end, self.candidates(window_start, end), options)
    }

    /// The `n`th occurrence of the rule stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidRecord`] for an unknown id, otherwise
    /// see [`crate::occurrence::nth_occurrence`].
    pub fn nth_occurrence(&self, id: RuleId, n: usize) -> Result<NaiveDate> {
        let stored = self
            .get(id)
            .ok_or_else(|| ScheduleError::InvalidRecord(format!("no rule with id {id}")))?;
        stored.rule.nth_occurrence(n)
    }
}
