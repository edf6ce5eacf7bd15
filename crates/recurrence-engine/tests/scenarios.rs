//! End-to-end scenarios over a stored rule collection.

use chrono::{NaiveDate, Weekday};
use recurrence_engine::{
    lookup, occurrences, LookupOptions, RecurrenceRule, RuleId, RuleSet, StoredRule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn collect(rule: &RecurrenceRule, horizon: Option<NaiveDate>) -> Vec<NaiveDate> {
    occurrences(rule, horizon)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

const SIMPLE: RuleId = RuleId(1);
const EVERYDAY: RuleId = RuleId(2);
const EVERY_3_DAYS: RuleId = RuleId(3);
const EVERY_2_DAYS_UNTIL: RuleId = RuleId(4);
const EVERY_2_WEEKS_MWF: RuleId = RuleId(5);
const MONTHLY: RuleId = RuleId(6);
const MONTHLY_WEEKDAY: RuleId = RuleId(7);
const MONTHLY_FIRST_WEEKDAY: RuleId = RuleId(8);
const MONTHLY_LAST_WEEKDAY: RuleId = RuleId(9);
const FIVE_OCCURRENCES: RuleId = RuleId(10);
const YEARLY: RuleId = RuleId(11);

const RULES_JSON: &str = r#"[
    {"id": 1, "start_date": "2014-06-30"},
    {"id": 2, "start_date": "2014-06-30", "frequency": "daily"},
    {"id": 3, "start_date": "2014-06-27", "frequency": "daily", "interval": 3},
    {"id": 4, "start_date": "2014-06-28", "end_date": "2014-07-15",
     "frequency": "daily", "interval": 2},
    {"id": 5, "start_date": "2014-06-30", "frequency": "weekly", "interval": 2,
     "monday": true, "wednesday": true, "friday": true},
    {"id": 6, "start_date": "2014-01-15", "end_date": "2014-08-31", "frequency": "monthly"},
    {"id": 7, "start_date": "2014-01-15", "end_date": "2015-08-31", "frequency": "monthly",
     "monthly_is_based_on_weekday": true},
    {"id": 8, "start_date": "2014-01-01", "end_date": "2015-08-31", "frequency": "monthly",
     "monthly_is_based_on_weekday": true},
    {"id": 9, "start_date": "2014-01-29", "end_date": "2015-08-31", "frequency": "monthly",
     "interval": 2, "monthly_is_based_on_weekday": true},
    {"id": 10, "start_date": "2014-01-29", "end_after_occurrences": 5, "frequency": "monthly",
     "interval": 2, "monthly_is_based_on_weekday": true},
    {"id": 11, "start_date": "2012-02-29", "end_after_occurrences": 3, "frequency": "yearly",
     "interval": 2}
]"#;

fn rules() -> RuleSet {
    RuleSet::from_json(RULES_JSON).unwrap()
}

fn rule(set: &RuleSet, id: RuleId) -> &RecurrenceRule {
    &set.get(id).unwrap().rule
}

fn lookup_all(
    set: &RuleSet,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Vec<(NaiveDate, RuleId, usize)> {
    set.lookup(start, end, &LookupOptions::default())
        .unwrap()
        .map(|hit| {
            let hit = hit.unwrap();
            (hit.date, hit.rule.id, hit.index)
        })
        .collect()
}

// ── lookup ──────────────────────────────────────────────────────────────────

#[test]
fn test_lookup_simple() {
    let found = lookup_all(&rules(), date(2014, 6, 30), None);
    assert!(found.contains(&(date(2014, 6, 30), SIMPLE, 0)));
}

#[test]
fn test_lookup_every_3_days() {
    let found = lookup_all(&rules(), date(2014, 6, 30), None);
    assert!(found.contains(&(date(2014, 6, 30), EVERY_3_DAYS, 1)));
}

#[test]
fn test_lookup_every_2_days_until() {
    let found = lookup_all(&rules(), date(2014, 6, 30), None);
    assert!(found.contains(&(date(2014, 6, 30), EVERY_2_DAYS_UNTIL, 1)));
}

#[test]
fn test_lookup_period() {
    let found: Vec<_> = lookup_all(&rules(), date(2014, 7, 7), Some(date(2014, 7, 30)))
        .into_iter()
        .map(|(d, id, _)| (d, id))
        .collect();
    assert!(!found.is_empty());

    assert!(!found.contains(&(date(2014, 7, 6), EVERYDAY)));
    assert!(found.contains(&(date(2014, 7, 7), EVERYDAY)));
    assert!(found.contains(&(date(2014, 7, 30), EVERYDAY)));
    assert!(!found.contains(&(date(2014, 7, 31), EVERYDAY)));

    assert!(found.contains(&(date(2014, 7, 14), EVERY_2_DAYS_UNTIL)));
    assert!(!found.contains(&(date(2014, 7, 16), EVERY_2_DAYS_UNTIL)));

    assert!(!found.contains(&(date(2014, 7, 6), EVERY_3_DAYS)));
    assert!(found.contains(&(date(2014, 7, 9), EVERY_3_DAYS)));
    assert!(found.contains(&(date(2014, 7, 30), EVERY_3_DAYS)));
    assert!(!found.contains(&(date(2014, 8, 2), EVERY_3_DAYS)));

    assert!(found.contains(&(date(2014, 7, 14), EVERY_2_WEEKS_MWF)));
    assert!(found.contains(&(date(2014, 7, 28), EVERY_2_WEEKS_MWF)));

    // The single-occurrence rule is on 2014-06-30, outside the window.
    assert!(found.iter().all(|(_, id)| *id != SIMPLE));
}

#[test]
fn test_lookup_has_no_duplicates_per_rule() {
    let mut found = lookup_all(&rules(), date(2014, 1, 1), Some(date(2015, 12, 31)));
    let total = found.len();
    found.sort();
    found.dedup();
    assert_eq!(found.len(), total);
}

#[test]
fn test_lookup_end_after_occurrences() {
    let set = rules();
    let found: Vec<_> = lookup(
        date(2014, 1, 1),
        Some(date(2014, 12, 31)),
        set.select([FIVE_OCCURRENCES]),
    )
    .unwrap()
    .map(|hit| {
        let hit = hit.unwrap();
        (hit.date, hit.rule.id, hit.index)
    })
    .collect();
    assert_eq!(
        found,
        vec![
            (date(2014, 1, 29), FIVE_OCCURRENCES, 0),
            (date(2014, 3, 26), FIVE_OCCURRENCES, 1),
            (date(2014, 5, 28), FIVE_OCCURRENCES, 2),
            (date(2014, 7, 30), FIVE_OCCURRENCES, 3),
            (date(2014, 9, 24), FIVE_OCCURRENCES, 4),
        ]
    );
}

#[test]
fn test_lookup_yearly() {
    let set = rules();
    let found: Vec<_> = lookup(
        date(2012, 1, 1),
        Some(date(2020, 12, 31)),
        set.select([YEARLY]),
    )
    .unwrap()
    .map(|hit| {
        let hit = hit.unwrap();
        (hit.date, hit.index)
    })
    .collect();
    assert_eq!(
        found,
        vec![
            (date(2012, 2, 29), 0),
            (date(2014, 2, 28), 1),
            (date(2016, 2, 29), 2),
        ]
    );
}

#[test]
fn test_lookup_over_plain_stored_rules() {
    let stored = vec![
        StoredRule::new(RuleId(1), RecurrenceRule::daily(date(2014, 6, 27)).every(3)).unwrap(),
        StoredRule::new(RuleId(2), RecurrenceRule::once(date(2014, 6, 30))).unwrap(),
    ];
    let ids: Vec<_> = lookup(date(2014, 6, 30), None, &stored)
        .unwrap()
        .map(|hit| hit.unwrap().rule.id)
        .collect();
    assert_eq!(ids, vec![RuleId(1), RuleId(2)]);
}

// ── enumeration ─────────────────────────────────────────────────────────────

#[test]
fn test_next_date_for_weeks() {
    let set = rules();
    assert_eq!(
        collect(rule(&set, EVERY_2_WEEKS_MWF), Some(date(2014, 7, 30))),
        vec![
            date(2014, 6, 30),
            date(2014, 7, 2),
            date(2014, 7, 4),
            date(2014, 7, 14),
            date(2014, 7, 16),
            date(2014, 7, 18),
            date(2014, 7, 28),
            date(2014, 7, 30),
        ]
    );
}

#[test]
fn test_next_date_for_months() {
    let set = rules();
    let expected: Vec<_> = (1..=8).map(|m| date(2014, m, 15)).collect();
    assert_eq!(collect(rule(&set, MONTHLY), None), expected);
}

#[test]
fn test_next_date_for_months_based_on_weekday() {
    let set = rules();
    assert_eq!(
        collect(rule(&set, MONTHLY_WEEKDAY), None),
        vec![
            date(2014, 1, 15),
            date(2014, 2, 19),
            date(2014, 3, 19),
            date(2014, 4, 16),
            date(2014, 5, 21),
            date(2014, 6, 18),
            date(2014, 7, 16),
            date(2014, 8, 20),
            date(2014, 9, 17),
            date(2014, 10, 15),
            date(2014, 11, 19),
            date(2014, 12, 17),
            date(2015, 1, 21),
            date(2015, 2, 18),
            date(2015, 3, 18),
            date(2015, 4, 15),
            date(2015, 5, 20),
            date(2015, 6, 17),
            date(2015, 7, 15),
            date(2015, 8, 19),
        ]
    );
}

#[test]
fn test_next_date_for_months_based_on_first_weekday() {
    let set = rules();
    assert_eq!(
        collect(rule(&set, MONTHLY_FIRST_WEEKDAY), None),
        vec![
            date(2014, 1, 1),
            date(2014, 2, 5),
            date(2014, 3, 5),
            date(2014, 4, 2),
            date(2014, 5, 7),
            date(2014, 6, 4),
            date(2014, 7, 2),
            date(2014, 8, 6),
            date(2014, 9, 3),
            date(2014, 10, 1),
            date(2014, 11, 5),
            date(2014, 12, 3),
            date(2015, 1, 7),
            date(2015, 2, 4),
            date(2015, 3, 4),
            date(2015, 4, 1),
            date(2015, 5, 6),
            date(2015, 6, 3),
            date(2015, 7, 1),
            date(2015, 8, 5),
        ]
    );
}

#[test]
fn test_next_date_for_months_based_on_last_weekday() {
    let set = rules();
    assert_eq!(
        collect(rule(&set, MONTHLY_LAST_WEEKDAY), None),
        vec![
            date(2014, 1, 29),
            date(2014, 3, 26),
            date(2014, 5, 28),
            date(2014, 7, 30),
            date(2014, 9, 24),
            date(2014, 11, 26),
            date(2015, 1, 28),
            date(2015, 3, 25),
            date(2015, 5, 27),
            date(2015, 7, 29),
        ]
    );
}

#[test]
fn test_occurrence_lookup_by_index() {
    let set = rules();
    assert_eq!(set.nth_occurrence(EVERY_2_WEEKS_MWF, 25).unwrap(), date(2014, 10, 22));
    assert_eq!(
        rule(&set, EVERY_2_WEEKS_MWF).nth_occurrence(25).unwrap(),
        date(2014, 10, 22)
    );
}

#[test]
fn test_weekly_rule_reports_anchor() {
    let set = rules();
    let weekly = rule(&set, EVERY_2_WEEKS_MWF);
    assert_eq!(
        weekly.active_weekdays.iter().collect::<Vec<_>>(),
        vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
    );
    assert_eq!(rule(&set, MONTHLY_WEEKDAY).anchor_weekday(), Weekday::Wed);
}
