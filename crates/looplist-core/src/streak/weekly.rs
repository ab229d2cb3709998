//! Weekly consistency: per-week completion ratio averaged over weeks.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::loops::CheckInRecord;

/// Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Mean of `completed / recorded` across every Sunday-starting week that has
/// at least one record. 0 when there are no records.
pub fn weekly_consistency(records: &[CheckInRecord]) -> f64 {
    let mut weeks: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for record in records {
        let week = weeks.entry(week_start(record.date)).or_insert((0, 0));
        week.1 += 1;
        if record.completed {
            week.0 += 1;
        }
    }

    if weeks.is_empty() {
        return 0.0;
    }
    let sum: f64 = weeks
        .values()
        .map(|&(completed, total)| completed as f64 / total as f64)
        .sum();
    sum / weeks.len() as f64
}
