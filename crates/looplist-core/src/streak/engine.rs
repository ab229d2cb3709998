//! Streak and completion-rate recomputation.
//!
//! Every run rebuilds the derived loop fields from the complete check-in
//! history of one (loop, user) pair. Nothing is accumulated incrementally, so
//! the result always agrees with the stored records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::weekly::weekly_consistency;
use crate::clock::Clock;
use crate::error::ConfigError;
use crate::loops::{CheckInRecord, Frequency, LoopMeta, LoopStatus, StreakEntry};

/// Tunables for streak computation, loaded from the `[streak]` config table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakRules {
    /// Largest gap (in days) between completions that restarts the streak at
    /// 1 instead of breaking it.
    #[serde(default = "default_grace_gap_days")]
    pub grace_gap_days: i64,
    /// Completion rate at or above which a loop counts as completed.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
    /// Number of streak history entries kept on the loop.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// When false, a completed day after a gap wider than the grace window
    /// scores a streak of 0. When true it starts a new streak of 1.
    #[serde(default)]
    pub restart_after_hard_break: bool,
}

fn default_grace_gap_days() -> i64 {
    2
}
fn default_completion_threshold() -> f64 {
    0.8
}
fn default_history_limit() -> usize {
    30
}

impl Default for StreakRules {
    fn default() -> Self {
        Self {
            grace_gap_days: default_grace_gap_days(),
            completion_threshold: default_completion_threshold(),
            history_limit: default_history_limit(),
            restart_after_hard_break: false,
        }
    }
}

/// Result of a recompute: the rewritten loop metadata plus statistics that
/// are not persisted on the loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakReport {
    pub meta: LoopMeta,
    /// Mean per-week completion ratio over Sunday-starting weeks.
    pub weekly_consistency: f64,
    /// Check-in opportunities since the start date.
    pub expected_days: i64,
    pub completed_days: u32,
}

/// Expected number of check-in opportunities `days_since_start` days after
/// the start date. Never negative.
pub fn expected_days(frequency: Frequency, days_since_start: i64, record_count: usize) -> i64 {
    let expected = match frequency {
        Frequency::Daily => days_since_start + 1,
        Frequency::ThreePerWeek => (days_since_start as f64 / 7.0 * 3.0).floor() as i64,
        Frequency::Weekdays => (days_since_start as f64 / 7.0 * 5.0).floor() as i64,
        Frequency::Custom => record_count as i64,
    };
    expected.max(0)
}

/// `completed / expected`, 0 when nothing is expected, capped at 1.
pub fn completion_rate(completed: u32, expected: i64) -> f64 {
    if expected <= 0 {
        return 0.0;
    }
    (completed as f64 / expected as f64).min(1.0)
}

/// Pure streak engine over explicit inputs and an injected clock.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    rules: StreakRules,
}

impl StreakEngine {
    pub fn new(rules: StreakRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &StreakRules {
        &self.rules
    }

    /// Rebuild the derived fields of `meta` from `records`.
    ///
    /// `records` must belong to one (loop, user) pair and be sorted by date
    /// ascending with no duplicate days. The input `meta` is never modified;
    /// callers persist `report.meta` themselves.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the loop's frequency or start date cannot
    /// be interpreted.
    pub fn recompute(
        &self,
        meta: &LoopMeta,
        records: &[CheckInRecord],
        clock: &dyn Clock,
    ) -> Result<StreakReport, ConfigError> {
        let frequency = meta.frequency()?;
        let start_date = meta.start_date()?;
        let days_since_start = (clock.today() - start_date).num_days();
        let expected = expected_days(frequency, days_since_start, records.len());

        let mut streak: u32 = 0;
        let mut longest: u32 = 0;
        let mut completed_days: u32 = 0;
        let mut last_date: Option<NaiveDate> = None;
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if record.completed {
                completed_days += 1;
                streak = self.advance(streak, last_date, record.date);
            } else {
                streak = 0;
            }
            longest = longest.max(streak);
            entries.push(StreakEntry {
                date: record.date,
                streak,
                completion_rate: completion_rate(completed_days, expected),
            });
            last_date = Some(record.date);
        }

        let rate = completion_rate(completed_days, expected);
        let status = if rate >= self.rules.completion_threshold {
            LoopStatus::Completed
        } else {
            LoopStatus::Active
        };

        let mut history = meta.streak_history.clone();
        history.extend(entries);
        if history.len() > self.rules.history_limit {
            let excess = history.len() - self.rules.history_limit;
            history.drain(..excess);
        }

        debug!(
            frequency = %frequency,
            expected,
            completed_days,
            current_streak = streak,
            longest_streak = longest,
            completion_rate = rate,
            "recomputed streak"
        );

        Ok(StreakReport {
            meta: LoopMeta {
                frequency: meta.frequency.clone(),
                start_date: meta.start_date.clone(),
                streak_history: history,
                current_streak: streak,
                longest_streak: longest,
                completion_rate: rate,
                status,
            },
            weekly_consistency: weekly_consistency(records),
            expected_days: expected,
            completed_days,
        })
    }

    /// Streak after a completed day on `date`.
    fn advance(&self, streak: u32, last_date: Option<NaiveDate>, date: NaiveDate) -> u32 {
        let Some(previous) = last_date else {
            return streak + 1;
        };
        let gap = (date - previous).num_days();
        if gap == 1 {
            streak + 1
        } else if gap <= self.rules.grace_gap_days || self.rules.restart_after_hard_break {
            1
        } else {
            0
        }
    }
}
