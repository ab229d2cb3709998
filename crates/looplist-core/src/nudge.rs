//! Reminders for loops not yet checked in on a given day.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::Result;
use crate::loops::{Loop, LoopStatus};
use crate::storage::Database;

/// The user's active loops with no completed check-in on `date`.
pub fn missed_check_ins(db: &Database, user_id: &str, date: NaiveDate) -> Result<Vec<Loop>> {
    let done: HashSet<String> = db
        .check_ins_on(user_id, date)?
        .into_iter()
        .filter(|r| r.completed)
        .map(|r| r.loop_id)
        .collect();

    Ok(db
        .loops_for_user(user_id, None)?
        .into_iter()
        .filter(|l| l.meta.status == LoopStatus::Active)
        .filter(|l| !done.contains(&l.id))
        .collect())
}
