//! Per-user dashboard buckets and summary statistics.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loops::Loop;
use crate::storage::Database;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dashboard {
    /// Loops with a running streak.
    pub active: Vec<Loop>,
    /// No running streak and not fully completed.
    pub paused: Vec<Loop>,
    /// Completion rate of exactly 1.
    pub completed: Vec<Loop>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub best_streak: u32,
}

fn is_running(l: &Loop) -> bool {
    l.meta.current_streak > 0
}

fn is_fully_completed(l: &Loop) -> bool {
    l.meta.completion_rate >= 1.0
}

/// Group a user's loops. A loop with a running streak and a perfect rate is
/// listed under both `active` and `completed`.
pub fn dashboard(db: &Database, user_id: &str) -> Result<Dashboard> {
    let loops = db.loops_for_user(user_id, None)?;
    let mut board = Dashboard::default();
    for l in loops {
        if is_running(&l) {
            board.active.push(l.clone());
        }
        if !is_running(&l) && !is_fully_completed(&l) {
            board.paused.push(l.clone());
        }
        if is_fully_completed(&l) {
            board.completed.push(l);
        }
    }
    Ok(board)
}

pub fn user_stats(db: &Database, user_id: &str) -> Result<UserStats> {
    let loops = db.loops_for_user(user_id, None)?;
    Ok(UserStats {
        total: loops.len(),
        active: loops.iter().filter(|l| is_running(l)).count(),
        completed: loops.iter().filter(|l| is_fully_completed(l)).count(),
        best_streak: loops.iter().map(|l| l.meta.longest_streak).max().unwrap_or(0),
    })
}

/// A user's loops narrowed by frequency and/or category.
pub fn filter_loops(
    db: &Database,
    user_id: &str,
    frequency: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<Loop>> {
    Ok(db
        .loops_for_user(user_id, None)?
        .into_iter()
        .filter(|l| frequency.map_or(true, |f| l.meta.frequency == f))
        .filter(|l| category.map_or(true, |c| l.category.as_deref() == Some(c)))
        .collect())
}
