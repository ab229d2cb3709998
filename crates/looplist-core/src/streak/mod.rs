//! Streak and completion engine.

pub mod engine;
pub mod weekly;

pub use engine::{completion_rate, expected_days, StreakEngine, StreakReport, StreakRules};
pub use weekly::{week_start, weekly_consistency};
