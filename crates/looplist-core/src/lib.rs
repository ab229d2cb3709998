//! # LoopList Core Library
//!
//! Business logic for LoopList, a social habit tracker built around small
//! recurring "loops". Every operation is available through the standalone
//! `looplist` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak engine**: A pure function of a loop's metadata, its check-in
//!   records and a [`Clock`]. It derives current/longest streaks, the
//!   completion rate, the rolling history and the loop status
//! - **Services**: Borrow a [`Database`] and enforce ownership, visibility
//!   and validation rules before writing
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Streak and completion recomputation
//! - [`CheckInService`]: Transactional check-in, then recompute
//! - [`LoopService`]: Loop CRUD, tags and cloning
//! - [`Database`]: Persistence
//! - [`Config`]: Application configuration management

pub mod checkin;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod explore;
pub mod leaderboard;
pub mod loops;
pub mod nudge;
pub mod social;
pub mod storage;
pub mod streak;
pub mod users;

pub use checkin::CheckInService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{Dashboard, UserStats};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use explore::Page;
pub use leaderboard::LeaderboardEntry;
pub use loops::service::LoopService;
pub use loops::tags::TagRules;
pub use loops::{
    CheckInRecord, CloneOverrides, Frequency, Loop, LoopMeta, LoopStatus, LoopUpdate, NewLoop,
    StreakEntry, Visibility,
};
pub use social::{Follow, FollowService, Reaction, ReactionService};
pub use storage::{Config, Database};
pub use streak::{StreakEngine, StreakReport, StreakRules};
pub use users::{User, UserService};
