//! Social layer: follow graph and emoji reactions.

pub mod follow;
pub mod reaction;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Database;
use crate::error::Result;

pub use follow::FollowService;
pub use reaction::ReactionService;

/// Directed edge: `follower_id` follows `followed_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Follow {
    pub follower_id: String,
    pub followed_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reaction {
    pub id: String,
    pub user_id: String,
    pub loop_id: String,
    pub emoji: String,
    /// Calendar day the reaction counts against.
    pub reacted_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Ids of mutual follows: users `user_id` follows who follow back.
pub fn friend_ids(db: &Database, user_id: &str) -> Result<Vec<String>> {
    let followers = db.follower_ids(user_id)?;
    Ok(db
        .following_ids(user_id)?
        .into_iter()
        .filter(|id| followers.contains(id))
        .collect())
}
