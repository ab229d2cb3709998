//! Follow and unfollow, plus follower/following/friend listings.

use chrono::Utc;
use tracing::info;

use super::{friend_ids, Follow};
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::Database;
use crate::users::User;

pub struct FollowService<'a> {
    db: &'a Database,
}

impl<'a> FollowService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn require_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| CoreError::not_found("user", user_id))
    }

    pub fn follow(&self, follower_id: &str, followed_id: &str) -> Result<Follow> {
        if follower_id == followed_id {
            return Err(ValidationError::SelfFollow.into());
        }
        self.require_user(follower_id)?;
        self.require_user(followed_id)?;
        if self.db.is_following(follower_id, followed_id)? {
            return Err(CoreError::Conflict(format!("already following {followed_id}")));
        }

        let follow = Follow {
            follower_id: follower_id.to_string(),
            followed_id: followed_id.to_string(),
            created_at: Utc::now(),
        };
        self.db.insert_follow(&follow)?;
        info!(follower_id, followed_id, "followed user");
        Ok(follow)
    }

    pub fn unfollow(&self, follower_id: &str, followed_id: &str) -> Result<()> {
        if !self.db.delete_follow(follower_id, followed_id)? {
            return Err(CoreError::not_found("follow", format!("{follower_id} -> {followed_id}")));
        }
        info!(follower_id, followed_id, "unfollowed user");
        Ok(())
    }

    /// Users that `user_id` follows.
    pub fn following(&self, user_id: &str) -> Result<Vec<User>> {
        self.require_user(user_id)?;
        Ok(self.db.get_users(&self.db.following_ids(user_id)?)?)
    }

    /// Users following `user_id`.
    pub fn followers(&self, user_id: &str) -> Result<Vec<User>> {
        self.require_user(user_id)?;
        Ok(self.db.get_users(&self.db.follower_ids(user_id)?)?)
    }

    /// Mutual follows.
    pub fn friends(&self, user_id: &str) -> Result<Vec<User>> {
        self.require_user(user_id)?;
        Ok(self.db.get_users(&friend_ids(self.db, user_id)?)?)
    }
}
