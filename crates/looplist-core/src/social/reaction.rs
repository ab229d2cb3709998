//! Emoji reactions on loops, at most one identical emoji per user per loop
//! per day.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::Reaction;
use crate::clock::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::loops::service::LoopService;
use crate::loops::tags::TagRules;
use crate::storage::Database;

pub struct ReactionService<'a> {
    db: &'a Database,
}

impl<'a> ReactionService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn add_reaction(
        &self,
        user_id: &str,
        loop_id: &str,
        emoji: &str,
        clock: &dyn Clock,
    ) -> Result<Reaction> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ValidationError::invalid("emoji", "must not be empty").into());
        }
        if self.db.get_user(user_id)?.is_none() {
            return Err(CoreError::not_found("user", user_id));
        }
        LoopService::new(self.db, TagRules::default()).get_loop(loop_id, user_id)?;

        let today = clock.today();
        if self.db.reaction_exists(user_id, loop_id, emoji, today)? {
            return Err(CoreError::Conflict(format!("already reacted with {emoji} today")));
        }

        let reaction = Reaction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            loop_id: loop_id.to_string(),
            emoji: emoji.to_string(),
            reacted_on: today,
            created_at: Utc::now(),
        };
        self.db.insert_reaction(&reaction)?;
        info!(user_id, loop_id, emoji, "added reaction");
        Ok(reaction)
    }

    pub fn reactions_for_loop(&self, loop_id: &str) -> Result<Vec<Reaction>> {
        Ok(self.db.reactions_for_loop(loop_id)?)
    }
}
