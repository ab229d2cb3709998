//! Loop CRUD, tag lookup and cloning.

use chrono::Utc;
use std::cmp::Ordering;
use tracing::info;
use uuid::Uuid;

use super::tags::TagRules;
use super::{parse_day, CloneOverrides, Frequency, Loop, LoopMeta, LoopUpdate, NewLoop, Visibility};
use crate::error::{CoreError, Result, ValidationError};
use crate::social;
use crate::storage::Database;

const RELATED_LIMIT: usize = 10;

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::invalid("title", "must not be empty").into());
    }
    Ok(title.to_string())
}

fn validate_frequency(raw: &str) -> Result<Frequency> {
    raw.trim()
        .parse::<Frequency>()
        .map_err(|e| ValidationError::invalid("frequency", e.to_string()).into())
}

fn validate_start_date(raw: &str) -> Result<chrono::NaiveDate> {
    if raw.trim().is_empty() {
        return Err(ValidationError::invalid("start_date", "start date is required").into());
    }
    Ok(parse_day(raw)?)
}

/// Highest current streak first, then highest completion rate.
pub fn by_streak_then_completion(a: &Loop, b: &Loop) -> Ordering {
    b.meta
        .current_streak
        .cmp(&a.meta.current_streak)
        .then_with(|| b.meta.completion_rate.total_cmp(&a.meta.completion_rate))
}

pub struct LoopService<'a> {
    db: &'a Database,
    tags: TagRules,
}

impl<'a> LoopService<'a> {
    pub fn new(db: &'a Database, tags: TagRules) -> Self {
        Self { db, tags }
    }

    /// Create a loop owned by `user_id` with zeroed streak state.
    pub fn create_loop(&self, user_id: &str, new: NewLoop) -> Result<Loop> {
        if self.db.get_user(user_id)?.is_none() {
            return Err(CoreError::not_found("user", user_id));
        }
        let title = validate_title(&new.title)?;
        let frequency = validate_frequency(&new.frequency)?;
        let start_date = validate_start_date(&new.start_date)?;

        let now = Utc::now();
        let l = Loop {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            visibility: new.visibility,
            icon: new.icon,
            category: new.category,
            tags: self.tags.clean(&new.tags),
            original_loop_id: None,
            original_creator_id: None,
            created_at: now,
            updated_at: now,
            meta: LoopMeta::new(frequency, start_date),
        };
        self.db.insert_loop(&l)?;
        info!(loop_id = %l.id, user_id, frequency = %frequency, "created loop");
        Ok(l)
    }

    /// A user's loops, newest first.
    pub fn list_loops(&self, user_id: &str, visibility: Option<Visibility>) -> Result<Vec<Loop>> {
        Ok(self.db.loops_for_user(user_id, visibility)?)
    }

    /// Fetch a loop the viewer may see: their own, or any public loop.
    pub fn get_loop(&self, loop_id: &str, viewer_id: &str) -> Result<Loop> {
        let l = self
            .db
            .get_loop(loop_id)?
            .ok_or_else(|| CoreError::not_found("loop", loop_id))?;
        if !l.is_owned_by(viewer_id) && !l.is_public() {
            return Err(CoreError::Forbidden(format!(
                "not authorized to view loop {loop_id}"
            )));
        }
        Ok(l)
    }

    /// Fetch a loop that `owner_id` owns.
    pub fn get_owned_loop(&self, loop_id: &str, owner_id: &str) -> Result<Loop> {
        let l = self.get_loop(loop_id, owner_id)?;
        if !l.is_owned_by(owner_id) {
            return Err(CoreError::Forbidden(format!(
                "loop {loop_id} belongs to another user"
            )));
        }
        Ok(l)
    }

    /// Apply an update. Streak counters, completion rate and history are
    /// derived and cannot be edited here.
    pub fn update_loop(&self, loop_id: &str, owner_id: &str, update: LoopUpdate) -> Result<Loop> {
        let mut l = self.get_owned_loop(loop_id, owner_id)?;

        if let Some(title) = update.title {
            l.title = validate_title(&title)?;
        }
        if let Some(frequency) = update.frequency {
            l.meta.frequency = validate_frequency(&frequency)?.as_str().to_string();
        }
        if let Some(start_date) = update.start_date {
            l.meta.start_date = validate_start_date(&start_date)?
                .format(super::DAY_FORMAT)
                .to_string();
        }
        if let Some(visibility) = update.visibility {
            l.visibility = visibility;
        }
        if let Some(icon) = update.icon {
            l.icon = Some(icon);
        }
        if let Some(category) = update.category {
            l.category = Some(category);
        }
        if let Some(tags) = update.tags {
            l.tags = self.tags.clean(&tags);
        }
        if let Some(status) = update.status {
            l.meta.status = status;
        }

        l.updated_at = Utc::now();
        self.db.update_loop(&l)?;
        info!(loop_id, "updated loop");
        Ok(l)
    }

    pub fn delete_loop(&self, loop_id: &str, owner_id: &str) -> Result<()> {
        self.get_owned_loop(loop_id, owner_id)?;
        self.db.transaction(|db| db.delete_loop(loop_id))?;
        info!(loop_id, "deleted loop");
        Ok(())
    }

    /// Public loops carrying any of `tags`, best streaks first.
    pub fn loops_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<Loop>> {
        let wanted: Vec<String> = tags
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let mut loops: Vec<Loop> = self
            .db
            .loops_with_visibility(Visibility::Public)?
            .into_iter()
            .filter(|l| l.tags.iter().any(|t| wanted.contains(t)))
            .collect();
        loops.sort_by(by_streak_then_completion);
        Ok(loops)
    }

    /// Up to ten other public loops sharing a tag or the category.
    pub fn related_loops(&self, loop_id: &str) -> Result<Vec<Loop>> {
        let source = self
            .db
            .get_loop(loop_id)?
            .ok_or_else(|| CoreError::not_found("loop", loop_id))?;

        let mut loops: Vec<Loop> = self
            .db
            .loops_with_visibility(Visibility::Public)?
            .into_iter()
            .filter(|l| l.id != source.id)
            .filter(|l| {
                let shares_tag = l.tags.iter().any(|t| source.tags.contains(t));
                let same_category = source.category.is_some() && l.category == source.category;
                shares_tag || same_category
            })
            .collect();
        loops.sort_by(by_streak_then_completion);
        loops.truncate(RELATED_LIMIT);
        Ok(loops)
    }

    /// Friends-visibility loops owned by the viewer's mutual follows.
    pub fn friends_only_loops(&self, viewer_id: &str) -> Result<Vec<Loop>> {
        let friend_ids = social::friend_ids(self.db, viewer_id)?;
        if friend_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut loops: Vec<Loop> = self
            .db
            .loops_for_users(&friend_ids)?
            .into_iter()
            .filter(|l| l.visibility == Visibility::Friends)
            .collect();
        loops.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loops)
    }

    /// Copy a public loop into `user_id`'s list. The copy starts with fresh
    /// streak state and remembers where it came from.
    pub fn clone_loop(
        &self,
        user_id: &str,
        source_id: &str,
        overrides: CloneOverrides,
    ) -> Result<Loop> {
        let source = self
            .db
            .get_loop(source_id)?
            .ok_or_else(|| CoreError::not_found("loop", source_id))?;
        if !source.is_public() {
            return Err(CoreError::Forbidden(format!("loop {source_id} is not public")));
        }
        if self.db.get_user(user_id)?.is_none() {
            return Err(CoreError::not_found("user", user_id));
        }

        let mut meta = source.meta.clone();
        meta.reset_progress();
        if let Some(frequency) = overrides.frequency {
            meta.frequency = validate_frequency(&frequency)?.as_str().to_string();
        }
        if let Some(start_date) = overrides.start_date {
            meta.start_date = validate_start_date(&start_date)?
                .format(super::DAY_FORMAT)
                .to_string();
        }

        let now = Utc::now();
        let copy = Loop {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: match overrides.title {
                Some(title) => validate_title(&title)?,
                None => source.title.clone(),
            },
            visibility: overrides.visibility.unwrap_or(source.visibility),
            icon: overrides.icon.or(source.icon.clone()),
            category: overrides.category.or(source.category.clone()),
            tags: match overrides.tags {
                Some(tags) => self.tags.clean(&tags),
                None => source.tags.clone(),
            },
            original_loop_id: Some(source.id.clone()),
            original_creator_id: Some(source.user_id.clone()),
            created_at: now,
            updated_at: now,
            meta,
        };
        self.db.insert_loop(&copy)?;
        info!(loop_id = %copy.id, source_id, user_id, "cloned loop");
        Ok(copy)
    }
}
