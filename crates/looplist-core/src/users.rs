//! User identity and profiles.
//!
//! Authentication and credential handling live outside this crate; a user
//! here is just an id, an email and an optional display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};
use crate::storage::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to an empty string.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }
}

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Register a user. Emails are trimmed, lowercased and must be unique.
    pub fn create_user(&self, email: &str, display_name: Option<&str>) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::invalid("email", format!("'{email}' is not an email address")).into());
        }
        if self.db.get_user_by_email(&email)?.is_some() {
            return Err(CoreError::Conflict(format!("email {email} is already registered")));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_user(&user)?;
        info!(user_id = %user.id, "created user");
        Ok(user)
    }

    pub fn get_profile(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| CoreError::not_found("user", user_id))
    }

    /// Change the display name. Empty names leave the profile unchanged.
    pub fn update_profile(&self, user_id: &str, display_name: Option<&str>) -> Result<User> {
        let mut user = self.get_profile(user_id)?;
        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            user.display_name = Some(name.to_string());
            user.updated_at = Utc::now();
            self.db.update_user(&user)?;
        }
        Ok(user)
    }
}
