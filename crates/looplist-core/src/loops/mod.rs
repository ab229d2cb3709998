//! Loop types: recurring micro-habits and their per-day check-ins.
//!
//! A [`Loop`] is owned by one user and carries a [`LoopMeta`], the part the
//! streak engine reads and rewrites. Frequency and start date are kept in
//! their persisted text form inside `LoopMeta`; [`LoopMeta::frequency`] and
//! [`LoopMeta::start_date`] interpret them and fail with a [`ConfigError`]
//! when a stored loop cannot be scheduled.

pub mod service;
pub mod tags;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, ValidationError};

/// Date format used for every calendar day crossing a boundary.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// How often a loop is expected to be checked in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "3x_week")]
    ThreePerWeek,
    #[serde(rename = "weekdays")]
    Weekdays,
    /// No independent schedule; every recorded day is an expected day.
    #[serde(rename = "custom")]
    Custom,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::ThreePerWeek,
        Frequency::Weekdays,
        Frequency::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::ThreePerWeek => "3x_week",
            Frequency::Weekdays => "weekdays",
            Frequency::Custom => "custom",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "frequency".to_string(),
                message: format!("unrecognized frequency '{s}'"),
            })
    }
}

/// Loop lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoopStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl LoopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopStatus::Active => "active",
            LoopStatus::Paused => "paused",
            LoopStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoopStatus::Active),
            "paused" => Ok(LoopStatus::Paused),
            "completed" => Ok(LoopStatus::Completed),
            other => Err(ValidationError::invalid(
                "status",
                format!("expected active, paused or completed, got '{other}'"),
            )),
        }
    }
}

/// Who may see a loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    /// Visible to mutual follows.
    Friends,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Friends => "friends",
        }
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "friends" => Ok(Visibility::Friends),
            other => Err(ValidationError::invalid(
                "visibility",
                format!("expected public, private or friends, got '{other}'"),
            )),
        }
    }
}

/// One point of a loop's rolling streak history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakEntry {
    pub date: NaiveDate,
    pub streak: u32,
    pub completion_rate: f64,
}

/// Schedule and derived streak state of a loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopMeta {
    /// Persisted frequency text, e.g. `"daily"` or `"3x_week"`.
    pub frequency: String,
    /// Persisted start date text (`YYYY-MM-DD`).
    pub start_date: String,
    #[serde(default)]
    pub streak_history: Vec<StreakEntry>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub status: LoopStatus,
}

impl LoopMeta {
    /// Fresh metadata for a newly created loop.
    pub fn new(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            frequency: frequency.as_str().to_string(),
            start_date: start_date.format(DAY_FORMAT).to_string(),
            streak_history: Vec::new(),
            current_streak: 0,
            longest_streak: 0,
            completion_rate: 0.0,
            status: LoopStatus::Active,
        }
    }

    /// Parsed frequency.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if the stored text is not one of
    /// the recognized frequencies.
    pub fn frequency(&self) -> Result<Frequency, ConfigError> {
        self.frequency.parse()
    }

    /// Parsed start date.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingKey` when empty and
    /// `ConfigError::InvalidValue` when it is not a calendar day.
    pub fn start_date(&self) -> Result<NaiveDate, ConfigError> {
        let raw = self.start_date.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingKey("start_date".to_string()));
        }
        NaiveDate::parse_from_str(raw, DAY_FORMAT).map_err(|e| ConfigError::InvalidValue {
            key: "start_date".to_string(),
            message: format!("'{raw}': {e}"),
        })
    }

    /// Reset derived fields to their initial values.
    pub fn reset_progress(&mut self) {
        self.streak_history.clear();
        self.current_streak = 0;
        self.longest_streak = 0;
        self.completion_rate = 0.0;
        self.status = LoopStatus::Active;
    }
}

/// A user-defined recurring habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loop {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub icon: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set when this loop was cloned from another.
    pub original_loop_id: Option<String>,
    pub original_creator_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub meta: LoopMeta,
}

impl Loop {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Whether a loop's habit was performed on one calendar day.
///
/// Unique per (loop, user, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInRecord {
    pub loop_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub completed: bool,
}

/// Input for creating a loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLoop {
    pub title: String,
    pub frequency: String,
    pub start_date: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub icon: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Editable loop fields. Derived streak fields are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopUpdate {
    pub title: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub visibility: Option<Visibility>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<LoopStatus>,
}

/// Fields a user may override when cloning a public loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneOverrides {
    pub title: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub visibility: Option<Visibility>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Parse a `YYYY-MM-DD` day supplied by a caller.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_persisted_names() {
        assert_eq!("daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("3x_week".parse::<Frequency>().unwrap(), Frequency::ThreePerWeek);
        assert_eq!("weekdays".parse::<Frequency>().unwrap(), Frequency::Weekdays);
        assert_eq!("custom".parse::<Frequency>().unwrap(), Frequency::Custom);
    }

    #[test]
    fn frequency_rejects_unknown_value() {
        let err = "fortnightly".parse::<Frequency>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "frequency"));
    }

    #[test]
    fn frequency_serde_matches_as_str() {
        for f in Frequency::ALL {
            let json = serde_json::to_string(&f).unwrap();
            assert_eq!(json, format!("\"{}\"", f.as_str()));
        }
    }

    #[test]
    fn meta_start_date_errors() {
        let mut meta = LoopMeta::new(Frequency::Daily, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(meta.start_date().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        meta.start_date = String::new();
        assert!(matches!(meta.start_date(), Err(ConfigError::MissingKey(_))));

        meta.start_date = "2024-13-01".into();
        assert!(matches!(meta.start_date(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn loop_serializes_meta_flattened() {
        let now = Utc::now();
        let l = Loop {
            id: "l1".into(),
            user_id: "u1".into(),
            title: "Read".into(),
            visibility: Visibility::Public,
            icon: None,
            category: None,
            tags: vec![],
            original_loop_id: None,
            original_creator_id: None,
            created_at: now,
            updated_at: now,
            meta: LoopMeta::new(Frequency::Weekdays, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        };
        let json = serde_json::to_value(&l).unwrap();
        assert_eq!(json["frequency"], "weekdays");
        assert_eq!(json["start_date"], "2024-05-01");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert!(parse_day("2024-02-30").is_err());
        assert!(parse_day("yesterday").is_err());
        assert_eq!(parse_day(" 2024-02-29 ").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
