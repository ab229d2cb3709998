//! SQLite-based storage for users, loops, check-ins and the social layer.
//!
//! Provides persistent storage for:
//! - Users and their loops
//! - Per-day check-in records, unique per (loop, user, date)
//! - Follow edges and emoji reactions

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use super::migrations;
use crate::error::DatabaseError;
use crate::loops::{CheckInRecord, Loop, LoopMeta, LoopStatus, Visibility, DAY_FORMAT};
use crate::social::{Follow, Reaction};
use crate::users::User;

type DbResult<T> = Result<T, DatabaseError>;

const LOOP_COLUMNS: &str = "id, user_id, title, frequency, start_date, visibility, icon,
    current_streak, longest_streak, completion_rate, status, original_loop_id,
    original_creator_id, category, tags, streak_history, created_at, updated_at";

// === Helper Functions ===

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_datetime(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DAY_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn parse_visibility(row: &Row, idx: usize) -> rusqlite::Result<Visibility> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn parse_status(row: &Row, idx: usize) -> rusqlite::Result<LoopStatus> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

fn to_json<T: serde::Serialize>(column: &str, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Corrupt {
        column: column.to_string(),
        message: e.to_string(),
    })
}

/// Build a Loop from a row selected with `LOOP_COLUMNS`.
fn row_to_loop(row: &Row) -> rusqlite::Result<Loop> {
    Ok(Loop {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        visibility: parse_visibility(row, 5)?,
        icon: row.get(6)?,
        original_loop_id: row.get(11)?,
        original_creator_id: row.get(12)?,
        category: row.get(13)?,
        tags: parse_json(row, 14)?,
        created_at: parse_datetime(row, 16)?,
        updated_at: parse_datetime(row, 17)?,
        meta: LoopMeta {
            frequency: row.get(3)?,
            start_date: row.get(4)?,
            current_streak: row.get(7)?,
            longest_streak: row.get(8)?,
            completion_rate: row.get(9)?,
            status: parse_status(row, 10)?,
            streak_history: parse_json(row, 15)?,
        },
    })
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        created_at: parse_datetime(row, 3)?,
        updated_at: parse_datetime(row, 4)?,
    })
}

fn row_to_check_in(row: &Row) -> rusqlite::Result<CheckInRecord> {
    Ok(CheckInRecord {
        loop_id: row.get(0)?,
        user_id: row.get(1)?,
        date: parse_date(row, 2)?,
        completed: row.get(3)?,
    })
}

fn row_to_reaction(row: &Row) -> rusqlite::Result<Reaction> {
    Ok(Reaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        loop_id: row.get(2)?,
        emoji: row.get(3)?,
        reacted_on: parse_date(row, 4)?,
        created_at: parse_datetime(row, 5)?,
    })
}

/// SQLite database for LoopList.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at the configured location in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &super::Config) -> Result<Self, crate::error::CoreError> {
        let path = config.database_path()?;
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` inside a transaction. Commits when `f` succeeds, rolls back
    /// everything `f` wrote when it fails.
    pub fn transaction<T, E>(&self, f: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(DatabaseError::from)?;
        let value = f(self)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }

    // === Users ===

    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, email, display_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                user.display_name,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, display_name, created_at, updated_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, display_name, created_at, updated_at FROM users WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn update_user(&self, user: &User) -> DbResult<()> {
        self.conn.execute(
            "UPDATE users SET email = ?2, display_name = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.display_name,
                user.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Users with the given ids, in the order requested. Unknown ids are skipped.
    pub fn get_users(&self, ids: &[String]) -> DbResult<Vec<User>> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get_user(id)? {
                users.push(user);
            }
        }
        Ok(users)
    }

    // === Loops ===

    pub fn insert_loop(&self, l: &Loop) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO loops ({LOOP_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ),
            params![
                l.id,
                l.user_id,
                l.title,
                l.meta.frequency,
                l.meta.start_date,
                l.visibility.as_str(),
                l.icon,
                l.meta.current_streak,
                l.meta.longest_streak,
                l.meta.completion_rate,
                l.meta.status.as_str(),
                l.original_loop_id,
                l.original_creator_id,
                l.category,
                to_json("tags", &l.tags)?,
                to_json("streak_history", &l.meta.streak_history)?,
                l.created_at.to_rfc3339(),
                l.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_loop(&self, id: &str) -> DbResult<Option<Loop>> {
        let l = self
            .conn
            .query_row(
                &format!("SELECT {LOOP_COLUMNS} FROM loops WHERE id = ?1"),
                params![id],
                row_to_loop,
            )
            .optional()?;
        Ok(l)
    }

    /// Rewrite every column of an existing loop.
    pub fn update_loop(&self, l: &Loop) -> DbResult<()> {
        self.conn.execute(
            "UPDATE loops SET title = ?2, frequency = ?3, start_date = ?4, visibility = ?5,
                icon = ?6, current_streak = ?7, longest_streak = ?8, completion_rate = ?9,
                status = ?10, category = ?11, tags = ?12, streak_history = ?13, updated_at = ?14
             WHERE id = ?1",
            params![
                l.id,
                l.title,
                l.meta.frequency,
                l.meta.start_date,
                l.visibility.as_str(),
                l.icon,
                l.meta.current_streak,
                l.meta.longest_streak,
                l.meta.completion_rate,
                l.meta.status.as_str(),
                l.category,
                to_json("tags", &l.tags)?,
                to_json("streak_history", &l.meta.streak_history)?,
                l.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Write the engine-derived fields of a loop. Fails when the loop no
    /// longer exists.
    pub fn update_loop_meta(
        &self,
        loop_id: &str,
        meta: &LoopMeta,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let changed = self.conn.execute(
            "UPDATE loops SET current_streak = ?2, longest_streak = ?3, completion_rate = ?4,
                status = ?5, streak_history = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                loop_id,
                meta.current_streak,
                meta.longest_streak,
                meta.completion_rate,
                meta.status.as_str(),
                to_json("streak_history", &meta.streak_history)?,
                updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no loop {loop_id} to update"
            )));
        }
        debug!(loop_id, "updated loop meta");
        Ok(())
    }

    /// Delete a loop with its check-ins and reactions. Returns false if absent.
    pub fn delete_loop(&self, id: &str) -> DbResult<bool> {
        self.conn
            .execute("DELETE FROM check_ins WHERE loop_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM reactions WHERE loop_id = ?1", params![id])?;
        let deleted = self.conn.execute("DELETE FROM loops WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// A user's loops, newest first, optionally filtered by visibility.
    pub fn loops_for_user(
        &self,
        user_id: &str,
        visibility: Option<Visibility>,
    ) -> DbResult<Vec<Loop>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOOP_COLUMNS} FROM loops
             WHERE user_id = ?1 AND (?2 IS NULL OR visibility = ?2)
             ORDER BY created_at DESC, id"
        ))?;
        let rows = stmt.query_map(
            params![user_id, visibility.map(|v| v.as_str())],
            row_to_loop,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Loops with the given visibility, any owner. Newest first.
    pub fn loops_with_visibility(&self, visibility: Visibility) -> DbResult<Vec<Loop>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOOP_COLUMNS} FROM loops WHERE visibility = ?1
             ORDER BY created_at DESC, id"
        ))?;
        let rows = stmt.query_map(params![visibility.as_str()], row_to_loop)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Loops owned by any of `user_ids`.
    pub fn loops_for_users(&self, user_ids: &[String]) -> DbResult<Vec<Loop>> {
        let mut loops = Vec::new();
        for user_id in user_ids {
            loops.extend(self.loops_for_user(user_id, None)?);
        }
        Ok(loops)
    }

    // === Check-ins ===

    /// Insert or overwrite the record for (loop, user, date).
    pub fn upsert_check_in(&self, record: &CheckInRecord) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO check_ins (loop_id, user_id, date, completed)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (loop_id, user_id, date) DO UPDATE SET completed = excluded.completed",
            params![
                record.loop_id,
                record.user_id,
                format_day(record.date),
                record.completed,
            ],
        )?;
        Ok(())
    }

    pub fn get_check_in(
        &self,
        loop_id: &str,
        user_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<CheckInRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT loop_id, user_id, date, completed FROM check_ins
                 WHERE loop_id = ?1 AND user_id = ?2 AND date = ?3",
                params![loop_id, user_id, format_day(date)],
                row_to_check_in,
            )
            .optional()?;
        Ok(record)
    }

    /// Every record for (loop, user), ascending by date.
    pub fn check_ins_for(&self, loop_id: &str, user_id: &str) -> DbResult<Vec<CheckInRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT loop_id, user_id, date, completed FROM check_ins
             WHERE loop_id = ?1 AND user_id = ?2
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![loop_id, user_id], row_to_check_in)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// A user's records across all loops for one day.
    pub fn check_ins_on(&self, user_id: &str, date: NaiveDate) -> DbResult<Vec<CheckInRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT loop_id, user_id, date, completed FROM check_ins
             WHERE user_id = ?1 AND date = ?2",
        )?;
        let rows = stmt.query_map(params![user_id, format_day(date)], row_to_check_in)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === Follows ===

    pub fn insert_follow(&self, follow: &Follow) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                follow.follower_id,
                follow.followed_id,
                follow.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Remove a follow edge. Returns false if it did not exist.
    pub fn delete_follow(&self, follower_id: &str, followed_id: &str) -> DbResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
            params![follower_id, followed_id],
        )?;
        Ok(deleted > 0)
    }

    pub fn is_following(&self, follower_id: &str, followed_id: &str) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followed_id = ?2)",
            params![follower_id, followed_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Ids the user follows, oldest edge first.
    pub fn following_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT followed_id FROM follows WHERE follower_id = ?1 ORDER BY created_at, followed_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Ids following the user, oldest edge first.
    pub fn follower_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT follower_id FROM follows WHERE followed_id = ?1 ORDER BY created_at, follower_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // === Reactions ===

    pub fn insert_reaction(&self, reaction: &Reaction) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO reactions (id, user_id, loop_id, emoji, reacted_on, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reaction.id,
                reaction.user_id,
                reaction.loop_id,
                reaction.emoji,
                format_day(reaction.reacted_on),
                reaction.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn reaction_exists(
        &self,
        user_id: &str,
        loop_id: &str,
        emoji: &str,
        day: NaiveDate,
    ) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM reactions
             WHERE user_id = ?1 AND loop_id = ?2 AND emoji = ?3 AND reacted_on = ?4)",
            params![user_id, loop_id, emoji, format_day(day)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn reactions_for_loop(&self, loop_id: &str) -> DbResult<Vec<Reaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, loop_id, emoji, reacted_on, created_at FROM reactions
             WHERE loop_id = ?1 ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map(params![loop_id], row_to_reaction)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loops::{Frequency, StreakEntry};

    fn user(id: &str) -> User {
        let now = Utc::now();
        User {
            id: id.into(),
            email: format!("{id}@example.com"),
            display_name: Some(id.to_uppercase()),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_loop(id: &str, owner: &str) -> Loop {
        let now = Utc::now();
        Loop {
            id: id.into(),
            user_id: owner.into(),
            title: "Stretch".into(),
            visibility: Visibility::Public,
            icon: Some("🧘".into()),
            category: Some("health".into()),
            tags: vec!["morning".into()],
            original_loop_id: None,
            original_creator_id: None,
            created_at: now,
            updated_at: now,
            meta: LoopMeta::new(Frequency::Daily, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn loop_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        let mut l = sample_loop("l1", "u1");
        l.meta.streak_history.push(StreakEntry {
            date: day(2),
            streak: 2,
            completion_rate: 0.5,
        });
        db.insert_loop(&l).unwrap();

        let loaded = db.get_loop("l1").unwrap().unwrap();
        assert_eq!(loaded.title, "Stretch");
        assert_eq!(loaded.tags, vec!["morning"]);
        assert_eq!(loaded.meta.streak_history, l.meta.streak_history);
        assert_eq!(loaded.meta.frequency, "daily");
        assert!(db.get_loop("missing").unwrap().is_none());
    }

    #[test]
    fn check_in_upsert_flips_completion() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        db.insert_loop(&sample_loop("l1", "u1")).unwrap();

        let mut record = CheckInRecord {
            loop_id: "l1".into(),
            user_id: "u1".into(),
            date: day(3),
            completed: false,
        };
        db.upsert_check_in(&record).unwrap();
        record.completed = true;
        db.upsert_check_in(&record).unwrap();

        let all = db.check_ins_for("l1", "u1").unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].completed);
    }

    #[test]
    fn check_ins_are_sorted_ascending() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        db.insert_loop(&sample_loop("l1", "u1")).unwrap();
        for d in [5, 1, 3] {
            db.upsert_check_in(&CheckInRecord {
                loop_id: "l1".into(),
                user_id: "u1".into(),
                date: day(d),
                completed: true,
            })
            .unwrap();
        }
        let dates: Vec<u32> = db
            .check_ins_for("l1", "u1")
            .unwrap()
            .iter()
            .map(|r| chrono::Datelike::day(&r.date))
            .collect();
        assert_eq!(dates, vec![1, 3, 5]);
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<(), DatabaseError> = db.transaction(|db| {
            db.insert_user(&user("u1"))?;
            Err(DatabaseError::QueryFailed("boom".into()))
        });
        assert!(result.is_err());
        assert!(db.get_user("u1").unwrap().is_none());

        db.transaction(|db| db.insert_user(&user("u2"))).unwrap();
        assert!(db.get_user("u2").unwrap().is_some());
    }

    #[test]
    fn delete_loop_removes_check_ins() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        db.insert_loop(&sample_loop("l1", "u1")).unwrap();
        db.upsert_check_in(&CheckInRecord {
            loop_id: "l1".into(),
            user_id: "u1".into(),
            date: day(1),
            completed: true,
        })
        .unwrap();
        assert!(db.delete_loop("l1").unwrap());
        assert!(db.check_ins_for("l1", "u1").unwrap().is_empty());
        assert!(!db.delete_loop("l1").unwrap());
    }

    #[test]
    fn update_loop_meta_requires_existing_loop() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        let mut l = sample_loop("l1", "u1");
        db.insert_loop(&l).unwrap();

        l.meta.current_streak = 4;
        db.update_loop_meta("l1", &l.meta, Utc::now()).unwrap();
        assert_eq!(db.get_loop("l1").unwrap().unwrap().meta.current_streak, 4);

        db.delete_loop("l1").unwrap();
        assert!(matches!(
            db.update_loop_meta("l1", &l.meta, Utc::now()),
            Err(DatabaseError::QueryFailed(_))
        ));
    }

    #[test]
    fn follow_edges() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("a")).unwrap();
        db.insert_user(&user("b")).unwrap();
        db.insert_follow(&Follow {
            follower_id: "a".into(),
            followed_id: "b".into(),
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(db.is_following("a", "b").unwrap());
        assert!(!db.is_following("b", "a").unwrap());
        assert_eq!(db.following_ids("a").unwrap(), vec!["b"]);
        assert_eq!(db.follower_ids("b").unwrap(), vec!["a"]);
        assert!(db.delete_follow("a", "b").unwrap());
        assert!(!db.delete_follow("a", "b").unwrap());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&user("u1")).unwrap();
        let mut dup = user("u2");
        dup.email = "u1@example.com".into();
        assert!(db.insert_user(&dup).is_err());
    }
}
