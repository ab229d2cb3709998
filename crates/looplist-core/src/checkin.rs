//! Daily check-ins and the recompute that follows each one.
//!
//! The service owns the pre-conditions (ownership, valid date, active loop,
//! no future dates) and the write path: the check-in upsert, the engine run
//! and the loop update happen in one SQLite transaction, so a failed
//! recompute leaves both the check-in store and the loop untouched.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::loops::service::LoopService;
use crate::loops::tags::TagRules;
use crate::loops::{parse_day, CheckInRecord, Loop, LoopStatus};
use crate::storage::Database;
use crate::streak::{StreakEngine, StreakReport, StreakRules};

pub struct CheckInService<'a> {
    db: &'a Database,
    engine: StreakEngine,
}

impl<'a> CheckInService<'a> {
    pub fn new(db: &'a Database, rules: StreakRules) -> Self {
        Self {
            db,
            engine: StreakEngine::new(rules),
        }
    }

    fn loops(&self) -> LoopService<'a> {
        LoopService::new(self.db, TagRules::default())
    }

    /// Validate a new record for `date_text` on a loop `user_id` owns.
    fn accept(
        &self,
        loop_id: &str,
        user_id: &str,
        date_text: &str,
        clock: &dyn Clock,
    ) -> Result<(Loop, NaiveDate)> {
        let l = self.loops().get_owned_loop(loop_id, user_id)?;
        let date = parse_day(date_text)?;

        if l.meta.status != LoopStatus::Active {
            warn!(loop_id, status = %l.meta.status, "rejected check-in on inactive loop");
            return Err(ValidationError::InactiveLoop {
                loop_id: loop_id.to_string(),
                status: l.meta.status.to_string(),
            }
            .into());
        }

        let today = clock.today();
        if date > today {
            warn!(loop_id, %date, %today, "rejected future check-in");
            return Err(ValidationError::FutureDate { date, today }.into());
        }
        Ok((l, date))
    }

    /// Recompute from the stored records and write the derived fields back.
    /// A paused loop stays paused.
    fn recompute_in(
        &self,
        db: &Database,
        l: &Loop,
        user_id: &str,
        clock: &dyn Clock,
    ) -> Result<StreakReport> {
        let records = db.check_ins_for(&l.id, user_id)?;
        let mut report = self
            .engine
            .recompute(&l.meta, &records, clock)
            .map_err(|e| {
                warn!(loop_id = %l.id, error = %e, "recompute aborted");
                CoreError::from(e)
            })?;
        if l.meta.status == LoopStatus::Paused {
            report.meta.status = LoopStatus::Paused;
        }
        db.update_loop_meta(&l.id, &report.meta, Utc::now())?;
        Ok(report)
    }

    /// Mark `date_text` completed and recompute the loop.
    pub fn check_in(
        &self,
        loop_id: &str,
        user_id: &str,
        date_text: &str,
        clock: &dyn Clock,
    ) -> Result<StreakReport> {
        let (l, date) = self.accept(loop_id, user_id, date_text, clock)?;
        let report = self.db.transaction(|db| {
            db.upsert_check_in(&CheckInRecord {
                loop_id: l.id.clone(),
                user_id: user_id.to_string(),
                date,
                completed: true,
            })?;
            self.recompute_in(db, &l, user_id, clock)
        })?;
        info!(
            loop_id,
            %date,
            current_streak = report.meta.current_streak,
            completion_rate = report.meta.completion_rate,
            "checked in"
        );
        Ok(report)
    }

    /// Record `date_text` as not completed and recompute. A day that is
    /// already recorded keeps its existing state.
    pub fn mark_missed(
        &self,
        loop_id: &str,
        user_id: &str,
        date_text: &str,
        clock: &dyn Clock,
    ) -> Result<StreakReport> {
        let (l, date) = self.accept(loop_id, user_id, date_text, clock)?;
        self.db.transaction(|db| {
            if db.get_check_in(&l.id, user_id, date)?.is_none() {
                db.upsert_check_in(&CheckInRecord {
                    loop_id: l.id.clone(),
                    user_id: user_id.to_string(),
                    date,
                    completed: false,
                })?;
            }
            self.recompute_in(db, &l, user_id, clock)
        })
    }

    /// Recompute without recording anything new.
    pub fn recompute_loop(
        &self,
        loop_id: &str,
        user_id: &str,
        clock: &dyn Clock,
    ) -> Result<StreakReport> {
        let l = self.loops().get_owned_loop(loop_id, user_id)?;
        self.db
            .transaction(|db| self.recompute_in(db, &l, user_id, clock))
    }

    /// Stored records for a loop the viewer can see, ascending by date.
    pub fn check_ins(&self, loop_id: &str, user_id: &str) -> Result<Vec<CheckInRecord>> {
        let l = self.loops().get_loop(loop_id, user_id)?;
        Ok(self.db.check_ins_for(&l.id, &l.user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ConfigError;
    use crate::loops::{NewLoop, Visibility};
    use crate::users::UserService;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn setup() -> (Database, String, String) {
        let db = Database::open_in_memory().unwrap();
        let user = UserService::new(&db).create_user("c@example.com", None).unwrap();
        let l = LoopService::new(&db, TagRules::default())
            .create_loop(
                &user.id,
                NewLoop {
                    title: "Meditate".into(),
                    frequency: "daily".into(),
                    start_date: "2024-04-01".into(),
                    visibility: Visibility::Public,
                    ..Default::default()
                },
            )
            .unwrap();
        (db, user.id, l.id)
    }

    #[test]
    fn check_in_persists_recomputed_meta() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(10));
        for d in ["2024-04-08", "2024-04-09", "2024-04-10"] {
            service.check_in(&loop_id, &user, d, &clock).unwrap();
        }
        let stored = db.get_loop(&loop_id).unwrap().unwrap();
        assert_eq!(stored.meta.current_streak, 3);
        assert_eq!(stored.meta.longest_streak, 3);
        assert!((stored.meta.completion_rate - 0.3).abs() < 1e-9);
        // History grows by the full walk on every run: 1 + 2 + 3 entries.
        assert_eq!(stored.meta.streak_history.len(), 6);
    }

    #[test]
    fn repeated_check_in_same_day_keeps_one_record() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(2));
        service.check_in(&loop_id, &user, "2024-04-02", &clock).unwrap();
        let report = service.check_in(&loop_id, &user, "2024-04-02", &clock).unwrap();
        assert_eq!(report.completed_days, 1);
        assert_eq!(service.check_ins(&loop_id, &user).unwrap().len(), 1);
    }

    #[test]
    fn rejects_future_and_invalid_dates() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(5));
        assert!(matches!(
            service.check_in(&loop_id, &user, "2024-04-06", &clock),
            Err(CoreError::Validation(ValidationError::FutureDate { .. }))
        ));
        assert!(matches!(
            service.check_in(&loop_id, &user, "04/05/2024", &clock),
            Err(CoreError::Validation(ValidationError::InvalidDate(_)))
        ));
        assert!(db.check_ins_for(&loop_id, &user).unwrap().is_empty());
    }

    #[test]
    fn rejects_inactive_loop() {
        let (db, user, loop_id) = setup();
        let mut l = db.get_loop(&loop_id).unwrap().unwrap();
        l.meta.status = LoopStatus::Paused;
        db.update_loop(&l).unwrap();

        let service = CheckInService::new(&db, StreakRules::default());
        assert!(matches!(
            service.check_in(&loop_id, &user, "2024-04-02", &FixedClock(day(2))),
            Err(CoreError::Validation(ValidationError::InactiveLoop { .. }))
        ));
    }

    #[test]
    fn rejects_non_owner() {
        let (db, _user, loop_id) = setup();
        let other = UserService::new(&db).create_user("o@example.com", None).unwrap();
        let service = CheckInService::new(&db, StreakRules::default());
        assert!(matches!(
            service.check_in(&loop_id, &other.id, "2024-04-02", &FixedClock(day(2))),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn unknown_frequency_rolls_back_everything() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(3));
        service.check_in(&loop_id, &user, "2024-04-02", &clock).unwrap();

        db.conn()
            .execute("UPDATE loops SET frequency = 'hourly' WHERE id = ?1", [&loop_id])
            .unwrap();
        let before = db.get_loop(&loop_id).unwrap().unwrap();

        let err = service
            .check_in(&loop_id, &user, "2024-04-03", &clock)
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));

        let after = db.get_loop(&loop_id).unwrap().unwrap();
        assert_eq!(after.meta, before.meta);
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(db.check_ins_for(&loop_id, &user).unwrap().len(), 1);
    }

    #[test]
    fn reaching_threshold_completes_loop_and_blocks_check_ins() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(4));
        for d in 1..=3 {
            let report = service
                .check_in(&loop_id, &user, &format!("2024-04-0{d}"), &clock)
                .unwrap();
            assert_eq!(report.meta.status, LoopStatus::Active);
        }
        let report = service.check_in(&loop_id, &user, "2024-04-04", &clock).unwrap();
        assert_eq!(report.meta.status, LoopStatus::Completed);
        assert!(matches!(
            service.check_in(&loop_id, &user, "2024-04-04", &clock),
            Err(CoreError::Validation(ValidationError::InactiveLoop { .. }))
        ));
    }

    #[test]
    fn mark_missed_never_uncompletes_a_day() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        let clock = FixedClock(day(20));
        service.check_in(&loop_id, &user, "2024-04-02", &clock).unwrap();
        service.mark_missed(&loop_id, &user, "2024-04-02", &clock).unwrap();
        let report = service.mark_missed(&loop_id, &user, "2024-04-03", &clock).unwrap();

        let records = service.check_ins(&loop_id, &user).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].completed);
        assert!(!records[1].completed);
        assert_eq!(report.meta.current_streak, 0);
        assert_eq!(report.meta.longest_streak, 1);
    }

    #[test]
    fn recompute_keeps_paused_loop_paused() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        service
            .check_in(&loop_id, &user, "2024-04-01", &FixedClock(day(1)))
            .unwrap();
        let mut l = db.get_loop(&loop_id).unwrap().unwrap();
        l.meta.status = LoopStatus::Paused;
        db.update_loop(&l).unwrap();

        let report = service
            .recompute_loop(&loop_id, &user, &FixedClock(day(10)))
            .unwrap();
        assert_eq!(report.meta.status, LoopStatus::Paused);
        assert!((report.meta.completion_rate - 0.1).abs() < 1e-9);
        let stored = db.get_loop(&loop_id).unwrap().unwrap();
        assert_eq!(stored.meta.status, LoopStatus::Paused);
    }

    #[test]
    fn recompute_loop_tracks_clock() {
        let (db, user, loop_id) = setup();
        let service = CheckInService::new(&db, StreakRules::default());
        service
            .check_in(&loop_id, &user, "2024-04-01", &FixedClock(day(1)))
            .unwrap();
        let later = service
            .recompute_loop(&loop_id, &user, &FixedClock(day(10)))
            .unwrap();
        assert_eq!(later.expected_days, 10);
        assert!((later.meta.completion_rate - 0.1).abs() < 1e-9);
    }
}
