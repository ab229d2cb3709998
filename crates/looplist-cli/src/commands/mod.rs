//! Subcommand handlers. Every handler prints JSON to stdout.

pub mod clone;
pub mod config;
pub mod dashboard;
pub mod explore;
pub mod follow;
pub mod leaderboard;
pub mod loops;
pub mod nudge;
pub mod react;
pub mod user;

use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use tracing::debug;

use looplist_core::loops::{parse_day, DAY_FORMAT};
use looplist_core::{
    CheckInService, Clock, Config, Database, FixedClock, LoopService, SystemClock,
};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Everything a handler needs: loaded config, open database, clock and the
/// acting user.
pub struct Context {
    pub config: Config,
    pub db: Database,
    clock: Box<dyn Clock>,
    acting_user: Option<String>,
}

impl Context {
    pub fn open(config: Config, acting_user: Option<String>, today: Option<&str>) -> CliResult<Self> {
        let clock: Box<dyn Clock> = match today {
            Some(raw) => Box::new(FixedClock::new(parse_day(raw)?)),
            None => Box::new(SystemClock),
        };
        let db = Database::open(&config)?;
        debug!(acting_user = ?acting_user, fixed_today = ?today, "opened database");
        Ok(Self {
            config,
            db,
            clock,
            acting_user: acting_user.filter(|u| !u.trim().is_empty()),
        })
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The acting user id.
    pub fn user(&self) -> CliResult<&str> {
        self.acting_user
            .as_deref()
            .ok_or_else(|| "no acting user; pass --as <user-id> or set LOOPLIST_USER".into())
    }

    /// `raw` or today, as `YYYY-MM-DD`.
    pub fn day_or_today(&self, raw: Option<&str>) -> String {
        match raw {
            Some(day) => day.to_string(),
            None => self.clock.today().format(DAY_FORMAT).to_string(),
        }
    }

    pub fn date_or_today(&self, raw: Option<&str>) -> CliResult<NaiveDate> {
        match raw {
            Some(day) => Ok(parse_day(day)?),
            None => Ok(self.clock.today()),
        }
    }

    pub fn loops(&self) -> LoopService<'_> {
        LoopService::new(&self.db, self.config.tags.clone())
    }

    pub fn checkins(&self) -> CheckInService<'_> {
        CheckInService::new(&self.db, self.config.streak.clone())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
