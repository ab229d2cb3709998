//! Integration tests for the loop lifecycle.
//!
//! Covers the path from account creation through check-ins to the social
//! read models (leaderboard, explore, dashboard, nudges), using an on-disk
//! database so the data survives a reopen.

use chrono::NaiveDate;
use looplist_core::dashboard::{dashboard, user_stats};
use looplist_core::explore::{loop_of_the_day, trending};
use looplist_core::leaderboard::friends_leaderboard;
use looplist_core::nudge::missed_check_ins;
use looplist_core::{
    CheckInService, CloneOverrides, Config, CoreError, Database, FixedClock, FollowService,
    LoopService, LoopStatus, NewLoop, ReactionService, UserService, Visibility,
};
use rand::SeedableRng;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn public_daily(title: &str) -> NewLoop {
    NewLoop {
        title: title.into(),
        frequency: "daily".into(),
        start_date: "2024-03-01".into(),
        visibility: Visibility::Public,
        category: Some("health".into()),
        tags: vec!["morning".into()],
        ..Default::default()
    }
}

#[test]
fn test_full_habit_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("looplist.db");
    let config = Config::default();
    let clock = FixedClock(day(5));

    let (alice, bob, run_id) = {
        let db = Database::open_at(&db_path).unwrap();
        let users = UserService::new(&db);
        let alice = users.create_user("alice@example.com", Some("Alice")).unwrap().id;
        let bob = users.create_user("bob@example.com", Some("Bob")).unwrap().id;

        let follows = FollowService::new(&db);
        follows.follow(&alice, &bob).unwrap();
        follows.follow(&bob, &alice).unwrap();

        let loops = LoopService::new(&db, config.tags.clone());
        let run = loops.create_loop(&alice, public_daily("Run")).unwrap();
        loops.create_loop(&bob, public_daily("Stretch")).unwrap();

        let checkins = CheckInService::new(&db, config.streak.clone());
        for d in ["2024-03-03", "2024-03-04", "2024-03-05"] {
            checkins.check_in(&run.id, &alice, d, &clock).unwrap();
        }
        (alice, bob, run.id)
    };

    // Reopen and read everything back.
    let db = Database::open_at(&db_path).unwrap();
    let run = LoopService::new(&db, config.tags.clone())
        .get_loop(&run_id, &bob)
        .unwrap();
    assert_eq!(run.meta.current_streak, 3);
    assert_eq!(run.meta.longest_streak, 3);
    assert!((run.meta.completion_rate - 0.6).abs() < 1e-9);
    assert_eq!(run.meta.status, LoopStatus::Active);

    let board = friends_leaderboard(&db, &bob).unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].display_name, "Alice");
    assert_eq!(board[0].best_streak, 3);

    let page = trending(&db, 1, 20).unwrap();
    assert_eq!(page.items[0].id, run_id);
    let mut rng = rand_pcg::Pcg64::seed_from_u64(1);
    assert!(loop_of_the_day(&db, &mut rng).unwrap().is_some());

    let reactions = ReactionService::new(&db);
    reactions.add_reaction(&bob, &run_id, "🔥", &clock).unwrap();
    assert!(matches!(
        reactions.add_reaction(&bob, &run_id, "🔥", &clock),
        Err(CoreError::Conflict(_))
    ));
    assert_eq!(reactions.reactions_for_loop(&run_id).unwrap().len(), 1);

    let board = dashboard(&db, &alice).unwrap();
    assert_eq!(board.active.len(), 1);
    assert_eq!(user_stats(&db, &alice).unwrap().best_streak, 3);

    // Bob has not checked in on his loop today.
    assert_eq!(missed_check_ins(&db, &bob, day(5)).unwrap().len(), 1);
    assert!(missed_check_ins(&db, &alice, day(5)).unwrap().is_empty());
}

#[test]
fn test_clone_then_check_in_independently() {
    let db = Database::open_in_memory().unwrap();
    let users = UserService::new(&db);
    let alice = users.create_user("alice@example.com", None).unwrap().id;
    let bob = users.create_user("bob@example.com", None).unwrap().id;

    let loops = LoopService::new(&db, Default::default());
    let source = loops.create_loop(&alice, public_daily("Read")).unwrap();
    let checkins = CheckInService::new(&db, Default::default());
    let clock = FixedClock(day(2));
    checkins.check_in(&source.id, &alice, "2024-03-02", &clock).unwrap();

    let copy = loops
        .clone_loop(&bob, &source.id, CloneOverrides::default())
        .unwrap();
    assert_eq!(copy.meta.current_streak, 0);
    assert!(copy.meta.streak_history.is_empty());

    // Bob cannot write to Alice's loop, but can to his copy.
    assert!(matches!(
        checkins.check_in(&source.id, &bob, "2024-03-02", &clock),
        Err(CoreError::Forbidden(_))
    ));
    let report = checkins.check_in(&copy.id, &bob, "2024-03-01", &clock).unwrap();
    assert_eq!(report.meta.current_streak, 1);

    let source = db.get_loop(&source.id).unwrap().unwrap();
    assert_eq!(source.meta.current_streak, 1);
    assert_eq!(checkins.check_ins(&source.id, &bob).unwrap().len(), 1);
}

#[test]
fn test_grace_gap_and_hard_break() {
    let db = Database::open_in_memory().unwrap();
    let me = UserService::new(&db).create_user("g@example.com", None).unwrap().id;
    let l = LoopService::new(&db, Default::default())
        .create_loop(&me, public_daily("Write"))
        .unwrap();
    let checkins = CheckInService::new(&db, Default::default());
    let clock = FixedClock(day(20));

    for d in ["2024-03-01", "2024-03-02", "2024-03-04"] {
        checkins.check_in(&l.id, &me, d, &clock).unwrap();
    }
    let stored = db.get_loop(&l.id).unwrap().unwrap();
    assert_eq!(stored.meta.current_streak, 1);
    assert_eq!(stored.meta.longest_streak, 2);

    let report = checkins.check_in(&l.id, &me, "2024-03-10", &clock).unwrap();
    assert_eq!(report.meta.current_streak, 0);
    assert_eq!(report.meta.longest_streak, 2);
}
