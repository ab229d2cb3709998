//! Friends leaderboard.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::social::friend_ids;
use crate::storage::Database;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub best_streak: u32,
    pub best_completion: f64,
}

/// Each mutual follow's best current streak and best completion rate,
/// strongest first.
pub fn friends_leaderboard(db: &Database, user_id: &str) -> Result<Vec<LeaderboardEntry>> {
    let friends = db.get_users(&friend_ids(db, user_id)?)?;

    let mut board = Vec::with_capacity(friends.len());
    for friend in friends {
        let loops = db.loops_for_user(&friend.id, None)?;
        let best_streak = loops.iter().map(|l| l.meta.current_streak).max().unwrap_or(0);
        let best_completion = loops
            .iter()
            .map(|l| l.meta.completion_rate)
            .fold(0.0, f64::max);
        board.push(LeaderboardEntry {
            display_name: friend.name().to_string(),
            user_id: friend.id,
            best_streak,
            best_completion,
        });
    }

    board.sort_by(|a, b| {
        b.best_streak
            .cmp(&a.best_streak)
            .then_with(|| b.best_completion.total_cmp(&a.best_completion))
    });
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loops::service::LoopService;
    use crate::loops::tags::TagRules;
    use crate::loops::NewLoop;
    use crate::social::FollowService;
    use crate::users::UserService;

    fn befriend(db: &Database, a: &str, b: &str) {
        let follows = FollowService::new(db);
        follows.follow(a, b).unwrap();
        follows.follow(b, a).unwrap();
    }

    fn loop_with(db: &Database, owner: &str, streak: u32, rate: f64) {
        let mut l = LoopService::new(db, TagRules::default())
            .create_loop(
                owner,
                NewLoop {
                    title: "x".into(),
                    frequency: "daily".into(),
                    start_date: "2024-01-01".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        l.meta.current_streak = streak;
        l.meta.completion_rate = rate;
        db.update_loop(&l).unwrap();
    }

    #[test]
    fn ranks_friends_by_streak_then_completion() {
        let db = Database::open_in_memory().unwrap();
        let users = UserService::new(&db);
        let me = users.create_user("me@example.com", Some("Me")).unwrap().id;
        let ann = users.create_user("ann@example.com", Some("Ann")).unwrap().id;
        let bob = users.create_user("bob@example.com", Some("Bob")).unwrap().id;
        let cat = users.create_user("cat@example.com", Some("Cat")).unwrap().id;
        let stranger = users.create_user("s@example.com", Some("S")).unwrap().id;

        befriend(&db, &me, &ann);
        befriend(&db, &me, &bob);
        befriend(&db, &me, &cat);
        FollowService::new(&db).follow(&me, &stranger).unwrap();

        loop_with(&db, &ann, 4, 0.5);
        loop_with(&db, &ann, 1, 0.9);
        loop_with(&db, &bob, 4, 0.7);
        loop_with(&db, &stranger, 50, 1.0);

        let board = friends_leaderboard(&db, &me).unwrap();
        let names: Vec<&str> = board.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cat"]);
        assert_eq!(board[0].best_streak, 4);
        assert_eq!(board[0].best_completion, 0.9);
        assert_eq!(board[2].best_streak, 0);
        assert_eq!(board[2].best_completion, 0.0);
    }

    #[test]
    fn no_friends_no_board() {
        let db = Database::open_in_memory().unwrap();
        let me = UserService::new(&db).create_user("me@example.com", None).unwrap().id;
        assert!(friends_leaderboard(&db, &me).unwrap().is_empty());
    }
}
