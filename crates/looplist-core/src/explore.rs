//! Public loop discovery: trending, per-category listing and a daily pick.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::Result;
use crate::loops::service::by_streak_then_completion;
use crate::loops::{Loop, LoopStatus, Visibility};
use crate::storage::Database;

/// Pool size the loop of the day is drawn from.
const DAILY_POOL: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based page `page` of `limit` items.
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();
    let items = items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();
    Page {
        items,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    }
}

/// Public loops ranked by current streak, longest streak, then completion.
pub fn trending(db: &Database, page: usize, limit: usize) -> Result<Page<Loop>> {
    let mut loops = db.loops_with_visibility(Visibility::Public)?;
    loops.sort_by(|a, b| {
        b.meta
            .current_streak
            .cmp(&a.meta.current_streak)
            .then_with(|| b.meta.longest_streak.cmp(&a.meta.longest_streak))
            .then_with(|| b.meta.completion_rate.total_cmp(&a.meta.completion_rate))
    });
    Ok(paginate(loops, page, limit))
}

/// Public loops in `category`, newest first.
pub fn by_category(db: &Database, category: &str, page: usize, limit: usize) -> Result<Page<Loop>> {
    let loops: Vec<Loop> = db
        .loops_with_visibility(Visibility::Public)?
        .into_iter()
        .filter(|l| l.category.as_deref() == Some(category))
        .collect();
    Ok(paginate(loops, page, limit))
}

/// Random pick among the strongest public active loops.
pub fn loop_of_the_day<R: Rng + ?Sized>(db: &Database, rng: &mut R) -> Result<Option<Loop>> {
    let mut pool: Vec<Loop> = db
        .loops_with_visibility(Visibility::Public)?
        .into_iter()
        .filter(|l| l.meta.status == LoopStatus::Active)
        .collect();
    pool.sort_by(by_streak_then_completion);
    pool.truncate(DAILY_POOL);
    Ok(pool.choose(rng).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loops::service::LoopService;
    use crate::loops::tags::TagRules;
    use crate::loops::NewLoop;
    use crate::users::UserService;
    use rand::SeedableRng;

    fn seed(db: &Database, streaks: &[u32]) -> Vec<String> {
        let user = UserService::new(db).create_user("e@example.com", None).unwrap();
        let service = LoopService::new(db, TagRules::default());
        streaks
            .iter()
            .enumerate()
            .map(|(i, &streak)| {
                let mut l = service
                    .create_loop(
                        &user.id,
                        NewLoop {
                            title: format!("loop {i}"),
                            frequency: "daily".into(),
                            start_date: "2024-01-01".into(),
                            visibility: Visibility::Public,
                            category: Some(if i % 2 == 0 { "even" } else { "odd" }.into()),
                            ..Default::default()
                        },
                    )
                    .unwrap();
                l.meta.current_streak = streak;
                l.meta.longest_streak = streak;
                db.update_loop(&l).unwrap();
                l.id
            })
            .collect()
    }

    #[test]
    fn paginate_counts_pages() {
        let page = paginate((0..45).collect::<Vec<_>>(), 3, 20);
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);

        let empty = paginate(Vec::<u8>::new(), 0, 0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.limit, 1);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn trending_orders_by_streak() {
        let db = Database::open_in_memory().unwrap();
        let ids = seed(&db, &[1, 7, 3]);
        let page = trending(&db, 1, 2).unwrap();
        let got: Vec<&str> = page.items.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(got, vec![ids[1].as_str(), ids[2].as_str()]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn category_filter() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, &[1, 2, 3]);
        assert_eq!(by_category(&db, "even", 1, 20).unwrap().total, 2);
        assert_eq!(by_category(&db, "none", 1, 20).unwrap().total, 0);
    }

    #[test]
    fn loop_of_the_day_draws_from_top_pool() {
        let db = Database::open_in_memory().unwrap();
        let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
        assert!(loop_of_the_day(&db, &mut rng).unwrap().is_none());

        let streaks: Vec<u32> = (0..12).collect();
        let ids = seed(&db, &streaks);
        // Streaks 0 and 1 fall outside the top ten.
        for _ in 0..20 {
            let pick = loop_of_the_day(&db, &mut rng).unwrap().unwrap();
            assert!(pick.id != ids[0] && pick.id != ids[1]);
        }
    }
}
