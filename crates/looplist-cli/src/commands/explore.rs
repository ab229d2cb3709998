use clap::Subcommand;
use looplist_core::explore;
use looplist_core::loops::tags::split_tags;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ExploreAction {
    /// Public loops with the strongest streaks
    Trending {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Public loops in a category
    Category {
        category: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Public loops carrying any of the comma-separated tags
    Tags { tags: String },
    /// Random pick among the top public loops
    Daily,
    /// Friends-only loops shared by mutual follows
    Friends,
}

pub fn run(ctx: &Context, action: ExploreAction) -> CliResult {
    match action {
        ExploreAction::Trending { page, limit } => {
            print_json(&explore::trending(&ctx.db, page, limit)?)
        }
        ExploreAction::Category {
            category,
            page,
            limit,
        } => print_json(&explore::by_category(&ctx.db, &category, page, limit)?),
        ExploreAction::Tags { tags } => {
            print_json(&ctx.loops().loops_by_tags(&split_tags(&tags))?)
        }
        ExploreAction::Daily => {
            let pick = explore::loop_of_the_day(&ctx.db, &mut rand::thread_rng())?;
            print_json(&pick)
        }
        ExploreAction::Friends => print_json(&ctx.loops().friends_only_loops(ctx.user()?)?),
    }
}
