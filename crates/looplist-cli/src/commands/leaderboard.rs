use looplist_core::leaderboard::friends_leaderboard;

use super::{print_json, CliResult, Context};

pub fn run(ctx: &Context) -> CliResult {
    print_json(&friends_leaderboard(&ctx.db, ctx.user()?)?)
}
