use clap::Subcommand;
use looplist_core::FollowService;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum FollowAction {
    /// Follow a user
    Add { user_id: String },
    /// Stop following a user
    Remove { user_id: String },
    /// Users the acting user follows
    Following,
    /// Users following the acting user
    Followers,
    /// Mutual follows
    Friends,
}

pub fn run(ctx: &Context, action: FollowAction) -> CliResult {
    let me = ctx.user()?;
    let follows = FollowService::new(&ctx.db);
    match action {
        FollowAction::Add { user_id } => print_json(&follows.follow(me, &user_id)?),
        FollowAction::Remove { user_id } => {
            follows.unfollow(me, &user_id)?;
            print_json(&serde_json::json!({ "unfollowed": user_id }))
        }
        FollowAction::Following => print_json(&follows.following(me)?),
        FollowAction::Followers => print_json(&follows.followers(me)?),
        FollowAction::Friends => print_json(&follows.friends(me)?),
    }
}
