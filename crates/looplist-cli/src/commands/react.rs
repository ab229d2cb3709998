use clap::Subcommand;
use looplist_core::ReactionService;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ReactAction {
    /// React to a loop with an emoji
    Add { loop_id: String, emoji: String },
    /// Reactions on a loop
    List { loop_id: String },
}

pub fn run(ctx: &Context, action: ReactAction) -> CliResult {
    let reactions = ReactionService::new(&ctx.db);
    match action {
        ReactAction::Add { loop_id, emoji } => {
            print_json(&reactions.add_reaction(ctx.user()?, &loop_id, &emoji, ctx.clock())?)
        }
        ReactAction::List { loop_id } => {
            ctx.loops().get_loop(&loop_id, ctx.user()?)?;
            print_json(&reactions.reactions_for_loop(&loop_id)?)
        }
    }
}
