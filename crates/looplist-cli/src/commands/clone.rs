use clap::Args;
use looplist_core::loops::tags::split_tags;
use looplist_core::{CloneOverrides, Visibility};

use super::{print_json, CliResult, Context};

#[derive(Args)]
pub struct CloneArgs {
    /// Public loop to copy
    loop_id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    frequency: Option<String>,
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    visibility: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
}

pub fn run(ctx: &Context, args: CloneArgs) -> CliResult {
    let overrides = CloneOverrides {
        title: args.title,
        frequency: args.frequency,
        start_date: args.start,
        visibility: args.visibility.map(|v| v.parse::<Visibility>()).transpose()?,
        icon: args.icon,
        category: args.category,
        tags: args.tags.as_deref().map(split_tags),
    };
    print_json(&ctx.loops().clone_loop(ctx.user()?, &args.loop_id, overrides)?)
}
