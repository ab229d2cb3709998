//! Loop management and check-in commands.

use clap::{Args, Subcommand};
use looplist_core::loops::tags::split_tags;
use looplist_core::{LoopStatus, LoopUpdate, NewLoop, Visibility};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum LoopAction {
    /// Create a loop
    Create {
        title: String,
        /// daily, 3x_week, weekdays or custom
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Start date (defaults to today)
        #[arg(long)]
        start: Option<String>,
        /// public, private or friends
        #[arg(long, default_value = "private")]
        visibility: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List the acting user's loops
    List {
        #[arg(long)]
        visibility: Option<String>,
    },
    /// Show one loop
    Show { id: String },
    /// Edit a loop
    Update(UpdateArgs),
    /// Delete a loop with its check-ins and reactions
    Delete { id: String },
    /// Mark a day completed (defaults to today)
    Checkin {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a day missed (defaults to today)
    Miss {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Recompute streaks from stored check-ins
    Recompute { id: String },
    /// Stored check-ins, oldest first
    History { id: String },
    /// Public loops sharing a tag
    Related { id: String },
}

#[derive(Args)]
pub struct UpdateArgs {
    id: String,
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
    #[arg(long)]
    tags: Option<String>,
    /// active, paused or completed
    #[arg(long)]
    status: Option<String>,
}

pub fn run(ctx: &Context, action: LoopAction) -> CliResult {
    let user = ctx.user()?;
    match action {
        LoopAction::Create {
            title,
            frequency,
            start,
            visibility,
            icon,
            category,
            tags,
        } => {
            let new = NewLoop {
                title,
                frequency,
                start_date: ctx.day_or_today(start.as_deref()),
                visibility: visibility.parse::<Visibility>()?,
                icon,
                category,
                tags: tags.as_deref().map(split_tags).unwrap_or_default(),
            };
            print_json(&ctx.loops().create_loop(user, new)?)
        }
        LoopAction::List { visibility } => {
            let visibility = visibility.map(|v| v.parse::<Visibility>()).transpose()?;
            print_json(&ctx.loops().list_loops(user, visibility)?)
        }
        LoopAction::Show { id } => print_json(&ctx.loops().get_loop(&id, user)?),
        LoopAction::Update(args) => {
            let update = LoopUpdate {
                title: args.title,
                frequency: args.frequency,
                start_date: args.start,
                visibility: args.visibility.map(|v| v.parse::<Visibility>()).transpose()?,
                icon: args.icon,
                category: args.category,
                tags: args.tags.as_deref().map(split_tags),
                status: args.status.map(|s| s.parse::<LoopStatus>()).transpose()?,
            };
            print_json(&ctx.loops().update_loop(&args.id, user, update)?)
        }
        LoopAction::Delete { id } => {
            ctx.loops().delete_loop(&id, user)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        LoopAction::Checkin { id, date } => {
            let day = ctx.day_or_today(date.as_deref());
            print_json(&ctx.checkins().check_in(&id, user, &day, ctx.clock())?)
        }
        LoopAction::Miss { id, date } => {
            let day = ctx.day_or_today(date.as_deref());
            print_json(&ctx.checkins().mark_missed(&id, user, &day, ctx.clock())?)
        }
        LoopAction::Recompute { id } => {
            print_json(&ctx.checkins().recompute_loop(&id, user, ctx.clock())?)
        }
        LoopAction::History { id } => print_json(&ctx.checkins().check_ins(&id, user)?),
        LoopAction::Related { id } => {
            ctx.loops().get_loop(&id, user)?;
            print_json(&ctx.loops().related_loops(&id)?)
        }
    }
}
