use clap::Subcommand;
use looplist_core::dashboard;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum DashboardAction {
    /// Loops grouped into active, paused and completed
    Show,
    /// Summary counts
    Stats,
    /// Loops narrowed by frequency and/or category
    Filter {
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
}

pub fn run(ctx: &Context, action: DashboardAction) -> CliResult {
    let me = ctx.user()?;
    match action {
        DashboardAction::Show => print_json(&dashboard::dashboard(&ctx.db, me)?),
        DashboardAction::Stats => print_json(&dashboard::user_stats(&ctx.db, me)?),
        DashboardAction::Filter {
            frequency,
            category,
        } => print_json(&dashboard::filter_loops(
            &ctx.db,
            me,
            frequency.as_deref(),
            category.as_deref(),
        )?),
    }
}
