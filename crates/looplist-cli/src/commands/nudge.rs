use looplist_core::nudge::missed_check_ins;

use super::{print_json, CliResult, Context};

pub fn run(ctx: &Context, date: Option<&str>) -> CliResult {
    let day = ctx.date_or_today(date)?;
    print_json(&missed_check_ins(&ctx.db, ctx.user()?, day)?)
}
