use clap::Subcommand;
use looplist_core::UserService;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Create {
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a profile (defaults to the acting user)
    Show { id: Option<String> },
    /// Change the acting user's display name
    Update {
        #[arg(long)]
        name: String,
    },
}

pub fn run(ctx: &Context, action: UserAction) -> CliResult {
    let users = UserService::new(&ctx.db);
    match action {
        UserAction::Create { email, name } => {
            print_json(&users.create_user(&email, name.as_deref())?)
        }
        UserAction::Show { id } => {
            let id = match id {
                Some(id) => id,
                None => ctx.user()?.to_string(),
            };
            print_json(&users.get_profile(&id)?)
        }
        UserAction::Update { name } => print_json(&users.update_profile(ctx.user()?, Some(name.as_str()))?),
    }
}
