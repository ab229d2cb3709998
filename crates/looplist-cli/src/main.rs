use clap::{CommandFactory, Parser, Subcommand};
use looplist_core::{Config, ConfigError};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "looplist", version, about = "LoopList CLI")]
struct Cli {
    /// Acting user id
    #[arg(long = "as", global = true, env = "LOOPLIST_USER")]
    acting_user: Option<String>,
    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User accounts and profiles
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Loop management and check-ins
    Loop {
        #[command(subcommand)]
        action: commands::loops::LoopAction,
    },
    /// Follow graph
    Follow {
        #[command(subcommand)]
        action: commands::follow::FollowAction,
    },
    /// Emoji reactions
    React {
        #[command(subcommand)]
        action: commands::react::ReactAction,
    },
    /// Copy a public loop into your own list
    Clone(commands::clone::CloneArgs),
    /// Discover public loops
    Explore {
        #[command(subcommand)]
        action: commands::explore::ExploreAction,
    },
    /// Friends ranked by streak
    Leaderboard,
    /// Your loops grouped by progress
    Dashboard {
        #[command(subcommand)]
        action: commands::dashboard::DashboardAction,
    },
    /// Active loops not yet checked in on a day
    Nudge {
        /// Day to check (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(config: Option<&Config>) {
    let fallback = config.map_or("warn", |c| c.log.level.as_str());
    let filter = EnvFilter::try_from_env("LOOPLIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, config: Result<Config, ConfigError>) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => return commands::config::run(action, config),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "looplist", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let ctx = commands::Context::open(config?, cli.acting_user, cli.today.as_deref())?;
    match cli.command {
        Commands::User { action } => commands::user::run(&ctx, action),
        Commands::Loop { action } => commands::loops::run(&ctx, action),
        Commands::Follow { action } => commands::follow::run(&ctx, action),
        Commands::React { action } => commands::react::run(&ctx, action),
        Commands::Clone(args) => commands::clone::run(&ctx, args),
        Commands::Explore { action } => commands::explore::run(&ctx, action),
        Commands::Leaderboard => commands::leaderboard::run(&ctx),
        Commands::Dashboard { action } => commands::dashboard::run(&ctx, action),
        Commands::Nudge { date } => commands::nudge::run(&ctx, date.as_deref()),
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load();
    init_tracing(config.as_ref().ok());

    if let Err(e) = run(cli, config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
