mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, roster::RosterSubcommand, submit::SubmitArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "patrol",
    about = "Inspection round logging — record inspections and track submission counters",
    version,
    propagate_version = true
)]
struct Cli {
    /// Patrol root (default: auto-detect from .patrol/ or .git/)
    #[arg(long, global = true, env = "PATROL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize patrol in the current directory
    Init,

    /// Record one inspection
    Submit(SubmitArgs),

    /// Show the submission counters and leaderboard
    Stats,

    /// Manage the member roster
    Roster {
        #[command(subcommand)]
        subcommand: RosterSubcommand,
    },

    /// Inspect or update configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Submit(args) => cmd::submit::run(&root, args, cli.json),
        Commands::Stats => cmd::stats::run(&root, cli.json),
        Commands::Roster { subcommand } => cmd::roster::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
