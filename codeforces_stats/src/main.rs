mod cmd;
mod modules;

use crate::cmd::{
    complete::{self, CompleteArgs},
    contests::{self, ContestsArgs},
    handle::{self, HandleArgs},
    leaderboard::{self, LeaderboardArgs},
    problems::{self, ProblemsArgs},
    profile::{self, ProfileArgs},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "codeforces_stats")]
#[command(about = "Codeforces statistics dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show rating, solved problems and tag statistics of a user
    Profile(ProfileArgs),
    /// List rated problems from the problemset
    Problems(ProblemsArgs),
    /// List contests
    Contests(ContestsArgs),
    /// Compare a group of users
    Leaderboard(LeaderboardArgs),
    /// Show or change the selected handle
    Handle(HandleArgs),
    /// Mark problems as completed
    Complete(CompleteArgs),
}

fn main() {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .expect("couldn't parse specified log level")
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().unwrap());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let runtime = Builder::new_multi_thread().enable_all().build().unwrap();

    let result = match Cli::parse().command {
        Commands::Profile(args) => runtime.block_on(profile::run(args)),
        Commands::Problems(args) => runtime.block_on(problems::run(args)),
        Commands::Contests(args) => runtime.block_on(contests::run(args)),
        Commands::Leaderboard(args) => runtime.block_on(leaderboard::run(args)),
        Commands::Handle(args) => handle::run(args),
        Commands::Complete(args) => complete::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
