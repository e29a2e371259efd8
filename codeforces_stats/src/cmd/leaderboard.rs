use crate::cmd::{connect, print_json, validate_handle, verification_policy, OutputFormat};
use crate::modules::views::{render_leaderboard, LeaderboardRow};
use anyhow::{Context, Result};
use clap::Args;
use codeforces_stats_libs::api::FilterSort;
use codeforces_stats_libs::codeforces::client::CodeforcesApi;
use codeforces_stats_libs::filter::{distinct_cities, distinct_countries, LeaderboardFilter};
use serde::Serialize;
use validator::Validate;

const DEFAULT_HANDLES: [&str; 12] = [
    "tourist",
    "Benq",
    "Um_nik",
    "jiangly",
    "Radewoosh",
    "SiamAhmedOlied",
    "mnbvmar",
    "scott_wu",
    "Petr",
    "apiad",
    "ecnerwala",
    "ksun48",
];

#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    /// Handles to compare. Defaults to a built-in list of top users
    handles: Vec<String>,
    /// Matches handles and names
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Print the countries and cities present instead of users
    #[arg(long)]
    locations: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Locations {
    countries: Vec<String>,
    cities: Vec<String>,
}

pub async fn run(args: LeaderboardArgs) -> Result<()> {
    let handles: Vec<String> = if args.handles.is_empty() {
        DEFAULT_HANDLES.iter().map(|handle| handle.to_string()).collect()
    } else {
        args.handles
    };
    for handle in handles.iter() {
        validate_handle(handle)?;
    }

    let filter = LeaderboardFilter {
        keyword: args.keyword,
        country: args.country,
        city: args.city,
    };
    filter.validate().with_context(|| {
        let message = format!("invalid leaderboard filter {:?}", filter);
        tracing::error!(message);
        message
    })?;

    let client = connect()?;
    tracing::info!("Fetch {} users", handles.len());
    let users = client.user_info(&handles).await.with_context(|| {
        let message = "couldn't fetch user information";
        tracing::error!(message);
        message
    })?;

    if args.locations {
        let locations = Locations {
            countries: distinct_countries(&users),
            cities: distinct_cities(&users),
        };
        match args.format {
            OutputFormat::Text => {
                println!("Countries: {}", locations.countries.join(", "));
                println!("Cities: {}", locations.cities.join(", "));
            }
            OutputFormat::Json => print_json(&locations)?,
        }
        return Ok(());
    }

    let policy = verification_policy();
    let rows: Vec<LeaderboardRow> = filter
        .query()
        .apply(&users)
        .into_iter()
        .enumerate()
        .map(|(position, user)| LeaderboardRow::new(position + 1, user, &policy))
        .collect();

    match args.format {
        OutputFormat::Text => print!("{}", render_leaderboard(&rows)?),
        OutputFormat::Json => print_json(&rows)?,
    }
    Ok(())
}
