use crate::cmd::{connect, print_json, OutputFormat};
use crate::modules::views::{render_contests, ContestRow};
use anyhow::{Context, Result};
use clap::Args;
use codeforces_stats_libs::api::{FilterResultResponse, FilterSort};
use codeforces_stats_libs::codeforces::client::CodeforcesApi;
use codeforces_stats_libs::codeforces::model::ContestPhase;
use codeforces_stats_libs::filter::ContestFilter;
use std::time::Instant;
use validator::Validate;

#[derive(Debug, Args)]
pub struct ContestsArgs {
    #[arg(short, long)]
    keyword: Option<String>,
    /// before, coding, pending-system-test, system-test or finished
    #[arg(short, long)]
    phase: Option<ContestPhase>,
    /// List gym contests instead
    #[arg(long)]
    gym: bool,
    #[arg(short, long)]
    limit: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub async fn run(args: ContestsArgs) -> Result<()> {
    let filter = ContestFilter {
        keyword: args.keyword,
        phase: args.phase,
    };
    filter.validate().with_context(|| {
        let message = format!("invalid contest filter {:?}", filter);
        tracing::error!(message);
        message
    })?;

    let client = connect()?;
    tracing::info!("Fetch contest list (gym: {})", args.gym);
    let contests = client.contests(args.gym).await.with_context(|| {
        let message = "couldn't fetch contest list";
        tracing::error!(message);
        message
    })?;

    let start = Instant::now();
    let selected = filter.query().apply(&contests);
    let matched = selected.len();
    let rows: Vec<ContestRow> = selected
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(ContestRow::from)
        .collect();
    let elapsed = start.elapsed().as_millis() as u32;

    match args.format {
        OutputFormat::Text => {
            print!("{}", render_contests(&rows)?);
            println!("{} contests available", matched);
        }
        OutputFormat::Json => {
            let response = FilterResultResponse::new(filter, contests.len(), rows, elapsed);
            print_json(&response)?;
        }
    }
    Ok(())
}
