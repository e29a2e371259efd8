use crate::cmd::{connect, open_state, print_json, OutputFormat};
use crate::modules::views::{render_problems, ProblemRow};
use anyhow::{Context, Result};
use clap::Args;
use codeforces_stats_libs::api::{FilterResultResponse, FilterSort};
use codeforces_stats_libs::codeforces::client::CodeforcesApi;
use codeforces_stats_libs::filter::{
    all_tags, join_statistics, CompletionStatus, ProblemFilter, RatingRange,
};
use codeforces_stats_libs::storage::CompletionStore;
use std::time::Instant;
use validator::Validate;

#[derive(Debug, Args)]
pub struct ProblemsArgs {
    /// Matches problem names and tags
    #[arg(short, long)]
    keyword: Option<String>,
    /// `1200-1400` or `2100+`
    #[arg(short, long)]
    rating: Option<RatingRange>,
    #[arg(short, long)]
    tag: Option<String>,
    /// any, completed or not-completed
    #[arg(short, long, default_value = "any")]
    status: CompletionStatus,
    #[arg(short, long)]
    limit: Option<usize>,
    /// Print the available tags instead of problems
    #[arg(long)]
    tags: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub async fn run(args: ProblemsArgs) -> Result<()> {
    let filter = ProblemFilter {
        keyword: args.keyword,
        rating: args.rating,
        tag: args.tag,
        status: args.status,
    };
    filter.validate().with_context(|| {
        let message = format!("invalid problem filter {:?}", filter);
        tracing::error!(message);
        message
    })?;

    let client = connect()?;
    tracing::info!("Fetch problemset");
    let set = client.problems().await.with_context(|| {
        let message = "couldn't fetch problemset";
        tracing::error!(message);
        message
    })?;
    let entries = join_statistics(set);
    tracing::info!("{} problems fetched", entries.len());

    if args.tags {
        let tags = all_tags(entries.iter().map(|entry| &entry.problem));
        match args.format {
            OutputFormat::Text => tags.iter().for_each(|tag| println!("{}", tag)),
            OutputFormat::Json => print_json(&tags)?,
        }
        return Ok(());
    }

    let completion = CompletionStore::new(open_state()?);
    let flags = completion.snapshot()?;

    let start = Instant::now();
    let selected = filter.query(&flags).apply(&entries);
    let matched = selected.len();
    let rows: Vec<ProblemRow> = selected
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|entry| ProblemRow::new(entry, &flags))
        .collect();
    let elapsed = start.elapsed().as_millis() as u32;

    match args.format {
        OutputFormat::Text => {
            print!("{}", render_problems(&rows)?);
            println!("{} problems available", matched);
        }
        OutputFormat::Json => {
            let response = FilterResultResponse::new(filter, entries.len(), rows, elapsed);
            print_json(&response)?;
        }
    }
    Ok(())
}
