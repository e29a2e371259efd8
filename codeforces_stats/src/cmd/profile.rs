use crate::cmd::{
    connect, print_json, request_interval, resolve_handle, verification_policy, OutputFormat,
};
use crate::modules::views::render_profile;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use codeforces_stats_libs::codeforces::client::{
    fetch_submissions, CodeforcesApi, CodeforcesError,
};
use codeforces_stats_libs::statistics::{aggregate, ProfileSummary};

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Defaults to the selected handle
    handle: Option<String>,
    #[arg(long, default_value_t = 1000)]
    page_size: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

pub async fn run(args: ProfileArgs) -> Result<()> {
    let handle = resolve_handle(args.handle)?;
    let client = connect()?;
    let handles = vec![handle.clone()];

    tracing::info!("Fetch profile of {}", handle);
    let (users, submissions, history) = futures::join!(
        client.user_info(&handles),
        fetch_submissions(&client, &handle, args.page_size, request_interval()),
        client.user_rating(&handle),
    );

    let user = users
        .and_then(|users| {
            users
                .into_iter()
                .next()
                .ok_or_else(|| CodeforcesError::EmptyResultError(String::from("user.info")))
        })
        .with_context(|| {
            let message = format!("couldn't fetch user information of {}", handle);
            tracing::error!(message);
            message
        })?;
    let submissions = submissions.with_context(|| {
        let message = format!("couldn't fetch submissions of {}", handle);
        tracing::error!(message);
        message
    })?;
    let history = history.unwrap_or_else(|e| {
        tracing::warn!("couldn't fetch rating history of {}: {}", handle, e);
        Vec::new()
    });

    let statistics = aggregate(&submissions);
    let summary = ProfileSummary::new(
        &user,
        &history,
        statistics,
        &verification_policy(),
        Utc::now(),
    );
    tracing::info!(
        "{} submissions, {} solved problems",
        summary.statistics.total_submission_count,
        summary.statistics.distinct_solved_count
    );

    match args.format {
        OutputFormat::Text => print!("{}", render_profile(&summary)?),
        OutputFormat::Json => print_json(&summary)?,
    }
    Ok(())
}
