use chrono::{DateTime, Local, Utc};
use codeforces_stats_libs::api::CompletionLookup;
use codeforces_stats_libs::codeforces::model::{Contest, ProblemEntry, User};
use codeforces_stats_libs::codeforces::{contest_url, problem_url, profile_url};
use codeforces_stats_libs::rating::{classify, RatingTier};
use codeforces_stats_libs::statistics::ProfileSummary;
use codeforces_stats_libs::{BadgeVariant, VerificationPolicy};
use itertools::Itertools;
use serde::Serialize;
use std::fmt::{self, Write};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRow {
    pub key: String,
    pub name: String,
    pub rating: Option<i32>,
    pub tier: &'static str,
    pub display_class: &'static str,
    pub tags: Vec<String>,
    pub solved_count: u32,
    pub completed: bool,
    pub url: Option<String>,
}

impl ProblemRow {
    pub fn new(entry: &ProblemEntry, completion: &(impl CompletionLookup + ?Sized)) -> Self {
        let problem = &entry.problem;
        let key = problem.key();
        let (tier, display_class) = classify(problem.rating);

        Self {
            key: key
                .as_ref()
                .map(|key| key.to_string())
                .unwrap_or_else(|| problem.index.clone()),
            name: problem.name.clone(),
            rating: problem.rating,
            tier,
            display_class,
            tags: problem.tags.clone(),
            solved_count: entry.solved_count,
            completed: key
                .as_ref()
                .map_or(false, |key| completion.is_completed(key)),
            url: key.as_ref().map(|key| problem_url(key, false)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRow {
    pub id: i32,
    pub name: String,
    pub phase: String,
    pub start_time: Option<DateTime<Utc>>,
    pub duration: String,
    pub url: String,
}

impl From<&Contest> for ContestRow {
    fn from(contest: &Contest) -> Self {
        Self {
            id: contest.id,
            name: contest.name.clone(),
            phase: contest.phase.label().to_string(),
            start_time: contest.start_time(),
            duration: contest.duration_label(),
            url: contest_url(contest.id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub position: usize,
    pub handle: String,
    pub full_name: Option<String>,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub tier: RatingTier,
    pub country: Option<String>,
    pub city: Option<String>,
    pub badge: BadgeVariant,
    pub url: String,
}

impl LeaderboardRow {
    pub fn new(position: usize, user: &User, policy: &VerificationPolicy) -> Self {
        Self {
            position,
            handle: user.handle.clone(),
            full_name: user.full_name(),
            rating: user.rating,
            max_rating: user.max_rating,
            tier: RatingTier::from_rating(user.rating),
            country: user.country.clone(),
            city: user.city.clone(),
            badge: policy.classify(&user.handle, user.rating),
            url: profile_url(&user.handle),
        }
    }
}

fn badge_suffix(badge: BadgeVariant) -> String {
    match badge {
        BadgeVariant::None => String::new(),
        badge => format!(" [{}]", badge.title()),
    }
}

fn rating_text(rating: Option<i32>) -> String {
    match rating {
        Some(rating) => format!("{} ({})", rating, RatingTier::from_rating(Some(rating))),
        None => String::from("Unrated"),
    }
}

pub fn render_profile(summary: &ProfileSummary) -> Result<String, fmt::Error> {
    let statistics = &summary.statistics;
    let mut out = String::new();

    writeln!(out, "{}{}", summary.handle, badge_suffix(summary.badge))?;
    if let Some(name) = &summary.full_name {
        writeln!(out, "  {}", name)?;
    }
    let location = [summary.city.as_deref(), summary.country.as_deref()]
        .into_iter()
        .flatten()
        .join(", ");
    if !location.is_empty() {
        writeln!(out, "  {}", location)?;
    }
    if let Some(organization) = &summary.organization {
        writeln!(out, "  {}", organization)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Current Rating     {} ({})",
        summary.current_rating, summary.current_tier
    )?;
    writeln!(
        out,
        "Max Rating         {} ({})",
        summary.max_rating, summary.max_tier
    )?;
    writeln!(out, "Problems Solved    {}", statistics.distinct_solved_count)?;
    writeln!(out, "Average Rating     {}", statistics.average_solved_rating)?;
    writeln!(out, "Contests           {}", summary.contests_participated)?;
    writeln!(out, "Total Submissions  {}", statistics.total_submission_count)?;
    writeln!(out, "Acceptance Rate    {}%", statistics.acceptance_rate)?;
    if let Some(days) = summary.days_active {
        writeln!(out, "Days Active        {}", days)?;
    }
    writeln!(
        out,
        "Favorite Rating    {}",
        statistics
            .favorite_rating_range
            .map(|bucket| bucket.to_string())
            .unwrap_or_else(|| String::from("N/A"))
    )?;
    if !statistics.top_tags.is_empty() {
        writeln!(
            out,
            "Favorite Tags      {}",
            statistics.top_tags.iter().map(|t| t.tag.as_str()).join(", ")
        )?;
    }

    if !statistics.rating_histogram.is_empty() {
        writeln!(out)?;
        writeln!(out, "Solved by rating")?;
        for (bucket, count) in statistics.rating_histogram.iter() {
            writeln!(out, "  {:>9}  {}", bucket.to_string(), count)?;
        }
    }
    if !statistics.tag_histogram.is_empty() {
        writeln!(out)?;
        writeln!(out, "Solved by tag")?;
        for tag in statistics
            .tag_histogram
            .iter()
            .sorted_by(|a, b| b.count.cmp(&a.count))
        {
            writeln!(out, "  {:<28} {}", tag.tag, tag.count)?;
        }
    }

    Ok(out)
}

pub fn render_problems(rows: &[ProblemRow]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for row in rows {
        writeln!(
            out,
            "{} {:<8} {:<40} {:>5} {:>8}  {}",
            if row.completed { "[x]" } else { "[ ]" },
            row.key,
            row.name,
            row.rating.map(|r| r.to_string()).unwrap_or_default(),
            row.solved_count,
            row.tags.join(", ")
        )?;
    }
    Ok(out)
}

pub fn render_contests(rows: &[ContestRow]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for row in rows {
        let start = row
            .start_time
            .map(|time| {
                time.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| String::from("-"));
        writeln!(
            out,
            "{:>6}  {:<20} {:<16} {:>8}  {}",
            row.id, row.phase, start, row.duration, row.name
        )?;
    }
    Ok(out)
}

pub fn render_leaderboard(rows: &[LeaderboardRow]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for row in rows {
        let location = [row.city.as_deref(), row.country.as_deref()]
            .into_iter()
            .flatten()
            .join(", ");
        writeln!(
            out,
            "#{:<3} {:<24} {:<36} {}{}",
            row.position,
            row.handle,
            rating_text(row.rating),
            location,
            badge_suffix(row.badge)
        )?;
    }
    Ok(out)
}
