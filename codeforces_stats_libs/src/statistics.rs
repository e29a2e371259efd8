use crate::codeforces::model::{ProblemKey, RatingChange, Submission, User};
use crate::rating::RatingTier;
use crate::verification::{BadgeVariant, VerificationPolicy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::SerializeDisplay;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

const BUCKET_WIDTH: i32 = 200;
const TOP_TAG_COUNT: usize = 3;

/// A 200-wide band of problem ratings, identified by its lower bound.
#[derive(SerializeDisplay, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingBucket(i32);

impl RatingBucket {
    pub fn of(rating: i32) -> Self {
        RatingBucket(rating.div_euclid(BUCKET_WIDTH) * BUCKET_WIDTH)
    }

    pub fn lower(&self) -> i32 {
        self.0
    }

    pub fn upper(&self) -> i32 {
        self.0 + BUCKET_WIDTH - 1
    }
}

impl fmt::Display for RatingBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.lower(), self.upper())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub distinct_solved_count: u32,
    pub average_solved_rating: u32,
    pub total_submission_count: u32,
    pub accepted_submission_count: u32,
    pub acceptance_rate: u32,
    pub rating_histogram: BTreeMap<RatingBucket, u32>,
    /// Tags in the order they were first seen on a solved problem.
    pub tag_histogram: Vec<TagCount>,
    pub top_tags: Vec<TagCount>,
    pub favorite_rating_range: Option<RatingBucket>,
}

/// Single-pass accumulator over a submission history.
#[derive(Debug, Default)]
pub struct Aggregator {
    solved: HashSet<ProblemKey>,
    rating_sum: i64,
    total: u32,
    accepted: u32,
    rating_histogram: BTreeMap<RatingBucket, u32>,
    tag_positions: HashMap<String, usize>,
    tag_histogram: Vec<TagCount>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, submission: &Submission) {
        self.total += 1;
        if !submission.is_accepted() {
            return;
        }
        self.accepted += 1;

        let Some(key) = submission.problem.key() else {
            return;
        };
        if !self.solved.insert(key) {
            return;
        }

        if let Some(rating) = submission.problem.rating.filter(|r| *r > 0) {
            self.rating_sum += rating as i64;
            *self
                .rating_histogram
                .entry(RatingBucket::of(rating))
                .or_insert(0) += 1;
        }

        for tag in submission.problem.tags.iter() {
            match self.tag_positions.get(tag) {
                Some(&position) => self.tag_histogram[position].count += 1,
                None => {
                    self.tag_positions
                        .insert(tag.clone(), self.tag_histogram.len());
                    self.tag_histogram.push(TagCount {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    pub fn finish(self) -> Statistics {
        let distinct_solved_count = self.solved.len() as u32;
        let average_solved_rating = if distinct_solved_count == 0 {
            0
        } else {
            (self.rating_sum as f64 / distinct_solved_count as f64).round() as u32
        };
        let acceptance_rate = if self.total == 0 {
            0
        } else {
            (100.0 * self.accepted as f64 / self.total as f64).round() as u32
        };

        let mut top_tags = self.tag_histogram.clone();
        top_tags.sort_by(|a, b| b.count.cmp(&a.count));
        top_tags.truncate(TOP_TAG_COUNT);

        let mut favorite_rating_range: Option<(RatingBucket, u32)> = None;
        for (bucket, count) in self.rating_histogram.iter() {
            match favorite_rating_range {
                Some((_, best)) if best >= *count => {}
                _ => favorite_rating_range = Some((*bucket, *count)),
            }
        }

        Statistics {
            distinct_solved_count,
            average_solved_rating,
            total_submission_count: self.total,
            accepted_submission_count: self.accepted,
            acceptance_rate,
            rating_histogram: self.rating_histogram,
            tag_histogram: self.tag_histogram,
            top_tags,
            favorite_rating_range: favorite_rating_range.map(|(bucket, _)| bucket),
        }
    }
}

pub fn aggregate<'a, I>(submissions: I) -> Statistics
where
    I: IntoIterator<Item = &'a Submission>,
{
    let mut aggregator = Aggregator::new();
    for submission in submissions {
        aggregator.push(submission);
    }
    aggregator.finish()
}

/// Everything the profile view shows about one user.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub handle: String,
    pub full_name: Option<String>,
    pub avatar: String,
    pub rank: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub organization: Option<String>,
    pub current_rating: i32,
    pub current_tier: RatingTier,
    pub max_rating: i32,
    pub max_tier: RatingTier,
    pub contests_participated: u32,
    pub days_active: Option<i64>,
    pub badge: BadgeVariant,
    pub statistics: Statistics,
}

impl ProfileSummary {
    pub fn new(
        user: &User,
        history: &[RatingChange],
        statistics: Statistics,
        policy: &VerificationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let current_rating = user.rating.unwrap_or(0);
        let max_rating = user.max_rating.or(user.rating).unwrap_or(0);
        let days_active = user
            .registration_time_seconds
            .map(|registered| (now - registered).num_days());

        Self {
            handle: user.handle.clone(),
            full_name: user.full_name(),
            avatar: user.avatar.clone(),
            rank: user.rank.clone(),
            country: user.country.clone(),
            city: user.city.clone(),
            organization: user.organization.clone(),
            current_rating,
            current_tier: RatingTier::from_rating(user.rating),
            max_rating,
            max_tier: RatingTier::from_rating(Some(max_rating)),
            contests_participated: history.len() as u32,
            days_active,
            badge: policy.classify(&user.handle, user.rating),
            statistics,
        }
    }
}
