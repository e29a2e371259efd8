use crate::api::{CompletionLookup, FilterSort};
use crate::codeforces::model::{
    Contest, ContestPhase, Problem, ProblemEntry, ProblemKey, ProblemSet, User,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use validator::{Validate, ValidationError};

/// Handle syntax accepted by the platform.
pub static HANDLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,24}$").unwrap());

/// Rating ranges offered by the problem selector, as `(value, label)`.
pub const RATING_PRESETS: [(&str, &str); 7] = [
    ("", "All Ratings"),
    ("800-1200", "800-1200"),
    ("1200-1400", "1200-1400"),
    ("1400-1600", "1400-1600"),
    ("1600-1900", "1600-1900"),
    ("1900-2100", "1900-2100"),
    ("2100+", "2100+"),
];

/// Case folding applied to both sides of every text match.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

fn normalized_keyword(keyword: &Option<String>) -> Option<String> {
    keyword
        .as_deref()
        .map(|keyword| normalize(keyword.trim()))
        .filter(|keyword| !keyword.is_empty())
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rating range `{0}`, expected `<min>-<max>` or `<min>+`")]
pub struct ParseRatingRangeError(String);

/// Closed rating interval. `max == None` leaves the upper end open.
#[derive(SerializeDisplay, DeserializeFromStr, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingRange {
    pub min: i32,
    pub max: Option<i32>,
}

impl RatingRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn at_least(min: i32) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, rating: i32) -> bool {
        rating >= self.min && self.max.map_or(true, |max| rating <= max)
    }
}

impl fmt::Display for RatingRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

impl FromStr for RatingRange {
    type Err = ParseRatingRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseRatingRangeError(s.to_string());
        let s = s.trim();

        if let Some(min) = s.strip_suffix('+').or_else(|| s.strip_prefix(">=")) {
            let min = min.trim().parse::<i32>().map_err(|_| error())?;
            return Ok(RatingRange::at_least(min));
        }

        let (min, max) = s.split_once('-').ok_or_else(error)?;
        let min = min.trim().parse::<i32>().map_err(|_| error())?;
        let max = max.trim().parse::<i32>().map_err(|_| error())?;
        Ok(RatingRange::new(min, max))
    }
}

fn validate_rating_range(range: &RatingRange) -> Result<(), ValidationError> {
    match range.max {
        Some(max) if max < range.min => Err(ValidationError::new("rating range is reversed")),
        _ => Ok(()),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid completion status `{0}`, expected one of `any`, `completed`, `not-completed`")]
pub struct ParseCompletionStatusError(String);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    #[default]
    Any,
    Completed,
    NotCompleted,
}

impl CompletionStatus {
    fn accepts(&self, completed: bool) -> bool {
        match self {
            CompletionStatus::Any => true,
            CompletionStatus::Completed => completed,
            CompletionStatus::NotCompleted => !completed,
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompletionStatus::Any => write!(f, "any"),
            CompletionStatus::Completed => write!(f, "completed"),
            CompletionStatus::NotCompleted => write!(f, "not-completed"),
        }
    }
}

impl FromStr for CompletionStatus {
    type Err = ParseCompletionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "" | "any" | "all" => Ok(CompletionStatus::Any),
            "completed" => Ok(CompletionStatus::Completed),
            "not-completed" | "uncompleted" => Ok(CompletionStatus::NotCompleted),
            _ => Err(ParseCompletionStatusError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, PartialEq, Eq)]
pub struct ProblemFilter {
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
    #[validate(custom = "validate_rating_range")]
    pub rating: Option<RatingRange>,
    pub tag: Option<String>,
    #[serde(default)]
    pub status: CompletionStatus,
}

impl ProblemFilter {
    pub fn query<'a, C: CompletionLookup + ?Sized>(
        &'a self,
        completion: &'a C,
    ) -> ProblemQuery<'a, C> {
        ProblemQuery {
            filter: self,
            keyword: normalized_keyword(&self.keyword),
            completion,
        }
    }
}

/// A validated [`ProblemFilter`] bound to the completion flags it reads.
pub struct ProblemQuery<'a, C: CompletionLookup + ?Sized> {
    filter: &'a ProblemFilter,
    keyword: Option<String>,
    completion: &'a C,
}

impl<'a, C: CompletionLookup + ?Sized> ProblemQuery<'a, C> {
    fn is_completed(&self, problem: &Problem) -> bool {
        problem
            .key()
            .map_or(false, |key| self.completion.is_completed(&key))
    }
}

impl<'a, C: CompletionLookup + ?Sized> FilterSort<ProblemEntry> for ProblemQuery<'a, C> {
    fn matches(&self, entry: &ProblemEntry) -> bool {
        let problem = &entry.problem;
        let Some(rating) = problem.rating.filter(|r| *r > 0) else {
            return false;
        };

        if let Some(keyword) = &self.keyword {
            let hit = normalize(&problem.name).contains(keyword.as_str())
                || problem
                    .tags
                    .iter()
                    .any(|tag| normalize(tag).contains(keyword.as_str()));
            if !hit {
                return false;
            }
        }
        if let Some(range) = &self.filter.rating {
            if !range.contains(rating) {
                return false;
            }
        }
        if let Some(tag) = &self.filter.tag {
            if !problem.tags.iter().any(|t| t == tag) {
                return false;
            }
        }

        self.filter.status.accepts(self.is_completed(problem))
    }

    fn compare(&self, a: &ProblemEntry, b: &ProblemEntry) -> Ordering {
        a.problem
            .rating
            .cmp(&b.problem.rating)
            .then_with(|| b.solved_count.cmp(&a.solved_count))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, PartialEq, Eq)]
pub struct ContestFilter {
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
    pub phase: Option<ContestPhase>,
}

impl ContestFilter {
    pub fn query(&self) -> ContestQuery<'_> {
        ContestQuery {
            filter: self,
            keyword: normalized_keyword(&self.keyword),
        }
    }
}

pub struct ContestQuery<'a> {
    filter: &'a ContestFilter,
    keyword: Option<String>,
}

impl<'a> FilterSort<Contest> for ContestQuery<'a> {
    fn matches(&self, contest: &Contest) -> bool {
        if let Some(keyword) = &self.keyword {
            if !normalize(&contest.name).contains(keyword.as_str()) {
                return false;
            }
        }
        match self.filter.phase {
            Some(phase) => contest.phase == phase,
            None => true,
        }
    }

    /// Most recent first; contests without a start time go last.
    fn compare(&self, a: &Contest, b: &Contest) -> Ordering {
        match (a.start_time_seconds, b.start_time_seconds) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, PartialEq, Eq)]
pub struct LeaderboardFilter {
    #[validate(length(max = 200))]
    pub keyword: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl LeaderboardFilter {
    pub fn query(&self) -> LeaderboardQuery<'_> {
        LeaderboardQuery {
            filter: self,
            keyword: normalized_keyword(&self.keyword),
        }
    }
}

pub struct LeaderboardQuery<'a> {
    filter: &'a LeaderboardFilter,
    keyword: Option<String>,
}

impl<'a> FilterSort<User> for LeaderboardQuery<'a> {
    fn matches(&self, user: &User) -> bool {
        if let Some(keyword) = &self.keyword {
            let hit = normalize(&user.handle).contains(keyword.as_str())
                || user
                    .full_name()
                    .map_or(false, |name| normalize(&name).contains(keyword.as_str()));
            if !hit {
                return false;
            }
        }
        if let Some(country) = &self.filter.country {
            if user.country.as_ref() != Some(country) {
                return false;
            }
        }
        if let Some(city) = &self.filter.city {
            if user.city.as_ref() != Some(city) {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &User, b: &User) -> Ordering {
        b.rating.unwrap_or(0).cmp(&a.rating.unwrap_or(0))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate, PartialEq, Eq)]
pub struct HandleParameter {
    #[validate(regex = "HANDLE_PATTERN")]
    pub handle: String,
}

impl HandleParameter {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }
}

/// Attaches each problem's global solve count, 0 when no statistics exist for it.
pub fn join_statistics(set: ProblemSet) -> Vec<ProblemEntry> {
    let counts: HashMap<ProblemKey, u32> = set
        .problem_statistics
        .into_iter()
        .filter_map(|statistics| {
            statistics
                .contest_id
                .map(|contest_id| {
                    (
                        ProblemKey::new(contest_id, statistics.index),
                        statistics.solved_count,
                    )
                })
        })
        .collect();

    set.problems
        .into_iter()
        .map(|problem| {
            let solved_count = problem
                .key()
                .and_then(|key| counts.get(&key).copied())
                .unwrap_or(0);
            ProblemEntry {
                problem,
                solved_count,
            }
        })
        .collect()
}

pub fn all_tags<'a, I>(problems: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Problem>,
{
    problems
        .into_iter()
        .flat_map(|problem| problem.tags.iter())
        .sorted()
        .dedup()
        .cloned()
        .collect()
}

fn distinct<'a>(values: impl Iterator<Item = &'a Option<String>>) -> Vec<String> {
    values
        .filter_map(|value| value.as_deref())
        .filter(|value| !value.is_empty())
        .sorted()
        .dedup()
        .map(String::from)
        .collect()
}

pub fn distinct_countries(users: &[User]) -> Vec<String> {
    distinct(users.iter().map(|user| &user.country))
}

pub fn distinct_cities(users: &[User]) -> Vec<String> {
    distinct(users.iter().map(|user| &user.city))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codeforces::model::ContestType;
    use std::collections::BTreeMap;

    fn entry(
        contest_id: i32,
        index: &str,
        name: &str,
        rating: Option<i32>,
        tags: &[&str],
        solved: u32,
    ) -> ProblemEntry {
        ProblemEntry {
            problem: Problem {
                contest_id: Some(contest_id),
                problemset_name: None,
                index: index.to_string(),
                name: name.to_string(),
                points: None,
                rating,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
            solved_count: solved,
        }
    }

    fn contest(id: i32, name: &str, phase: ContestPhase, start: Option<i64>) -> Contest {
        Contest {
            id,
            name: name.to_string(),
            kind: ContestType::Codeforces,
            phase,
            frozen: false,
            duration_seconds: 7200,
            start_time_seconds: start,
            relative_time_seconds: None,
        }
    }

    fn user(
        handle: &str,
        rating: Option<i32>,
        country: Option<&str>,
        city: Option<&str>,
    ) -> User {
        serde_json::from_value(serde_json::json!({
            "handle": handle,
            "rating": rating,
            "country": country,
            "city": city,
            "firstName": "Gennady",
            "lastName": "Korotkevich",
        }))
        .unwrap()
    }

    fn keys(items: &[&ProblemEntry]) -> Vec<String> {
        items
            .iter()
            .map(|e| format!("{}{}", e.problem.contest_id.unwrap(), e.problem.index))
            .collect()
    }

    #[test]
    fn test_parse_rating_range() {
        assert_eq!(
            "1200-1400".parse::<RatingRange>(),
            Ok(RatingRange::new(1200, 1400))
        );
        assert_eq!(
            "2100+".parse::<RatingRange>(),
            Ok(RatingRange::at_least(2100))
        );
        assert_eq!(
            ">=2100".parse::<RatingRange>(),
            Ok(RatingRange::at_least(2100))
        );
        assert!("abc".parse::<RatingRange>().is_err());
        assert!("1200-".parse::<RatingRange>().is_err());
        assert_eq!(RatingRange::at_least(2100).to_string(), "2100+");

        for (value, _) in RATING_PRESETS.iter().filter(|(value, _)| !value.is_empty()) {
            let range = value.parse::<RatingRange>().unwrap();
            assert_eq!(&range.to_string(), value);
        }
    }

    #[test]
    fn test_rating_range_is_closed() {
        let problems = vec![
            entry(1, "A", "a", Some(1199), &[], 0),
            entry(1, "B", "b", Some(1200), &[], 0),
            entry(1, "C", "c", Some(1400), &[], 0),
            entry(1, "D", "d", Some(1401), &[], 0),
            entry(1, "E", "e", None, &[], 0),
        ];
        let filter = ProblemFilter {
            rating: Some(RatingRange::new(1200, 1400)),
            ..Default::default()
        };
        let completion = BTreeMap::new();
        let result = filter.query(&completion).apply(&problems);
        assert_eq!(keys(&result), vec!["1B", "1C"]);
    }

    #[test]
    fn test_open_ended_range() {
        let problems = vec![
            entry(1, "A", "a", Some(2000), &[], 0),
            entry(1, "B", "b", Some(3500), &[], 0),
            entry(1, "C", "c", Some(2100), &[], 0),
        ];
        let filter = ProblemFilter {
            rating: Some(RatingRange::at_least(2100)),
            ..Default::default()
        };
        let completion = BTreeMap::new();
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1C", "1B"]);
    }

    #[test]
    fn test_unrated_problems_are_always_excluded() {
        let problems = vec![
            entry(1, "A", "Unrated", None, &["math"], 100),
            entry(1, "B", "Rated", Some(800), &["math"], 10),
            entry(1, "C", "Zero rated", Some(0), &["math"], 50),
            entry(1, "D", "Negative rated", Some(-100), &["math"], 50),
        ];
        let completion = BTreeMap::new();
        let result = ProblemFilter::default().query(&completion).apply(&problems);
        assert_eq!(keys(&result), vec!["1B"]);

        let filter = ProblemFilter {
            rating: Some(RatingRange::new(-200, 1000)),
            ..Default::default()
        };
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1B"]);
    }

    #[test]
    fn test_keyword_matches_name_or_tag() {
        let problems = vec![
            entry(1, "A", "Watermelon", Some(800), &["brute force", "math"], 0),
            entry(2, "A", "Theatre Square", Some(1000), &["math"], 0),
            entry(3, "A", "Way Too Long Words", Some(800), &["strings"], 0),
        ];
        let completion = BTreeMap::new();

        let filter = ProblemFilter {
            keyword: Some(String::from("WATER")),
            ..Default::default()
        };
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1A"]);

        let filter = ProblemFilter {
            keyword: Some(String::from("Ｍａｔｈ")),
            ..Default::default()
        };
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1A", "2A"]);
    }

    #[test]
    fn test_tag_is_exact_membership() {
        let problems = vec![
            entry(1, "A", "a", Some(800), &["dp"], 0),
            entry(1, "B", "b", Some(800), &["dp and more"], 0),
        ];
        let filter = ProblemFilter {
            tag: Some(String::from("dp")),
            ..Default::default()
        };
        let completion = BTreeMap::new();
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1A"]);
    }

    #[test]
    fn test_completion_status() {
        let problems = vec![
            entry(1, "A", "a", Some(800), &[], 0),
            entry(1, "B", "b", Some(800), &[], 0),
        ];
        let mut completion = BTreeMap::new();
        completion.insert(String::from("1-A"), true);

        let completed = ProblemFilter {
            status: CompletionStatus::Completed,
            ..Default::default()
        };
        assert_eq!(keys(&completed.query(&completion).apply(&problems)), vec!["1A"]);

        let pending = ProblemFilter {
            status: CompletionStatus::NotCompleted,
            ..Default::default()
        };
        assert_eq!(keys(&pending.query(&completion).apply(&problems)), vec!["1B"]);
    }

    #[test]
    fn test_problem_sort_is_stable() {
        let problems = vec![
            entry(1, "A", "a", Some(1200), &[], 5),
            entry(2, "A", "b", Some(800), &[], 5),
            entry(3, "A", "c", Some(800), &[], 50),
            entry(4, "A", "d", Some(800), &[], 5),
        ];
        let completion = BTreeMap::new();
        let result = ProblemFilter::default().query(&completion).apply(&problems);
        assert_eq!(keys(&result), vec!["3A", "2A", "4A", "1A"]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let problems = vec![
            entry(1, "A", "Graph walk", Some(1300), &["graphs"], 0),
            entry(1, "B", "Graph walk II", Some(1700), &["graphs"], 0),
            entry(1, "C", "Tree walk", Some(1300), &["trees"], 0),
        ];
        let filter = ProblemFilter {
            keyword: Some(String::from("walk")),
            rating: Some(RatingRange::new(1200, 1400)),
            tag: Some(String::from("graphs")),
            status: CompletionStatus::Any,
        };
        let completion = BTreeMap::new();
        assert_eq!(keys(&filter.query(&completion).apply(&problems)), vec!["1A"]);
    }

    #[test]
    fn test_validate_problem_filter() {
        let reversed = ProblemFilter {
            rating: Some(RatingRange::new(1400, 1200)),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let long = ProblemFilter {
            keyword: Some("a".repeat(201)),
            ..Default::default()
        };
        assert!(long.validate().is_err());

        assert!(ProblemFilter::default().validate().is_ok());
    }

    #[test]
    fn test_contest_phase_filter() {
        let contests = vec![
            contest(1, "Round 1", ContestPhase::Finished, Some(100)),
            contest(2, "Round 2", ContestPhase::Coding, Some(200)),
            contest(3, "Round 3", ContestPhase::Finished, Some(300)),
        ];
        let filter = ContestFilter {
            phase: Some(ContestPhase::Finished),
            ..Default::default()
        };
        let result = filter.query().apply(&contests);
        assert!(result.iter().all(|c| c.phase == ContestPhase::Finished));
        assert_eq!(result.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 1]);
    }

    #[test]
    fn test_contest_sort_puts_unscheduled_last() {
        let contests = vec![
            contest(1, "Educational Round", ContestPhase::Before, None),
            contest(2, "Div. 2 Round", ContestPhase::Finished, Some(100)),
            contest(3, "Div. 1 Round", ContestPhase::Finished, Some(500)),
            contest(4, "Div. 2 Round", ContestPhase::Before, None),
        ];
        let result = ContestFilter::default().query().apply(&contests);
        assert_eq!(result.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 2, 1, 4]);

        let filter = ContestFilter {
            keyword: Some(String::from("div. 2")),
            ..Default::default()
        };
        let result = filter.query().apply(&contests);
        assert_eq!(result.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_leaderboard_filter() {
        let users = vec![
            user("Petr", Some(3100), Some("Russia"), Some("Moscow")),
            user("tourist", Some(3800), Some("Belarus"), Some("Gomel")),
            user("Benq", Some(3700), Some("United States"), None),
            user("newcomer", None, None, None),
        ];

        let result = LeaderboardFilter::default().query().apply(&users);
        let handles: Vec<&str> = result.iter().map(|u| u.handle.as_str()).collect();
        assert_eq!(handles, vec!["tourist", "Benq", "Petr", "newcomer"]);

        let filter = LeaderboardFilter {
            country: Some(String::from("Belarus")),
            ..Default::default()
        };
        let result = filter.query().apply(&users);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].handle, "tourist");

        let filter = LeaderboardFilter {
            keyword: Some(String::from("korotkevich")),
            city: Some(String::from("Moscow")),
            ..Default::default()
        };
        let result = filter.query().apply(&users);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].handle, "Petr");

        assert_eq!(distinct_countries(&users), vec!["Belarus", "Russia", "United States"]);
        assert_eq!(distinct_cities(&users), vec!["Gomel", "Moscow"]);
    }

    #[test]
    fn test_join_statistics() {
        let set: ProblemSet = serde_json::from_value(serde_json::json!({
            "problems": [
                {"contestId": 1, "index": "A", "name": "Theatre Square", "rating": 1000, "tags": ["math"]},
                {"contestId": 4, "index": "A", "name": "Watermelon", "rating": 800, "tags": ["math", "brute force"]},
                {"index": "Z", "name": "Archive", "tags": []}
            ],
            "problemStatistics": [
                {"contestId": 4, "index": "A", "solvedCount": 300000},
                {"contestId": 1, "index": "A", "solvedCount": 200000}
            ]
        }))
        .unwrap();

        let entries = join_statistics(set);
        let counts: Vec<u32> = entries.iter().map(|e| e.solved_count).collect();
        assert_eq!(counts, vec![200000, 300000, 0]);

        let tags = all_tags(entries.iter().map(|e| &e.problem));
        assert_eq!(tags, vec!["brute force", "math"]);
    }

    #[test]
    fn test_handle_validation() {
        assert!(HandleParameter::new("tourist").validate().is_ok());
        assert!(HandleParameter::new("vintage_Vlad_Makeev").validate().is_ok());
        assert!(HandleParameter::new("ab").validate().is_err());
        assert!(HandleParameter::new("bad handle").validate().is_err());
        assert!(HandleParameter::new("a".repeat(25)).validate().is_err());
    }

    #[test]
    fn test_completion_status_parse() {
        assert_eq!(
            "any".parse::<CompletionStatus>(),
            Ok(CompletionStatus::Any)
        );
        assert_eq!(
            "Completed".parse::<CompletionStatus>(),
            Ok(CompletionStatus::Completed)
        );
        assert_eq!(
            "not_completed".parse::<CompletionStatus>(),
            Ok(CompletionStatus::NotCompleted)
        );
        assert!("done".parse::<CompletionStatus>().is_err());
    }
}
