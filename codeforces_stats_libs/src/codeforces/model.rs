use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(other)]
    Unknown,
}

/// Envelope wrapping the result of every API method.
#[derive(Serialize, Deserialize, Debug)]
pub struct CodeforcesResponse<T> {
    pub status: ResponseStatus,
    pub comment: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid problem key `{0}`, expected the form `<contest id>-<index>`")]
pub struct ParseProblemKeyError(String);

/// Canonical identity of a problem: the contest it belongs to plus its index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProblemKey {
    pub contest_id: i32,
    pub index: String,
}

impl ProblemKey {
    pub fn new(contest_id: i32, index: impl Into<String>) -> Self {
        Self {
            contest_id,
            index: index.into(),
        }
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.contest_id, self.index)
    }
}

impl FromStr for ProblemKey {
    type Err = ParseProblemKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (contest_id, index) = s
            .split_once('-')
            .ok_or_else(|| ParseProblemKeyError(s.to_string()))?;
        let contest_id = contest_id
            .parse::<i32>()
            .map_err(|_| ParseProblemKeyError(s.to_string()))?;
        if index.is_empty() {
            return Err(ParseProblemKeyError(s.to_string()));
        }

        Ok(ProblemKey::new(contest_id, index))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub contest_id: Option<i32>,
    pub problemset_name: Option<String>,
    pub index: String,
    pub name: String,
    pub points: Option<f64>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Problem {
    /// Archive problems without a contest id have no key.
    pub fn key(&self) -> Option<ProblemKey> {
        self.contest_id
            .map(|contest_id| ProblemKey::new(contest_id, self.index.clone()))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemStatistics {
    pub contest_id: Option<i32>,
    pub index: String,
    pub solved_count: u32,
}

/// Result of `problemset.problems`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSet {
    pub problems: Vec<Problem>,
    #[serde(default)]
    pub problem_statistics: Vec<ProblemStatistics>,
}

/// A problem joined with its global solve count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemEntry {
    #[serde(flatten)]
    pub problem: Problem,
    pub solved_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    #[serde(other)]
    Unknown,
}

impl ContestPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ContestPhase::Before => "BEFORE",
            ContestPhase::Coding => "CODING",
            ContestPhase::PendingSystemTest => "PENDING SYSTEM TEST",
            ContestPhase::SystemTest => "SYSTEM TEST",
            ContestPhase::Finished => "FINISHED",
            ContestPhase::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ContestPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContestPhase::Before => write!(f, "BEFORE"),
            ContestPhase::Coding => write!(f, "CODING"),
            ContestPhase::PendingSystemTest => write!(f, "PENDING_SYSTEM_TEST"),
            ContestPhase::SystemTest => write!(f, "SYSTEM_TEST"),
            ContestPhase::Finished => write!(f, "FINISHED"),
            ContestPhase::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown contest phase `{0}`")]
pub struct ParseContestPhaseError(String);

impl FromStr for ContestPhase {
    type Err = ParseContestPhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(&['-', ' '][..], "_").as_str() {
            "BEFORE" => Ok(ContestPhase::Before),
            "CODING" => Ok(ContestPhase::Coding),
            "PENDING_SYSTEM_TEST" => Ok(ContestPhase::PendingSystemTest),
            "SYSTEM_TEST" => Ok(ContestPhase::SystemTest),
            "FINISHED" => Ok(ContestPhase::Finished),
            _ => Err(ParseContestPhaseError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestType {
    #[serde(rename = "CF")]
    Codeforces,
    #[serde(rename = "IOI")]
    Ioi,
    #[serde(rename = "ICPC")]
    Icpc,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContestType,
    pub phase: ContestPhase,
    #[serde(default)]
    pub frozen: bool,
    pub duration_seconds: i64,
    pub start_time_seconds: Option<i64>,
    pub relative_time_seconds: Option<i64>,
}

impl Contest {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time_seconds
            .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
    }

    /// Duration formatted as `<hours>h <minutes>m`.
    pub fn duration_label(&self) -> String {
        let hours = self.duration_seconds / 3600;
        let minutes = (self.duration_seconds % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Ok,
    Failed,
    Partial,
    CompilationError,
    RuntimeError,
    WrongAnswer,
    PresentationError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    IdlenessLimitExceeded,
    SecurityViolated,
    Crashed,
    InputPreparationCrashed,
    Challenged,
    Skipped,
    Testing,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub contest_id: Option<i32>,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub creation_time_seconds: DateTime<Utc>,
    pub problem: Problem,
    #[serde(default)]
    pub programming_language: String,
    /// Absent while the submission is still being judged.
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(default)]
    pub passed_test_count: u32,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.verdict == Some(Verdict::Ok)
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub handle: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub contribution: i32,
    pub rank: Option<String>,
    pub rating: Option<i32>,
    pub max_rank: Option<String>,
    pub max_rating: Option<i32>,
    #[serde(default)]
    pub friend_of_count: u32,
    #[serde(default)]
    pub avatar: String,
    pub title_photo: Option<String>,
    #[serde_as(as = "Option<TimestampSeconds<i64>>")]
    #[serde(default)]
    pub registration_time_seconds: Option<DateTime<Utc>>,
}

impl User {
    /// `first last`, or `None` when neither part is known.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (None, None) => None,
            (first, last) => Some(
                format!(
                    "{} {}",
                    first.as_deref().unwrap_or_default(),
                    last.as_deref().unwrap_or_default()
                )
                .trim()
                .to_string(),
            ),
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub contest_id: i32,
    pub contest_name: String,
    pub handle: String,
    pub rank: i32,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub rating_update_time_seconds: DateTime<Utc>,
    pub old_rating: i32,
    pub new_rating: i32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_problem_key() {
        assert_eq!(
            "1791-C".parse::<ProblemKey>(),
            Ok(ProblemKey::new(1791, "C"))
        );
        assert_eq!("1-F1".parse::<ProblemKey>(), Ok(ProblemKey::new(1, "F1")));
        assert!("1791".parse::<ProblemKey>().is_err());
        assert!("abc-A".parse::<ProblemKey>().is_err());
        assert!("1-".parse::<ProblemKey>().is_err());
        assert_eq!(ProblemKey::new(4, "A").to_string(), "4-A");
    }

    #[test]
    fn test_deserialize_submission() {
        let raw = r#"
        {
            "id": 195930981,
            "contestId": 1791,
            "creationTimeSeconds": 1677000000,
            "relativeTimeSeconds": 2147483647,
            "problem": {
                "contestId": 1791,
                "index": "C",
                "name": "Prepend and Append",
                "type": "PROGRAMMING",
                "rating": 800,
                "tags": ["implementation", "two pointers"]
            },
            "author": {"contestId": 1791, "members": [{"handle": "alice"}]},
            "programmingLanguage": "GNU C++17",
            "verdict": "OK",
            "testset": "TESTS",
            "passedTestCount": 7,
            "timeConsumedMillis": 15,
            "memoryConsumedBytes": 0
        }
        "#;
        let submission: Submission = serde_json::from_str(raw).unwrap();

        assert!(submission.is_accepted());
        assert_eq!(submission.problem.key(), Some(ProblemKey::new(1791, "C")));
        assert_eq!(submission.problem.rating, Some(800));
        assert_eq!(submission.creation_time_seconds.timestamp(), 1677000000);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let raw = r#"
        {
            "id": 1,
            "creationTimeSeconds": 1,
            "problem": {"problemsetName": "acmsguru", "index": "100", "name": "A+B"},
            "verdict": "SOMETHING_NEW"
        }
        "#;
        let submission: Submission = serde_json::from_str(raw).unwrap();
        assert_eq!(submission.verdict, Some(Verdict::Unknown));
        assert_eq!(submission.problem.key(), None);
        assert!(submission.problem.tags.is_empty());

        let raw = r#"
        {
            "id": 1,
            "name": "Codeforces Round",
            "type": "NEW_TYPE",
            "phase": "ARCHIVED",
            "frozen": false,
            "durationSeconds": 8100
        }
        "#;
        let contest: Contest = serde_json::from_str(raw).unwrap();
        assert_eq!(contest.phase, ContestPhase::Unknown);
        assert_eq!(contest.kind, ContestType::Unknown);
        assert_eq!(contest.start_time(), None);
        assert_eq!(contest.duration_label(), "2h 15m");
    }

    #[test]
    fn test_deserialize_failed_response() {
        let raw = r#"{"status": "FAILED", "comment": "handles: User with handle nobody not found"}"#;
        let response: CodeforcesResponse<Vec<User>> = serde_json::from_str(raw).unwrap();
        assert_eq!(response.status, ResponseStatus::Failed);
        assert!(response.result.is_none());
    }

    #[test]
    fn test_parse_contest_phase() {
        assert_eq!(
            "finished".parse::<ContestPhase>(),
            Ok(ContestPhase::Finished)
        );
        assert_eq!(
            "pending-system-test".parse::<ContestPhase>(),
            Ok(ContestPhase::PendingSystemTest)
        );
        assert!("archived".parse::<ContestPhase>().is_err());
        assert_eq!(ContestPhase::SystemTest.to_string(), "SYSTEM_TEST");
    }

    #[test]
    fn test_full_name() {
        let mut user: User = serde_json::from_str(r#"{"handle": "alice"}"#).unwrap();
        assert_eq!(user.full_name(), None);
        assert_eq!(user.registration_time_seconds, None);

        user.first_name = Some(String::from("Alice"));
        assert_eq!(user.full_name(), Some(String::from("Alice")));

        user.last_name = Some(String::from("Liddell"));
        assert_eq!(user.full_name(), Some(String::from("Alice Liddell")));
    }
}
