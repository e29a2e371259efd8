pub mod client;
pub mod model;
pub mod query;

pub const DEFAULT_API_URL: &str = "https://codeforces.com/api";
const SITE_URL: &str = "https://codeforces.com";

use model::ProblemKey;

pub fn problem_url(key: &ProblemKey, in_contest: bool) -> String {
    if in_contest {
        format!("{}/contest/{}/problem/{}", SITE_URL, key.contest_id, key.index)
    } else {
        format!(
            "{}/problemset/problem/{}/{}",
            SITE_URL, key.contest_id, key.index
        )
    }
}

pub fn contest_url(contest_id: i32) -> String {
    format!("{}/contest/{}", SITE_URL, contest_id)
}

pub fn profile_url(handle: &str) -> String {
    format!("{}/profile/{}", SITE_URL, handle)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_urls() {
        let key = ProblemKey::new(1791, "C");
        assert_eq!(
            problem_url(&key, false),
            "https://codeforces.com/problemset/problem/1791/C"
        );
        assert_eq!(
            problem_url(&key, true),
            "https://codeforces.com/contest/1791/problem/C"
        );
        assert_eq!(contest_url(1791), "https://codeforces.com/contest/1791");
        assert_eq!(profile_url("tourist"), "https://codeforces.com/profile/tourist");
    }
}
