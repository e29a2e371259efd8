use itertools::Itertools;
use rand::Rng;
use sha2::{Digest, Sha512};
use std::fmt;

/// Builder of the query parameters sent to one API method.
pub struct MethodQueryBuilder {
    method: &'static str,
    params: Vec<(&'static str, String)>,
}

impl MethodQueryBuilder {
    pub fn new(method: &'static str) -> Self {
        Self {
            method,
            params: Vec::new(),
        }
    }
    pub fn method(&self) -> &'static str {
        self.method
    }
    pub fn build(self) -> Vec<(String, String)> {
        self.params
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
    pub fn handle(mut self, handle: impl ToString + Sync + Send) -> Self {
        let handle = handle.to_string();
        if !handle.is_empty() {
            self.params.push(("handle", handle));
        }
        self
    }
    pub fn handles(mut self, handles: &[impl AsRef<str>]) -> Self {
        let handles = handles.iter().map(|handle| handle.as_ref()).join(";");
        if !handles.is_empty() {
            self.params.push(("handles", handles));
        }
        self
    }
    pub fn from(mut self, from: u32) -> Self {
        self.params.push(("from", from.to_string()));
        self
    }
    pub fn count(mut self, count: u32) -> Self {
        self.params.push(("count", count.to_string()));
        self
    }
    pub fn gym(mut self, gym: bool) -> Self {
        self.params.push(("gym", gym.to_string()));
        self
    }
}

/// API key pair used to sign requests.
#[derive(Clone)]
pub struct ApiCredentials {
    key: String,
    secret: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ApiCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Appends `apiKey`, `time` and `apiSig` to `params`.
    pub fn sign(&self, method: &str, params: &mut Vec<(String, String)>, time: i64, nonce: &str) {
        params.push((String::from("apiKey"), self.key.clone()));
        params.push((String::from("time"), time.to_string()));
        let sig = signature(nonce, method, params, &self.secret);
        params.push((String::from("apiSig"), sig));
    }
}

/// Six random decimal digits.
pub fn nonce<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// `nonce` followed by the hex SHA-512 of `<nonce>/<method>?<sorted params>#<secret>`.
pub fn signature(nonce: &str, method: &str, params: &[(String, String)], secret: &str) -> String {
    let query = params
        .iter()
        .sorted()
        .map(|(key, value)| format!("{}={}", key, value))
        .join("&");
    let digest = Sha512::digest(format!("{}/{}?{}#{}", nonce, method, query, secret).as_bytes());

    format!("{}{}", nonce, hex::encode(digest))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn pairs(params: &[(&str, &str)]) -> Vec<(String, String)> {
        params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_with_no_params() {
        let builder = MethodQueryBuilder::new("contest.list");
        assert_eq!(builder.method(), "contest.list");
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_user_status_params() {
        let params = MethodQueryBuilder::new("user.status")
            .handle("tourist")
            .from(1)
            .count(100)
            .build();
        assert_eq!(
            params,
            pairs(&[("handle", "tourist"), ("from", "1"), ("count", "100")])
        );
    }

    #[test]
    fn test_handles_are_joined() {
        let params = MethodQueryBuilder::new("user.info")
            .handles(&["tourist", "Petr"])
            .build();
        assert_eq!(params, pairs(&[("handles", "tourist;Petr")]));

        let empty: [&str; 0] = [];
        assert!(MethodQueryBuilder::new("user.info")
            .handles(&empty)
            .build()
            .is_empty());
    }

    #[test]
    fn test_signature_sorts_params() {
        let params = pairs(&[
            ("contestId", "566"),
            ("time", "1234567890"),
            ("apiKey", "xxx"),
        ]);
        let expected = concat!(
            "123456",
            "7f467d1cd837599d2f0dc9fd8beec8fad80ee7d02f0b65ad153a963bca2923de",
            "885e11c96cba96beceaba6dd7433d20c0cbb507b7615b3dccfb693b6163ccc94"
        );
        assert_eq!(signature("123456", "contest.hacks", &params, "yyy"), expected);
    }

    #[test]
    fn test_sign_appends_credentials() {
        let credentials = ApiCredentials::new("xxx", "yyy");
        let mut params = pairs(&[("contestId", "566")]);
        credentials.sign("contest.hacks", &mut params, 1234567890, "123456");

        assert_eq!(params.len(), 4);
        assert_eq!(params[1], (String::from("apiKey"), String::from("xxx")));
        assert_eq!(params[2], (String::from("time"), String::from("1234567890")));
        assert_eq!(params[3].0, "apiSig");
        assert!(params[3].1.starts_with("1234567f467d1c"));
        assert_eq!(params[3].1.len(), 6 + 128);
    }

    #[test]
    fn test_nonce_is_six_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let nonce = nonce(&mut rng);
            assert_eq!(nonce.len(), 6);
            assert!(nonce.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        let credentials = ApiCredentials::new("xxx", "yyy");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("xxx"));
        assert!(!debug.contains("yyy"));
    }
}
