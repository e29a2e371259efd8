use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;

/// Handle that receives the owner badge.
pub const OWNER_HANDLE: &str = "SiamAhmedOlied";

/// Handles that receive the distinguished badge.
pub const DISTINGUISHED_HANDLES: [&str; 25] = [
    "tourist",
    "Benq",
    "Um_nik",
    "jiangly",
    "Radewoosh",
    "mnbvmar",
    "scott_wu",
    "Petr",
    "apiad",
    "ecnerwala",
    "ksun48",
    "tmwilliamlin168",
    "Errichto",
    "aid",
    "maroonrk",
    "TLE",
    "ko_osaga",
    "antontrygubO_o",
    "vintage_Vlad_Makeev",
    "sunset",
    "SecondThread",
    "rainboy",
    "nuip",
    "yosupo",
    "djq_cpp",
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    None,
    Distinguished,
    Owner,
}

impl BadgeVariant {
    pub fn title(&self) -> &'static str {
        match self {
            BadgeVariant::None => "",
            BadgeVariant::Distinguished => "Top 100 Codeforces User",
            BadgeVariant::Owner => "App Developer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BadgeVariant::None => "",
            BadgeVariant::Distinguished => {
                "Ranked among the top 100 competitive programmers worldwide"
            }
            BadgeVariant::Owner => "Creator of this application",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    owner: String,
    distinguished: HashSet<String>,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::new(OWNER_HANDLE, DISTINGUISHED_HANDLES)
    }
}

impl VerificationPolicy {
    pub fn new<I, S>(owner: impl Into<String>, distinguished: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner: owner.into(),
            distinguished: distinguished.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Handles are compared case-sensitively. The owner check runs first.
    pub fn classify(&self, handle: &str, _rating: Option<i32>) -> BadgeVariant {
        if handle == self.owner {
            BadgeVariant::Owner
        } else if self.distinguished.contains(handle) {
            BadgeVariant::Distinguished
        } else {
            BadgeVariant::None
        }
    }
}

static DEFAULT_POLICY: Lazy<VerificationPolicy> = Lazy::new(VerificationPolicy::default);

pub fn classify(handle: &str, rating: Option<i32>) -> BadgeVariant {
    DEFAULT_POLICY.classify(handle, rating)
}
