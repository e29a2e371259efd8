pub mod api;
pub mod codeforces;
pub mod filter;
pub mod rating;
pub mod statistics;
pub mod storage;
pub mod verification;

pub use codeforces::model::ProblemKey;
pub use rating::RatingTier;
pub use verification::{BadgeVariant, VerificationPolicy};
