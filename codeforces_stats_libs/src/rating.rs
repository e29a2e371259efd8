use serde::{Deserialize, Serialize};
use std::fmt;

/// Rating bands, ordered from lowest to highest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatingTier {
    Unrated,
    Newbie,
    Pupil,
    Specialist,
    Expert,
    CandidateMaster,
    Master,
    InternationalMaster,
    Grandmaster,
    InternationalGrandmaster,
    LegendaryGrandmaster,
}

impl RatingTier {
    /// Absent and non-positive ratings are unrated.
    pub fn from_rating(rating: Option<i32>) -> Self {
        match rating {
            None | Some(i32::MIN..=0) => RatingTier::Unrated,
            Some(1..=1199) => RatingTier::Newbie,
            Some(1200..=1399) => RatingTier::Pupil,
            Some(1400..=1599) => RatingTier::Specialist,
            Some(1600..=1899) => RatingTier::Expert,
            Some(1900..=2099) => RatingTier::CandidateMaster,
            Some(2100..=2299) => RatingTier::Master,
            Some(2300..=2399) => RatingTier::InternationalMaster,
            Some(2400..=2599) => RatingTier::Grandmaster,
            Some(2600..=2999) => RatingTier::InternationalGrandmaster,
            Some(_) => RatingTier::LegendaryGrandmaster,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingTier::Unrated => "Unrated",
            RatingTier::Newbie => "Newbie",
            RatingTier::Pupil => "Pupil",
            RatingTier::Specialist => "Specialist",
            RatingTier::Expert => "Expert",
            RatingTier::CandidateMaster => "Candidate Master",
            RatingTier::Master => "Master",
            RatingTier::InternationalMaster => "International Master",
            RatingTier::Grandmaster => "Grandmaster",
            RatingTier::InternationalGrandmaster => "International Grandmaster",
            RatingTier::LegendaryGrandmaster => "Legendary Grandmaster",
        }
    }

    /// CSS class the rendering layer colours the rating with.
    pub fn display_class(&self) -> &'static str {
        match self {
            RatingTier::Unrated | RatingTier::Newbie => "rating-newbie",
            RatingTier::Pupil => "rating-pupil",
            RatingTier::Specialist => "rating-specialist",
            RatingTier::Expert => "rating-expert",
            RatingTier::CandidateMaster => "rating-candidate-master",
            RatingTier::Master => "rating-master",
            RatingTier::InternationalMaster => "rating-international-master",
            RatingTier::Grandmaster => "rating-grandmaster",
            RatingTier::InternationalGrandmaster => "rating-international-grandmaster",
            RatingTier::LegendaryGrandmaster => "rating-legendary-grandmaster",
        }
    }
}

impl fmt::Display for RatingTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Returns `(tier label, display class)` for a rating.
pub fn classify(rating: Option<i32>) -> (&'static str, &'static str) {
    let tier = RatingTier::from_rating(rating);
    (tier.label(), tier.display_class())
}
