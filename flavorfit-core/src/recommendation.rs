//! Curated recommendations keyed by `(food, condition)`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{ConditionCode, FoodId};

/// Curated classification of a food for one condition.
///
/// Variants are declared from most to least recommended; the derived order
/// therefore ranks `HighlyRecommended` lowest and `Avoid` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecommendationType {
    /// Actively beneficial.
    HighlyRecommended,
    /// Suitable.
    Recommended,
    /// Acceptable in moderation.
    Caution,
    /// Should not be eaten.
    Avoid,
}

impl RecommendationType {
    /// Return the label used by the catalogue.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "Highly Recommended",
            Self::Recommended => "Recommended",
            Self::Caution => "Caution",
            Self::Avoid => "Avoid",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationType {
    type Err = RecommendationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "highly recommended" => Ok(Self::HighlyRecommended),
            "recommended" => Ok(Self::Recommended),
            "caution" => Ok(Self::Caution),
            "avoid" => Ok(Self::Avoid),
            _ => Err(RecommendationError::UnknownType(s.to_owned())),
        }
    }
}

/// Errors raised while building recommendation records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendationError {
    /// The safety score was outside `1..=10`.
    #[error("safety score {value} is outside 1..=10")]
    ScoreOutOfRange {
        /// Rejected score.
        value: i64,
    },
    /// The recommendation label was not recognised.
    #[error("unknown recommendation type '{0}'")]
    UnknownType(String),
}

/// Safety score in the inclusive range `1..=10`; higher is safer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "u8"))]
pub struct SafetyScore(u8);

impl SafetyScore {
    /// Lowest valid score.
    pub const MIN: u8 = 1;
    /// Highest valid score.
    pub const MAX: u8 = 10;

    /// Validate and wrap a score.
    ///
    /// # Errors
    /// Returns [`RecommendationError::ScoreOutOfRange`] outside `1..=10`.
    pub fn new(value: i64) -> Result<Self, RecommendationError> {
        u8::try_from(value)
            .ok()
            .filter(|score| (Self::MIN..=Self::MAX).contains(score))
            .map(Self)
            .ok_or(RecommendationError::ScoreOutOfRange { value })
    }

    /// Return the raw score.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for SafetyScore {
    type Error = RecommendationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SafetyScore> for u8 {
    fn from(score: SafetyScore) -> Self {
        score.0
    }
}

impl fmt::Display for SafetyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Curated rating of one food for one health condition.
///
/// # Examples
/// ```
/// use flavorfit_core::{Recommendation, RecommendationType, SafetyScore};
///
/// # fn main() -> Result<(), flavorfit_core::RecommendationError> {
/// let rec = Recommendation::new(1, "dm", RecommendationType::Avoid, SafetyScore::new(2)?)
///     .with_reasoning("High in refined carbohydrates");
/// assert_eq!(rec.condition.as_str(), "DM");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Recommendation {
    /// Rated food.
    pub food_id: FoodId,
    /// Condition the rating applies to.
    pub condition: ConditionCode,
    /// Curated classification.
    pub recommendation_type: RecommendationType,
    /// Safety score in `1..=10`.
    pub safety_score: SafetyScore,
    /// Why the food received this rating.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reasoning: String,
    /// Suggested portion, e.g. `1 cup`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub portion: Option<String>,
    /// Suggested frequency, e.g. `twice weekly`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub frequency: Option<String>,
}

impl Recommendation {
    /// Construct a recommendation without guidance text.
    pub fn new(
        food_id: FoodId,
        condition: impl Into<ConditionCode>,
        recommendation_type: RecommendationType,
        safety_score: SafetyScore,
    ) -> Self {
        Self {
            food_id,
            condition: condition.into(),
            recommendation_type,
            safety_score,
            reasoning: String::new(),
            portion: None,
            frequency: None,
        }
    }

    /// Attach reasoning text.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Attach portion and frequency guidance.
    #[must_use]
    pub fn with_guidance(
        mut self,
        portion: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        self.portion = Some(portion.into());
        self.frequency = Some(frequency.into());
        self
    }
}
