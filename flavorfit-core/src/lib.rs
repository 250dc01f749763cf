//! Core domain types and derivations for the FlavorFit engine.
//!
//! A catalogue snapshot holds foods, nutrition facts, allergen links and
//! curated per-condition recommendations. From it the crate derives:
//!
//! - aggregated safety verdicts for users holding several health conditions
//!   ([`aggregate`], [`aggregate_catalog`]),
//! - allergen-filtered, searchable and sorted food listings ([`search`]),
//! - side-by-side comparisons ([`compare`]),
//! - advisory nutrient rule assessments and rankings ([`assess`],
//!   [`rank_catalog`]).
//!
//! Meal planning is exposed through the [`MealPlanner`] trait; a seeded
//! random implementation lives in the `flavorfit-planner` crate.
//! Constructors return `Result` so invalid catalogue rows surface early.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allergen;
mod compare;
mod condition;
mod error;
mod food;
mod nutrition;
mod plan;
mod recommendation;
mod rules;
mod search;
mod service;
mod store;
mod verdict;

pub use allergen::{
    Allergen, AllergenExclusion, AllergenId, AllergenLink, AllergenSeverity, UnknownSeverity,
};
pub use compare::{
    AllergenSummary, ComparedFood, ConditionClassification, FoodComparison, compare,
};
pub use condition::{ConditionCode, ConditionId, ConditionSet, HealthCondition};
pub use error::InvalidInput;
pub use food::{
    Category, DietaryFlags, FoodId, FoodItem, FoodItemError, GlycemicIndex, PurineLevel,
    UnknownCategory,
};
pub use nutrition::{NutrientDifference, NutritionError, NutritionFacts};
pub use plan::{MealPlan, MealPlanEntry, MealPlanError, MealPlanRequest, MealPlanner, MealRole};
pub use recommendation::{
    Recommendation, RecommendationError, RecommendationType, SafetyScore,
};
pub use rules::{
    Check, ConditionRule, FULL_SCORE, RankedFood, RuleAssessment, RuleCheck, RuleRanking,
    RuleShortlist, RuleStatus, Violation, assess, rank_catalog,
};
pub use search::{
    FoodListing, FoodQuery, NO_ALLERGENS_TOKEN, RECOMMENDED_TOKEN, SortKey, UnknownSortKey,
    search,
};
pub use service::{FoodFilter, FoodService, FoodSummary, HeadlineNutrition};
pub use store::{CatalogError, CatalogStore, MemoryCatalog, MemoryCatalogBuilder};
#[cfg(feature = "serde")]
pub use store::{CatalogSnapshot, FoodAllergenRecord, NutritionRecord};
#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub use store::{SqliteCatalog, SqliteCatalogError};
pub use verdict::{
    AggregatedVerdict, ConditionSafety, ConditionVerdict, SafetyTier, aggregate,
    aggregate_catalog,
};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
