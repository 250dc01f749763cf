//! Facade crate for the FlavorFit food catalogue engine.
//!
//! This crate re-exports the core domain types and exposes the meal planner,
//! catalogue snapshots and the SQLite store behind feature flags.

#![forbid(unsafe_code)]

pub use flavorfit_core::{
    AggregatedVerdict, Allergen, AllergenExclusion, AllergenId, CatalogError, CatalogStore,
    Category, ConditionCode, ConditionSet, FoodComparison, FoodFilter, FoodId, FoodItem,
    FoodListing, FoodQuery, FoodService, FoodSummary, HealthCondition, InvalidInput, MealPlan,
    MealPlanEntry, MealPlanError, MealPlanRequest, MealPlanner, MealRole, MemoryCatalog,
    NutrientDifference, NutritionFacts, Recommendation, RecommendationType, RuleAssessment,
    RuleRanking, RuleShortlist, SafetyScore, SafetyTier, SortKey, aggregate, aggregate_catalog,
    assess, compare, rank_catalog, search,
};

#[cfg(feature = "serde")]
pub use flavorfit_core::CatalogSnapshot;

#[cfg(feature = "store-sqlite")]
pub use flavorfit_core::{SqliteCatalog, SqliteCatalogError};

#[cfg(feature = "planner")]
pub use flavorfit_planner::{MealPlannerConfig, RandomMealPlanner, select_meal};
