//! Command-line interface for querying a FlavorFit food catalogue.
//!
//! Every subcommand loads a catalogue from an existing SQLite database or a
//! JSON snapshot, runs one catalogue operation and prints the result as JSON.
//! Options can come from CLI flags, configuration files, or `FLAVORFIT_CMDS_*`
//! environment variables.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod assess;
mod catalog;
mod compare;
mod error;
mod foods;
mod meal_plan;
mod output;
mod recommend;
mod source;

use assess::{AssessArgs, run_assess_with};
use catalog::{CatalogArgs, run_catalog_with};
use compare::{CompareArgs, run_compare_with};
pub use error::CliError;
use foods::{FoodsArgs, run_foods_with};
use meal_plan::{
    DefaultMealPlannerBuilder, MealPlanArgs, MealPlannerBuilder, run_meal_plan_with,
};
use recommend::{RecommendArgs, run_recommend_with};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ARG_SEARCH: &str = "search";
pub(crate) const ARG_SORT: &str = "sort";
pub(crate) const ARG_CONDITION: &str = "condition";
pub(crate) const ARG_EXCLUDE_ALLERGEN: &str = "exclude-allergen";
pub(crate) const ARG_BY_TIER: &str = "by-tier";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_RECOMMENDED_ONLY: &str = "recommended-only";
pub(crate) const ARG_FIRST: &str = "first";
pub(crate) const ARG_SECOND: &str = "second";
pub(crate) const ARG_FOOD: &str = "food";
pub(crate) const ARG_MAX_ITEMS: &str = "max-items";

pub(crate) const ENV_FOODS_DATABASE: &str = "FLAVORFIT_CMDS_FOODS_DATABASE";
pub(crate) const ENV_RECOMMEND_DATABASE: &str = "FLAVORFIT_CMDS_RECOMMEND_DATABASE";
pub(crate) const ENV_MEAL_PLAN_DATABASE: &str = "FLAVORFIT_CMDS_MEAL_PLAN_DATABASE";
pub(crate) const ENV_COMPARE_DATABASE: &str = "FLAVORFIT_CMDS_COMPARE_DATABASE";
pub(crate) const ENV_COMPARE_FIRST: &str = "FLAVORFIT_CMDS_COMPARE_FIRST";
pub(crate) const ENV_COMPARE_SECOND: &str = "FLAVORFIT_CMDS_COMPARE_SECOND";
pub(crate) const ENV_ASSESS_DATABASE: &str = "FLAVORFIT_CMDS_ASSESS_DATABASE";
pub(crate) const ENV_ASSESS_CONDITION: &str = "FLAVORFIT_CMDS_ASSESS_CONDITION";
pub(crate) const ENV_CATALOG_DATABASE: &str = "FLAVORFIT_CMDS_CATALOG_DATABASE";

/// Run the FlavorFit CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration layering,
/// catalogue loading, the requested operation, or writing the output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &DefaultMealPlannerBuilder, &mut stdout)
}

fn dispatch(
    command: Command,
    planners: &dyn MealPlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Foods(args) => run_foods_with(args, writer),
        Command::Recommend(args) => run_recommend_with(args, writer),
        Command::MealPlan(args) => run_meal_plan_with(args, planners, writer),
        Command::Compare(args) => run_compare_with(args, writer),
        Command::Assess(args) => run_assess_with(args, writer),
        Command::Catalog(args) => run_catalog_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "flavorfit",
    about = "Query a health-aware food catalogue",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List foods matching a category, search text and allergen exclusions.
    Foods(FoodsArgs),
    /// Aggregate safety verdicts for a set of health conditions.
    Recommend(RecommendArgs),
    /// Generate a seeded meal plan of safe foods.
    MealPlan(MealPlanArgs),
    /// Compare two foods side by side.
    Compare(CompareArgs),
    /// Check a food, or rank every food, against a condition's nutrient limits.
    Assess(AssessArgs),
    /// Describe the catalogue's conditions, allergens and categories.
    Catalog(CatalogArgs),
}

#[cfg(test)]
mod tests;
