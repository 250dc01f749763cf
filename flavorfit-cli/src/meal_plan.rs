//! `meal-plan` command: seeded meal plans of safe foods.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::{MealPlan, MealPlanRequest, MealPlanner, MemoryCatalog};
use flavorfit_planner::{MealPlannerConfig, RandomMealPlanner};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{
    ARG_CATALOG, ARG_CONDITION, ARG_DATABASE, ARG_EXCLUDE_ALLERGEN, ARG_RECOMMENDED_ONLY,
    ARG_SEED, CliError, ENV_MEAL_PLAN_DATABASE,
};

/// CLI arguments for the `meal-plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Pick one protein, one side and one drink that are safe \
                 for every supplied health condition and free of the \
                 excluded allergens. Roles without a safe food are left \
                 out. The seed used is printed with the plan so a run can \
                 be replayed.",
    about = "Generate a meal plan"
)]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct MealPlanArgs {
    /// Path to an existing SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON catalogue snapshot.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Health condition code; repeat or comma-separate.
    #[arg(long = ARG_CONDITION, value_name = "code", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) conditions: Vec<String>,
    /// Allergen code or name to exclude; repeat or comma-separate.
    #[arg(long = ARG_EXCLUDE_ALLERGEN, value_name = "code", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) exclude_allergens: Vec<String>,
    /// Seed for the random choice; a fresh seed is drawn when omitted.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Only plan with foods recommended for every condition.
    #[arg(long = ARG_RECOMMENDED_ONLY)]
    #[serde(default)]
    pub(crate) recommended_only: bool,
}

impl MealPlanArgs {
    pub(crate) fn into_config(self) -> Result<MealPlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MealPlanConfig::try_from(merged)
    }
}

/// Resolved `meal-plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MealPlanConfig {
    pub(crate) source: CatalogSource,
    pub(crate) request: MealPlanRequest,
    pub(crate) planner: MealPlannerConfig,
}

impl TryFrom<MealPlanArgs> for MealPlanConfig {
    type Error = CliError;

    fn try_from(args: MealPlanArgs) -> Result<Self, Self::Error> {
        let source = CatalogSource::resolve(args.database, args.catalog, ENV_MEAL_PLAN_DATABASE)?;
        let seed = args.seed.unwrap_or_else(rand::random);
        let request = MealPlanRequest::from_codes(args.conditions, args.exclude_allergens, seed)?;
        let planner = if args.recommended_only {
            MealPlannerConfig::recommended_only()
        } else {
            MealPlannerConfig::default()
        };
        Ok(Self {
            source,
            request,
            planner,
        })
    }
}

/// Builds a meal planner for the current invocation.
pub(crate) trait MealPlannerBuilder {
    fn build(&self, catalog: MemoryCatalog, config: MealPlannerConfig) -> Box<dyn MealPlanner>;
}

pub(crate) struct DefaultMealPlannerBuilder;

impl MealPlannerBuilder for DefaultMealPlannerBuilder {
    fn build(&self, catalog: MemoryCatalog, config: MealPlannerConfig) -> Box<dyn MealPlanner> {
        Box::new(RandomMealPlanner::with_config(catalog, config))
    }
}

#[derive(Debug, Serialize)]
struct MealPlanOutput<'a> {
    seed: u64,
    plan: &'a MealPlan,
}

pub(crate) fn run_meal_plan_with(
    args: MealPlanArgs,
    builder: &dyn MealPlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let catalog = config.source.load()?;
    let planner = builder.build(catalog, config.planner);
    let plan = planner.plan(&config.request)?;
    debug!("planned {} role(s) with seed {}", plan.len(), config.request.seed);
    write_json(
        writer,
        &MealPlanOutput {
            seed: config.request.seed,
            plan: &plan,
        },
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MealPlanConfig, CliError> {
    let merged = MealPlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MealPlanConfig::try_from(merged)
}
