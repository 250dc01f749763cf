//! `assess` command: nutrient rule checks for one food, or a ranking of the
//! whole catalogue, against one condition.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::{FoodId, FoodService};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{
    ARG_CATALOG, ARG_CONDITION, ARG_DATABASE, ARG_FOOD, ARG_MAX_ITEMS, CliError,
    ENV_ASSESS_CONDITION, ENV_ASSESS_DATABASE,
};

/// CLI arguments for the `assess` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Evaluate a food's nutrition facts against the built-in \
                 nutrient limits for one health condition. Without a food, \
                 every food with nutrition facts is ranked into safe, \
                 caution and avoid bands, best score first; --max-items \
                 keeps only the top safe foods. The result is advisory and \
                 does not change curated ratings.",
    about = "Check foods against a condition's nutrient limits"
)]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct AssessArgs {
    /// Identifier of the food to assess; ranks the catalogue when omitted.
    #[arg(value_name = "food")]
    #[serde(default)]
    pub(crate) food: Option<FoodId>,
    /// Health condition code.
    #[arg(long = ARG_CONDITION, value_name = "code")]
    #[serde(default)]
    pub(crate) condition: Option<String>,
    /// Keep only this many safe foods when ranking the catalogue.
    #[arg(long = ARG_MAX_ITEMS, value_name = "n")]
    #[serde(default)]
    pub(crate) max_items: Option<usize>,
    /// Path to an existing SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON catalogue snapshot.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

/// What the `assess` command evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssessTarget {
    /// A single food.
    Food(FoodId),
    /// Every food with nutrition facts, optionally shortlisted.
    Catalogue { max_items: Option<usize> },
}

/// Resolved `assess` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssessConfig {
    pub(crate) source: CatalogSource,
    pub(crate) target: AssessTarget,
    pub(crate) condition: String,
}

impl TryFrom<AssessArgs> for AssessConfig {
    type Error = CliError;

    fn try_from(args: AssessArgs) -> Result<Self, Self::Error> {
        let target = match (args.food, args.max_items) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_FOOD,
                    second: ARG_MAX_ITEMS,
                });
            }
            (Some(food), None) => AssessTarget::Food(food),
            (None, max_items) => AssessTarget::Catalogue { max_items },
        };
        let condition = args.condition.ok_or(CliError::MissingArgument {
            field: ARG_CONDITION,
            env: ENV_ASSESS_CONDITION,
        })?;
        Ok(Self {
            source: CatalogSource::resolve(args.database, args.catalog, ENV_ASSESS_DATABASE)?,
            target,
            condition,
        })
    }
}

pub(crate) fn run_assess_with(args: AssessArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = AssessConfig::try_from(merged)?;
    let service = FoodService::new(config.source.load()?);
    match config.target {
        AssessTarget::Food(id) => {
            let assessment = service
                .assess_food(id, &config.condition)?
                .ok_or(CliError::MissingNutrition { id })?;
            write_json(writer, &assessment)
        }
        AssessTarget::Catalogue { max_items: None } => {
            write_json(writer, &service.rule_rankings([&config.condition])?)
        }
        AssessTarget::Catalogue {
            max_items: Some(max_items),
        } => write_json(
            writer,
            &service.rule_shortlists([&config.condition], max_items)?,
        ),
    }
}
