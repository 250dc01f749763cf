//! `compare` command: side-by-side food comparison.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::{FoodId, FoodService};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{
    ARG_CATALOG, ARG_CONDITION, ARG_DATABASE, ARG_FIRST, ARG_SECOND, CliError,
    ENV_COMPARE_DATABASE, ENV_COMPARE_FIRST, ENV_COMPARE_SECOND,
};

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compare two distinct foods: nutrition, per-field \
                 differences, allergens and dietary flags. Supplying \
                 conditions also classifies both foods as safe or unsafe \
                 for each condition.",
    about = "Compare two foods"
)]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct CompareArgs {
    /// Identifier of the first food.
    #[arg(value_name = "first")]
    #[serde(default)]
    pub(crate) first: Option<FoodId>,
    /// Identifier of the second food.
    #[arg(value_name = "second")]
    #[serde(default)]
    pub(crate) second: Option<FoodId>,
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
}

/// Resolved `compare` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompareConfig {
    pub(crate) source: CatalogSource,
    pub(crate) first: FoodId,
    pub(crate) second: FoodId,
    pub(crate) conditions: Option<Vec<String>>,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let first = args.first.ok_or(CliError::MissingArgument {
            field: ARG_FIRST,
            env: ENV_COMPARE_FIRST,
        })?;
        let second = args.second.ok_or(CliError::MissingArgument {
            field: ARG_SECOND,
            env: ENV_COMPARE_SECOND,
        })?;
        let source = CatalogSource::resolve(args.database, args.catalog, ENV_COMPARE_DATABASE)?;
        let conditions = (!args.conditions.is_empty()).then_some(args.conditions);
        Ok(Self {
            source,
            first,
            second,
            conditions,
        })
    }
}

pub(crate) fn run_compare_with(args: CompareArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = CompareConfig::try_from(merged)?;
    let service = FoodService::new(config.source.load()?);
    let comparison =
        service.compare_foods(config.first, config.second, config.conditions.as_deref())?;
    write_json(writer, &comparison)
}
