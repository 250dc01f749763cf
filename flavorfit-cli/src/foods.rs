//! `foods` command: filtered and sorted catalogue listings.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::{AllergenExclusion, Category, FoodFilter, FoodService, SortKey};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{
    ARG_CATALOG, ARG_CATEGORY, ARG_CONDITION, ARG_DATABASE, ARG_EXCLUDE_ALLERGEN, ARG_SEARCH,
    ARG_SORT, CliError, ENV_FOODS_DATABASE,
};

/// CLI arguments for the `foods` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List catalogue foods. The search text matches names, \
                 descriptions and categories; the tokens `recommended` and \
                 `no allergens` narrow the listing further. Supplying \
                 conditions attaches an aggregated safety verdict to every \
                 food.",
    about = "List foods matching a filter"
)]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct FoodsArgs {
    /// Path to an existing SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON catalogue snapshot.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Keep only foods in this category.
    #[arg(long = ARG_CATEGORY, value_name = "name")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Free-text search.
    #[arg(long = ARG_SEARCH, value_name = "text")]
    #[serde(default)]
    pub(crate) search: Option<String>,
    /// Sort key (`default`, `recommended`, `name`, `nameDesc`, `category`).
    #[arg(long = ARG_SORT, value_name = "key")]
    #[serde(default)]
    pub(crate) sort: Option<String>,
    /// Allergen code or name to exclude; repeat or comma-separate.
    #[arg(long = ARG_EXCLUDE_ALLERGEN, value_name = "code", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) exclude_allergens: Vec<String>,
    /// Health condition code used to attach verdicts; repeat or comma-separate.
    #[arg(long = ARG_CONDITION, value_name = "code", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) conditions: Vec<String>,
}

impl FoodsArgs {
    pub(crate) fn into_config(self) -> Result<FoodsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FoodsConfig::try_from(merged)
    }
}

/// Resolved `foods` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FoodsConfig {
    pub(crate) source: CatalogSource,
    pub(crate) filter: FoodFilter,
}

impl TryFrom<FoodsArgs> for FoodsConfig {
    type Error = CliError;

    fn try_from(args: FoodsArgs) -> Result<Self, Self::Error> {
        let source = CatalogSource::resolve(args.database, args.catalog, ENV_FOODS_DATABASE)?;
        let category = args
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()?;
        let sort_key = args
            .sort
            .as_deref()
            .map(str::parse::<SortKey>)
            .transpose()?
            .unwrap_or_default();
        let conditions = (!args.conditions.is_empty()).then_some(args.conditions);
        Ok(Self {
            source,
            filter: FoodFilter {
                category,
                search_text: args.search.unwrap_or_default(),
                exclude_allergens: AllergenExclusion::new(args.exclude_allergens),
                sort_key,
                conditions,
            },
        })
    }
}

pub(crate) fn run_foods_with(args: FoodsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let service = FoodService::new(config.source.load()?);
    let summaries = service.list_foods(&config.filter)?;
    write_json(writer, &summaries)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FoodsConfig, CliError> {
    let merged = FoodsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FoodsConfig::try_from(merged)
}
