//! `recommend` command: aggregated safety verdicts for a condition set.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::FoodService;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{
    ARG_BY_TIER, ARG_CATALOG, ARG_CONDITION, ARG_DATABASE, CliError, ENV_RECOMMEND_DATABASE,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Aggregate every food's safety across all supplied health \
                 conditions. The most restrictive rating wins; conditions \
                 without a curated rating count as unrated.",
    about = "Aggregate safety verdicts for health conditions"
)]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct RecommendArgs {
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
    /// Group food identifiers by tier instead of printing full verdicts.
    #[arg(long = ARG_BY_TIER)]
    #[serde(default)]
    pub(crate) by_tier: bool,
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecommendConfig {
    pub(crate) source: CatalogSource,
    pub(crate) conditions: Vec<String>,
    pub(crate) by_tier: bool,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            source: CatalogSource::resolve(args.database, args.catalog, ENV_RECOMMEND_DATABASE)?,
            conditions: args.conditions,
            by_tier: args.by_tier,
        })
    }
}

pub(crate) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = RecommendConfig::try_from(merged)?;
    let service = FoodService::new(config.source.load()?);
    if config.by_tier {
        let groups = service.recommendations_by_tier(&config.conditions)?;
        write_json(writer, &groups)
    } else {
        let verdicts = service.get_recommendations(&config.conditions)?;
        write_json(writer, &verdicts)
    }
}
