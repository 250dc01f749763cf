//! `catalog` command: the conditions, allergens and categories on offer.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use flavorfit_core::{Allergen, Category, FoodService, HealthCondition};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::write_json;
use crate::source::CatalogSource;
use crate::{ARG_CATALOG, ARG_DATABASE, CliError, ENV_CATALOG_DATABASE};

/// CLI arguments for the `catalog` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Describe the catalogue's conditions, allergens and categories")]
#[ortho_config(prefix = "FLAVORFIT")]
pub(crate) struct CatalogArgs {
    /// Path to an existing SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to a JSON catalogue snapshot.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
}

#[derive(Debug, Serialize)]
struct CatalogOverview<'a> {
    conditions: &'a [HealthCondition],
    allergens: &'a [Allergen],
    categories: &'a [Category],
}

pub(crate) fn run_catalog_with(args: CatalogArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let source = CatalogSource::resolve(merged.database, merged.catalog, ENV_CATALOG_DATABASE)?;
    let service = FoodService::new(source.load()?);
    let overview = CatalogOverview {
        conditions: service.conditions(),
        allergens: service.allergens(),
        categories: service.categories(),
    };
    write_json(writer, &overview)
}
