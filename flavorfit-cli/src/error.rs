//! Error types emitted by the FlavorFit CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use flavorfit_core::{
    CatalogError, FoodId, InvalidInput, MealPlanError, UnknownCategory, UnknownSortKey,
};
use thiserror::Error;

/// Errors emitted by the FlavorFit CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Two mutually exclusive options were both supplied.
    #[error("--{first} and --{second} cannot be used together")]
    ConflictingArguments {
        /// First option supplied.
        first: &'static str,
        /// Second option supplied.
        second: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature that must be enabled.
        feature: &'static str,
        /// Operation that needed it.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option that named the path.
        field: &'static str,
        /// Path that was not found.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option that named the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option that named the path.
        field: &'static str,
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the JSON catalogue snapshot failed.
    #[error("failed to open catalogue snapshot at {path:?}: {source}")]
    OpenCatalog {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The JSON catalogue snapshot could not be decoded or was inconsistent.
    #[error("failed to load catalogue snapshot at {path:?}: {source}")]
    ParseCatalog {
        /// Snapshot location.
        path: Utf8PathBuf,
        /// Decoding or consistency failure.
        #[source]
        source: CatalogError,
    },
    /// Opening the SQLite catalogue failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    OpenDatabase(#[from] flavorfit_core::SqliteCatalogError),
    /// A category name was not recognised.
    #[error(transparent)]
    InvalidCategory(#[from] UnknownCategory),
    /// A sort key was not recognised.
    #[error(transparent)]
    InvalidSortKey(#[from] UnknownSortKey),
    /// The catalogue rejected the request.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    /// The meal planner rejected the request.
    #[error("meal planning failed: {0}")]
    MealPlan(#[from] MealPlanError),
    /// The catalogue holds no nutrition facts for a food being assessed.
    #[error("food {id} has no nutrition facts to assess")]
    MissingNutrition {
        /// Food being assessed.
        id: FoodId,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
