//! Catalogue source resolution and loading for every subcommand.
//!
//! A command reads its catalogue either from an existing SQLite database
//! (`--database`) or from a JSON snapshot (`--catalog`). Exactly one of the
//! two must be supplied once configuration layers are merged.

use std::io::{self, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use flavorfit_core::MemoryCatalog;
use log::debug;

use crate::{ARG_CATALOG, ARG_DATABASE, CliError};

/// Where a command loads its catalogue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CatalogSource {
    /// Existing SQLite database using the menu schema.
    Database(Utf8PathBuf),
    /// JSON catalogue snapshot.
    Snapshot(Utf8PathBuf),
}

impl CatalogSource {
    /// Pick the source from the merged options.
    ///
    /// `env` names the variable that can supply `--database` for the calling
    /// subcommand.
    pub(crate) fn resolve(
        database: Option<Utf8PathBuf>,
        catalog: Option<Utf8PathBuf>,
        env: &'static str,
    ) -> Result<Self, CliError> {
        match (database, catalog) {
            (Some(_), Some(_)) => Err(CliError::ConflictingArguments {
                first: ARG_DATABASE,
                second: ARG_CATALOG,
            }),
            (Some(path), None) => Ok(Self::Database(path)),
            (None, Some(path)) => Ok(Self::Snapshot(path)),
            (None, None) => Err(CliError::MissingArgument {
                field: ARG_DATABASE,
                env,
            }),
        }
    }

    /// Option name and path of the source.
    pub(crate) fn field_and_path(&self) -> (&'static str, &Utf8Path) {
        match self {
            Self::Database(path) => (ARG_DATABASE, path),
            Self::Snapshot(path) => (ARG_CATALOG, path),
        }
    }

    /// Confirm the source path names an existing file.
    pub(crate) fn validate(&self) -> Result<(), CliError> {
        let (field, path) = self.field_and_path();
        require_existing(path, field)
    }

    /// Validate the source and load it into memory.
    pub(crate) fn load(&self) -> Result<MemoryCatalog, CliError> {
        self.validate()?;
        let catalog = match self {
            Self::Database(path) => load_database(path)?,
            Self::Snapshot(path) => load_snapshot(path)?,
        };
        let (field, path) = self.field_and_path();
        debug!("loaded {} foods via --{field} {path}", catalog.len());
        Ok(catalog)
    }
}

#[cfg(feature = "store-sqlite")]
fn load_database(path: &Utf8Path) -> Result<MemoryCatalog, CliError> {
    let catalog = flavorfit_core::SqliteCatalog::open(path.as_std_path())?;
    Ok(catalog.into_memory())
}

#[cfg(not(feature = "store-sqlite"))]
fn load_database(_path: &Utf8Path) -> Result<MemoryCatalog, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "reading --database",
    })
}

/// Decode a JSON catalogue snapshot from disk.
pub(crate) fn load_snapshot(path: &Utf8Path) -> Result<MemoryCatalog, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenCatalog {
        path: path.to_path_buf(),
        source,
    })?;
    MemoryCatalog::from_json_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseCatalog {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path has no file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}
