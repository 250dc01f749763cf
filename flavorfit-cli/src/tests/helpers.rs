//! Test helpers for writing catalogue fixtures to a temporary workspace.

use camino::{Utf8Path, Utf8PathBuf};
use flavorfit_core::test_support::sample_catalog;
use std::fs;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Temporary workspace holding the sample menu as a JSON snapshot and, with
/// `store-sqlite`, as a SQLite database.
#[derive(Debug)]
pub(super) struct CatalogFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
    snapshot: Utf8PathBuf,
}

impl CatalogFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let snapshot = root.join("menu.json");
        let payload =
            serde_json::to_string_pretty(&sample_catalog().to_snapshot()).expect("serialize");
        write_utf8(&snapshot, payload.as_bytes());
        Self {
            _dir: dir,
            root,
            snapshot,
        }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn snapshot(&self) -> &Utf8Path {
        &self.snapshot
    }

    #[cfg(feature = "store-sqlite")]
    pub(super) fn database(&self) -> Utf8PathBuf {
        let path = self.root.join("food_menu.db");
        if !path.exists() {
            flavorfit_core::test_support::write_sqlite_catalog(
                path.as_std_path(),
                &sample_catalog(),
            )
            .expect("write sqlite catalogue");
        }
        path
    }
}

/// Decode captured command output as JSON.
pub(super) fn output_json(buffer: &[u8]) -> serde_json::Value {
    serde_json::from_slice(buffer).expect("output should be JSON")
}
