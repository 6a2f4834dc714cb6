//! The package loader port.
//!
//! godep never parses Go sources itself; it asks a loader (normally `go list`)
//! for the facts it needs about each import path.

use crate::ImportPath;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// One package as reported by the loader. Field names follow `go list -json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Package {
    pub import_path: ImportPath,

    #[serde(default)]
    pub dir: Utf8PathBuf,

    /// GOPATH entry (or GOROOT) containing the package; empty when unknown.
    #[serde(default)]
    pub root: Utf8PathBuf,

    #[serde(default)]
    pub standard: bool,

    #[serde(default)]
    pub deps: Vec<ImportPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PackageError>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageError {
    #[serde(rename = "Err", default)]
    pub err: String,
}

impl Package {
    pub fn ambient_root(&self) -> Option<&Utf8Path> {
        if self.root.as_str().is_empty() {
            None
        } else {
            Some(&self.root)
        }
    }

    /// The loader's per-package error message, if it reported one.
    pub fn load_error(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.err.as_str())
            .filter(|e| !e.is_empty())
    }
}

/// Failure of the loader as a whole (as opposed to a per-package error).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("decode package list: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("loader returned {got} packages for {want} import paths")]
    Mismatch { want: usize, got: usize },
}

/// Given import paths, return one `Package` per path, in input order.
pub trait PackageLoader: Send + Sync {
    fn load(&self, import_paths: &[ImportPath]) -> Result<Vec<Package>, LoadError>;

    /// Expand command-line patterns (`.`, `./...`) into every package they
    /// match, in the loader's order. The result may be longer or shorter
    /// than `patterns`.
    ///
    /// Loaders without pattern support treat each pattern as an import path.
    fn expand(&self, patterns: &[String]) -> Result<Vec<Package>, LoadError> {
        let paths: Vec<ImportPath> = patterns.iter().map(ImportPath::new).collect();
        self.load(&paths)
    }
}
