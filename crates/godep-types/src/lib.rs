//! Stable DTOs used across the godep workspace.
//!
//! This crate is intentionally boring:
//! - the persisted manifest (`Godeps.json`) and its pinned dependencies
//! - canonical import path handling
//! - the package loader port and the package records it returns

#![forbid(unsafe_code)]

pub mod import_path;
pub mod loader;
pub mod manifest;

pub use import_path::{ImportPath, path_prefix_in};
pub use loader::{LoadError, Package, PackageError, PackageLoader};
pub use manifest::{Manifest, ManifestError, PinnedDependency};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
pub mod fuzz {
    /// Parse arbitrary text as a manifest. **Never panics** on any input.
    pub fn parse_manifest(text: &str) -> Result<(), crate::ManifestError> {
        let m = crate::Manifest::from_json(text)?;
        let _ = m.check_minimal();
        Ok(())
    }
}
