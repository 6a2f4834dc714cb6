//! Shared test utilities for the godep workspace.
//!
//! This crate exists because the spool, app and CLI crates all need the same
//! fakes in their integration tests, and a `#[cfg(test)]` module is not
//! visible across crates.
//!
//! - [`FakeVcs`]: a filesystem-backed backend that counts fetches
//! - [`StaticResolver`]: repository roots from a fixed table
//! - [`StaticLoader`]: packages from a fixed table

mod fake_vcs;
mod loader;
mod resolver;

pub use fake_vcs::{FakeStats, FakeUpstream, FakeVcs, FakeWorkingTree};
pub use loader::{StaticLoader, package, standard_package};
pub use resolver::StaticResolver;

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use tempfile::TempDir;
use walkdir::WalkDir;

pub fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 temp path")
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Utf8Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, contents).expect("write file");
}

/// Recursively copy the contents of `from` into `to`.
pub fn copy_tree(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let dest = to.as_std_path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
