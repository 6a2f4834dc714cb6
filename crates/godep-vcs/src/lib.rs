//! Version-control backends.
//!
//! Everything VCS-specific lives behind the [`Vcs`] capability set so capture,
//! restore and the spool layout stay backend-agnostic. Adding a system means
//! one more implementation here plus a recognition rule in `godep-repo-root`.
//!
//! This crate spawns the `git`, `hg` and `bzr` binaries; it does no network I/O
//! of its own beyond what those commands do.

#![forbid(unsafe_code)]

mod bzr;
mod error;
mod git;
mod hg;
mod kind;
mod run;

use camino::Utf8Path;

pub use bzr::Bazaar;
pub use error::VcsError;
pub use git::Git;
pub use hg::Mercurial;
pub use kind::{UnknownVcs, VcsKind};

/// The operations godep needs from a version-control system.
///
/// All methods operate on a local directory; remotes are referred to by name
/// after being registered with [`Vcs::link`].
pub trait Vcs: Send + Sync {
    /// Short command name, e.g. `git`.
    fn name(&self) -> &str;

    /// The revision currently checked out in `dir`.
    fn identify(&self, dir: &Utf8Path) -> Result<String, VcsError>;

    /// True if `dir` has uncommitted changes. Detection failure counts as dirty.
    fn is_dirty(&self, dir: &Utf8Path) -> bool;

    /// Human-readable label for `rev` (nearest tag and distance). Empty when unavailable.
    fn describe(&self, dir: &Utf8Path, rev: &str) -> String;

    /// Initialize an empty repository at `dir`.
    fn create(&self, dir: &Utf8Path) -> Result<(), VcsError>;

    /// Register `url` under `remote`. Linking the same name to the same URL again is a no-op.
    fn link(&self, dir: &Utf8Path, remote: &str, url: &str) -> Result<(), VcsError>;

    /// Pull history from the named remote into `dir`.
    fn fetch(&self, dir: &Utf8Path, remote: &str) -> Result<(), VcsError>;

    /// True if `rev` is present in `dir` without fetching.
    fn exists(&self, dir: &Utf8Path, rev: &str) -> bool;

    /// Materialize the tree at `rev` into `workdir`, reading history from `source_dir`.
    fn checkout(&self, workdir: &Utf8Path, rev: &str, source_dir: &Utf8Path) -> Result<(), VcsError>;
}
