//! Repository root resolution: which repository owns an import path?
//!
//! Known hosting conventions are matched statically; anything else falls back
//! to the `go-import` meta tag served at `https://<import path>?go-get=1`.

#![forbid(unsafe_code)]

mod discover;
mod host;
mod resolver;

use godep_types::ImportPath;
use godep_vcs::{Vcs, VcsKind};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use discover::{Discover, HttpDiscovery, MetaImport, parse_meta_imports};
pub use resolver::HostResolver;

/// One upstream repository.
///
/// Many import paths resolve to the same root; equality is by `root` only.
#[derive(Clone, Debug)]
pub struct RepoRoot {
    /// Shortest import path naming the repository, e.g. `github.com/lib/pq`.
    pub root: ImportPath,
    /// Canonical fetch URL.
    pub repo: String,
    pub vcs: VcsKind,
}

impl PartialEq for RepoRoot {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for RepoRoot {}

impl Hash for RepoRoot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

/// A repository root bound to the backend that manages it.
#[derive(Clone)]
pub struct ResolvedRoot {
    pub root: RepoRoot,
    pub vcs: Arc<dyn Vcs>,
}

impl fmt::Debug for ResolvedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRoot")
            .field("root", &self.root)
            .field("vcs", &self.vcs.name())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unrecognized import path {import_path}")]
    Unresolvable { import_path: ImportPath },

    #[error("invalid import path {import_path}: {reason}")]
    Invalid {
        import_path: ImportPath,
        reason: String,
    },

    #[error("discover repository for {import_path}: {reason}")]
    Discovery {
        import_path: ImportPath,
        reason: String,
    },
}

/// Maps an import path to its repository root and backend.
pub trait ResolveRepoRoot: Send + Sync {
    fn resolve(&self, import_path: &ImportPath) -> Result<ResolvedRoot, ResolveError>;
}
