use crate::{DependencyError, SpoolError, SpoolLayout};
use camino::{Utf8Path, Utf8PathBuf};
use godep_repo_root::{RepoRoot, ResolvedRoot};
use godep_types::{ImportPath, PinnedDependency};
use godep_vcs::{Vcs, VcsError};
use std::fmt;
use std::fs;
use std::sync::Arc;
use tracing::{debug, warn};

/// A pinned dependency bound to its repository root, backend and spool paths.
///
/// Built from a [`PinnedDependency`] by an explicit resolution step; the
/// pinned record itself is never mutated.
#[derive(Clone)]
pub struct ResolvedDependency {
    pinned: PinnedDependency,
    root: RepoRoot,
    vcs: Arc<dyn Vcs>,
    repo_path: Utf8PathBuf,
    gopath: Utf8PathBuf,
}

impl fmt::Debug for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedDependency")
            .field("import_path", &self.pinned.import_path)
            .field("rev", &self.pinned.rev)
            .field("root", &self.root.root)
            .field("vcs", &self.vcs.name())
            .finish()
    }
}

impl ResolvedDependency {
    pub fn new(
        pinned: PinnedDependency,
        resolved: ResolvedRoot,
        layout: &SpoolLayout,
    ) -> Result<Self, SpoolError> {
        let gopath = layout.revision_workspace(&pinned.rev).ok_or_else(|| {
            SpoolError::InvalidRevision {
                import_path: pinned.import_path.clone(),
                rev: pinned.rev.clone(),
            }
        })?;
        Ok(Self {
            repo_path: layout.repo_path(&resolved.root.root),
            gopath,
            pinned,
            root: resolved.root,
            vcs: resolved.vcs,
        })
    }

    pub fn pinned(&self) -> &PinnedDependency {
        &self.pinned
    }

    pub fn import_path(&self) -> &ImportPath {
        &self.pinned.import_path
    }

    pub fn rev(&self) -> &str {
        &self.pinned.rev
    }

    pub fn repo_root(&self) -> &RepoRoot {
        &self.root
    }

    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    /// Repository cache shared by every revision of this root.
    pub fn repo_path(&self) -> &Utf8Path {
        &self.repo_path
    }

    pub fn remote_url(&self) -> &str {
        &self.root.repo
    }

    /// The ambient workspace's copy of the repository, when known.
    pub fn fast_remote_path(&self) -> Option<Utf8PathBuf> {
        self.pinned
            .ambient_root
            .as_ref()
            .map(|ambient| ambient.join("src").join(self.root.root.as_str()))
    }

    /// Revision workspace; a GOPATH entry.
    pub fn gopath(&self) -> &Utf8Path {
        &self.gopath
    }

    pub fn workdir(&self) -> Utf8PathBuf {
        self.gopath.join("src").join(self.pinned.import_path.as_str())
    }

    pub fn workdir_root(&self) -> Utf8PathBuf {
        self.gopath.join("src").join(self.root.root.as_str())
    }

    pub fn has_revision(&self) -> bool {
        self.vcs.exists(&self.repo_path, &self.pinned.rev)
    }

    /// True when the repository cache directory exists and holds anything.
    ///
    /// An empty directory is what a failed `create` leaves behind; it is
    /// treated as no cache at all.
    pub fn has_repo(&self) -> bool {
        fs::read_dir(&self.repo_path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Create the repository cache and link its remotes.
    ///
    /// The fast remote is linked only when an ambient copy is known. When the
    /// backend cannot create the repository, the directory is removed again.
    pub fn create_repo(&self, fast_remote: &str, main_remote: &str) -> Result<(), SpoolError> {
        debug!(root = %self.root.root, path = %self.repo_path, "creating repository cache");
        if self.has_repo() {
            return Err(VcsError::NotEmpty {
                dir: self.repo_path.clone(),
            }
            .into());
        }
        fs::create_dir_all(&self.repo_path).map_err(|e| SpoolError::io(&self.repo_path, e))?;
        if let Err(err) = self.vcs.create(&self.repo_path) {
            if let Err(rm) = fs::remove_dir_all(&self.repo_path) {
                warn!(path = %self.repo_path, error = %rm, "could not remove failed repository cache");
            }
            return Err(err.into());
        }
        self.link_remotes(fast_remote, main_remote)
    }

    /// Point the remotes of an existing repository cache at this dependency's
    /// fast and main locations. Idempotent.
    pub fn link_remotes(&self, fast_remote: &str, main_remote: &str) -> Result<(), SpoolError> {
        if let Some(fast) = self.fast_remote_path() {
            self.vcs.link(&self.repo_path, fast_remote, fast.as_str())?;
        }
        self.vcs.link(&self.repo_path, main_remote, &self.root.repo)?;
        Ok(())
    }

    pub fn fetch(&self, remote: &str) -> Result<(), SpoolError> {
        debug!(root = %self.root.root, remote, "fetching");
        self.vcs.fetch(&self.repo_path, remote)?;
        Ok(())
    }

    /// Materialize the pinned revision under [`workdir_root`](Self::workdir_root).
    ///
    /// Does nothing when the target directory already exists. A failed
    /// checkout removes the partial tree so a later run retries it.
    pub fn checkout(&self) -> Result<(), SpoolError> {
        let target = self.workdir_root();
        if target.exists() {
            debug!(path = %target, "checkout already present");
            return Ok(());
        }
        if !self.has_revision() {
            return Err(SpoolError::UnknownRevision {
                import_path: self.pinned.import_path.clone(),
                rev: self.pinned.rev.clone(),
            });
        }
        fs::create_dir_all(&target).map_err(|e| SpoolError::io(&target, e))?;
        if let Err(err) = self.vcs.checkout(&target, &self.pinned.rev, &self.repo_path) {
            if let Err(rm) = fs::remove_dir_all(&target) {
                warn!(path = %target, error = %rm, "could not remove partial checkout");
            }
            return Err(err.into());
        }
        debug!(path = %target, rev = %self.pinned.rev, "checked out");
        Ok(())
    }

    pub fn fetch_and_checkout(&self, remote: &str) -> Result<(), DependencyError> {
        self.fetch(remote).map_err(DependencyError::Fetch)?;
        self.checkout().map_err(DependencyError::Checkout)
    }
}
