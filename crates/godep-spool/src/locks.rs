use camino::{Utf8Path, Utf8PathBuf};
use godep_types::ImportPath;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// What has already happened to one repository cache during this run.
#[derive(Debug, Default)]
pub struct RepoState {
    /// `(remote, url)` pairs fetched successfully this run. The URL is part
    /// of the key because dependencies of one root may relink the fast remote
    /// to different ambient copies.
    pub fetched: BTreeSet<(String, String)>,
}

impl RepoState {
    pub fn was_fetched(&self, remote: &str, url: &str) -> bool {
        self.fetched.contains(&(remote.to_string(), url.to_string()))
    }

    pub fn mark_fetched(&mut self, remote: &str, url: &str) {
        self.fetched.insert((remote.to_string(), url.to_string()));
    }
}

/// In-process lock registry.
///
/// Repository caches are locked by repository root; revision workspaces by
/// their `GOPATH` directory, since two dependencies under one root pinned to
/// the same revision share a checkout.
#[derive(Debug, Default)]
pub struct RepoLocks {
    repos: Mutex<BTreeMap<ImportPath, Arc<Mutex<RepoState>>>>,
    workspaces: Mutex<BTreeMap<Utf8PathBuf, Arc<Mutex<()>>>>,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repo(&self, root: &ImportPath) -> Arc<Mutex<RepoState>> {
        let mut repos = self.repos.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(repos.entry(root.clone()).or_default())
    }

    pub fn workspace(&self, gopath: &Utf8Path) -> Arc<Mutex<()>> {
        let mut ws = self.workspaces.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(ws.entry(gopath.to_owned()).or_default())
    }
}
