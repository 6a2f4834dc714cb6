use godep_repo_root::{RepoRoot, ResolveError, ResolveRepoRoot, ResolvedRoot};
use godep_types::ImportPath;
use godep_vcs::{Vcs, VcsKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolves import paths from a fixed table of repository roots.
///
/// The longest registered root containing the import path wins; anything
/// else is `Unresolvable`. `RepoRoot::vcs` is a nominal `git` label, the
/// backend actually used is the one registered with the root.
#[derive(Default)]
pub struct StaticResolver {
    roots: Vec<ResolvedRoot>,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: &str, repo: &str, vcs: Arc<dyn Vcs>) -> Self {
        self.roots.push(ResolvedRoot {
            root: RepoRoot {
                root: ImportPath::new(root),
                repo: repo.to_string(),
                vcs: VcsKind::Git,
            },
            vcs,
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResolveRepoRoot for StaticResolver {
    fn resolve(&self, import_path: &ImportPath) -> Result<ResolvedRoot, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.roots
            .iter()
            .filter(|r| import_path.is_within(&r.root.root))
            .max_by_key(|r| r.root.root.as_str().len())
            .cloned()
            .ok_or_else(|| ResolveError::Unresolvable {
                import_path: import_path.clone(),
            })
    }
}
