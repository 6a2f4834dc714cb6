use crate::discover::{Discover, HttpDiscovery, MetaImport, parse_meta_imports};
use crate::host::match_static;
use crate::{RepoRoot, ResolveError, ResolveRepoRoot, ResolvedRoot};
use godep_types::ImportPath;
use godep_vcs::VcsKind;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Resolves import paths by hosting convention, then by `go-import` discovery.
///
/// Roots already found are remembered, so sibling packages of one repository
/// never trigger a second lookup.
pub struct HostResolver {
    discovery: Option<Box<dyn Discover>>,
    cache: Mutex<BTreeMap<ImportPath, RepoRoot>>,
}

impl HostResolver {
    /// Resolver with HTTPS discovery. Falls back to offline mode when no
    /// HTTP client can be built.
    pub fn new() -> Self {
        match HttpDiscovery::new() {
            Ok(d) => Self::with_discovery(d),
            Err(err) => {
                warn!(error = %err, "go-import discovery disabled");
                Self::offline()
            }
        }
    }

    /// Resolver that only applies static rules.
    pub fn offline() -> Self {
        Self {
            discovery: None,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_discovery(discovery: impl Discover + 'static) -> Self {
        Self {
            discovery: Some(Box::new(discovery)),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Root, remote URL and VCS kind for `import_path`.
    pub fn repo_root(&self, import_path: &ImportPath) -> Result<RepoRoot, ResolveError> {
        if let Some(hit) = self.cached(import_path) {
            return Ok(hit);
        }
        let root = match match_static(import_path) {
            Some(r) => r?,
            None => self.discover(import_path)?,
        };
        debug!(import_path = %import_path, root = %root.root, vcs = %root.vcs, "resolved repository root");
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(root.root.clone(), root.clone());
        Ok(root)
    }

    fn cached(&self, import_path: &ImportPath) -> Option<RepoRoot> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .values()
            .filter(|r| import_path.is_within(&r.root))
            .max_by_key(|r| r.root.as_str().len())
            .cloned()
    }

    fn discover(&self, import_path: &ImportPath) -> Result<RepoRoot, ResolveError> {
        let has_host = import_path
            .segments()
            .next()
            .is_some_and(|host| host.contains('.'));
        let (Some(discovery), true) = (&self.discovery, has_host) else {
            return Err(ResolveError::Unresolvable {
                import_path: import_path.clone(),
            });
        };
        let failed = |reason: String| ResolveError::Discovery {
            import_path: import_path.clone(),
            reason,
        };

        let page = discovery.fetch_page(import_path.as_str()).map_err(failed)?;
        let meta = select_meta(import_path, parse_meta_imports(&page)).map_err(failed)?;
        let vcs: VcsKind = meta
            .vcs
            .parse()
            .map_err(|e: godep_vcs::UnknownVcs| failed(e.to_string()))?;
        Ok(RepoRoot {
            root: ImportPath::new(&meta.prefix),
            repo: meta.repo,
            vcs,
        })
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveRepoRoot for HostResolver {
    fn resolve(&self, import_path: &ImportPath) -> Result<ResolvedRoot, ResolveError> {
        let root = self.repo_root(import_path)?;
        Ok(ResolvedRoot {
            vcs: root.vcs.backend(),
            root,
        })
    }
}

/// Exactly one tag must own the import path.
fn select_meta(import_path: &ImportPath, imports: Vec<MetaImport>) -> Result<MetaImport, String> {
    let mut matching = imports
        .into_iter()
        .filter(|m| import_path.is_within(&ImportPath::new(&m.prefix)));
    match (matching.next(), matching.next()) {
        (Some(m), None) => Ok(m),
        (None, _) => Err("no go-import meta tag matches".to_string()),
        (Some(a), Some(b)) => Err(format!(
            "multiple go-import meta tags match: {} and {}",
            a.prefix, b.prefix
        )),
    }
}
