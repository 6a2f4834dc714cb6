//! The `restore` use case: reproduce a manifest's sources in the spool.

use anyhow::Context;
use godep_repo_root::ResolveRepoRoot;
use godep_spool::{RepoLocks, RepoState, ResolvedDependency, SpoolError, SpoolLayout};
use godep_types::{ImportPath, LoadError, Manifest, PackageLoader};
use rayon::prelude::*;
use std::fmt;
use std::sync::PoisonError;
use tracing::{debug, info, warn};

/// Input for the restore use case.
pub struct RestoreInput<'a> {
    /// Manifest contents (`Godeps.json`).
    pub manifest_text: &'a str,
    pub loader: &'a dyn PackageLoader,
    pub resolver: &'a dyn ResolveRepoRoot,
    pub layout: &'a SpoolLayout,
    pub fast_remote: &'a str,
    pub main_remote: &'a str,
    pub jobs: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The checkout was already present; nothing was fetched.
    Skipped,
    Restored,
}

/// Per-dependency outcomes, in manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub entries: Vec<(ImportPath, RestoreOutcome)>,
}

impl RestoreReport {
    pub fn count(&self, outcome: RestoreOutcome) -> usize {
        self.entries.iter().filter(|(_, o)| *o == outcome).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("fetch {import_path}: {source}")]
    Fetch {
        import_path: ImportPath,
        source: SpoolError,
    },

    #[error("checkout {import_path}: {source}")]
    Checkout {
        import_path: ImportPath,
        source: SpoolError,
    },
}

impl RestoreError {
    pub fn import_path(&self) -> &ImportPath {
        match self {
            RestoreError::Fetch { import_path, .. } | RestoreError::Checkout { import_path, .. } => {
                import_path
            }
        }
    }
}

/// Every dependency that could not be restored, in manifest order.
#[derive(Debug)]
pub struct RestoreFailure {
    pub errors: Vec<RestoreError>,
    /// Outcomes of the dependencies that did succeed.
    pub report: RestoreReport,
}

impl fmt::Display for RestoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.errors.len() + self.report.entries.len();
        write!(f, "restore failed for {} of {total} dependencies", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RestoreFailure {}

struct Remotes<'a> {
    fast: &'a str,
    main: &'a str,
}

/// Run the restore use case.
///
/// Resolution of every dependency happens before any VCS work; the first
/// resolution failure aborts the run. After that every dependency is
/// attempted, and all failures are reported together as [`RestoreFailure`].
pub fn run_restore(input: RestoreInput<'_>) -> anyhow::Result<RestoreReport> {
    let mut manifest = Manifest::from_json(input.manifest_text).context("parse manifest")?;
    if manifest.deps.is_empty() {
        debug!(import_path = %manifest.import_path, "manifest has no dependencies");
        return Ok(RestoreReport::default());
    }

    load_ambient_roots(&mut manifest, input.loader)?;

    let deps = manifest
        .deps
        .iter()
        .map(|pinned| {
            let resolved = input
                .resolver
                .resolve(&pinned.import_path)
                .with_context(|| format!("resolve {}", pinned.import_path))?;
            ResolvedDependency::new(pinned.clone(), resolved, input.layout)
                .with_context(|| format!("resolve {}", pinned.import_path))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let locks = RepoLocks::new();
    let remotes = Remotes {
        fast: input.fast_remote,
        main: input.main_remote,
    };
    let results: Vec<Result<RestoreOutcome, RestoreError>> = crate::pool(input.jobs)?.install(|| {
        deps.par_iter()
            .map(|d| restore_one(d, &locks, &remotes))
            .collect()
    });

    let mut report = RestoreReport::default();
    let mut errors = Vec::new();
    for (d, result) in deps.iter().zip(results) {
        match result {
            Ok(outcome) => report.entries.push((d.import_path().clone(), outcome)),
            Err(err) => errors.push(err),
        }
    }
    if !errors.is_empty() {
        return Err(RestoreFailure { errors, report }.into());
    }
    Ok(report)
}

/// Record where the ambient workspace holds the program and each dependency.
///
/// Per-package load errors are expected (the dependency is simply not in the
/// ambient workspace) and leave the root unset.
fn load_ambient_roots(manifest: &mut Manifest, loader: &dyn PackageLoader) -> anyhow::Result<()> {
    let mut names = vec![manifest.import_path.clone()];
    names.extend(manifest.deps.iter().map(|d| d.import_path.clone()));
    let pkgs = loader.load(&names).context("load packages")?;
    if pkgs.len() != names.len() {
        return Err(LoadError::Mismatch {
            want: names.len(),
            got: pkgs.len(),
        })
        .context("load packages");
    }

    let ambient = |p: &godep_types::Package| {
        if p.load_error().is_some() {
            None
        } else {
            p.ambient_root().map(ToOwned::to_owned)
        }
    };
    manifest.ambient_root = ambient(&pkgs[0]);
    for (dep, pkg) in manifest.deps.iter_mut().zip(&pkgs[1..]) {
        dep.ambient_root = ambient(pkg);
    }
    Ok(())
}

fn restore_one(
    d: &ResolvedDependency,
    locks: &RepoLocks,
    remotes: &Remotes<'_>,
) -> Result<RestoreOutcome, RestoreError> {
    if d.workdir().exists() {
        info!(import_path = %d.import_path(), rev = d.rev(), "already restored");
        return Ok(RestoreOutcome::Skipped);
    }

    {
        let repo = locks.repo(&d.repo_root().root);
        let mut state = repo.lock().unwrap_or_else(PoisonError::into_inner);
        prepare(d, &mut state, remotes).map_err(|source| RestoreError::Fetch {
            import_path: d.import_path().clone(),
            source,
        })?;
    }

    {
        let ws = locks.workspace(d.gopath());
        let _guard = ws.lock().unwrap_or_else(PoisonError::into_inner);
        d.checkout().map_err(|source| RestoreError::Checkout {
            import_path: d.import_path().clone(),
            source,
        })?;
    }

    info!(import_path = %d.import_path(), rev = d.rev(), "restored");
    Ok(RestoreOutcome::Restored)
}

/// Make sure the repository cache exists, is linked, and holds the revision.
///
/// The ambient clone is tried first when there is one; the canonical
/// upstream is fetched when the revision is still missing. Each remote URL is
/// fetched at most once per run per repository root.
fn prepare(d: &ResolvedDependency, state: &mut RepoState, remotes: &Remotes<'_>) -> Result<(), SpoolError> {
    if d.has_repo() {
        d.link_remotes(remotes.fast, remotes.main)?;
    } else {
        d.create_repo(remotes.fast, remotes.main)?;
    }
    if d.has_revision() {
        debug!(import_path = %d.import_path(), rev = d.rev(), "revision already cached");
        return Ok(());
    }

    if let Some(fast_url) = d.fast_remote_path() {
        if !state.was_fetched(remotes.fast, fast_url.as_str()) {
            match d.fetch(remotes.fast) {
                Ok(()) => state.mark_fetched(remotes.fast, fast_url.as_str()),
                Err(err) => warn!(import_path = %d.import_path(), error = %err, "fetch from ambient copy failed"),
            }
            if d.has_revision() {
                return Ok(());
            }
        }
        warn!(
            import_path = %d.import_path(),
            rev = d.rev(),
            remote = remotes.main,
            "revision not in ambient copy, fetching upstream"
        );
    }

    if !state.was_fetched(remotes.main, d.remote_url()) {
        d.fetch(remotes.main)?;
        state.mark_fetched(remotes.main, d.remote_url());
    }
    Ok(())
}
