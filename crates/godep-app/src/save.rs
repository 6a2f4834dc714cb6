//! The `save` use case: capture a manifest from a live program.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use godep_repo_root::{ResolveError, ResolveRepoRoot, ResolvedRoot};
use godep_types::{
    ImportPath, LoadError, Manifest, Package, PackageLoader, PinnedDependency, path_prefix_in,
};
use godep_vcs::{Vcs, VcsError};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use tracing::{debug, info};

/// Input for the save use case.
pub struct SaveInput<'a> {
    /// Package patterns from the command line (`.`, `./...`). The first
    /// package they expand to is the program.
    pub packages: &'a [String],
    /// Toolchain version recorded verbatim in the manifest.
    pub go_version: String,
    pub loader: &'a dyn PackageLoader,
    pub resolver: &'a dyn ResolveRepoRoot,
    pub jobs: usize,
}

/// One reason a dependency could not be pinned.
#[derive(Debug, thiserror::Error)]
pub enum CaptureProblem {
    #[error("{import_path}: {message}")]
    Load {
        import_path: ImportPath,
        message: String,
    },

    #[error("{source}")]
    Resolution {
        import_path: ImportPath,
        source: ResolveError,
    },

    #[error("identify {import_path}: {source}")]
    Identify {
        import_path: ImportPath,
        source: VcsError,
    },

    #[error("dirty working tree: {dir}")]
    DirtyWorkingTree {
        import_path: ImportPath,
        dir: Utf8PathBuf,
    },
}

impl CaptureProblem {
    pub fn import_path(&self) -> &ImportPath {
        match self {
            CaptureProblem::Load { import_path, .. }
            | CaptureProblem::Resolution { import_path, .. }
            | CaptureProblem::Identify { import_path, .. }
            | CaptureProblem::DirtyWorkingTree { import_path, .. } => import_path,
        }
    }
}

/// Every problem found while capturing, sorted by import path.
/// No manifest is produced when this is returned.
#[derive(Debug)]
pub struct CaptureError {
    pub problems: Vec<CaptureProblem>,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error loading dependencies")?;
        for p in &self.problems {
            write!(f, "\n  {p}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CaptureError {}

/// Run the save use case: load the named packages and capture their manifest.
pub fn run_save(input: SaveInput<'_>) -> anyhow::Result<Manifest> {
    if input.packages.is_empty() {
        anyhow::bail!("no packages to save");
    }
    let program = input
        .loader
        .expand(input.packages)
        .context("load program packages")?;
    if program.is_empty() {
        anyhow::bail!("no packages match {}", input.packages.join(" "));
    }

    let problems: Vec<CaptureProblem> = program
        .iter()
        .filter_map(|p| {
            p.load_error().map(|message| CaptureProblem::Load {
                import_path: p.import_path.clone(),
                message: message.to_string(),
            })
        })
        .collect();
    if !problems.is_empty() {
        return Err(CaptureError { problems }.into());
    }

    let manifest = capture(&program, input.go_version, input.loader, input.resolver, input.jobs)?;
    info!(
        import_path = %manifest.import_path,
        deps = manifest.deps.len(),
        "captured manifest"
    );
    Ok(manifest)
}

/// Build the manifest for `program` (the first package is the program root).
///
/// Candidates are the union of the root's dependencies and every other
/// package with its dependencies, visited in sorted order. A candidate is
/// skipped when it is standard or lies at or below the root or an
/// already-pinned dependency. Sorting puts every path before its sub-paths,
/// so the first pinned package of a subtree absorbs the rest of it.
pub fn capture(
    program: &[Package],
    go_version: String,
    loader: &dyn PackageLoader,
    resolver: &dyn ResolveRepoRoot,
    jobs: usize,
) -> anyhow::Result<Manifest> {
    let Some((root, rest)) = program.split_first() else {
        anyhow::bail!("no program packages");
    };

    let mut candidates: Vec<ImportPath> = root.deps.clone();
    for p in rest {
        candidates.push(p.import_path.clone());
        candidates.extend(p.deps.iter().cloned());
    }
    candidates.sort();
    candidates.dedup();

    let pkgs = if candidates.is_empty() {
        Vec::new()
    } else {
        loader.load(&candidates).context("load dependencies")?
    };
    if pkgs.len() != candidates.len() {
        return Err(LoadError::Mismatch {
            want: candidates.len(),
            got: pkgs.len(),
        })
        .context("load dependencies");
    }

    let mut problems = Vec::new();
    let mut seen = vec![root.import_path.as_str().to_string()];
    let mut selected: Vec<(&Package, ResolvedRoot)> = Vec::new();
    for pkg in &pkgs {
        if let Some(message) = pkg.load_error() {
            problems.push(CaptureProblem::Load {
                import_path: pkg.import_path.clone(),
                message: message.to_string(),
            });
            continue;
        }
        if pkg.standard || path_prefix_in(&seen, pkg.import_path.as_str()) {
            continue;
        }
        match resolver.resolve(&pkg.import_path) {
            Ok(resolved) => {
                seen.push(format!("{}/", pkg.import_path));
                selected.push((pkg, resolved));
            }
            Err(source) => problems.push(CaptureProblem::Resolution {
                import_path: pkg.import_path.clone(),
                source,
            }),
        }
    }

    let inspected: Vec<Result<PinnedDependency, CaptureProblem>> = crate::pool(jobs)?.install(|| {
        selected
            .par_iter()
            .map(|(pkg, resolved)| inspect(pkg, resolved.vcs.as_ref()))
            .collect()
    });

    let mut manifest = Manifest::new(root.import_path.clone(), go_version);
    for result in inspected {
        match result {
            Ok(dep) => manifest.deps.push(dep),
            Err(problem) => problems.push(problem),
        }
    }
    if !problems.is_empty() {
        problems.sort_by(|a, b| a.import_path().cmp(b.import_path()));
        return Err(CaptureError { problems }.into());
    }
    Ok(manifest)
}

fn inspect(pkg: &Package, vcs: &dyn Vcs) -> Result<PinnedDependency, CaptureProblem> {
    let rev = vcs
        .identify(&pkg.dir)
        .map_err(|source| CaptureProblem::Identify {
            import_path: pkg.import_path.clone(),
            source,
        })?;
    if vcs.is_dirty(&pkg.dir) {
        return Err(CaptureProblem::DirtyWorkingTree {
            import_path: pkg.import_path.clone(),
            dir: pkg.dir.clone(),
        });
    }
    let comment = vcs.describe(&pkg.dir, &rev);
    debug!(import_path = %pkg.import_path, %rev, %comment, "pinned");
    Ok(PinnedDependency::new(pkg.import_path.clone(), rev, comment))
}

/// Write `manifest` to `path`, creating parent directories.
pub fn write_manifest(path: &Utf8Path, manifest: &Manifest) -> anyhow::Result<()> {
    let text = manifest.to_json().context("serialize manifest")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    fs::write(path, text).with_context(|| format!("write {path}"))?;
    Ok(())
}
