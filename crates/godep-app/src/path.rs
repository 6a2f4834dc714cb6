//! The `path` use case: list the revision workspaces a build should use.

use anyhow::Context;
use camino::Utf8PathBuf;
use godep_spool::SpoolLayout;
use godep_types::Manifest;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathOutput {
    /// Revision workspaces, deduplicated, in manifest order.
    pub entries: Vec<Utf8PathBuf>,
}

/// Compute the GOPATH entries holding a manifest's pinned sources.
///
/// Pure path arithmetic: nothing is resolved or fetched, so the result is
/// only useful after `restore`.
pub fn run_path(manifest_text: &str, layout: &SpoolLayout) -> anyhow::Result<PathOutput> {
    let manifest = Manifest::from_json(manifest_text).context("parse manifest")?;
    let mut entries: Vec<Utf8PathBuf> = Vec::new();
    for dep in &manifest.deps {
        let ws = layout
            .revision_workspace(&dep.rev)
            .with_context(|| format!("invalid revision {:?} for {}", dep.rev, dep.import_path))?;
        if !entries.contains(&ws) {
            entries.push(ws);
        }
    }
    Ok(PathOutput { entries })
}

/// Join entries with the platform's path-list separator.
pub fn join_gopath(entries: &[Utf8PathBuf]) -> anyhow::Result<String> {
    let joined = std::env::join_paths(entries).context("join GOPATH entries")?;
    joined
        .into_string()
        .map_err(|_| anyhow::anyhow!("GOPATH is not valid UTF-8"))
}
