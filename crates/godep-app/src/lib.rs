//! Use case orchestration for godep.
//!
//! This crate provides the application layer: `save` captures a manifest from
//! a program's import graph, `restore` reproduces a manifest's sources in the
//! spool, and `path` lists the spool workspaces a build should use.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.
//! Collaborators (package loader, repository root resolver, VCS backends) are
//! passed in as trait objects so tests can substitute fakes.

#![forbid(unsafe_code)]

mod path;
mod restore;
mod save;

pub use path::{PathOutput, join_gopath, run_path};
pub use restore::{
    RestoreError, RestoreFailure, RestoreInput, RestoreOutcome, RestoreReport, run_restore,
};
pub use save::{CaptureError, CaptureProblem, SaveInput, capture, run_save, write_manifest};

use anyhow::Context;

/// Worker pool for per-dependency work.
fn pool(jobs: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("godep-worker-{i}"))
        .build()
        .context("build worker pool")
}
