//! The spool: godep's on-disk cache of repositories and pinned checkouts.
//!
//! ```text
//! <spool>/repo/<repo root>/              one repository cache per upstream
//! <spool>/rev/<rev[..2]>/<rev[2..]>/     one GOPATH-shaped workspace per revision
//!     src/<import path>/                 the checked-out package
//! ```
//!
//! Repository caches are shared by every revision of the same root and are
//! never deleted. Revision workspaces never collide because their paths are
//! derived from the revision identifier alone.

#![forbid(unsafe_code)]

mod dependency;
mod error;
mod layout;
mod locks;

pub use dependency::ResolvedDependency;
pub use error::{DependencyError, SpoolError};
pub use layout::SpoolLayout;
pub use locks::{RepoLocks, RepoState};
