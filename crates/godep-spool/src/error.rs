use camino::Utf8PathBuf;
use godep_types::ImportPath;
use godep_vcs::VcsError;

#[derive(Debug, thiserror::Error)]
pub enum SpoolError {
    /// The revision cannot be split into a spool path.
    #[error("invalid revision {rev:?} for {import_path}")]
    InvalidRevision { import_path: ImportPath, rev: String },

    #[error("unknown rev {rev} for {import_path}")]
    UnknownRevision { import_path: ImportPath, rev: String },

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("{path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SpoolError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        SpoolError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A failed [`fetch_and_checkout`](crate::ResolvedDependency::fetch_and_checkout),
/// tagged with the phase that failed.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("fetch: {0}")]
    Fetch(SpoolError),

    #[error("checkout: {0}")]
    Checkout(SpoolError),
}

impl DependencyError {
    pub fn phase(&self) -> &'static str {
        match self {
            DependencyError::Fetch(_) => "fetch",
            DependencyError::Checkout(_) => "checkout",
        }
    }

    pub fn into_inner(self) -> SpoolError {
        match self {
            DependencyError::Fetch(e) | DependencyError::Checkout(e) => e,
        }
    }
}
