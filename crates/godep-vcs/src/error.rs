use camino::Utf8PathBuf;

/// Failure of a backend operation.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {args} failed: {stderr}")]
    Command {
        program: String,
        args: String,
        stderr: String,
    },

    /// Transport or protocol failure while pulling history from a remote.
    #[error("fetch {remote} into {dir}: {stderr}")]
    Network {
        dir: Utf8PathBuf,
        remote: String,
        stderr: String,
    },

    #[error("{dir} is not empty")]
    NotEmpty { dir: Utf8PathBuf },

    #[error("remote {remote} is not linked in {dir}")]
    UnknownRemote { dir: Utf8PathBuf, remote: String },

    #[error("{path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VcsError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        VcsError::Io {
            path: path.into(),
            source,
        }
    }

    /// Re-label a failed fetch command as a transport failure.
    pub(crate) fn into_network(self, dir: &camino::Utf8Path, remote: &str) -> Self {
        match self {
            VcsError::Command { stderr, .. } => VcsError::Network {
                dir: dir.to_owned(),
                remote: remote.to_string(),
                stderr,
            },
            other => other,
        }
    }
}
