use crate::{Bazaar, Git, Mercurial, Vcs};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported version-control systems, named by their command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VcsKind {
    Git,
    Mercurial,
    Bazaar,
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported version control system: {0}")]
pub struct UnknownVcs(pub String);

impl VcsKind {
    pub fn cmd(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Mercurial => "hg",
            VcsKind::Bazaar => "bzr",
        }
    }

    pub fn backend(self) -> Arc<dyn Vcs> {
        match self {
            VcsKind::Git => Arc::new(Git),
            VcsKind::Mercurial => Arc::new(Mercurial),
            VcsKind::Bazaar => Arc::new(Bazaar),
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmd())
    }
}

impl FromStr for VcsKind {
    type Err = UnknownVcs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(VcsKind::Git),
            "hg" => Ok(VcsKind::Mercurial),
            "bzr" => Ok(VcsKind::Bazaar),
            other => Err(UnknownVcs(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_import_tokens() {
        assert_eq!("git".parse::<VcsKind>().expect("git"), VcsKind::Git);
        assert_eq!("hg".parse::<VcsKind>().expect("hg"), VcsKind::Mercurial);
        assert_eq!("bzr".parse::<VcsKind>().expect("bzr"), VcsKind::Bazaar);
        assert!("svn".parse::<VcsKind>().is_err());
    }

    #[test]
    fn backend_matches_kind() {
        for kind in [VcsKind::Git, VcsKind::Mercurial, VcsKind::Bazaar] {
            assert_eq!(kind.backend().name(), kind.cmd());
        }
    }
}
