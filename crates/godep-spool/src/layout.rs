use camino::{Utf8Path, Utf8PathBuf};
use godep_types::ImportPath;

/// Path arithmetic for one spool root. Performs no I/O.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpoolLayout {
    root: Utf8PathBuf,
}

impl SpoolLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// `<spool>/repo/<repo root>`
    pub fn repo_path(&self, repo_root: &ImportPath) -> Utf8PathBuf {
        self.root.join("repo").join(repo_root.as_str())
    }

    /// `<spool>/rev/<rev[..2]>/<rev[2..]>`, or `None` when `rev` is too
    /// short or cannot name a single directory.
    pub fn revision_workspace(&self, rev: &str) -> Option<Utf8PathBuf> {
        if rev.len() < 3 || rev.contains(['/', '\\']) || rev.starts_with('.') {
            return None;
        }
        let (head, tail) = (rev.get(..2)?, rev.get(2..)?);
        if matches!(tail, "." | "..") {
            return None;
        }
        Some(self.root.join("rev").join(head).join(tail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_cache_follows_the_root() {
        let layout = SpoolLayout::new("/spool");
        assert_eq!(
            layout.repo_path(&ImportPath::new("github.com/kr/s3")),
            Utf8PathBuf::from("/spool/repo/github.com/kr/s3")
        );
    }

    #[test]
    fn revision_workspace_splits_after_two_characters() {
        let layout = SpoolLayout::new("/spool");
        assert_eq!(
            layout.revision_workspace("deadbeef"),
            Some(Utf8PathBuf::from("/spool/rev/de/adbeef"))
        );
        assert_eq!(
            layout.revision_workspace("abc"),
            Some(Utf8PathBuf::from("/spool/rev/ab/c"))
        );
    }

    #[test]
    fn unusable_revisions_have_no_workspace() {
        let layout = SpoolLayout::new("/spool");
        assert_eq!(layout.revision_workspace(""), None);
        assert_eq!(layout.revision_workspace("ab"), None);
        assert_eq!(layout.revision_workspace("ab/cd"), None);
        assert_eq!(layout.revision_workspace("..abc"), None);
        assert_eq!(layout.revision_workspace("ab.."), None);
        // multi-byte character straddling the split point
        assert_eq!(layout.revision_workspace("aé1"), None);
    }
}
