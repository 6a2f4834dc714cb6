use crate::copy_tree;
use camino::{Utf8Path, Utf8PathBuf};
use godep_vcs::{Vcs, VcsError};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metadata directory used by every fake repository.
const META: &str = ".fake";

/// Call counters shared by all clones of one [`FakeVcs`].
#[derive(Debug, Default)]
pub struct FakeStats {
    pub creates: AtomicUsize,
    pub fetches: AtomicUsize,
    pub checkouts: AtomicUsize,
}

/// Filesystem-backed VCS.
///
/// An upstream is a directory of revision snapshots (`<url>/<rev>/...`).
/// A repository cache keeps its remotes in `.fake/remotes/<name>` and fetched
/// snapshots in `.fake/objects/<rev>`. A working tree records its revision in
/// `.fake/HEAD`; a `.fake/DIRTY` file marks uncommitted changes.
#[derive(Clone, Debug, Default)]
pub struct FakeVcs {
    stats: Arc<FakeStats>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &FakeStats {
        &self.stats
    }

    pub fn fetches(&self) -> usize {
        self.stats.fetches.load(Ordering::SeqCst)
    }

    pub fn checkouts(&self) -> usize {
        self.stats.checkouts.load(Ordering::SeqCst)
    }

    fn fail(args: &str, stderr: &str) -> VcsError {
        VcsError::Command {
            program: "fake".to_string(),
            args: args.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

/// Nearest `.fake` directory at or above `dir`.
fn find_meta(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    dir.ancestors()
        .map(|d| d.join(META))
        .find(|m| m.join("HEAD").is_file())
}

impl Vcs for FakeVcs {
    fn name(&self) -> &str {
        "fake"
    }

    fn identify(&self, dir: &Utf8Path) -> Result<String, VcsError> {
        let meta = find_meta(dir).ok_or_else(|| Self::fail("identify", "not a repository"))?;
        fs::read_to_string(meta.join("HEAD"))
            .map(|s| s.trim().to_string())
            .map_err(|e| Self::fail("identify", &e.to_string()))
    }

    fn is_dirty(&self, dir: &Utf8Path) -> bool {
        match find_meta(dir) {
            Some(meta) => meta.join("DIRTY").exists(),
            None => true,
        }
    }

    fn describe(&self, dir: &Utf8Path, _rev: &str) -> String {
        find_meta(dir)
            .and_then(|m| fs::read_to_string(m.join("DESCRIBE")).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn create(&self, dir: &Utf8Path) -> Result<(), VcsError> {
        self.stats.creates.fetch_add(1, Ordering::SeqCst);
        if dir.join(META).exists() {
            return Err(VcsError::NotEmpty { dir: dir.to_owned() });
        }
        let remotes = dir.join(META).join("remotes");
        fs::create_dir_all(&remotes).map_err(|e| VcsError::Io { path: remotes.clone(), source: e })?;
        let objects = dir.join(META).join("objects");
        fs::create_dir_all(&objects).map_err(|e| VcsError::Io { path: objects, source: e })
    }

    fn link(&self, dir: &Utf8Path, remote: &str, url: &str) -> Result<(), VcsError> {
        let path = dir.join(META).join("remotes").join(remote);
        fs::write(&path, url).map_err(|e| VcsError::Io { path, source: e })
    }

    fn fetch(&self, dir: &Utf8Path, remote: &str) -> Result<(), VcsError> {
        self.stats.fetches.fetch_add(1, Ordering::SeqCst);
        let url = fs::read_to_string(dir.join(META).join("remotes").join(remote)).map_err(|_| {
            VcsError::UnknownRemote {
                dir: dir.to_owned(),
                remote: remote.to_string(),
            }
        })?;
        let upstream = Utf8PathBuf::from(url.trim());
        if !upstream.is_dir() {
            return Err(VcsError::Network {
                dir: dir.to_owned(),
                remote: remote.to_string(),
                stderr: format!("{upstream}: repository not found"),
            });
        }
        let objects = dir.join(META).join("objects");
        copy_tree(&upstream, &objects).map_err(|e| VcsError::Io { path: objects, source: e })
    }

    fn exists(&self, dir: &Utf8Path, rev: &str) -> bool {
        dir.join(META).join("objects").join(rev).is_dir()
    }

    fn checkout(&self, workdir: &Utf8Path, rev: &str, source_dir: &Utf8Path) -> Result<(), VcsError> {
        self.stats.checkouts.fetch_add(1, Ordering::SeqCst);
        let snapshot = source_dir.join(META).join("objects").join(rev);
        if !snapshot.is_dir() {
            return Err(Self::fail("checkout", &format!("unknown revision {rev}")));
        }
        copy_tree(&snapshot, workdir).map_err(|e| VcsError::Io {
            path: workdir.to_owned(),
            source: e,
        })
    }
}

/// An upstream repository for [`FakeVcs`]: one directory per revision.
#[derive(Clone, Debug)]
pub struct FakeUpstream {
    dir: Utf8PathBuf,
}

impl FakeUpstream {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).expect("create upstream");
        Self { dir }
    }

    /// Record a revision whose tree holds `files` (relative path, contents).
    pub fn commit(&self, rev: &str, files: &[(&str, &str)]) -> &Self {
        let tree = self.dir.join(rev);
        fs::create_dir_all(&tree).expect("create revision");
        for (rel, contents) in files {
            crate::write_file(&tree, rel, contents);
        }
        self
    }

    pub fn url(&self) -> &str {
        self.dir.as_str()
    }
}

/// A checked-out working tree for capture tests.
#[derive(Clone, Debug)]
pub struct FakeWorkingTree {
    dir: Utf8PathBuf,
}

impl FakeWorkingTree {
    pub fn init(dir: impl Into<Utf8PathBuf>, rev: &str) -> Self {
        let dir = dir.into();
        crate::write_file(&dir, ".fake/HEAD", rev);
        Self { dir }
    }

    pub fn describe_as(self, label: &str) -> Self {
        crate::write_file(&self.dir, ".fake/DESCRIBE", label);
        self
    }

    pub fn make_dirty(self) -> Self {
        crate::write_file(&self.dir, ".fake/DIRTY", "");
        self
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utf8_root;
    use tempfile::TempDir;

    #[test]
    fn fetch_then_checkout_copies_the_snapshot() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        let up = FakeUpstream::new(root.join("up"));
        up.commit("deadbeef", &[("a.go", "package a\n"), ("util/u.go", "package util\n")]);

        let vcs = FakeVcs::new();
        let cache = root.join("cache");
        vcs.create(&cache).expect("create");
        vcs.link(&cache, "main", up.url()).expect("link");
        assert!(!vcs.exists(&cache, "deadbeef"));
        vcs.fetch(&cache, "main").expect("fetch");
        assert!(vcs.exists(&cache, "deadbeef"));

        let work = root.join("work");
        vcs.checkout(&work, "deadbeef", &cache).expect("checkout");
        assert!(work.join("util/u.go").is_file());
        assert_eq!(vcs.fetches(), 1);
        assert_eq!(vcs.checkouts(), 1);
    }

    #[test]
    fn working_tree_markers_drive_identify_and_dirty() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        let tree = FakeWorkingTree::init(root.join("src/lib/a"), "abc123").describe_as("v1");
        let vcs = FakeVcs::new();
        assert_eq!(vcs.identify(&tree.dir().join("util")).expect("identify"), "abc123");
        assert_eq!(vcs.describe(tree.dir(), "abc123"), "v1");
        assert!(!vcs.is_dirty(tree.dir()));
        let tree = tree.make_dirty();
        assert!(vcs.is_dirty(tree.dir()));
        assert!(vcs.identify(&root).is_err());
    }
}
