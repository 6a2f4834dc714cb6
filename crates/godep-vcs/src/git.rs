use crate::run::{ensure_empty_dir, run, run_env};
use crate::{Vcs, VcsError};
use camino::Utf8Path;

/// git backend. The repository cache is a bare repository.
#[derive(Clone, Copy, Debug, Default)]
pub struct Git;

impl Vcs for Git {
    fn name(&self) -> &str {
        "git"
    }

    fn identify(&self, dir: &Utf8Path) -> Result<String, VcsError> {
        run("git", &["rev-parse", "HEAD"], Some(dir))
    }

    fn is_dirty(&self, dir: &Utf8Path) -> bool {
        match run("git", &["status", "--porcelain", "--untracked-files=no"], Some(dir)) {
            Ok(out) => !out.is_empty(),
            Err(_) => true,
        }
    }

    fn describe(&self, dir: &Utf8Path, rev: &str) -> String {
        run("git", &["describe", "--tags", rev], Some(dir)).unwrap_or_default()
    }

    fn create(&self, dir: &Utf8Path) -> Result<(), VcsError> {
        ensure_empty_dir(dir)?;
        run("git", &["init", "--bare", "--quiet", dir.as_str()], None)?;
        Ok(())
    }

    fn link(&self, dir: &Utf8Path, remote: &str, url: &str) -> Result<(), VcsError> {
        let git_dir = dir.as_str();
        match run("git", &["--git-dir", git_dir, "remote", "get-url", remote], None) {
            Ok(current) if current == url => Ok(()),
            Ok(_) => {
                run("git", &["--git-dir", git_dir, "remote", "set-url", remote, url], None)?;
                Ok(())
            }
            Err(_) => {
                run("git", &["--git-dir", git_dir, "remote", "add", remote, url], None)?;
                Ok(())
            }
        }
    }

    fn fetch(&self, dir: &Utf8Path, remote: &str) -> Result<(), VcsError> {
        run(
            "git",
            &["--git-dir", dir.as_str(), "fetch", "--quiet", "--tags", remote],
            None,
        )
        .map_err(|e| e.into_network(dir, remote))?;
        Ok(())
    }

    fn exists(&self, dir: &Utf8Path, rev: &str) -> bool {
        let object = format!("{rev}^{{commit}}");
        run("git", &["--git-dir", dir.as_str(), "cat-file", "-e", &object], None).is_ok()
    }

    fn checkout(&self, workdir: &Utf8Path, rev: &str, source_dir: &Utf8Path) -> Result<(), VcsError> {
        // A private index keeps concurrent checkouts from one bare repository
        // off its shared index and HEAD.
        let scratch = tempfile::Builder::new()
            .prefix("godep-index")
            .tempdir()
            .map_err(|e| VcsError::io(workdir, e))?;
        let index = scratch.path().join("index");
        let envs = [("GIT_INDEX_FILE", index.as_os_str())];
        let base = ["--git-dir", source_dir.as_str(), "--work-tree", workdir.as_str()];

        let mut read_tree = base.to_vec();
        read_tree.extend(["read-tree", rev]);
        run_env("git", &read_tree, Some(workdir), &envs)?;

        let mut checkout_index = base.to_vec();
        checkout_index.extend(["checkout-index", "--all", "--force"]);
        run_env("git", &checkout_index, Some(workdir), &envs)?;
        Ok(())
    }
}
