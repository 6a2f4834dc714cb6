use crate::run::{conf_get, conf_set, ensure_empty_dir, run};
use crate::{Vcs, VcsError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Bazaar backend.
///
/// Bazaar has no named remotes, so `link` stores `godep_<remote>_location`
/// in the branch configuration and `fetch` pulls from that location.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bazaar;

fn branch_conf(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(".bzr").join("branch").join("branch.conf")
}

fn location_key(remote: &str) -> String {
    format!("godep_{remote}_location")
}

impl Vcs for Bazaar {
    fn name(&self) -> &str {
        "bzr"
    }

    fn identify(&self, dir: &Utf8Path) -> Result<String, VcsError> {
        run(
            "bzr",
            &["version-info", "--custom", "--template={revision_id}"],
            Some(dir),
        )
    }

    fn is_dirty(&self, dir: &Utf8Path) -> bool {
        match run("bzr", &["status"], Some(dir)) {
            Ok(out) => !out.is_empty(),
            Err(_) => true,
        }
    }

    fn describe(&self, _dir: &Utf8Path, _rev: &str) -> String {
        String::new()
    }

    fn create(&self, dir: &Utf8Path) -> Result<(), VcsError> {
        ensure_empty_dir(dir)?;
        run("bzr", &["init", "--quiet", dir.as_str()], None)?;
        Ok(())
    }

    fn link(&self, dir: &Utf8Path, remote: &str, url: &str) -> Result<(), VcsError> {
        let conf = branch_conf(dir);
        let key = location_key(remote);
        if conf_get(&conf, None, &key).as_deref() == Some(url) {
            return Ok(());
        }
        conf_set(&conf, None, &key, url)
    }

    fn fetch(&self, dir: &Utf8Path, remote: &str) -> Result<(), VcsError> {
        let url = conf_get(&branch_conf(dir), None, &location_key(remote)).ok_or_else(|| {
            VcsError::UnknownRemote {
                dir: dir.to_owned(),
                remote: remote.to_string(),
            }
        })?;
        run(
            "bzr",
            &["pull", "--quiet", "--overwrite", "-d", dir.as_str(), &url],
            None,
        )
        .map_err(|e| e.into_network(dir, remote))?;
        Ok(())
    }

    fn exists(&self, dir: &Utf8Path, rev: &str) -> bool {
        let spec = format!("revid:{rev}");
        run("bzr", &["revision-info", "-d", dir.as_str(), "-r", &spec], None).is_ok()
    }

    fn checkout(&self, workdir: &Utf8Path, rev: &str, source_dir: &Utf8Path) -> Result<(), VcsError> {
        // `bzr export` insists on creating the destination itself.
        if workdir.is_dir() {
            fs::remove_dir(workdir).map_err(|e| VcsError::io(workdir, e))?;
        }
        let spec = format!("revid:{rev}");
        run(
            "bzr",
            &["export", "-d", source_dir.as_str(), "-r", &spec, workdir.as_str()],
            None,
        )?;
        Ok(())
    }
}
