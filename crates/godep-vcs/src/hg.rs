use crate::run::{conf_get, conf_set, ensure_empty_dir, run};
use crate::{Vcs, VcsError};
use camino::Utf8Path;

/// Mercurial backend. Remotes are `[paths]` entries in `.hg/hgrc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mercurial;

impl Vcs for Mercurial {
    fn name(&self) -> &str {
        "hg"
    }

    fn identify(&self, dir: &Utf8Path) -> Result<String, VcsError> {
        let id = run("hg", &["identify", "--id", "--debug"], Some(dir))?;
        // A trailing `+` marks local modifications; is_dirty reports those.
        Ok(id.trim_end_matches('+').to_string())
    }

    fn is_dirty(&self, dir: &Utf8Path) -> bool {
        match run(
            "hg",
            &["status", "--modified", "--added", "--removed", "--deleted"],
            Some(dir),
        ) {
            Ok(out) => !out.is_empty(),
            Err(_) => true,
        }
    }

    fn describe(&self, dir: &Utf8Path, rev: &str) -> String {
        run(
            "hg",
            &["log", "-r", rev, "--template", "{latesttag}-{latesttagdistance}"],
            Some(dir),
        )
        .unwrap_or_default()
    }

    fn create(&self, dir: &Utf8Path) -> Result<(), VcsError> {
        ensure_empty_dir(dir)?;
        run("hg", &["init", dir.as_str()], None)?;
        Ok(())
    }

    fn link(&self, dir: &Utf8Path, remote: &str, url: &str) -> Result<(), VcsError> {
        let hgrc = dir.join(".hg").join("hgrc");
        if conf_get(&hgrc, Some("paths"), remote).as_deref() == Some(url) {
            return Ok(());
        }
        conf_set(&hgrc, Some("paths"), remote, url)
    }

    fn fetch(&self, dir: &Utf8Path, remote: &str) -> Result<(), VcsError> {
        run("hg", &["pull", "--quiet", "-R", dir.as_str(), remote], None)
            .map_err(|e| e.into_network(dir, remote))?;
        Ok(())
    }

    fn exists(&self, dir: &Utf8Path, rev: &str) -> bool {
        run(
            "hg",
            &["log", "-R", dir.as_str(), "-r", rev, "--template", "{node}"],
            None,
        )
        .is_ok()
    }

    fn checkout(&self, workdir: &Utf8Path, rev: &str, source_dir: &Utf8Path) -> Result<(), VcsError> {
        run(
            "hg",
            &["clone", "--quiet", "-u", rev, source_dir.as_str(), workdir.as_str()],
            None,
        )?;
        Ok(())
    }
}
