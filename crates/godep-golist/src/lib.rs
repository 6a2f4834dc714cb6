//! `go list` adapter for the [`PackageLoader`] port, plus `go version`.

#![forbid(unsafe_code)]

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use godep_types::{ImportPath, LoadError, Package, PackageLoader};
use std::process::{Command, Output};
use tracing::debug;

/// Loads packages with `go list -e -json`.
///
/// `-e` makes the command report per-package problems in each record's
/// `Error` field instead of failing as a whole.
#[derive(Clone, Debug)]
pub struct GoList {
    program: String,
    dir: Option<Utf8PathBuf>,
}

impl Default for GoList {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            dir: None,
        }
    }
}

impl GoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `go` binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run from `dir` instead of the current directory, so relative
    /// patterns like `.` and `./...` resolve there.
    pub fn in_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// The toolchain's version line, e.g. `go version go1.2 linux/amd64`.
    pub fn go_version(&self) -> anyhow::Result<String> {
        let out = self
            .command(&["version"])
            .output()
            .with_context(|| format!("run {} version", self.program))?;
        if !out.status.success() {
            anyhow::bail!(
                "{} version failed: {}",
                self.program,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

impl GoList {
    /// Run `go list -e -json <args>` and decode every record it prints.
    fn list<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Result<Vec<Package>, LoadError> {
        let mut argv = vec!["list", "-e", "-json"];
        argv.extend(args);
        let command = format!("{} list", self.program);
        debug!(program = %self.program, args = argv.len() - 3, dir = ?self.dir, "listing packages");

        let out: Output = self
            .command(&argv)
            .output()
            .map_err(|source| LoadError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !out.status.success() {
            return Err(LoadError::Failed {
                command,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        let mut pkgs = decode_packages(&out.stdout)?;
        for p in pkgs.iter_mut().filter(|p| p.root.as_str().is_empty()) {
            if let Some(gopath) = gopath_of(&p.dir) {
                p.root = gopath.to_owned();
            }
        }
        Ok(pkgs)
    }
}

impl PackageLoader for GoList {
    fn load(&self, import_paths: &[ImportPath]) -> Result<Vec<Package>, LoadError> {
        if import_paths.is_empty() {
            return Ok(Vec::new());
        }
        let pkgs = self.list(import_paths.iter().map(ImportPath::as_str))?;
        if pkgs.len() != import_paths.len() {
            return Err(LoadError::Mismatch {
                want: import_paths.len(),
                got: pkgs.len(),
            });
        }
        Ok(pkgs)
    }

    /// `./...` and friends expand to any number of records, so no count check.
    fn expand(&self, patterns: &[String]) -> Result<Vec<Package>, LoadError> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }
        self.list(patterns.iter().map(String::as_str))
    }
}

/// Decode the concatenated JSON objects `go list -json` prints.
pub fn decode_packages(bytes: &[u8]) -> Result<Vec<Package>, LoadError> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Package>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoadError::Decode)
}

/// GOPATH entry holding `dir`, judged by a `src` path element.
///
/// Used when a record lacks `Root` (older toolchains).
pub fn gopath_of(dir: &Utf8Path) -> Option<&Utf8Path> {
    dir.ancestors()
        .find(|a| a.file_name() == Some("src"))
        .and_then(Utf8Path::parent)
}
