use camino::Utf8PathBuf;
use godep_types::{ImportPath, LoadError, Package, PackageError, PackageLoader};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Package loader backed by a fixed table.
///
/// Unknown import paths come back with a `cannot find package` error, the
/// way `go list -e` reports packages missing from the workspace.
#[derive(Default)]
pub struct StaticLoader {
    packages: BTreeMap<ImportPath, Package>,
    failure: Option<String>,
    requests: Mutex<Vec<Vec<ImportPath>>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, pkg: Package) -> Self {
        self.packages.insert(pkg.import_path.clone(), pkg);
        self
    }

    /// Every call fails as a whole with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            failure: Some(stderr.to_string()),
            ..Self::default()
        }
    }

    /// Import path lists received so far, one entry per `load` call.
    pub fn requests(&self) -> Vec<Vec<ImportPath>> {
        self.requests.lock().expect("lock").clone()
    }
}

impl StaticLoader {
    fn record(&self, import_paths: Vec<ImportPath>) -> Result<(), LoadError> {
        self.requests.lock().expect("lock").push(import_paths);
        match &self.failure {
            Some(stderr) => Err(LoadError::Failed {
                command: "static loader".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }

    fn lookup(&self, p: &ImportPath) -> Package {
        self.packages.get(p).cloned().unwrap_or_else(|| Package {
            import_path: p.clone(),
            error: Some(PackageError {
                err: format!("cannot find package \"{p}\""),
            }),
            ..Package::default()
        })
    }
}

impl PackageLoader for StaticLoader {
    fn load(&self, import_paths: &[ImportPath]) -> Result<Vec<Package>, LoadError> {
        self.record(import_paths.to_vec())?;
        Ok(import_paths.iter().map(|p| self.lookup(p)).collect())
    }

    /// `prefix/...` matches every known package at or below `prefix`, in
    /// sorted order; any other pattern is a single import path.
    fn expand(&self, patterns: &[String]) -> Result<Vec<Package>, LoadError> {
        self.record(patterns.iter().map(ImportPath::new).collect())?;
        let mut out = Vec::new();
        for pattern in patterns {
            match pattern.strip_suffix("/...") {
                Some(prefix) => {
                    let prefix = ImportPath::new(prefix);
                    out.extend(
                        self.packages
                            .values()
                            .filter(|p| p.import_path.is_within(&prefix))
                            .cloned(),
                    );
                }
                None => out.push(self.lookup(&ImportPath::new(pattern))),
            }
        }
        Ok(out)
    }
}

/// A non-standard package living under `<root>/src/<import path>`.
pub fn package(root: &camino::Utf8Path, import_path: &str, deps: &[&str]) -> Package {
    Package {
        import_path: ImportPath::new(import_path),
        dir: root.join("src").join(import_path),
        root: root.to_owned(),
        standard: false,
        deps: deps.iter().map(ImportPath::new).collect(),
        error: None,
    }
}

pub fn standard_package(import_path: &str) -> Package {
    Package {
        import_path: ImportPath::new(import_path),
        dir: Utf8PathBuf::from("/goroot/src").join(import_path),
        root: Utf8PathBuf::from("/goroot"),
        standard: true,
        ..Package::default()
    }
}
