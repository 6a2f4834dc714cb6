use crate::ImportPath;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Failures reading, writing or validating a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("malformed manifest: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("write manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest is not minimal: {inner} is covered by {outer}")]
    NotMinimal {
        outer: ImportPath,
        inner: ImportPath,
    },
}

/// The pinned-dependency set for one program (`Godeps/Godeps.json`).
///
/// Field names are part of the on-disk contract and match the Go tool's manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
    pub import_path: ImportPath,

    /// Opaque toolchain version recorded at capture time; never validated.
    #[serde(default)]
    pub go_version: String,

    #[serde(default)]
    pub deps: Vec<PinnedDependency>,

    /// GOPATH entry holding the program in the ambient workspace, if any.
    #[serde(skip)]
    pub ambient_root: Option<Utf8PathBuf>,
}

/// A specific revision of one package, as recorded in the manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinnedDependency {
    pub import_path: ImportPath,

    /// Human-readable description of the revision, e.g. `v1.2-3-gabcdef0`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// VCS-specific commit identifier.
    pub rev: String,

    /// GOPATH entry holding this package in the ambient workspace, if any.
    #[serde(skip)]
    pub ambient_root: Option<Utf8PathBuf>,
}

impl PinnedDependency {
    pub fn new(import_path: ImportPath, rev: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            import_path,
            comment: comment.into(),
            rev: rev.into(),
            ambient_root: None,
        }
    }
}

impl Manifest {
    pub fn new(import_path: ImportPath, go_version: impl Into<String>) -> Self {
        Self {
            import_path,
            go_version: go_version.into(),
            deps: Vec::new(),
            ambient_root: None,
        }
    }

    /// Parse the persisted JSON form. Unknown fields are ignored.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(ManifestError::Parse)
    }

    /// Tab-indented JSON with a trailing newline, the layout the Go tool writes.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser).map_err(ManifestError::Serialize)?;
        buf.push(b'\n');
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<usize, ManifestError> {
        let text = self.to_json()?;
        w.write_all(text.as_bytes())?;
        Ok(text.len())
    }

    /// Verify the minimality invariant: no dependency is the program itself or
    /// below it, and no two dependencies are nested inside each other.
    pub fn check_minimal(&self) -> Result<(), ManifestError> {
        for (i, d) in self.deps.iter().enumerate() {
            if d.import_path.is_within(&self.import_path) {
                return Err(ManifestError::NotMinimal {
                    outer: self.import_path.clone(),
                    inner: d.import_path.clone(),
                });
            }
            for other in &self.deps[i + 1..] {
                let (outer, inner) = if other.import_path.is_within(&d.import_path) {
                    (d, other)
                } else if d.import_path.is_within(&other.import_path) {
                    (other, d)
                } else {
                    continue;
                };
                return Err(ManifestError::NotMinimal {
                    outer: outer.import_path.clone(),
                    inner: inner.import_path.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut m = Manifest::new(ImportPath::new("example.com/prog"), "go version go1.2 linux/amd64");
        m.deps.push(PinnedDependency::new(
            ImportPath::new("github.com/kr/s3"),
            "c3f1f5e8a1cbf3b1c6e1d1b5d0f2f6b6a8c9d0e1",
            "v1.0-3-gc3f1f5e",
        ));
        m.deps.push(PinnedDependency::new(
            ImportPath::new("github.com/lib/pq"),
            "0123456789abcdef0123456789abcdef01234567",
            "",
        ));
        m
    }

    #[test]
    fn serializes_with_tabs_and_omits_empty_comment() {
        let text = sample().to_json().expect("serialize");
        let expected = "{\n\
\t\"ImportPath\": \"example.com/prog\",\n\
\t\"GoVersion\": \"go version go1.2 linux/amd64\",\n\
\t\"Deps\": [\n\
\t\t{\n\
\t\t\t\"ImportPath\": \"github.com/kr/s3\",\n\
\t\t\t\"Comment\": \"v1.0-3-gc3f1f5e\",\n\
\t\t\t\"Rev\": \"c3f1f5e8a1cbf3b1c6e1d1b5d0f2f6b6a8c9d0e1\"\n\
\t\t},\n\
\t\t{\n\
\t\t\t\"ImportPath\": \"github.com/lib/pq\",\n\
\t\t\t\"Rev\": \"0123456789abcdef0123456789abcdef01234567\"\n\
\t\t}\n\
\t]\n\
}\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn parse_defaults_missing_optional_fields() {
        let m = Manifest::from_json(r#"{"ImportPath":"p","Deps":[{"ImportPath":"lib/a","Rev":"deadbeef"}]}"#)
            .expect("parse");
        assert_eq!(m.go_version, "");
        assert_eq!(m.deps.len(), 1);
        assert_eq!(m.deps[0].comment, "");
        assert_eq!(m.deps[0].ambient_root, None);
    }

    #[test]
    fn parsed_import_paths_are_normalized() {
        let m = Manifest::from_json(
            r#"{"ImportPath": "/example.com/prog/", "Deps": [{"ImportPath": "lib/a/", "Rev": "deadbeef"}]}"#,
        )
        .expect("parse");
        assert_eq!(m.import_path, ImportPath::new("example.com/prog"));
        assert_eq!(m.deps[0].import_path.as_str(), "lib/a");
        assert!(m.to_json().expect("serialize").contains("\"ImportPath\": \"lib/a\""));
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let m = Manifest::from_json(r#"{"ImportPath":"p","Packages":["./..."],"Deps":[]}"#)
            .expect("parse");
        assert!(m.deps.is_empty());
    }

    #[test]
    fn parse_rejects_malformed_structure() {
        let err = Manifest::from_json(r#"{"ImportPath":"p","Deps":{}}"#).expect_err("deps must be a list");
        assert!(matches!(err, ManifestError::Parse(_)));

        let err = Manifest::from_json(r#"{"ImportPath":"p","Deps":[{"ImportPath":"x"}]}"#)
            .expect_err("rev is required");
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn check_minimal_reports_nested_dependencies() {
        let mut m = sample();
        assert!(m.check_minimal().is_ok());

        m.deps.push(PinnedDependency::new(ImportPath::new("github.com/kr/s3/s3util"), "aa11", ""));
        match m.check_minimal() {
            Err(ManifestError::NotMinimal { outer, inner }) => {
                assert_eq!(outer.as_str(), "github.com/kr/s3");
                assert_eq!(inner.as_str(), "github.com/kr/s3/s3util");
            }
            other => panic!("expected NotMinimal, got {other:?}"),
        }
    }

    #[test]
    fn check_minimal_rejects_sub_path_of_program() {
        let mut m = sample();
        m.deps.push(PinnedDependency::new(ImportPath::new("example.com/prog/sub"), "aa11", ""));
        assert!(matches!(m.check_minimal(), Err(ManifestError::NotMinimal { .. })));
    }
}
