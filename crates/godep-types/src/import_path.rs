use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified package path, e.g. `github.com/kr/s3/s3util`.
///
/// Normalization is intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading or trailing `/`
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ImportPath(String);

impl ImportPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let v = s.as_ref().replace('\\', "/");
        Self(v.trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` equals `other` or lives below it (`other` + `/` prefix).
    pub fn is_within(&self, other: &ImportPath) -> bool {
        is_within(self.as_str(), other.as_str())
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl From<ImportPath> for String {
    fn from(p: ImportPath) -> Self {
        p.0
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImportPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImportPath {
    fn from(value: &str) -> Self {
        ImportPath::new(value)
    }
}

impl From<String> for ImportPath {
    fn from(value: String) -> Self {
        ImportPath::new(value)
    }
}

fn is_within(s: &str, prefix: &str) -> bool {
    s == prefix
        || (s.len() > prefix.len()
            && s.starts_with(prefix)
            && s.as_bytes()[prefix.len()] == b'/')
}

/// Reports whether `s` equals, or is a `/`-separated descendant of, any entry in `seen`.
///
/// Entries may carry a trailing `/` directory marker (`"lib/a/"`); the marker
/// is treated as the directory `lib/a`, so it covers `lib/a` and everything below it.
pub fn path_prefix_in(seen: &[String], s: &str) -> bool {
    seen.iter().any(|p| is_within(s, p.trim_end_matches('/')))
}
