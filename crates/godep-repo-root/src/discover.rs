//! `go-import` meta tag discovery.

use std::time::Duration;
use tracing::debug;

/// One `<meta name="go-import" content="prefix vcs repo">` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaImport {
    pub prefix: String,
    pub vcs: String,
    pub repo: String,
}

/// Fetches the discovery page for an import path.
pub trait Discover: Send + Sync {
    /// Return the body served for `https://<import_path>?go-get=1`.
    fn fetch_page(&self, import_path: &str) -> Result<String, String>;
}

/// Discovery over HTTPS with a blocking client.
#[derive(Debug)]
pub struct HttpDiscovery {
    client: reqwest::blocking::Client,
}

impl HttpDiscovery {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("godep/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Discover for HttpDiscovery {
    fn fetch_page(&self, import_path: &str) -> Result<String, String> {
        let url = format!("https://{import_path}?go-get=1");
        debug!(%url, "go-import discovery");
        self.client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| e.to_string())
    }
}

/// Extract every `go-import` meta tag from an HTML document.
///
/// Scanning stops at `<body` or `</head>`; tags after that point are ignored.
pub fn parse_meta_imports(html: &str) -> Vec<MetaImport> {
    let lower = html.to_ascii_lowercase();
    let end = [lower.find("<body"), lower.find("</head")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(lower.len());

    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(off) = lower.get(pos..end).and_then(|s| s.find("<meta")) {
        let start = pos + off + "<meta".len();
        let Some(close) = lower[start..].find('>') else {
            break;
        };
        let tag = &html[start..start + close];
        pos = start + close;

        let attrs = attributes(tag);
        let is_go_import = attrs
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("name") && *v == "go-import");
        if !is_go_import {
            continue;
        }
        let Some((_, content)) = attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case("content")) else {
            continue;
        };
        let fields: Vec<&str> = content.split_whitespace().collect();
        if let [prefix, vcs, repo] = fields.as_slice() {
            out.push(MetaImport {
                prefix: prefix.to_string(),
                vcs: vcs.to_string(),
                repo: repo.to_string(),
            });
        }
    }
    out
}

/// Parse `key="value"` / `key='value'` / `key=value` pairs from a tag body.
fn attributes(tag: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = tag.trim_start();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace() || c == '/')
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();
        if key.is_empty() {
            rest = rest.get(1..).unwrap_or("").trim_start();
            continue;
        }
        let Some(after_eq) = rest.strip_prefix('=') else {
            out.push((key, ""));
            continue;
        };
        let after_eq = after_eq.trim_start();
        let (value, remainder) = match after_eq.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &after_eq[1..];
                match body.find(q) {
                    Some(i) => (&body[..i], &body[i + 1..]),
                    None => (body, ""),
                }
            }
            _ => {
                let i = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                (&after_eq[..i], &after_eq[i..])
            }
        };
        out.push((key, value));
        rest = remainder.trim_start();
    }
    out
}
