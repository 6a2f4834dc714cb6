//! Static recognition rules for well-known hosts and VCS-suffixed paths.

use crate::{RepoRoot, ResolveError};
use godep_types::ImportPath;
use godep_vcs::VcsKind;

/// Try the static rules. `None` means no rule claims the path.
pub(crate) fn match_static(import_path: &ImportPath) -> Option<Result<RepoRoot, ResolveError>> {
    let segs: Vec<&str> = import_path.segments().collect();
    let host = *segs.first()?;

    let rule = match host {
        "github.com" | "bitbucket.org" => Some(fixed(import_path, &segs, 3, VcsKind::Git)),
        "hub.jazz.net" => {
            if segs.get(1) != Some(&"git") {
                return Some(Err(invalid(import_path, "expected hub.jazz.net/git/<user>/<repo>")));
            }
            Some(fixed(import_path, &segs, 4, VcsKind::Git))
        }
        "launchpad.net" => {
            let n = if segs.get(1).is_some_and(|s| s.starts_with('~')) { 4 } else { 2 };
            Some(fixed(import_path, &segs, n, VcsKind::Bazaar))
        }
        "golang.org" if segs.get(1) == Some(&"x") => Some(golang_x(import_path, &segs)),
        _ => None,
    };
    rule.or_else(|| match_vcs_suffix(&segs))
}

fn fixed(import_path: &ImportPath, segs: &[&str], n: usize, vcs: VcsKind) -> Result<RepoRoot, ResolveError> {
    if segs.len() < n {
        return Err(invalid(
            import_path,
            &format!("expected at least {n} path elements for {}", segs[0]),
        ));
    }
    let root = segs[..n].join("/");
    Ok(RepoRoot {
        repo: format!("https://{root}"),
        root: ImportPath::new(root),
        vcs,
    })
}

fn golang_x(import_path: &ImportPath, segs: &[&str]) -> Result<RepoRoot, ResolveError> {
    let Some(name) = segs.get(2) else {
        return Err(invalid(import_path, "expected golang.org/x/<repo>"));
    };
    Ok(RepoRoot {
        root: ImportPath::new(segs[..3].join("/")),
        repo: format!("https://go.googlesource.com/{name}"),
        vcs: VcsKind::Git,
    })
}

/// `example.com/path/repo.git/pkg`: the element carrying a VCS suffix ends the root.
fn match_vcs_suffix(segs: &[&str]) -> Option<Result<RepoRoot, ResolveError>> {
    if !segs.first()?.contains('.') {
        return None;
    }
    for (i, seg) in segs.iter().enumerate().skip(1) {
        let vcs = if seg.ends_with(".git") {
            VcsKind::Git
        } else if seg.ends_with(".hg") {
            VcsKind::Mercurial
        } else if seg.ends_with(".bzr") {
            VcsKind::Bazaar
        } else {
            continue;
        };
        let root = segs[..=i].join("/");
        return Some(Ok(RepoRoot {
            repo: format!("https://{root}"),
            root: ImportPath::new(root),
            vcs,
        }));
    }
    None
}

fn invalid(import_path: &ImportPath, reason: &str) -> ResolveError {
    ResolveError::Invalid {
        import_path: import_path.clone(),
        reason: reason.to_string(),
    }
}
