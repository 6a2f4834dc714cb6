//! Process plumbing shared by the command-line backends.

use crate::VcsError;
use camino::Utf8Path;
use std::ffi::OsStr;
use std::fs;
use std::process::Command;
use tracing::debug;

/// Run `program args...` and return trimmed stdout.
pub(crate) fn run(program: &str, args: &[&str], cwd: Option<&Utf8Path>) -> Result<String, VcsError> {
    run_env(program, args, cwd, &[])
}

pub(crate) fn run_env(
    program: &str,
    args: &[&str],
    cwd: Option<&Utf8Path>,
    envs: &[(&str, &OsStr)],
) -> Result<String, VcsError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(c) = cwd {
        cmd.current_dir(c);
    }
    for (k, v) in envs {
        cmd.env(k, v);
    }
    debug!(program, args = %args.join(" "), cwd = ?cwd, "vcs command");

    let out = cmd.output().map_err(|source| VcsError::Spawn {
        program: program.to_string(),
        source,
    })?;
    if !out.status.success() {
        return Err(VcsError::Command {
            program: program.to_string(),
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// `create` refuses to initialize inside a directory that already has content.
pub(crate) fn ensure_empty_dir(dir: &Utf8Path) -> Result<(), VcsError> {
    match fs::read_dir(dir) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                return Err(VcsError::NotEmpty {
                    dir: dir.to_owned(),
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| VcsError::io(dir, e))
        }
        Err(e) => Err(VcsError::io(dir, e)),
    }
}

/// Read `key` from an ini-style file, optionally inside `[section]`.
pub(crate) fn conf_get(path: &Utf8Path, section: Option<&str>, key: &str) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let mut current: Option<String> = None;
    for line in text.lines() {
        let t = line.trim();
        if let Some(name) = t.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            current = Some(name.trim().to_string());
            continue;
        }
        if current.as_deref() != section {
            continue;
        }
        if let Some((k, v)) = t.split_once('=')
            && k.trim() == key
        {
            return Some(v.trim().to_string());
        }
    }
    None
}

/// Set `key = value` in an ini-style file, creating the file or section as needed.
pub(crate) fn conf_set(
    path: &Utf8Path,
    section: Option<&str>,
    key: &str,
    value: &str,
) -> Result<(), VcsError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(VcsError::io(path, e)),
    };

    let entry = format!("{key} = {value}");
    let mut out: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_target = section.is_none();
    let mut written = false;

    for line in text.lines() {
        let t = line.trim();
        if let Some(name) = t.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            if in_target && !written {
                out.push(entry.clone());
                written = true;
            }
            current = Some(name.trim().to_string());
            in_target = current.as_deref() == section;
            out.push(line.to_string());
            continue;
        }
        if in_target
            && !written
            && let Some((k, _)) = t.split_once('=')
            && k.trim() == key
        {
            out.push(entry.clone());
            written = true;
            continue;
        }
        out.push(line.to_string());
    }

    if !written {
        if !in_target {
            if let Some(s) = section {
                out.push(format!("[{s}]"));
            }
        }
        out.push(entry);
    }

    let mut body = out.join("\n");
    body.push('\n');
    fs::write(path, body).map_err(|e| VcsError::io(path, e))
}
