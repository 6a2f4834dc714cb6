use crate::model::GodepConfigV1;
use anyhow::Context;
use camino::Utf8PathBuf;

pub const DEFAULT_FAST_REMOTE: &str = "fast";
pub const DEFAULT_MAIN_REMOTE: &str = "main";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub spool: Option<Utf8PathBuf>,
    pub jobs: Option<usize>,
    pub discovery: Option<bool>,
}

/// Process-level inputs to resolution.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    /// `$GODEP_SPOOL`, if set and non-empty.
    pub spool: Option<String>,
    /// The user's cache directory.
    pub cache_dir: Option<Utf8PathBuf>,
    pub parallelism: usize,
}

impl Environment {
    pub fn detect() -> Self {
        Self {
            spool: std::env::var("GODEP_SPOOL").ok().filter(|s| !s.is_empty()),
            cache_dir: dirs::cache_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok()),
            parallelism: std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub spool: Utf8PathBuf,
    pub jobs: usize,
    pub fast_remote: String,
    pub main_remote: String,
    pub discovery: bool,
}

pub fn resolve_config(
    cfg: GodepConfigV1,
    overrides: Overrides,
    env: &Environment,
) -> anyhow::Result<ResolvedConfig> {
    let spool = match overrides.spool {
        Some(p) => p,
        None => cfg
            .spool
            .clone()
            .or_else(|| env.spool.clone())
            .map(Utf8PathBuf::from)
            .or_else(|| env.cache_dir.as_ref().map(|d| d.join("godep")))
            .context("cannot determine a spool directory; set GODEP_SPOOL or `spool` in godep.toml")?,
    };
    if spool.as_str().is_empty() {
        anyhow::bail!("spool directory must not be empty");
    }

    let jobs = overrides.jobs.or(cfg.jobs).unwrap_or(env.parallelism.max(1));
    if jobs == 0 {
        anyhow::bail!("jobs must be at least 1");
    }

    let fast_remote = cfg
        .fast_remote
        .unwrap_or_else(|| DEFAULT_FAST_REMOTE.to_string());
    let main_remote = cfg
        .main_remote
        .unwrap_or_else(|| DEFAULT_MAIN_REMOTE.to_string());
    validate_remote("fast_remote", &fast_remote)?;
    validate_remote("main_remote", &main_remote)?;
    if fast_remote == main_remote {
        anyhow::bail!("fast_remote and main_remote must differ (both are {fast_remote:?})");
    }

    Ok(ResolvedConfig {
        spool,
        jobs,
        fast_remote,
        main_remote,
        discovery: overrides.discovery.or(cfg.discovery).unwrap_or(true),
    })
}

fn validate_remote(key: &str, name: &str) -> anyhow::Result<()> {
    let ok = !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !ok {
        anyhow::bail!("invalid {key}: {name:?} (expected letters, digits, '_', '-', '.')");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    fn env() -> Environment {
        Environment {
            spool: None,
            cache_dir: Some(Utf8PathBuf::from("/home/me/.cache")),
            parallelism: 8,
        }
    }

    #[test]
    fn defaults_use_the_cache_dir() {
        let cfg = resolve_config(GodepConfigV1::default(), Overrides::default(), &env()).expect("resolve");
        assert_eq!(cfg.spool, Utf8PathBuf::from("/home/me/.cache/godep"));
        assert_eq!(cfg.jobs, 8);
        assert_eq!(cfg.fast_remote, "fast");
        assert_eq!(cfg.main_remote, "main");
        assert!(cfg.discovery);
    }

    #[test]
    fn precedence_is_overrides_then_file_then_environment() {
        let mut e = env();
        e.spool = Some("/env/spool".to_string());

        let cfg = resolve_config(GodepConfigV1::default(), Overrides::default(), &e).expect("env");
        assert_eq!(cfg.spool, Utf8PathBuf::from("/env/spool"));

        let file = parse_config_toml("spool = \"/file/spool\"\njobs = 2\n").expect("parse");
        let cfg = resolve_config(file.clone(), Overrides::default(), &e).expect("file");
        assert_eq!(cfg.spool, Utf8PathBuf::from("/file/spool"));
        assert_eq!(cfg.jobs, 2);

        let o = Overrides {
            spool: Some(Utf8PathBuf::from("/flag/spool")),
            jobs: Some(5),
            discovery: Some(false),
        };
        let cfg = resolve_config(file, o, &e).expect("flags");
        assert_eq!(cfg.spool, Utf8PathBuf::from("/flag/spool"));
        assert_eq!(cfg.jobs, 5);
        assert!(!cfg.discovery);
    }

    #[test]
    fn rejects_bad_values() {
        let zero = parse_config_toml("jobs = 0").expect("parse");
        assert!(resolve_config(zero, Overrides::default(), &env()).is_err());

        let same = parse_config_toml("fast_remote = \"origin\"\nmain_remote = \"origin\"").expect("parse");
        assert!(resolve_config(same, Overrides::default(), &env()).is_err());

        let odd = parse_config_toml("main_remote = \"--upload-pack\"").expect("parse");
        assert!(resolve_config(odd, Overrides::default(), &env()).is_err());

        let nowhere = Environment::default();
        assert!(resolve_config(GodepConfigV1::default(), Overrides::default(), &nowhere).is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse_config_toml("future = 1\ndiscovery = false").expect("parse");
        assert_eq!(cfg.discovery, Some(false));
    }
}
