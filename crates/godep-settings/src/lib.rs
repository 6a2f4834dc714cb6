//! Config parsing and resolution.
//!
//! Parsing and resolution are IO-free: they work on strings and on an
//! explicit [`Environment`] snapshot, which the binary captures once with
//! [`Environment::detect`].

#![forbid(unsafe_code)]

mod model;
mod resolve;

pub use model::GodepConfigV1;
pub use resolve::{Environment, Overrides, ResolvedConfig};

/// Parse `godep.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<GodepConfigV1> {
    let cfg: GodepConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective settings (overrides, then file, then environment, then defaults).
pub fn resolve_config(
    cfg: GodepConfigV1,
    overrides: Overrides,
    env: &Environment,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides, env)
}
