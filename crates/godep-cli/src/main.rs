#![forbid(unsafe_code)]

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use godep_app::{
    RestoreInput, RestoreOutcome, SaveInput, join_gopath, run_path, run_restore, run_save,
    write_manifest,
};
use godep_golist::GoList;
use godep_repo_root::HostResolver;
use godep_settings::{Environment, GodepConfigV1, Overrides, ResolvedConfig};
use godep_spool::SpoolLayout;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_MANIFEST: &str = "Godeps/Godeps.json";

#[derive(Parser, Debug)]
#[command(
    name = "godep",
    version,
    about = "Pin and restore the exact revisions of a Go program's dependencies"
)]
struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "godep.toml", global = true)]
    config: Utf8PathBuf,

    /// Spool directory holding repository caches and revision workspaces.
    #[arg(long, global = true)]
    spool: Option<Utf8PathBuf>,

    /// Number of dependencies processed in parallel.
    #[arg(long, global = true)]
    jobs: Option<usize>,

    /// Log every VCS command.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record the revision of every dependency of a program.
    Save {
        /// Where to write the manifest.
        #[arg(short = 'o', long, default_value = DEFAULT_MANIFEST)]
        output: Utf8PathBuf,

        /// Package patterns to capture, e.g. `./...`; the first match is the program.
        #[arg(default_value = ".")]
        packages: Vec<String>,
    },

    /// Check out every pinned revision into the spool.
    Restore {
        #[arg(short = 'f', long, default_value = DEFAULT_MANIFEST)]
        file: Utf8PathBuf,

        /// Never probe hosts for go-import meta tags.
        #[arg(long)]
        offline: bool,
    },

    /// Print the GOPATH entries holding the pinned sources.
    Path {
        #[arg(short = 'f', long, default_value = DEFAULT_MANIFEST)]
        file: Utf8PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("godep: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let offline = matches!(cli.cmd, Commands::Restore { offline: true, .. });
    let settings = load_settings(&cli, offline)?;
    debug!(spool = %settings.spool, jobs = settings.jobs, "settings resolved");

    match cli.cmd {
        Commands::Save { output, packages } => cmd_save(&settings, &output, &packages),
        Commands::Restore { file, .. } => cmd_restore(&settings, &file),
        Commands::Path { file } => cmd_path(&settings, &file),
    }
}

/// Read the config file if present; a missing file means defaults.
fn load_settings(cli: &Cli, offline: bool) -> anyhow::Result<ResolvedConfig> {
    let cfg = if cli.config.is_file() {
        let text = std::fs::read_to_string(&cli.config)
            .with_context(|| format!("read config: {}", cli.config))?;
        godep_settings::parse_config_toml(&text)
            .with_context(|| format!("parse config: {}", cli.config))?
    } else {
        GodepConfigV1::default()
    };
    let overrides = Overrides {
        spool: cli.spool.clone(),
        jobs: cli.jobs,
        discovery: offline.then_some(false),
    };
    godep_settings::resolve_config(cfg, overrides, &Environment::detect()).context("resolve config")
}

fn resolver(settings: &ResolvedConfig) -> HostResolver {
    if settings.discovery {
        HostResolver::new()
    } else {
        HostResolver::offline()
    }
}

fn cmd_save(settings: &ResolvedConfig, output: &Utf8Path, packages: &[String]) -> anyhow::Result<()> {
    let golist = GoList::new();
    let go_version = golist.go_version()?;
    let manifest = run_save(SaveInput {
        packages,
        go_version,
        loader: &golist,
        resolver: &resolver(settings),
        jobs: settings.jobs,
    })?;
    write_manifest(output, &manifest)?;
    info!(path = %output, deps = manifest.deps.len(), "wrote manifest");
    Ok(())
}

fn cmd_restore(settings: &ResolvedConfig, file: &Utf8Path) -> anyhow::Result<()> {
    let text = read_manifest(file)?;
    let layout = SpoolLayout::new(settings.spool.clone());
    let report = run_restore(RestoreInput {
        manifest_text: &text,
        loader: &GoList::new(),
        resolver: &resolver(settings),
        layout: &layout,
        fast_remote: &settings.fast_remote,
        main_remote: &settings.main_remote,
        jobs: settings.jobs,
    })?;
    info!(
        restored = report.count(RestoreOutcome::Restored),
        skipped = report.count(RestoreOutcome::Skipped),
        spool = %layout.root(),
        "restore complete"
    );
    Ok(())
}

fn cmd_path(settings: &ResolvedConfig, file: &Utf8Path) -> anyhow::Result<()> {
    let text = read_manifest(file)?;
    let out = run_path(&text, &SpoolLayout::new(settings.spool.clone()))?;
    println!("{}", join_gopath(&out.entries)?);
    Ok(())
}

fn read_manifest(file: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("read manifest: {file}"))
}
