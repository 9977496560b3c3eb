//! Command-line interface for the CI manifest tools.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::registry::{
    DependencyFilter, RegistrySwitcher, DEFAULT_PACKAGE, DEFAULT_PREFIX, DEFAULT_REGISTRY,
};
use crate::report::{ManifestUpdate, RunSummary};
use crate::version::VersionUpdater;

#[derive(Parser, Debug)]
#[command(name = "stellation-ci", version, about = "Rewrite workspace manifests for CI releases")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Workspace root containing `crates/` and `examples/`
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Report what would change without writing any manifest
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print a JSON summary instead of the progress trace
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Point internal dependencies of every crate at an alternate registry
    SwitchRegistry(SwitchRegistryArgs),

    /// Set the package version and path-dependency versions everywhere
    UpdateVersion(UpdateVersionArgs),
}

#[derive(Args, Debug)]
pub struct SwitchRegistryArgs {
    /// Registry name written into matching dependencies
    #[arg(long, default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Dependency name prefix of the package family (repeatable)
    #[arg(long = "prefix", value_name = "PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefixes: Vec<String>,

    /// Exact dependency name that belongs to the family (repeatable)
    #[arg(long = "package", value_name = "NAME", default_value = DEFAULT_PACKAGE)]
    pub packages: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateVersionArgs {
    /// Release version, with or without a leading `v` (e.g. v1.2.3).
    ///
    /// Must be a full semantic version (`MAJOR.MINOR.PATCH`, optionally with
    /// pre-release or build metadata). Shorthand such as `1.2` is rejected.
    pub version: String,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;
    let trace = !global.json;

    let updates = match &cli.command {
        Command::SwitchRegistry(args) => {
            let switcher = RegistrySwitcher::new(&global.root)
                .registry(args.registry.clone())
                .filter(DependencyFilter::new(
                    args.prefixes.clone(),
                    args.packages.clone(),
                ))
                .dry_run(global.dry_run);

            announce(global);
            switcher.run(|update| {
                if trace {
                    update.print_registry_trace(&global.root);
                }
            })?
        }
        Command::UpdateVersion(args) => {
            let updater = VersionUpdater::new(&global.root, &args.version)?
                .dry_run(global.dry_run);

            announce(global);
            updater.run(|update| {
                if trace {
                    update.print_version_trace(&global.root);
                }
            })?
        }
    };

    finish(global, &updates)
}

fn announce(global: &GlobalArgs) {
    if global.json {
        return;
    }

    let root = global
        .root
        .canonicalize()
        .unwrap_or_else(|_| global.root.clone());
    println!("Running in {}...", root.display());

    if global.dry_run {
        println!("{}", "Dry run mode, no files will be written".yellow());
    }
}

fn finish(global: &GlobalArgs, updates: &[ManifestUpdate]) -> Result<()> {
    if global.json {
        let json =
            serde_json::to_string_pretty(updates).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        RunSummary::from_updates(updates).print(global.dry_run);
    }
    Ok(())
}
