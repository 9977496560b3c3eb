//! Per-manifest records of what a run changed.

use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to a single dependency entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Updated,
    Skipped,
}

/// Which manifest set a file was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// `crates/*/Cargo.toml`
    Crate,
    /// `examples/**/Cargo.toml`
    Example,
}

/// A decision taken for one dependency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyChange {
    /// Dependency table the key lives in, e.g. `dependencies` or
    /// `target.cfg(unix).dependencies`.
    pub section: String,
    pub name: String,
    pub action: Action,
}

/// Changes applied to one manifest file.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestUpdate {
    pub path: PathBuf,
    pub kind: ManifestKind,
    /// New `package.version`, when the operation sets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,
    /// Value written into each updated dependency entry.
    pub target: String,
    pub dependencies: Vec<DependencyChange>,
    /// Whether the rewritten document differs from what was on disk.
    pub modified: bool,
    /// Whether the file was actually written (false in dry-run mode).
    pub written: bool,
}

impl ManifestUpdate {
    pub(crate) fn new(
        path: impl AsRef<Path>,
        kind: ManifestKind,
        target: impl Into<String>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
            package_version: None,
            target: target.into(),
            dependencies: Vec::new(),
            modified: false,
            written: false,
        }
    }

    pub(crate) fn record(&mut self, section: &str, name: &str, action: Action) {
        self.dependencies.push(DependencyChange {
            section: section.to_string(),
            name: name.to_string(),
            action,
        });
    }

    pub fn updated(&self) -> impl Iterator<Item = &DependencyChange> {
        self.dependencies
            .iter()
            .filter(|d| d.action == Action::Updated)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &DependencyChange> {
        self.dependencies
            .iter()
            .filter(|d| d.action == Action::Skipped)
    }

    /// Print the version-update trace for this manifest.
    pub fn print_version_trace(&self, root: &Path) {
        let version = self.package_version.as_deref().unwrap_or(&self.target);
        let label = match self.kind {
            ManifestKind::Crate => "Updating",
            ManifestKind::Example => "Updating example",
        };
        println!(
            "{} {} to version {}...",
            label,
            display_path(&self.path, root).bright_white(),
            version.green()
        );
        self.print_dependencies("version");
    }

    /// Print the registry-switch trace for this manifest.
    pub fn print_registry_trace(&self, root: &Path) {
        println!(
            "Switching registry in {}...",
            display_path(&self.path, root).bright_white()
        );
        self.print_dependencies("registry");
    }

    fn print_dependencies(&self, field: &str) {
        for dep in &self.dependencies {
            match dep.action {
                Action::Updated => println!(
                    "  Updating {} to {} {}...",
                    dep.name.cyan(),
                    field,
                    self.target.green()
                ),
                Action::Skipped => {
                    println!("  {}", format!("Skipping {}...", dep.name).dimmed())
                }
            }
        }
    }
}

/// Totals across a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub manifests: usize,
    pub written: usize,
    pub dependencies_updated: usize,
}

impl RunSummary {
    pub fn from_updates(updates: &[ManifestUpdate]) -> Self {
        Self {
            manifests: updates.len(),
            written: updates.iter().filter(|u| u.written).count(),
            dependencies_updated: updates.iter().map(|u| u.updated().count()).sum(),
        }
    }

    pub fn print(&self, dry_run: bool) {
        if self.manifests == 0 {
            println!("{} No manifests found", "Info:".blue().bold());
            return;
        }

        if dry_run {
            println!(
                "\n{} {} manifest(s) checked, {} dependency entries would change",
                "Dry run:".yellow().bold(),
                self.manifests,
                self.dependencies_updated
            );
        } else {
            println!(
                "\n{} {} manifest(s) written, {} dependency entries updated",
                "✓".green().bold(),
                self.written,
                self.dependencies_updated
            );
        }
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
