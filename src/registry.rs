//! Registry overrides for the internal package family.
//!
//! CI publishes a dry run against an alternate registry before the real
//! release. For that, every dependency on a sibling package has to name the
//! alternate registry explicitly.

use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::Item;

use crate::cargo::{self, CargoManifest};
use crate::report::{Action, ManifestKind, ManifestUpdate};
use crate::workspace::WorkspaceScanner;

pub const DEFAULT_REGISTRY: &str = "dry-run";
pub const DEFAULT_PREFIX: &str = "stellation-";
pub const DEFAULT_PACKAGE: &str = "stctl";

/// Selects the dependencies that belong to the package family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyFilter {
    pub prefixes: Vec<String>,
    pub names: Vec<String>,
}

impl Default for DependencyFilter {
    fn default() -> Self {
        Self {
            prefixes: vec![DEFAULT_PREFIX.to_string()],
            names: vec![DEFAULT_PACKAGE.to_string()],
        }
    }
}

impl DependencyFilter {
    pub fn new(prefixes: Vec<String>, names: Vec<String>) -> Self {
        Self { prefixes, names }
    }

    /// A key matches when it equals one of the names or starts with one of
    /// the prefixes.
    pub fn matches(&self, key: &str) -> bool {
        self.names.iter().any(|n| n == key)
            || self
                .prefixes
                .iter()
                .any(|p| key.starts_with(p.as_str()))
    }
}

/// Points family dependencies at an alternate registry.
pub struct RegistrySwitcher {
    scanner: WorkspaceScanner,
    registry: String,
    filter: DependencyFilter,
    dry_run: bool,
}

impl RegistrySwitcher {
    /// Create a switcher using the default registry and family.
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            scanner: WorkspaceScanner::new(workspace_root),
            registry: DEFAULT_REGISTRY.to_string(),
            filter: DependencyFilter::default(),
            dry_run: false,
        }
    }

    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn filter(mut self, filter: DependencyFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Report changes without writing any file.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rewrite every `crates/*/Cargo.toml`.
    pub fn run<F>(&self, mut on_update: F) -> Result<Vec<ManifestUpdate>>
    where
        F: FnMut(&ManifestUpdate),
    {
        let paths = self
            .scanner
            .find_crate_manifests()
            .context("Failed to find crate manifests")?;

        let mut updates = Vec::with_capacity(paths.len());
        for path in paths {
            let update = self.update_file(&path)?;
            on_update(&update);
            updates.push(update);
        }

        Ok(updates)
    }

    /// Load, update and save one manifest.
    pub fn update_file(&self, path: &Path) -> Result<ManifestUpdate> {
        let mut manifest = CargoManifest::load(path)?;
        let mut update = self.apply(&mut manifest)?;

        update.modified = manifest.is_modified();
        if !self.dry_run {
            manifest.save()?;
            update.written = true;
        }

        Ok(update)
    }

    /// Apply the registry override to an in-memory manifest.
    pub fn apply(&self, manifest: &mut CargoManifest) -> Result<ManifestUpdate> {
        let mut update =
            ManifestUpdate::new(&manifest.path, ManifestKind::Crate, &self.registry);

        let registry = self.registry.as_str();
        manifest.for_each_dependency_table(|section, deps| {
            for (name, dep) in deps.iter_mut() {
                let name = name.get();
                if !self.filter.matches(name) {
                    update.record(section, name, Action::Skipped);
                    continue;
                }

                if inherits_from_workspace(dep) {
                    log::warn!(
                        "{} is inherited from [workspace.dependencies], set its registry there",
                        name
                    );
                    update.record(section, name, Action::Skipped);
                    continue;
                }

                cargo::promote_to_inline_table(dep);
                if cargo::set_dependency_field(dep, "registry", registry) {
                    update.record(section, name, Action::Updated);
                } else {
                    log::warn!("{} has an unsupported dependency shape, skipping", name);
                    update.record(section, name, Action::Skipped);
                }
            }
            Ok(())
        })?;

        Ok(update)
    }
}

fn inherits_from_workspace(dep: &Item) -> bool {
    dep.get("workspace")
        .and_then(|w| w.as_bool())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
