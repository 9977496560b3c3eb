//! Release version propagation across the workspace.

use anyhow::{Context, Result};
use semver::Version;
use std::path::Path;

use crate::cargo::{self, CargoManifest};
use crate::error::ManifestError;
use crate::report::{Action, ManifestKind, ManifestUpdate};
use crate::workspace::WorkspaceScanner;

/// Leading marker allowed on release tags, e.g. `v1.2.3`.
const VERSION_MARKER: char = 'v';

/// Strip the leading `v` from a release tag and check that the rest is a
/// semantic version.
pub fn normalize_version(input: &str) -> Result<Version, ManifestError> {
    let trimmed = input.strip_prefix(VERSION_MARKER).unwrap_or(input);
    Version::parse(trimmed).map_err(|source| ManifestError::InvalidVersion {
        input: input.to_string(),
        source,
    })
}

/// Sets one version on every package and on every path dependency between
/// them.
pub struct VersionUpdater {
    scanner: WorkspaceScanner,
    version: String,
    dry_run: bool,
}

impl VersionUpdater {
    /// Create an updater for the workspace. `version` may carry a leading `v`.
    pub fn new(workspace_root: impl AsRef<Path>, version: &str) -> Result<Self> {
        let version = normalize_version(version)?;
        Ok(Self {
            scanner: WorkspaceScanner::new(workspace_root),
            version: version.to_string(),
            dry_run: false,
        })
    }

    /// Report changes without writing any file.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Update every crate manifest, then every example manifest.
    ///
    /// `on_update` runs after each manifest has been handled, so progress is
    /// visible even when a later manifest fails.
    pub fn run<F>(&self, mut on_update: F) -> Result<Vec<ManifestUpdate>>
    where
        F: FnMut(&ManifestUpdate),
    {
        let crates = self
            .scanner
            .find_crate_manifests()
            .context("Failed to find crate manifests")?;
        let examples = self
            .scanner
            .find_example_manifests()
            .context("Failed to find example manifests")?;

        let paths = crates
            .into_iter()
            .map(|p| (p, ManifestKind::Crate))
            .chain(examples.into_iter().map(|p| (p, ManifestKind::Example)));

        let mut updates = Vec::new();
        for (path, kind) in paths {
            let update = self.update_file(&path, kind)?;
            on_update(&update);
            updates.push(update);
        }

        Ok(updates)
    }

    /// Load, update and save one manifest.
    pub fn update_file(&self, path: &Path, kind: ManifestKind) -> Result<ManifestUpdate> {
        let mut manifest = CargoManifest::load(path)?;
        let mut update = self.apply(&mut manifest, kind)?;

        update.modified = manifest.is_modified();
        if !self.dry_run {
            manifest.save()?;
            update.written = true;
        }

        Ok(update)
    }

    /// Apply the version to an in-memory manifest.
    pub fn apply(
        &self,
        manifest: &mut CargoManifest,
        kind: ManifestKind,
    ) -> Result<ManifestUpdate> {
        let mut update = ManifestUpdate::new(&manifest.path, kind, &self.version);

        manifest.set_package_version(&self.version)?;
        update.package_version = Some(self.version.clone());

        let version = self.version.as_str();
        manifest.for_each_dependency_table(|section, deps| {
            for (name, dep) in deps.iter_mut() {
                if !cargo::is_detailed(dep) || !cargo::has_key(dep, "path") {
                    update.record(section, name.get(), Action::Skipped);
                    continue;
                }

                cargo::set_dependency_field(dep, "version", version);
                update.record(section, name.get(), Action::Updated);
            }
            Ok(())
        })?;

        log::debug!(
            "{}: {} path dependencies set to {}",
            manifest.path.display(),
            update.updated().count(),
            self.version
        );

        Ok(update)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
