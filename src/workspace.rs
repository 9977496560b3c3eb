//! Workspace scanning and manifest discovery.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MANIFEST_NAME: &str = "Cargo.toml";

/// Finds the manifests the CI operations rewrite.
///
/// Package manifests live exactly one level under `crates/`
/// (`crates/*/Cargo.toml`); example manifests may sit at any depth under
/// `examples/` (`examples/**/Cargo.toml`). Symlinked crate directories and
/// symlinked manifests are followed like their targets.
#[derive(Debug, Clone)]
pub struct WorkspaceScanner {
    root: PathBuf,
}

impl WorkspaceScanner {
    /// Create a new workspace scanner.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// `crates/*/Cargo.toml`, sorted by path.
    pub fn find_crate_manifests(&self) -> Result<Vec<PathBuf>> {
        self.collect(&self.root.join("crates"), Some(2))
    }

    /// `examples/**/Cargo.toml`, sorted by path.
    pub fn find_example_manifests(&self) -> Result<Vec<PathBuf>> {
        self.collect(&self.root.join("examples"), None)
    }

    fn collect(&self, base: &Path, depth: Option<usize>) -> Result<Vec<PathBuf>> {
        if !base.is_dir() {
            log::debug!("{} does not exist, nothing to scan", base.display());
            return Ok(Vec::new());
        }

        let mut walker = WalkDir::new(base).follow_links(true).sort_by_file_name();
        if let Some(depth) = depth {
            walker = walker.min_depth(depth).max_depth(depth);
        }

        let mut manifests = Vec::new();

        for entry in walker.into_iter().filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Build output and VCS metadata never hold workspace manifests
            e.depth() == 0 || !matches!(name.as_ref(), "target" | ".git")
        }) {
            let entry = entry.context("Failed to read directory entry")?;

            if entry.file_type().is_file() && entry.file_name() == MANIFEST_NAME {
                log::debug!("Found manifest {}", entry.path().display());
                manifests.push(entry.into_path());
            }
        }

        manifests.sort();
        Ok(manifests)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
