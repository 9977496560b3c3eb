//! Domain errors raised while rewriting manifests.
//!
//! I/O and parse failures are reported through `anyhow` with path context;
//! this enum only covers the cases a caller may want to match on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest has no `[package]` table to carry a version.
    #[error("Missing [package] table in {}", path.display())]
    MissingPackage { path: PathBuf },

    /// The requested version is not a semantic version.
    #[error("Invalid version '{input}'")]
    InvalidVersion {
        input: String,
        #[source]
        source: semver::Error,
    },
}
