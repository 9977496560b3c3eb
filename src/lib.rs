//! CI utilities for the stellation multi-crate workspace.
//!
//! Both operations rewrite Cargo manifests in place with a format-preserving
//! TOML parser: [`RegistrySwitcher`] points internal dependencies at an
//! alternate registry, [`VersionUpdater`] stamps a release version on every
//! package and every path dependency between them.

pub mod cargo;
pub mod cli;
pub mod error;
pub mod registry;
pub mod report;
pub mod version;
pub mod workspace;

pub use cargo::CargoManifest;
pub use error::ManifestError;
pub use registry::{DependencyFilter, RegistrySwitcher};
pub use report::{Action, DependencyChange, ManifestKind, ManifestUpdate, RunSummary};
pub use version::{normalize_version, VersionUpdater};
pub use workspace::WorkspaceScanner;
