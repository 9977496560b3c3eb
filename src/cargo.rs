//! Cargo.toml loading and format-preserving edits.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use toml_edit::{value, DocumentMut, InlineTable, Item, TableLike, Value};

use crate::error::ManifestError;

/// The dependency table both operations rewrite, at the top level and under
/// `target.<cfg>`. Dev and build dependencies are never touched.
pub const DEPENDENCIES: &str = "dependencies";

/// Represents a Cargo.toml manifest file.
#[derive(Debug, Clone)]
pub struct CargoManifest {
    pub path: PathBuf,
    document: DocumentMut,
    original: String,
}

impl CargoManifest {
    /// Load a Cargo.toml file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(path, content)
    }

    /// Parse manifest text that belongs to `path`.
    pub fn parse(path: impl AsRef<Path>, content: String) -> Result<Self> {
        let path = path.as_ref();
        let document: DocumentMut = content
            .parse()
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            document,
            original: content,
        })
    }

    pub fn package_name(&self) -> Option<&str> {
        self.document.get("package")?.get("name")?.as_str()
    }

    pub fn package_version(&self) -> Option<&str> {
        self.document.get("package")?.get("version")?.as_str()
    }

    /// Set `package.version`, replacing whatever was there.
    pub fn set_package_version(&mut self, new_version: &str) -> Result<()> {
        let package = self
            .document
            .get_mut("package")
            .and_then(|i| i.as_table_like_mut())
            .ok_or_else(|| ManifestError::MissingPackage {
                path: self.path.clone(),
            })?;

        match package.get_mut("version") {
            Some(item) => replace_item(item, new_version),
            None => {
                package.insert("version", value(new_version));
            }
        }

        Ok(())
    }

    /// Visit `[dependencies]` and every `[target.<cfg>.dependencies]`.
    ///
    /// The callback receives a section label (`dependencies` or
    /// `target.<cfg>.dependencies`) and the table itself.
    pub fn for_each_dependency_table<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn TableLike) -> Result<()>,
    {
        let root = self.document.as_table_mut();

        if let Some(deps) = root.get_mut(DEPENDENCIES).and_then(|i| i.as_table_like_mut()) {
            f(DEPENDENCIES, deps)?;
        }

        if let Some(targets) = root.get_mut("target").and_then(|i| i.as_table_like_mut()) {
            for (cfg, target) in targets.iter_mut() {
                if let Some(deps) = target
                    .get_mut(DEPENDENCIES)
                    .and_then(|i| i.as_table_like_mut())
                {
                    let label = format!("target.{}.{}", cfg.get(), DEPENDENCIES);
                    f(&label, deps)?;
                }
            }
        }

        Ok(())
    }

    /// Whether the document now renders differently from the loaded text.
    pub fn is_modified(&self) -> bool {
        self.document.to_string() != self.original
    }

    /// Render the document as TOML.
    pub fn to_toml_string(&self) -> String {
        self.document.to_string()
    }

    /// Save the manifest back to disk.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.document.to_string())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// Whether a dependency entry is a table (inline or standard) rather than a
/// version string.
pub fn is_detailed(dep: &Item) -> bool {
    dep.is_table_like()
}

/// Whether a table dependency carries `key`.
pub fn has_key(dep: &Item, key: &str) -> bool {
    dep.as_table_like().is_some_and(|t| t.contains_key(key))
}

/// Set a string attribute on a table dependency.
///
/// Existing values keep their surrounding whitespace and trailing comment.
/// Inline tables are re-spaced when a key is added. Returns false when the
/// entry is not a table.
pub fn set_dependency_field(dep: &mut Item, key: &str, new_value: &str) -> bool {
    if let Some(table) = dep.as_inline_table_mut() {
        match table.get_mut(key) {
            Some(existing) => replace_value(existing, new_value),
            None => {
                table.insert(key, Value::from(new_value));
                table.fmt();
            }
        }
        true
    } else if let Some(table) = dep.as_table_mut() {
        match table.get_mut(key) {
            Some(existing) => replace_item(existing, new_value),
            None => {
                table.insert(key, value(new_value));
            }
        }
        true
    } else {
        false
    }
}

/// Turn `name = "1.0"` into `name = { version = "1.0" }`.
///
/// Entries that are not bare strings are left alone.
pub fn promote_to_inline_table(dep: &mut Item) {
    let Item::Value(Value::String(version)) = dep else {
        return;
    };

    let decor = version.decor().clone();
    let mut table = InlineTable::new();
    table.insert("version", Value::from(version.value().as_str()));
    table.fmt();

    let mut promoted = Value::InlineTable(table);
    *promoted.decor_mut() = decor;
    *dep = Item::Value(promoted);
}

fn replace_item(item: &mut Item, new_value: &str) {
    match item.as_value_mut() {
        Some(existing) => replace_value(existing, new_value),
        None => *item = value(new_value),
    }
}

fn replace_value(existing: &mut Value, new_value: &str) {
    let decor = existing.decor().clone();
    *existing = Value::from(new_value);
    *existing.decor_mut() = decor;
}

#[cfg(test)]
#[path = "cargo_tests.rs"]
mod tests;
