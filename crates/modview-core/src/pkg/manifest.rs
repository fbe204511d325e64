//! package.json loading.
//!
//! [`Manifest`] wraps the parsed JSON object and exposes the handful of fields
//! the walker needs, tolerating fields of the wrong type the same way npm does
//! (they are simply treated as absent).

use super::error::PkgError;
use super::license::{normalize_licenses, LicenseField};
use super::reconcile::DeclaredDependencies;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::Path;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Readme file name used when the manifest does not name one.
pub const DEFAULT_README: &str = "README.md";

/// A parsed package.json. Serializes as the underlying document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    raw: Value,
}

impl Manifest {
    /// Wrap an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns `PKG_MANIFEST_INVALID` if the value is not a JSON object.
    pub fn from_value(raw: Value) -> Result<Self, PkgError> {
        if raw.is_object() {
            Ok(Self { raw })
        } else {
            Err(PkgError::manifest_invalid(
                "package.json must be a JSON object",
            ))
        }
    }

    /// Parse manifest text.
    ///
    /// # Errors
    /// Returns `PKG_MANIFEST_INVALID` for malformed JSON or a non-object root.
    pub fn parse(content: &str) -> Result<Self, PkgError> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| PkgError::manifest_invalid(format!("Invalid JSON: {e}")))?;
        Self::from_value(raw)
    }

    /// The full JSON document.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the manifest, returning the JSON document.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    /// Embedded readme text, if the manifest carries one.
    #[must_use]
    pub fn readme(&self) -> Option<&str> {
        self.str_field("readme")
    }

    #[must_use]
    pub fn readme_filename(&self) -> Option<&str> {
        self.str_field("readmeFilename")
    }

    /// The license declaration. `license` wins over the legacy `licenses` key.
    #[must_use]
    pub fn license_field(&self) -> Option<LicenseField> {
        ["license", "licenses"]
            .iter()
            .filter_map(|key| self.raw.get(*key))
            .find(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Normalized license names.
    #[must_use]
    pub fn licenses(&self) -> Vec<String> {
        normalize_licenses(self.license_field().as_ref())
    }

    /// Declared `dependencies` and `devDependencies`, in declaration order.
    #[must_use]
    pub fn declared(&self) -> DeclaredDependencies {
        DeclaredDependencies {
            primary: self.section("dependencies"),
            dev: self.section("devDependencies"),
        }
    }

    fn section(&self, key: &str) -> Vec<(String, String)> {
        let Some(obj) = self.raw.get(key).and_then(Value::as_object) else {
            return Vec::new();
        };
        obj.iter()
            .map(|(name, range)| {
                let range = match range {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), range)
            })
            .collect()
    }

    /// Replace the embedded readme text.
    pub fn set_readme(&mut self, text: String) {
        if let Some(obj) = self.raw.as_object_mut() {
            obj.insert("readme".to_string(), Value::String(text));
        }
    }

    /// Replace the manifest name.
    pub fn set_name(&mut self, name: String) {
        if let Some(obj) = self.raw.as_object_mut() {
            obj.insert("name".to_string(), Value::String(name));
        }
    }
}

/// Reads manifests (and the readme files next to them).
#[async_trait]
pub trait ManifestReader: Send + Sync {
    /// Read and parse the manifest at `path`.
    ///
    /// Fails with `PKG_MANIFEST_NOT_FOUND` when the file does not exist and
    /// `PKG_MANIFEST_INVALID` when it cannot be read or parsed.
    async fn read(&self, path: &Path) -> Result<Manifest, PkgError>;

    /// Read a readme file as text; `None` if it cannot be read.
    async fn read_readme(&self, path: &Path) -> Option<String>;
}

/// [`ManifestReader`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifestReader;

#[async_trait]
impl ManifestReader for FsManifestReader {
    async fn read(&self, path: &Path) -> Result<Manifest, PkgError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            // A plain file under node_modules yields ENOTDIR for `<file>/package.json`.
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                return Err(PkgError::manifest_not_found(path));
            }
            Err(e) => {
                return Err(PkgError::manifest_invalid(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        Manifest::parse(&content)
    }

    async fn read_readme(&self, path: &Path) -> Option<String> {
        let bytes = tokio::fs::read(path).await.ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}
