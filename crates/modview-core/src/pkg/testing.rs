//! Test fixtures: an in-memory filesystem and an on-disk reference project.

use super::error::PkgError;
use super::manifest::{Manifest, ManifestReader, MANIFEST_FILE};
use super::walk::{DirectoryLister, DEPS_DIR};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Files and directory listings held in memory.
///
/// Directory listings keep insertion order, so tests can lay out entries in
/// an order a sorted filesystem listing would never produce.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: HashMap<PathBuf, String>,
    dirs: HashMap<PathBuf, Vec<String>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = path.as_ref().to_path_buf();
        self.register(&path);
        self.files.insert(path, content.to_string());
        self
    }

    /// Add an empty directory (and its parents).
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.register(&path);
        self.dirs.entry(path).or_default();
        self
    }

    fn register(&mut self, path: &Path) {
        let mut child = path;
        while let (Some(parent), Some(name)) = (child.parent(), child.file_name()) {
            let name = name.to_string_lossy().into_owned();
            let entries = self.dirs.entry(parent.to_path_buf()).or_default();
            if !entries.contains(&name) {
                entries.push(name);
            }
            child = parent;
        }
    }
}

#[async_trait]
impl DirectoryLister for MemoryFs {
    async fn list(&self, dir: &Path) -> Result<Vec<String>, PkgError> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| PkgError::dir_not_found(dir))
    }
}

#[async_trait]
impl ManifestReader for MemoryFs {
    async fn read(&self, path: &Path) -> Result<Manifest, PkgError> {
        let content = self
            .files
            .get(path)
            .ok_or_else(|| PkgError::manifest_not_found(path))?;
        Manifest::parse(content)
    }

    async fn read_readme(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }
}

/// Write `manifest` to `dir/package.json`, creating `dir`.
pub fn write_manifest(dir: &Path, manifest: &serde_json::Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(manifest).unwrap(),
    )
    .unwrap();
}

/// Lays out the reference project:
///
/// ```text
/// root/package.json          deps: module1, extra_module; dev: extra_dev_module
/// root/node_modules/module1  deps: extra_module, extra_module_git; dev: module3
///     node_modules/module3
/// root/node_modules/module2  (no package.json)
/// root/node_modules/module4  (undeclared)
/// ```
pub fn reference_project(root: &Path) {
    write_manifest(
        root,
        &json!({
            "name": "test_proj1",
            "version": "0.0.0",
            "license": "MIT",
            "dependencies": { "module1": "0.0.0", "extra_module": "0.0.0" },
            "devDependencies": { "extra_dev_module": "0.0.0" }
        }),
    );
    let nm = root.join(DEPS_DIR);
    write_manifest(
        &nm.join("module1"),
        &json!({
            "name": "module1",
            "version": "0.0.0",
            "license": [{ "type": "MIT", "url": "http://urltolicense.com" }],
            "dependencies": {
                "extra_module": "^0.0.0",
                "extra_module_git": "git+https://example.com/pkg.git"
            },
            "devDependencies": { "module3": "^0.0.0" }
        }),
    );
    write_manifest(
        &nm.join("module1").join(DEPS_DIR).join("module3"),
        &json!({ "name": "module3", "version": "0.0.0", "licenses": ["MIT"] }),
    );
    fs::create_dir_all(nm.join("module2")).unwrap();
    write_manifest(
        &nm.join("module4"),
        &json!({ "name": "module4", "version": "0.0.0", "licenses": { "type": "MIT" } }),
    );
}
