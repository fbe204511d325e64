//! Installed dependency tree walking.
//!
//! Rebuilds the dependency tree of a package from its `node_modules/`
//! directory, recursing into nested `node_modules/` folders. Each level is
//! reconciled against the manifest of the package that owns it, so `primary`,
//! `dev` and `orphaned` tags are correct at every depth, not only at the root.
//!
//! Entries without a readable package.json are left out of the tree; a
//! missing `node_modules/` simply means "no children".

use super::error::PkgError;
use super::manifest::{FsManifestReader, Manifest, ManifestReader, MANIFEST_FILE};
use super::reconcile::{reconcile, PackageNode};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Name of the installed-dependencies directory.
pub const DEPS_DIR: &str = "node_modules";

/// Maximum number of sibling packages loaded concurrently per directory.
pub const MAX_CONCURRENT_ENTRIES: usize = 16;

/// Lists directory entries.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    /// Entry names of `dir`, in a stable order.
    ///
    /// Fails with `PKG_DIR_NOT_FOUND` if the directory cannot be read.
    async fn list(&self, dir: &Path) -> Result<Vec<String>, PkgError>;
}

/// [`DirectoryLister`] over the local filesystem, sorted by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryLister;

#[async_trait]
impl DirectoryLister for FsDirectoryLister {
    async fn list(&self, dir: &Path) -> Result<Vec<String>, PkgError> {
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .map_err(|_| PkgError::dir_not_found(dir))?;

        let mut names = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => {
                    debug!(path = %dir.display(), error = %e, "directory listing failed");
                    return Err(PkgError::dir_not_found(dir));
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Walks installed packages below a directory.
#[derive(Clone)]
pub struct TreeWalker {
    lister: Arc<dyn DirectoryLister>,
    reader: Arc<dyn ManifestReader>,
    concurrency: usize,
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(Arc::new(FsDirectoryLister), Arc::new(FsManifestReader))
    }
}

impl TreeWalker {
    #[must_use]
    pub fn new(lister: Arc<dyn DirectoryLister>, reader: Arc<dyn ManifestReader>) -> Self {
        Self {
            lister,
            reader,
            concurrency: MAX_CONCURRENT_ENTRIES,
        }
    }

    /// Set the per-directory fan-out (at least 1).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The manifest reader used by this walker.
    #[must_use]
    pub fn reader(&self) -> &Arc<dyn ManifestReader> {
        &self.reader
    }

    /// Walk `dir/node_modules` and return one node per installed package,
    /// in listing order.
    ///
    /// The returned nodes are not yet reconciled against `dir`'s own
    /// manifest; see [`TreeWalker::dependencies_of`].
    pub fn walk<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, Vec<PackageNode>> {
        async move {
            let deps_dir = dir.join(DEPS_DIR);
            let entries = self.package_dirs(&deps_dir).await;
            if entries.is_empty() {
                return Vec::new();
            }

            stream::iter(entries)
                .map(|(name, path)| self.load_package(name, path))
                .buffered(self.concurrency)
                .filter_map(future::ready)
                .collect::<Vec<_>>()
                .await
        }
        .boxed()
    }

    /// Walk `dir` and reconcile the result against `manifest`, which must be
    /// the manifest of `dir` itself.
    pub async fn dependencies_of(&self, dir: &Path, manifest: &Manifest) -> Vec<PackageNode> {
        let discovered = self.walk(dir).await;
        reconcile(discovered, &manifest.declared())
    }

    /// Candidate package directories under `deps_dir`, expanding `@scope/`
    /// folders. Hidden entries such as `.bin` are skipped.
    async fn package_dirs(&self, deps_dir: &Path) -> Vec<(String, PathBuf)> {
        let names = match self.lister.list(deps_dir).await {
            Ok(names) => names,
            Err(e) => {
                trace!(path = %deps_dir.display(), error = %e, "no installed packages");
                return Vec::new();
            }
        };

        let mut dirs = Vec::with_capacity(names.len());
        for name in names {
            if name.starts_with('.') {
                continue;
            }

            let path = deps_dir.join(&name);
            if name.starts_with('@') {
                match self.lister.list(&path).await {
                    Ok(scoped) => dirs.extend(
                        scoped
                            .into_iter()
                            .filter(|s| !s.starts_with('.'))
                            .map(|s| (format!("{name}/{s}"), path.join(s))),
                    ),
                    Err(e) => debug!(path = %path.display(), error = %e, "unreadable scope directory"),
                }
            } else {
                dirs.push((name, path));
            }
        }
        dirs
    }

    /// Build the node for one package directory, or `None` if it is not a
    /// readable package.
    async fn load_package(&self, dir_name: String, pkg_dir: PathBuf) -> Option<PackageNode> {
        let manifest_path = pkg_dir.join(MANIFEST_FILE);
        let manifest = match self.reader.read(&manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) if e.is_not_found() => {
                debug!(path = %pkg_dir.display(), "no package.json, skipping entry");
                return None;
            }
            Err(e) => {
                warn!(path = %manifest_path.display(), error = %e, "skipping package with invalid package.json");
                return None;
            }
        };

        let dependencies = self.dependencies_of(&pkg_dir, &manifest).await;
        let name = manifest.name().map_or(dir_name, String::from);
        let version = manifest.version().unwrap_or_default().to_string();

        trace!(name = %name, version = %version, deps = dependencies.len(), "loaded package");
        Some(PackageNode::installed(
            name,
            version,
            manifest.licenses(),
            dependencies,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::reconcile::DepSource;
    use crate::pkg::testing::{reference_project, write_manifest, MemoryFs};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn names(nodes: &[PackageNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_reference_project_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        reference_project(root);

        let walker = TreeWalker::default();
        let discovered = walker.walk(root).await;
        assert_eq!(names(&discovered), vec!["module1", "module4"]);

        let root_manifest = FsManifestReader
            .read(&root.join(MANIFEST_FILE))
            .await
            .unwrap();
        let tree = walker.dependencies_of(root, &root_manifest).await;

        assert_eq!(
            names(&tree),
            vec!["module1", "module4", "extra_dev_module", "extra_module"]
        );
        assert_eq!(tree[0].dep_source, DepSource::Primary);
        assert_eq!(tree[0].licenses, vec!["MIT"]);
        assert_eq!(tree[1].dep_source, DepSource::Orphaned);
        assert_eq!(tree[1].licenses, vec!["MIT"]);
        assert!(tree[2].not_installed);
        assert_eq!(tree[2].dep_source, DepSource::Dev);
        assert!(tree[3].not_installed);
        assert_eq!(tree[3].dep_source, DepSource::Primary);

        let module1 = &tree[0];
        assert_eq!(
            names(&module1.dependencies),
            vec!["module3", "extra_module", "extra_module_git"]
        );
        assert_eq!(module1.dependencies[0].dep_source, DepSource::Dev);
        assert!(!module1.dependencies[0].not_installed);
        assert_eq!(module1.dependencies[2].version, "git+https://example.com/pkg.git");
    }

    #[tokio::test]
    async fn test_missing_node_modules_is_empty() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path(), &json!({ "name": "leaf", "version": "1.0.0" }));

        let nodes = TreeWalker::default().walk(dir.path()).await;
        assert!(nodes.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_manifest_skips_only_that_package() {
        let dir = tempdir().unwrap();
        let nm = dir.path().join(DEPS_DIR);
        write_manifest(&nm.join("good"), &json!({ "name": "good", "version": "1.0.0" }));
        fs::create_dir_all(nm.join("bad")).unwrap();
        fs::write(nm.join("bad").join(MANIFEST_FILE), "not valid json {{{").unwrap();
        write_manifest(&nm.join("zed"), &json!({ "name": "zed", "version": "2.0.0" }));

        let nodes = TreeWalker::default().walk(dir.path()).await;
        assert_eq!(names(&nodes), vec!["good", "zed"]);
    }

    #[tokio::test]
    async fn test_plain_file_entry_is_skipped() {
        let dir = tempdir().unwrap();
        let nm = dir.path().join(DEPS_DIR);
        write_manifest(&nm.join("good"), &json!({ "name": "good", "version": "1.0.0" }));
        fs::write(nm.join("stray.tgz"), "not a package").unwrap();

        let nodes = TreeWalker::default().walk(dir.path()).await;
        assert_eq!(names(&nodes), vec!["good"]);
    }

    #[tokio::test]
    async fn test_fs_lister_sorted_and_errors() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("zeta")).unwrap();
        fs::create_dir_all(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join("file.txt"), "x").unwrap();

        let names = FsDirectoryLister.list(dir.path()).await.unwrap();
        assert_eq!(names, vec!["alpha", "file.txt", "zeta"]);

        for bad in [dir.path().join("missing"), dir.path().join("file.txt")] {
            let err = FsDirectoryLister.list(&bad).await.unwrap_err();
            assert_eq!(err.code(), crate::pkg::pkg_codes::PKG_DIR_NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_scoped_and_hidden_entries() {
        let dir = tempdir().unwrap();
        let nm = dir.path().join(DEPS_DIR);
        write_manifest(
            &nm.join("@types").join("node"),
            &json!({ "name": "@types/node", "version": "20.1.0" }),
        );
        fs::create_dir_all(nm.join(".bin")).unwrap();
        fs::write(nm.join(".package-lock.json"), "{}").unwrap();
        write_manifest(&nm.join("react"), &json!({ "name": "react", "version": "18.2.0" }));

        let nodes = TreeWalker::default().walk(dir.path()).await;
        assert_eq!(names(&nodes), vec!["@types/node", "react"]);
    }

    #[tokio::test]
    async fn test_missing_name_falls_back_to_directory() {
        let dir = tempdir().unwrap();
        write_manifest(
            &dir.path().join(DEPS_DIR).join("anon"),
            &json!({ "description": "no name or version" }),
        );

        let nodes = TreeWalker::default().walk(dir.path()).await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "anon");
        assert_eq!(nodes[0].version, "");
    }

    #[tokio::test]
    async fn test_listing_order_survives_concurrency() {
        // Listing order is deliberately unsorted; the subtree sizes differ so
        // siblings finish at different times.
        let mut memfs = MemoryFs::new();
        for name in ["zulu", "alpha", "mike"] {
            memfs = memfs.file(
                format!("/p/node_modules/{name}/package.json"),
                &format!(r#"{{"name":"{name}","version":"1.0.0"}}"#),
            );
        }
        memfs = memfs.file(
            "/p/node_modules/alpha/node_modules/deep/package.json",
            r#"{"name":"deep","version":"0.1.0"}"#,
        );
        let memfs = Arc::new(memfs);

        for concurrency in [1, 2, 8] {
            let walker = TreeWalker::new(memfs.clone(), memfs.clone()).with_concurrency(concurrency);
            let nodes = walker.walk(Path::new("/p")).await;
            assert_eq!(names(&nodes), vec!["zulu", "alpha", "mike"]);
            assert_eq!(names(&nodes[1].dependencies), vec!["deep"]);
            assert_eq!(nodes[1].dependencies[0].dep_source, DepSource::Orphaned);
        }
    }

    #[tokio::test]
    async fn test_nested_reconciliation_uses_own_manifest() {
        let memfs = Arc::new(
            MemoryFs::new()
                .file(
                    "/p/node_modules/a/package.json",
                    r#"{"name":"a","version":"1.0.0","dependencies":{"b":"^1"},"devDependencies":{"c":"^1"}}"#,
                )
                .file(
                    "/p/node_modules/a/node_modules/b/package.json",
                    r#"{"name":"b","version":"1.4.0"}"#,
                )
                .dir("/p/node_modules/a/node_modules/not-a-package"),
        );
        let walker = TreeWalker::new(memfs.clone(), memfs);

        let nodes = walker.walk(Path::new("/p")).await;
        assert_eq!(nodes.len(), 1);
        let a = &nodes[0];
        assert_eq!(names(&a.dependencies), vec!["b", "c"]);
        assert_eq!(a.dependencies[0].dep_source, DepSource::Primary);
        assert!(!a.dependencies[0].not_installed);
        assert_eq!(a.dependencies[1].dep_source, DepSource::Dev);
        assert!(a.dependencies[1].not_installed);
        assert_eq!(a.dependencies[1].version, "^1");
    }
}
