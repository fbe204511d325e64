//! Installed package inspection.
//!
//! Provides utilities for:
//! - Reading package.json manifests and normalizing their license fields
//! - Walking `node_modules` into a dependency tree
//! - Reconciling installed packages against declared dependencies
//! - Parsing `name@version` tokens and `|`-separated dependency paths
//! - Loading per-package detail with the readme expanded
//! - Looking up published package metadata in the npm registry

pub mod error;
pub mod info;
pub mod license;
pub mod manifest;
pub mod reconcile;
pub mod registry;
pub mod spec;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{codes as pkg_codes, PkgError};
pub use info::{
    dependency_dir, expand_readme, load_package_info, MarkdownRenderer, PackageInfo,
    PassthroughRenderer, ReadmeRenderer, ReadmeSource,
};
pub use license::{normalize_licenses, LicenseField, UNRECOGNIZED_LICENSE};
pub use manifest::{FsManifestReader, Manifest, ManifestReader, MANIFEST_FILE};
pub use reconcile::{reconcile, DeclaredDependencies, DepSource, PackageNode};
pub use registry::{RegistryClient, RegistryLookup, DEFAULT_REGISTRY, REGISTRY_ENV};
pub use spec::PackageSpec;
pub use walk::{DirectoryLister, FsDirectoryLister, TreeWalker, DEPS_DIR};
