//! Reconciliation of installed packages against declared dependencies.
//!
//! Given the packages found on disk for one directory level and the manifest
//! that owns that level, every package is tagged with where it came from:
//!
//! - `primary`: declared in `dependencies`
//! - `dev`: declared in `devDependencies`
//! - `orphaned`: installed but declared nowhere
//!
//! Declared packages with no directory on disk are appended as
//! `notInstalled` placeholders.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Where a dependency was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepSource {
    Primary,
    Dev,
    #[default]
    Orphaned,
}

impl DepSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Dev => "dev",
            Self::Orphaned => "orphaned",
        }
    }
}

/// A package in the reconciled dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNode {
    pub name: String,
    /// Installed version, or the declared range for `not_installed` nodes.
    pub version: String,
    pub licenses: Vec<String>,
    pub dependencies: Vec<PackageNode>,
    pub dep_source: DepSource,
    /// Declared in the manifest but absent from `node_modules`.
    pub not_installed: bool,
}

impl PackageNode {
    /// Create a node for a package found on disk.
    ///
    /// The source starts out as `orphaned`; reconciliation against the parent
    /// manifest assigns the real one.
    #[must_use]
    pub fn installed(
        name: String,
        version: String,
        licenses: Vec<String>,
        dependencies: Vec<PackageNode>,
    ) -> Self {
        Self {
            name,
            version,
            licenses,
            dependencies,
            dep_source: DepSource::Orphaned,
            not_installed: false,
        }
    }

    /// Create a placeholder for a declared package that is not installed.
    #[must_use]
    pub fn missing(name: String, declared_version: String, dep_source: DepSource) -> Self {
        Self {
            name,
            version: declared_version,
            licenses: Vec::new(),
            dependencies: Vec::new(),
            dep_source,
            not_installed: true,
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self
            .dependencies
            .iter()
            .map(PackageNode::subtree_len)
            .sum::<usize>()
    }
}

/// Dependencies declared by one manifest, as (name, declared version) pairs
/// in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredDependencies {
    pub primary: Vec<(String, String)>,
    pub dev: Vec<(String, String)>,
}

impl DeclaredDependencies {
    /// Whether `name` is declared in either map.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.primary.iter().chain(&self.dev).any(|(n, _)| n == name)
    }
}

/// Merge discovered packages with the declared dependency maps.
///
/// Dev entries are applied before primary ones, so a name declared in both
/// ends up `primary`. Discovered nodes keep their order; placeholders for
/// missing packages are appended dev-first, each group in declaration order.
#[must_use]
pub fn reconcile(mut nodes: Vec<PackageNode>, declared: &DeclaredDependencies) -> Vec<PackageNode> {
    // First occurrence wins when a name repeats.
    let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        index.entry(node.name.clone()).or_insert(i);
    }

    for (map, source) in [
        (&declared.dev, DepSource::Dev),
        (&declared.primary, DepSource::Primary),
    ] {
        for (name, version) in map {
            if let Some(&i) = index.get(name) {
                nodes[i].dep_source = source;
            } else {
                index.insert(name.clone(), nodes.len());
                nodes.push(PackageNode::missing(name.clone(), version.clone(), source));
            }
        }
    }

    let declared_names: HashSet<&str> = declared
        .primary
        .iter()
        .chain(&declared.dev)
        .map(|(n, _)| n.as_str())
        .collect();
    for node in &mut nodes {
        if !declared_names.contains(node.name.as_str()) {
            node.dep_source = DepSource::Orphaned;
        }
    }

    nodes
}
