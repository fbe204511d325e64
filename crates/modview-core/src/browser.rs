//! The module browser: the operations exposed to the CLI and HTTP layers.

use crate::error::Error;
use crate::pkg::{
    dependency_dir, expand_readme, load_package_info, Manifest, PackageInfo, PackageNode,
    PackageSpec, PassthroughRenderer, PkgError, ReadmeRenderer, RegistryLookup, TreeWalker,
    MANIFEST_FILE,
};
use crate::project::{ProjectId, ProjectStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Appended to the name of documents fetched from the registry.
pub const REGISTRY_NAME_SUFFIX: &str = " (info retrieved from registry)";

/// Installed dependency tree of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleList {
    pub project_id: ProjectId,
    pub name: String,
    pub version: String,
    pub licenses: Vec<String>,
    pub dependencies: Vec<PackageNode>,
    /// Root manifest, readme expanded.
    pub package_json: Manifest,
}

impl ModuleList {
    /// Number of nodes in the tree, excluding the root.
    #[must_use]
    pub fn total_packages(&self) -> usize {
        self.dependencies.iter().map(PackageNode::subtree_len).sum()
    }
}

/// Parameters of an info request.
///
/// `modpath` (`name@ver|name@ver|...`) wins over `npmmod` (`name@version`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoQuery {
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub modpath: Option<String>,
    #[serde(default)]
    pub npmmod: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Browses installed modules of the configured projects.
#[derive(Clone)]
pub struct ModuleBrowser {
    store: Arc<ProjectStore>,
    walker: TreeWalker,
    renderer: Arc<dyn ReadmeRenderer>,
    registry: Option<Arc<dyn RegistryLookup>>,
}

impl std::fmt::Debug for ModuleBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleBrowser")
            .field("store", &self.store)
            .field("walker", &self.walker)
            .field("registry", &self.registry.is_some())
            .finish_non_exhaustive()
    }
}

impl ModuleBrowser {
    /// Browser over the filesystem with pass-through readmes and no registry.
    #[must_use]
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self {
            store,
            walker: TreeWalker::default(),
            renderer: Arc::new(PassthroughRenderer),
            registry: None,
        }
    }

    #[must_use]
    pub fn with_walker(mut self, walker: TreeWalker) -> Self {
        self.walker = walker;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn ReadmeRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn RegistryLookup>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Build the reconciled dependency tree of a project.
    ///
    /// Unknown or absent ids select the first configured project.
    ///
    /// # Errors
    /// Returns `Lookup` if the project's own package.json cannot be read or
    /// parsed. Problems below the root only drop the affected packages.
    pub async fn get_module_list(&self, project_id: Option<&str>) -> Result<ModuleList, Error> {
        let project = self.store.resolve(project_id);
        let root = project.root_path;
        info!(project = %project.name, id = %project.id, "Loading module list");

        let manifest_path = root.join(MANIFEST_FILE);
        let reader = self.walker.reader();
        let mut manifest = reader
            .read(&manifest_path)
            .await
            .map_err(|source| Error::Lookup {
                path: manifest_path.clone(),
                source,
            })?;

        let dependencies = self.walker.dependencies_of(&root, &manifest).await;

        if let Err(e) =
            expand_readme(reader.as_ref(), self.renderer.as_ref(), &root, &mut manifest).await
        {
            debug!(path = %root.display(), error = %e, "project has no readme");
        }

        Ok(ModuleList {
            project_id: project.id,
            name: manifest.name().map_or(project.name, String::from),
            version: manifest.version().unwrap_or_default().to_string(),
            licenses: manifest.licenses(),
            dependencies,
            package_json: manifest,
        })
    }

    /// Manifest of the package at `path`, resolved through nested
    /// `node_modules/` directories by name. Versions in `path` are not checked.
    ///
    /// # Errors
    /// Returns the manifest error of the addressed package (`PKG_MANIFEST_NOT_FOUND`
    /// if nothing is installed there).
    pub async fn get_dependency_for(
        &self,
        path: &[PackageSpec],
        project_id: Option<&str>,
    ) -> Result<PackageInfo, Error> {
        let project = self.store.resolve(project_id);
        let dir = dependency_dir(&project.root_path, path);
        debug!(project = %project.name, path = %dir.display(), "loading package info");

        let info = load_package_info(
            self.walker.reader().as_ref(),
            self.renderer.as_ref(),
            &dir,
        )
        .await?;
        Ok(info)
    }

    /// Answer an info request, from disk (`modpath`) or the registry (`npmmod`).
    ///
    /// # Errors
    /// Returns `PKG_QUERY_INVALID` when neither parameter is given,
    /// `PKG_SPEC_INVALID` for malformed tokens, and lookup errors otherwise.
    pub async fn get_npm_info(&self, query: &InfoQuery) -> Result<Value, Error> {
        let pid = non_empty(query.pid.as_ref());

        if let Some(modpath) = non_empty(query.modpath.as_ref()) {
            let path = PackageSpec::parse_path(modpath)?;
            let info = self.get_dependency_for(&path, pid).await?;
            return Ok(info.manifest.into_raw());
        }

        let Some(npmmod) = non_empty(query.npmmod.as_ref()) else {
            return Err(PkgError::query_invalid("must specify npmmod or modpath").into());
        };

        let spec = PackageSpec::parse(npmmod)?;
        let registry = self
            .registry
            .as_ref()
            .ok_or_else(|| PkgError::registry("no registry configured"))?;

        info!(package = %spec.name, "fetching info from registry");
        let mut doc = registry.view(&spec).await?;

        let name = doc
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(spec.name.as_str())
            .to_string();
        if let Some(obj) = doc.as_object_mut() {
            obj.insert(
                "name".to_string(),
                Value::String(format!("{name}{REGISTRY_NAME_SUFFIX}")),
            );
        }
        Ok(doc)
    }
}
