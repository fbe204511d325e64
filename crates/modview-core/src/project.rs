//! Configured projects.
//!
//! The projects file (`modview.json`) names projects explicitly and/or a root
//! directory whose children are scanned for projects:
//!
//! ```json
//! {
//!   "projects_rootdir": "../work",
//!   "projects": [{ "name": "api", "path": "/srv/api" }]
//! }
//! ```
//!
//! Every project gets an id derived from its root path, so ids survive
//! reordering of the list across restarts.

use crate::config::absolutize;
use crate::error::Error;
use crate::pkg::{DEPS_DIR, MANIFEST_FILE};
use modview_util::fs::{read_to_string_lossy, sorted_subdirs};
use modview_util::hash::short_id;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// One explicitly configured project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Contents of the projects file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Directory whose children are scanned for projects.
    #[serde(default)]
    pub projects_rootdir: Option<PathBuf>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

impl ProjectsConfig {
    /// Read and parse a projects file.
    ///
    /// # Errors
    /// Returns `ConfigRead` if the file cannot be read and `ConfigParse` if it is
    /// not valid JSON of the expected shape.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = read_to_string_lossy(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Opaque, stable project identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Id of the project rooted at `root`.
    #[must_use]
    pub fn for_path(root: &Path) -> Self {
        Self(short_id(&root.to_string_lossy()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub root_path: PathBuf,
}

impl ProjectRecord {
    #[must_use]
    pub fn new(name: String, root_path: PathBuf) -> Self {
        Self {
            id: ProjectId::for_path(&root_path),
            name,
            root_path,
        }
    }
}

/// A non-empty list of projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectList {
    records: Vec<ProjectRecord>,
}

impl ProjectList {
    /// Build the list from a parsed projects file.
    ///
    /// Relative paths are resolved against `config_path`'s directory. Explicit
    /// projects come first, then children of `projects_rootdir` holding both a
    /// package.json and a `node_modules/` directory, sorted by name. A root
    /// path listed twice is kept once.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the root directory cannot be read and
    /// `NoProjects` if the result is empty.
    pub fn from_config(config: &ProjectsConfig, config_path: &Path) -> Result<Self, Error> {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let mut records: Vec<ProjectRecord> = config
            .projects
            .iter()
            .map(|entry| ProjectRecord::new(entry.name.clone(), absolutize(base, &entry.path)))
            .collect();

        if let Some(rootdir) = &config.projects_rootdir {
            let rootdir = absolutize(base, rootdir);
            let children = sorted_subdirs(&rootdir).map_err(|e| Error::ConfigInvalid {
                path: config_path.to_path_buf(),
                message: format!("cannot read projects_rootdir {}: {e}", rootdir.display()),
            })?;

            for child in children {
                let root = rootdir.join(&child);
                if root.join(MANIFEST_FILE).is_file() && root.join(DEPS_DIR).is_dir() {
                    records.push(ProjectRecord::new(child, root));
                } else {
                    debug!(path = %root.display(), "not a project, skipping");
                }
            }
        }

        let mut seen = HashSet::new();
        records.retain(|record| seen.insert(record.id.clone()));

        if records.is_empty() {
            return Err(Error::NoProjects {
                path: config_path.to_path_buf(),
            });
        }
        Ok(Self { records })
    }

    /// Load and build the list from a projects file.
    ///
    /// # Errors
    /// Any error of [`ProjectsConfig::load`] or [`ProjectList::from_config`].
    pub fn load(config_path: &Path) -> Result<Self, Error> {
        let config = ProjectsConfig::load(config_path)?;
        Self::from_config(&config, config_path)
    }

    #[must_use]
    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; an empty list cannot be built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The project with the given id, or the first project when the id is
    /// absent or matches nothing.
    #[must_use]
    pub fn resolve(&self, id: Option<&str>) -> &ProjectRecord {
        id.and_then(|id| self.records.iter().find(|r| r.id.as_str() == id))
            .unwrap_or(&self.records[0])
    }
}

/// Holds the current project list and replaces it on refresh.
///
/// Readers get an `Arc` snapshot, so a walk in progress keeps the list it
/// started with.
#[derive(Debug)]
pub struct ProjectStore {
    config_path: PathBuf,
    current: RwLock<Arc<ProjectList>>,
}

impl ProjectStore {
    /// Load the projects file at `config_path`.
    ///
    /// # Errors
    /// Any configuration error; there is no usable store without projects.
    pub fn load(config_path: impl Into<PathBuf>) -> Result<Self, Error> {
        let config_path = config_path.into();
        let list = ProjectList::load(&config_path)?;
        info!(path = %config_path.display(), projects = list.len(), "loaded projects");
        Ok(Self::with_list(config_path, list))
    }

    /// Create a store around an already-built list.
    #[must_use]
    pub fn with_list(config_path: PathBuf, list: ProjectList) -> Self {
        Self {
            config_path,
            current: RwLock::new(Arc::new(list)),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Snapshot of the current list.
    #[must_use]
    pub fn list(&self) -> Arc<ProjectList> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-read the projects file and replace the list.
    ///
    /// # Errors
    /// On failure the previous list stays in place and the error is returned.
    pub fn refresh(&self) -> Result<Arc<ProjectList>, Error> {
        let list = Arc::new(ProjectList::load(&self.config_path)?);
        info!(path = %self.config_path.display(), projects = list.len(), "refreshed projects");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&list);
        Ok(list)
    }

    /// Resolve an id against the current list. Never fails.
    #[must_use]
    pub fn resolve(&self, id: Option<&str>) -> ProjectRecord {
        self.list().resolve(id).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn make_project(dir: &Path) {
        fs::create_dir_all(dir.join(DEPS_DIR)).unwrap();
        fs::write(dir.join(MANIFEST_FILE), "{}").unwrap();
    }

    fn write_config(path: &Path, value: &serde_json::Value) {
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_rootdir_scan_and_explicit_projects() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("work");
        make_project(&work.join("zeta"));
        make_project(&work.join("alpha"));
        fs::create_dir_all(work.join("no_modules")).unwrap();
        fs::write(work.join("no_modules").join(MANIFEST_FILE), "{}").unwrap();
        fs::create_dir_all(work.join("no_manifest").join(DEPS_DIR)).unwrap();
        fs::write(work.join("stray.txt"), "").unwrap();

        let config_path = dir.path().join("modview.json");
        write_config(
            &config_path,
            &serde_json::json!({
                "projects_rootdir": "work",
                "projects": [{ "name": "pinned", "path": "elsewhere/pinned" }]
            }),
        );

        let list = ProjectList::load(&config_path).unwrap();
        let names: Vec<&str> = list.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["pinned", "alpha", "zeta"]);
        assert_eq!(
            list.records()[0].root_path,
            dir.path().join("elsewhere/pinned")
        );
        assert_eq!(list.records()[1].root_path, work.join("alpha"));
    }

    #[test]
    fn test_duplicate_roots_kept_once() {
        let dir = tempdir().unwrap();
        make_project(&dir.path().join("work").join("app"));
        let config_path = dir.path().join("modview.json");
        write_config(
            &config_path,
            &serde_json::json!({
                "projects_rootdir": "work",
                "projects": [{ "name": "main app", "path": "work/app" }]
            }),
        );

        let list = ProjectList::load(&config_path).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.records()[0].name, "main app");
    }

    #[test]
    fn test_ids_are_stable_and_distinct() {
        let a = ProjectRecord::new("a".into(), PathBuf::from("/srv/a"));
        let again = ProjectRecord::new("renamed".into(), PathBuf::from("/srv/a"));
        let b = ProjectRecord::new("b".into(), PathBuf::from("/srv/b"));
        assert_eq!(a.id, again.id);
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.as_str().len(), modview_util::hash::SHORT_ID_LEN);
    }

    #[test]
    fn test_resolve_falls_back_to_first() {
        let config = ProjectsConfig {
            projects_rootdir: None,
            projects: vec![
                ProjectEntry {
                    name: "first".into(),
                    path: "/srv/first".into(),
                },
                ProjectEntry {
                    name: "second".into(),
                    path: "/srv/second".into(),
                },
            ],
        };
        let list = ProjectList::from_config(&config, Path::new("/etc/modview.json")).unwrap();
        let second = list.records()[1].id.clone();

        assert_eq!(list.resolve(Some(second.as_str())).name, "second");
        for id in [None, Some("-1"), Some("99"), Some(""), Some("not-an-id")] {
            assert_eq!(list.resolve(id).name, "first", "id {id:?}");
        }
    }

    #[test]
    fn test_config_errors() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("modview.json");

        let err = ProjectList::load(&config_path).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));

        fs::write(&config_path, "{ nope").unwrap();
        let err = ProjectList::load(&config_path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));

        write_config(&config_path, &serde_json::json!({ "projects_rootdir": "missing" }));
        let err = ProjectList::load(&config_path).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));

        write_config(&config_path, &serde_json::json!({}));
        let err = ProjectList::load(&config_path).unwrap_err();
        assert!(matches!(err, Error::NoProjects { .. }));
        assert!(err.is_config());
    }

    #[test]
    fn test_store_refresh_replaces_or_keeps() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("work");
        make_project(&work.join("one"));
        let config_path = dir.path().join("modview.json");
        write_config(&config_path, &serde_json::json!({ "projects_rootdir": "work" }));

        let store = ProjectStore::load(&config_path).unwrap();
        let before = store.list();
        assert_eq!(before.len(), 1);

        make_project(&work.join("two"));
        let after = store.refresh().unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(store.list().len(), 2);
        // Snapshots taken earlier are unaffected.
        assert_eq!(before.len(), 1);

        fs::write(&config_path, "broken").unwrap();
        assert!(store.refresh().is_err());
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.resolve(None).name, "one");
    }
}
