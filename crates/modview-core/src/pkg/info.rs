//! Per-package detail: the manifest of one installed package with its readme
//! text filled in.

use super::error::PkgError;
use super::manifest::{Manifest, ManifestReader, DEFAULT_README, MANIFEST_FILE};
use super::spec::PackageSpec;
use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Converts readme markup into the form handed to clients (HTML for a web UI).
pub trait ReadmeRenderer: Send + Sync {
    fn render(&self, markup: &str) -> String;
}

/// Returns readme text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRenderer;

impl ReadmeRenderer for PassthroughRenderer {
    fn render(&self, markup: &str) -> String {
        markup.to_string()
    }
}

/// Renders Markdown readmes to HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl ReadmeRenderer for MarkdownRenderer {
    fn render(&self, markup: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut out = String::with_capacity(markup.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markup, options));
        out
    }
}

/// Where the readme of a [`PackageInfo`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadmeSource {
    /// Read from this file next to the manifest.
    File(PathBuf),
    /// The manifest's own `readme` field.
    Embedded,
    /// No readme could be found.
    #[default]
    Missing,
}

/// A package manifest with its readme expanded.
///
/// Serializes as the manifest document alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PackageInfo {
    #[serde(skip)]
    pub dir: PathBuf,
    #[serde(skip)]
    pub readme: ReadmeSource,
    pub manifest: Manifest,
}

/// Directory of the package addressed by `path`, starting at `root` and
/// descending one `node_modules/` level per segment.
#[must_use]
pub fn dependency_dir(root: &Path, path: &[PackageSpec]) -> PathBuf {
    path.iter()
        .fold(root.to_path_buf(), |dir, spec| spec.install_dir(&dir))
}

/// Fill in `manifest`'s readme, rendered through `renderer`.
///
/// The file named by `readmeFilename` (default `README.md`) is preferred; the
/// embedded `readme` text is the fallback. Only the file name component of
/// `readmeFilename` is used, so the lookup stays inside `dir`.
///
/// # Errors
/// Returns `PKG_README_NOT_FOUND` if neither source is available. The manifest
/// is left untouched in that case.
pub async fn expand_readme(
    reader: &dyn ManifestReader,
    renderer: &dyn ReadmeRenderer,
    dir: &Path,
    manifest: &mut Manifest,
) -> Result<ReadmeSource, PkgError> {
    let file_name = manifest
        .readme_filename()
        .and_then(|name| Path::new(name).file_name())
        .map_or_else(|| DEFAULT_README.into(), ToOwned::to_owned);
    let readme_path = dir.join(file_name);

    if let Some(text) = reader.read_readme(&readme_path).await {
        manifest.set_readme(renderer.render(&text));
        return Ok(ReadmeSource::File(readme_path));
    }

    match manifest.readme().map(|embedded| renderer.render(embedded)) {
        Some(rendered) => {
            manifest.set_readme(rendered);
            Ok(ReadmeSource::Embedded)
        }
        None => Err(PkgError::readme_not_found(&readme_path)),
    }
}

/// Load the manifest in `dir` and expand its readme.
///
/// A missing readme is not an error; [`PackageInfo::readme`] is then
/// [`ReadmeSource::Missing`].
///
/// # Errors
/// Propagates the manifest read error (`PKG_MANIFEST_NOT_FOUND` or
/// `PKG_MANIFEST_INVALID`).
pub async fn load_package_info(
    reader: &dyn ManifestReader,
    renderer: &dyn ReadmeRenderer,
    dir: &Path,
) -> Result<PackageInfo, PkgError> {
    let mut manifest = reader.read(&dir.join(MANIFEST_FILE)).await?;

    let readme = match expand_readme(reader, renderer, dir, &mut manifest).await {
        Ok(source) => source,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "package has no readme");
            ReadmeSource::Missing
        }
    };

    Ok(PackageInfo {
        dir: dir.to_path_buf(),
        readme,
        manifest,
    })
}
