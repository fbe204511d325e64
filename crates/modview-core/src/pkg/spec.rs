//! Package spec parsing.
//!
//! Parses `name@version` tokens such as:
//! - `react`
//! - `react@18.2.0`
//! - `@types/node`
//! - `@types/node@20.1.0`
//!
//! and dependency paths made of such tokens joined by `|`
//! (`module1@0.0.0|module3@0.0.0`), which address a package nested inside
//! successive `node_modules/` directories.

use super::error::PkgError;
use super::walk::DEPS_DIR;
use std::path::{Path, PathBuf};

/// Separator between tokens of a dependency path.
pub const PATH_SEPARATOR: char = '|';

/// A parsed `name[@version]` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Full package name (e.g., "@scope/name" or "name").
    pub name: String,
    /// Scope without the @ prefix, if scoped.
    pub scope: Option<String>,
    /// Version as written in the token. Informational only; it is never
    /// checked against what is installed.
    pub version: Option<String>,
}

impl PackageSpec {
    /// Parse a single token.
    ///
    /// # Errors
    /// Returns `PKG_SPEC_INVALID` if the token is empty, malformed, or names
    /// something that is not a plain directory name.
    pub fn parse(input: &str) -> Result<Self, PkgError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(PkgError::spec_invalid("Empty package spec"));
        }

        if let Some(rest) = input.strip_prefix('@') {
            Self::parse_scoped(input, rest)
        } else {
            let (name, version) = split_version(input)?;
            validate_segment(name, input)?;
            Ok(Self {
                name: name.to_string(),
                scope: None,
                version,
            })
        }
    }

    /// Parse a `|`-separated dependency path.
    ///
    /// # Errors
    /// Returns `PKG_SPEC_INVALID` if the path is empty or any token is invalid.
    pub fn parse_path(path: &str) -> Result<Vec<Self>, PkgError> {
        if path.trim().is_empty() {
            return Err(PkgError::spec_invalid("Empty dependency path"));
        }
        path.split(PATH_SEPARATOR).map(Self::parse).collect()
    }

    fn parse_scoped(input: &str, rest: &str) -> Result<Self, PkgError> {
        let Some((scope, after_slash)) = rest.split_once('/') else {
            return Err(PkgError::spec_invalid(format!(
                "Invalid scoped package: missing '/' in '{input}'"
            )));
        };

        let (pkg_name, version) = split_version(after_slash)?;
        validate_segment(scope, input)?;
        validate_segment(pkg_name, input)?;

        Ok(Self {
            name: format!("@{scope}/{pkg_name}"),
            scope: Some(scope.to_string()),
            version,
        })
    }

    /// Check if this is a scoped package.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }

    /// Get the unscoped portion of the name.
    ///
    /// For `@scope/name`, returns `name`.
    /// For `react`, returns `react`.
    #[must_use]
    pub fn unscoped_name(&self) -> &str {
        if let Some(ref scope) = self.scope {
            &self.name[scope.len() + 2..]
        } else {
            &self.name
        }
    }

    /// Directory where this package is installed below `base`.
    #[must_use]
    pub fn install_dir(&self, base: &Path) -> PathBuf {
        let deps = base.join(DEPS_DIR);
        match &self.scope {
            Some(scope) => deps.join(format!("@{scope}")).join(self.unscoped_name()),
            None => deps.join(&self.name),
        }
    }

    /// URL-encode the package name for registry requests.
    ///
    /// For scoped packages, encodes the `/` as `%2F`.
    #[must_use]
    pub fn url_encoded_name(&self) -> String {
        if self.is_scoped() {
            self.name.replace('/', "%2F")
        } else {
            self.name.clone()
        }
    }
}

/// Split `name@version` at the first `@`. A trailing `@` is an error.
fn split_version(input: &str) -> Result<(&str, Option<String>), PkgError> {
    match input.split_once('@') {
        Some((_, "")) => Err(PkgError::spec_invalid(format!(
            "Invalid package spec: empty version in '{input}'"
        ))),
        Some((name, version)) => Ok((name, Some(version.to_string()))),
        None => Ok((input, None)),
    }
}

/// A name segment must be a single, non-special directory name.
fn validate_segment(segment: &str, input: &str) -> Result<(), PkgError> {
    if segment.is_empty() {
        return Err(PkgError::spec_invalid(format!(
            "Invalid package spec: empty name in '{input}'"
        )));
    }

    if segment == "." || segment == ".." {
        return Err(PkgError::spec_invalid(format!(
            "Invalid package name '{segment}' in '{input}'"
        )));
    }

    for c in segment.chars() {
        if !c.is_alphanumeric() && c != '-' && c != '_' && c != '.' && c != '~' {
            return Err(PkgError::spec_invalid(format!(
                "Invalid character '{c}' in package name '{input}'"
            )));
        }
    }

    Ok(())
}
