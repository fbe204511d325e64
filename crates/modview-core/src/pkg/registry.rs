//! npm registry client.

use super::error::PkgError;
use super::spec::PackageSpec;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Environment variable to override registry URL.
pub const REGISTRY_ENV: &str = "MODVIEW_NPM_REGISTRY";

/// Remote package metadata lookup.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Metadata document of one published version of `spec`.
    ///
    /// Without a version in `spec` the `latest` dist-tag is used. A version
    /// may also name a dist-tag (`next`, `beta`, ...).
    async fn view(&self, spec: &PackageSpec) -> Result<Value, PkgError>;
}

/// Registry client for fetching package metadata.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    http: Client,
}

impl RegistryClient {
    /// Create a new registry client with the given base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, PkgError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| PkgError::registry(format!("Invalid registry URL '{base_url}': {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("modview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PkgError::registry(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Create a client using the registry URL from environment or default.
    ///
    /// # Errors
    /// Returns an error if the client cannot be created.
    pub fn from_env() -> Result<Self, PkgError> {
        let url = std::env::var(REGISTRY_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY.to_string());
        Self::new(&url)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the packument (package metadata) for a package.
    ///
    /// # Errors
    /// Returns an error if the request fails or the package is not found.
    pub async fn fetch_packument(&self, spec: &PackageSpec) -> Result<Value, PkgError> {
        let url = self.base_url.join(&spec.url_encoded_name()).map_err(|e| {
            PkgError::registry(format!("Failed to build URL for '{}': {e}", spec.name))
        })?;

        debug!(url = %url, "fetching packument");
        let response = self.http.get(url.as_str()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PkgError::not_found(&spec.name));
        }

        if !response.status().is_success() {
            return Err(PkgError::registry(format!(
                "Registry returned status {} for '{}'",
                response.status(),
                spec.name
            )));
        }

        let json: Value = response.json().await?;
        Ok(json)
    }
}

#[async_trait]
impl RegistryLookup for RegistryClient {
    async fn view(&self, spec: &PackageSpec) -> Result<Value, PkgError> {
        let packument = self.fetch_packument(spec).await?;
        select_version(&packument, spec)
    }
}

/// Extract the latest version from a packument.
#[must_use]
pub fn get_latest_version(packument: &Value) -> Option<&str> {
    packument.get("dist-tags")?.get("latest")?.as_str()
}

/// Pick the version document `spec` asks for out of a packument.
///
/// The packument-level `readme` is copied into the result when the version
/// document has none, since the registry usually only stores it at the top.
///
/// # Errors
/// Returns `PKG_VERSION_NOT_FOUND` if neither a version nor a dist-tag matches.
pub fn select_version(packument: &Value, spec: &PackageSpec) -> Result<Value, PkgError> {
    let requested = spec.version.as_deref().unwrap_or("latest");

    let version = packument
        .get("dist-tags")
        .and_then(|tags| tags.get(requested))
        .and_then(Value::as_str)
        .unwrap_or(requested);

    let mut doc = packument
        .get("versions")
        .and_then(|versions| versions.get(version))
        .filter(|doc| doc.is_object())
        .cloned()
        .ok_or_else(|| PkgError::version_not_found(&spec.name, requested))?;

    if let (Some(obj), Some(readme)) = (doc.as_object_mut(), packument.get("readme")) {
        obj.entry("readme").or_insert_with(|| readme.clone());
    }

    Ok(doc)
}
