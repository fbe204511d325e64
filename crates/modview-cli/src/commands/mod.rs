//! CLI command implementations.

pub mod info;
pub mod list;
pub mod projects;
pub mod serve;
pub mod version;

use modview_core::pkg::{ReadmeRenderer, RegistryClient};
use modview_core::{Config, Error, ModuleBrowser, ProjectStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Exit status for failed commands.
pub const EXIT_FAILURE: i32 = 2;

/// Failure result for JSON output (locked format: { ok, code, error }).
#[derive(Serialize)]
pub struct ErrorResult {
    pub ok: bool,
    pub code: &'static str,
    pub error: String,
}

impl ErrorResult {
    pub fn new(err: &Error) -> Self {
        Self {
            ok: false,
            code: err.code(),
            error: err.to_string(),
        }
    }
}

/// Load the configured projects.
pub fn open_store(config: &Config) -> Result<Arc<ProjectStore>, Error> {
    Ok(Arc::new(ProjectStore::load(config.projects_config_path())?))
}

/// Browser over the configured projects, with registry lookups when a
/// registry client can be built.
pub fn open_browser(
    config: &Config,
    renderer: Arc<dyn ReadmeRenderer>,
) -> Result<ModuleBrowser, Error> {
    let browser = ModuleBrowser::new(open_store(config)?).with_renderer(renderer);
    Ok(match RegistryClient::from_env() {
        Ok(client) => browser.with_registry(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "registry lookups disabled");
            browser
        }
    })
}

/// Report `err` on stdout (JSON) or stderr and exit with [`EXIT_FAILURE`].
pub fn fail(err: &Error, json: bool) -> ! {
    if json {
        print_json(&ErrorResult::new(err));
    } else {
        eprintln!("error: {err}");
    }
    std::process::exit(EXIT_FAILURE);
}

/// Pretty-print a JSON result on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("error: failed to serialize result: {e}"),
    }
}
