use modview_util::fs::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the projects config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "modview.json";

/// Environment variable to override the projects config path.
pub const CONFIG_ENV: &str = "MODVIEW_CONFIG";

/// Runtime configuration for the modview CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Explicit projects config path (`--config`), if any.
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            config_path: None,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set an explicit projects config path.
    #[must_use]
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Resolve the projects config file location.
    ///
    /// Precedence: explicit path, then `MODVIEW_CONFIG`, then `modview.json` in `cwd`.
    /// Relative paths are taken relative to `cwd`.
    #[must_use]
    pub fn projects_config_path(&self) -> PathBuf {
        let chosen = self
            .config_path
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        absolutize(&self.cwd, &chosen)
    }
}

/// Join `path` onto `base` unless it is already absolute, then drop `.`
/// and `..` components.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}
