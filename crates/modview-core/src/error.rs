use std::path::PathBuf;
use thiserror::Error;

/// Core error type for modview operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("No projects configured in {path}")]
    NoProjects { path: PathBuf },

    /// The root manifest of a project could not be loaded.
    #[error("Failed to load project manifest at {path}: {source}")]
    Lookup {
        path: PathBuf,
        #[source]
        source: crate::pkg::PkgError,
    },

    #[error(transparent)]
    Pkg(#[from] crate::pkg::PkgError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ConfigRead { .. } | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                "CONFIG_INVALID"
            }
            Self::NoProjects { .. } => "CONFIG_NO_PROJECTS",
            Self::Lookup { source, .. } | Self::Pkg(source) => source.code(),
            Self::Other(_) => "ERROR",
        }
    }

    /// Whether this is a configuration failure (missing, unreadable or invalid config).
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigInvalid { .. }
                | Self::NoProjects { .. }
        )
    }
}
