#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Core library for modview: inspects the installed `node_modules` trees of
//! local projects and reconciles them against their package.json manifests.

pub mod browser;
pub mod config;
pub mod error;
pub mod pkg;
pub mod project;
pub mod version;

pub use browser::{InfoQuery, ModuleBrowser, ModuleList, REGISTRY_NAME_SUFFIX};
pub use config::Config;
pub use error::Error;
pub use project::{ProjectId, ProjectList, ProjectRecord, ProjectStore, ProjectsConfig};
pub use version::VERSION;
