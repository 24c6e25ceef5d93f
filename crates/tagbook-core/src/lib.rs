//! Run orchestration for tagbook.
//!
//! This crate ties the pure catalog pipeline to the registry collaborators:
//! the `Engine` processes one (image-type, distribution) combination at a
//! time — filter, select, resolve digests, build, write — then emits the
//! Kustomization index covering the whole run. `RunConfig` carries everything
//! the original script variants hard-coded: registry coordinate, tag pattern,
//! label values, and the supported-major threshold.

pub mod config;
pub mod engine;

pub use config::{RunConfig, DEFAULT_PATTERN};
pub use engine::{Engine, RunReport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("catalog error: {0}")]
    Catalog(#[from] tagbook_catalog::CatalogError),
    #[error("registry error: {0}")]
    Registry(#[from] tagbook_registry::RegistryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}
