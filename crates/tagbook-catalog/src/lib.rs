//! Catalog generation pipeline for tagbook.
//!
//! This crate holds the pure (no I/O) middle of the pipeline: filtering raw
//! registry tags down to one (image-type, distribution) combination, selecting
//! the newest tag per major version, and assembling the `ClusterImageCatalog`
//! documents plus the `Kustomization` index that references them all.

pub mod build;
pub mod filter;
pub mod index;
pub mod select;

pub use build::{
    build_catalog, catalog_file_name, CatalogImage, CatalogMeta, CatalogSpec, ClusterImageCatalog,
    ObjectMeta, ResolvedEntry,
};
pub use filter::{filter_tags, is_pre_release_tag, TagPattern, PRE_RELEASE_MARKERS};
pub use index::CatalogIndex;
pub use select::select_newest_per_major;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid tag pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("tag pattern '{0}' has no major-version capture group")]
    MissingMajorGroup(String),
    #[error("tag '{tag}' matched the pattern but has a non-numeric major version")]
    InvalidMajor { tag: String },
    #[error(transparent)]
    Version(#[from] tagbook_version::VersionError),
    #[error("YAML serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
