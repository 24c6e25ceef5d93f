//! External registry collaborators for tagbook.
//!
//! This crate is the I/O boundary of the pipeline: listing published tags for
//! a registry coordinate (skopeo run in a container), exchanging registry
//! credentials for a short-lived bearer token, and resolving a tag to its
//! immutable content digest via the manifest endpoint. Every failure here is
//! fatal to the run — nothing is retried or defaulted.

pub mod client;
pub mod coordinate;
pub mod source;

pub use client::{RegistryClient, MANIFEST_MEDIA_TYPES, TOKEN_TTL};
pub use coordinate::RegistryCoordinate;
pub use source::SkopeoTagSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("authentication failed for repository '{repository}': {reason}")]
    Authentication { repository: String, reason: String },
    #[error("digest resolution failed for '{reference}': {reason}")]
    DigestResolution { reference: String, reason: String },
    #[error("tag listing failed for '{coordinate}': {reason}")]
    TagListing { coordinate: String, reason: String },
    #[error("tag source returned no tags for '{coordinate}'")]
    EmptyTagSource { coordinate: String },
    #[error("invalid registry coordinate '{0}': expected 'host/repository'")]
    InvalidCoordinate(String),
}

/// Source of the raw tag list for a registry coordinate.
pub trait TagSource: Send + Sync {
    fn list_tags(&self, coordinate: &RegistryCoordinate) -> Result<Vec<String>, RegistryError>;
}

/// Maps a chosen tag to its registry-assigned content digest.
pub trait DigestResolver: Send + Sync {
    fn resolve_digest(&self, tag: &str) -> Result<String, RegistryError>;
}
