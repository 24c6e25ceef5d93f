//! Tag version grammar and ordering for tagbook.
//!
//! This crate defines the normalization layer: parsing a raw image tag (with
//! its type/distribution suffix already stripped) into a structurally
//! comparable [`ParsedVersion`], and the total order used to pick the newest
//! tag per major version. Ordering is derived from the structured value, never
//! from the raw string, so equal versions compare equal deterministically.

pub mod version;

pub use version::{ParsedVersion, PreKind, PreRelease, ReleaseSegment, VersionError};
