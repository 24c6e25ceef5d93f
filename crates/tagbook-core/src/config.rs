use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base version pattern for the default image family: a major, then exactly
/// one of a minor or a pre-release qualifier, then a 12-digit build
/// timestamp. The first capture group is the major version.
pub const DEFAULT_PATTERN: &str = r"(\d+)(?:\.\d+|beta\d+|rc\d+|alpha\d+)-(\d{12})";

/// Everything one run is parameterized by.
///
/// Loadable from a TOML file; any omitted field falls back to the defaults,
/// which reproduce the published postgresql catalogs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RunConfig {
    /// Registry coordinate, `host/repository`.
    pub registry: String,
    /// Base tag pattern; anchored together with the combination suffix.
    pub pattern: String,
    pub image_types: Vec<String>,
    pub distributions: Vec<String>,
    /// Majors below this never appear in output.
    pub min_major: u32,
    pub output_dir: PathBuf,
    /// Artifact family name, used in metadata names and labels.
    pub family: String,
    pub publisher: String,
    pub api_version: String,
    pub kind: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            registry: "ghcr.io/cloudnative-pg/postgresql".to_owned(),
            pattern: DEFAULT_PATTERN.to_owned(),
            image_types: vec![
                "minimal".to_owned(),
                "standard".to_owned(),
                "system".to_owned(),
            ],
            distributions: vec![
                "bullseye".to_owned(),
                "bookworm".to_owned(),
                "trixie".to_owned(),
            ],
            min_major: 13,
            output_dir: PathBuf::from("."),
            family: "postgresql".to_owned(),
            publisher: "cloudnative-pg".to_owned(),
            api_version: "postgresql.cnpg.io/v1".to_owned(),
            kind: "ClusterImageCatalog".to_owned(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_the_published_catalog_parameters() {
        let config = RunConfig::default();
        assert_eq!(config.registry, "ghcr.io/cloudnative-pg/postgresql");
        assert_eq!(config.min_major, 13);
        assert_eq!(config.image_types.len(), 3);
        assert_eq!(config.distributions.len(), 3);
    }

    #[test]
    fn partial_file_fills_missing_fields_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagbook.toml");
        std::fs::write(
            &path,
            r#"
registry = "ghcr.io/example/postgis"
min_major = 14
image_types = ["standard"]
"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.registry, "ghcr.io/example/postgis");
        assert_eq!(config.min_major, 14);
        assert_eq!(config.image_types, vec!["standard".to_owned()]);
        // untouched fields keep their defaults
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.family, "postgresql");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagbook.toml");
        std::fs::write(&path, "registery = \"typo\"\n").unwrap();
        assert!(matches!(
            RunConfig::load(&path),
            Err(CoreError::ParseToml(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            RunConfig::load(Path::new("/nonexistent/tagbook.toml")),
            Err(CoreError::Io(_))
        ));
    }
}
