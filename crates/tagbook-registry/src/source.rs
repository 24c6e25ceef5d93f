use crate::{RegistryCoordinate, RegistryError, TagSource};
use serde::Deserialize;
use std::process::Command;
use tracing::debug;

/// Container image providing the skopeo binary.
pub const SKOPEO_IMAGE: &str = "quay.io/skopeo/stable";

/// Lists published tags by running `skopeo list-tags` inside a container.
///
/// Nothing here interprets the tags; the raw list is handed to the filter,
/// which expects plenty of irrelevant entries.
#[derive(Debug, Clone)]
pub struct SkopeoTagSource {
    skopeo_image: String,
}

impl SkopeoTagSource {
    pub fn new() -> Self {
        Self {
            skopeo_image: SKOPEO_IMAGE.to_owned(),
        }
    }

    /// Use an alternative skopeo container image.
    #[must_use]
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            skopeo_image: image.into(),
        }
    }
}

impl Default for SkopeoTagSource {
    fn default() -> Self {
        Self::new()
    }
}

/// skopeo's `list-tags` JSON shape.
#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(rename = "Tags")]
    tags: Vec<String>,
}

fn parse_tag_list(bytes: &[u8], coordinate: &RegistryCoordinate) -> Result<Vec<String>, RegistryError> {
    let list: TagList =
        serde_json::from_slice(bytes).map_err(|e| RegistryError::TagListing {
            coordinate: coordinate.to_string(),
            reason: format!("malformed tag listing: {e}"),
        })?;
    Ok(list.tags)
}

impl TagSource for SkopeoTagSource {
    fn list_tags(&self, coordinate: &RegistryCoordinate) -> Result<Vec<String>, RegistryError> {
        let reference = format!("docker://{coordinate}");
        debug!("listing tags for {reference} via {}", self.skopeo_image);

        let listing_err = |reason: String| RegistryError::TagListing {
            coordinate: coordinate.to_string(),
            reason,
        };

        let output = Command::new("docker")
            .args(["run", "--rm", &self.skopeo_image, "list-tags", &reference])
            .output()
            .map_err(|e| listing_err(format!("failed to launch docker: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(listing_err(format!(
                "skopeo exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_tag_list(&output.stdout, coordinate)
    }
}
