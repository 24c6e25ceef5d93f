use crate::CatalogError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A selected tag resolved to its immutable, registry-assigned content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub major: u32,
    pub tag: String,
    pub digest: String,
}

/// Static descriptive metadata stamped onto every generated catalog.
#[derive(Debug, Clone)]
pub struct CatalogMeta {
    pub api_version: String,
    pub kind: String,
    pub family: String,
    pub image_type: String,
    pub distribution: String,
    pub publisher: String,
    /// Calendar date only, so repeated same-day runs are byte-stable.
    pub generated_on: NaiveDate,
}

/// One generated catalog document. Field declaration order is serialization
/// order — `apiVersion` first, never alphabetized.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterImageCatalog {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CatalogSpec,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectMeta {
    pub name: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogSpec {
    pub images: Vec<CatalogImage>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogImage {
    pub major: u32,
    pub image: String,
}

/// Artifact filename for one (image-type, distribution) combination.
pub fn catalog_file_name(image_type: &str, distribution: &str) -> String {
    format!("catalog-{image_type}-{distribution}.yaml")
}

/// Assemble the catalog document for one combination.
///
/// Entries are emitted ascending by major — the presentation order, opposite
/// of the descending order selection sorts by internally. The full image
/// reference is `registry:tag@digest`.
pub fn build_catalog(
    meta: &CatalogMeta,
    registry: &str,
    entries: &[ResolvedEntry],
) -> ClusterImageCatalog {
    let mut ordered: Vec<&ResolvedEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.major);

    let images = ordered
        .into_iter()
        .map(|e| CatalogImage {
            major: e.major,
            image: format!("{registry}:{}@{}", e.tag, e.digest),
        })
        .collect();

    let mut labels = BTreeMap::new();
    labels.insert("app.kubernetes.io/managed-by".to_owned(), "tagbook".to_owned());
    labels.insert("tagbook.io/family".to_owned(), meta.family.clone());
    labels.insert("tagbook.io/type".to_owned(), meta.image_type.clone());
    labels.insert(
        "tagbook.io/distribution".to_owned(),
        meta.distribution.clone(),
    );
    labels.insert("tagbook.io/publisher".to_owned(), meta.publisher.clone());
    labels.insert(
        "tagbook.io/date".to_owned(),
        meta.generated_on.format("%Y-%m-%d").to_string(),
    );

    ClusterImageCatalog {
        api_version: meta.api_version.clone(),
        kind: meta.kind.clone(),
        metadata: ObjectMeta {
            name: format!(
                "{}-{}-{}",
                meta.family, meta.image_type, meta.distribution
            ),
            labels,
        },
        spec: CatalogSpec { images },
    }
}

impl ClusterImageCatalog {
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
