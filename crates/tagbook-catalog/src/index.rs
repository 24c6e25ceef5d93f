use crate::CatalogError;
use serde::Serialize;

/// The per-run index: a Kustomization listing every generated catalog file,
/// sorted lexicographically so the document is stable regardless of the
/// (image-type, distribution) iteration order that produced the files.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogIndex {
    pub api_version: String,
    pub kind: String,
    pub resources: Vec<String>,
}

impl CatalogIndex {
    pub const API_VERSION: &'static str = "kustomize.config.k8s.io/v1beta1";
    pub const KIND: &'static str = "Kustomization";
    pub const FILE_NAME: &'static str = "kustomization.yaml";

    pub fn new(mut resources: Vec<String>) -> Self {
        resources.sort();
        Self {
            api_version: Self::API_VERSION.to_owned(),
            kind: Self::KIND.to_owned(),
            resources,
        }
    }

    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
