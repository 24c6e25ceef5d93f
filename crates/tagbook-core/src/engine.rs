use crate::{CoreError, RunConfig};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tagbook_catalog::{
    build_catalog, catalog_file_name, filter_tags, select_newest_per_major, CatalogIndex,
    CatalogMeta, ResolvedEntry, TagPattern,
};
use tagbook_registry::{DigestResolver, RegistryCoordinate, RegistryError, TagSource};
use tracing::{debug, info};

/// Central orchestration for one generation run.
///
/// Combinations are processed fully sequentially — filtered, selected,
/// digest-resolved, written — before the next begins. The only state shared
/// across combinations is the resolver's token cache.
pub struct Engine {
    config: RunConfig,
    generated_on: NaiveDate,
}

/// Summary of a completed run, serializable for `--json` output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub output_dir: PathBuf,
    /// Catalog filenames in generation order.
    pub catalogs: Vec<String>,
    pub index: String,
}

impl Engine {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            generated_on: chrono::Utc::now().date_naive(),
        }
    }

    /// Pin the generation date. Output is date-stamped (not time-stamped) so
    /// same-day runs are byte-stable; tests pin it for full determinism.
    #[must_use]
    pub fn with_generation_date(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the full pipeline: list tags once, then per combination
    /// filter → select → resolve → build → write, then emit the index.
    pub fn run(
        &self,
        source: &dyn TagSource,
        resolver: &dyn DigestResolver,
    ) -> Result<RunReport, CoreError> {
        let coordinate: RegistryCoordinate = self.config.registry.parse()?;

        let tags = source.list_tags(&coordinate)?;
        if tags.is_empty() {
            // Zero tags is a misconfigured source, not "zero majors supported".
            return Err(RegistryError::EmptyTagSource {
                coordinate: coordinate.to_string(),
            }
            .into());
        }
        debug!("tag source returned {} tags for {coordinate}", tags.len());

        std::fs::create_dir_all(&self.config.output_dir)?;

        let mut catalogs = Vec::new();
        for image_type in &self.config.image_types {
            for distribution in &self.config.distributions {
                let pattern = TagPattern::new(&self.config.pattern, image_type, distribution)?;
                let filtered = filter_tags(&tags, &pattern);
                let selected = select_newest_per_major(&filtered, &pattern, self.config.min_major)?;

                let mut entries = Vec::with_capacity(selected.len());
                for (major, tag) in &selected {
                    let digest = resolver.resolve_digest(tag)?;
                    debug!("resolved {tag} -> {digest}");
                    entries.push(ResolvedEntry {
                        major: *major,
                        tag: tag.clone(),
                        digest,
                    });
                }

                let meta = CatalogMeta {
                    api_version: self.config.api_version.clone(),
                    kind: self.config.kind.clone(),
                    family: self.config.family.clone(),
                    image_type: image_type.clone(),
                    distribution: distribution.clone(),
                    publisher: self.config.publisher.clone(),
                    generated_on: self.generated_on,
                };
                let catalog = build_catalog(&meta, &self.config.registry, &entries);

                let file_name = catalog_file_name(image_type, distribution);
                std::fs::write(
                    self.config.output_dir.join(&file_name),
                    catalog.to_yaml()?,
                )?;
                info!("wrote {file_name} ({} majors)", entries.len());
                catalogs.push(file_name);
            }
        }

        let index = CatalogIndex::new(catalogs.clone());
        std::fs::write(
            self.config.output_dir.join(CatalogIndex::FILE_NAME),
            index.to_yaml()?,
        )?;
        info!(
            "wrote {} referencing {} catalogs",
            CatalogIndex::FILE_NAME,
            index.resources.len()
        );

        Ok(RunReport {
            output_dir: self.config.output_dir.clone(),
            catalogs,
            index: CatalogIndex::FILE_NAME.to_owned(),
        })
    }
}
