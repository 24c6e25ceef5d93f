use super::{json_pretty, EXIT_SUCCESS};
use console::Style;
use std::path::PathBuf;
use tagbook_core::{CoreError, Engine, RunConfig};
use tagbook_registry::{RegistryClient, SkopeoTagSource};

#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub registry: Option<String>,
    pub pattern: Option<String>,
    pub image_types: Vec<String>,
    pub distributions: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub min_major: Option<u32>,
    pub config: Option<PathBuf>,
    pub skopeo_image: Option<String>,
}

/// Resolve the effective run configuration: file values (or defaults) with
/// explicitly passed flags layered on top.
fn resolve_config(args: &GenerateArgs) -> Result<RunConfig, String> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path).map_err(|e| match e {
            CoreError::Io(io) => format!("failed to read config file: {io}"),
            other => other.to_string(),
        })?,
        None => RunConfig::default(),
    };

    if let Some(registry) = &args.registry {
        config.registry = registry.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.pattern = pattern.clone();
    }
    if !args.image_types.is_empty() {
        config.image_types = args.image_types.clone();
    }
    if !args.distributions.is_empty() {
        config.distributions = args.distributions.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(min_major) = args.min_major {
        config.min_major = min_major;
    }
    Ok(config)
}

pub fn run(args: &GenerateArgs, json: bool) -> Result<u8, String> {
    let config = resolve_config(args)?;

    let source = match &args.skopeo_image {
        Some(image) => SkopeoTagSource::with_image(image.clone()),
        None => SkopeoTagSource::new(),
    };
    let coordinate = config.registry.parse().map_err(|e| format!("{e}"))?;
    let resolver = RegistryClient::new(coordinate);

    let report = Engine::new(config)
        .run(&source, &resolver)
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        for file in &report.catalogs {
            println!("{} {file}", Style::new().green().apply_to("generated"));
        }
        println!(
            "{} {} ({} catalogs) in {}",
            Style::new().green().apply_to("generated"),
            report.index,
            report.catalogs.len(),
            report.output_dir.display()
        );
    }
    Ok(EXIT_SUCCESS)
}
