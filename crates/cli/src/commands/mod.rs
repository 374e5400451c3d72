pub mod check;
pub mod generate;
pub mod map;

use anyhow::{Context, Result};
use dimark_core::{Compilation, ConfigTrait, GeneratorConfig};
use std::path::Path;

/// Read a compilation snapshot from a `.json`, `.yaml` or `.yml` file
pub fn load_compilation(input: &Path) -> Result<Compilation> {
    let compilation = Compilation::load(input)
        .with_context(|| format!("failed to load compilation from {}", input.display()))?;
    tracing::info!(
        "Loaded compilation '{}' from {}",
        compilation.assembly_name(),
        input.display()
    );
    Ok(compilation)
}

/// Configuration from `--config` when given, else defaults plus `DIMARK_*`
/// variables
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GeneratorConfig::from_env().context("invalid DIMARK_* configuration")?,
    };

    let mut sources: Vec<_> = config.config_sources().into_iter().collect();
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    for (field, source) in sources {
        tracing::debug!("config {} from {}", field, source);
    }
    Ok(config)
}
