use anyhow::{Context, Result};
use disclosure_cache::{ContentProducer, FileProducer, TemplateProducer};
use disclosure_index::{builtin_catalog, load_catalog_file, MetadataIndex};
use disclosure_search::{EngineConfig, QueryOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the engine's inputs come from
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub catalog: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub budget: Option<i64>,
}

/// Config precedence: file (or defaults), then environment, then flags
pub fn resolve_config(options: &EngineOptions) -> Result<EngineConfig> {
    let base = match &options.config {
        Some(path) => read_config(path)?,
        None => EngineConfig::default(),
    };

    let mut config = base.with_env_overrides();
    if let Some(budget) = options.budget {
        config.budget = budget;
    }
    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config = if is_toml {
        EngineConfig::from_toml_str(&raw)?
    } else {
        EngineConfig::from_json_str(&raw)?
    };
    Ok(config)
}

pub fn load_index(catalog: Option<&Path>) -> Result<MetadataIndex> {
    let descriptors = match catalog {
        Some(path) => load_catalog_file(path)?,
        None => builtin_catalog()?,
    };

    let mut index = MetadataIndex::new();
    let summary = index.load(descriptors)?;
    log::debug!(
        "Index ready: {} descriptors, {:.1}K total weight",
        summary.total,
        summary.total_weight as f64 / 1000.0
    );
    Ok(index)
}

pub fn build_orchestrator(options: &EngineOptions) -> Result<QueryOrchestrator> {
    let config = resolve_config(options)?;
    let index = Arc::new(load_index(options.catalog.as_deref())?);

    let producer: Arc<dyn ContentProducer> = match &options.content_dir {
        Some(dir) => {
            log::debug!("Reading payloads from {}", dir.display());
            Arc::new(FileProducer::new(dir))
        }
        None => Arc::new(TemplateProducer),
    };

    Ok(QueryOrchestrator::with_producer(index, producer, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn budget_flag_wins_over_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "budget = 1000\npreview_length = 30\n").unwrap();

        let options = EngineOptions {
            config: Some(path.clone()),
            ..Default::default()
        };
        let config = resolve_config(&options).unwrap();
        assert_eq!(config.preview_length, 30);

        let options = EngineOptions {
            config: Some(path),
            budget: Some(123),
            ..Default::default()
        };
        assert_eq!(resolve_config(&options).unwrap().budget, 123);
    }

    #[test]
    fn builtin_index_loads() {
        let index = load_index(None).unwrap();
        assert_eq!(index.len(), 7);
    }
}
