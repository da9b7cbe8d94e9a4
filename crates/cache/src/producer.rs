use crate::error::ProductionError;
use async_trait::async_trait;
use disclosure_index::Descriptor;
use std::path::{Path, PathBuf};

const DEFAULT_CONTENT_FILE: &str = "SKILL.md";

/// Source of full payloads.
///
/// The cache never has two calls for one identifier in flight, and never
/// calls again once an identifier is stored. There is no timeout here; wrap
/// the producer if a call needs one.
#[async_trait]
pub trait ContentProducer: Send + Sync {
    async fn produce(&self, descriptor: &Descriptor) -> Result<String, ProductionError>;
}

/// Renders a markdown document straight from the descriptor
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateProducer;

#[async_trait]
impl ContentProducer for TemplateProducer {
    async fn produce(&self, descriptor: &Descriptor) -> Result<String, ProductionError> {
        Ok(render_markdown(descriptor))
    }
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn render_markdown(descriptor: &Descriptor) -> String {
    format!(
        "# {name}\n\
         \n\
         ## Description\n\
         {description}\n\
         \n\
         ## Tags\n\
         {tags}\n\
         \n\
         ## Prerequisites\n\
         {prerequisites}\n\
         \n\
         ## Content\n\
         \n\
         Full material for {name}: walkthroughs, code samples, practices,\n\
         common pitfalls and references.\n\
         \n\
         ## Related\n\
         {related}\n\
         \n\
         ---\n\
         \n\
         About {weight} tokens.\n",
        name = descriptor.name,
        description = descriptor.description,
        tags = join_or(&descriptor.tags, "none"),
        prerequisites = join_or(&descriptor.prerequisites, "none"),
        related = join_or(&descriptor.related, "none"),
        weight = descriptor.weight,
    )
}

/// Reads payloads from a content directory.
///
/// Uses `root/<source>` when the descriptor names a source, else
/// `root/<id>/SKILL.md`.
#[derive(Debug, Clone)]
pub struct FileProducer {
    root: PathBuf,
}

impl FileProducer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, descriptor: &Descriptor) -> PathBuf {
        match &descriptor.source {
            Some(source) => self.root.join(source),
            None => self.root.join(&descriptor.id).join(DEFAULT_CONTENT_FILE),
        }
    }
}

#[async_trait]
impl ContentProducer for FileProducer {
    async fn produce(&self, descriptor: &Descriptor) -> Result<String, ProductionError> {
        let path = self.path_for(descriptor);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| ProductionError::new(format!("read {}: {err}", path.display())))
    }
}
