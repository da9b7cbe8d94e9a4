use serde::{Deserialize, Serialize};

/// Lightweight, always-resident description of one loadable item
///
/// The `prerequisites` and `related` lists are advisory data. They may name
/// identifiers the index has never seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Unique key within one index
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-text description (also the preview source)
    #[serde(default)]
    pub description: String,

    /// Category tag
    #[serde(default)]
    pub category: String,

    /// Keyword tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Declared cost of the full payload (estimated tokens)
    #[serde(alias = "estimated_tokens")]
    pub weight: u64,

    #[serde(default)]
    pub prerequisites: Vec<String>,

    #[serde(default)]
    pub related: Vec<String>,

    /// Relative location of the payload, for file-backed producers
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "file_path")]
    pub source: Option<String>,
}

impl Descriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            tags: Vec::new(),
            weight,
            prerequisites: Vec::new(),
            related: Vec::new(),
            source: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_prerequisites<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_related<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Case-insensitive substring match against name, description and tags.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// A descriptor that matched a search, carrying what ranking needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub weight: u64,
}

impl From<&Descriptor> for Candidate {
    fn from(descriptor: &Descriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            weight: descriptor.weight,
        }
    }
}

/// Listing row: the descriptor without its graph and source fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub weight: u64,
}

impl From<&Descriptor> for DescriptorSummary {
    fn from(descriptor: &Descriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            category: descriptor.category.clone(),
            weight: descriptor.weight,
        }
    }
}

/// Report produced by a successful bulk load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Descriptors held after the load
    pub total: usize,

    /// Sum of declared weights after the load
    pub total_weight: u64,

    /// Time spent validating and inserting
    pub load_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_any_field() {
        let descriptor = Descriptor::new("tool-design", "Tool Design", 3000)
            .with_description("Designing interfaces agents can use")
            .with_tags(["tools", "API"]);

        assert!(descriptor.matches_lowercase("tool"));
        assert!(descriptor.matches_lowercase("interfaces"));
        assert!(descriptor.matches_lowercase("api"));
        assert!(!descriptor.matches_lowercase("memory"));
    }

    #[test]
    fn catalog_aliases_are_accepted() {
        let raw = r#"{"id":"a","name":"A","estimated_tokens":12,"file_path":"a/SKILL.md"}"#;
        let descriptor: Descriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(descriptor.weight, 12);
        assert_eq!(descriptor.source.as_deref(), Some("a/SKILL.md"));
        assert!(descriptor.tags.is_empty());
    }
}
