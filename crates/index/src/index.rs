use crate::error::{IndexError, Result};
use crate::types::{Candidate, Descriptor, DescriptorSummary, IndexSummary};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

const TRUNCATION_MARKER: &str = "...";

/// Metadata-only index over every known descriptor
///
/// Populated by [`MetadataIndex::load`] and read-only afterwards. Share it
/// behind an `Arc` once loading is done; no reader can observe a half-loaded
/// index because `load` needs `&mut self`.
#[derive(Debug, Default, Clone)]
pub struct MetadataIndex {
    descriptors: Vec<Descriptor>,
    positions: HashMap<String, usize>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a single batch
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        let mut index = Self::new();
        index.load(descriptors)?;
        Ok(index)
    }

    /// Bulk-load descriptors.
    ///
    /// The whole batch is validated before anything is inserted: on
    /// [`IndexError::DuplicateIdentifier`] the index is left as it was.
    pub fn load<I>(&mut self, descriptors: I) -> Result<IndexSummary>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        let start = Instant::now();
        let batch: Vec<Descriptor> = descriptors.into_iter().collect();

        let mut seen = HashSet::with_capacity(batch.len());
        for descriptor in &batch {
            if self.positions.contains_key(&descriptor.id) || !seen.insert(descriptor.id.as_str()) {
                log::warn!("Rejected catalog: duplicate identifier {}", descriptor.id);
                return Err(IndexError::DuplicateIdentifier(descriptor.id.clone()));
            }
        }

        self.descriptors.reserve(batch.len());
        for descriptor in batch {
            self.positions
                .insert(descriptor.id.clone(), self.descriptors.len());
            self.descriptors.push(descriptor);
        }

        let summary = IndexSummary {
            total: self.descriptors.len(),
            total_weight: self.total_weight(),
            load_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        log::info!(
            "Metadata index loaded: {} descriptors, {} total weight ({:.1} ms)",
            summary.total,
            summary.total_weight,
            summary.load_time_ms
        );
        Ok(summary)
    }

    /// All descriptors in insertion order
    pub fn list(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn summaries(&self) -> Vec<DescriptorSummary> {
        self.descriptors.iter().map(DescriptorSummary::from).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Descriptor> {
        self.positions.get(id).map(|&pos| &self.descriptors[pos])
    }

    /// Like [`MetadataIndex::get`], but unknown ids are an error
    pub fn require(&self, id: &str) -> Result<&Descriptor> {
        self.get(id)
            .ok_or_else(|| IndexError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.descriptors
            .iter()
            .fold(0u64, |acc, d| acc.saturating_add(d.weight))
    }

    /// Case-insensitive substring search over name, description and tags.
    ///
    /// Results keep insertion order. An empty result is not an error.
    pub fn search(&self, query: &str) -> Vec<Candidate> {
        let start = Instant::now();
        let needle = query.to_lowercase();
        let results: Vec<Candidate> = self
            .descriptors
            .iter()
            .filter(|d| d.matches_lowercase(&needle))
            .map(Candidate::from)
            .collect();

        log::debug!(
            "Search '{}': {} matches in {:.2} ms",
            query,
            results.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        results
    }

    pub fn by_category(&self, category: &str) -> Vec<&Descriptor> {
        let wanted = category.to_lowercase();
        self.descriptors
            .iter()
            .filter(|d| d.category.to_lowercase() == wanted)
            .collect()
    }

    /// Description truncated to `max_length` characters, with `...` appended
    /// when something was cut.
    pub fn preview(&self, id: &str, max_length: usize) -> Result<String> {
        let descriptor = self.require(id)?;
        Ok(truncate_chars(&descriptor.description, max_length))
    }

    /// Prerequisite ids of `id`; empty when `id` is unknown
    pub fn prerequisites_of(&self, id: &str) -> &[String] {
        self.get(id)
            .map(|d| d.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Related ids of `id`; empty when `id` is unknown
    pub fn related_of(&self, id: &str) -> &[String] {
        self.get(id).map(|d| d.related.as_slice()).unwrap_or(&[])
    }
}

fn truncate_chars(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
