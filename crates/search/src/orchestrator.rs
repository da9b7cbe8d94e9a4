use crate::budget::BudgetSelector;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::stats::{MaterializedItem, QueryOutcome, QueryPhase, QueryStats};
use disclosure_cache::{CacheError, CacheStatistics, ContentCache, ContentProducer, PreloadReport};
use disclosure_index::MetadataIndex;
use std::sync::Arc;
use std::time::Instant;

/// Search → budget selection → materialization, one query at a time.
///
/// Queries are independent of each other apart from the shared cache.
pub struct QueryOrchestrator {
    index: Arc<MetadataIndex>,
    cache: Arc<ContentCache>,
    selector: BudgetSelector,
    config: EngineConfig,
}

impl QueryOrchestrator {
    /// `cache` is expected to wrap `index`. Selected ids the cache's own index
    /// does not know are counted as `not_found` soft failures.
    pub fn new(index: Arc<MetadataIndex>, cache: Arc<ContentCache>, config: EngineConfig) -> Self {
        Self {
            index,
            cache,
            selector: BudgetSelector,
            config,
        }
    }

    /// Build the cache over `index` with `producer`
    pub fn with_producer(
        index: Arc<MetadataIndex>,
        producer: Arc<dyn ContentProducer>,
        config: EngineConfig,
    ) -> Self {
        let cache = Arc::new(ContentCache::new(Arc::clone(&index), producer));
        Self::new(index, cache, config)
    }

    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn handle_query(&self, query: &str, budget: i64) -> QueryStats {
        self.materialize_contents(query, budget).await.stats
    }

    /// [`QueryOrchestrator::handle_query`] with the configured budget
    pub async fn handle_query_default(&self, query: &str) -> QueryStats {
        self.handle_query(query, self.config.budget).await
    }

    /// Run a query and keep the materialized payloads.
    ///
    /// `NotFound` and `ProductionFailed` for one item are counted in the
    /// stats and the loop moves on to the next selected item.
    pub async fn materialize_contents(&self, query: &str, budget: i64) -> QueryOutcome {
        let start = Instant::now();

        log::debug!("Query '{query}': {}", QueryPhase::Searching);
        let candidates = self.index.search(query);
        if candidates.is_empty() {
            log::info!("Query '{query}': no relevant items");
            log::debug!("Query '{query}': {}", QueryPhase::Done);
            let mut stats = QueryStats::no_matches(query, budget);
            stats.query_latency_ms = elapsed_ms(start);
            return QueryOutcome {
                stats,
                contents: Vec::new(),
            };
        }

        log::debug!("Query '{query}': {}", QueryPhase::Selecting);
        let selection = self.selector.select_with_report(&candidates, budget);
        let candidate_weight = candidates
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.weight));
        if selection.over_budget {
            log::info!(
                "Query '{query}': {candidate_weight} weight exceeds budget {budget}, keeping {}/{} items",
                selection.selected.len(),
                candidates.len()
            );
        }

        let mut stats = QueryStats {
            query: query.to_string(),
            budget,
            matched: candidates.len(),
            candidate_weight,
            over_budget: selection.over_budget,
            selected: selection.selected.len(),
            selected_weight: selection.total_weight,
            selected_ids: selection.selected.iter().map(|c| c.id.clone()).collect(),
            ..Default::default()
        };

        log::debug!("Query '{query}': {}", QueryPhase::Materializing);
        let mut contents = Vec::with_capacity(selection.selected.len());
        for candidate in &selection.selected {
            match self.cache.materialize(&candidate.id).await {
                Ok(content) => {
                    stats.materialized += 1;
                    contents.push(MaterializedItem {
                        id: candidate.id.clone(),
                        content,
                    });
                }
                Err(err) => {
                    log::warn!("Query '{query}': {err}");
                    match err {
                        CacheError::NotFound(_) => stats.not_found += 1,
                        CacheError::ProductionFailed { .. } => stats.production_failed += 1,
                    }
                    stats.failed_ids.push(candidate.id.clone());
                }
            }
        }

        stats.absorb_cache(self.cache.statistics());
        stats.query_latency_ms = elapsed_ms(start);
        log::debug!("Query '{query}': {}", QueryPhase::Done);
        log::info!(
            "Query '{query}': matched {}, selected {}, materialized {}, failed {}",
            stats.matched,
            stats.selected,
            stats.materialized,
            stats.failures()
        );

        QueryOutcome { stats, contents }
    }

    /// Preview at the configured length
    pub fn preview(&self, id: &str) -> Result<String> {
        self.preview_with_length(id, self.config.preview_length)
    }

    pub fn preview_with_length(&self, id: &str, max_length: usize) -> Result<String> {
        Ok(self.index.preview(id, max_length)?)
    }

    pub async fn preload<I, S>(&self, ids: I) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cache.preload(ids).await
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
