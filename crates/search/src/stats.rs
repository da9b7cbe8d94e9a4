use disclosure_cache::CacheStatistics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Steps of one query; each starts only after the previous one finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPhase {
    Searching,
    Selecting,
    Materializing,
    Done,
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Searching => "searching",
            Self::Selecting => "selecting",
            Self::Materializing => "materializing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Flat per-query report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStats {
    pub query: String,
    pub budget: i64,

    /// Set when the search matched nothing; every counter is then zero
    pub no_matches: bool,

    /// Candidates returned by the index search
    pub matched: usize,

    /// Sum of the matched candidates' weights
    pub candidate_weight: u64,

    /// Whether the matches together exceeded the budget
    pub over_budget: bool,

    pub selected: usize,
    pub selected_weight: u64,
    pub selected_ids: Vec<String>,

    /// Selected items whose content is now available
    pub materialized: usize,

    /// Soft failures: ids the cache could not resolve
    pub not_found: usize,

    /// Soft failures: ids whose producer call failed
    pub production_failed: usize,

    pub failed_ids: Vec<String>,

    // Cumulative cache state after this query
    pub total_known: usize,
    pub total_cached: usize,
    pub total_cached_bytes: usize,
    pub access_count: usize,
    pub total_latency_ms: f64,

    /// Wall time spent on this query
    pub query_latency_ms: f64,
}

impl QueryStats {
    pub(crate) fn no_matches(query: &str, budget: i64) -> Self {
        Self {
            query: query.to_string(),
            budget,
            no_matches: true,
            ..Default::default()
        }
    }

    pub(crate) fn absorb_cache(&mut self, cache: CacheStatistics) {
        self.total_known = cache.total_known;
        self.total_cached = cache.total_cached;
        self.total_cached_bytes = cache.total_cached_bytes;
        self.access_count = cache.access_count;
        self.total_latency_ms = cache.total_latency_ms;
    }

    pub fn failures(&self) -> usize {
        self.not_found + self.production_failed
    }
}

/// A selected item's materialized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedItem {
    pub id: String,
    pub content: Arc<str>,
}

/// Stats plus the payloads that were materialized, in selection order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub stats: QueryStats,
    pub contents: Vec<MaterializedItem>,
}
