//! # Disclosure Search
//!
//! Budget-aware query handling on top of the metadata index and the content
//! cache.
//!
//! ## Pipeline
//!
//! ```text
//! query, budget
//!     │
//!     ├──> MetadataIndex::search      (metadata only, cheap)
//!     │      └─ empty → QueryStats { no_matches: true, .. }
//!     │
//!     ├──> BudgetSelector             (pure, ascending-weight greedy)
//!     │
//!     ├──> ContentCache::materialize  (per selected item, failures counted)
//!     │
//!     └──> QueryStats                 (query counters + cache totals)
//! ```

mod budget;
mod config;
mod error;
mod orchestrator;
mod stats;

pub use budget::{select, select_with_report, BudgetSelector, Selection, Weighted};
pub use config::{EngineConfig, DEFAULT_BUDGET, DEFAULT_PREVIEW_LENGTH};
pub use error::{Result, SearchError};
pub use orchestrator::QueryOrchestrator;
pub use stats::{MaterializedItem, QueryOutcome, QueryPhase, QueryStats};
