//! # Disclosure Cache
//!
//! The on-demand half of progressive disclosure. Full payloads are produced
//! the first time they are asked for and kept for the life of the cache.
//!
//! ## Flow
//!
//! ```text
//! materialize(id)
//!     │
//!     ├──> entry present?  ── yes ──> content (no side effects)
//!     │
//!     ├──> MetadataIndex::get(id) ── none ──> NotFound
//!     │
//!     ├──> production in flight? ── yes ──> wait, share its Ok / Err
//!     │
//!     └──> claim the slot
//!            ├─ ContentProducer::produce (once per id)
//!            ├─ store CacheEntry + append AccessLogRecord (one lock)
//!            └─ publish the outcome to waiters
//! ```

mod cache;
mod error;
mod producer;

pub use cache::{AccessLogRecord, CacheEntry, CacheStatistics, ContentCache, PreloadReport};
pub use error::{CacheError, ProductionError, Result};
pub use producer::{ContentProducer, FileProducer, TemplateProducer};
