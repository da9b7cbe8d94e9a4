//! # Disclosure Index
//!
//! The always-resident half of progressive disclosure: a small metadata
//! index that answers listing, search and preview without ever touching the
//! full payloads.
//!
//! ## Architecture
//!
//! ```text
//! Catalog (JSON / TOML / built-in)
//!     │
//!     └──> MetadataIndex::load (all-or-nothing, duplicate ids rejected)
//!            ├─ list / summaries / get
//!            ├─ search   → Candidate[] (insertion order)
//!            ├─ preview  → truncated description
//!            └─ prerequisites_of / related_of (advisory, dangling ids allowed)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use disclosure_index::{Descriptor, MetadataIndex};
//!
//! let index = MetadataIndex::from_descriptors(vec![
//!     Descriptor::new("tool-design", "Tool Design", 3000).with_tags(["tools"]),
//! ])
//! .unwrap();
//!
//! let hits = index.search("TOOLS");
//! assert_eq!(hits[0].id, "tool-design");
//! ```

mod catalog;
mod error;
mod index;
mod types;

pub use catalog::{builtin_catalog, load_catalog_file, load_catalog_json, load_catalog_toml, Catalog};
pub use error::{IndexError, Result};
pub use index::MetadataIndex;
pub use types::{Candidate, Descriptor, DescriptorSummary, IndexSummary};
