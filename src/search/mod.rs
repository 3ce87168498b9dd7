//! Full-text annotation search powered by Tantivy
//!
//! This module answers search requests against the annotation index:
//!
//! - **Composable queries**: filter primitives (AND-combined) and matcher
//!   primitives (OR-combined) appended in order to a query builder
//! - **Access control**: private annotations are only ever visible to their
//!   creator
//! - **Two-phase search**: top-level annotations in `rows`, with an optional
//!   second fetch collecting their replies
//! - **Pluggable extensions**: extra filter/matcher factories applied after
//!   the built-ins in registration order
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              SearchService                       │
//! │  - search()  (phase 1 rows, phase 2 replies)    │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │   Builder ── append_filter / append_matcher      │
//! │   build(params) -> Query (structured clauses)   │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │   IndexManager ── clause lowering, execution,    │
//! │   upsert/delete keyed by annotation id          │
//! └─────────────────────────────────────────────────┘
//! ```

mod config;
mod document;
mod error;
mod index;
mod params;
mod query;
mod service;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{build_annotation_schema, AnnotationDocument, SearchDocument};
pub use error::{SearchError, SearchResult};
pub use index::{IndexManager, IndexStats};
pub use params::{RequestContext, SearchParams, SearchSort, SortOrder};
pub use query::{
    AnyMatcher, AuthFilter, Builder, Clause, FragmentFactory, GroupFilter, Query, QueryFragment,
    RepliesMatcher, SearchExtensions, TagsMatcher, TopLevelAnnotationsFilter, UriFilter,
};
pub use service::{SearchOptions, SearchResponse, SearchService};
