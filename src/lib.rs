//! Search and indexing core for a web annotation service.
//!
//! This crate keeps a full-text search index synchronized with a primary
//! annotation store and answers search requests against it:
//!
//! - **Query building**: composable filter/matcher primitives assembled into
//!   a structured query document (filters AND-combined, matchers OR-combined)
//! - **Two-phase search**: top-level annotations plus a separate reply fetch
//! - **Event-driven indexing**: create/update/delete events dispatched as
//!   asynchronous index jobs
//! - **Reindexing**: full-corpus resynchronization for bootstrap or repair
//!
//! # Architecture
//!
//! ```text
//! primary-store mutation ──▶ AnnotationEvent ──▶ JobDispatcher ──▶ IndexWorker
//!                                                                     │
//!                                                                     ▼
//! client request ──▶ SearchService ──▶ Builder ──▶ IndexManager (tantivy)
//! ```
//!
//! The index is an asynchronously-updated secondary representation of the
//! primary store: searches may observe a stale or momentarily-missing
//! document for a just-mutated record. Index writes are idempotent upserts
//! and deletes keyed by annotation id, so jobs may be retried and a full
//! reindex may run beside live traffic.
//!
//! # Example
//!
//! ```no_run
//! use annosearch::search::{RequestContext, SearchConfig, SearchOptions, SearchParams, SearchService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SearchService::new(SearchConfig::default()).await?;
//!
//!     let ctx = RequestContext::for_user("acct:jane@example.com");
//!     let params = SearchParams::new()
//!         .with_query("climate")
//!         .with_uri("https://example.com/article")
//!         .with_limit(20);
//!
//!     let results = service
//!         .search(&ctx, &params, SearchOptions::default())
//!         .await?;
//!     println!("Found {} annotations", results.total);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod indexer;
pub mod messaging;
pub mod models;
pub mod search;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
