//! Boundary to the primary, authoritative annotation store.
//!
//! The index is a derived representation; this module only consumes the
//! store through a narrow fetch-by-id / iterate-all capability.

pub mod memory;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::models::Annotation;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Trait for reading annotations from the primary store
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Fetch a single annotation by id. `Ok(None)` when no such record
    /// exists (it may have been deleted since the caller learned the id).
    async fn fetch_annotation(&self, id: &str) -> Result<Option<Annotation>>;

    /// Stream every annotation in the store. Restartable per call; callers
    /// must not assume any particular order.
    fn stream_annotations(&self) -> BoxStream<'static, Result<Annotation>>;
}
