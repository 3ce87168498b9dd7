use crate::error::Result;
use crate::models::Annotation;
use crate::storage::AnnotationStore;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;

/// In-memory annotation store (for tests and embedded use)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    annotations: Arc<DashMap<String, Annotation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            annotations: Arc::new(DashMap::new()),
        }
    }

    /// Insert or replace an annotation
    pub fn insert(&self, annotation: Annotation) {
        tracing::debug!(annotation_id = %annotation.id, "Annotation saved");
        self.annotations.insert(annotation.id.clone(), annotation);
    }

    /// Remove an annotation; returns the removed record if it existed
    pub fn remove(&self, id: &str) -> Option<Annotation> {
        self.annotations.remove(id).map(|(_, annotation)| {
            tracing::debug!(annotation_id = %id, "Annotation deleted");
            annotation
        })
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

#[async_trait]
impl AnnotationStore for InMemoryStore {
    async fn fetch_annotation(&self, id: &str) -> Result<Option<Annotation>> {
        Ok(self.annotations.get(id).map(|entry| entry.clone()))
    }

    fn stream_annotations(&self) -> BoxStream<'static, Result<Annotation>> {
        // Snapshot the map so the stream is independent of concurrent writes.
        let snapshot: Vec<Annotation> = self
            .annotations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        stream::iter(snapshot.into_iter().map(Ok)).boxed()
    }
}
