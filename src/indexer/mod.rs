//! Index writer and full-corpus reindexer
//!
//! Translates annotations from the primary store into index documents. Every
//! operation is an idempotent function of the annotation id (or record), so
//! jobs may be retried and may race with a concurrent reindex pass without
//! corrupting the index.

use crate::error::AppError;
use crate::models::Annotation;
use crate::search::{AnnotationDocument, IndexManager, SearchError};
use crate::storage::AnnotationStore;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for indexer operations
pub type IndexerResult<T> = std::result::Result<T, IndexerError>;

/// Errors that can occur while writing to the index
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// The referenced annotation no longer exists in the primary store. An
    /// expected race: the record was deleted before the job ran.
    #[error("Annotation not found: {0}")]
    NotFound(String),

    /// Index backend failure
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Primary store failure
    #[error("Store error: {0}")]
    Store(#[from] AppError),
}

/// Outcome of a full reindex pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Annotations written to the index
    pub indexed: usize,

    /// Annotations that could not be read or written; details are logged
    pub failed: usize,
}

/// Writes annotations into the search index
pub struct Indexer {
    store: Arc<dyn AnnotationStore>,
    index_manager: Arc<IndexManager>,
}

impl Indexer {
    pub fn new(store: Arc<dyn AnnotationStore>, index_manager: Arc<IndexManager>) -> Self {
        Self {
            store,
            index_manager,
        }
    }

    /// Map an annotation to an index document and upsert it, overwriting any
    /// existing document with the same id
    pub async fn index(&self, annotation: &Annotation) -> IndexerResult<()> {
        let document = AnnotationDocument::from(annotation);
        self.index_manager.upsert_document(&document).await?;
        tracing::debug!(annotation_id = %annotation.id, "Annotation indexed");
        Ok(())
    }

    /// Remove the document with this id from the index. Deleting an id that
    /// was never indexed is not an error.
    pub async fn delete(&self, id: &str) -> IndexerResult<()> {
        self.index_manager.delete_document(id).await?;
        tracing::debug!(annotation_id = %id, "Annotation removed from index");
        Ok(())
    }

    /// Fetch the annotation by id from the primary store and index it.
    /// Surfaces [`IndexerError::NotFound`] when the record has already been
    /// deleted; the job layer decides how to treat that race.
    pub async fn add_annotation(&self, id: &str) -> IndexerResult<()> {
        let annotation = self
            .store
            .fetch_annotation(id)
            .await?
            .ok_or_else(|| IndexerError::NotFound(id.to_string()))?;
        self.index(&annotation).await
    }

    /// Remove the annotation with this id from the index. No fetch is needed
    /// since deletion does not require record content.
    pub async fn delete_annotation(&self, id: &str) -> IndexerResult<()> {
        self.delete(id).await
    }

    /// Resynchronize the whole index from the primary store: stream every
    /// annotation and upsert it. Per-record failures are logged and counted
    /// but do not abort the pass; every write is an independent idempotent
    /// upsert, so the pass is safe to re-run and to run beside live traffic.
    pub async fn reindex_annotations(&self) -> IndexerResult<ReindexReport> {
        let mut stream = self.store.stream_annotations();
        let mut report = ReindexReport::default();

        while let Some(record) = stream.next().await {
            match record {
                Ok(annotation) => match self.index(&annotation).await {
                    Ok(()) => report.indexed += 1,
                    Err(err) => {
                        tracing::error!(
                            annotation_id = %annotation.id,
                            error = %err,
                            "Reindex failed to write annotation"
                        );
                        report.failed += 1;
                    }
                },
                Err(err) => {
                    tracing::error!(error = %err, "Reindex failed to read annotation from store");
                    report.failed += 1;
                }
            }
        }

        self.index_manager.commit().await?;
        tracing::info!(
            indexed = report.indexed,
            failed = report.failed,
            "Reindex pass complete"
        );
        Ok(report)
    }
}
