//! In-process dispatch backend: a tokio channel feeding a worker loop

use crate::indexer::{Indexer, IndexerError};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::events::{IndexJob, MessageEnvelope};
use crate::messaging::traits::JobDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Dispatcher backed by an unbounded in-process channel. Cheap to clone;
/// every clone feeds the same worker.
#[derive(Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<MessageEnvelope<IndexJob>>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the receiving end for its worker
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MessageEnvelope<IndexJob>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JobDispatcher for ChannelDispatcher {
    async fn enqueue(&self, job: IndexJob) -> MessagingResult<()> {
        self.tx
            .send(MessageEnvelope::new(job))
            .map_err(|e| MessagingError::EnqueueFailed(e.to_string()))
    }
}

/// Background loop executing index jobs.
///
/// A missing record on an add job is an expected race (the annotation was
/// deleted before the job ran) and is treated as success; a delete job for
/// the same id is either already enqueued or irrelevant. Backend failures
/// are logged for the dispatch layer's retry policy — the jobs themselves
/// are idempotent, so a redelivery is safe.
pub struct IndexWorker {
    rx: mpsc::UnboundedReceiver<MessageEnvelope<IndexJob>>,
    indexer: Arc<Indexer>,
}

impl IndexWorker {
    pub fn new(
        rx: mpsc::UnboundedReceiver<MessageEnvelope<IndexJob>>,
        indexer: Arc<Indexer>,
    ) -> Self {
        Self { rx, indexer }
    }

    /// Run on a background task until every dispatcher clone is dropped
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain jobs until the channel closes
    pub async fn run(mut self) {
        while let Some(envelope) = self.rx.recv().await {
            self.process(envelope).await;
        }
    }

    async fn process(&self, envelope: MessageEnvelope<IndexJob>) {
        let job = &envelope.payload;
        let annotation_id = job.annotation_id();

        let result = match job {
            IndexJob::AddAnnotation { .. } => self.indexer.add_annotation(annotation_id).await,
            IndexJob::DeleteAnnotation { .. } => {
                self.indexer.delete_annotation(annotation_id).await
            }
        };

        match result {
            Ok(()) => {}
            Err(IndexerError::NotFound(_)) => {
                tracing::warn!(
                    annotation_id = %annotation_id,
                    message_id = %envelope.metadata.message_id,
                    "Annotation vanished before indexing, skipping"
                );
            }
            Err(err) => {
                tracing::error!(
                    annotation_id = %annotation_id,
                    job = job.job_name(),
                    message_id = %envelope.metadata.message_id,
                    error = %err,
                    "Index job failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Annotation;
    use crate::search::{IndexManager, SearchConfig};
    use crate::storage::InMemoryStore;
    use tempfile::TempDir;

    async fn create_test_pipeline() -> (
        ChannelDispatcher,
        IndexWorker,
        Arc<InMemoryStore>,
        Arc<IndexManager>,
        TempDir,
    ) {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let index_manager = Arc::new(IndexManager::new(config).await.unwrap());
        let store = Arc::new(InMemoryStore::new());
        let indexer = Arc::new(Indexer::new(store.clone(), index_manager.clone()));

        let (dispatcher, rx) = ChannelDispatcher::new();
        let worker = IndexWorker::new(rx, indexer);
        (dispatcher, worker, store, index_manager, temp_dir)
    }

    #[tokio::test]
    async fn test_worker_executes_add_and_delete_jobs() {
        let (dispatcher, worker, store, index_manager, _dir) = create_test_pipeline().await;

        store.insert(Annotation::new(
            "ann-1",
            "https://example.com",
            "text",
            "__world__",
            "acct:jane@example.com",
        ));
        store.insert(Annotation::new(
            "ann-2",
            "https://example.com",
            "text",
            "__world__",
            "acct:jane@example.com",
        ));

        dispatcher
            .enqueue(IndexJob::AddAnnotation {
                annotation_id: "ann-1".to_string(),
            })
            .await
            .unwrap();
        dispatcher
            .enqueue(IndexJob::AddAnnotation {
                annotation_id: "ann-2".to_string(),
            })
            .await
            .unwrap();
        dispatcher
            .enqueue(IndexJob::DeleteAnnotation {
                annotation_id: "ann-1".to_string(),
            })
            .await
            .unwrap();

        // Closing the channel lets the worker drain and exit
        drop(dispatcher);
        worker.run().await;

        assert_eq!(index_manager.stats().await.unwrap().total_documents, 1);
    }

    #[tokio::test]
    async fn test_worker_treats_vanished_annotation_as_success() {
        let (dispatcher, worker, _store, index_manager, _dir) = create_test_pipeline().await;

        dispatcher
            .enqueue(IndexJob::AddAnnotation {
                annotation_id: "already-deleted".to_string(),
            })
            .await
            .unwrap();

        drop(dispatcher);
        worker.run().await;

        assert_eq!(index_manager.stats().await.unwrap().total_documents, 0);
    }

    #[tokio::test]
    async fn test_enqueue_fails_after_worker_receiver_dropped() {
        let (dispatcher, worker, _store, _index_manager, _dir) = create_test_pipeline().await;
        drop(worker);

        let result = dispatcher
            .enqueue(IndexJob::AddAnnotation {
                annotation_id: "ann-1".to_string(),
            })
            .await;
        assert!(matches!(result, Err(MessagingError::EnqueueFailed(_))));
    }
}
