//! Tests for the index writer, reindexer and event-driven dispatch pipeline

use annosearch::indexer::{Indexer, IndexerError, ReindexReport};
use annosearch::messaging::{
    subscribe_annotation_event, AnnotationAction, AnnotationEvent, ChannelDispatcher, IndexWorker,
};
use annosearch::models::Annotation;
use annosearch::search::{
    RequestContext, SearchConfig, SearchOptions, SearchParams, SearchService,
};
use annosearch::storage::InMemoryStore;
use std::sync::Arc;
use tempfile::TempDir;

struct TestHarness {
    service: SearchService,
    store: Arc<InMemoryStore>,
    indexer: Arc<Indexer>,
    _dir: TempDir,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn create_harness() -> TestHarness {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfig {
        index_path: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let service = SearchService::new(config).await.unwrap();
    let store = Arc::new(InMemoryStore::new());
    let indexer = Arc::new(Indexer::new(store.clone(), service.index_manager()));

    TestHarness {
        service,
        store,
        indexer,
        _dir: temp_dir,
    }
}

fn annotation(id: &str, text: &str) -> Annotation {
    Annotation::new(
        id,
        "https://example.com/article",
        text,
        "__world__",
        "acct:jane@example.com",
    )
}

async fn search_ids(service: &SearchService) -> Vec<String> {
    let mut ids: Vec<String> = service
        .search(
            &RequestContext::anonymous(),
            &SearchParams::new(),
            SearchOptions::default(),
        )
        .await
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row.id)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_index_is_idempotent_with_last_write_winning() {
    let harness = create_harness().await;

    let mut record = annotation("ann-1", "first version");
    harness.indexer.index(&record).await.unwrap();

    record.text = "second version".to_string();
    harness.indexer.index(&record).await.unwrap();

    let results = harness
        .service
        .search(
            &RequestContext::anonymous(),
            &SearchParams::new(),
            SearchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(results.total, 1);
    assert_eq!(results.rows[0].text, "second version");
}

#[tokio::test]
async fn test_delete_of_unindexed_id_does_not_error() {
    let harness = create_harness().await;
    harness.indexer.delete("never-indexed").await.unwrap();
}

#[tokio::test]
async fn test_add_annotation_not_found_surfaces() {
    let harness = create_harness().await;

    let result = harness.indexer.add_annotation("gone").await;
    assert!(matches!(result, Err(IndexerError::NotFound(_))));
}

#[tokio::test]
async fn test_reindex_fills_empty_index_exactly() {
    let harness = create_harness().await;
    for id in ["x", "y", "z"] {
        harness.store.insert(annotation(id, "text"));
    }

    let report = harness.indexer.reindex_annotations().await.unwrap();

    assert_eq!(report, ReindexReport { indexed: 3, failed: 0 });
    assert_eq!(search_ids(&harness.service).await, vec!["x", "y", "z"]);
}

#[tokio::test]
async fn test_event_pipeline_applies_creates_updates_and_deletes() {
    let harness = create_harness().await;

    harness.store.insert(annotation("ann-1", "first"));
    harness.store.insert(annotation("ann-2", "second"));

    let (dispatcher, rx) = ChannelDispatcher::new();
    let worker = IndexWorker::new(rx, harness.indexer.clone());

    for event in [
        AnnotationEvent::new("ann-1", AnnotationAction::Create),
        AnnotationEvent::new("ann-2", AnnotationAction::Create),
        AnnotationEvent::new("ann-2", AnnotationAction::Update),
        AnnotationEvent::new("ann-1", AnnotationAction::Delete),
    ] {
        subscribe_annotation_event(&event, &dispatcher).await.unwrap();
    }

    // Close the channel so the worker drains the queue and exits
    drop(dispatcher);
    worker.run().await;

    assert_eq!(search_ids(&harness.service).await, vec!["ann-2"]);
}

#[tokio::test]
async fn test_event_pipeline_survives_delete_before_add_race() {
    let harness = create_harness().await;

    // The record never makes it to the store: the add job finds nothing,
    // which must not wedge the worker
    let (dispatcher, rx) = ChannelDispatcher::new();
    let worker = IndexWorker::new(rx, harness.indexer.clone());

    subscribe_annotation_event(
        &AnnotationEvent::new("ephemeral", AnnotationAction::Create),
        &dispatcher,
    )
    .await
    .unwrap();

    harness.store.insert(annotation("ann-1", "durable"));
    subscribe_annotation_event(
        &AnnotationEvent::new("ann-1", AnnotationAction::Create),
        &dispatcher,
    )
    .await
    .unwrap();

    drop(dispatcher);
    worker.run().await;

    assert_eq!(search_ids(&harness.service).await, vec!["ann-1"]);
}

#[tokio::test]
async fn test_reindex_runs_beside_single_record_jobs() {
    let harness = create_harness().await;

    for id in ["x", "y"] {
        harness.store.insert(annotation(id, "text"));
    }
    harness.indexer.reindex_annotations().await.unwrap();

    // A single-record job for a store mutation that happened mid-pass
    harness.store.insert(annotation("z", "text"));
    harness.indexer.add_annotation("z").await.unwrap();

    // Re-running the full pass leaves the same corpus
    harness.indexer.reindex_annotations().await.unwrap();

    assert_eq!(search_ids(&harness.service).await, vec!["x", "y", "z"]);
}
