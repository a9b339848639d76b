//! End-to-end behavior of the ingestion and processing orchestrators over
//! mock collaborators and the in-memory store.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use paperlake_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo, StopwordCleaner};
use paperlake_pipeline::{
    Backoff, BatchRunner, IngestionOrchestrator, PipelineError, ProcessOutcome,
    ProcessingOrchestrator,
};
use paperlake_source::{ArticleSource, SourceError};
use paperlake_storage::{Collection, MemoryObjectStore, ObjectStore, StorageError};
use paperlake_types::{Article, RawEnvelope};

// ---- mock collaborators ----

/// Source that replays a scripted sequence of pages and records each call.
struct ScriptedSource {
    pages: Mutex<VecDeque<Result<Vec<Article>, SourceError>>>,
    calls: Mutex<Vec<(usize, usize)>>,
}

impl ScriptedSource {
    fn new(pages: Vec<Result<Vec<Article>, SourceError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleSource for ScriptedSource {
    fn source_name(&self) -> &str {
        "scripted"
    }

    fn page_size(&self) -> usize {
        50
    }

    async fn fetch(
        &self,
        _query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Article>, SourceError> {
        self.calls.lock().unwrap().push((limit, offset));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Backoff that counts invocations instead of sleeping.
#[derive(Default)]
struct CountingBackoff {
    count: AtomicUsize,
}

#[async_trait]
impl Backoff for CountingBackoff {
    async fn wait(&self, _cancel: &CancellationToken) -> bool {
        self.count.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// Deterministic fixed-dimension embedder.
struct MockEmbedder {
    info: ModelInfo,
}

impl MockEmbedder {
    fn with_dimension(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "mock".to_string(),
                dimension,
                max_sequence_length: 256,
            },
        }
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        // Deterministic per text: seed the vector from its length.
        let seed = text.len() as f32 + 1.0;
        Ok(Embedding::new(vec![seed; self.info.dimension]))
    }
}

/// Embedder that violates its own declared dimension.
struct LyingEmbedder {
    info: ModelInfo,
}

impl LyingEmbedder {
    fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "lying".to_string(),
                dimension: 8,
                max_sequence_length: 256,
            },
        }
    }
}

impl EmbeddingModel for LyingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(Embedding::new(vec![1.0; 3]))
    }
}

/// Store wrapper that fails every put after the first `allow` writes.
struct FailingPutStore {
    inner: MemoryObjectStore,
    allow: usize,
    puts: AtomicUsize,
}

impl FailingPutStore {
    fn new(allow: usize) -> Self {
        Self {
            inner: MemoryObjectStore::new(),
            allow,
            puts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ObjectStore for FailingPutStore {
    async fn put(
        &self,
        collection: Collection,
        key: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.allow {
            return Err(StorageError::Io(std::io::Error::other("injected failure")));
        }
        self.inner.put(collection, key, bytes).await
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.get(collection, key).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<String>, StorageError> {
        self.inner.list(collection).await
    }

    async fn exists(&self, collection: Collection, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(collection, key).await
    }
}

// ---- fixtures ----

fn article(id: &str) -> Article {
    let now = Utc::now();
    Article {
        id: id.to_string(),
        title: format!("Title {}", id),
        authors: vec![],
        summary: "The model is great and achieves strong results.".to_string(),
        published: now,
        updated: now,
        categories: vec!["cs.CL".to_string()],
        link: format!("https://arxiv.org/abs/{}", id),
        pdf_link: None,
    }
}

fn page(prefix: &str, n: usize) -> Vec<Article> {
    (0..n).map(|i| article(&format!("{}_{}", prefix, i))).collect()
}

async fn seed_bronze(store: &dyn ObjectStore, art: Article) {
    let envelope = RawEnvelope::new("scripted", "cs.CL", art);
    let key = envelope.article_data.object_key();
    let bytes = serde_json::to_vec(&envelope).unwrap();
    store.put(Collection::Bronze, &key, &bytes).await.unwrap();
}

fn processor(store: Arc<dyn ObjectStore>, embedder: Arc<dyn EmbeddingModel>) -> ProcessingOrchestrator {
    ProcessingOrchestrator::new(store, Arc::new(StopwordCleaner::default()), embedder)
}

// ---- ingestion ----

#[tokio::test]
async fn pagination_reaches_max_results_with_one_backoff() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(page("p1", 50)), Ok(page("p2", 10))]));
    let store = Arc::new(MemoryObjectStore::new());
    let backoff = Arc::new(CountingBackoff::default());

    let orchestrator = IngestionOrchestrator::new(source.clone(), store.clone(), backoff.clone());
    let cancel = CancellationToken::new();

    let collected = orchestrator.run("cs.CL", 60, &cancel).await.unwrap();

    assert_eq!(collected, 60);
    // Two fetches, offsets advancing by records returned.
    assert_eq!(source.calls(), vec![(50, 0), (50, 50)]);
    // Exactly one backoff between the two pages, none after the short one.
    assert_eq!(backoff.count.load(Ordering::SeqCst), 1);
    assert_eq!(store.len(Collection::Bronze), 60);
}

#[tokio::test]
async fn empty_source_terminates_after_one_fetch() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(Vec::new())]));
    let store = Arc::new(MemoryObjectStore::new());
    let backoff = Arc::new(CountingBackoff::default());

    let orchestrator = IngestionOrchestrator::new(source.clone(), store.clone(), backoff.clone());

    let collected = orchestrator
        .run("cs.CL", 100, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(collected, 0);
    assert_eq!(source.calls().len(), 1);
    assert_eq!(backoff.count.load(Ordering::SeqCst), 0);
    assert!(store.is_empty(Collection::Bronze));
}

#[tokio::test]
async fn source_error_on_first_fetch_is_fatal_and_saves_nothing() {
    let source = Arc::new(ScriptedSource::new(vec![Err(SourceError::Http(500))]));
    let store = Arc::new(MemoryObjectStore::new());

    let orchestrator = IngestionOrchestrator::new(
        source,
        store.clone(),
        Arc::new(CountingBackoff::default()),
    );

    let err = orchestrator
        .run("cs.CL", 50, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Source(SourceError::Http(500))));
    assert!(store.is_empty(Collection::Bronze));
}

#[tokio::test]
async fn source_error_on_later_page_keeps_earlier_records() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(page("p1", 50)),
        Err(SourceError::RateLimited),
    ]));
    let store = Arc::new(MemoryObjectStore::new());

    let orchestrator = IngestionOrchestrator::new(
        source,
        store.clone(),
        Arc::new(CountingBackoff::default()),
    );

    let err = orchestrator
        .run("cs.CL", 100, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Source(SourceError::RateLimited)));
    // The fully saved first page is retained.
    assert_eq!(store.len(Collection::Bronze), 50);
}

#[tokio::test]
async fn bronze_put_failure_aborts_the_run() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(page("p1", 50))]));
    let store = Arc::new(FailingPutStore::new(3));

    let orchestrator = IngestionOrchestrator::new(
        source,
        store.clone(),
        Arc::new(CountingBackoff::default()),
    );

    let err = orchestrator
        .run("cs.CL", 50, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)));
    // Records saved before the failure remain (append-only holds).
    assert_eq!(store.inner.len(Collection::Bronze), 3);
}

#[tokio::test]
async fn cancelled_run_fetches_nothing() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(page("p1", 50))]));
    let store = Arc::new(MemoryObjectStore::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let orchestrator = IngestionOrchestrator::new(
        source.clone(),
        store.clone(),
        Arc::new(CountingBackoff::default()),
    );

    let collected = orchestrator.run("cs.CL", 50, &cancel).await.unwrap();

    assert_eq!(collected, 0);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn stored_envelope_carries_provenance() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![article("x1")])]));
    let store = Arc::new(MemoryObjectStore::new());

    let orchestrator = IngestionOrchestrator::new(
        source,
        store.clone(),
        Arc::new(CountingBackoff::default()),
    );
    orchestrator
        .run("quantum", 10, &CancellationToken::new())
        .await
        .unwrap();

    let bytes = store.get(Collection::Bronze, "x1.json").await.unwrap();
    let envelope: RawEnvelope = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope.ingestion_source, "scripted");
    assert_eq!(envelope.search_query, "quantum");
    assert_eq!(envelope.article_data.id, "x1");
}

// ---- processing ----

#[tokio::test]
async fn process_one_is_idempotent() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    seed_bronze(store.as_ref(), article("a1")).await;

    let orchestrator = processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16)));

    let first = orchestrator.process_one("a1.json").await.unwrap();
    assert!(matches!(first, ProcessOutcome::Processed(_)));
    let after_first = store.get(Collection::Silver, "a1.json").await.unwrap();

    let second = orchestrator.process_one("a1.json").await.unwrap();
    assert!(matches!(second, ProcessOutcome::Skipped));
    let after_second = store.get(Collection::Silver, "a1.json").await.unwrap();

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn processed_record_has_cleaned_text_and_fixed_dimension() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    seed_bronze(store.as_ref(), article("a2")).await;

    let orchestrator = processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16)));

    let outcome = orchestrator.process_one("a2.json").await.unwrap();
    let ProcessOutcome::Processed(record) = outcome else {
        panic!("expected Processed");
    };

    assert_eq!(record.id, "a2");
    assert_eq!(record.embedding.len(), 16);
    // "The model is great and achieves strong results." minus stopwords
    assert_eq!(record.cleaned_summary, "model great achieves strong results");
    assert_eq!(record.summary, "The model is great and achieves strong results.");
}

#[tokio::test]
async fn missing_bronze_object_is_a_data_error() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    let orchestrator = processor(store, Arc::new(MockEmbedder::with_dimension(16)));

    let err = orchestrator.process_one("ghost.json").await.unwrap_err();
    assert!(matches!(err, PipelineError::Data { .. }));
}

#[tokio::test]
async fn malformed_envelope_is_a_data_error_and_writes_nothing() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    store
        .put(Collection::Bronze, "bad.json", b"{not json")
        .await
        .unwrap();

    let orchestrator = processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16)));

    let err = orchestrator.process_one("bad.json").await.unwrap_err();
    assert!(matches!(err, PipelineError::Data { .. }));
    assert!(!store.exists(Collection::Silver, "bad.json").await.unwrap());
}

#[tokio::test]
async fn dimension_violation_fails_the_item_without_a_silver_write() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    seed_bronze(store.as_ref(), article("dim1")).await;

    let orchestrator = processor(store.clone(), Arc::new(LyingEmbedder::new()));

    let err = orchestrator.process_one("dim1.json").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Model(EmbeddingError::DimensionMismatch { expected: 8, actual: 3 })
    ));
    assert!(!store.exists(Collection::Silver, "dim1.json").await.unwrap());
}

// ---- batch runner ----

#[tokio::test]
async fn pass_processes_only_the_unprocessed_set() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    for id in ["1", "2", "3"] {
        seed_bronze(store.as_ref(), article(id)).await;
    }

    let orchestrator = Arc::new(processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16))));
    // Pre-process item 2 so the planner must exclude it.
    orchestrator.process_one("2.json").await.unwrap();

    let runner = BatchRunner::new(store.clone(), orchestrator);
    let stats = runner
        .run_pass(10, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.failed, 0);

    let mut silver = store.list(Collection::Silver).await.unwrap();
    silver.sort();
    assert_eq!(silver, vec!["1.json", "2.json", "3.json"]);
}

#[tokio::test]
async fn pass_respects_the_limit() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    for i in 0..5 {
        seed_bronze(store.as_ref(), article(&format!("k{}", i))).await;
    }

    let orchestrator = Arc::new(processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16))));
    let runner = BatchRunner::new(store.clone(), orchestrator);

    let stats = runner
        .run_pass(2, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.total(), 2);
    assert_eq!(store.list(Collection::Silver).await.unwrap().len(), 2);
}

#[tokio::test]
async fn item_failures_are_isolated_within_a_pass() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    seed_bronze(store.as_ref(), article("good1")).await;
    store
        .put(Collection::Bronze, "broken.json", b"not an envelope")
        .await
        .unwrap();
    seed_bronze(store.as_ref(), article("good2")).await;

    let orchestrator = Arc::new(processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16))));
    let runner = BatchRunner::new(store.clone(), orchestrator);

    let stats = runner
        .run_pass(10, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(store.list(Collection::Silver).await.unwrap().len(), 2);
}

#[tokio::test]
async fn run_until_complete_drains_the_backlog_in_small_passes() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    for i in 0..5 {
        seed_bronze(store.as_ref(), article(&format!("d{}", i))).await;
    }

    let orchestrator = Arc::new(processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16))));
    let runner = BatchRunner::new(store.clone(), orchestrator);

    let totals = runner
        .run_until_complete(2, Duration::from_millis(1), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(totals.processed, 5);
    assert_eq!(store.list(Collection::Silver).await.unwrap().len(), 5);
}

#[tokio::test]
async fn every_silver_record_matches_the_declared_dimension() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    for i in 0..4 {
        seed_bronze(store.as_ref(), article(&format!("e{}", i))).await;
    }

    let dimension = 32;
    let orchestrator = Arc::new(processor(
        store.clone(),
        Arc::new(MockEmbedder::with_dimension(dimension)),
    ));
    let runner = BatchRunner::new(store.clone(), orchestrator);
    runner
        .run_pass(10, &CancellationToken::new())
        .await
        .unwrap();

    for key in store.list(Collection::Silver).await.unwrap() {
        let bytes = store.get(Collection::Silver, &key).await.unwrap();
        let record: paperlake_types::ProcessedArticle = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record.embedding.len(), dimension);
    }
}

#[tokio::test]
async fn cancelled_loop_stops_between_passes() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    seed_bronze(store.as_ref(), article("c1")).await;

    let orchestrator = Arc::new(processor(store.clone(), Arc::new(MockEmbedder::with_dimension(16))));
    let runner = BatchRunner::new(store.clone(), orchestrator);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let totals = runner
        .run_until_complete(10, Duration::from_millis(1), &cancel)
        .await
        .unwrap();

    assert_eq!(totals.total(), 0);
    assert!(store.list(Collection::Silver).await.unwrap().is_empty());
}
