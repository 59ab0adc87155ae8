use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::persist::{load_snapshot, save_snapshot};
use crate::types::QueryResult;
use futures::future::try_join_all;
use report_text_chunker::Chunk;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Chunk texts and their embeddings, searchable by squared L2 distance.
///
/// `add` calls are serialized by a writer gate for their whole duration, while the
/// committed contents are only write-locked for the final append. A concurrent
/// `search` therefore observes either the state before an `add` or after it.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    state: RwLock<FlatIndex>,
    write_gate: Mutex<()>,
}

impl VectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_state(embedder, FlatIndex::new())
    }

    fn with_state(embedder: Arc<dyn Embedder>, state: FlatIndex) -> Self {
        Self {
            embedder,
            state: RwLock::new(state),
            write_gate: Mutex::new(()),
        }
    }

    /// Embed and append chunk texts in input order. Nothing is committed on error.
    pub async fn add(&self, texts: Vec<String>) -> Result<()> {
        self.add_with_cancel(texts, &CancellationToken::new()).await
    }

    /// Like [`add`](Self::add), aborting with [`VectorStoreError::Cancelled`] if
    /// `cancel` fires before the batch is committed.
    pub async fn add_with_cancel(
        &self,
        texts: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if texts.is_empty() {
            return Ok(());
        }

        let _gate = self.write_gate.lock().await;

        log::info!(
            "Adding {} chunks to index (embedder: {})",
            texts.len(),
            self.embedder.name()
        );

        let vectors = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(VectorStoreError::Cancelled),
            vectors = self.embed_in_batches(&texts) => vectors?,
        };

        if cancel.is_cancelled() {
            return Err(VectorStoreError::Cancelled);
        }

        let mut state = self.state.write().await;
        state.append(texts, vectors)?;

        log::info!("Successfully added chunks. Total: {}", state.len());
        Ok(())
    }

    /// Batches run concurrently; `try_join_all` yields them back in submission order.
    async fn embed_in_batches(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.embedder.max_batch_size().max(1);
        let batches = texts.chunks(batch_size).map(|batch| self.embed_checked(batch));
        let embedded = try_join_all(batches).await?;
        Ok(embedded.into_iter().flatten().collect())
    }

    async fn embed_checked(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed(batch).await?;
        if vectors.len() != batch.len() {
            return Err(VectorStoreError::embedding(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        Ok(vectors)
    }

    /// Top-k chunks nearest to `query`, ascending by squared L2 distance.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<QueryResult>> {
        log::debug!("Searching for: '{query}' (k: {k})");

        if self.state.read().await.is_empty() {
            return Err(VectorStoreError::EmptyIndex);
        }

        let query_vector = self
            .embed_checked(&[query.to_string()])
            .await?
            .pop()
            .ok_or_else(|| VectorStoreError::embedding("Empty embedding result"))?;

        self.search_vector(&query_vector, k).await
    }

    /// Top-k search with a precomputed query vector
    pub async fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let state = self.state.read().await;
        let neighbors = state.search(query, k)?;

        let results: Vec<QueryResult> = neighbors
            .into_iter()
            .map(|(position, distance)| QueryResult {
                chunk: state.chunks()[position].clone(),
                distance,
            })
            .collect();

        log::debug!("Found {} results", results.len());
        Ok(results)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    /// Established vector dimension; `None` until the first batch commits
    pub async fn dimension(&self) -> Option<usize> {
        self.state.read().await.dimension()
    }

    /// Snapshot of stored chunks in insertion order
    pub async fn chunks(&self) -> Vec<Chunk> {
        self.state.read().await.chunks().to_vec()
    }

    /// Write `vectors.bin` and `chunks.json` into `dir`
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        log::info!("Saving index to {}", dir.display());
        let state = self.state.read().await;
        save_snapshot(dir, &state).await?;
        log::info!("Index saved ({} chunks)", state.len());
        Ok(())
    }

    /// Restore an index written by [`save`](Self::save).
    ///
    /// Fails with [`VectorStoreError::CorruptIndex`] when the two artifacts disagree.
    pub async fn load(dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading index from {}", dir.display());
        let state = load_snapshot(dir).await?;
        log::info!("Loaded {} chunks", state.len());
        Ok(Self::with_state(embedder, state))
    }
}
