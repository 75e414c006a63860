//! The chunk index capability and its embedding-backed implementation.

use std::future::Future;
use std::sync::Arc;

use stitch_core::EmbeddingModel;

use crate::chunking::FixedSizeChunker;
use crate::config::RagConfig;
use crate::corpus::Corpus;
use crate::error::{RagError, Result};
use crate::index::{HnswIndex, VectorIndex};
use crate::locator::ChunkLookup;
use crate::types::{Chunk, Hit};

/// A searchable store of one corpus.
///
/// This is the only interface the [`Retriever`](crate::Retriever) depends on, so any backend
/// (brute force, approximate nearest neighbour, a remote vector database) can sit behind it.
///
/// Implementations must return at most `top_k` hits from [`search`](ChunkIndex::search),
/// ordered by descending score with ties broken by ascending chunk index.
pub trait ChunkIndex: ChunkLookup {
    /// Loads a corpus, replacing whatever was loaded before.
    fn ingest(&self, corpus: Corpus) -> impl Future<Output = Result<()>> + Send;

    /// Returns the hits most relevant to `query`.
    fn search(&self, query: &str, top_k: usize) -> impl Future<Output = Result<Vec<Hit>>> + Send;
}

/// Chunk index backed by an embedding model and a [`VectorIndex`].
///
/// `RagStore` is cheap to clone; clones share the embedder and the index.
pub struct RagStore<M: EmbeddingModel, I: VectorIndex = HnswIndex> {
    embedder: Arc<M>,
    index: Arc<I>,
    chunker: FixedSizeChunker,
    config: RagConfig,
}

impl<M: EmbeddingModel, I: VectorIndex> Clone for RagStore<M, I> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            index: Arc::clone(&self.index),
            chunker: self.chunker,
            config: self.config.clone(),
        }
    }
}

impl<M: EmbeddingModel, I: VectorIndex + std::fmt::Debug> std::fmt::Debug for RagStore<M, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagStore")
            .field("index", &self.index)
            .field("chunker", &self.chunker)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<M> RagStore<M, HnswIndex>
where
    M: EmbeddingModel + 'static,
{
    /// Creates a store with default configuration and an HNSW index.
    #[must_use]
    pub fn new(embedder: M) -> Self {
        let dimension = embedder.dim();
        Self {
            embedder: Arc::new(embedder),
            index: Arc::new(HnswIndex::new(dimension)),
            chunker: FixedSizeChunker::default(),
            config: RagConfig::default(),
        }
    }

    /// Creates a store with custom configuration and an HNSW index.
    ///
    /// # Errors
    /// Returns [`RagError::Config`] if the configuration is invalid.
    pub fn with_config(embedder: M, config: RagConfig) -> Result<Self> {
        let index = HnswIndex::new(embedder.dim());
        RagStore::with_index(embedder, index, config)
    }
}

impl<M, I> RagStore<M, I>
where
    M: EmbeddingModel + 'static,
    I: VectorIndex,
{
    /// Creates a store over a caller-provided vector index.
    ///
    /// # Errors
    /// Returns [`RagError::Config`] if the configuration is invalid and
    /// [`RagError::DimensionMismatch`] if the index and the embedder disagree on the dimension.
    pub fn with_index(embedder: M, index: I, config: RagConfig) -> Result<Self> {
        let params = config.validate()?;
        if index.dimension() != embedder.dim() {
            return Err(RagError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dim(),
            });
        }
        Ok(Self {
            embedder: Arc::new(embedder),
            index: Arc::new(index),
            chunker: FixedSizeChunker::with_params(params),
            config,
        })
    }

    /// Chunks `text` with the configured parameters and ingests the resulting corpus.
    ///
    /// # Returns
    /// The number of chunks indexed.
    pub async fn ingest_text(&self, text: &str) -> Result<usize> {
        let corpus = self.chunker.chunk(text);
        let count = corpus.len();
        self.ingest_corpus(corpus).await?;
        Ok(count)
    }

    /// Embeds every chunk of `corpus` and loads it into the index.
    ///
    /// The previous corpus stays searchable until the new one is fully embedded.
    pub async fn ingest_corpus(&self, corpus: Corpus) -> Result<()> {
        let texts: Vec<&str> = corpus.chunk_texts().collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(RagError::Embedding)?;
        drop(texts);

        let chunks = corpus.len();
        let fingerprint = corpus.fingerprint();
        self.index.load(corpus, embeddings)?;

        tracing::info!(
            chunks,
            fingerprint = format_args!("{fingerprint:016x}"),
            "ingested corpus"
        );
        Ok(())
    }

    /// Searches for chunks similar to the query, returning at most `top_k` hits.
    pub async fn search_with_k(&self, query: &str, top_k: usize) -> Result<Vec<Hit>> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RagError::Embedding)?;

        self.index
            .search(&embedding, top_k, self.config.similarity_threshold)
    }

    /// Searches with the configured default result count.
    pub async fn search_default(&self, query: &str) -> Result<Vec<Hit>> {
        self.search_with_k(query, self.config.default_top_k).await
    }

    /// Returns the loaded corpus, if any.
    #[must_use]
    pub fn corpus(&self) -> Option<Corpus> {
        self.index.corpus()
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Clears all data from the store.
    pub fn clear(&self) {
        self.index.clear();
    }

    /// Returns a reference to the underlying index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Returns a reference to the embedder.
    pub fn embedder(&self) -> &M {
        &self.embedder
    }

    /// Returns the chunker used by [`ingest_text`](Self::ingest_text).
    pub const fn chunker(&self) -> &FixedSizeChunker {
        &self.chunker
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }
}

impl<M, I> ChunkLookup for RagStore<M, I>
where
    M: EmbeddingModel + 'static,
    I: VectorIndex,
{
    fn lookup_by_index(&self, index: usize) -> Option<Chunk> {
        self.index.get(index)
    }
}

impl<M, I> ChunkIndex for RagStore<M, I>
where
    M: EmbeddingModel + 'static,
    I: VectorIndex,
{
    fn ingest(&self, corpus: Corpus) -> impl Future<Output = Result<()>> + Send {
        self.ingest_corpus(corpus)
    }

    fn search(&self, query: &str, top_k: usize) -> impl Future<Output = Result<Vec<Hit>>> + Send {
        self.search_with_k(query, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::index::FlatIndex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as letter frequencies, so texts sharing letters score higher.
    #[derive(Clone)]
    struct LetterEmbedder {
        calls: Arc<AtomicUsize>,
    }

    impl LetterEmbedder {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl EmbeddingModel for LetterEmbedder {
        fn dim(&self) -> usize {
            26
        }

        async fn embed(&self, text: &str) -> stitch_core::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut vec = vec![0.0; 26];
            for byte in text.bytes().filter(u8::is_ascii_lowercase) {
                vec[usize::from(byte - b'a')] += 1.0;
            }
            Ok(vec)
        }
    }

    struct FailingEmbedder;

    impl EmbeddingModel for FailingEmbedder {
        fn dim(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> stitch_core::Result<Vec<f32>> {
            Err(anyhow::anyhow!("provider unavailable"))
        }
    }

    fn flat_store(chunk_size: usize, overlap: usize) -> RagStore<LetterEmbedder, FlatIndex> {
        let config = RagConfig::builder()
            .chunking(chunk_size, overlap)
            .similarity_threshold(-1.0)
            .build();
        RagStore::with_index(LetterEmbedder::new(), FlatIndex::new(26), config).unwrap()
    }

    #[tokio::test]
    async fn ingest_and_search() {
        let store = flat_store(4, 0);
        let count = store.ingest_text("aaaabbbbcccc").await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.embedder().calls.load(Ordering::SeqCst), 3);

        let hits = store.search_with_k("bb", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, Some(1));
        assert_eq!(hits[0].text, "bbbb");

        let through_trait = store.search("bb", 1).await.unwrap();
        assert_eq!(through_trait, hits);
    }

    #[tokio::test]
    async fn lookup_through_store() {
        let store = flat_store(4, 2);
        store.ingest_text("abcdefgh").await.unwrap();

        let chunk = store.lookup_by_index(1).unwrap();
        assert_eq!(chunk.text(), "cdef");
        assert!(store.lookup_by_index(3).is_none());
    }

    #[tokio::test]
    async fn reingest_replaces_corpus() {
        let store = flat_store(4, 0);
        store.ingest_text("aaaabbbbcccc").await.unwrap();
        let first = store.corpus().unwrap().fingerprint();

        let corpus = FixedSizeChunker::new(2, 0).unwrap().chunk("zz");
        store.ingest(corpus).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_ne!(store.corpus().unwrap().fingerprint(), first);
        assert_eq!(store.lookup_by_index(0).unwrap().text(), "zz");
    }

    #[tokio::test]
    async fn default_store_uses_hnsw() {
        let config = RagConfig::builder().chunking(5, 0).build();
        let store = RagStore::with_config(LetterEmbedder::new(), config).unwrap();
        store.ingest_text("helloworld").await.unwrap();

        assert_eq!(store.len(), 2);
        let results = store.search_default("hello").await.unwrap();
        assert_eq!(results[0].index, Some(0));
        assert_eq!(results[0].text, "hello");
    }

    #[tokio::test]
    async fn embedding_failure_is_reported() {
        let config = RagConfig::default();
        let store = RagStore::with_config(FailingEmbedder, config).unwrap();

        let err = store.ingest_text("some text").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn new_store_uses_defaults() {
        let store = RagStore::new(LetterEmbedder::new());
        assert_eq!(store.index().dimension(), 26);
        assert_eq!(store.chunker().params().chunk_size(), 512);
        assert_eq!(store.config(), &RagConfig::default());
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RagConfig::builder().chunking(0, 0).build();
        let err = RagStore::with_config(LetterEmbedder::new(), config).unwrap_err();
        assert!(matches!(err, RagError::Config(ConfigError::ZeroChunkSize)));
    }

    #[test]
    fn index_dimension_must_match() {
        let err = RagStore::with_index(LetterEmbedder::new(), FlatIndex::new(3), RagConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 26
            }
        ));
    }
}
