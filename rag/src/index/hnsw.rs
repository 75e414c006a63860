//! HNSW-based vector index using instant-distance.

use std::sync::Arc;

use instant_distance::{Builder, HnswMap, Point, Search};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use rayon::prelude::*;
use stitch_core::Embedding;

use crate::corpus::Corpus;
use crate::error::Result;
use crate::types::{Chunk, Hit};

use super::{VectorIndex, check_load, check_query, cosine_similarity, rank};

/// A point wrapper for instant-distance that shares its vector with the index state.
#[derive(Clone, Debug)]
struct EmbeddingPoint {
    embedding: Arc<[f32]>,
}

impl Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance: smaller for more similar vectors.
        1.0 - cosine_similarity(&self.embedding, &other.embedding)
    }
}

/// Internal state for the HNSW index.
struct IndexState {
    corpus: Corpus,
    /// `vectors[i]` is the embedding of chunk `i`.
    vectors: Vec<Arc<[f32]>>,
    /// Graph over chunk embeddings; values are chunk indices. `None` for an empty corpus.
    hnsw: Option<HnswMap<EmbeddingPoint, usize>>,
}

impl IndexState {
    /// Similarity of chunk `index` to `query`, computed exactly as [`FlatIndex`](super::FlatIndex)
    /// does so equal vectors always produce equal scores.
    fn score(&self, index: usize, query: &[f32]) -> f32 {
        cosine_similarity(&self.vectors[index], query)
    }

    /// Every chunk scoring exactly `score`, found by a full scan.
    fn tied_at(&self, score: f32, query: &[f32]) -> Vec<(usize, f32)> {
        self.vectors
            .par_iter()
            .enumerate()
            .map(|(index, vector)| (index, cosine_similarity(vector, query)))
            .filter(|&(_, similarity)| OrderedFloat(similarity) == OrderedFloat(score))
            .collect()
    }
}

/// HNSW-based vector index for approximate nearest neighbor search.
///
/// The graph is built once per [`load`](VectorIndex::load); the corpus is read-only afterwards,
/// so searches only take a read lock. Lookups by chunk index go straight to the corpus.
///
/// The graph walk decides which candidates are seen, not their order. When several candidates
/// share the score of the last result, every chunk with that score is collected by an exact
/// scan, so ties are still broken by ascending chunk index.
///
/// # Example
///
/// ```rust
/// use stitch_rag::chunking::FixedSizeChunker;
/// use stitch_rag::index::{HnswIndex, VectorIndex};
///
/// let corpus = FixedSizeChunker::new(4, 0).unwrap().chunk("rustsafe");
/// let index = HnswIndex::new(2);
/// index.load(corpus, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
///
/// let hits = index.search(&[0.0, 1.0], 1, 0.0).unwrap();
/// assert_eq!(hits[0].text, "safe");
/// ```
pub struct HnswIndex {
    dimension: usize,
    state: RwLock<Option<IndexState>>,
}

impl std::fmt::Debug for HnswIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HnswIndex")
            .field("dimension", &self.dimension)
            .field("len", &self.len())
            .finish()
    }
}

impl HnswIndex {
    /// Creates a new HNSW index with the specified embedding dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: RwLock::new(None),
        }
    }
}

impl VectorIndex for HnswIndex {
    fn load(&self, corpus: Corpus, embeddings: Vec<Embedding>) -> Result<()> {
        check_load(self.dimension, &corpus, &embeddings)?;

        let vectors: Vec<Arc<[f32]>> = embeddings.into_iter().map(Arc::from).collect();
        let hnsw = if vectors.is_empty() {
            None
        } else {
            let indices: Vec<usize> = (0..vectors.len()).collect();
            let points: Vec<EmbeddingPoint> = vectors
                .iter()
                .map(|embedding| EmbeddingPoint {
                    embedding: Arc::clone(embedding),
                })
                .collect();
            Some(Builder::default().build(points, indices))
        };

        *self.state.write() = Some(IndexState {
            corpus,
            vectors,
            hnsw,
        });
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<Hit>> {
        check_query(self.dimension, query)?;

        let guard = self.state.read();
        let Some(state) = guard.as_ref() else {
            return Ok(Vec::new());
        };
        let Some(hnsw) = state.hnsw.as_ref() else {
            return Ok(Vec::new());
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_point = EmbeddingPoint {
            embedding: Arc::from(query),
        };
        let mut search = Search::default();

        let mut scored: Vec<(usize, f32)> = hnsw
            .search(&query_point, &mut search)
            .map(|candidate| {
                let index = *candidate.value;
                (index, state.score(index, query))
            })
            .filter(|&(_, similarity)| similarity >= threshold)
            .collect();
        rank(&mut scored);

        if let Some(&(_, cutoff)) = scored.get(top_k - 1) {
            let shared = scored
                .iter()
                .filter(|&&(_, similarity)| OrderedFloat(similarity) == OrderedFloat(cutoff))
                .count();
            if shared > 1 {
                scored.retain(|&(_, similarity)| similarity > cutoff);
                scored.extend(state.tied_at(cutoff, query));
                rank(&mut scored);
            }
        }
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .filter_map(|(index, score)| {
                state
                    .corpus
                    .chunk(index)
                    .map(|chunk| Hit::from_chunk(&chunk, score))
            })
            .collect())
    }

    fn get(&self, index: usize) -> Option<Chunk> {
        self.state.read().as_ref()?.corpus.chunk(index)
    }

    fn corpus(&self) -> Option<Corpus> {
        self.state.read().as_ref().map(|state| state.corpus.clone())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.state.read().as_ref().map_or(0, |state| state.corpus.len())
    }

    fn clear(&self) {
        *self.state.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::FixedSizeChunker;
    use crate::error::RagError;

    fn two_chunks() -> Corpus {
        FixedSizeChunker::new(5, 0).unwrap().chunk("helloworld")
    }

    #[test]
    fn load_and_search() {
        let index = HnswIndex::new(4);
        index
            .load(
                two_chunks(),
                vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]],
            )
            .unwrap();

        assert_eq!(index.len(), 2);

        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 1, 0.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, Some(0));
        assert_eq!(results[0].text, "hello");
    }

    #[test]
    fn dimension_mismatch() {
        let index = HnswIndex::new(4);
        let result = index.load(two_chunks(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(result, Err(RagError::DimensionMismatch { .. })));
    }

    #[test]
    fn embedding_count_mismatch() {
        let index = HnswIndex::new(2);
        let result = index.load(two_chunks(), vec![vec![1.0, 0.0]]);
        assert!(matches!(
            result,
            Err(RagError::EmbeddingCount {
                expected: 2,
                actual: 1
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn threshold_filtering() {
        let index = HnswIndex::new(4);
        index
            .load(
                two_chunks(),
                vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]],
            )
            .unwrap();

        // High threshold should filter out low-similarity results
        let results = index.search(&[1.0, 0.0, 0.0, 0.0], 10, 0.9).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, Some(0));
    }

    #[test]
    fn ties_at_cutoff_resolve_by_index() {
        let corpus = FixedSizeChunker::new(1, 0).unwrap().chunk(&"x".repeat(40));
        let index = HnswIndex::new(2);
        index.load(corpus, vec![vec![1.0, 0.0]; 40]).unwrap();

        let hits = index.search(&[1.0, 0.0], 3, 0.0).unwrap();
        let order: Vec<_> = hits.iter().map(|hit| hit.index).collect();
        assert_eq!(order, [Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn lookup_by_index() {
        let index = HnswIndex::new(2);
        index
            .load(two_chunks(), vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();

        assert_eq!(index.get(1).unwrap().text(), "world");
        assert!(index.get(2).is_none());
    }

    #[test]
    fn empty_corpus_loads() {
        let index = HnswIndex::new(2);
        let corpus = FixedSizeChunker::new(5, 0).unwrap().chunk("");
        index.load(corpus, Vec::new()).unwrap();

        assert!(index.is_empty());
        assert!(index.corpus().is_some());
        assert!(index.search(&[1.0, 0.0], 3, 0.0).unwrap().is_empty());
    }

    #[test]
    fn clear_index() {
        let index = HnswIndex::new(2);
        index
            .load(two_chunks(), vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();

        assert_eq!(index.len(), 2);
        index.clear();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }
}
