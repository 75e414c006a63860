//! Exact brute-force vector index.

use parking_lot::RwLock;
use rayon::prelude::*;
use stitch_core::Embedding;

use crate::corpus::Corpus;
use crate::error::Result;
use crate::types::{Chunk, Hit};

use super::{VectorIndex, check_load, check_query, cosine_similarity, rank};

/// Parallel cosine-similarity index that scores every chunk on each query.
///
/// Search is exact and deterministic, which makes this the index of choice for small and
/// medium corpora and for tests. Scoring runs on the rayon thread pool.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    state: RwLock<Option<Loaded>>,
}

#[derive(Debug)]
struct Loaded {
    corpus: Corpus,
    embeddings: Vec<Embedding>,
}

impl FlatIndex {
    /// Creates an empty index. The dimension must match the embedder's output size.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: RwLock::new(None),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn load(&self, corpus: Corpus, embeddings: Vec<Embedding>) -> Result<()> {
        check_load(self.dimension, &corpus, &embeddings)?;
        *self.state.write() = Some(Loaded { corpus, embeddings });
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<Hit>> {
        check_query(self.dimension, query)?;

        let state = self.state.read();
        let Some(loaded) = state.as_ref() else {
            return Ok(Vec::new());
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = loaded
            .embeddings
            .par_iter()
            .enumerate()
            .map(|(index, embedding)| (index, cosine_similarity(embedding, query)))
            .filter(|&(_, score)| score >= threshold)
            .collect();

        rank(&mut scored);
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .filter_map(|(index, score)| {
                loaded
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
        self.state.read().as_ref().map(|loaded| loaded.corpus.clone())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.state.read().as_ref().map_or(0, |loaded| loaded.corpus.len())
    }

    fn clear(&self) {
        *self.state.write() = None;
    }
}
