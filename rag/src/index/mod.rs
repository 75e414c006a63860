//! Vector index implementations.
//!
//! This module provides the [`VectorIndex`] trait and two implementations:
//!
//! - [`FlatIndex`]: exact cosine similarity over every chunk, scored in parallel.
//! - [`HnswIndex`]: approximate nearest neighbour search for larger corpora.
//!
//! A vector index holds exactly one [`Corpus`] at a time together with one embedding per chunk,
//! stored in chunk order so that lookups by index are direct.

mod flat;
mod hnsw;

pub use flat::FlatIndex;
pub use hnsw::HnswIndex;

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use stitch_core::Embedding;

use crate::corpus::Corpus;
use crate::error::{RagError, Result};
use crate::types::{Chunk, Hit};

/// Trait for vector index implementations.
pub trait VectorIndex: Send + Sync {
    /// Replaces the index content with `corpus`, where `embeddings[i]` belongs to chunk `i`.
    fn load(&self, corpus: Corpus, embeddings: Vec<Embedding>) -> Result<()>;

    /// Searches for the chunks most similar to the query vector.
    ///
    /// Results are ordered by descending score, ties broken by ascending chunk index.
    ///
    /// # Arguments
    /// * `query` - The query embedding vector
    /// * `top_k` - Maximum number of results to return
    /// * `threshold` - Minimum similarity score
    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<Hit>>;

    /// Returns the chunk at `index` of the loaded corpus.
    fn get(&self, index: usize) -> Option<Chunk>;

    /// Returns the loaded corpus, if any.
    fn corpus(&self) -> Option<Corpus>;

    /// Returns the embedding dimension.
    fn dimension(&self) -> usize;

    /// Returns the number of indexed chunks.
    fn len(&self) -> usize;

    /// Returns `true` if the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the loaded corpus.
    fn clear(&self);
}

/// Computes cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Checks that `embeddings` fits `corpus` and `dimension` before a load.
pub(crate) fn check_load(dimension: usize, corpus: &Corpus, embeddings: &[Embedding]) -> Result<()> {
    if embeddings.len() != corpus.len() {
        return Err(RagError::EmbeddingCount {
            expected: corpus.len(),
            actual: embeddings.len(),
        });
    }
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
        return Err(RagError::DimensionMismatch {
            expected: dimension,
            actual: bad.len(),
        });
    }
    Ok(())
}

/// Checks a query vector against the index dimension.
pub(crate) fn check_query(dimension: usize, query: &[f32]) -> Result<()> {
    if query.len() == dimension {
        Ok(())
    } else {
        Err(RagError::DimensionMismatch {
            expected: dimension,
            actual: query.len(),
        })
    }
}

/// Sorts `(chunk index, score)` pairs by descending score, then ascending index.
pub(crate) fn rank(scored: &mut [(usize, f32)]) {
    scored.sort_unstable_by_key(|&(index, score)| (Reverse(OrderedFloat(score)), index));
}
