//! # Embedding Module
//!
//! Embeddings are dense vector representations of text. Texts with similar meaning map to
//! vectors that point in similar directions, which is what the similarity search in
//! `stitch-rag` relies on to rank chunks against a query.
//!
//! This crate does not compute embeddings itself. Providers (a local ONNX model, a hosted API,
//! a toy hashing embedder in tests) implement [`EmbeddingModel`] and the retrieval layer stays
//! oblivious to which one it is talking to.
//!
//! ```rust
//! use stitch_core::EmbeddingModel;
//!
//! async fn example<T: EmbeddingModel>(model: &T) -> stitch_core::Result<()> {
//!     let dim = model.dim();
//!     let embedding = model.embed("Hello, world!").await?;
//!     assert_eq!(embedding.len(), dim);
//!
//!     let batch = model.embed_batch(&["first chunk", "second chunk"]).await?;
//!     assert_eq!(batch.len(), 2);
//!     Ok(())
//! }
//! ```

use alloc::vec::Vec;
use core::future::Future;

/// A type alias for an embedding vector of 32-bit floats.
pub type Embedding = Vec<f32>;

/// Converts text to vector representations.
///
/// # Implementation Requirements
///
/// - [`embed`](EmbeddingModel::embed) must return vectors with length equal to
///   [`dim`](EmbeddingModel::dim).
/// - [`embed_batch`](EmbeddingModel::embed_batch) must return one vector per input, in input
///   order.
///
/// # Example
///
/// ```rust
/// use stitch_core::EmbeddingModel;
///
/// struct ConstantEmbedding;
///
/// impl EmbeddingModel for ConstantEmbedding {
///     fn dim(&self) -> usize {
///         384
///     }
///
///     async fn embed(&self, _text: &str) -> stitch_core::Result<Vec<f32>> {
///         Ok(vec![1.0; self.dim()])
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let model = ConstantEmbedding;
/// let embedding = model.embed("The quick brown fox").await.unwrap();
/// assert_eq!(embedding.len(), 384);
/// # });
/// ```
pub trait EmbeddingModel: Send + Sync + Sized {
    /// Returns the embedding vector dimension.
    fn dim(&self) -> usize;

    /// Converts text to an embedding vector of length [`Self::dim`](EmbeddingModel::dim).
    fn embed(&self, text: &str) -> impl Future<Output = crate::Result<Embedding>> + Send;

    /// Embeds several texts, returning the vectors in input order.
    ///
    /// The default implementation calls [`embed`](EmbeddingModel::embed) sequentially. Providers
    /// with a native batch endpoint should override it.
    fn embed_batch(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = crate::Result<Vec<Embedding>>> + Send {
        async move {
            let mut embeddings = Vec::with_capacity(texts.len());
            for text in texts {
                embeddings.push(self.embed(text).await?);
            }
            Ok(embeddings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    struct MockEmbeddingModel {
        dimension: usize,
        calls: AtomicUsize,
    }

    impl MockEmbeddingModel {
        const fn new(dimension: usize) -> Self {
            Self {
                dimension,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingModel for MockEmbeddingModel {
        fn dim(&self) -> usize {
            self.dimension
        }

        #[allow(clippy::cast_precision_loss)]
        async fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut embedding = vec![0.0; self.dimension];
            for (i, value) in embedding.iter_mut().enumerate() {
                *value = (text.len() + i) as f32 * 0.01;
            }
            Ok(embedding)
        }
    }

    #[tokio::test]
    async fn embedding_model_dimension() {
        let model = MockEmbeddingModel::new(768);
        assert_eq!(model.dim(), 768);
        assert_eq!(model.embed("x").await.unwrap().len(), 768);
    }

    #[tokio::test]
    async fn embedding_generation() {
        let model = MockEmbeddingModel::new(4);
        let embedding = model.embed("test").await.unwrap();

        assert_eq!(embedding.len(), 4);
        assert!((embedding[0] - 0.04).abs() < f32::EPSILON);
        assert!((embedding[3] - 0.07).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn default_batch_preserves_order() {
        let model = MockEmbeddingModel::new(2);
        let batch = model.embed_batch(&["a", "abc", ""]).await.unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
        assert!((batch[0][0] - 0.01).abs() < f32::EPSILON);
        assert!((batch[1][0] - 0.03).abs() < f32::EPSILON);
        assert!(batch[2][0].abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let model = MockEmbeddingModel::new(2);
        let batch = model.embed_batch(&[]).await.unwrap();

        assert!(batch.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
