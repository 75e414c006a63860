//! Error types for the retrieval crate.

use thiserror::Error;

/// Invalid chunking or retrieval parameters.
///
/// These are fatal: nothing is retried, the caller has to fix the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `chunk_size` was zero.
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    /// `overlap >= chunk_size`, which would make the chunking step non-positive.
    #[error("overlap ({overlap}) must be less than chunk_size ({chunk_size})")]
    OverlapTooLarge {
        /// Configured chunk size.
        chunk_size: usize,
        /// Configured overlap.
        overlap: usize,
    },

    /// `default_top_k` was zero.
    #[error("default_top_k must be greater than zero")]
    ZeroTopK,
}

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Embedding operation failed.
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// Dimension mismatch between embedding and index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension provided.
        actual: usize,
    },

    /// The number of embeddings does not match the number of chunks being loaded.
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCount {
        /// Number of chunks in the corpus.
        expected: usize,
        /// Number of embeddings supplied.
        actual: usize,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
