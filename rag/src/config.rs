//! Configuration for chunking and retrieval.

use serde::{Deserialize, Serialize};

use crate::chunking::ChunkingParams;
use crate::error::{ConfigError, Result};
use crate::window::{GapPolicy, WindowAssembler};

/// Configuration for a [`RagStore`](crate::RagStore) and its [`Retriever`](crate::Retriever).
///
/// Every field has a default, so a JSON document only needs the fields it changes:
///
/// ```rust
/// use stitch_rag::RagConfig;
///
/// let config = RagConfig::from_json(r#"{ "chunk_size": 200, "chunk_overlap": 100 }"#).unwrap();
/// assert_eq!(config.chunk_size, 200);
/// assert_eq!(config.num_neighbors, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks fetched on each side of a hit.
    pub num_neighbors: usize,
    /// Default number of hits to expand.
    pub default_top_k: usize,
    /// Minimum similarity score for search results.
    pub similarity_threshold: f32,
    /// What to insert between chunks whose source spans do not touch.
    pub gap_policy: GapPolicy,
}

impl Default for RagConfig {
    fn default() -> Self {
        let params = ChunkingParams::default();
        Self {
            chunk_size: params.chunk_size(),
            chunk_overlap: params.overlap(),
            num_neighbors: 1,
            default_top_k: 5,
            similarity_threshold: 0.0,
            gap_policy: GapPolicy::default(),
        }
    }
}

impl RagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    /// Returns [`RagError::Serialization`](crate::RagError::Serialization) for malformed JSON
    /// and [`RagError::Config`](crate::RagError::Config) for invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration, returning the chunking parameters it describes.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the chunking parameters are invalid or `default_top_k` is
    /// zero.
    pub const fn validate(&self) -> std::result::Result<ChunkingParams, ConfigError> {
        if self.default_top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        ChunkingParams::new(self.chunk_size, self.chunk_overlap)
    }

    /// Builds the window assembler described by this configuration.
    #[must_use]
    pub fn assembler(&self) -> WindowAssembler {
        WindowAssembler::new(self.num_neighbors).with_gap_policy(self.gap_policy.clone())
    }
}

/// Builder for retrieval configuration.
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a new configuration builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the chunk size and overlap.
    #[must_use]
    pub const fn chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self.config.chunk_overlap = chunk_overlap;
        self
    }

    /// Sets the number of neighbours fetched on each side of a hit.
    #[must_use]
    pub const fn num_neighbors(mut self, n: usize) -> Self {
        self.config.num_neighbors = n;
        self
    }

    /// Sets the default number of hits to expand.
    #[must_use]
    pub const fn default_top_k(mut self, k: usize) -> Self {
        self.config.default_top_k = k;
        self
    }

    /// Sets the minimum similarity threshold for search results.
    #[must_use]
    pub const fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Sets the gap policy.
    #[must_use]
    pub fn gap_policy(mut self, policy: GapPolicy) -> Self {
        self.config.gap_policy = policy;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> RagConfig {
        self.config
    }
}
