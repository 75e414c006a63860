//! Overlap-aware context window retrieval.
//!
//! Fixed-size chunk retrieval returns fragments cut at arbitrary character boundaries. This crate
//! expands every retrieved chunk into a wider window by pulling in its chronological neighbours
//! and stitching them back together without repeating the text consecutive chunks share.
//!
//! - [`FixedSizeChunker`] splits a text into an indexed, overlapping [`Corpus`].
//! - [`RagStore`] embeds a corpus with any [`EmbeddingModel`](stitch_core::EmbeddingModel) and
//!   serves similarity search through a [`VectorIndex`] ([`FlatIndex`] or [`HnswIndex`]).
//! - [`WindowAssembler`] merges a hit with its neighbours into a [`ContextWindow`].
//! - [`Retriever`] runs the whole query path over any [`ChunkIndex`].
//!
//! # Example
//!
//! ```rust
//! use stitch_rag::{ChunkLocator, FixedSizeChunker, WindowAssembler};
//!
//! let corpus = FixedSizeChunker::new(6, 2).unwrap().chunk("the quick brown fox");
//! let hit = corpus.chunk(1).unwrap();
//! assert_eq!(hit.text(), "quick ");
//!
//! let window = WindowAssembler::new(1).assemble(&hit, &ChunkLocator::new(&corpus));
//! assert_eq!(window.text, "the quick brow");
//! ```

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod locator;
pub mod retrieval;
pub mod store;
pub mod types;
pub mod window;

pub use chunking::{ChunkingParams, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use corpus::Corpus;
pub use error::{ConfigError, RagError, Result};
pub use fingerprint::corpus_fingerprint;
pub use index::{FlatIndex, HnswIndex, VectorIndex};
pub use locator::{ChunkLocator, ChunkLookup, Located};
pub use retrieval::{Retrieval, Retriever, ScoredWindow, SkippedHits};
pub use store::{ChunkIndex, RagStore};
pub use types::{Chunk, Hit};
pub use window::{ContextWindow, DEFAULT_GAP_MARKER, GapPolicy, Seam, WindowAssembler};
