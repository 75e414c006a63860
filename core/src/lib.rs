//! # stitch-core
//!
//! `stitch-core` hosts the `no_std` trait layer the rest of the workspace builds on. Retrieval
//! code in `stitch-rag` is written against these traits, so any provider that implements them
//! can back a chunk index without touching the assembler or the orchestrator.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   stitch-rag    │───▶│   stitch-core    │◀───│   Providers     │
//! │                 │    │   (this crate)   │    │                 │
//! │ - chunking      │    │                  │    │ - ONNX models   │
//! │ - vector index  │    │ - EmbeddingModel │    │ - hosted APIs   │
//! │ - windows       │    │ - Result         │    │ - test doubles  │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`embedding`]: turn text into dense vectors.

#![no_std]
extern crate alloc;

/// Text embeddings.
pub mod embedding;

#[doc(inline)]
pub use embedding::{Embedding, EmbeddingModel};

/// Result type used by provider-facing traits.
///
/// Type alias for [`anyhow::Result<T>`](anyhow::Result).
pub type Result<T = ()> = anyhow::Result<T>;

pub use anyhow::Error;
