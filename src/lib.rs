//! # stitch
//!
//! Façade crate that re-exports everything from [`stitch_core`] plus, behind the default `rag`
//! feature, the retrieval pipeline from `stitch_rag`.
//!
//! ## What's inside?
//!
//! - [`EmbeddingModel`] for plugging in any embedding provider.
//! - `rag::FixedSizeChunker` to split a text into indexed, overlapping chunks.
//! - `rag::RagStore` and `rag::Retriever` to search a corpus and expand each hit into a
//!   de-duplicated context window.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stitch::EmbeddingModel;
//! use stitch::rag::{RagConfig, RagStore, Retriever};
//!
//! async fn demo(model: impl EmbeddingModel + 'static, manual: &str) -> stitch::rag::Result<()> {
//!     let config = RagConfig::builder().chunking(800, 200).num_neighbors(1).build();
//!     let store = RagStore::with_config(model, config.clone())?;
//!     store.ingest_text(manual).await?;
//!
//!     let retriever = Retriever::from_config(store, &config)?;
//!     for window in retriever.retrieve("how do I reset the device?", 3).await?.windows {
//!         println!("[{:.3}] {}", window.score, window.window.text);
//!     }
//!     Ok(())
//! }
//! ```

#![no_std]

pub use stitch_core::*;

#[cfg(feature = "rag")]
pub use stitch_rag as rag;
