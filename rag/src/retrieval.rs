//! Query-time orchestration: search, then expand every hit into a context window.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::RagConfig;
use crate::error::Result;
use crate::locator::{ChunkLocator, Located};
use crate::store::ChunkIndex;
use crate::types::Chunk;
use crate::window::{ContextWindow, WindowAssembler};

/// A context window together with the score of the hit it was built around.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWindow {
    /// Similarity score of the hit.
    pub score: f32,
    /// The expanded window.
    pub window: ContextWindow,
}

/// Hits that produced no window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedHits {
    /// Hits the index returned without a chunk index.
    pub missing_index: usize,
    /// Hits whose chunk index no longer resolves.
    pub unresolved: usize,
}

impl SkippedHits {
    /// Total number of skipped hits.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.missing_index + self.unresolved
    }
}

/// Result of one retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Retrieval {
    /// One window per usable hit, in hit order.
    pub windows: Vec<ScoredWindow>,
    /// What was dropped along the way.
    pub skipped: SkippedHits,
}

impl Retrieval {
    /// Consumes the retrieval, keeping only the window texts.
    #[must_use]
    pub fn into_texts(self) -> Vec<String> {
        self.windows
            .into_iter()
            .map(|scored| scored.window.text)
            .collect()
    }
}

/// Turns a query into an ordered list of context windows.
///
/// ```rust,no_run
/// # async fn run(store: stitch_rag::RagStore<impl stitch_core::EmbeddingModel + 'static>) -> stitch_rag::Result<()> {
/// use stitch_rag::{RagConfig, Retriever};
///
/// let retriever = Retriever::from_config(store, &RagConfig::default())?;
/// for text in retriever.retrieve_texts("how are chunks merged?", 3).await? {
///     println!("{text}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Retriever<S> {
    index: S,
    assembler: WindowAssembler,
    default_top_k: usize,
}

impl<S: ChunkIndex> Retriever<S> {
    /// Creates a retriever over `index`.
    pub fn new(index: S, assembler: WindowAssembler) -> Self {
        Self {
            index,
            assembler,
            default_top_k: RagConfig::default().default_top_k,
        }
    }

    /// Creates a retriever using the neighbour radius, gap policy and default result count of
    /// `config`.
    ///
    /// # Errors
    /// Returns [`RagError::Config`](crate::RagError::Config) if the configuration is invalid.
    pub fn from_config(index: S, config: &RagConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index,
            assembler: config.assembler(),
            default_top_k: config.default_top_k,
        })
    }

    /// Overrides the result count used by [`retrieve_default`](Self::retrieve_default).
    #[must_use]
    pub const fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Returns the underlying chunk index.
    pub const fn index(&self) -> &S {
        &self.index
    }

    /// Returns the window assembler.
    pub const fn assembler(&self) -> &WindowAssembler {
        &self.assembler
    }

    /// Searches for `query` and expands each of the top `top_k` hits into a context window.
    ///
    /// Windows come back in hit order. Hits without a chunk index, and hits whose index the
    /// chunk index no longer knows, are skipped and counted in [`Retrieval::skipped`].
    ///
    /// # Errors
    /// Propagates search failures from the chunk index.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Retrieval> {
        let mut hits = self.index.search(query, top_k).await?;
        hits.truncate(top_k);

        let locator = ChunkLocator::new(&self.index);
        let mut skipped = SkippedHits::default();
        let mut resolved: Vec<(f32, Chunk)> = Vec::with_capacity(hits.len());

        for hit in hits {
            let Some(index) = hit.index else {
                tracing::debug!(score = hit.score, "skipping hit without chunk index");
                skipped.missing_index += 1;
                continue;
            };
            match locator.locate(index) {
                Located::Found(chunk) => resolved.push((hit.score, chunk)),
                Located::NotFound => {
                    tracing::debug!(index, "skipping hit that no longer resolves");
                    skipped.unresolved += 1;
                }
            }
        }

        let windows: Vec<ScoredWindow> = resolved
            .par_iter()
            .map(|(score, chunk)| ScoredWindow {
                score: *score,
                window: self.assembler.assemble(chunk, &locator),
            })
            .collect();

        tracing::debug!(
            windows = windows.len(),
            skipped = skipped.total(),
            "retrieval complete"
        );
        Ok(Retrieval { windows, skipped })
    }

    /// Like [`retrieve`](Self::retrieve), returning only the window texts.
    ///
    /// # Errors
    /// Propagates search failures from the chunk index.
    pub async fn retrieve_texts(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        Ok(self.retrieve(query, top_k).await?.into_texts())
    }

    /// Retrieves with the configured default result count.
    ///
    /// # Errors
    /// Propagates search failures from the chunk index.
    pub async fn retrieve_default(&self, query: &str) -> Result<Retrieval> {
        self.retrieve(query, self.default_top_k).await
    }
}
