//! The chunked corpus: one shared source text plus the chunk arena built over it.

use std::fmt;
use std::sync::Arc;

use crate::chunking::ChunkingParams;
use crate::fingerprint::corpus_fingerprint;
use crate::locator::ChunkLookup;
use crate::types::Chunk;

/// Character and byte range of one chunk inside the corpus text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkSpan {
    pub(crate) source_offset: usize,
    pub(crate) char_len: usize,
    pub(crate) byte_start: usize,
    pub(crate) byte_end: usize,
}

/// The ordered chunks of one chunking pass, plus the parameters that produced them.
///
/// The source text is stored exactly once and shared by every [`Chunk`] handed out. Chunk `i`
/// lives at position `i` of the arena, so [`Corpus::chunk`] is a direct lookup.
///
/// A corpus is immutable. Chunking a different text (or the same text with different
/// parameters) produces a corpus with a different [`fingerprint`](Corpus::fingerprint).
#[derive(Clone)]
pub struct Corpus {
    text: Arc<str>,
    params: ChunkingParams,
    spans: Arc<[ChunkSpan]>,
    char_len: usize,
    fingerprint: u64,
}

impl Corpus {
    pub(crate) fn new(
        text: Arc<str>,
        params: ChunkingParams,
        spans: Vec<ChunkSpan>,
        char_len: usize,
    ) -> Self {
        let fingerprint = corpus_fingerprint(&text, params);
        Self {
            text,
            params,
            spans: spans.into(),
            char_len,
            fingerprint,
        }
    }

    /// The full source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the source text in characters.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.char_len
    }

    /// Parameters the corpus was chunked with.
    #[must_use]
    pub const fn params(&self) -> ChunkingParams {
        self.params
    }

    /// Identifies this corpus; stamped on every chunk it issues.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if the corpus has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns the chunk at `index`, or `None` past the end.
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<Chunk> {
        self.spans.get(index).map(|span| self.make_chunk(index, span))
    }

    /// Iterates over all chunks in index order.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = Chunk> + '_ {
        self.spans
            .iter()
            .enumerate()
            .map(|(index, span)| self.make_chunk(index, span))
    }

    /// Iterates over the text of every chunk in index order.
    pub fn chunk_texts(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|span| &self.text[span.byte_start..span.byte_end])
    }

    /// Returns the source text between two character offsets, if both are in range.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.char_len {
            return None;
        }
        let mut boundaries = self
            .text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(self.text.len()));
        let byte_start = boundaries.nth(start)?;
        let byte_end = if end == start {
            byte_start
        } else {
            boundaries.nth(end - start - 1)?
        };
        Some(&self.text[byte_start..byte_end])
    }

    fn make_chunk(&self, index: usize, span: &ChunkSpan) -> Chunk {
        Chunk::new(
            index,
            span.source_offset,
            span.char_len,
            (span.byte_start, span.byte_end),
            (self.fingerprint, self.spans.len()),
            Arc::clone(&self.text),
        )
    }
}

impl ChunkLookup for Corpus {
    fn lookup_by_index(&self, index: usize) -> Option<Chunk> {
        self.chunk(index)
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint))
            .field("params", &self.params)
            .field("chunks", &self.spans.len())
            .field("chars", &self.char_len)
            .finish_non_exhaustive()
    }
}
