//! Core types for the retrieval crate.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A chunk of a corpus.
///
/// A chunk does not own its text: it is a character range into the single source text held by
/// the [`Corpus`](crate::Corpus) that issued it, so cloning a chunk is cheap.
#[derive(Clone)]
pub struct Chunk {
    index: usize,
    source_offset: usize,
    char_len: usize,
    byte_start: usize,
    byte_end: usize,
    fingerprint: u64,
    corpus_len: usize,
    source: Arc<str>,
}

impl Chunk {
    pub(crate) fn new(
        index: usize,
        source_offset: usize,
        char_len: usize,
        (byte_start, byte_end): (usize, usize),
        (fingerprint, corpus_len): (u64, usize),
        source: Arc<str>,
    ) -> Self {
        Self {
            index,
            source_offset,
            char_len,
            byte_start,
            byte_end,
            fingerprint,
            corpus_len,
            source,
        }
    }

    /// Chronological position of this chunk within its corpus (0-based).
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Character offset in the source text where this chunk starts.
    #[must_use]
    pub const fn source_offset(&self) -> usize {
        self.source_offset
    }

    /// Length of this chunk in characters.
    #[must_use]
    pub const fn char_len(&self) -> usize {
        self.char_len
    }

    /// Character offset one past the end of this chunk.
    #[must_use]
    pub const fn end_offset(&self) -> usize {
        self.source_offset + self.char_len
    }

    /// Fingerprint of the corpus that issued this chunk.
    #[must_use]
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of chunks in the corpus that issued this chunk.
    #[must_use]
    pub const fn corpus_len(&self) -> usize {
        self.corpus_len
    }

    /// Text content of the chunk.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.source[self.byte_start..self.byte_end]
    }

    /// Text content with the first `chars` characters dropped.
    #[must_use]
    pub fn text_after(&self, chars: usize) -> &str {
        let text = self.text();
        text.char_indices()
            .nth(chars)
            .map_or("", |(byte, _)| &text[byte..])
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
            && self.index == other.index
            && self.source_offset == other.source_offset
            && self.char_len == other.char_len
    }
}

impl Eq for Chunk {}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("index", &self.index)
            .field("source_offset", &self.source_offset)
            .field("char_len", &self.char_len)
            .field("text", &self.text())
            .finish_non_exhaustive()
    }
}

impl Serialize for Chunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Chunk", 3)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("source_offset", &self.source_offset)?;
        state.serialize_field("text", self.text())?;
        state.end()
    }
}

/// A search result: a chunk reference plus its relevance score.
///
/// `index` is `None` when a backend could not attach chunk metadata to the result. Such hits
/// cannot be expanded into a context window and are skipped by the
/// [`Retriever`](crate::Retriever).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Chunk index within the corpus, if known.
    pub index: Option<usize>,
    /// Similarity score (higher is better, typically -1.0 to 1.0 for cosine similarity).
    pub score: f32,
    /// Text of the matching chunk as returned by the backend.
    pub text: String,
}

impl Hit {
    /// Creates a hit for a corpus chunk.
    #[must_use]
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            index: Some(chunk.index()),
            score,
            text: chunk.text().to_owned(),
        }
    }

    /// Creates a hit that carries no chunk index.
    #[must_use]
    pub fn without_index(text: impl Into<String>, score: f32) -> Self {
        Self {
            index: None,
            score,
            text: text.into(),
        }
    }
}
