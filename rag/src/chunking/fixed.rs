//! Fixed-size text chunking.

use std::sync::Arc;

use crate::corpus::{ChunkSpan, Corpus};
use crate::error::ConfigError;

use super::ChunkingParams;

/// Chunks text into fixed-size pieces with configurable overlap.
///
/// Chunk `i` starts at character offset `i * step` and spans at most `chunk_size` characters.
/// Chunking stops with the first chunk that reaches the end of the text, so only the final
/// chunk can be shorter than `chunk_size` and a text that fits in one chunk yields exactly one.
///
/// # Example
///
/// ```rust
/// use stitch_rag::chunking::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(4, 1).unwrap();
/// let corpus = chunker.chunk("abcdefghij");
/// let texts: Vec<_> = corpus.chunk_texts().collect();
/// assert_eq!(texts, ["abcd", "defg", "ghij"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedSizeChunker {
    params: ChunkingParams,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker.
    ///
    /// # Arguments
    /// * `chunk_size` - Maximum characters per chunk
    /// * `overlap` - Characters to overlap between consecutive chunks
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `chunk_size == 0` or `overlap >= chunk_size`.
    pub const fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        match ChunkingParams::new(chunk_size, overlap) {
            Ok(params) => Ok(Self { params }),
            Err(err) => Err(err),
        }
    }

    /// Creates a chunker from already validated parameters.
    #[must_use]
    pub const fn with_params(params: ChunkingParams) -> Self {
        Self { params }
    }

    /// Returns the parameters this chunker emits corpora with.
    #[must_use]
    pub const fn params(&self) -> ChunkingParams {
        self.params
    }

    /// Splits `text` into a corpus of overlapping chunks.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Corpus {
        let text: Arc<str> = Arc::from(text);

        // Byte position of every character boundary, with the end of the text as sentinel.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let chunk_size = self.params.chunk_size();
        let step = self.params.step();
        let mut spans = Vec::with_capacity(self.params.chunk_count(char_len));
        let mut start = 0;

        while start < char_len {
            let end = (start + chunk_size).min(char_len);
            spans.push(ChunkSpan {
                source_offset: start,
                char_len: end - start,
                byte_start: boundaries[start],
                byte_end: boundaries[end],
            });
            if end == char_len {
                break;
            }
            start += step;
        }

        tracing::debug!(
            chunks = spans.len(),
            chars = char_len,
            chunk_size,
            overlap = self.params.overlap(),
            "chunked text"
        );

        Corpus::new(text, self.params, spans, char_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + u8::try_from(i % 26).unwrap()))
            .collect()
    }

    /// Concatenates all chunks, dropping the leading `overlap` characters of every chunk after
    /// the first.
    fn reassemble(corpus: &Corpus) -> String {
        let overlap = corpus.params().overlap();
        let mut out = String::new();
        for chunk in corpus.chunks() {
            if chunk.index() == 0 {
                out.push_str(chunk.text());
            } else {
                out.push_str(chunk.text_after(overlap));
            }
        }
        out
    }

    #[test]
    fn small_text_single_chunk() {
        let chunker = FixedSizeChunker::new(100, 20).unwrap();
        let corpus = chunker.chunk("Short text");

        assert_eq!(corpus.len(), 1);
        let chunk = corpus.chunk(0).unwrap();
        assert_eq!(chunk.text(), "Short text");
        assert_eq!(chunk.index(), 0);
        assert_eq!(chunk.source_offset(), 0);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        let corpus = FixedSizeChunker::new(10, 2).unwrap().chunk("");
        assert!(corpus.is_empty());
        assert_eq!(reassemble(&corpus), "");
    }

    #[test]
    fn five_hundred_chars_by_two_hundred() {
        let text = sample_text(500);
        let corpus = FixedSizeChunker::new(200, 100).unwrap().chunk(&text);

        let offsets: Vec<_> = corpus.chunks().map(|c| c.source_offset()).collect();
        assert_eq!(offsets, [0, 100, 200, 300]);
        let last = corpus.chunk(3).unwrap();
        assert_eq!(last.text(), &text[300..500]);
        assert_eq!(last.char_len(), 200);
    }

    #[test]
    fn offsets_follow_step_and_only_last_is_short() {
        let text = sample_text(457);
        let corpus = FixedSizeChunker::new(64, 16).unwrap().chunk(&text);
        let count = corpus.len();

        assert_eq!(count, corpus.params().chunk_count(457));
        for chunk in corpus.chunks() {
            assert_eq!(chunk.source_offset(), chunk.index() * 48);
            assert!(chunk.char_len() <= 64);
            if chunk.index() + 1 < count {
                assert_eq!(chunk.char_len(), 64);
            }
        }
        assert_eq!(corpus.chunk(count - 1).unwrap().end_offset(), 457);
    }

    #[test]
    fn round_trip_reconstructs_text() {
        for (len, size, overlap) in [(0, 5, 0), (1, 5, 4), (37, 5, 0), (200, 17, 16), (333, 50, 10)] {
            let text = sample_text(len);
            let corpus = FixedSizeChunker::new(size, overlap).unwrap().chunk(&text);
            assert_eq!(reassemble(&corpus), text, "len={len} size={size} overlap={overlap}");
            assert_eq!(corpus.len(), corpus.params().chunk_count(len));
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld ✓ ünïcode";
        let corpus = FixedSizeChunker::new(6, 2).unwrap().chunk(text);

        for chunk in corpus.chunks() {
            assert!(chunk.text().chars().count() <= 6);
        }
        assert_eq!(corpus.chunk(0).unwrap().text(), "héllo ");
        assert_eq!(corpus.chunk(1).unwrap().text(), "o wörl");
        assert_eq!(reassemble(&corpus), text);
        assert_eq!(corpus.char_len(), text.chars().count());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(FixedSizeChunker::new(0, 0), Err(ConfigError::ZeroChunkSize));
        assert!(matches!(
            FixedSizeChunker::new(10, 10),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }

    #[test]
    fn default_settings() {
        let chunker = FixedSizeChunker::default();
        assert_eq!(chunker.params().chunk_size(), 512);
        assert_eq!(chunker.params().overlap(), 64);
    }
}
