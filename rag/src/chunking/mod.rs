//! Text chunking for retrieval.
//!
//! This module provides [`ChunkingParams`], the validated `(chunk_size, overlap)` pair every
//! corpus is built with, and the [`FixedSizeChunker`] that turns a source text into a
//! [`Corpus`](crate::Corpus) of overlapping, index-tagged chunks.
//!
//! Sizes and offsets are counted in characters (Unicode scalar values), never in bytes.

mod fixed;

pub use fixed::FixedSizeChunker;

use serde::Serialize;

use crate::error::ConfigError;

/// Validated chunking parameters.
///
/// Construction goes through [`ChunkingParams::new`], so a value of this type always has a
/// positive [`step`](ChunkingParams::step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkingParams {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingParams {
    /// Validates and creates chunking parameters.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroChunkSize`] if `chunk_size == 0` and
    /// [`ConfigError::OverlapTooLarge`] if `overlap >= chunk_size`.
    pub const fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum characters per chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive chunks.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the start offsets of consecutive chunks. Always positive.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Number of chunks a text of `char_len` characters splits into.
    #[must_use]
    pub const fn chunk_count(&self, char_len: usize) -> usize {
        if char_len == 0 {
            0
        } else if char_len <= self.chunk_size {
            1
        } else {
            (char_len - self.overlap).div_ceil(self.step())
        }
    }
}

impl Default for ChunkingParams {
    /// 512 characters per chunk, 64 characters of overlap.
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk_size() {
        assert_eq!(ChunkingParams::new(0, 0), Err(ConfigError::ZeroChunkSize));
    }

    #[test]
    fn rejects_overlap_not_below_chunk_size() {
        assert_eq!(
            ChunkingParams::new(50, 50),
            Err(ConfigError::OverlapTooLarge {
                chunk_size: 50,
                overlap: 50
            })
        );
        assert!(ChunkingParams::new(50, 80).is_err());
    }

    #[test]
    fn step_is_size_minus_overlap() {
        let params = ChunkingParams::new(200, 100).unwrap();
        assert_eq!(params.step(), 100);
        assert_eq!(ChunkingParams::new(10, 0).unwrap().step(), 10);
    }

    #[test]
    fn count_law() {
        let params = ChunkingParams::new(200, 100).unwrap();
        assert_eq!(params.chunk_count(0), 0);
        assert_eq!(params.chunk_count(1), 1);
        assert_eq!(params.chunk_count(200), 1);
        assert_eq!(params.chunk_count(201), 2);
        assert_eq!(params.chunk_count(500), 4);

        let params = ChunkingParams::new(10, 3).unwrap();
        assert_eq!(params.chunk_count(24), 3);
        assert_eq!(params.chunk_count(25), 4);
    }

    #[test]
    fn default_params() {
        let params = ChunkingParams::default();
        assert_eq!(params.chunk_size(), 512);
        assert_eq!(params.overlap(), 64);
    }
}
