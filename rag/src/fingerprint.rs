//! Corpus fingerprints using xxhash.

use xxhash_rust::xxh3::Xxh3;

use crate::chunking::ChunkingParams;

/// Computes the fingerprint identifying a chunked corpus.
///
/// Two corpora share a fingerprint only if they were chunked from the same text with the same
/// parameters, i.e. only if their chunk indices mean the same thing.
#[must_use]
pub fn corpus_fingerprint(text: &str, params: ChunkingParams) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&(params.chunk_size() as u64).to_le_bytes());
    hasher.update(&(params.overlap() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    hasher.digest()
}
