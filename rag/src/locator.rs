//! Chunk lookup by chronological index.

use std::fmt;
use std::sync::Arc;

use crate::types::Chunk;

/// Direct-access lookup of chunks by index.
///
/// Implementations must answer in O(1) or O(log N): the assembler issues up to
/// `2 * num_neighbors` lookups per hit.
pub trait ChunkLookup: Send + Sync {
    /// Returns the chunk with the given index, or `None` if no such chunk exists.
    fn lookup_by_index(&self, index: usize) -> Option<Chunk>;
}

impl<T: ChunkLookup + ?Sized> ChunkLookup for &T {
    fn lookup_by_index(&self, index: usize) -> Option<Chunk> {
        (**self).lookup_by_index(index)
    }
}

impl<T: ChunkLookup + ?Sized> ChunkLookup for Arc<T> {
    fn lookup_by_index(&self, index: usize) -> Option<Chunk> {
        (**self).lookup_by_index(index)
    }
}

/// Outcome of a locator lookup.
///
/// `NotFound` is an expected value at document boundaries, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The chunk exists.
    Found(Chunk),
    /// No chunk with that index.
    NotFound,
}

impl Located {
    /// Converts into an `Option`.
    #[must_use]
    pub fn found(self) -> Option<Chunk> {
        match self {
            Self::Found(chunk) => Some(chunk),
            Self::NotFound => None,
        }
    }

    /// Returns `true` for [`Located::Found`].
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl From<Option<Chunk>> for Located {
    fn from(value: Option<Chunk>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Lookup discipline used by the assembler and the orchestrator.
#[derive(Clone, Copy)]
pub struct ChunkLocator<'a> {
    source: &'a dyn ChunkLookup,
}

impl<'a> ChunkLocator<'a> {
    /// Wraps a chunk source.
    #[must_use]
    pub fn new(source: &'a dyn ChunkLookup) -> Self {
        Self { source }
    }

    /// Looks up the chunk at `index`.
    #[must_use]
    pub fn locate(&self, index: usize) -> Located {
        self.source.lookup_by_index(index).into()
    }

    /// Looks up the chunk `delta` positions away from `index`.
    ///
    /// Positions before the start of the corpus are [`Located::NotFound`].
    #[must_use]
    pub fn locate_relative(&self, index: usize, delta: isize) -> Located {
        index
            .checked_add_signed(delta)
            .map_or(Located::NotFound, |target| self.locate(target))
    }
}

impl fmt::Debug for ChunkLocator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkLocator").finish_non_exhaustive()
    }
}
