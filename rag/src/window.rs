//! Context window assembly: neighbour expansion and overlap-aware merging.
//!
//! Given a hit chunk, the [`WindowAssembler`] fetches the chunks up to `num_neighbors`
//! positions on either side, orders them by index, and stitches their text back together.
//!
//! Overlap is trimmed from each chunk's real source offset rather than from a constant, so two
//! chunks are only de-duplicated by as much text as they actually share. When the source text
//! between two consecutive chunks of a window is missing (a neighbour could not be found) the
//! join is recorded as a [`Seam::Gap`] and the configured [`GapPolicy`] decides what goes in
//! between.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::locator::{ChunkLocator, Located};
use crate::types::Chunk;

/// Text inserted between non-contiguous chunks by [`GapPolicy::default`].
pub const DEFAULT_GAP_MARKER: &str = "\n[...]\n";

/// What to put between two chunks whose source spans do not touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Insert the given marker text.
    Marker(String),
    /// Append the next chunk directly.
    Concatenate,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::Marker(DEFAULT_GAP_MARKER.to_owned())
    }
}

/// How one chunk of a window was joined to the text before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seam {
    /// The chunk continues the covered text; `trimmed` leading characters were shared and dropped.
    Overlap {
        /// Characters dropped from the start of the chunk.
        trimmed: usize,
    },
    /// `missing_chars` characters of source text lie between the covered text and the chunk.
    Gap {
        /// Characters of source text absent from the window.
        missing_chars: usize,
    },
}

/// Merged text spanning a hit chunk and its fetched neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextWindow {
    /// Index of the chunk the window was built around.
    pub hit_index: usize,
    /// Indices of the chunks merged into the window, ascending.
    pub covered_indices: Vec<usize>,
    /// Character range of the source text from the first to the last covered chunk.
    pub source_range: Range<usize>,
    /// `seams[i]` describes how `covered_indices[i + 1]` was joined.
    pub seams: Vec<Seam>,
    /// The merged text.
    pub text: String,
}

impl ContextWindow {
    /// Returns `true` if any part of [`source_range`](Self::source_range) is missing from the
    /// text.
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        self.seams.iter().any(|seam| matches!(seam, Seam::Gap { .. }))
    }

    /// Indices between the first and last covered chunk that were not included.
    #[must_use]
    pub fn missing_indices(&self) -> Vec<usize> {
        self.covered_indices
            .windows(2)
            .flat_map(|pair| pair[0] + 1..pair[1])
            .collect()
    }
}

/// Builds [`ContextWindow`]s around hit chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowAssembler {
    num_neighbors: usize,
    gap_policy: GapPolicy,
}

impl WindowAssembler {
    /// Creates an assembler fetching `num_neighbors` chunks on each side of a hit.
    #[must_use]
    pub fn new(num_neighbors: usize) -> Self {
        Self {
            num_neighbors,
            gap_policy: GapPolicy::default(),
        }
    }

    /// Sets the policy applied between non-contiguous chunks.
    #[must_use]
    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    /// Neighbour radius.
    #[must_use]
    pub const fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// Policy applied between non-contiguous chunks.
    #[must_use]
    pub const fn gap_policy(&self) -> &GapPolicy {
        &self.gap_policy
    }

    /// Expands `hit` with its neighbours and merges them into one window.
    ///
    /// With `num_neighbors == 0` the window text is exactly the hit's text.
    #[must_use]
    pub fn assemble(&self, hit: &Chunk, locator: &ChunkLocator<'_>) -> ContextWindow {
        let working = self.gather(hit, locator);
        self.merge(hit.index(), working)
    }

    /// Collects the hit and every neighbour that exists, keyed (and therefore ordered) by index.
    ///
    /// Each distance is probed independently: a missing chunk at distance 1 does not stop the
    /// chunk at distance 2 from being included.
    fn gather(&self, hit: &Chunk, locator: &ChunkLocator<'_>) -> BTreeMap<usize, Chunk> {
        let mut working = BTreeMap::new();
        working.insert(hit.index(), hit.clone());

        // Nothing the issuing corpus knows lies further out than this.
        let reach = hit
            .index()
            .max(hit.corpus_len().saturating_sub(hit.index() + 1));
        for distance in 1..=self.num_neighbors.min(reach) {
            let Ok(distance) = isize::try_from(distance) else {
                break;
            };
            for delta in [-distance, distance] {
                let Located::Found(chunk) = locator.locate_relative(hit.index(), delta) else {
                    continue;
                };
                if chunk.fingerprint() != hit.fingerprint() {
                    tracing::warn!(
                        hit = hit.index(),
                        neighbor = chunk.index(),
                        "neighbor belongs to a different corpus, dropping it"
                    );
                    continue;
                }
                working.insert(chunk.index(), chunk);
            }
        }

        working
    }

    fn merge(&self, hit_index: usize, working: BTreeMap<usize, Chunk>) -> ContextWindow {
        let mut covered_indices = Vec::with_capacity(working.len());
        let mut seams = Vec::with_capacity(working.len().saturating_sub(1));
        let mut text = String::new();
        let mut covered: Option<Range<usize>> = None;

        for chunk in working.into_values() {
            covered_indices.push(chunk.index());

            let Some(range) = covered.as_mut() else {
                text.push_str(chunk.text());
                covered = Some(chunk.source_offset()..chunk.end_offset());
                continue;
            };

            if chunk.source_offset() <= range.end {
                let trimmed = (range.end - chunk.source_offset()).min(chunk.char_len());
                text.push_str(chunk.text_after(trimmed));
                seams.push(Seam::Overlap { trimmed });
            } else {
                let missing_chars = chunk.source_offset() - range.end;
                if let GapPolicy::Marker(marker) = &self.gap_policy {
                    text.push_str(marker);
                }
                text.push_str(chunk.text());
                seams.push(Seam::Gap { missing_chars });
            }
            range.end = range.end.max(chunk.end_offset());
        }

        ContextWindow {
            hit_index,
            covered_indices,
            source_range: covered.unwrap_or_default(),
            seams,
            text,
        }
    }
}
