pub mod blocks;

use rand::seq::index;
use rand::Rng;
use tracing::debug;

use blocks::CharMap;
pub use blocks::{ChunkSelection, TextBlock};

/// Inserted between two selected blocks that are not adjacent in the source.
pub const DISCONTINUITY_MARKER: &str = "...";

/// Block size used when the budget allows at least three full blocks.
pub const NOMINAL_BLOCK_SIZE: usize = 1000;

/// Anchored random block sampler.
///
/// Texts that fit the budget come back untouched. Longer texts are reduced to
/// a leading block, a trailing block and as many interior blocks as the
/// budget allows, emitted in document order with [`DISCONTINUITY_MARKER`]
/// between non-adjacent blocks. Selected characters never exceed the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomChunkSampler {
    block_size: usize,
}

impl Default for RandomChunkSampler {
    fn default() -> Self {
        Self {
            block_size: NOMINAL_BLOCK_SIZE,
        }
    }
}

impl RandomChunkSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the nominal block size. Zero is treated as one.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Block size for a given budget: the nominal size, shrunk so that the
    /// two anchors plus one interior block always fit.
    pub fn block_size_for(&self, budget: usize) -> usize {
        self.block_size.min((budget / 3).max(1))
    }

    /// Sample using the thread-local random source.
    pub fn sample(&self, text: &str, budget: usize) -> String {
        self.sample_with(text, budget, &mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, text: &str, budget: usize, rng: &mut R) -> String {
        self.select(text, budget, rng).render()
    }

    /// Choose the blocks without rendering them.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        text: &'a str,
        budget: usize,
        rng: &mut R,
    ) -> ChunkSelection<'a> {
        let map = CharMap::new(text);
        let total = map.len();

        if total <= budget {
            if total == 0 {
                return ChunkSelection::default();
            }
            return ChunkSelection::from_sorted(vec![map.block(0, total)]);
        }
        if budget == 0 {
            return ChunkSelection::default();
        }

        let block = self.block_size_for(budget);
        let slots = budget / block;
        if slots < 2 {
            return ChunkSelection::from_sorted(vec![map.block(0, budget)]);
        }

        // total > budget >= 2 * block, so the anchors never touch.
        let leading = map.block(0, block);
        let trailing = map.block(total - block, total);

        let interior_space = total - 2 * block;
        let interior = (slots - 2).min(interior_space / block);
        let slack = interior_space - interior * block;

        let mut selected = Vec::with_capacity(interior + 2);
        selected.push(leading);

        if interior > 0 {
            // Each drawn index is a distinct slot among `slack + interior`
            // positions; subtracting the rank gives a non-decreasing gap, so
            // placed blocks can touch but never overlap.
            let mut drawn = index::sample(rng, slack + interior, interior).into_vec();
            drawn.sort_unstable();

            for (rank, slot) in drawn.into_iter().enumerate() {
                let start = block + (slot - rank) + rank * block;
                selected.push(map.block(start, start + block));
            }
        }

        selected.push(trailing);

        let selection = ChunkSelection::from_sorted(selected);
        debug!(
            total_chars = total,
            budget,
            block_size = block,
            interior_blocks = interior,
            markers = selection.marker_count(),
            "sampled random chunks"
        );
        selection
    }
}

/// The first `max_chars` characters of `text`, or all of it if shorter.
pub fn head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}
