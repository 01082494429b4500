use super::DISCONTINUITY_MARKER;

/// A contiguous run of characters taken from the source text.
///
/// `start` and `end` are character offsets (not byte offsets) into the
/// normalized text, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlock<'a> {
    pub start: usize,
    pub end: usize,
    pub content: &'a str,
}

impl<'a> TextBlock<'a> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `next` begins exactly where this block ends.
    pub fn is_contiguous_with(&self, next: &TextBlock<'_>) -> bool {
        self.end == next.start
    }
}

/// Blocks chosen by the sampler, in ascending offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSelection<'a> {
    blocks: Vec<TextBlock<'a>>,
}

impl<'a> ChunkSelection<'a> {
    pub(crate) fn from_sorted(blocks: Vec<TextBlock<'a>>) -> Self {
        debug_assert!(
            blocks.windows(2).all(|w| w[0].end <= w[1].start),
            "blocks must be sorted and non-overlapping"
        );
        Self { blocks }
    }

    pub fn blocks(&self) -> &[TextBlock<'a>] {
        &self.blocks
    }

    /// Characters of source text covered by the selection.
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(TextBlock::len).sum()
    }

    /// Number of discontinuity markers `render` will insert.
    pub fn marker_count(&self) -> usize {
        self.blocks
            .windows(2)
            .filter(|w| !w[0].is_contiguous_with(&w[1]))
            .count()
    }

    /// Concatenate the blocks, marking every gap between them.
    pub fn render(&self) -> String {
        let capacity = self.blocks.iter().map(|b| b.content.len()).sum::<usize>()
            + self.marker_count() * DISCONTINUITY_MARKER.len();
        let mut out = String::with_capacity(capacity);

        let mut previous: Option<&TextBlock<'a>> = None;
        for block in &self.blocks {
            if let Some(prev) = previous {
                if !prev.is_contiguous_with(block) {
                    out.push_str(DISCONTINUITY_MARKER);
                }
            }
            out.push_str(block.content);
            previous = Some(block);
        }

        out
    }
}

/// Character-offset view over a string.
///
/// ASCII text is indexed directly; anything else keeps a table of char
/// boundaries so that slicing by character offset never splits a code point.
pub(crate) struct CharMap<'a> {
    text: &'a str,
    boundaries: Option<Vec<usize>>,
}

impl<'a> CharMap<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let boundaries = if text.is_ascii() {
            None
        } else {
            let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
            bounds.push(text.len());
            Some(bounds)
        };
        Self { text, boundaries }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.boundaries {
            None => self.text.len(),
            Some(bounds) => bounds.len() - 1,
        }
    }

    fn byte_offset(&self, char_offset: usize) -> usize {
        match &self.boundaries {
            None => char_offset,
            Some(bounds) => bounds[char_offset],
        }
    }

    pub(crate) fn block(&self, start: usize, end: usize) -> TextBlock<'a> {
        let content = &self.text[self.byte_offset(start)..self.byte_offset(end)];
        TextBlock {
            start,
            end,
            content,
        }
    }
}
