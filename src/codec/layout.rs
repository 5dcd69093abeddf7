use std::ops::Range;

use zerocopy::{LittleEndian, U32};

/// A child reference as stored in a node's offset table.
pub type Offset = U32<LittleEndian>;

pub const OFFSET_SIZE: usize = size_of::<Offset>();

/// The entry count of a node is stored in a single byte.
pub const MAX_ENTRIES: usize = u8::MAX as usize;

static_assertions::const_assert_eq!(OFFSET_SIZE, 4);

/// Byte ranges of one node record at an absolute position in a packed trie.
///
/// ```text
/// [count: u8][keys: count bytes][zero pad][offsets: count * u32 LE]
/// ```
///
/// The offset table starts at the next multiple of [`OFFSET_SIZE`] after the
/// keys, measured from the start of the packed trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    start: usize,
    entries: usize,
    offsets_start: usize,
}

impl NodeLayout {
    #[inline]
    pub const fn at(start: usize, entries: usize) -> Self {
        Self {
            start,
            entries,
            offsets_start: align_up(start + 1 + entries),
        }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    #[inline]
    pub const fn keys(&self) -> Range<usize> {
        (self.start + 1)..(self.start + 1 + self.entries)
    }

    #[inline]
    pub const fn padding(&self) -> Range<usize> {
        (self.start + 1 + self.entries)..self.offsets_start
    }

    #[inline]
    pub const fn offsets(&self) -> Range<usize> {
        self.offsets_start..self.end()
    }

    /// The byte range of the offset field belonging to entry `idx`.
    #[inline]
    pub const fn offset_field(&self, idx: usize) -> Range<usize> {
        assert!(idx < self.entries, "entry index out of range");
        let start = self.offsets_start + idx * OFFSET_SIZE;
        start..(start + OFFSET_SIZE)
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.offsets_start + self.entries * OFFSET_SIZE
    }

    #[inline]
    pub const fn size(&self) -> usize {
        self.end() - self.start
    }
}

#[inline]
const fn align_up(pos: usize) -> usize {
    (pos + OFFSET_SIZE - 1) & !(OFFSET_SIZE - 1)
}
