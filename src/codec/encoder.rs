use bytes::{BufMut, BytesMut};
use zerocopy::IntoBytes;

use crate::codec::{
    PackErr,
    layout::{MAX_ENTRIES, NodeLayout, Offset},
};

/// Appends one packed trie to a growable buffer.
///
/// Node records are reserved at the end of the buffer and their offset
/// fields are patched later, once the child records have been written. The
/// buffer may reallocate between those two steps, so the encoder only hands
/// out [`NodeLayout`]s (byte positions) and never slices into its storage.
///
/// All positions are relative to where the trie starts, which is the
/// length of the buffer passed to [`Encoder::new`].
pub struct Encoder {
    buf: BytesMut,
    base: usize,
    wrote_trie: bool,
}

impl Encoder {
    pub fn new(buf: BytesMut) -> Self {
        Self {
            base: buf.len(),
            buf,
            wrote_trie: false,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(BytesMut::with_capacity(capacity))
    }

    /// Retrieve the wrapped buffer from the `Encoder`
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }

    /// The number of bytes written since this Encoder was initialized.
    pub fn bytes_written(&self) -> usize {
        self.buf.len() - self.base
    }

    /// Marks the start of a trie. An encoder holds at most one trie since
    /// every offset is relative to the same base.
    pub(crate) fn begin_trie(&mut self) {
        assert!(
            !self.wrote_trie,
            "invalid encoder usage: trie already present"
        );
        self.wrote_trie = true;
    }

    /// Discards everything written for the current trie, leaving the buffer
    /// as it was handed to [`Encoder::new`].
    pub(crate) fn abort_trie(&mut self) {
        self.buf.truncate(self.base);
        self.wrote_trie = false;
    }

    /// Write an already packed trie to the buffer verbatim.
    pub(crate) fn write_packed(&mut self, data: &[u8]) {
        self.begin_trie();
        self.buf.put_slice(data);
    }

    /// Append a node record holding `keys`, with every offset field zeroed.
    pub(crate) fn put_node(&mut self, keys: &[u8]) -> Result<NodeLayout, PackErr> {
        assert!(keys.len() <= MAX_ENTRIES, "too many entries for one node");
        let layout = NodeLayout::at(self.bytes_written(), keys.len());
        if u32::try_from(layout.end()).is_err() {
            return Err(PackErr::TooLarge);
        }

        self.buf.put_u8(keys.len() as u8);
        self.buf.put_slice(keys);
        self.buf.put_bytes(0, layout.padding().len() + layout.offsets().len());
        debug_assert_eq!(self.bytes_written(), layout.end());
        Ok(layout)
    }

    /// Store `offset` in the offset field of entry `idx` of a node previously
    /// reserved with [`Encoder::put_node`].
    pub(crate) fn patch_offset(&mut self, layout: &NodeLayout, idx: usize, offset: u32) {
        let field = layout.offset_field(idx);
        let range = (self.base + field.start)..(self.base + field.end);
        self.buf[range].copy_from_slice(Offset::new(offset).as_bytes());
    }
}
