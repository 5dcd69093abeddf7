use zerocopy::FromBytes;

use crate::codec::{
    DecodeErr,
    layout::{NodeLayout, Offset},
};

/// What consuming one byte at a node leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The byte completes a stored string and nothing follows it.
    Stop,
    /// The byte leads to the node record at the given offset.
    Continue(u32),
    /// The byte completes a stored string and also leads further, encoded
    /// as a continue entry directly followed by a stop entry for the same
    /// key.
    StopAndContinue(u32),
}

/// A bounds-checked view of one node record inside a packed trie.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    layout: NodeLayout,
    keys: &'a [u8],
    children: &'a [Offset],
}

impl<'a> NodeRef<'a> {
    /// Reads the node record starting at `offset`, checking that the whole
    /// record lies within `data`.
    pub fn read(data: &'a [u8], offset: usize) -> Result<Self, DecodeErr> {
        let count = *data.get(offset).ok_or(DecodeErr::Length)?;
        let layout = NodeLayout::at(offset, count as usize);
        DecodeErr::ensure_bytes_available(data, layout.end())?;

        Ok(Self {
            layout,
            keys: &data[layout.keys()],
            children: <[Offset]>::ref_from_bytes_with_elems(
                &data[layout.offsets()],
                layout.entries(),
            )?,
        })
    }

    #[inline]
    pub fn layout(&self) -> NodeLayout {
        self.layout
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.layout.start()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &'a [u8] {
        self.keys
    }

    #[inline]
    pub(crate) fn key(&self, idx: usize) -> u8 {
        self.keys[idx]
    }

    #[inline]
    pub(crate) fn child(&self, idx: usize) -> u32 {
        self.children[idx].get()
    }

    /// Iterates over the raw `(key, child)` entries in stored order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = (u8, u32)> + 'a {
        self.keys
            .iter()
            .copied()
            .zip(self.children.iter().map(|c| c.get()))
    }

    /// Binary searches the keys for `key`.
    pub fn lookup(&self, key: u8) -> Result<Option<Transition>, DecodeErr> {
        let idx = self.keys.partition_point(|&k| k < key);
        if self.keys.get(idx) != Some(&key) {
            return Ok(None);
        }

        let child = self.child(idx);
        let paired = self.keys.get(idx + 1) == Some(&key);
        match (child, paired) {
            (0, false) => Ok(Some(Transition::Stop)),
            (child, false) => Ok(Some(Transition::Continue(child))),
            (child, true) if child != 0 && self.child(idx + 1) == 0 => {
                Ok(Some(Transition::StopAndContinue(child)))
            }
            _ => Err(DecodeErr::Validity),
        }
    }
}
