use std::{fmt::Debug, ops::Deref};

use bytes::Bytes;
use itertools::Itertools;

use crate::{
    BuildTrie,
    codec::{
        DecodeErr, PackErr, Packable,
        encoder::Encoder,
        node_ref::{NodeRef, Transition},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    Longest,
    Shortest,
}

/// Returns the length of the longest stored string which is a prefix of
/// `text`, reading the packed trie in `data` without validating it first.
///
/// Every field is bounds-checked before it is read, so a corrupt buffer
/// produces an error instead of a wrong length. Use [`PackedTrie::from_bytes`]
/// to validate a buffer once and then match without error handling.
pub fn longest_prefix(data: &[u8], text: &[u8]) -> Result<usize, DecodeErr> {
    scan(data, text, MatchMode::Longest)
}

fn scan(data: &[u8], text: &[u8], mode: MatchMode) -> Result<usize, DecodeErr> {
    let mut offset = 0;
    let mut stop = 0;
    for (depth, &byte) in text.iter().enumerate() {
        let node = NodeRef::read(data, offset)?;
        let next = match node.lookup(byte)? {
            None => break,
            Some(Transition::Stop) => {
                stop = depth + 1;
                break;
            }
            Some(Transition::StopAndContinue(child)) => {
                stop = depth + 1;
                if mode == MatchMode::Shortest {
                    break;
                }
                child
            }
            Some(Transition::Continue(child)) => child,
        };

        // child records always follow their parent, which also rules out cycles
        if (next as usize) < node.layout().end() {
            return Err(DecodeErr::Offset { node: offset, offset: next });
        }
        offset = next as usize;
    }
    Ok(stop)
}

/// Checks every node record in `data`: records must tile the buffer from
/// offset 0, keys must be sorted with repeats only as continue/stop pairs,
/// and every record except the root must be referenced exactly once by an
/// earlier record.
fn validate(data: &[u8]) -> Result<(), DecodeErr> {
    let mut starts = Vec::new();
    let mut edges = Vec::new();

    let mut pos = 0;
    loop {
        let node = NodeRef::read(data, pos)?;
        if pos != 0 && node.is_empty() {
            return Err(DecodeErr::Validity);
        }
        validate_entries(&node)?;

        for (_, child) in node.entries().filter(|&(_, child)| child != 0) {
            if child as usize >= data.len() {
                return Err(DecodeErr::Length);
            }
            if (child as usize) < node.layout().end() {
                return Err(DecodeErr::Offset { node: pos, offset: child });
            }
            edges.push((pos, child));
        }

        starts.push(pos);
        pos = node.layout().end();
        if pos == data.len() {
            break;
        }
    }

    let mut referenced = vec![false; starts.len()];
    referenced[0] = true;
    for (node, child) in edges {
        match starts.binary_search(&(child as usize)) {
            Ok(idx) if !referenced[idx] => referenced[idx] = true,
            _ => return Err(DecodeErr::Offset { node, offset: child }),
        }
    }
    if referenced.contains(&false) {
        return Err(DecodeErr::Validity);
    }
    Ok(())
}

fn validate_entries(node: &NodeRef<'_>) -> Result<(), DecodeErr> {
    for ((key, child), (next_key, next_child)) in node.entries().tuple_windows() {
        if key > next_key {
            return Err(DecodeErr::Validity);
        }
        // a repeated key must be a continue entry followed by a stop entry,
        // which also rules out a key appearing three times
        if key == next_key && (child == 0 || next_child != 0) {
            return Err(DecodeErr::Validity);
        }
    }
    Ok(())
}

/// A validated, read-only packed trie over any byte storage.
///
/// Queries walk the buffer by offset and binary search, without allocating
/// or deserializing anything. The buffer is exactly what
/// [`BuildTrie::pack`] produced, so it can be written to disk, mapped back
/// into memory and opened again with [`PackedTrie::from_bytes`].
///
/// # Examples
///
/// ```
/// use packed_trie::{BuildTrie, PackedTrie};
///
/// let trie = BuildTrie::from_iter(["a", "ab", "abc"]);
/// let bytes = trie.pack().unwrap().into_inner();
///
/// // reopen from any `Deref<Target = [u8]>`, here a borrowed slice
/// let packed = PackedTrie::from_bytes(&bytes[..]).unwrap();
/// assert_eq!(packed.longest_prefix(b"abcd"), 3);
/// assert_eq!(packed.shortest_prefix(b"abcd"), 1);
/// assert_eq!(packed.longest_prefix(b"xyz"), 0);
/// ```
#[derive(Clone)]
pub struct PackedTrie<B> {
    pub(crate) data: B,
}

impl<B: Deref<Target = [u8]>> Debug for PackedTrie<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedTrie")
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl<B> PackedTrie<B> {
    #[inline]
    pub fn inner(&self) -> &B {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: Deref<Target = [u8]>> Packable for PackedTrie<B> {
    #[inline]
    fn encoded_size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn pack_into(&self, encoder: &mut Encoder) -> Result<(), PackErr> {
        encoder.write_packed(&self.data);
        Ok(())
    }
}

impl<B: Deref<Target = [u8]>> PackedTrie<B> {
    /// Validates `data` as a packed trie and wraps it.
    pub fn from_bytes(data: B) -> Result<Self, DecodeErr> {
        if let Err(err) = validate(&data) {
            tracing::trace!(bytes = data.len(), %err, "rejected packed trie");
            return Err(err);
        }
        Ok(Self { data })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the longest stored string which is a prefix of
    /// `text`, or 0 if there is none.
    pub fn longest_prefix(&self, text: &[u8]) -> usize {
        scan(&self.data, text, MatchMode::Longest)
            .expect("BUG: packed trie was validated on construction")
    }

    /// Returns the length of the shortest stored string which is a prefix of
    /// `text`, or 0 if there is none.
    pub fn shortest_prefix(&self, text: &[u8]) -> usize {
        scan(&self.data, text, MatchMode::Shortest)
            .expect("BUG: packed trie was validated on construction")
    }

    /// Returns true if `s` is one of the stored strings. The empty string is
    /// never stored.
    pub fn contains(&self, s: impl AsRef<[u8]>) -> bool {
        let Some((&last, path)) = s.as_ref().split_last() else {
            return false;
        };

        let mut offset = 0;
        for &byte in path {
            match self.load_unchecked(offset).lookup(byte) {
                Ok(Some(Transition::Continue(child) | Transition::StopAndContinue(child))) => {
                    offset = child as usize
                }
                _ => return false,
            }
        }
        matches!(
            self.load_unchecked(offset).lookup(last),
            Ok(Some(Transition::Stop | Transition::StopAndContinue(_)))
        )
    }

    /// Iterates over the stored strings in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        // each frame is a node offset and the index of its next entry; the
        // path holds one key per frame below the root
        let mut stack = vec![(0usize, 0usize)];
        let mut path = Vec::new();
        std::iter::from_fn(move || {
            loop {
                let top = stack.last_mut()?;
                let (offset, idx) = *top;
                top.1 += 1;

                let node = self.load_unchecked(offset);
                if idx >= node.len() {
                    stack.pop();
                    path.pop();
                    continue;
                }

                let key = node.key(idx);
                let child = node.child(idx);
                if child == 0 {
                    if idx > 0 && node.key(idx - 1) == key {
                        // second half of a pair, reported with the first
                        continue;
                    }
                    let mut word = path.clone();
                    word.push(key);
                    return Some(word);
                }

                path.push(key);
                stack.push((child as usize, 0));
                if node.keys().get(idx + 1) == Some(&key) {
                    return Some(path.clone());
                }
            }
        })
    }

    /// Rebuilds a mutable [`BuildTrie`] holding the same strings.
    pub fn decode_to_trie(&self) -> BuildTrie {
        BuildTrie::from_iter(self.iter())
    }

    pub(crate) fn load_unchecked(&self, offset: usize) -> NodeRef<'_> {
        NodeRef::read(&self.data, offset).expect("BUG: packed trie was validated on construction")
    }
}

impl<B: Deref<Target = [u8]>> PartialEq<BuildTrie> for PackedTrie<B> {
    fn eq(&self, other: &BuildTrie) -> bool {
        // the empty string does not survive packing
        other.iter().filter(|s| !s.is_empty()).eq(self.iter())
    }
}

impl<B: Deref<Target = [u8]>> PartialEq<PackedTrie<B>> for BuildTrie {
    #[inline]
    fn eq(&self, other: &PackedTrie<B>) -> bool {
        other == self
    }
}

impl<B: Deref<Target = [u8]>, B2: Deref<Target = [u8]>> PartialEq<PackedTrie<B2>>
    for PackedTrie<B>
{
    fn eq(&self, other: &PackedTrie<B2>) -> bool {
        self.as_bytes() == other.as_bytes() || self.iter().eq(other.iter())
    }
}

impl From<PackedTrie<Bytes>> for Bytes {
    fn from(packed: PackedTrie<Bytes>) -> Self {
        packed.data
    }
}
