use bytes::Bytes;
use thiserror::Error;
use zerocopy::ConvertError;

use crate::codec::encoder::Encoder;

pub mod encoder;
pub mod layout;
pub mod node_ref;

pub trait Packable {
    /// The exact number of bytes [`Packable::pack_into`] writes.
    fn encoded_size(&self) -> usize;

    fn pack_into(&self, encoder: &mut Encoder) -> Result<(), PackErr>;

    fn pack_to_bytes(&self) -> Result<Bytes, PackErr> {
        let mut encoder = Encoder::with_capacity(self.encoded_size());
        self.pack_into(&mut encoder)?;
        Ok(encoder.into_inner().freeze())
    }
}

#[derive(Debug, Error)]
pub enum PackErr {
    #[error(
        "node at prefix \"{}\" needs {entries} entries, at most 255 fit",
        .prefix.escape_ascii()
    )]
    TooManyTransitions { prefix: Vec<u8>, entries: usize },

    #[error("packed trie exceeds the u32 offset range")]
    TooLarge,
}

#[derive(Debug, Error)]
pub enum DecodeErr {
    #[error("not enough bytes")]
    Length,

    #[error("invalid encoding")]
    Validity,

    #[error("node at {node} has a child offset {offset} which is not a later node")]
    Offset { node: usize, offset: u32 },
}

impl DecodeErr {
    #[inline]
    pub(crate) fn ensure_bytes_available(data: &[u8], len: usize) -> Result<(), DecodeErr> {
        if data.len() < len {
            Err(Self::Length)
        } else {
            Ok(())
        }
    }
}

impl<A, S, V> From<ConvertError<A, S, V>> for DecodeErr {
    fn from(err: ConvertError<A, S, V>) -> Self {
        match err {
            ConvertError::Alignment(_) => panic!("All zerocopy transmutations must be unaligned"),
            ConvertError::Size(_) => DecodeErr::Length,
            ConvertError::Validity(_) => DecodeErr::Validity,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::proptest;

    use crate::{
        BuildTrie, PackedTrie,
        codec::{DecodeErr, PackErr, Packable},
        testutil::{mkpacked_buf, word_set},
    };

    #[test]
    fn test_encoded_size_matches() {
        let sets: &[&[&str]] = &[
            &[],
            &["car"],
            &["ca", "car"],
            &["a", "ab", "abc"],
            &["apple", "apricot", "banana", "band", "bandana", "b"],
        ];
        for set in sets {
            let trie = BuildTrie::from_iter(*set);
            let buf = trie.pack_to_bytes().unwrap();
            assert_eq!(trie.encoded_size(), buf.len(), "set {set:?}");
        }
    }

    #[test]
    fn test_length_corruption() {
        let buf = mkpacked_buf(["car", "cart", "cat", "dog"]);
        for len in 0..buf.len() {
            assert_matches!(
                PackedTrie::from_bytes(&buf[..len]),
                Err(DecodeErr::Length),
                "Failed for truncated buffer of size {}",
                len
            );
        }
        assert!(PackedTrie::from_bytes(&buf[..]).is_ok());
    }

    #[test]
    fn test_trailing_bytes() {
        let mut buf = mkpacked_buf(["car"]);
        buf.push(0);
        assert_matches!(PackedTrie::from_bytes(buf), Err(DecodeErr::Length));

        // a well formed but unreferenced record
        let mut buf = mkpacked_buf(["car"]);
        buf.extend_from_slice(&[0, 0, 0, 0]);
        assert_matches!(PackedTrie::from_bytes(buf), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_corrupted_offset() {
        let mut buf = mkpacked_buf(["car"]);
        //                            count  c   pad pad pad  offset -> 8
        assert_eq!(&buf[..8], &[0x01, b'c', 0x00, 0x00, 0x08, 0x00, 0x00, 0x00]);

        // past the end
        buf[4] = 0xF0;
        assert_matches!(PackedTrie::from_bytes(&buf[..]), Err(DecodeErr::Length));

        // points back at the root
        buf[4] = 0x04;
        assert_matches!(
            PackedTrie::from_bytes(&buf[..]),
            Err(DecodeErr::Offset { node: 0, offset: 0x04 })
        );

        // lands inside a record
        buf[4] = 0x09;
        assert_matches!(
            PackedTrie::from_bytes(&buf[..]),
            Err(DecodeErr::Offset { node: 0, offset: 0x09 })
        );
    }

    #[test]
    fn test_corrupted_key_order() {
        let mut buf = mkpacked_buf(["a", "b"]);
        //                            count  a     b    pad   a->0     b->0
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[..4], &[0x02, b'a', b'b', 0x00]);
        buf.swap(1, 2);
        assert_matches!(PackedTrie::from_bytes(buf), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_corrupted_stop_pair() {
        let buf = mkpacked_buf(["a", "ab"]);
        assert_eq!(
            buf.as_slice(),
            &[
                // root: a -> 12, a -> stop
                0x02, b'a', b'a', 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                // node at 12: b -> stop
                0x01, b'b', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]
        );

        // stop entry placed before the continue entry
        let mut swapped = buf.clone();
        swapped[4] = 0x00;
        swapped[8] = 0x0C;
        assert_matches!(PackedTrie::from_bytes(swapped), Err(DecodeErr::Validity));

        // the same key three times
        let mut tripled = vec![
            0x03, b'a', b'a', b'a', 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
        ];
        tripled.extend_from_slice(&buf[12..]);
        assert_matches!(PackedTrie::from_bytes(tripled), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_shared_subtree() {
        let mut buf = mkpacked_buf(["ax", "bx"]);
        assert_eq!(
            buf.as_slice(),
            &[
                // root: a -> 12, b -> 20
                0x02, b'a', b'b', 0x00, 0x0C, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
                // node at 12: x -> stop
                0x01, b'x', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                // node at 20: x -> stop
                0x01, b'x', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            ]
        );
        // both edges point at the first child
        buf[8] = 0x0C;
        assert_matches!(
            PackedTrie::from_bytes(buf),
            Err(DecodeErr::Offset { node: 0, offset: 0x0C })
        );
    }

    #[test]
    fn test_empty_interior_node() {
        // root: a -> 8, node at 8 has no entries
        let buf = [0x01, b'a', 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_matches!(PackedTrie::from_bytes(&buf[..]), Err(DecodeErr::Validity));
    }

    #[test]
    fn test_too_many_transitions() {
        // 255 distinct children fit
        let trie = BuildTrie::from_iter((0..=254u8).map(|b| [b]));
        assert!(trie.pack().is_ok());

        // all 256 do not
        let trie = BuildTrie::from_iter((0..=255u8).map(|b| [b]));
        assert_matches!(
            trie.pack(),
            Err(PackErr::TooManyTransitions { prefix, entries: 256 }) if prefix.is_empty()
        );

        // duplicate stop entries count against the limit
        let mut trie = BuildTrie::from_iter((0..200u8).map(|b| vec![b'x', b]));
        trie.extend((0..60u8).map(|b| vec![b'x', b, b'!']));
        assert_matches!(
            trie.pack(),
            Err(PackErr::TooManyTransitions { prefix, entries: 260 }) if prefix == b"x"
        );
    }

    #[test]
    fn test_pack_err_display() {
        let err = PackErr::TooManyTransitions { prefix: b"a\xffb".to_vec(), entries: 300 };
        assert_eq!(
            err.to_string(),
            "node at prefix \"a\\xffb\" needs 300 entries, at most 255 fit"
        );
    }

    proptest! {
        #[test]
        fn test_encoded_size_proptest(words in word_set()) {
            let trie = BuildTrie::from_iter(&words);
            let packed = trie.pack().unwrap();
            assert_eq!(trie.encoded_size(), packed.encoded_size());
            assert_eq!(packed.pack_to_bytes().unwrap(), *packed.inner());
        }
    }
}
