//! A packed trie stores a set of byte strings in one immutable, pointer-free
//! buffer that answers longest-stored-prefix queries.
//!
//! ## Key Features:
//!
//! - **Build then pack**: strings are collected in a mutable [`BuildTrie`]
//!   and flattened in a single depth-first pass into a byte buffer. Each
//!   node becomes a record of sorted key bytes followed by an aligned table
//!   of little-endian `u32` child offsets, with the root at offset 0.
//!
//! - **No flag bytes**: a key whose prefix is itself a stored string is
//!   written twice, first pointing at the child record and then with a zero
//!   offset meaning "a string ends here".
//!
//! - **Zero-copy access**: [`PackedTrie`] validates a buffer once and then
//!   queries it in place. It accepts any type implementing
//!   `Deref<Target = [u8]>`, so packed tries can be written to disk, mapped
//!   or embedded and reopened without deserialization.
//!
//! ```
//! use packed_trie::BuildTrie;
//!
//! let trie = BuildTrie::from_iter(["ca", "car", "cat"]);
//! let packed = trie.pack().unwrap();
//!
//! assert_eq!(packed.longest_prefix(b"carburetor"), 3);
//! assert_eq!(packed.longest_prefix(b"cab"), 2);
//! assert_eq!(packed.longest_prefix(b"dog"), 0);
//! ```

mod build;
pub mod codec;
mod pack;
mod packed;
mod transition_map;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use build::{BuildTrie, NodeId};
pub use codec::{DecodeErr, PackErr, Packable, encoder::Encoder};
pub use packed::{PackedTrie, longest_prefix};
pub use transition_map::TransitionMap;
