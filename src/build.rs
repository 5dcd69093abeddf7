use std::fmt::Debug;

use bytes::Bytes;

use crate::{
    PackedTrie,
    codec::{PackErr, Packable},
    transition_map::TransitionMap,
};

/// Index of a node inside a [`BuildTrie`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Default, Debug)]
pub(crate) struct BuildNode {
    pub(crate) terminal: bool,
    pub(crate) children: TransitionMap<NodeId>,
}

/// The mutable trie used to collect strings before packing.
///
/// Nodes live in a single arena owned by the trie and refer to their
/// children by [`NodeId`]; the root is always [`NodeId::ROOT`]. Nodes are
/// created lazily as paths are inserted and are never removed.
///
/// # Examples
///
/// ```
/// use packed_trie::BuildTrie;
///
/// let trie = BuildTrie::from_iter(["ca", "car"]);
/// assert_eq!(trie.match_longest_stop(b"cart"), 3);
/// assert_eq!(trie.match_shortest_stop(b"cart"), 2);
///
/// let packed = trie.pack().unwrap();
/// assert_eq!(packed.longest_prefix(b"cart"), 3);
/// ```
#[derive(Clone)]
pub struct BuildTrie {
    nodes: Vec<BuildNode>,
    len: usize,
}

impl Default for BuildTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BuildTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildTrie")
            .field("strings", &self.len)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl BuildTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![BuildNode::default()],
            len: 0,
        }
    }

    /// Inserts `s`, creating any missing nodes along its path and marking
    /// the final node terminal. Returns `true` if `s` was not already stored.
    ///
    /// Inserting the empty string marks the root terminal. The packed form
    /// has no slot for a terminal root, so the empty string is dropped by
    /// [`BuildTrie::pack`].
    pub fn insert(&mut self, s: impl AsRef<[u8]>) -> bool {
        let mut cursor = NodeId::ROOT;
        for &byte in s.as_ref() {
            let fresh = NodeId(self.nodes.len());
            let child = *self.nodes[cursor.0]
                .children
                .get_or_insert_with(byte, || fresh);
            if child == fresh {
                self.nodes.push(BuildNode::default());
            }
            cursor = child;
        }

        let node = &mut self.nodes[cursor.0];
        let inserted = !node.terminal;
        node.terminal = true;
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns true if `s` was inserted into this trie.
    pub fn contains(&self, s: impl AsRef<[u8]>) -> bool {
        let mut node = self.root();
        for &byte in s.as_ref() {
            match node.children.get(byte) {
                Some(&child) => node = self.node(child),
                None => return false,
            }
        }
        node.terminal
    }

    /// Returns the length of the longest inserted string which is a prefix
    /// of `text`, or 0 if there is none.
    pub fn match_longest_stop(&self, text: &[u8]) -> usize {
        let mut node = self.root();
        let mut stop = 0;
        for (depth, &byte) in text.iter().enumerate() {
            let Some(&child) = node.children.get(byte) else {
                break;
            };
            node = self.node(child);
            if node.terminal {
                stop = depth + 1;
            }
        }
        stop
    }

    /// Returns the length of the shortest non-empty inserted string which is
    /// a prefix of `text`, or 0 if there is none.
    pub fn match_shortest_stop(&self, text: &[u8]) -> usize {
        let mut node = self.root();
        for (depth, &byte) in text.iter().enumerate() {
            let Some(&child) = node.children.get(byte) else {
                break;
            };
            node = self.node(child);
            if node.terminal {
                return depth + 1;
            }
        }
        0
    }

    /// The number of distinct strings inserted.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of nodes in the arena, including the root.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the stored strings in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = Vec<u8>> + '_ {
        let mut stack = vec![(NodeId::ROOT, None, 0)];
        let mut path = Vec::new();
        std::iter::from_fn(move || {
            while let Some((id, key, depth)) = stack.pop() {
                path.truncate(depth);
                path.extend(key);
                let node = self.node(id);
                let child_depth = path.len();
                stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|(k, &child)| (child, Some(k), child_depth)),
                );
                if node.terminal {
                    return Some(path.clone());
                }
            }
            None
        })
    }

    /// Packs this trie into an immutable [`PackedTrie`].
    pub fn pack(&self) -> Result<PackedTrie<Bytes>, PackErr> {
        Ok(PackedTrie { data: self.pack_to_bytes()? })
    }

    #[inline]
    pub(crate) fn root(&self) -> &BuildNode {
        self.node(NodeId::ROOT)
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &BuildNode {
        &self.nodes[id.0]
    }
}

impl<S: AsRef<[u8]>> FromIterator<S> for BuildTrie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = BuildTrie::new();
        trie.extend(iter);
        trie
    }
}

impl<S: AsRef<[u8]>> Extend<S> for BuildTrie {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for s in iter {
            self.insert(s);
        }
    }
}

impl PartialEq for BuildTrie {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for BuildTrie {}
