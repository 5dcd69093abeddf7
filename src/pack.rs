use crate::{
    build::{BuildNode, BuildTrie, NodeId},
    codec::{
        PackErr, Packable,
        encoder::Encoder,
        layout::{MAX_ENTRIES, NodeLayout},
    },
};

/// One entry of a node record before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// Descend into the child's record, which is packed after this node.
    Continue(NodeId),
    /// The key completes a stored string. Stored with a zero offset.
    Stop,
}

/// Lists the entries of `node` in key order. A child which is terminal and
/// also has children produces a continue entry followed by a stop entry
/// under the same key.
fn plan_entries(trie: &BuildTrie, node: &BuildNode) -> Vec<(u8, Entry)> {
    let mut entries = Vec::with_capacity(node.children.len());
    for (key, &id) in node.children.iter() {
        let child = trie.node(id);
        if child.children.is_empty() {
            // nodes are only created along inserted paths, so leaves are terminal
            debug_assert!(child.terminal, "non-terminal leaf in build trie");
            entries.push((key, Entry::Stop));
        } else {
            entries.push((key, Entry::Continue(id)));
            if child.terminal {
                entries.push((key, Entry::Stop));
            }
        }
    }
    entries
}

/// A node record which has been written but whose continue entries are not
/// all packed yet.
struct Frame {
    layout: NodeLayout,
    entries: Vec<(u8, Entry)>,
    next: usize,
}

impl Frame {
    /// Advances to the next continue entry, returning its index and target.
    fn next_child(&mut self) -> Option<(usize, u8, NodeId)> {
        while let Some(&(key, entry)) = self.entries.get(self.next) {
            let idx = self.next;
            self.next += 1;
            // stop entries keep the zeroed placeholder
            if let Entry::Continue(child) = entry {
                return Some((idx, key, child));
            }
        }
        None
    }
}

/// Writes the record for `id` and returns it as a frame ready to pack its
/// children.
fn open_node(
    trie: &BuildTrie,
    id: NodeId,
    encoder: &mut Encoder,
    prefix: &[u8],
) -> Result<Frame, PackErr> {
    let entries = plan_entries(trie, trie.node(id));
    if entries.len() > MAX_ENTRIES {
        tracing::debug!(
            prefix = %prefix.escape_ascii(),
            entries = entries.len(),
            "node has too many transitions to pack"
        );
        return Err(PackErr::TooManyTransitions {
            prefix: prefix.to_vec(),
            entries: entries.len(),
        });
    }

    let keys: Vec<u8> = entries.iter().map(|(key, _)| *key).collect();
    let layout = encoder.put_node(&keys)?;
    Ok(Frame { layout, entries, next: 0 })
}

/// Packs the subtree rooted at `root` depth first, each record followed by
/// the subtrees of its continue entries in key order. Returns the position
/// of the root record.
///
/// The walk keeps an explicit stack of partially packed records so the depth
/// of the trie is bounded by the heap rather than the call stack.
fn pack_subtree(trie: &BuildTrie, root: NodeId, encoder: &mut Encoder) -> Result<u32, PackErr> {
    let mut prefix = Vec::new();
    let first = open_node(trie, root, encoder, &prefix)?;
    // put_node guarantees every record fits in the u32 offset range
    let root_offset = first.layout.start() as u32;

    let mut stack = vec![first];
    while let Some(frame) = stack.last_mut() {
        let Some((idx, key, child)) = frame.next_child() else {
            stack.pop();
            prefix.pop();
            continue;
        };
        prefix.push(key);
        let child = open_node(trie, child, encoder, &prefix)?;
        encoder.patch_offset(&frame.layout, idx, child.layout.start() as u32);
        stack.push(child);
    }
    Ok(root_offset)
}

/// Returns the position just past the records of `root` and its subtree
/// when they are packed starting at `pos`.
fn subtree_end(trie: &BuildTrie, root: NodeId, pos: usize) -> usize {
    let mut end = pos;
    let mut pending = vec![root];
    // records are laid out in preorder, so visiting children in reverse key
    // order off a stack sums the same sizes in the same order
    while let Some(id) = pending.pop() {
        let entries = plan_entries(trie, trie.node(id));
        end = NodeLayout::at(end, entries.len()).end();
        pending.extend(entries.iter().rev().filter_map(|(_, entry)| match entry {
            Entry::Continue(child) => Some(*child),
            Entry::Stop => None,
        }));
    }
    end
}

impl Packable for BuildTrie {
    fn encoded_size(&self) -> usize {
        subtree_end(self, NodeId::ROOT, 0)
    }

    /// Packs this trie into `encoder`. On error nothing is left behind: the
    /// encoder is rolled back to the bytes it held before the call and may
    /// be reused.
    fn pack_into(&self, encoder: &mut Encoder) -> Result<(), PackErr> {
        encoder.begin_trie();
        let root = match pack_subtree(self, NodeId::ROOT, encoder) {
            Ok(root) => root,
            Err(err) => {
                encoder.abort_trie();
                return Err(err);
            }
        };
        debug_assert_eq!(root, 0, "root must be the first record");

        tracing::debug!(
            strings = self.len(),
            nodes = self.node_count(),
            bytes = encoder.bytes_written(),
            "packed trie"
        );
        Ok(())
    }
}
