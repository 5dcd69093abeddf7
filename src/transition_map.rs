use std::fmt::Debug;

/// An ordered map from a single transition byte to a value, stored as two
/// index-aligned vectors so that lookups are a binary search over a dense
/// run of keys.
#[derive(Clone, PartialEq, Eq)]
pub struct TransitionMap<V> {
    keys: Vec<u8>,
    values: Vec<V>,
}

impl<V> Default for TransitionMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for TransitionMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (k.escape_ascii().to_string(), v)))
            .finish()
    }
}

impl<V> TransitionMap<V> {
    pub const fn new() -> Self {
        Self { keys: Vec::new(), values: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.keys.len(), self.values.len());
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the value stored under `key`, if any.
    #[inline]
    pub fn get(&self, key: u8) -> Option<&V> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|idx| &self.values[idx])
    }

    /// Returns the value stored under `key`, inserting the result of `f`
    /// first if the key is absent. Keys stay sorted and unique.
    pub fn get_or_insert_with(&mut self, key: u8, f: impl FnOnce() -> V) -> &mut V {
        let idx = match self.keys.binary_search(&key) {
            Ok(idx) => idx,
            Err(idx) => {
                self.keys.insert(idx, key);
                self.values.insert(idx, f());
                idx
            }
        };
        &mut self.values[idx]
    }

    /// The sorted transition bytes.
    #[inline]
    pub fn keys(&self) -> &[u8] {
        &self.keys
    }

    /// Iterates over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (u8, &V)> + DoubleEndedIterator {
        self.keys.iter().copied().zip(self.values.iter())
    }
}

impl<V: Default> TransitionMap<V> {
    /// Returns the value stored under `key`, inserting `V::default()` on
    /// first use. Repeated calls with the same key return the same slot.
    #[inline]
    pub fn insert(&mut self, key: u8) -> &mut V {
        self.get_or_insert_with(key, V::default)
    }
}
