use bytes::Bytes;
use itertools::Itertools;
use proptest::{collection::vec, strategy::Strategy};
use rand::{SeedableRng, seq::index};

use crate::{BuildTrie, PackedTrie};

pub fn mkpacked<S: AsRef<[u8]>>(words: impl IntoIterator<Item = S>) -> PackedTrie<Bytes> {
    BuildTrie::from_iter(words).pack().unwrap()
}

pub fn mkpacked_buf<S: AsRef<[u8]>>(words: impl IntoIterator<Item = S>) -> Vec<u8> {
    mkpacked(words).into_inner().to_vec()
}

/// Small sets of short words over a four letter alphabet, so that shared
/// prefixes and words which are prefixes of other words are common.
pub fn word_set() -> impl Strategy<Value = Vec<Vec<u8>>> {
    vec(vec(b'a'..=b'd', 0..8), 0..48)
}

pub struct WordGen {
    rng: rand::rngs::StdRng,
}

impl WordGen {
    pub fn new(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self { rng }
    }

    /// Up to `count` distinct words over `alphabet`, each 1 to `max_len`
    /// bytes long, sorted.
    #[track_caller]
    pub fn random(&mut self, count: usize, alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
        assert!(!alphabet.is_empty() && max_len > 0);
        (0..count)
            .map(|_| {
                let len = self.pick(max_len) + 1;
                (0..len).map(|_| alphabet[self.pick(alphabet.len())]).collect_vec()
            })
            .sorted()
            .dedup()
            .collect()
    }

    /// Query texts built from `words`: a sample of the words themselves,
    /// the same words with a suffix appended, and truncated words.
    pub fn queries(&mut self, words: &[Vec<u8>], count: usize) -> Vec<Vec<u8>> {
        if words.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|i| {
                let mut word = words[self.pick(words.len())].clone();
                match i % 3 {
                    1 => word.extend_from_slice(b"-suffix"),
                    2 if !word.is_empty() => word.truncate(self.pick(word.len())),
                    _ => {}
                }
                word
            })
            .collect()
    }

    fn pick(&mut self, len: usize) -> usize {
        index::sample(&mut self.rng, len, 1).index(0)
    }
}
