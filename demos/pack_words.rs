use packed_trie::{BuildTrie, PackedTrie, testutil::WordGen};

/// Packs a newline separated word list into `tree.bin`.
///
/// Usage: `cargo run --example pack_words --features testutil -- [WORDS] [OUT]`
///
/// Without a word list, a generated one is used.
fn main() {
    let mut args = std::env::args().skip(1);
    let words: Vec<Vec<u8>> = match args.next() {
        Some(path) => std::fs::read(&path)
            .unwrap()
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(<[u8]>::to_vec)
            .collect(),
        None => WordGen::new(0xDEAD_BEEF).random(1000, b"abcdefghijklmnopqrstuvwxyz", 10),
    };
    let out = args.next().unwrap_or_else(|| "tree.bin".into());

    let trie = BuildTrie::from_iter(&words);
    let packed = trie.pack().unwrap();
    println!(
        "Packed {} words ({} nodes) into {} bytes",
        trie.len(),
        trie.node_count(),
        packed.as_bytes().len()
    );

    std::fs::write(&out, packed.as_bytes()).unwrap();

    // load the file back and check that it answers like the build trie
    let loaded = PackedTrie::from_bytes(std::fs::read(&out).unwrap()).unwrap();
    let mut mismatches = 0;
    for word in &words {
        if loaded.longest_prefix(word) != trie.match_longest_stop(word) {
            println!("mismatch: {}", word.escape_ascii());
            mismatches += 1;
        }
    }
    println!("Wrote {out}, {mismatches} mismatches");
    assert_eq!(mismatches, 0);
}
