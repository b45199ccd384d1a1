// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Two-way mapping between word tokens and integer indices.
//
// Index layout (fixed for the lifetime of the vocabulary):
//   0 = <unk>   unknown / out-of-vocabulary token
//   1 = <pad>   padding filler for short sequences in a batch
//   2 = <bos>   beginning-of-sentence marker
//   3 = <eos>   end-of-sentence marker
//   4.. = corpus tokens, most frequent first; tokens with equal
//         frequency keep the order they first appeared in
//
// The model's embedding and output layers are sized from
// vocab.len(), and the loss masks index 1, so these positions
// must never move once training has started.
//
// Lookup of a token that was never counted returns index 0
// rather than failing. The vocabulary is immutable after
// construction.
//
// Reference: Rust Book §8 (HashMaps)

use anyhow::{Context, Result};
use std::{
    collections::{hash_map::Entry, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::data::tokenizer::WordTokenizer;

/// The four reserved symbols, in index order.
pub const UNK_TOKEN: &str = "<unk>";
pub const PAD_TOKEN: &str = "<pad>";
pub const BOS_TOKEN: &str = "<bos>";
pub const EOS_TOKEN: &str = "<eos>";

/// Frequency-ordered word vocabulary with reserved symbols.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// token → index, includes the reserved symbols
    token_to_index: HashMap<String, usize>,

    /// index → token, position i holds the token with index i
    index_to_token: Vec<String>,
}

impl Vocabulary {
    /// Index of `<unk>`: returned for every token not in the vocabulary
    pub const UNK_INDEX: usize = 0;
    /// Index of `<pad>`: masked out of the loss, fills short sequences
    pub const PAD_INDEX: usize = 1;
    /// Index of `<bos>`: prepended to every sequence by the collator
    pub const BOS_INDEX: usize = 2;
    /// Index of `<eos>`: appended to every sequence by the collator
    pub const EOS_INDEX: usize = 3;

    /// Build a vocabulary by counting tokens in a UTF-8 corpus file,
    /// one sentence per line. A missing file is a fatal error.
    pub fn build_from_file(path: impl AsRef<Path>, tokenizer: &WordTokenizer) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open vocabulary corpus '{}'", path.display()))?;

        let mut counter = TokenCounter::new();
        for line in BufReader::new(file).lines() {
            let line = line
                .with_context(|| format!("Cannot read from '{}'", path.display()))?;
            counter.count_line(&line, tokenizer);
        }

        let vocab = counter.finalize();
        tracing::info!(
            "Built vocabulary from '{}': {} tokens (incl. 4 reserved)",
            path.display(),
            vocab.len()
        );
        Ok(vocab)
    }

    /// Build a vocabulary from in-memory lines. Used by tests and by
    /// any caller that already holds the corpus as strings.
    pub fn build_from_lines<I, S>(lines: I, tokenizer: &WordTokenizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counter = TokenCounter::new();
        for line in lines {
            counter.count_line(line.as_ref(), tokenizer);
        }
        counter.finalize()
    }

    /// Look up the index of a token.
    /// Unknown tokens map to `<unk>` instead of failing.
    pub fn index_of(&self, token: &str) -> usize {
        self.token_to_index
            .get(token)
            .copied()
            .unwrap_or(Self::UNK_INDEX)
    }

    /// Convert a tokenized sentence into vocabulary indices.
    pub fn encode(&self, tokens: &[String]) -> Vec<usize> {
        tokens.iter().map(|t| self.index_of(t)).collect()
    }

    /// Look up the token at an index, for decoding model output.
    /// Out-of-range indices decode to `<unk>`.
    pub fn token_at(&self, index: usize) -> &str {
        self.index_to_token
            .get(index)
            .map(|s| s.as_str())
            .unwrap_or(UNK_TOKEN)
    }

    /// Total number of entries, reserved symbols included
    pub fn len(&self) -> usize {
        self.index_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true: the reserved symbols are always present
        self.index_to_token.is_empty()
    }
}

// ─── TokenCounter ─────────────────────────────────────────────────────────────
/// Accumulates token frequencies while remembering first-seen order,
/// then freezes into a Vocabulary.
struct TokenCounter {
    counts: HashMap<String, u64>,

    /// Tokens in the order they first appeared; the tie-break
    /// for equal frequencies
    first_seen: Vec<String>,
}

impl TokenCounter {
    fn new() -> Self {
        Self {
            counts:     HashMap::new(),
            first_seen: Vec::new(),
        }
    }

    fn count_line(&mut self, line: &str, tokenizer: &WordTokenizer) {
        for token in tokenizer.tokenize(line) {
            match self.counts.entry(token) {
                Entry::Occupied(mut e) => *e.get_mut() += 1,
                Entry::Vacant(e) => {
                    self.first_seen.push(e.key().clone());
                    e.insert(1);
                }
            }
        }
    }

    fn finalize(self) -> Vocabulary {
        // Walk tokens in first-seen order, then stable-sort by count
        // descending. A stable sort keeps equal counts in first-seen
        // order, which is exactly the tie-break we need.
        let mut ranked: Vec<(String, u64)> = self
            .first_seen
            .into_iter()
            .map(|token| {
                let count = self.counts[&token];
                (token, count)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut index_to_token: Vec<String> =
            vec![UNK_TOKEN, PAD_TOKEN, BOS_TOKEN, EOS_TOKEN]
                .into_iter()
                .map(String::from)
                .collect();
        index_to_token.extend(ranked.into_iter().map(|(token, _)| token));

        let token_to_index = index_to_token
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Vocabulary { token_to_index, index_to_token }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build(lines: &[&str]) -> Vocabulary {
        Vocabulary::build_from_lines(lines, &WordTokenizer::new())
    }

    #[test]
    fn test_reserved_symbols_occupy_first_four_indices() {
        let v = build(&["some words here"]);
        assert_eq!(v.index_of(UNK_TOKEN), 0);
        assert_eq!(v.index_of(PAD_TOKEN), 1);
        assert_eq!(v.index_of(BOS_TOKEN), 2);
        assert_eq!(v.index_of(EOS_TOKEN), 3);
        assert_eq!(v.token_at(Vocabulary::PAD_INDEX), PAD_TOKEN);
    }

    #[test]
    fn test_unseen_token_maps_to_unk() {
        let v = build(&["the cat sat"]);
        assert_eq!(v.index_of("zebra"), Vocabulary::UNK_INDEX);
    }

    #[test]
    fn test_frequency_order_with_first_seen_tie_break() {
        // "the" appears twice and must come first after the reserved
        // symbols; the four singletons keep their first-seen order.
        let v = build(&["the cat sat", "the dog ran"]);
        assert_eq!(v.index_of("the"), 4);
        assert_eq!(v.index_of("cat"), 5);
        assert_eq!(v.index_of("sat"), 6);
        assert_eq!(v.index_of("dog"), 7);
        assert_eq!(v.index_of("ran"), 8);
        assert_eq!(v.len(), 9);
    }

    #[test]
    fn test_empty_corpus_still_has_reserved_symbols() {
        let v = build(&[]);
        assert_eq!(v.len(), 4);
        assert_eq!(v.index_of("anything"), Vocabulary::UNK_INDEX);
    }

    #[test]
    fn test_encode_maps_unknowns_to_unk() {
        let v = build(&["a b"]);
        let tokens: Vec<String> = ["a", "mystery", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            v.encode(&tokens),
            vec![v.index_of("a"), Vocabulary::UNK_INDEX, v.index_of("b")]
        );
    }

    #[test]
    fn test_token_round_trip() {
        let v = build(&["alpha beta gamma"]);
        for token in ["alpha", "beta", "gamma"] {
            assert_eq!(v.token_at(v.index_of(token)), token);
        }
    }

    #[test]
    fn test_build_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "the cat sat").unwrap();
        writeln!(f, "the dog ran").unwrap();

        let v = Vocabulary::build_from_file(f.path(), &WordTokenizer::new()).unwrap();
        assert_eq!(v.index_of("the"), 4);
        assert_eq!(v.len(), 9);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = Vocabulary::build_from_file(
            "no/such/corpus.txt",
            &WordTokenizer::new(),
        );
        assert!(err.is_err());
    }
}
