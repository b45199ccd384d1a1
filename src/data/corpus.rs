// ============================================================
// Layer 4 — Parallel Corpus Loader
// ============================================================
// Reads a sentence-aligned corpus from two plain UTF-8 text
// files: line N of the source file translates line N of the
// target file.
//
// If the files disagree on line count, the extra lines have no
// alignment partner, so pairing stops at the shorter file and
// a warning is logged. A missing file is a fatal error: there
// is no sensible way to train without one side of the corpus.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::data::tokenizer::WordTokenizer;
use crate::data::vocab::Vocabulary;
use crate::domain::sentence_pair::{IndexedPair, SentencePair};
use crate::domain::traits::CorpusSource;

/// Loads aligned sentence pairs from two line-aligned text files.
/// Implements the CorpusSource trait from Layer 3.
pub struct ParallelCorpus {
    /// Path to the source-language file
    src_path: String,

    /// Path to the target-language file
    tgt_path: String,
}

impl ParallelCorpus {
    pub fn new(src_path: impl Into<String>, tgt_path: impl Into<String>) -> Self {
        Self {
            src_path: src_path.into(),
            tgt_path: tgt_path.into(),
        }
    }
}

impl CorpusSource for ParallelCorpus {
    fn load_pairs(&self) -> Result<Vec<SentencePair>> {
        let src_lines = read_lines(&self.src_path)?;
        let tgt_lines = read_lines(&self.tgt_path)?;

        if src_lines.len() != tgt_lines.len() {
            tracing::warn!(
                "Corpus length mismatch: '{}' has {} lines, '{}' has {}; \
                 pairing stops at the shorter file",
                self.src_path,
                src_lines.len(),
                self.tgt_path,
                tgt_lines.len(),
            );
        }

        let pairs: Vec<SentencePair> = src_lines
            .into_iter()
            .zip(tgt_lines)
            .map(|(source, target)| SentencePair::new(source, target))
            .collect();

        tracing::info!(
            "Loaded {} sentence pairs from '{}' + '{}'",
            pairs.len(),
            self.src_path,
            self.tgt_path,
        );
        Ok(pairs)
    }
}

/// Read every line of a UTF-8 text file. Missing files are fatal.
fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Cannot open corpus file '{}'", path.display()))?;

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.with_context(|| format!("Cannot read from '{}'", path.display()))?);
    }
    Ok(lines)
}

/// Tokenize both sides of every pair and map tokens through the
/// vocabularies. Unknown tokens become `<unk>`; empty lines become
/// empty index lists (the collator later brackets them to
/// `[<bos>, <eos>]`).
pub fn index_pairs(
    pairs:     &[SentencePair],
    tokenizer: &WordTokenizer,
    src_vocab: &Vocabulary,
    tgt_vocab: &Vocabulary,
) -> Vec<IndexedPair> {
    pairs
        .iter()
        .map(|p| {
            let source_ids = src_vocab.encode(&tokenizer.tokenize(&p.source));
            let target_ids = tgt_vocab.encode(&tokenizer.tokenize(&p.target));
            IndexedPair::new(source_ids, target_ids)
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, lines: &[&str]) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_pairs_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_file(&dir, "s.txt", &["ein hund", "eine katze"]);
        let tgt = write_file(&dir, "t.txt", &["a dog", "a cat"]);

        let pairs = ParallelCorpus::new(src, tgt).load_pairs().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].source, "ein hund");
        assert_eq!(pairs[0].target, "a dog");
        assert_eq!(pairs[1].target, "a cat");
    }

    #[test]
    fn test_mismatched_lengths_stop_at_shorter() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_file(&dir, "s.txt", &["eins", "zwei", "drei"]);
        let tgt = write_file(&dir, "t.txt", &["one", "two"]);

        let pairs = ParallelCorpus::new(src, tgt).load_pairs().unwrap();
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let corpus = ParallelCorpus::new("nope.src", "nope.tgt");
        assert!(corpus.load_pairs().is_err());
    }

    #[test]
    fn test_index_pairs_maps_through_vocabularies() {
        let tokenizer = WordTokenizer::new();
        let src_vocab = Vocabulary::build_from_lines(["ein hund"], &tokenizer);
        let tgt_vocab = Vocabulary::build_from_lines(["a dog"], &tokenizer);

        let pairs = vec![SentencePair::new("ein hund lief", "a dog ran")];
        let indexed = index_pairs(&pairs, &tokenizer, &src_vocab, &tgt_vocab);

        assert_eq!(indexed.len(), 1);
        // "lief" and "ran" were never counted, so both map to <unk>
        assert_eq!(
            indexed[0].source_ids,
            vec![
                src_vocab.index_of("ein"),
                src_vocab.index_of("hund"),
                Vocabulary::UNK_INDEX
            ]
        );
        assert_eq!(indexed[0].target_ids[2], Vocabulary::UNK_INDEX);
    }

    #[test]
    fn test_blank_lines_become_empty_index_lists() {
        let tokenizer = WordTokenizer::new();
        let vocab = Vocabulary::build_from_lines(["word"], &tokenizer);

        let pairs = vec![SentencePair::new("", "")];
        let indexed = index_pairs(&pairs, &tokenizer, &vocab, &vocab);
        assert!(indexed[0].source_ids.is_empty());
        assert!(indexed[0].target_ids.is_empty());
    }
}
