// ============================================================
// Layer 3 — Sentence Pair Domain Types
// ============================================================
// Represents one aligned example of a parallel corpus:
// a sentence in the source language and its translation
// in the target language.
//
// Two forms exist:
//   - SentencePair: the raw text, straight off the corpus files
//   - IndexedPair:  both sides converted to vocabulary indices,
//                   ready for batching
//
// Neither form carries the start/end markers. Those are a
// batching concern and are added by the collator, so the same
// indexed pair can be reused by the loss path and the greedy
// translator without double-bracketing.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One aligned sentence pair as read from the corpus files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentencePair {
    /// Source-language sentence, untokenized
    pub source: String,

    /// Target-language sentence, untokenized
    pub target: String,
}

impl SentencePair {
    /// Create a new SentencePair.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// The same pair after tokenization and vocabulary lookup.
/// Indices are raw sentence tokens only; `<bos>`/`<eos>` markers
/// and padding are added later by the batch collator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPair {
    /// Source sentence as vocabulary indices
    pub source_ids: Vec<usize>,

    /// Target sentence as vocabulary indices
    pub target_ids: Vec<usize>,
}

impl IndexedPair {
    pub fn new(source_ids: Vec<usize>, target_ids: Vec<usize>) -> Self {
        Self { source_ids, target_ids }
    }

    /// Length of the source side in tokens, markers excluded
    pub fn source_len(&self) -> usize {
        self.source_ids.len()
    }

    /// Length of the target side in tokens, markers excluded
    pub fn target_len(&self) -> usize {
        self.target_ids.len()
    }
}
