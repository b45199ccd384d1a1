// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour,
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - ParallelCorpus implements CorpusSource
//   - A future TsvCorpus could also implement CorpusSource
//   - The application layer only sees CorpusSource
//     and works with both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use crate::domain::sentence_pair::SentencePair;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce aligned sentence pairs.
///
/// Implementations:
///   - ParallelCorpus → reads two line-aligned text files
///   - (future) TsvCorpus → reads tab-separated pairs from one file
pub trait CorpusSource {
    /// Load all available sentence pairs from this source.
    /// Returns a Vec of SentencePairs or an error.
    fn load_pairs(&self) -> Result<Vec<SentencePair>>;
}

// ─── Translator ───────────────────────────────────────────────────────────────
/// Any component that can translate a tokenized source sentence.
///
/// Implementations:
///   - GreedyTranslator → argmax decoding with the trained model
///   - (future) BeamTranslator → beam search decoding
pub trait Translator {
    /// Translate one tokenized source sentence into target tokens.
    /// The returned tokens exclude the start/end markers.
    fn translate(&self, source_tokens: &[String]) -> Result<Vec<String>>;
}
