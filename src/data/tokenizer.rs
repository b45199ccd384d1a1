// ============================================================
// Layer 4 — Word Tokenizer
// ============================================================
// Splits a sentence into word-level tokens before vocabulary
// lookup. The rules are deliberately simple:
//
//   1. Split on Unicode whitespace
//   2. Detach leading punctuation into separate tokens
//   3. Detach trailing punctuation into separate tokens
//   4. Interior punctuation stays attached ("well-known")
//
// So "Hello, world!" becomes ["Hello", ",", "world", "!"].
//
// The tokenizer is deterministic and language-agnostic. It does
// not lowercase: casing is left to the vocabulary, which treats
// "The" and "the" as distinct tokens.
//
// Reference: Rust Book §8 (Strings in Rust)

/// Word-level tokenizer used for both corpus languages.
pub struct WordTokenizer;

impl WordTokenizer {
    /// Create a new WordTokenizer instance
    pub fn new() -> Self {
        Self
    }

    /// Tokenize one sentence into word and punctuation tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for word in text.split_whitespace() {
            let mut rest = word;

            // ── Detach leading punctuation ────────────────────────────────────
            loop {
                let mut chars = rest.chars();
                match chars.next() {
                    Some(c) if c.is_ascii_punctuation() => {
                        tokens.push(c.to_string());
                        rest = chars.as_str();
                    }
                    _ => break,
                }
            }

            // ── Detach trailing punctuation ───────────────────────────────────
            // Collected back to front, so reverse before appending.
            let mut trailing = Vec::new();
            loop {
                let mut chars = rest.chars();
                match chars.next_back() {
                    Some(c) if c.is_ascii_punctuation() => {
                        trailing.push(c.to_string());
                        rest = chars.as_str();
                    }
                    _ => break,
                }
            }

            if !rest.is_empty() {
                tokens.push(rest.to_string());
            }
            tokens.extend(trailing.into_iter().rev());
        }

        tokens
    }
}

/// Implement Default so WordTokenizer can be created with WordTokenizer::default()
impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}
