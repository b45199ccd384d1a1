// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw corpus files
// all the way to model-ready tensor batches.
//
// The pipeline flows in this order:
//
//   parallel text files (source + target)
//       │
//       ▼
//   WordTokenizer        → splits sentences into word tokens
//       │
//       ▼
//   Vocabulary           → assigns every token a stable index
//       │
//       ▼
//   ParallelCorpus       → zips the two files into indexed pairs
//       │
//       ▼
//   TranslationDataset   → owns the pairs, serves them by index
//       │
//       ▼
//   TranslationBatcher   → brackets, pads and stacks into tensors
//       │
//       ▼
//   training loop        → consumes [time, batch] Int tensors
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Word-level tokenizer for corpus text
pub mod tokenizer;

/// Two-way token/index vocabulary with reserved symbols
pub mod vocab;

/// Reads the two line-aligned corpus files into sentence pairs
pub mod corpus;

/// Owns the indexed pairs and serves them to the trainer
pub mod dataset;

/// Brackets, pads and stacks pairs into tensor batches
pub mod batcher;
