// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   model parameters to disk. Also saves/loads
//                   TrainConfig as JSON so evaluation can
//                   rebuild the model with matching shapes.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss,
//                   perplexity, wall time) to a CSV file for
//                   later analysis and plotting.
//
//   bleu.rs       — Translation quality scoring
//                   Sentence-level BLEU with uniform 4-gram
//                   weights plus a corpus-level mean that
//                   reports skipped sentences separately.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap file checkpoints for S3 cloud storage)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)
//            Papineni et al. (2002) BLEU

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// BLEU scoring for translated sentences
pub mod bleu;
