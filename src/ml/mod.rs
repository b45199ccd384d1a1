// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// The data layer touches tensors only in the batcher; everything
// else that imports burn lives here.
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Other layers are testable without a tensor backend
//   - The model architecture is clearly separated from
//     data loading and application logic
//
// What's in this layer:
//
//   gru.rs        — Single-step GRU cell built from Linear layers
//                   (Burn's packaged Gru runs whole sequences only;
//                   the decoder needs one step at a time)
//
//   model.rs      — The encoder-decoder architecture:
//                   • Bidirectional GRU encoder
//                   • Additive attention over encoder outputs
//                   • Single-step attentional GRU decoder
//                   • Seq2Seq driver producing per-step logits
//
//   policy.rs     — Teacher-forcing policy: the per-step choice
//                   between ground truth and model prediction
//
//   trainer.rs    — The training loop
//                   Handles forward pass, masked loss, backward
//                   pass, clipped Adam step, checkpoint saving
//                   and the evaluation pass
//
//   translator.rs — Greedy decoding of single sentences,
//                   used by BLEU scoring
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Cho et al. (2014) Learning Phrase Representations
//            Bahdanau et al. (2015) Neural Machine Translation
//            by Jointly Learning to Align and Translate

/// Single-step GRU cell
pub mod gru;

/// Encoder, attention, decoder and the sequence driver
pub mod model;

/// Teacher-forcing policy with a seedable random source
pub mod policy;

/// Full training loop with evaluation and checkpointing
pub mod trainer;

/// Greedy single-sentence decoding for BLEU and inference
pub mod translator;
