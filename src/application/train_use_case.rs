// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Build source vocabulary   (Layer 4 - data)
//   Step 2: Build target vocabulary   (Layer 4 - data)
//   Step 3: Load parallel corpus      (Layer 4 - data)
//   Step 4: Index sentence pairs      (Layer 4 - data)
//   Step 5: Build dataset             (Layer 4 - data)
//   Step 6: Save config               (Layer 6 - infra)
//   Step 7: Run training loop         (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    corpus::{index_pairs, ParallelCorpus},
    dataset::TranslationDataset,
    tokenizer::WordTokenizer,
    vocab::Vocabulary,
};
use crate::domain::traits::CorpusSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded when the test
// command needs to rebuild the exact model architecture.
// The #[derive(Serialize, Deserialize)] macros from serde handle
// reading/writing this struct to JSON automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_src:       String,
    pub train_tgt:       String,
    pub src_vocab:       String,
    pub tgt_vocab:       String,
    pub checkpoint_dir:  String,
    pub batch_size:      usize,
    pub epochs:          usize,
    pub lr:              f64,
    pub embed_dim:       usize,
    pub enc_hidden:      usize,
    pub dec_hidden:      usize,
    pub attn_dim:        usize,
    pub dropout:         f64,
    pub teacher_forcing: f64,
    pub grad_clip:       f32,
    pub max_len:         usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_src:       "data/train.src".to_string(),
            train_tgt:       "data/train.tgt".to_string(),
            // Vocabularies are counted from the training corpus itself
            src_vocab:       "data/train.src".to_string(),
            tgt_vocab:       "data/train.tgt".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            batch_size:      128,
            epochs:          5,
            lr:              1e-3,
            embed_dim:       32,
            enc_hidden:      64,
            dec_hidden:      64,
            attn_dim:        8,
            dropout:         0.5,
            teacher_forcing: 0.8,
            grad_clip:       1.0,
            max_len:         50,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let tokenizer = WordTokenizer::new();

        // ── Step 1: Build source vocabulary ───────────────────────────────────
        // Tokens ranked by corpus frequency, reserved symbols first
        tracing::info!("Building source vocabulary from '{}'", cfg.src_vocab);
        let src_vocab = Vocabulary::build_from_file(&cfg.src_vocab, &tokenizer)?;

        // ── Step 2: Build target vocabulary ───────────────────────────────────
        tracing::info!("Building target vocabulary from '{}'", cfg.tgt_vocab);
        let tgt_vocab = Vocabulary::build_from_file(&cfg.tgt_vocab, &tokenizer)?;
        tracing::info!(
            "Vocabulary sizes: {} source, {} target",
            src_vocab.len(),
            tgt_vocab.len()
        );

        // ── Step 3: Load the parallel corpus ──────────────────────────────────
        // One sentence per line; line i of the source file pairs with
        // line i of the target file
        let corpus = ParallelCorpus::new(&cfg.train_src, &cfg.train_tgt);
        let pairs = corpus.load_pairs()?;

        // ── Step 4: Tokenise and index every pair ─────────────────────────────
        // Words absent from a vocabulary map to the unknown index
        let indexed = index_pairs(&pairs, &tokenizer, &src_vocab, &tgt_vocab);

        // ── Step 5: Build the dataset ─────────────────────────────────────────
        let dataset = TranslationDataset::new(indexed);
        tracing::info!("Training on {} sentence pairs", dataset.len());

        // ── Step 6: Save config for the test command ──────────────────────────
        // Evaluation needs to know the model architecture to rebuild it
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, dataset, src_vocab.len(), tgt_vocab.len(), &ckpt_manager)?;

        Ok(())
    }
}
