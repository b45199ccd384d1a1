// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a trained model on a held-out test corpus:
//
//   Step 1: Recover the training configuration
//   Step 2: Rebuild vocabularies the same way training did
//   Step 3: Load and index the test sentence pairs
//   Step 4: Rebuild the model and load its weights
//   Step 5: Report test loss and perplexity (teacher forcing off)
//   Step 6: Translate every test sentence and report corpus BLEU
//
// If no checkpoint exists the model is scored freshly initialised,
// with a warning — useful as a random baseline, and the command
// still completes instead of aborting.

use anyhow::Result;

use crate::data::{
    batcher::TranslationBatcher,
    corpus::{index_pairs, ParallelCorpus},
    tokenizer::WordTokenizer,
    vocab::Vocabulary,
};
use crate::domain::traits::{CorpusSource, Translator};
use crate::infra::{
    bleu::{corpus_bleu, sentence_bleu},
    checkpoint::CheckpointManager,
};
use crate::ml::{
    model::{Seq2SeqConfig, Seq2SeqModel},
    trainer::{evaluate, InferenceBackend},
    translator::GreedyTranslator,
};

use super::train_use_case::TrainConfig;

/// Everything the `test` command needs. Architecture hyperparameters
/// are not here: they come from the checkpoint's saved TrainConfig.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub test_src:       String,
    pub test_tgt:       String,
    pub checkpoint_dir: String,
    pub batch_size:     usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_src:       "data/test.src".to_string(),
            test_tgt:       "data/test.tgt".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            batch_size:     128,
        }
    }
}

pub struct EvaluateUseCase {
    config: TestConfig,
}

impl EvaluateUseCase {
    pub fn new(config: TestConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);

        // ── Step 1: Recover the training configuration ────────────────────────
        let train_cfg = if ckpt_manager.has_config() {
            ckpt_manager.load_config()?
        } else {
            tracing::warn!(
                "No saved training config in '{}', falling back to defaults",
                cfg.checkpoint_dir
            );
            TrainConfig::default()
        };

        // ── Step 2: Rebuild the vocabularies ──────────────────────────────────
        // Same corpus files as training, so indices line up with the
        // embedding tables inside the checkpoint
        let tokenizer = WordTokenizer::new();
        let src_vocab = Vocabulary::build_from_file(&train_cfg.src_vocab, &tokenizer)?;
        let tgt_vocab = Vocabulary::build_from_file(&train_cfg.tgt_vocab, &tokenizer)?;

        // ── Step 3: Load and index the test corpus ────────────────────────────
        let corpus = ParallelCorpus::new(&cfg.test_src, &cfg.test_tgt);
        let pairs = corpus.load_pairs()?;
        let indexed = index_pairs(&pairs, &tokenizer, &src_vocab, &tgt_vocab);
        tracing::info!("Evaluating on {} sentence pairs", pairs.len());

        // ── Step 4: Rebuild the model and load weights ────────────────────────
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let model_cfg = Seq2SeqConfig::new(
            src_vocab.len(), tgt_vocab.len(), train_cfg.embed_dim,
            train_cfg.enc_hidden, train_cfg.dec_hidden, train_cfg.attn_dim,
            train_cfg.dropout,
        );
        let mut model: Seq2SeqModel<InferenceBackend> = model_cfg.init(&device);
        if ckpt_manager.has_model() {
            model = ckpt_manager.load_model(model, &device)?;
        } else {
            tracing::warn!(
                "No checkpoint found in '{}', scoring a freshly initialised model",
                cfg.checkpoint_dir
            );
        }

        // ── Step 5: Test loss with teacher forcing off ────────────────────────
        let batcher = TranslationBatcher::<InferenceBackend>::new(device.clone());
        let batches: Vec<_> = indexed
            .chunks(cfg.batch_size)
            .map(|chunk| batcher.batch(chunk))
            .collect();
        let test_loss = evaluate(&model, &batches, Vocabulary::PAD_INDEX);
        println!(
            "| Test Loss: {:.3} | Test PPL: {:7.3} |",
            test_loss,
            test_loss.exp(),
        );

        // ── Step 6: Corpus BLEU over greedy translations ──────────────────────
        let translator =
            GreedyTranslator::new(model, src_vocab, tgt_vocab, train_cfg.max_len, device);

        let mut outcomes = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let source_tokens = tokenizer.tokenize(&pair.source);
            let reference = tokenizer.tokenize(&pair.target);
            let candidate = translator.translate(&source_tokens)?;
            outcomes.push(sentence_bleu(&reference, &candidate));
        }

        let summary = corpus_bleu(outcomes);
        println!(
            "| BLEU: {:.4} over {} sentences ({} skipped) |",
            summary.mean, summary.scored, summary.skipped,
        );

        Ok(())
    }
}

// ─────────────────────────────────────────────
// Unit Tests
// ─────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainUseCase;

    // End-to-end smoke test: one tiny training run, then the full
    // evaluation path against the checkpoint it produced.
    #[test]
    fn test_train_then_evaluate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path.to_str().unwrap().to_string()
        };
        let train_src = write("train.src", "the cat sat\na dog ran\n");
        let train_tgt = write("train.tgt", "le chat dormait\nun chien courait\n");
        let ckpt_dir = dir.path().join("ckpt").to_str().unwrap().to_string();

        let mut cfg = TrainConfig::default();
        cfg.train_src = train_src.clone();
        cfg.train_tgt = train_tgt.clone();
        cfg.src_vocab = train_src.clone();
        cfg.tgt_vocab = train_tgt.clone();
        cfg.checkpoint_dir = ckpt_dir.clone();
        cfg.batch_size = 2;
        cfg.epochs = 1;
        cfg.embed_dim = 4;
        cfg.enc_hidden = 6;
        cfg.dec_hidden = 6;
        cfg.attn_dim = 3;
        cfg.dropout = 0.0;
        cfg.max_len = 6;
        TrainUseCase::new(cfg).execute().unwrap();

        // The single finite-loss epoch must have produced a checkpoint.
        let ckpt_manager = CheckpointManager::new(ckpt_dir.clone());
        assert!(ckpt_manager.has_config());
        assert!(ckpt_manager.has_model());

        let test_cfg = TestConfig {
            test_src: train_src,
            test_tgt: train_tgt,
            checkpoint_dir: ckpt_dir,
            batch_size: 2,
        };
        EvaluateUseCase::new(test_cfg).execute().unwrap();
    }

    #[test]
    fn test_evaluate_without_checkpoint_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path.to_str().unwrap().to_string()
        };
        let test_src = write("test.src", "the cat sat\n");
        let test_tgt = write("test.tgt", "le chat dormait\n");
        let empty_ckpt = dir.path().join("no-ckpt").to_str().unwrap().to_string();

        // Point the fallback config's vocabulary files somewhere real by
        // pre-writing a config, but no model weights.
        let mut cfg = TrainConfig::default();
        cfg.src_vocab = test_src.clone();
        cfg.tgt_vocab = test_tgt.clone();
        cfg.embed_dim = 4;
        cfg.enc_hidden = 6;
        cfg.dec_hidden = 6;
        cfg.attn_dim = 3;
        cfg.max_len = 6;
        let ckpt_manager = CheckpointManager::new(empty_ckpt.clone());
        ckpt_manager.save_config(&cfg).unwrap();

        let test_cfg = TestConfig {
            test_src,
            test_tgt,
            checkpoint_dir: empty_ckpt,
            batch_size: 2,
        };
        EvaluateUseCase::new(test_cfg).execute().unwrap();
    }
}
