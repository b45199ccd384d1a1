// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Teacher-forced training of the seq2seq model with Adam.
//
// Key backend split:
//   - Training uses TrainingBackend (Autodiff<NdArray>) for gradients
//   - Held-out scoring uses InferenceBackend (NdArray) — no tape,
//     dropout is a no-op there
//
// One epoch: shuffle the pair indices, cut them into batches,
// collate each batch into [src_len, batch] / [trg_len, batch]
// tensors, run the decoder under the teacher-forcing policy, and
// score timesteps 1.. with a padding-aware cross entropy. The
// step-0 logits are the placeholder row emitted for the start
// marker and are never scored.
//
// Reference: Kingma & Ba (2015) Adam; Pascanu et al. (2013) on
// gradient-norm clipping for recurrent nets.

use anyhow::Result;
use burn::{
    grad_clipping::GradientClippingConfig,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::time::Instant;

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::{TranslationBatch, TranslationBatcher};
use crate::data::dataset::TranslationDataset;
use crate::data::vocab::Vocabulary;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{Seq2SeqConfig, Seq2SeqModel};
use crate::ml::policy::TeacherForcing;

pub type TrainingBackend  = burn::backend::Autodiff<burn::backend::NdArray>;
pub type InferenceBackend = burn::backend::NdArray;

/// Cross entropy over timesteps 1.., with padding targets masked out.
///
/// `logits` — shape: [trg_len, batch, vocab]
/// `targets` — shape: [trg_len, batch]
///
/// Timestep 0 holds the placeholder row for the start marker, so both
/// tensors are sliced from 1 before flattening to [(trg_len-1)*batch, _].
pub fn sequence_loss<B: Backend>(
    logits: Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
    pad_index: usize,
) -> Tensor<B, 1> {
    let [trg_len, batch_size, vocab_size] = logits.dims();

    let scored = logits
        .slice([1..trg_len, 0..batch_size, 0..vocab_size])
        .reshape([(trg_len - 1) * batch_size, vocab_size]);
    let expected = targets
        .slice([1..trg_len, 0..batch_size])
        .reshape([(trg_len - 1) * batch_size]);

    CrossEntropyLossConfig::new()
        .with_pad_tokens(Some(vec![pad_index]))
        .init(&scored.device())
        .forward(scored, expected)
}

/// Mean loss over already-collated batches, with teacher forcing off.
///
/// The decoder always feeds back its own argmax prediction here, so
/// repeated calls on the same model and batches return the same number.
pub fn evaluate<B: Backend>(
    model: &Seq2SeqModel<B>,
    batches: &[TranslationBatch<B>],
    pad_index: usize,
) -> f64 {
    let mut policy = TeacherForcing::greedy();
    let mut loss_sum = 0.0f64;
    let mut batch_count = 0usize;

    for batch in batches {
        let logits = model.forward(batch.source.clone(), batch.target.clone(), &mut policy);
        let loss = sequence_loss(logits, batch.target.clone(), pad_index);
        loss_sum += loss.into_scalar().elem::<f64>();
        batch_count += 1;
    }

    if batch_count > 0 {
        loss_sum / batch_count as f64
    } else {
        f64::NAN
    }
}

pub fn run_training(
    cfg:            &TrainConfig,
    dataset:        TranslationDataset,
    src_vocab_size: usize,
    tgt_vocab_size: usize,
    ckpt_manager:   &CheckpointManager,
) -> Result<()> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    tracing::info!("Using NdArray device: {:?}", device);
    train_loop::<TrainingBackend>(cfg, dataset, src_vocab_size, tgt_vocab_size, ckpt_manager, device)
}

fn train_loop<B: AutodiffBackend>(
    cfg:            &TrainConfig,
    dataset:        TranslationDataset,
    src_vocab_size: usize,
    tgt_vocab_size: usize,
    ckpt_manager:   &CheckpointManager,
    device:         B::Device,
) -> Result<()> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = Seq2SeqConfig::new(
        src_vocab_size, tgt_vocab_size, cfg.embed_dim,
        cfg.enc_hidden, cfg.dec_hidden, cfg.attn_dim, cfg.dropout,
    );
    let mut model: Seq2SeqModel<B> = model_cfg.init(&device);
    println!("The model has {} trainable parameters", model.num_params());

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    // Gradients are norm-clipped before the update.
    let optim_cfg = AdamConfig::new()
        .with_epsilon(1e-8)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.grad_clip)));
    let mut optim = optim_cfg.init();

    let batcher = TranslationBatcher::<B>::new(device);
    let mut policy = TeacherForcing::new(cfg.teacher_forcing);
    tracing::info!("Teacher forcing ratio: {}", policy.ratio());

    // Batch order is reshuffled every epoch from a fixed seed.
    let mut shuffle_rng = StdRng::seed_from_u64(42);
    let logger = MetricsLogger::new(&cfg.checkpoint_dir)?;

    let mut best_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let epoch_start = Instant::now();

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(&mut shuffle_rng);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for chunk in order.chunks(cfg.batch_size) {
            let items: Vec<_> = chunk.iter().map(|&i| dataset.pairs()[i].clone()).collect();
            let batch = batcher.batch(&items);

            let logits = model.forward(batch.source, batch.target.clone(), &mut policy);
            let loss = sequence_loss(logits, batch.target, Vocabulary::PAD_INDEX);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + clipped Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Epoch summary ─────────────────────────────────────────────────────
        let elapsed = epoch_start.elapsed();
        let mins = elapsed.as_secs() / 60;
        let secs = elapsed.as_secs() % 60;

        println!(
            "Epoch {:>2}/{} | time={}m {}s | train_loss={:.3} | train_ppl={:7.3}",
            epoch, cfg.epochs, mins, secs,
            avg_train_loss, avg_train_loss.exp(),
        );

        let metrics = EpochMetrics::new(epoch, avg_train_loss, avg_train_loss.exp(), elapsed.as_secs_f64());
        logger.log(&metrics)?;

        // Only a strictly better epoch overwrites the saved weights.
        if metrics.is_improvement(best_loss) {
            best_loss = metrics.train_loss;
            ckpt_manager.save_model(&model, epoch)?;
            tracing::info!("Checkpoint saved for epoch {} (best loss so far)", epoch);
        }
    }

    tracing::info!("Training complete!");
    Ok(())
}

// ─────────────────────────────────────────────
// Unit Tests
// ─────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentence_pair::IndexedPair;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;
    type TestAutodiffBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_config() -> Seq2SeqConfig {
        Seq2SeqConfig::new(12, 10, 4, 6, 6, 3, 0.0)
    }

    fn sample_pairs() -> Vec<IndexedPair> {
        vec![
            IndexedPair::new(vec![4, 5, 6], vec![4, 5]),
            IndexedPair::new(vec![7], vec![6, 7, 8]),
        ]
    }

    #[test]
    fn test_loss_ignores_padding_positions() {
        let device = Default::default();
        // One sentence of [bos, 4, eos, pad]; the pad sits at timestep 3.
        let targets = Tensor::<TestBackend, 2, Int>::from_ints([[2], [4], [3], [1]], &device);
        let logits =
            Tensor::<TestBackend, 3>::random([4, 1, 10], Distribution::Default, &device);

        let base = sequence_loss(logits.clone(), targets.clone(), Vocabulary::PAD_INDEX)
            .into_scalar()
            .elem::<f64>();

        // Rewriting the logits at the padded timestep must not move the loss.
        let bump = Tensor::<TestBackend, 3>::ones([1, 1, 10], &device) * 100.0;
        let bumped_at_pad = logits.clone().slice_assign([3..4, 0..1, 0..10], bump.clone());
        let at_pad = sequence_loss(bumped_at_pad, targets.clone(), Vocabulary::PAD_INDEX)
            .into_scalar()
            .elem::<f64>();
        assert!((base - at_pad).abs() < 1e-9);

        // The same rewrite at a scored timestep must move it.
        let bumped_at_word = logits.slice_assign([1..2, 0..1, 0..10], bump);
        let at_word = sequence_loss(bumped_at_word, targets, Vocabulary::PAD_INDEX)
            .into_scalar()
            .elem::<f64>();
        assert!((base - at_word).abs() > 1e-6);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let device = Default::default();
        let model: Seq2SeqModel<TestBackend> = tiny_config().init(&device);
        let batcher = TranslationBatcher::<TestBackend>::new(device);
        let batch = batcher.batch(&sample_pairs());

        let first = evaluate(&model, std::slice::from_ref(&batch), Vocabulary::PAD_INDEX);
        let second = evaluate(&model, std::slice::from_ref(&batch), Vocabulary::PAD_INDEX);
        assert!(first.is_finite());
        assert!((first - second).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_without_batches_is_nan() {
        let device = Default::default();
        let model: Seq2SeqModel<TestBackend> = tiny_config().init(&device);
        assert!(evaluate(&model, &[], Vocabulary::PAD_INDEX).is_nan());
    }

    #[test]
    fn test_single_optimizer_step_keeps_loss_finite() {
        let device = Default::default();
        let mut model: Seq2SeqModel<TestAutodiffBackend> = tiny_config().init(&device);
        let batcher = TranslationBatcher::<TestAutodiffBackend>::new(device);
        let batch = batcher.batch(&sample_pairs());
        let mut policy = TeacherForcing::seeded(0.8, 7);

        let logits = model.forward(batch.source.clone(), batch.target.clone(), &mut policy);
        let loss = sequence_loss(logits, batch.target.clone(), Vocabulary::PAD_INDEX);
        let before = loss.clone().into_scalar().elem::<f64>();
        assert!(before.is_finite());

        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let mut optim = AdamConfig::new()
            .with_epsilon(1e-8)
            .with_grad_clipping(Some(GradientClippingConfig::Norm(1.0)))
            .init();
        model = optim.step(1e-3, model, grads);

        let logits = model.forward(batch.source, batch.target.clone(), &mut policy);
        let after = sequence_loss(logits, batch.target, Vocabulary::PAD_INDEX)
            .into_scalar()
            .elem::<f64>();
        assert!(after.is_finite());
    }
}
