// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `test` and `translate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::evaluate_use_case::TestConfig;
use crate::application::train_use_case::TrainConfig;

/// The three top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the translation model on a parallel corpus
    Train(TrainArgs),

    /// Evaluate loss, perplexity and BLEU on a held-out test set
    Test(TestArgs),

    /// Translate a sentence with a trained checkpoint (not implemented yet)
    Translate(TranslateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
/// Defaults match the reference hyperparameters of this model family.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Source-language training corpus, one sentence per line
    #[arg(long, default_value = "data/train.src")]
    pub train_src: String,

    /// Target-language training corpus, one sentence per line
    #[arg(long, default_value = "data/train.tgt")]
    pub train_tgt: String,

    /// File the source vocabulary is counted from
    /// (defaults to the training source corpus itself)
    #[arg(long)]
    pub src_vocab: Option<String>,

    /// File the target vocabulary is counted from
    /// (defaults to the training target corpus itself)
    #[arg(long)]
    pub tgt_vocab: Option<String>,

    /// Directory to save model checkpoints and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of sentence pairs processed together in one forward pass
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Dimension of the token embedding vectors (both languages)
    #[arg(long, default_value_t = 32)]
    pub embed_dim: usize,

    /// Hidden size of each encoder GRU direction
    #[arg(long, default_value_t = 64)]
    pub enc_hidden: usize,

    /// Hidden size of the decoder GRU
    #[arg(long, default_value_t = 64)]
    pub dec_hidden: usize,

    /// Projection size of the additive attention energy layer
    #[arg(long, default_value_t = 8)]
    pub attn_dim: usize,

    /// Dropout probability on embeddings during training
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Probability of feeding the ground-truth token (instead of the
    /// model's own prediction) at each decoding step during training
    #[arg(long, default_value_t = 0.8)]
    pub teacher_forcing: f64,

    /// Gradient norm clipping threshold
    #[arg(long, default_value_t = 1.0)]
    pub grad_clip: f32,

    /// Maximum number of tokens produced when decoding greedily
    #[arg(long, default_value_t = 50)]
    pub max_len: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2:
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        // Vocabulary files default to the training corpus itself,
        // the usual setup when no separate vocabulary seed exists.
        let src_vocab = a.src_vocab.unwrap_or_else(|| a.train_src.clone());
        let tgt_vocab = a.tgt_vocab.unwrap_or_else(|| a.train_tgt.clone());
        TrainConfig {
            train_src:       a.train_src,
            train_tgt:       a.train_tgt,
            src_vocab,
            tgt_vocab,
            checkpoint_dir:  a.checkpoint_dir,
            batch_size:      a.batch_size,
            epochs:          a.epochs,
            lr:              a.lr,
            embed_dim:       a.embed_dim,
            enc_hidden:      a.enc_hidden,
            dec_hidden:      a.dec_hidden,
            attn_dim:        a.attn_dim,
            dropout:         a.dropout,
            teacher_forcing: a.teacher_forcing,
            grad_clip:       a.grad_clip,
            max_len:         a.max_len,
        }
    }
}

/// All arguments for the `test` command.
/// Architecture hyperparameters are read from the checkpoint's
/// train_config.json, so only data paths appear here.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Source-language test corpus, one sentence per line
    #[arg(long, default_value = "data/test.src")]
    pub test_src: String,

    /// Target-language test corpus, one sentence per line
    #[arg(long, default_value = "data/test.tgt")]
    pub test_tgt: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of sentence pairs per evaluation batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,
}

impl From<TestArgs> for TestConfig {
    fn from(a: TestArgs) -> Self {
        TestConfig {
            test_src:       a.test_src,
            test_tgt:       a.test_tgt,
            checkpoint_dir: a.checkpoint_dir,
            batch_size:     a.batch_size,
        }
    }
}

/// All arguments for the `translate` command
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// The source-language sentence to translate
    #[arg(long)]
    pub sentence: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
