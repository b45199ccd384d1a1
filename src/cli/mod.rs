// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`     — trains the model on a parallel corpus
//   2. `test`      — evaluates loss/perplexity/BLEU on a test set
//   3. `translate` — reserved; accepted but not implemented
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TestArgs, TrainArgs, TranslateArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "gru-nmt",
    version = "0.1.0",
    about = "Train a GRU encoder-decoder translation model, then evaluate it."
)]
pub struct Cli {
    /// The subcommand to run (train, test or translate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin: it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => Self::run_train(args),
            Commands::Test(args)      => Self::run_test(args),
            Commands::Translate(args) => Self::run_translate(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on corpus: {}", args.train_src);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete.");
        Ok(())
    }

    /// Handles the `test` subcommand.
    /// Evaluates the trained model on a held-out parallel corpus.
    fn run_test(args: TestArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        tracing::info!("Evaluating on corpus: {}", args.test_src);

        let use_case = EvaluateUseCase::new(args.into());
        use_case.execute()?;

        Ok(())
    }

    /// Handles the `translate` subcommand.
    /// The mode is accepted for forward compatibility but has no
    /// implementation yet; it logs and exits cleanly.
    fn run_translate(args: TranslateArgs) -> Result<()> {
        tracing::warn!(
            "translate mode is not implemented yet (sentence was: '{}')",
            args.sentence
        );
        Ok(())
    }
}
