// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Why log metrics to CSV?
//   - Easy to open in Excel or Google Sheets
//   - Can plot learning curves to diagnose training issues
//   - Provides a permanent record of each training run
//
// Metrics recorded per epoch:
//   - epoch:        the epoch number (1, 2, 3, ...)
//   - train_loss:   average cross-entropy loss on training batches
//   - train_ppl:    exp(train_loss), the per-token perplexity
//   - elapsed_secs: wall-clock seconds the epoch took
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_ppl,elapsed_secs
//   1,5.124500,168.094632,62.10
//   2,4.890100,132.955817,61.87
//   ...
//
// How to read the metrics:
//   - Loss should decrease each epoch (model is learning)
//   - Perplexity is the same signal on an interpretable scale:
//     "how many tokens was the model choosing between"
//   - A sudden loss spike usually means the clip norm is too high
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    /// Lower is better. Random initialisation gives ~ln(vocab_size)
    pub train_loss: f64,

    /// exp(train_loss) — perplexity over the target vocabulary
    pub train_ppl: f64,

    /// Wall-clock duration of the epoch in seconds
    pub elapsed_secs: f64,
}

impl EpochMetrics {
    /// Create a new EpochMetrics record
    pub fn new(
        epoch:        usize,
        train_loss:   f64,
        train_ppl:    f64,
        elapsed_secs: f64,
    ) -> Self {
        Self { epoch, train_loss, train_ppl, elapsed_secs }
    }

    /// Returns true if this epoch improved on the best loss seen so far.
    ///
    /// The caller must seed its running best with `f64::INFINITY`: a zero
    /// baseline can never be beaten by a cross-entropy loss, so no epoch
    /// would ever be considered an improvement.
    pub fn is_improvement(&self, best_train_loss: f64) -> bool {
        self.train_loss < best_train_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());

        // Create directory if it doesn't exist
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Write CSV header only if file is new
        // This allows appending to an existing log across runs
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            // Write the header row
            writeln!(f, "epoch,train_loss,train_ppl,elapsed_secs")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    ///
    /// Uses OpenOptions with append=true so we add to the file
    /// without overwriting previous epochs.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        // Open in append mode — adds to end of file
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.2}",
            m.epoch,
            m.train_loss,
            m.train_ppl,
            m.elapsed_secs,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, train_ppl={:.4}",
            m.epoch,
            m.train_loss,
            m.train_ppl,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
