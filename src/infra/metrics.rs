// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy loss over the epoch's batches
//   - examples:   number of (prefix, next-word) examples consumed
//
// Output file: <model_dir>/metrics.csv

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
    pub epoch: usize,

    /// Average cross-entropy loss over all batches this epoch.
    /// Random initialisation gives ~ln(vocab_size)
    pub train_loss: f64,

    /// Number of training examples consumed this epoch
    pub examples: usize,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, examples: usize) -> Self {
        Self { epoch, train_loss, examples }
    }

    /// Returns true if this epoch improved over the previous best loss
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.train_loss < best_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header only if the file is new, so repeated
    /// runs append instead of overwriting.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,examples")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{:.6},{}", m.epoch, m.train_loss, m.examples)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, examples={}",
            m.epoch,
            m.train_loss,
            m.examples,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.3, 4700);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }
}
