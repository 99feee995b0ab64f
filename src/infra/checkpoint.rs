// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per training run:
//   1. model_epoch_<N>.mpk.gz — weights after each epoch
//   2. latest_epoch.json      — which epoch was last saved
//   3. train_config.json      — hyperparameters, vocab size,
//                               max caption length
//
// The config is saved separately because inference must rebuild
// the exact architecture (vocab_size, max_caption_len, d_hidden)
// before the weights can be loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::CaptionModel;

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights for a given epoch and update the
    /// latest-epoch pointer the decoder loads from.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &CaptionModel<B>,
        epoch: usize,
    ) -> Result<()> {
        // The recorder appends its own extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load model weights from the latest saved checkpoint.
    ///
    /// The model parameter must have the architecture the checkpoint
    /// was trained with or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model:  CaptionModel<B>,
        device: &B::Device,
    ) -> Result<CaptionModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    /// Must run before training so inference can rebuild the model.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration written by the last train run.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'caption'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest_epoch.json and return the epoch number.
    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
