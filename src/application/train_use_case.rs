// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Parse the caption token file   (Layer 4 - data)
//   Step 2: Clean the captions             (Layer 4 - data)
//   Step 3: Persist descriptions.txt       (Layer 4 - data)
//   Step 4: Load the train split           (Layer 4 - data)
//   Step 5: Build / load tokenizer         (Layer 6 - infra)
//   Step 6: Extract / load features        (Layer 6 - infra)
//   Step 7: Fix the pad length             (Layer 4 - data)
//   Step 8: Save config                    (Layer 6 - infra)
//   Step 9: Run training loop              (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    cleaner::CaptionCleaner,
    generator::max_caption_len,
    loader::{self, TokenFileLoader},
};
use crate::domain::traits::CaptionSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    feature_store::{self, FeatureStore},
    tokenizer_store::TokenizerStore,
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters and paths for a training run. Serialisable so
// it can be saved to disk and reloaded for inference. vocab_size and
// max_caption_len start at 0 and are filled in from the training data
// before the config is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub captions_file:   String,
    pub train_split:     String,
    pub images_dir:      String,
    pub model_dir:       String,
    pub extractor_model: Option<String>,
    pub epochs:          usize,
    pub lr:              f64,
    pub d_embed:         usize,
    pub d_hidden:        usize,
    pub dropout:         f64,
    pub feature_dim:     usize,
    pub vocab_size:      usize,
    pub max_caption_len: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            captions_file:   "data/Flickr8k.token.txt".to_string(),
            train_split:     "data/Flickr_8k.trainImages.txt".to_string(),
            images_dir:      "data/images".to_string(),
            model_dir:       "models".to_string(),
            extractor_model: None,
            epochs:          10,
            lr:              1e-3,
            d_embed:         256,
            d_hidden:        256,
            dropout:         0.5,
            feature_dim:     2048,
            vocab_size:      0,
            max_caption_len: 0,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(mut self) -> Result<()> {
        // ── Step 1: Parse the caption token file ──────────────────────────────
        let loader = TokenFileLoader::new(&self.config.captions_file);
        let mut captions = loader.load()?;

        // ── Step 2: Clean / normalise the captions ────────────────────────────
        CaptionCleaner::new().clean_set(&mut captions);

        // ── Step 3: Persist the cleaned-description artifact ──────────────────
        std::fs::create_dir_all(&self.config.model_dir).ok();
        let descriptions_path = Path::new(&self.config.model_dir).join("descriptions.txt");
        loader::save_descriptions(&captions, &descriptions_path)?;

        // ── Step 4: Restrict to the train split, adding sentinels ─────────────
        let photos = loader::load_image_list(&self.config.train_split)?;
        let train_captions = loader::load_clean_descriptions(&descriptions_path, &photos)?;

        // ── Step 5: Build / load the frozen tokenizer ─────────────────────────
        let tok_store = TokenizerStore::new(&self.config.model_dir);
        let tokenizer = tok_store.load_or_build(&train_captions)?;

        // ── Step 6: Extract / load feature vectors ────────────────────────────
        let feat_store = FeatureStore::new(&self.config.model_dir);
        let all_features = feat_store.load_or_extract(
            Path::new(&self.config.images_dir),
            self.config.extractor_model.as_deref().map(Path::new),
        )?;
        let train_features = feature_store::subset(&all_features, &photos);

        // ── Step 7: Fix the global pad length ─────────────────────────────────
        // Computed once over all training captions; every prefix, every
        // epoch, and every decode pads to this length
        self.config.vocab_size      = tokenizer.vocab_size();
        self.config.max_caption_len = max_caption_len(&train_captions);

        tracing::info!("Dataset: {} train images", photos.len());
        tracing::info!("Descriptions: train={}", train_captions.caption_count());
        tracing::info!("Photos with features: train={}", train_features.len());
        tracing::info!("Vocabulary size: {}", self.config.vocab_size);
        tracing::info!("Max caption length: {}", self.config.max_caption_len);

        // ── Step 8: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&self.config.model_dir);
        ckpt_manager.save_config(&self.config)?;

        // ── Step 9: Run training loop (Layer 5) ───────────────────────────────
        run_training(&self.config, &train_captions, &train_features, &tokenizer, ckpt_manager)?;

        Ok(())
    }
}
