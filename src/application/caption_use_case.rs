// ============================================================
// Layer 2 — Caption Use Case
// ============================================================
// Inference workflow: embed one image with the same frozen encoder
// used at training time, then greedily decode a caption with the
// trained fusion model and the persisted tokenizer.

use anyhow::Result;
use std::path::Path;

use crate::infra::checkpoint::CheckpointManager;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::decoder::Decoder;
use crate::ml::extractor::FeatureExtractor;

pub struct CaptionUseCase {
    decoder:         Decoder,
    extractor_model: Option<String>,
}

impl CaptionUseCase {
    /// Load every artifact of the last training run: tokenizer,
    /// config, and model weights.
    pub fn new(model_dir: String, extractor_model: Option<String>) -> Result<Self> {
        let tokenizer = TokenizerStore::new(&model_dir).load()?;
        let ckpt      = CheckpointManager::new(&model_dir);
        let decoder   = Decoder::from_checkpoint(&ckpt, tokenizer)?;
        Ok(Self { decoder, extractor_model })
    }

    /// Generate a caption for the image at `image_path`.
    /// The returned text includes the start/end sentinels.
    pub fn caption(&self, image_path: &Path) -> Result<String> {
        let mut extractor = FeatureExtractor::new(
            self.extractor_model.as_deref().map(Path::new),
        )?;
        let features = extractor.extract(image_path)?;

        self.decoder.generate(&features)
    }
}
