// ============================================================
// Layer 4 — Caption Batcher
// ============================================================
// Converts one image's Vec<CaptionExample> into tensors for the
// model forward pass.
//
//   Input:  N examples, each with a feature vector of length F
//           and a prefix of length L
//   Output: features [N, F], prefixes [N, L], targets [N]
//
// All prefixes are already padded to the same length by the
// Example Generator, so stacking is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::prelude::*;

use crate::data::generator::CaptionExample;

// ─── CaptionBatch ─────────────────────────────────────────────────────────────
/// A batch of caption examples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct CaptionBatch<B: Backend> {
    /// Image embedding vectors — shape: [batch_size, feature_dim]
    pub features: Tensor<B, 2>,

    /// Left-padded prefix sequences — shape: [batch_size, max_caption_len]
    pub prefixes: Tensor<B, 2, Int>,

    /// True next-word indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── CaptionBatcher ───────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the correct
/// GPU/CPU. Generic over the backend so the same batcher serves
/// training and inference.
#[derive(Clone, Debug)]
pub struct CaptionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CaptionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack a non-empty slice of examples into one CaptionBatch.
    pub fn batch(&self, items: &[CaptionExample]) -> CaptionBatch<B> {
        let batch_size  = items.len();
        let feature_dim = items[0].features.len();
        let seq_len     = items[0].prefix.len();

        let feature_flat: Vec<f32> = items
            .iter()
            .flat_map(|e| e.features.iter().copied())
            .collect();

        let prefix_flat: Vec<i32> = items
            .iter()
            .flat_map(|e| e.prefix.iter().map(|&x| x as i32))
            .collect();

        let target_flat: Vec<i32> = items
            .iter()
            .map(|e| e.target as i32)
            .collect();

        let features = Tensor::<B, 1>::from_floats(feature_flat.as_slice(), &self.device)
            .reshape([batch_size, feature_dim]);

        let prefixes = Tensor::<B, 1, Int>::from_ints(prefix_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(target_flat.as_slice(), &self.device);

        CaptionBatch { features, prefixes, targets }
    }
}
