// ============================================================
// Layer 5 — Greedy Decoder
// ============================================================
// Autoregressive caption generation: repeatedly query the trained
// fusion model for the most probable next word until the end
// sentinel, an unknown index, or the length cap.
//
// Greedy arg-max only — no beam search, no length normalisation,
// no repetition penalty. Deterministic for a fixed checkpoint and
// input vector.

use anyhow::Result;
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::data::generator::pad_prefix;
use crate::data::tokenizer::CaptionTokenizer;
use crate::domain::captions::{END_TOKEN, START_TOKEN};
use crate::domain::traits::WordPredictor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{CaptionModel, CaptionModelConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Decoder {
    model:           CaptionModel<InferBackend>,
    tokenizer:       CaptionTokenizer,
    max_caption_len: usize,
    device:          burn::backend::wgpu::WgpuDevice,
}

impl Decoder {
    /// Rebuild the trained model from the latest checkpoint.
    /// Dropout is zeroed for deterministic inference.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        tokenizer:    CaptionTokenizer,
    ) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;
        let model_cfg = CaptionModelConfig::new(
            cfg.vocab_size, cfg.max_caption_len, cfg.feature_dim,
            cfg.d_embed, cfg.d_hidden, 0.0,
        );
        let model: CaptionModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self { model, tokenizer, max_caption_len: cfg.max_caption_len, device })
    }

    /// Generate a caption for one image's feature vector.
    /// The returned text includes the start/end sentinels.
    pub fn generate(&self, features: &[f32]) -> Result<String> {
        greedy_decode(self, &self.tokenizer, self.max_caption_len, features)
    }
}

impl WordPredictor for Decoder {
    fn predict_next(&self, features: &[f32], prefix: &[u32]) -> Result<Vec<f32>> {
        let feature_tensor = Tensor::<InferBackend, 1>::from_floats(features, &self.device)
            .unsqueeze::<2>();

        let prefix_flat: Vec<i32> = prefix.iter().map(|&x| x as i32).collect();
        let prefix_tensor = Tensor::<InferBackend, 1, Int>::from_ints(
            prefix_flat.as_slice(), &self.device,
        ).unsqueeze::<2>();

        let logits = self.model.forward(feature_tensor, prefix_tensor);
        let probs  = softmax(logits, 1).squeeze::<1>(0);

        probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read prediction tensor: {e:?}"))
    }
}

/// The greedy decode loop, generic over the predictor so it can be
/// exercised without a trained checkpoint.
///
/// Appends at most `max_caption_len` words after the start sentinel.
pub fn greedy_decode(
    predictor:       &impl WordPredictor,
    tokenizer:       &CaptionTokenizer,
    max_caption_len: usize,
    features:        &[f32],
) -> Result<String> {
    let mut in_text = String::from(START_TOKEN);

    for _ in 0..max_caption_len {
        let seq    = tokenizer.encode(&in_text);
        let padded = pad_prefix(&seq, max_caption_len);
        let probs  = predictor.predict_next(features, &padded)?;

        let next_id = argmax(&probs) as u32;

        // An index outside the vocabulary is a normal stop, not an error
        let Some(word) = tokenizer.word_for_id(next_id) else {
            break;
        };
        let word = word.to_string();

        in_text.push(' ');
        in_text.push_str(&word);

        if word == END_TOKEN {
            break;
        }
    }

    Ok(in_text)
}

/// Index of the largest probability; the first one wins on ties.
fn argmax(probs: &[f32]) -> usize {
    let mut best_idx   = 0usize;
    let mut best_score = f32::NEG_INFINITY;
    for (i, &p) in probs.iter().enumerate() {
        if p > best_score {
            best_score = p;
            best_idx   = i;
        }
    }
    best_idx
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::captions::CaptionSet;

    /// Stub predictor that always returns the same distribution.
    struct FixedPredictor {
        probs: Vec<f32>,
    }

    impl WordPredictor for FixedPredictor {
        fn predict_next(&self, _features: &[f32], _prefix: &[u32]) -> Result<Vec<f32>> {
            Ok(self.probs.clone())
        }
    }

    fn fixture_tokenizer() -> CaptionTokenizer {
        let mut set = CaptionSet::new();
        // Frequencies pin the ids: start=1, end=2, dog=3, runs=4
        set.push("a.jpg", "start start start end end dog dog runs");
        CaptionTokenizer::fit(&set)
    }

    #[test]
    fn test_stops_on_end_sentinel() {
        let tok = fixture_tokenizer();
        let end_id = tok.encode(END_TOKEN)[0] as usize;

        let mut probs = vec![0.0f32; tok.vocab_size()];
        probs[end_id] = 1.0;
        let predictor = FixedPredictor { probs };

        let text = greedy_decode(&predictor, &tok, 10, &[0.5]).unwrap();
        assert_eq!(text, "start end");
    }

    #[test]
    fn test_stops_on_unknown_index() {
        let tok = fixture_tokenizer();

        // All mass on the reserved padding index, which maps to no word
        let mut probs = vec![0.0f32; tok.vocab_size()];
        probs[0] = 1.0;
        let predictor = FixedPredictor { probs };

        let text = greedy_decode(&predictor, &tok, 10, &[0.5]).unwrap();
        assert_eq!(text, "start");
    }

    #[test]
    fn test_length_cap_bounds_the_output() {
        let tok = fixture_tokenizer();
        let dog_id = tok.encode("dog")[0] as usize;

        // The model never emits "end", so only the cap stops the loop
        let mut probs = vec![0.0f32; tok.vocab_size()];
        probs[dog_id] = 1.0;
        let predictor = FixedPredictor { probs };

        let max_len = 4;
        let text = greedy_decode(&predictor, &tok, max_len, &[0.5]).unwrap();
        let words: Vec<&str> = text.split_whitespace().collect();

        // Start sentinel plus at most max_len appended words
        assert_eq!(words.len(), max_len + 1);
        assert_eq!(words[0], START_TOKEN);
        assert!(words[1..].iter().all(|w| *w == "dog"));
    }

    #[test]
    fn test_argmax_first_max_wins() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
    }
}
