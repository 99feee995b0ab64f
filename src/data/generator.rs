// ============================================================
// Layer 4 — Training Example Generator
// ============================================================
// Expands each (image, caption) pair into supervised next-word
// prediction triples. A caption of n tokens yields n−1 examples:
//
//   caption ids: [s, w1, w2, e]            (s/e = sentinel ids)
//   example 1:   prefix [0,...,0,s]        target w1
//   example 2:   prefix [0,...,s,w1]       target w2
//   example 3:   prefix [0,..,s,w1,w2]     target e
//
// Prefixes are left-padded with the 0 sentinel to one fixed global
// maximum caption length. The target index is the integer form of
// the one-hot next-word vector; burn's cross-entropy consumes the
// class index directly.
//
// Examples are produced lazily, one image's worth at a time, in
// mapping iteration order, caption order, then increasing split
// index. The generator cycles back to the first image after the
// last, so it serves any number of epochs. No shuffling happens
// here; consumption order is the training loop's business.

use crate::data::tokenizer::CaptionTokenizer;
use crate::domain::captions::CaptionSet;
use crate::domain::features::FeatureMap;

// ─── CaptionExample ───────────────────────────────────────────────────────────
/// One supervised training triple.
#[derive(Debug, Clone)]
pub struct CaptionExample {
    /// The image's embedding vector, shared by every split of its captions
    pub features: Vec<f32>,

    /// Token-id prefix, left-padded with 0 to the fixed maximum length
    pub prefix: Vec<u32>,

    /// Index of the true next word in the vocabulary
    pub target: u32,
}

/// Left-pad a token sequence with the 0 sentinel up to `max_len`.
/// Sequences longer than `max_len` keep their trailing tokens.
pub fn pad_prefix(ids: &[u32], max_len: usize) -> Vec<u32> {
    if ids.len() >= max_len {
        return ids[ids.len() - max_len..].to_vec();
    }
    let mut padded = vec![0u32; max_len - ids.len()];
    padded.extend_from_slice(ids);
    padded
}

/// The fixed global pad length: the maximum token count across all
/// training captions. Computed once and reused for every prefix, every
/// epoch, and every decode.
pub fn max_caption_len(captions: &CaptionSet) -> usize {
    captions
        .all_captions()
        .map(|c| c.split_whitespace().count())
        .max()
        .unwrap_or(0)
}

/// Expand one caption into its (prefix, next-word) examples.
/// A caption that encodes to fewer than two ids yields none.
pub fn examples_for_caption(
    caption:   &str,
    features:  &[f32],
    tokenizer: &CaptionTokenizer,
    max_len:   usize,
) -> Vec<CaptionExample> {
    let seq = tokenizer.encode(caption);
    let mut examples = Vec::with_capacity(seq.len().saturating_sub(1));

    for i in 1..seq.len() {
        examples.push(CaptionExample {
            features: features.to_vec(),
            prefix:   pad_prefix(&seq[..i], max_len),
            target:   seq[i],
        });
    }
    examples
}

// ─── ExampleGenerator ─────────────────────────────────────────────────────────
/// Lazy, infinite producer of per-image example batches.
///
/// Each call to `next()` returns every example derived from one image's
/// captions, then advances to the next image, wrapping around after the
/// last. Images with no extracted feature vector are skipped up front.
pub struct ExampleGenerator<'a> {
    captions:        &'a CaptionSet,
    features:        &'a FeatureMap,
    tokenizer:       &'a CaptionTokenizer,
    max_caption_len: usize,
    image_ids:       Vec<String>,
    cursor:          usize,
}

impl<'a> ExampleGenerator<'a> {
    pub fn new(
        captions:        &'a CaptionSet,
        features:        &'a FeatureMap,
        tokenizer:       &'a CaptionTokenizer,
        max_caption_len: usize,
    ) -> Self {
        let image_ids: Vec<String> = captions
            .iter()
            .map(|(id, _)| id.clone())
            .filter(|id| {
                let present = features.contains_key(id);
                if !present {
                    tracing::warn!("No feature vector for '{}' — excluded from training", id);
                }
                present
            })
            .collect();

        Self { captions, features, tokenizer, max_caption_len, image_ids, cursor: 0 }
    }

    /// Number of images served per full pass — the training loop's
    /// steps-per-epoch.
    pub fn images_per_epoch(&self) -> usize {
        self.image_ids.len()
    }
}

impl Iterator for ExampleGenerator<'_> {
    type Item = Vec<CaptionExample>;

    /// Never returns None while at least one image has features; the
    /// cursor wraps to image 0 after the last image.
    fn next(&mut self) -> Option<Vec<CaptionExample>> {
        if self.image_ids.is_empty() {
            return None;
        }

        let image_id = &self.image_ids[self.cursor];
        self.cursor = (self.cursor + 1) % self.image_ids.len();

        let feature = &self.features[image_id];
        let mut batch = Vec::new();

        for caption in self.captions.get(image_id).unwrap_or(&[]) {
            batch.extend(examples_for_caption(
                caption,
                feature,
                self.tokenizer,
                self.max_caption_len,
            ));
        }
        Some(batch)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (CaptionSet, CaptionTokenizer) {
        let mut set = CaptionSet::new();
        set.push("a.jpg", "start dog runs end");
        set.push("b.jpg", "start dog jumps high end");
        let tok = CaptionTokenizer::fit(&set);
        (set, tok)
    }

    #[test]
    fn test_single_token_caption_yields_nothing() {
        let (_, tok) = fixture();
        let examples = examples_for_caption("dog", &[0.5], &tok, 5);
        assert!(examples.is_empty());
    }

    #[test]
    fn test_caption_of_length_n_yields_n_minus_one() {
        let (_, tok) = fixture();
        // 4 tokens → 3 split points
        let examples = examples_for_caption("start dog runs end", &[0.5], &tok, 5);
        assert_eq!(examples.len(), 3);
    }

    #[test]
    fn test_prefixes_and_targets_track_the_splits() {
        let (_, tok) = fixture();
        let seq = tok.encode("start dog runs end");
        let examples = examples_for_caption("start dog runs end", &[0.5], &tok, 4);

        for (i, example) in examples.iter().enumerate() {
            // Prefix is seq[0..=i], left-padded to length 4
            let expected = pad_prefix(&seq[..i + 1], 4);
            assert_eq!(example.prefix, expected);
            // Target is the token right after the split
            assert_eq!(example.target, seq[i + 1]);
        }
    }

    #[test]
    fn test_prefix_carries_the_image_features() {
        let (_, tok) = fixture();
        let features = [1.0, 2.0, 3.0];
        let examples = examples_for_caption("start dog end", &features, &tok, 4);
        for example in &examples {
            assert_eq!(example.features, features);
        }
    }

    #[test]
    fn test_pad_prefix_left_pads_with_zero() {
        assert_eq!(pad_prefix(&[7, 9], 5), [0, 0, 0, 7, 9]);
    }

    #[test]
    fn test_pad_prefix_keeps_tail_of_long_sequences() {
        assert_eq!(pad_prefix(&[1, 2, 3, 4, 5], 3), [3, 4, 5]);
    }

    #[test]
    fn test_max_caption_len_is_global_maximum() {
        let (set, _) = fixture();
        // "start dog jumps high end" has 5 tokens
        assert_eq!(max_caption_len(&set), 5);
    }

    #[test]
    fn test_generator_cycles_past_the_last_image() {
        let (set, tok) = fixture();
        let mut features = FeatureMap::new();
        features.insert("a.jpg".to_string(), vec![0.1; 4]);
        features.insert("b.jpg".to_string(), vec![0.2; 4]);

        let max_len = max_caption_len(&set);
        let mut generator = ExampleGenerator::new(&set, &features, &tok, max_len);
        assert_eq!(generator.images_per_epoch(), 2);

        // Two images, so batches 0 and 2 must be identical
        let first  = generator.next().unwrap();
        let _second = generator.next().unwrap();
        let wrapped = generator.next().unwrap();

        assert_eq!(first.len(), wrapped.len());
        assert_eq!(first[0].prefix, wrapped[0].prefix);
        assert_eq!(first[0].target, wrapped[0].target);
    }

    #[test]
    fn test_images_without_features_are_skipped() {
        let (set, tok) = fixture();
        let mut features = FeatureMap::new();
        features.insert("a.jpg".to_string(), vec![0.1; 4]);

        let generator = ExampleGenerator::new(&set, &features, &tok, 5);
        assert_eq!(generator.images_per_epoch(), 1);
    }
}
