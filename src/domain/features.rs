// ============================================================
// Layer 3 — Feature Mapping Domain Type
// ============================================================
// One fixed-length embedding vector per image, produced by the
// pretrained visual encoder. The same mapping shape is used for
// the batch extraction pass and the persisted artifact.

use std::collections::BTreeMap;

/// Image filename → fixed-length embedding vector.
///
/// Invariant: one vector per image, all of the same length, all produced
/// by the same encoder and preprocessing as the inference-time pass.
pub type FeatureMap = BTreeMap<String, Vec<f32>>;
