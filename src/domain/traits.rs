// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams of the system. By programming against these traits
// the application layer never sees file formats, and the greedy
// decode loop never sees tensor types:
//   - TokenFileLoader implements CaptionSource
//   - Decoder implements WordPredictor
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::captions::CaptionSet;

// ─── CaptionSource ────────────────────────────────────────────────────────────
/// Any component that can produce an image→captions mapping.
pub trait CaptionSource {
    /// Load the full caption mapping from this source.
    fn load(&self) -> Result<CaptionSet>;
}

// ─── WordPredictor ────────────────────────────────────────────────────────────
/// Any component that can score the next word of a caption.
///
/// Given one image's feature vector and a left-padded prefix of token ids,
/// returns a probability distribution over the whole vocabulary (index 0,
/// the padding sentinel, included).
pub trait WordPredictor {
    fn predict_next(&self, features: &[f32], prefix: &[u32]) -> Result<Vec<f32>>;
}
