// ============================================================
// Layer 3 — Caption Domain Types
// ============================================================
// The core data of the system: a mapping from image identifiers
// to the ordered list of reference captions written for them.
//
// A BTreeMap keeps iteration order deterministic, so training
// examples are produced in the same order on every run.
//
// Reference: Rust Book §8 (Collections)

use std::collections::BTreeMap;

/// Literal sentinel marking the beginning of a generated caption.
/// The decoder seeds its state with this word.
pub const START_TOKEN: &str = "start";

/// Literal sentinel marking the end of a generated caption.
/// The decoder stops as soon as it predicts this word.
pub const END_TOKEN: &str = "end";

/// A mapping from image identifier to its captions.
///
/// Invariant: every image present in the set has at least one caption.
#[derive(Debug, Clone, Default)]
pub struct CaptionSet {
    captions: BTreeMap<String, Vec<String>>,
}

impl CaptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one caption under the given image id.
    pub fn push(&mut self, image_id: impl Into<String>, caption: impl Into<String>) {
        self.captions
            .entry(image_id.into())
            .or_default()
            .push(caption.into());
    }

    /// Captions stored for one image, in insertion order.
    pub fn get(&self, image_id: &str) -> Option<&[String]> {
        self.captions.get(image_id).map(|v| v.as_slice())
    }

    /// Number of distinct images.
    pub fn image_count(&self) -> usize {
        self.captions.len()
    }

    /// Total number of captions across all images.
    pub fn caption_count(&self) -> usize {
        self.captions.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Iterate (image_id, captions) pairs in sorted image-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.captions.iter()
    }

    /// Mutable iteration, used by the cleaning pass which rewrites
    /// every caption in place.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Vec<String>)> {
        self.captions.iter_mut()
    }

    /// All caption strings, flattened, in iteration order.
    pub fn all_captions(&self) -> impl Iterator<Item = &str> {
        self.captions.values().flatten().map(|s| s.as_str())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_groups_by_image() {
        let mut set = CaptionSet::new();
        set.push("img1.jpg", "a dog runs");
        set.push("img1.jpg", "brown dog running");
        set.push("img2.jpg", "child smiles");

        assert_eq!(set.image_count(), 2);
        assert_eq!(set.caption_count(), 3);
        assert_eq!(set.get("img1.jpg").unwrap().len(), 2);
    }

    #[test]
    fn test_iteration_order_is_deterministic() {
        let mut set = CaptionSet::new();
        set.push("b.jpg", "second");
        set.push("a.jpg", "first");

        let ids: Vec<&String> = set.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_caption_order_preserved_within_image() {
        let mut set = CaptionSet::new();
        set.push("img.jpg", "one");
        set.push("img.jpg", "two");
        set.push("img.jpg", "three");

        assert_eq!(set.get("img.jpg").unwrap(), ["one", "two", "three"]);
    }
}
