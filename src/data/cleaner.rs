// ============================================================
// Layer 4 — Caption Cleaner
// ============================================================
// Normalises raw caption text before vocabulary building.
//
// Cleaning steps, applied per caption:
//   1. Replace hyphens with spaces ("tree-lined" → "tree lined")
//   2. Lowercase every word
//   3. Strip ASCII punctuation from every word
//   4. Drop single-character words ("a", "s" left over from 's)
//   5. Drop words containing non-alphabetic characters
//   6. Rejoin with single spaces
//
// The transform is idempotent: cleaning already-clean text
// returns it unchanged.

use crate::domain::captions::CaptionSet;

pub struct CaptionCleaner;

impl CaptionCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean a single caption string.
    pub fn clean(&self, caption: &str) -> String {
        caption
            .replace('-', " ")
            .split_whitespace()
            .map(|word| {
                word.to_lowercase()
                    .chars()
                    .filter(|c| !c.is_ascii_punctuation())
                    .collect::<String>()
            })
            .filter(|word| word.chars().count() > 1)
            .filter(|word| word.chars().all(|c| c.is_alphabetic()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean every caption in the mapping in place.
    pub fn clean_set(&self, set: &mut CaptionSet) {
        for (_image_id, captions) in set.iter_mut() {
            for caption in captions.iter_mut() {
                *caption = self.clean(caption);
            }
        }
    }
}

impl Default for CaptionCleaner {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_drops_single_letters() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean("A dog runs"), "dog runs");
    }

    #[test]
    fn test_strips_punctuation() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean("The dog, runs."), "the dog runs");
    }

    #[test]
    fn test_splits_hyphenated_words() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean("a tree-lined street"), "tree lined street");
    }

    #[test]
    fn test_drops_words_with_digits() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean("photo9 of dog"), "of dog");
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let c = CaptionCleaner::new();
        let once  = c.clean("Two dogs; play-fighting in the grass!");
        let twice = c.clean(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_caption() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean(""), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        let c = CaptionCleaner::new();
        assert_eq!(c.clean("dog   runs  fast"), "dog runs fast");
    }
}
