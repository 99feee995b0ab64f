// ============================================================
// Layer 4 — Caption Tokenizer
// ============================================================
// A word-level tokenizer: a frozen bidirectional mapping between
// vocabulary words and dense integer indices.
//
// Index assignment:
//   - 0 is reserved as the padding sentinel and never maps to a word
//   - real indices start at 1, in descending frequency order,
//     with ties broken by first-seen order (stable sort)
//
// Encoding silently drops out-of-vocabulary words; there is no
// unknown-token id. The tokenizer is built once from the training
// captions and must be reused verbatim at inference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::captions::CaptionSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionTokenizer {
    /// word → index, indices 1..=n
    word_index: HashMap<String, u32>,

    /// index_word[i - 1] is the word with index i
    index_word: Vec<String>,
}

impl CaptionTokenizer {
    /// Build the frozen word↔index mapping from the training captions.
    pub fn fit(captions: &CaptionSet) -> Self {
        // Count word frequencies, remembering first-seen order
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut seen_order: Vec<String> = Vec::new();

        for caption in captions.all_captions() {
            for word in caption.split_whitespace() {
                let word = word.to_lowercase();
                if !counts.contains_key(&word) {
                    seen_order.push(word.clone());
                }
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        // Stable sort: equal frequencies keep first-seen order
        let mut ranked = seen_order;
        ranked.sort_by_key(|w| std::cmp::Reverse(counts[w]));

        let word_index = ranked
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), (i + 1) as u32))
            .collect();

        Self { word_index, index_word: ranked }
    }

    /// Encode a text into token ids, dropping out-of-vocabulary words.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace()
            .filter_map(|w| self.word_index.get(&w.to_lowercase()).copied())
            .collect()
    }

    /// Reverse lookup: the word for a given index, or None for 0 and
    /// any index outside the vocabulary.
    pub fn word_for_id(&self, id: u32) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.index_word.get(id as usize - 1).map(|s| s.as_str())
    }

    /// Distinct-word count + 1: indices run 1..=n, with 0 reserved,
    /// so the next-word distribution has this many classes.
    pub fn vocab_size(&self) -> usize {
        self.index_word.len() + 1
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_index.contains_key(word)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> CaptionSet {
        let mut set = CaptionSet::new();
        set.push("a.jpg", "dog runs fast");
        set.push("a.jpg", "dog jumps");
        set.push("b.jpg", "dog runs");
        set
    }

    #[test]
    fn test_frequency_ordered_indices() {
        let tok = CaptionTokenizer::fit(&fixture());
        // "dog" appears 3 times, "runs" twice, so they take indices 1 and 2
        assert_eq!(tok.encode("dog"), [1]);
        assert_eq!(tok.encode("runs"), [2]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let tok = CaptionTokenizer::fit(&fixture());
        // "fast" and "jumps" both appear once; "fast" was seen first
        let fast  = tok.encode("fast")[0];
        let jumps = tok.encode("jumps")[0];
        assert!(fast < jumps);
    }

    #[test]
    fn test_index_zero_is_never_assigned() {
        let tok = CaptionTokenizer::fit(&fixture());
        for word in ["dog", "runs", "fast", "jumps"] {
            assert_ne!(tok.encode(word)[0], 0);
        }
        assert_eq!(tok.word_for_id(0), None);
    }

    #[test]
    fn test_round_trip_every_vocabulary_word() {
        let tok = CaptionTokenizer::fit(&fixture());
        for word in ["dog", "runs", "fast", "jumps"] {
            let id = tok.encode(word)[0];
            assert_eq!(tok.word_for_id(id), Some(word));
        }
    }

    #[test]
    fn test_unknown_words_are_dropped() {
        let tok = CaptionTokenizer::fit(&fixture());
        assert_eq!(tok.encode("dog zebra runs"), [1, 2]);
    }

    #[test]
    fn test_out_of_range_lookup_is_none() {
        let tok = CaptionTokenizer::fit(&fixture());
        assert_eq!(tok.word_for_id(999), None);
    }

    #[test]
    fn test_vocab_size_counts_reserved_zero() {
        let tok = CaptionTokenizer::fit(&fixture());
        // 4 distinct words + reserved index 0
        assert_eq!(tok.vocab_size(), 5);
    }

    #[test]
    fn test_serde_round_trip_preserves_mapping() {
        let tok  = CaptionTokenizer::fit(&fixture());
        let json = serde_json::to_string(&tok).unwrap();
        let back: CaptionTokenizer = serde_json::from_str(&json).unwrap();

        assert_eq!(back.vocab_size(), tok.vocab_size());
        assert_eq!(back.encode("dog runs"), tok.encode("dog runs"));
        assert_eq!(back.word_for_id(1), tok.word_for_id(1));
    }
}
