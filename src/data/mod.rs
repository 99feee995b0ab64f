// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw caption token file to GPU-ready
// tensor batches.
//
// The pipeline flows in this order:
//
//   Flickr8k token file
//       │
//       ▼
//   TokenFileLoader    → parses <image>#<n><TAB><caption> lines
//       │
//       ▼
//   CaptionCleaner     → lowercases, strips punctuation, filters tokens
//       │
//       ▼
//   CaptionTokenizer   → frozen word↔index mapping (0 = padding)
//       │
//       ▼
//   ExampleGenerator   → (image vector, padded prefix, next word) triples
//       │
//       ▼
//   CaptionBatcher     → stacks one image's examples into tensors
//       │
//       ▼
//   training loop      → Layer 5
//
// Each module is responsible for exactly one step.

/// Parses the caption token file, split files, and the
/// cleaned-description artifact
pub mod loader;

/// Normalises raw caption text
pub mod cleaner;

/// Frozen word↔index tokenizer
pub mod tokenizer;

/// Expands captions into supervised next-word examples
pub mod generator;

/// Stacks examples into tensor batches
pub mod batcher;
