// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// The persisted artifacts of a training run:
//
//   checkpoint.rs      — model weights per epoch (CompactRecorder),
//                        latest-epoch pointer, and the TrainConfig
//                        JSON inference rebuilds the model from
//
//   tokenizer_store.rs — the frozen word↔index mapping, built once
//                        from the training captions and reused
//                        verbatim at inference
//
//   feature_store.rs   — the image→embedding-vector mapping, so
//                        the extraction pass runs once
//
//   metrics.rs         — per-epoch training loss CSV
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer persistence
pub mod tokenizer_store;

/// Feature vector persistence
pub mod feature_store;

/// Training metrics CSV logger
pub mod metrics;
