// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// All machine-learning framework code lives here — Burn for the
// trainable fusion model, ONNX Runtime for the frozen pretrained
// encoder. No other layer imports from burn or ort directly.
//
// What's in this layer:
//
//   model.rs     — The fusion network architecture:
//                  • dense image branch (dropout → linear → relu)
//                  • recurrent caption branch (embedding → dropout → LSTM)
//                  • additive merge and next-word projection head
//
//   trainer.rs   — The training loop over the lazy example
//                  generator: forward pass, cross-entropy loss,
//                  backward pass, Adam step, per-epoch checkpoints
//
//   decoder.rs   — Greedy caption generation from a checkpoint
//
//   extractor.rs — Pretrained visual encoder (ONNX Runtime):
//                  image preprocessing and embedding extraction
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM
//            Vinyals et al. (2015) Show and Tell

/// Fusion model architecture (image branch + LSTM caption branch)
pub mod model;

/// Training loop with per-epoch checkpointing
pub mod trainer;

/// Greedy decode loop — generates captions word by word
pub mod decoder;

/// Pretrained visual encoder via ONNX Runtime
pub mod extractor;
