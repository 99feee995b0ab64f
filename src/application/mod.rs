// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish a specific goal
// (training the captioner, or captioning one image).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

// The training workflow
pub mod train_use_case;

// The inference/captioning workflow
pub mod caption_use_case;
