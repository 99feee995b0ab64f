// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn or ONNX Runtime types allowed here
//   - NO file I/O
//   - Only plain structs, constants, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The image→captions mapping and the caption boundary sentinels
pub mod captions;

// The image→embedding-vector mapping
pub mod features;

// Core abstractions (traits) that other layers implement
pub mod traits;
